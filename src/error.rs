/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum DoxieError {
    /// Host or port could not be resolved when the client was built.
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),
    /// A configured value cannot be used, e.g. a malformed credential.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// The scanner rejected the configured credentials.
    #[error("unauthorized (http {status})")]
    Unauthorized { status: u16 },
    /// Non-success HTTP status code with raw response body.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// Success status, but the scanner sent no image bytes yet.
    #[error("empty response body (http {status})")]
    EmptyBody { status: u16 },
    /// Response decoding or payload-shape validation error.
    #[error("decode error: {0}")]
    Decode(String),
    /// A retried operation was bailed out without a specific error.
    #[error("aborted")]
    Aborted,
}

impl DoxieError {
    /// HTTP status carried by this error, if the scanner answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status } | Self::Http { status, .. } | Self::EmptyBody { status } => {
                Some(*status)
            }
            Self::Transport(err) => err.status().map(|status| status.as_u16()),
            Self::MissingConfig(_) | Self::InvalidConfig(_) | Self::Decode(_) | Self::Aborted => {
                None
            }
        }
    }

    /// Returns `true` for a 404 answer.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<crate::retry::Aborted> for DoxieError {
    fn from(_: crate::retry::Aborted) -> Self {
        Self::Aborted
    }
}
