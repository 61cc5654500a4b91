use std::fmt;

use base64::{engine::general_purpose, Engine as _};

use crate::retry::RetryPolicy;

/// Port the scanner's HTTP API listens on out of the box.
pub const DEFAULT_PORT: u16 = 8080;
/// Username the scanner expects for Basic authentication.
pub const DEFAULT_USERNAME: &str = "doxie";

/// Environment variable consulted for the host when none is given.
pub const ENV_URL: &str = "DOXIE_URL";
/// Environment variable consulted for the port when none is given.
pub const ENV_PORT: &str = "DOXIE_PORT";
/// Environment variable consulted for the password when none is given.
pub const ENV_PASSWORD: &str = "DOXIE_PASSWORD";

/// Connection and credential settings for a scanner.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub username: String,
    pub password: Option<String>,
    /// Raw `Authorization` header value. Takes precedence over the password.
    pub token: Option<String>,
    /// Scanner address, with or without scheme (`http://10.0.0.100`).
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            username: DEFAULT_USERNAME.to_owned(),
            password: None,
            token: None,
            host: None,
            port: Some(DEFAULT_PORT),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the port. `None` leaves it to the environment.
    pub fn with_port(mut self, port: impl Into<Option<u16>>) -> Self {
        self.port = port.into();
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Uses `token` verbatim as the `Authorization` header value.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Fills missing host, port and password from `DOXIE_URL`, `DOXIE_PORT`
    /// and `DOXIE_PASSWORD`.
    pub fn resolve_env(self) -> Self {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Fills missing host, port and password from `lookup`.
    ///
    /// Empty values are ignored. An unparsable port is ignored as well and
    /// leaves the port unset.
    pub fn resolve_with<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if self.host.is_none() {
            self.host = lookup(ENV_URL);
        }
        if self.port.is_none() {
            self.port = lookup(ENV_PORT).and_then(|port| port.trim().parse().ok());
        }
        if self.password.is_none() {
            self.password = lookup(ENV_PASSWORD);
        }
        self
    }

    /// Names of the settings that are required but absent.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.host.as_deref().map_or(true, |host| host.trim().is_empty()) {
            missing.push("host");
        }
        if self.port.is_none() {
            missing.push("port");
        }
        missing
    }

    /// `scheme://host:port`, or `None` when host or port is missing.
    ///
    /// Hosts without a scheme are assumed to be plain HTTP.
    pub fn base_url(&self) -> Option<String> {
        let host = self.host.as_deref()?.trim().trim_end_matches('/');
        let port = self.port?;
        if host.is_empty() {
            return None;
        }
        if host.contains("://") {
            Some(format!("{host}:{port}"))
        } else {
            Some(format!("http://{host}:{port}"))
        }
    }

    /// Resolves the `Authorization` header value.
    ///
    /// An explicit token wins, then Basic credentials from username and
    /// password, otherwise no header is sent.
    pub fn authorization(&self) -> Option<String> {
        if let Some(token) = &self.token {
            return Some(token.clone());
        }
        match (&self.password, self.username.is_empty()) {
            (Some(password), false) => Some(basic_authorization(&self.username, password)),
            _ => None,
        }
    }
}

/// Configures HTTP timeout and retry behavior.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientOptions {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Retry policy for scan and thumbnail downloads.
    pub retry: RetryPolicy,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            retry: RetryPolicy::default(),
        }
    }
}

fn basic_authorization(username: &str, password: &str) -> String {
    let encoded = general_purpose::STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {encoded}")
}
