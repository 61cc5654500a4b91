use std::fmt;

use reqwest::{header, Method, RequestBuilder};

use crate::{DoxieError, Result};

/// Reusable HTTP client bound to one scanner's base URL and credentials.
#[derive(Clone)]
pub struct Transport {
    http: reqwest::Client,
    base_url: String,
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Transport {
    /// Builds the HTTP client, attaching `authorization` to every request.
    pub(crate) fn new(base_url: String, authorization: Option<&str>) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        if let Some(authorization) = authorization {
            let mut value = header::HeaderValue::from_str(authorization).map_err(|_| {
                DoxieError::InvalidConfig(
                    "authorization value contains invalid header characters".to_owned(),
                )
            })?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(DoxieError::Transport)?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The underlying `reqwest` client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Joins `path` onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }
}

#[cfg(test)]
mod tests {
    use super::Transport;
    use crate::DoxieError;

    #[test]
    fn url_joins_base_and_path() {
        let transport = Transport::new("http://10.0.0.1:8080".to_owned(), None)
            .expect("transport must build");
        assert_eq!(
            transport.url("/scans/recent.json"),
            "http://10.0.0.1:8080/scans/recent.json"
        );
    }

    #[test]
    fn http_client_builds_requests_against_base_url() {
        let transport = Transport::new("http://10.0.0.1:8080".to_owned(), Some("Basic abc"))
            .expect("transport must build");
        let request = transport
            .http()
            .get(transport.url("/hello.json"))
            .build()
            .expect("request must build");
        assert_eq!(request.url().as_str(), "http://10.0.0.1:8080/hello.json");
    }

    #[test]
    fn invalid_authorization_is_rejected() {
        let err = Transport::new("http://h:1".to_owned(), Some("Basic \n bad"))
            .expect_err("newline must be rejected");
        assert!(matches!(err, DoxieError::InvalidConfig(_)));
    }
}
