use std::fmt;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;

use crate::{
    retry::{retry, Attempt, RetryPolicy},
    ClientConfig, ClientOptions, DoxieError, Hello, RecentScan, Result, ScanEntry, ScanImage,
    ScannerStatus, Transport, DEFAULT_PORT,
};

/// HTTP client for the Doxie scanner JSON API.
///
/// The underlying [`Transport`] is created on the first request and reused
/// for the lifetime of the client.
#[derive(Clone)]
pub struct DoxieClient {
    config: ClientConfig,
    base_url: Option<String>,
    authorization: Option<String>,
    options: ClientOptions,
    transport: OnceCell<Transport>,
}

impl fmt::Debug for DoxieClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DoxieClient")
            .field("base_url", &self.base_url)
            .field("authorization", &self.authorization.as_ref().map(|_| "<redacted>"))
            .field("options", &self.options)
            .field("transport_initialized", &self.transport.initialized())
            .finish()
    }
}

impl DoxieClient {
    /// Creates a client, filling missing host, port and password from
    /// `DOXIE_URL`, `DOXIE_PORT` and `DOXIE_PASSWORD`.
    ///
    /// Never fails: missing host or port is logged and reported by
    /// [`DoxieClient::missing_config`], and requests fail with
    /// [`DoxieError::MissingConfig`].
    ///
    /// # Example
    ///
    /// ```no_run
    /// use doxie_http::{ClientConfig, DoxieClient};
    ///
    /// let doxie = DoxieClient::new(ClientConfig::new().with_host("http://10.0.0.100"));
    /// ```
    pub fn new(config: ClientConfig) -> Self {
        Self::from_config(config.resolve_env())
    }

    /// Creates a client purely from environment variables.
    ///
    /// The port falls back to [`DEFAULT_PORT`] when `DOXIE_PORT` is unset.
    pub fn from_env() -> Self {
        let mut config = ClientConfig::new().with_port(None).resolve_env();
        if config.port.is_none() {
            config.port = Some(DEFAULT_PORT);
        }
        Self::from_config(config)
    }

    /// Creates a client from `config` as given, without consulting the
    /// environment.
    pub fn from_config(config: ClientConfig) -> Self {
        for field in config.missing() {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                field,
                "no scanner {field} configured; pass it explicitly or set DOXIE_URL / DOXIE_PORT"
            );
            #[cfg(not(feature = "tracing"))]
            let _ = field;
        }

        Self {
            base_url: config.base_url(),
            authorization: config.authorization(),
            config,
            options: ClientOptions::default(),
            transport: OnceCell::new(),
        }
    }

    /// Applies client options such as timeout and retry behavior.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// `scheme://host:port` of the scanner, if host and port are known.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// The `Authorization` value sent with every request, if any.
    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }

    /// Required settings that were absent at construction.
    pub fn missing_config(&self) -> Vec<&'static str> {
        self.config.missing()
    }

    /// Returns the shared transport, creating it on first use.
    ///
    /// Overlapping first calls converge on a single instance.
    pub async fn transport(&self) -> Result<&Transport> {
        self.transport
            .get_or_try_init(|| async {
                let base_url = self.base_url.clone().ok_or_else(|| {
                    DoxieError::MissingConfig(
                        self.config.missing().first().copied().unwrap_or("host"),
                    )
                })?;

                #[cfg(feature = "tracing")]
                tracing::debug!(%base_url, "initializing scanner transport");

                Transport::new(base_url, self.authorization.as_deref())
            })
            .await
    }

    /// Returns all available status information.
    ///
    /// Doxie Q and Doxie Go SE include the firmware version here.
    pub async fn hello(&self) -> Result<Hello> {
        self.get_json("/hello.json").await
    }

    /// Returns additional status values (firmware, external power).
    ///
    /// Deprecated by the scanner for Doxie Q and Doxie Go SE.
    pub async fn scanner_status(&self) -> Result<ScannerStatus> {
        self.get_json("/hello_extra.json").await
    }

    /// Restarts the scanner's Wi-Fi system. Returns the HTTP status (204).
    pub async fn restart(&self) -> Result<u16> {
        self.send_for_status(Method::GET, "/restart.json", None).await
    }

    /// Lists all scans currently in the scanner's memory.
    ///
    /// Called right after scanning this may come back blank, which surfaces
    /// as [`DoxieError::Decode`].
    pub async fn list_all_scans(&self) -> Result<Vec<ScanEntry>> {
        self.get_json("/scans.json").await
    }

    /// Path of the last scan available.
    pub async fn most_recent_scan(&self) -> Result<RecentScan> {
        self.get_json("/scans/recent.json").await
    }

    /// Downloads the scan at `scan_path`, retrying with the client's policy.
    ///
    /// A scan requested right after capture may come back empty or 404;
    /// both are retried.
    pub async fn get_scan(&self, scan_path: &str) -> Result<ScanImage> {
        self.get_scan_with(scan_path, &self.options.retry).await
    }

    /// Like [`DoxieClient::get_scan`] with an explicit retry policy.
    pub async fn get_scan_with(&self, scan_path: &str, policy: &RetryPolicy) -> Result<ScanImage> {
        self.download(&format!("/scans{}", normalize_scan_path(scan_path)), policy)
            .await
    }

    /// Downloads the thumbnail (fits 240x240) for `scan_path`.
    ///
    /// Thumbnails for new scans are generated only after the scan shows up
    /// in `/scans.json`; until then the scanner answers 404, which is
    /// retried.
    pub async fn get_thumbnail(&self, scan_path: &str) -> Result<ScanImage> {
        self.get_thumbnail_with(scan_path, &self.options.retry).await
    }

    /// Like [`DoxieClient::get_thumbnail`] with an explicit retry policy.
    pub async fn get_thumbnail_with(
        &self,
        scan_path: &str,
        policy: &RetryPolicy,
    ) -> Result<ScanImage> {
        self.download(
            &format!("/thumbnails{}", normalize_scan_path(scan_path)),
            policy,
        )
        .await
    }

    /// Deletes the scan at `scan_path`. Returns the HTTP status (204).
    pub async fn delete_scan(&self, scan_path: &str) -> Result<u16> {
        let path = format!("/scans{}", normalize_scan_path(scan_path));
        self.send_for_status(Method::DELETE, &path, None).await
    }

    /// Deletes several scans in a single request. Returns the HTTP status (204).
    ///
    /// The paths are sent exactly as given, as one JSON array.
    pub async fn delete_multiple_scans<I, S>(&self, scan_paths: I) -> Result<u16>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths: Vec<String> = scan_paths.into_iter().map(Into::into).collect();
        self.send_for_status(Method::POST, "/scans/delete.json", Some(paths.as_slice()))
            .await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&[String]>,
    ) -> Result<reqwest::Response> {
        let transport = self.transport().await?;

        let mut request = transport
            .request(method, path)
            .timeout(Duration::from_millis(self.options.timeout_ms));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(DoxieError::Transport)?;
        Self::ensure_success(response).await
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(DoxieError::Unauthorized {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(DoxieError::Transport)?;
        Err(DoxieError::Http {
            status: status.as_u16(),
            body,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(Method::GET, path, None).await?;
        let body = response.text().await.map_err(DoxieError::Transport)?;

        if body.trim().is_empty() {
            return Err(DoxieError::Decode(format!("empty response body from {path}")));
        }

        serde_json::from_str::<T>(&body).map_err(|err| {
            DoxieError::Decode(format!("invalid JSON from {path}: {err}; body: {body}"))
        })
    }

    async fn send_for_status(
        &self,
        method: Method,
        path: &str,
        body: Option<&[String]>,
    ) -> Result<u16> {
        let response = self.send(method, path, body).await?;
        Ok(response.status().as_u16())
    }

    async fn download(&self, path: &str, policy: &RetryPolicy) -> Result<ScanImage> {
        retry(policy, |_| async move {
            self.download_once(path)
                .await
                .map_err(|err| self.classify(err))
        })
        .await
    }

    async fn download_once(&self, path: &str) -> Result<ScanImage> {
        let response = self.send(Method::GET, path, None).await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = response.bytes().await.map_err(DoxieError::Transport)?;

        if bytes.is_empty() {
            return Err(DoxieError::EmptyBody { status });
        }

        Ok(ScanImage {
            status,
            content_type,
            bytes: bytes.to_vec(),
        })
    }

    /// Decides whether a failed download is worth another attempt.
    fn classify(&self, err: DoxieError) -> Attempt<DoxieError> {
        let retryable = match &err {
            DoxieError::Http { status, .. } => StatusCode::from_u16(*status)
                .map(|status| self.should_retry_status(status))
                .unwrap_or(false),
            DoxieError::EmptyBody { .. } => true,
            DoxieError::Transport(inner) => self.should_retry_transport(inner),
            DoxieError::Unauthorized { .. }
            | DoxieError::MissingConfig(_)
            | DoxieError::InvalidConfig(_)
            | DoxieError::Decode(_)
            | DoxieError::Aborted => false,
        };

        if retryable {
            Attempt::Retry(err)
        } else {
            Attempt::Bail(err)
        }
    }

    fn should_retry_status(&self, status: StatusCode) -> bool {
        status.is_server_error()
            || matches!(
                status,
                StatusCode::NOT_FOUND | StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS
            )
    }

    fn should_retry_transport(&self, err: &reqwest::Error) -> bool {
        err.is_timeout()
            || err.is_request()
            || err.is_body()
            || err.is_connect()
    }
}

/// Scan paths as listed by the scanner start with `/`.
fn normalize_scan_path(scan_path: &str) -> String {
    let trimmed = scan_path.trim();
    if trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}
