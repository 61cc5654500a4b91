//! `doxie-http` is an async HTTP client for the Doxie scanner JSON API.
//!
//! One method per scanner endpoint on [`DoxieClient`]:
//! - status: [`DoxieClient::hello`], [`DoxieClient::scanner_status`]
//! - scans: [`DoxieClient::list_all_scans`], [`DoxieClient::most_recent_scan`],
//!   [`DoxieClient::get_scan`], [`DoxieClient::get_thumbnail`]
//! - housekeeping: [`DoxieClient::delete_scan`],
//!   [`DoxieClient::delete_multiple_scans`], [`DoxieClient::restart`]
//!
//! Scan and thumbnail downloads go through [`retry::retry`], since the
//! scanner answers 404 or an empty body until a fresh scan is ready.

mod client;
mod error;
mod options;
pub mod retry;
mod transport;
mod types;

pub use client::DoxieClient;
pub use error::DoxieError;
pub use options::{ClientConfig, ClientOptions, DEFAULT_PORT, DEFAULT_USERNAME};
pub use retry::RetryPolicy;
pub use transport::Transport;
pub use types::{Hello, RecentScan, ScanEntry, ScanImage, ScannerStatus};

pub type Result<T> = std::result::Result<T, DoxieError>;
