use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Status information returned by `/hello.json`.
///
/// Fields the scanner model does not report stay `None`; anything not
/// modeled here is kept in `extra`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hello {
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Reported by Doxie Q and Doxie Go SE only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmware: Option<String>,
    #[serde(rename = "firmwareWiFi", default, skip_serializing_if = "Option::is_none")]
    pub firmware_wifi: Option<String>,
    #[serde(rename = "hasPassword", default, skip_serializing_if = "Option::is_none")]
    pub has_password: Option<bool>,
    #[serde(rename = "MAC", default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    /// `"AP"` when the scanner hosts its own network, `"Client"` otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Joined network name, only in `Client` mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Additional status values returned by `/hello_extra.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScannerStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmware: Option<String>,
    #[serde(
        rename = "connectedToExternalPower",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub connected_to_external_power: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// One entry of `/scans.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanEntry {
    /// Scan path, usable with `get_scan`, `get_thumbnail` and `delete_scan`.
    pub name: String,
    pub size: u64,
    /// Scanner-local timestamp, e.g. `2010-05-01 00:10:06`.
    pub modified: String,
}

/// Response of `/scans/recent.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentScan {
    pub path: String,
}

/// Image or thumbnail bytes as served by the scanner.
#[derive(Clone, PartialEq, Eq)]
pub struct ScanImage {
    pub status: u16,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ScanImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanImage")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}
