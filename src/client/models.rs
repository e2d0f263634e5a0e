use serde::{Deserialize, Serialize};

/// A TLD visible to the account, as returned by `GET /tlds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tld {
    #[serde(rename = "tld")]
    pub name: String,
    /// Unicode label
    pub ulable: String,
    /// Access request status, e.g. `approved` or `pending`.
    #[serde(rename = "currentStatus")]
    pub current_status: String,
    pub sftp: bool,
}
