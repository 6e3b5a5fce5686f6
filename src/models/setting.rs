use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Generic key/value row of the `settings` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingRecord {
    pub key: String,
    /// Usually a JSON-encoded string; tolerated as a raw value too
    pub value: Value,
}

/// Payment wallet as read back by the upgrade page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    #[serde(rename = "type")]
    pub kind: String,
    pub address: String,
}

/// Body of `POST admin/settings`.
///
/// Wallet entries stay untyped so fields beyond `type` and `address` survive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub wallets: Option<Vec<Value>>,
}

impl SettingsUpdate {
    /// Wallet list to store; absent or null means empty
    pub fn into_wallets(self) -> Vec<Value> {
        self.wallets.unwrap_or_default()
    }
}
