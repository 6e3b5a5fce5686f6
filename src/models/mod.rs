pub mod audit;
pub mod prediction;
pub mod setting;
pub mod user;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub use audit::{AuditReport, AuditSummary, HistoryRecord, Outcome};
pub use prediction::{PredictionRecord, PredictionsUnavailable};
pub use setting::{SettingRecord, SettingsUpdate, Wallet};
pub use user::{Identity, NewUser, UserPatch, UserRow, UserSummary, UserUpsert};

/// Primary key of a store row, integer or text depending on the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Int(id) => write!(f, "{id}"),
            RowId::Text(id) => f.write_str(id),
        }
    }
}

/// Decode a value that may have been stored JSON-encoded inside a string.
///
/// Strings that are not valid JSON come back unchanged.
pub fn parse_if_string(value: Value) -> Value {
    match value {
        Value::String(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
        other => other,
    }
}
