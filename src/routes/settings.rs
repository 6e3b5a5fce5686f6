use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::constants::WALLETS_KEY;
use crate::db::{Query, Table};
use crate::models::{parse_if_string, SettingRecord, SettingsUpdate};
use crate::routes::users::AdminWriteError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct WriteAck {
    pub success: bool,
}

/// Fold setting rows into one key -> value object, decoding JSON-encoded
/// values and guaranteeing a `wallets` entry
pub fn fold_settings(rows: Vec<SettingRecord>) -> Map<String, Value> {
    let mut settings: Map<String, Value> = rows
        .into_iter()
        .map(|row| (row.key, parse_if_string(row.value)))
        .collect();

    settings
        .entry(WALLETS_KEY)
        .or_insert_with(|| Value::Array(Vec::new()));
    settings
}

/// Public settings (payment wallets)
///
/// GET /api/admin/settings
///
/// Never fails: store errors answer `{wallets: []}`.
pub async fn get_settings(State(state): State<AppState>) -> Json<Value> {
    let rows = match state.store.query_all(Table::Settings, &Query::new()).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to load settings: {:?}", e);
            return Json(json!({ "wallets": [] }));
        }
    };

    let records = match rows
        .into_iter()
        .map(serde_json::from_value::<SettingRecord>)
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(records) => records,
        Err(e) => {
            tracing::error!("Malformed settings row: {}", e);
            return Json(json!({ "wallets": [] }));
        }
    };

    Json(Value::Object(fold_settings(records)))
}

/// Overwrite the wallet list
///
/// POST /api/admin/settings with `{wallets: [...]}`. Last writer wins; the
/// entries are stored exactly as sent.
pub async fn update_settings(
    State(state): State<AppState>,
    update: Result<Json<SettingsUpdate>, JsonRejection>,
) -> Result<Json<WriteAck>, AdminWriteError> {
    let Json(update) = update?;
    let wallets = update.into_wallets();

    let record = SettingRecord {
        key: WALLETS_KEY.to_string(),
        value: Value::String(serde_json::to_string(&wallets)?),
    };

    state
        .store
        .upsert(Table::Settings, vec![serde_json::to_value(record)?], "key")
        .await?;

    tracing::info!("Wallet list updated ({} wallets)", wallets.len());
    Ok(Json(WriteAck { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_settings_decodes_string_values() {
        let rows = vec![
            SettingRecord {
                key: "wallets".to_string(),
                value: json!("[{\"type\":\"BTC\",\"address\":\"1ABC\"}]"),
            },
            SettingRecord {
                key: "banner".to_string(),
                value: json!("Playoffs special"),
            },
        ];

        let settings = fold_settings(rows);
        assert_eq!(
            settings["wallets"],
            json!([{ "type": "BTC", "address": "1ABC" }])
        );
        assert_eq!(settings["banner"], "Playoffs special");
    }

    #[test]
    fn test_fold_settings_accepts_raw_values() {
        let rows = vec![SettingRecord {
            key: "wallets".to_string(),
            value: json!([{ "type": "ETH", "address": "0x1" }]),
        }];

        assert_eq!(
            fold_settings(rows)["wallets"],
            json!([{ "type": "ETH", "address": "0x1" }])
        );
    }

    #[test]
    fn test_fold_settings_always_has_wallets() {
        assert_eq!(fold_settings(Vec::new())["wallets"], json!([]));
    }
}
