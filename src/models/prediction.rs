use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::parse_if_string;

/// Row of the `predictions_store` table: latest payload for one league
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub league: String,
    /// Opaque payload written by the prediction producer (`games[]`, ...)
    pub data: Value,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl PredictionRecord {
    /// Response payload: the stored object with `lastUpdated` merged in.
    ///
    /// The producer's shape is passed through untouched. A payload that is not
    /// an object is wrapped under `data`.
    pub fn into_payload(self) -> Value {
        let last_updated = self.updated_at.map(Value::String).unwrap_or(Value::Null);

        match parse_if_string(self.data) {
            Value::Object(mut fields) => {
                fields.insert("lastUpdated".to_string(), last_updated);
                Value::Object(fields)
            }
            other => {
                let mut fields = Map::new();
                fields.insert("data".to_string(), other);
                fields.insert("lastUpdated".to_string(), last_updated);
                Value::Object(fields)
            }
        }
    }
}

/// Not-found body of the predictions endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionsUnavailable {
    pub error: String,
    pub details: String,
    pub league: String,
    pub timestamp: String,
}

impl PredictionsUnavailable {
    pub fn new(error: impl Into<String>, details: impl Into<String>, league: &str) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
            league: league.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_into_payload_merges_last_updated() {
        let record = PredictionRecord {
            league: "nba".to_string(),
            data: json!({ "games": [{ "away": "Lakers", "home": "Celtics", "edge": 4.5 }] }),
            updated_at: Some("2026-01-05T12:00:00+00:00".to_string()),
        };

        let payload = record.into_payload();
        assert_eq!(payload["games"][0]["away"], "Lakers");
        assert_eq!(payload["games"][0]["edge"], 4.5);
        assert_eq!(payload["lastUpdated"], "2026-01-05T12:00:00+00:00");
    }

    #[test]
    fn test_into_payload_decodes_string_data() {
        let record = PredictionRecord {
            league: "ncaa".to_string(),
            data: json!("{\"games\":[]}"),
            updated_at: None,
        };

        let payload = record.into_payload();
        assert_eq!(payload["games"], json!([]));
        assert!(payload["lastUpdated"].is_null());
    }

    #[test]
    fn test_into_payload_wraps_non_objects() {
        let record = PredictionRecord {
            league: "nbl".to_string(),
            data: json!([1, 2]),
            updated_at: None,
        };

        assert_eq!(
            record.into_payload(),
            json!({ "data": [1, 2], "lastUpdated": null })
        );
    }
}
