use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-league aggregate row of the `audit_summary` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub league: String,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub pushes: u32,
    #[serde(default)]
    pub win_pct: f64,
}

/// Graded pick from the `predictions_history` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub game_date: String,
    pub matchup: String,
    #[serde(default)]
    pub market_total: Option<f64>,
    #[serde(default)]
    pub actual_total: Option<f64>,
    /// `None` marks a push
    #[serde(default)]
    pub is_win: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Push,
}

impl HistoryRecord {
    pub fn outcome(&self) -> Outcome {
        match self.is_win {
            Some(true) => Outcome::Win,
            Some(false) => Outcome::Loss,
            None => Outcome::Push,
        }
    }
}

/// Typed view of the audit endpoint's response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub metrics: Vec<AuditSummary>,
    pub recent: Vec<HistoryRecord>,
    pub timestamp: String,
}

impl AuditReport {
    /// Decode the endpoint's verbatim row arrays
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// Summary row for one league, if present
    pub fn league(&self, league: &str) -> Option<&AuditSummary> {
        self.metrics.iter().find(|m| m.league == league)
    }
}
