use std::fmt;

/// Tables of the external store read or written by this service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// username -> credential hash and pro flag
    Users,
    /// Generic key/value rows (wallet list)
    Settings,
    /// Latest prediction payload per league
    PredictionsStore,
    /// Graded historical picks
    PredictionsHistory,
    /// Per-league win/loss aggregates
    AuditSummary,
}

impl Table {
    /// Table name in the store
    pub fn name(self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Settings => "settings",
            Table::PredictionsStore => "predictions_store",
            Table::PredictionsHistory => "predictions_history",
            Table::AuditSummary => "audit_summary",
        }
    }

    /// Column carrying the table's uniqueness constraint
    pub fn unique_key(self) -> &'static str {
        match self {
            Table::Users => "username",
            Table::Settings => "key",
            Table::PredictionsStore | Table::AuditSummary => "league",
            Table::PredictionsHistory => "id",
        }
    }

    /// Whether the store assigns a serial `id` to new rows
    pub fn has_serial_id(self) -> bool {
        matches!(self, Table::Users | Table::PredictionsHistory)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
