/// League served when the request does not name one
pub const DEFAULT_LEAGUE: &str = "nba";

/// Intelligence mode assumed when the request does not name one
pub const DEFAULT_MODE: &str = "safe";

/// bcrypt cost factor for stored credentials
pub const BCRYPT_COST: u32 = 10;

/// Identity token lifetime when SESSION_TTL_SECS is unset (30 days)
pub const DEFAULT_SESSION_TTL_SECS: i64 = 2_592_000;

/// Settings row holding the payment wallet list
pub const WALLETS_KEY: &str = "wallets";

/// Number of graded history rows returned by the audit endpoint
pub const RECENT_HISTORY_LIMIT: usize = 10;

/// History status marking a pick that has been settled
pub const GRADED_STATUS: &str = "graded";

/// Client-side refresh interval for live views
pub const POLL_INTERVAL_SECS: u64 = 30;

// =============================================================================
// Error Messages
// =============================================================================

/// Registration without username or password
pub const ERR_CREDENTIALS_REQUIRED: &str = "Username and password are required";

/// Login with unknown user or wrong password
pub const ERR_INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Predictions lookup that produced no payload
pub const ERR_PREDICTIONS_UNAVAILABLE: &str = "No predictions available";

/// Details when the store connection parameters are absent
pub const DETAILS_STORE_NOT_CONFIGURED: &str =
    "Store URL or access key is missing from the environment";

/// Details when the store is reachable but has no row for the league
pub const DETAILS_NO_ROW: &str = "No row found in predictions_store for this league";
