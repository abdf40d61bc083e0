//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.

/// Default prediction service URL
///
/// This is the fallback URL when no environment variable is set.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default feedback database port
pub const DEFAULT_DB_PORT: u16 = 5432;

/// Default output file for batch predictions
pub const DEFAULT_BATCH_OUTPUT: &str = "predictions.csv";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get prediction service URL from environment or use default
pub fn get_api_url() -> String {
    std::env::var("PREDICTION_API_URL")
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

/// Get database host from environment
pub fn get_db_host() -> Option<String> {
    std::env::var("DB_HOST").ok()
}

/// Get database name from environment
pub fn get_db_name() -> Option<String> {
    std::env::var("DB_NAME").ok()
}

/// Get database user from environment
pub fn get_db_user() -> Option<String> {
    std::env::var("DB_USER").ok()
}

/// Get database password from environment
pub fn get_db_pass() -> Option<String> {
    std::env::var("DB_PASS").ok()
}

/// Get database port from environment or use default
pub fn get_db_port() -> u16 {
    std::env::var("DB_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_DB_PORT)
}
