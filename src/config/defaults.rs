pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: i64 = 8080;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: i64 = 30;
pub const DEFAULT_RUST_LOG: &str = "info,tower_http=info";
pub const DEFAULT_DB_MAX_CONNECTIONS: i64 = 10;
pub const DEFAULT_DB_MIN_IDLE: i64 = 1;
pub const DEFAULT_DB_MAX_LIFETIME_SECS: i64 = 60 * 60;
pub const DEFAULT_DB_CONNECT_TIMEOUT_SECS: i64 = 5;
