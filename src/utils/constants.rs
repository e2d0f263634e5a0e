//! Shared constants and defaults

pub const DEFAULT_ACCOUNTS_API_BASE_URL: &str = "https://account-api.icann.org/api";
pub const DEFAULT_CZDS_API_BASE_URL: &str = "https://czds-api.icann.org/czds";

pub const DEFAULT_LOG_LEVEL: &str = "info";
