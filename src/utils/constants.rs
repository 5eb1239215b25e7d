//! Shared constants and invariants

/// Lead time before actual expiry at which a token counts as due for renewal.
pub const REFRESH_BUFFER_SECONDS: u64 = 5 * 60;

/// Backstop interval for the periodic expiry check.
pub const CHECK_INTERVAL_SECONDS: u64 = 30;

pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 5000;

// JSON body field that carries the issued token
pub const DEFAULT_TOKEN_FIELD: &str = "jwt";
