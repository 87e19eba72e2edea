//! Default configuration values.

use std::time::Duration;

/// Fallback request timeout applied when the caller does not set one (or sets
/// it to zero).
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
