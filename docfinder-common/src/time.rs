//! Timestamp utilities
//!
//! Record timestamps are Unix epoch milliseconds, matching what the
//! document collections have always stored.

use chrono::Utc;

/// Current time as Unix epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
