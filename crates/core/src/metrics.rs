//! Session metrics snapshot

use serde::{Deserialize, Serialize};

/// Point-in-time view of a session's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Messages appended to the transcript since creation/reset
    pub message_count: u64,
    /// Wall-clock latency of the most recent assistant response, in seconds
    pub last_response_secs: f64,
    /// Seconds the session has been active
    pub session_duration_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_zeroed() {
        let snapshot = MetricsSnapshot::default();
        assert_eq!(snapshot.message_count, 0);
        assert_eq!(snapshot.last_response_secs, 0.0);
        assert_eq!(snapshot.session_duration_secs, 0);
    }
}
