//! Wall-clock time for stamping readings.

use chrono::{Local, SecondsFormat, Utc};
use vitals_core::ingest::Clock;

/// Host clock backed by `chrono`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_iso8601(&self) -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Local time of day, e.g. `8:30:00 AM`
    fn now_label(&self) -> String {
        Local::now().format("%-I:%M:%S %p").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_is_utc_millis() {
        let stamp = SystemClock.now_iso8601();
        assert!(stamp.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&stamp).is_ok());
        // 2025-03-01T08:30:00.000Z
        assert_eq!(stamp.len(), 24);
    }

    #[test]
    fn test_label_has_meridiem() {
        let label = SystemClock.now_label();
        assert!(label.ends_with("AM") || label.ends_with("PM"));
    }
}
