//! Readings and the physiological signals they belong to

use alloc::string::String;

/// The two signals streamed by the bedside sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// Heart rate in beats per minute (a "rate" signal).
    HeartRate,
    /// Blood oxygen saturation in percent (a "saturation" signal).
    SpO2,
}

impl SignalKind {
    /// Human-readable name of the signal
    pub const fn name(self) -> &'static str {
        match self {
            Self::HeartRate => "Heart Rate",
            Self::SpO2 => "SpO2",
        }
    }

    /// Display unit, including the leading space where one is wanted
    pub const fn unit(self) -> &'static str {
        match self {
            Self::HeartRate => " bpm",
            Self::SpO2 => "%",
        }
    }

    /// Gauge full-scale value
    pub const fn gauge_max(self) -> f32 {
        match self {
            Self::HeartRate => 160.0,
            Self::SpO2 => 100.0,
        }
    }

    /// Minimum change across the trend window that counts as a trend
    pub const fn trend_threshold(self) -> f32 {
        match self {
            Self::HeartRate => 5.0,
            Self::SpO2 => 1.0,
        }
    }

    /// Whether non-positive readings are excluded from the average.
    ///
    /// Saturation averages skip "no signal" zeros; heart-rate averages count
    /// them.
    pub const fn averages_positive_only(self) -> bool {
        matches!(self, Self::SpO2)
    }
}

/// One timestamped observation of a signal.
///
/// Readings are immutable once built. Ordering between readings comes from
/// arrival order, never from `timestamp` or `label`.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    value: f32,
    timestamp: String,
    label: String,
}

impl Reading {
    pub fn new(value: f32, timestamp: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: sanitize(value),
            timestamp: timestamp.into(),
            label: label.into(),
        }
    }

    /// Raw measured value (0 means "no signal")
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Value with missing or non-positive readings coerced to 0
    pub fn signal_value(&self) -> f32 {
        if self.value > 0.0 { self.value } else { 0.0 }
    }

    /// Whether this reading carries an actual measurement
    pub fn has_signal(&self) -> bool {
        self.value > 0.0
    }

    /// ISO-8601 receipt time
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Display label (device date/time or local receipt time)
    pub fn label(&self) -> &str {
        &self.label
    }
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_finite_values_become_zero() {
        assert_eq!(Reading::new(f32::NAN, "", "").value(), 0.0);
        assert_eq!(Reading::new(f32::INFINITY, "", "").value(), 0.0);
    }

    #[test]
    fn test_signal_value_clamps_negative() {
        let reading = Reading::new(-4.0, "2025-01-01T00:00:00Z", "00:00:00");
        assert_eq!(reading.value(), -4.0);
        assert_eq!(reading.signal_value(), 0.0);
        assert!(!reading.has_signal());
    }

    #[test]
    fn test_signal_thresholds() {
        assert_eq!(SignalKind::HeartRate.trend_threshold(), 5.0);
        assert_eq!(SignalKind::SpO2.trend_threshold(), 1.0);
        assert!(SignalKind::SpO2.averages_positive_only());
        assert!(!SignalKind::HeartRate.averages_positive_only());
    }
}
