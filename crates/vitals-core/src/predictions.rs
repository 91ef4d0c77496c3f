//! Stress / hypoxemia predictions produced by the external inference service
//!
//! Labels are opaque: they are displayed exactly as received, and only a
//! membership check decides which presentation band the prediction falls in.

use alloc::string::String;

use crate::metrics::Severity;

/// Label written by the inference service when a vital was missing
pub const NOT_AVAILABLE: &str = "N/A";

/// Stress labels treated as high severity
const STRESS_DANGER: &[&str] = &["high"];

/// Stress labels treated as moderate severity
const STRESS_WARNING: &[&str] = &["moderate"];

/// Hypoxemia labels treated as high severity
const HYPOXEMIA_DANGER: &[&str] = &["yes", "severe", "high"];

/// Presentation band of a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionBand {
    Good,
    Warning,
    Danger,
}

impl PredictionBand {
    pub const fn severity(self) -> Severity {
        match self {
            Self::Good => Severity::Normal,
            Self::Warning => Severity::Warning,
            Self::Danger => Severity::Danger,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

/// The latest classification record
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub stress_class: String,
    pub hypoxemia_class: String,
    /// ISO-8601 time the service produced the record, if it sent one
    pub timestamp: Option<String>,
}

impl Prediction {
    pub fn new(stress_class: impl Into<String>, hypoxemia_class: impl Into<String>) -> Self {
        Self {
            stress_class: stress_class.into(),
            hypoxemia_class: hypoxemia_class.into(),
            timestamp: None,
        }
    }

    /// Danger if either label is high severity, warning if stress is moderate
    pub fn band(&self) -> PredictionBand {
        if is_one_of(&self.stress_class, STRESS_DANGER)
            || is_one_of(&self.hypoxemia_class, HYPOXEMIA_DANGER)
        {
            PredictionBand::Danger
        } else if is_one_of(&self.stress_class, STRESS_WARNING) {
            PredictionBand::Warning
        } else {
            PredictionBand::Good
        }
    }

    /// Whether the service could not classify (a vital was missing)
    pub fn is_unavailable(&self) -> bool {
        self.stress_class == NOT_AVAILABLE && self.hypoxemia_class == NOT_AVAILABLE
    }
}

fn is_one_of(label: &str, set: &[&str]) -> bool {
    let label = label.trim();
    set.iter().any(|candidate| label.eq_ignore_ascii_case(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_stress_is_danger() {
        assert_eq!(Prediction::new("High", "No").band(), PredictionBand::Danger);
        assert_eq!(Prediction::new("high", "normal").band(), PredictionBand::Danger);
    }

    #[test]
    fn test_hypoxemia_labels_are_danger() {
        assert_eq!(Prediction::new("low", "Yes").band(), PredictionBand::Danger);
        assert_eq!(Prediction::new("low", "severe").band(), PredictionBand::Danger);
    }

    #[test]
    fn test_moderate_stress_is_warning() {
        assert_eq!(Prediction::new("Moderate", "normal").band(), PredictionBand::Warning);
        assert_eq!(Prediction::new(" moderate ", "mild").band(), PredictionBand::Warning);
    }

    #[test]
    fn test_danger_wins_over_warning() {
        assert_eq!(Prediction::new("moderate", "severe").band(), PredictionBand::Danger);
    }

    #[test]
    fn test_unknown_labels_are_good_and_untouched() {
        let prediction = Prediction::new("calm-ish", "???");
        assert_eq!(prediction.band(), PredictionBand::Good);
        assert_eq!(prediction.stress_class, "calm-ish");
    }

    #[test]
    fn test_not_available() {
        let prediction = Prediction::new(NOT_AVAILABLE, NOT_AVAILABLE);
        assert!(prediction.is_unavailable());
        assert_eq!(prediction.band(), PredictionBand::Good);
    }
}
