//! Threshold classification of vital-sign readings
//!
//! All cutoffs are fixed clinical-style boundaries and are not configurable.
//! Each classifier takes a single current value; classifications that also
//! depend on history take the already-computed [`Stability`].

use crate::stats::Stability;

/// Presentation band shared by every status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Normal,
    Warning,
    Danger,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

/// Heart-rate status of the current reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartRateStatus {
    /// Below 60 bpm
    Low,
    /// 60-100 bpm inclusive
    Normal,
    /// Above 100 bpm
    High,
}

impl HeartRateStatus {
    pub fn assess(bpm: f32) -> Self {
        if bpm < 60.0 {
            Self::Low
        } else if bpm > 100.0 {
            Self::High
        } else {
            Self::Normal
        }
    }

    pub const fn severity(self) -> Severity {
        match self {
            Self::Low => Severity::Warning,
            Self::Normal => Severity::Normal,
            Self::High => Severity::Danger,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Normal => "Normal",
            Self::High => "High",
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::Low => "Heart rate is below normal range",
            Self::Normal => "Heart rate is within healthy range",
            Self::High => "Heart rate is above normal range",
        }
    }
}

/// Saturation status of the current reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpO2Status {
    /// Below 90 %
    Critical,
    /// 90 % up to (not including) 95 %
    Warning,
    /// 95 % and above
    Normal,
}

impl SpO2Status {
    pub fn assess(spo2: f32) -> Self {
        if spo2 < 90.0 {
            Self::Critical
        } else if spo2 < 95.0 {
            Self::Warning
        } else {
            Self::Normal
        }
    }

    pub const fn severity(self) -> Severity {
        match self {
            Self::Critical => Severity::Danger,
            Self::Warning => Severity::Warning,
            Self::Normal => Severity::Normal,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::Warning => "Warning",
            Self::Normal => "Normal",
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::Critical => "Oxygen level is critically low",
            Self::Warning => "Oxygen level is below normal",
            Self::Normal => "Oxygen levels are within healthy range",
        }
    }
}

/// Activity zone implied by the heart rate.
///
/// The stricter boundary is tested first so every zone is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartRateZone {
    Resting,
    Active,
    Exercise,
}

impl HeartRateZone {
    pub fn assess(bpm: f32) -> Self {
        if bpm > 120.0 {
            Self::Exercise
        } else if bpm > 100.0 {
            Self::Active
        } else {
            Self::Resting
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Resting => "Resting",
            Self::Active => "Active",
            Self::Exercise => "Exercise",
        }
    }
}

/// Signal quality of the saturation reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpO2Quality {
    Excellent,
    Good,
    Fair,
}

impl SpO2Quality {
    pub fn assess(spo2: f32, stability: Stability) -> Self {
        if spo2 >= 98.0 && stability == Stability::VeryStable {
            Self::Excellent
        } else if spo2 >= 95.0 {
            Self::Good
        } else {
            Self::Fair
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
        }
    }
}

/// Coarse wellness indicators derived from the current heart rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartRateInsights {
    /// "Moderate" above 90 bpm, else "Low"
    pub cardiac_load: &'static str,
    /// "Excellent" below 70 bpm, else "Good"
    pub recovery_index: &'static str,
    /// "High" below 65 bpm, else "Average"
    pub fitness_level: &'static str,
}

impl HeartRateInsights {
    pub fn assess(bpm: f32) -> Self {
        Self {
            cardiac_load: if bpm > 90.0 { "Moderate" } else { "Low" },
            recovery_index: if bpm < 70.0 { "Excellent" } else { "Good" },
            fitness_level: if bpm < 65.0 { "High" } else { "Average" },
        }
    }
}

/// Risk indicators derived from the current saturation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpO2RiskAssessment {
    pub hypoxemia_risk: HypoxemiaRisk,
    /// "Excellent" from 97 %, "Good" from 95 %, else "Fair"
    pub oxygen_efficiency: &'static str,
    /// "Normal" from 96 %, else "Monitor"
    pub respiratory_health: &'static str,
}

impl SpO2RiskAssessment {
    pub fn assess(spo2: f32) -> Self {
        let oxygen_efficiency = if spo2 >= 97.0 {
            "Excellent"
        } else if spo2 >= 95.0 {
            "Good"
        } else {
            "Fair"
        };

        Self {
            hypoxemia_risk: HypoxemiaRisk::assess(spo2),
            oxygen_efficiency,
            respiratory_health: if spo2 >= 96.0 { "Normal" } else { "Monitor" },
        }
    }
}

/// Hypoxemia risk from the saturation value alone (not the model prediction)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HypoxemiaRisk {
    Low,
    Moderate,
    High,
}

impl HypoxemiaRisk {
    pub fn assess(spo2: f32) -> Self {
        if spo2 < 90.0 {
            Self::High
        } else if spo2 < 94.0 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub const fn severity(self) -> Severity {
        match self {
            Self::Low => Severity::Normal,
            Self::Moderate => Severity::Warning,
            Self::High => Severity::Danger,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
        }
    }
}
