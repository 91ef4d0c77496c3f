//! Rolling-window statistics over a signal's history
//!
//! Every function here is pure and takes the signal values in arrival order
//! (as produced by [`HistoryBuffer::values`](crate::storage::HistoryBuffer::values),
//! i.e. "no signal" already coerced to 0). Insufficient input yields `None`
//! ("no data") instead of an error. Buffers hold at most a hundred readings,
//! so everything is recomputed from scratch on each new reading.

use crate::reading::SignalKind;

/// Readings compared by [`trend`]
pub const TREND_WINDOW: usize = 3;

/// Readings considered by [`variability`] and [`stability`]
pub const ANALYSIS_WINDOW: usize = 10;

/// Readings averaged for the "last hour" figure
pub const HOUR_WINDOW: usize = 60;

/// Readings averaged for the "last day" figure
pub const DAY_WINDOW: usize = 100;

/// Direction of the signal over the trend window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

impl Trend {
    /// Signal-specific wording: heart rate "increases", saturation "improves"
    pub const fn label(self, kind: SignalKind) -> &'static str {
        match (self, kind) {
            (Self::Rising, SignalKind::HeartRate) => "Increasing",
            (Self::Falling, SignalKind::HeartRate) => "Decreasing",
            (Self::Rising, SignalKind::SpO2) => "Improving",
            (Self::Falling, SignalKind::SpO2) => "Declining",
            (Self::Stable, _) => "Stable",
        }
    }
}

/// Spread of recent saturation readings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stability {
    VeryStable,
    Stable,
    Variable,
}

impl Stability {
    /// Map a max-min range onto its band
    pub fn from_range(range: f32) -> Self {
        if range <= 2.0 {
            Self::VeryStable
        } else if range <= 5.0 {
            Self::Stable
        } else {
            Self::Variable
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::VeryStable => "Very Stable",
            Self::Stable => "Stable",
            Self::Variable => "Variable",
        }
    }
}

/// Mean of the history, rounded to the nearest integer.
///
/// Saturation ignores "no signal" zeros; heart rate counts them as 0. Both
/// return `None` when no reading carries a signal.
pub fn average(kind: SignalKind, values: &[f32]) -> Option<u32> {
    let (sum, count) = if kind.averages_positive_only() {
        sum_count(positive(values))
    } else {
        if positive(values).count() == 0 {
            return None;
        }
        sum_count(values.iter().copied())
    };

    if count == 0 {
        return None;
    }
    Some(round(sum / count as f32) as u32)
}

/// Largest reading that carries a signal
pub fn max(values: &[f32]) -> Option<f32> {
    values
        .iter()
        .copied()
        .filter(|v| *v > 0.0)
        .fold(None, |acc, v| Some(acc.map_or(v, |m: f32| m.max(v))))
}

/// Smallest reading that carries a signal
pub fn min(values: &[f32]) -> Option<f32> {
    values
        .iter()
        .copied()
        .filter(|v| *v > 0.0)
        .fold(None, |acc, v| Some(acc.map_or(v, |m: f32| m.min(v))))
}

/// Compare the newest and oldest of the last [`TREND_WINDOW`] readings.
///
/// Short histories are reported as stable.
pub fn trend(kind: SignalKind, values: &[f32]) -> Trend {
    if values.len() < TREND_WINDOW {
        return Trend::Stable;
    }
    let window = tail(values, TREND_WINDOW);
    let diff = window[window.len() - 1] - window[0];
    let threshold = kind.trend_threshold();

    if diff > threshold {
        Trend::Rising
    } else if diff < -threshold {
        Trend::Falling
    } else {
        Trend::Stable
    }
}

/// Mean absolute difference between consecutive positive readings in the
/// last [`ANALYSIS_WINDOW`] readings
pub fn variability(values: &[f32]) -> Option<f32> {
    let mut previous: Option<f32> = None;
    let mut total = 0.0;
    let mut steps = 0usize;

    for value in positive(tail(values, ANALYSIS_WINDOW)) {
        if let Some(prev) = previous {
            total += (value - prev).abs();
            steps += 1;
        }
        previous = Some(value);
    }

    if steps == 0 {
        None
    } else {
        Some(total / steps as f32)
    }
}

/// Range band of the positive readings in the last [`ANALYSIS_WINDOW`].
///
/// Fewer than two qualifying readings count as stable.
pub fn stability(values: &[f32]) -> Stability {
    let recent = tail(values, ANALYSIS_WINDOW);
    if positive(recent).count() < 2 {
        return Stability::Stable;
    }
    match (max(recent), min(recent)) {
        (Some(hi), Some(lo)) => Stability::from_range(hi - lo),
        _ => Stability::Stable,
    }
}

/// Mean of the positive readings among the last `window` readings, 0 if none
pub fn windowed_average(values: &[f32], window: usize) -> f32 {
    let (sum, count) = sum_count(positive(tail(values, window)));
    if count == 0 { 0.0 } else { sum / count as f32 }
}

/// Round half away from zero; `core` has no float rounding.
pub fn round(value: f32) -> f32 {
    if value >= 0.0 {
        (value + 0.5) as i64 as f32
    } else {
        (value - 0.5) as i64 as f32
    }
}

fn tail(values: &[f32], n: usize) -> &[f32] {
    &values[values.len().saturating_sub(n)..]
}

fn positive(values: &[f32]) -> impl Iterator<Item = f32> + '_ {
    values.iter().copied().filter(|v| *v > 0.0)
}

fn sum_count(values: impl Iterator<Item = f32>) -> (f32, usize) {
    values.fold((0.0, 0), |(sum, count), v| (sum + v, count + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn test_empty_history_has_no_data() {
        assert_eq!(average(SignalKind::HeartRate, &[]), None);
        assert_eq!(average(SignalKind::SpO2, &[]), None);
        assert_eq!(max(&[]), None);
        assert_eq!(min(&[]), None);
        assert_eq!(variability(&[]), None);
        assert_eq!(windowed_average(&[], 60), 0.0);
    }

    #[test]
    fn test_all_zero_history_has_no_data() {
        let zeros = [0.0; 8];
        assert_eq!(average(SignalKind::HeartRate, &zeros), None);
        assert_eq!(average(SignalKind::SpO2, &zeros), None);
        assert_eq!(max(&zeros), None);
        assert_eq!(min(&zeros), None);
        assert_eq!(stability(&zeros), Stability::Stable);
    }

    #[test]
    fn test_rate_average_counts_zeros() {
        // (80 + 0 + 70) / 3 = 50
        assert_eq!(average(SignalKind::HeartRate, &[80.0, 0.0, 70.0]), Some(50));
    }

    #[test]
    fn test_saturation_average_skips_zeros() {
        assert_eq!(average(SignalKind::SpO2, &[96.0, 0.0, 98.0]), Some(97));
    }

    #[test]
    fn test_average_rounds_half_up() {
        assert_eq!(average(SignalKind::HeartRate, &[72.0, 73.0]), Some(73));
        assert_eq!(average(SignalKind::SpO2, &[97.0, 97.0, 98.0]), Some(97));
    }

    #[test]
    fn test_min_ignores_no_signal() {
        assert_eq!(min(&[0.0, 75.0, 64.0, 0.0]), Some(64.0));
        assert_eq!(max(&[0.0, 75.0, 64.0, 0.0]), Some(75.0));
    }

    #[test]
    fn test_trend_rate_threshold() {
        assert_eq!(trend(SignalKind::HeartRate, &[70.0, 70.0, 76.0]), Trend::Rising);
        assert_eq!(trend(SignalKind::HeartRate, &[70.0, 70.0, 74.0]), Trend::Stable);
        assert_eq!(trend(SignalKind::HeartRate, &[70.0, 70.0, 75.0]), Trend::Stable);
        assert_eq!(trend(SignalKind::HeartRate, &[80.0, 74.0, 74.0]), Trend::Falling);
    }

    #[test]
    fn test_trend_uses_last_three_only() {
        let values = [40.0, 100.0, 70.0, 71.0, 72.0];
        assert_eq!(trend(SignalKind::HeartRate, &values), Trend::Stable);
    }

    #[test]
    fn test_trend_saturation_threshold() {
        assert_eq!(trend(SignalKind::SpO2, &[95.0, 96.0, 97.0]), Trend::Rising);
        assert_eq!(trend(SignalKind::SpO2, &[97.0, 96.0, 96.0]), Trend::Stable);
        assert_eq!(trend(SignalKind::SpO2, &[98.0, 97.0, 96.0]), Trend::Falling);
        assert_eq!(Trend::Rising.label(SignalKind::SpO2), "Improving");
        assert_eq!(Trend::Falling.label(SignalKind::HeartRate), "Decreasing");
    }

    #[test]
    fn test_short_history_trend_is_stable() {
        assert_eq!(trend(SignalKind::HeartRate, &[60.0, 90.0]), Trend::Stable);
        assert_eq!(trend(SignalKind::SpO2, &[]), Trend::Stable);
    }

    #[test]
    fn test_variability_mean_absolute_difference() {
        // |74-70| + |71-74| + |75-71| = 11 over 3 steps
        let v = variability(&[70.0, 74.0, 71.0, 75.0]).unwrap();
        assert!((v - 11.0 / 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_variability_skips_zeros_and_needs_two() {
        assert_eq!(variability(&[0.0, 72.0, 0.0]), None);
        assert_eq!(variability(&[70.0, 0.0, 76.0]), Some(6.0));
    }

    #[test]
    fn test_variability_window_is_last_ten() {
        let mut values: Vec<f32> = Vec::new();
        values.push(200.0);
        values.extend([70.0; 10]);
        assert_eq!(variability(&values), Some(0.0));
    }

    #[test]
    fn test_stability_bands() {
        assert_eq!(stability(&[96.0, 97.0, 97.0, 96.0]), Stability::VeryStable);
        assert_eq!(stability(&[90.0, 96.0]), Stability::Variable);
        assert_eq!(stability(&[93.0, 98.0]), Stability::Stable);
        assert_eq!(stability(&[97.0]), Stability::Stable);
        assert_eq!(Stability::VeryStable.label(), "Very Stable");
    }

    #[test]
    fn test_windowed_average() {
        let values = [10.0, 0.0, 20.0, 30.0];
        assert_eq!(windowed_average(&values, 2), 25.0);
        assert_eq!(windowed_average(&values, 3), 25.0);
        assert_eq!(windowed_average(&values, 100), 20.0);
        assert_eq!(windowed_average(&[0.0, 0.0], 2), 0.0);
    }

    #[test]
    fn test_statistics_are_idempotent() {
        let values = [61.0, 64.0, 0.0, 90.0, 88.0];
        let first = (
            average(SignalKind::HeartRate, &values),
            max(&values),
            min(&values),
            trend(SignalKind::HeartRate, &values),
            variability(&values),
        );
        let second = (
            average(SignalKind::HeartRate, &values),
            max(&values),
            min(&values),
            trend(SignalKind::HeartRate, &values),
            variability(&values),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_round() {
        assert_eq!(round(72.5), 73.0);
        assert_eq!(round(72.49), 72.0);
        assert_eq!(round(0.0), 0.0);
    }
}
