//! Synthetic feeds for running the dashboard without a database.
//!
//! Records are shaped like the ones the bedside device writes: `dev60_HR`
//! and `saturation` sometimes arrive as numeric strings, a zero marks a
//! dropped finger sensor, and `date` / `time` carry the device clock.
//! Predictions mimic the inference service, labelling `N/A` whenever a
//! vital is missing.

use chrono::Local;
use serde_json::{Value, json};
use vitals_core::feed::{ConnectionState, FeedMessage, SubscriptionHandle};
use vitals_core::predictions::NOT_AVAILABLE;

/// One prediction per this many sensor records
pub const PREDICTION_EVERY: u64 = 10;

/// Every this many records the finger sensor reports no signal
const DROPOUT_EVERY: u64 = 23;

/// Generates sensor and prediction records that vary over time.
pub struct MockFeed {
    sensor: SubscriptionHandle,
    predictions: SubscriptionHandle,
    elapsed_secs: f64,
    samples: u64,
}

impl MockFeed {
    pub fn new(sensor: SubscriptionHandle, predictions: SubscriptionHandle) -> Self {
        Self {
            sensor,
            predictions,
            elapsed_secs: 0.0,
            samples: 0,
        }
    }

    /// Both feeds report live immediately
    pub fn connect(&self) -> Vec<FeedMessage> {
        vec![
            self.sensor.connection(ConnectionState::Connected),
            self.predictions.connection(ConnectionState::Connected),
        ]
    }

    /// Advance the fake clock and return the next sensor record, followed by
    /// a prediction for it every [`PREDICTION_EVERY`] records.
    pub fn next_messages(&mut self, dt_secs: f64) -> Vec<FeedMessage> {
        self.elapsed_secs += dt_secs;
        self.samples += 1;

        let (heart_rate, spo2) = self.vitals();
        let mut messages = vec![self.sensor.record(self.sensor_record(heart_rate, spo2))];
        if self.samples % PREDICTION_EVERY == 0 {
            messages.push(self.predictions.record(prediction_record(heart_rate, spo2)));
        }
        messages
    }

    fn vitals(&self) -> (f32, f32) {
        if self.samples % DROPOUT_EVERY == 0 {
            return (0.0, 0.0);
        }
        let t = self.elapsed_secs;

        // Heart rate: 60-100 bpm with a slow swing and breathing ripple
        let heart_rate = 80.0 + 16.0 * (t / 45.0).sin() + 4.0 * (t / 7.0).cos();

        // SpO2: mostly 94-99 %, with an occasional dip
        let spo2 = (96.5 + 2.0 * (t / 90.0).sin() + 0.6 * (t / 11.0).cos()).min(100.0);

        ((heart_rate * 10.0).round() as f32 / 10.0, (spo2 * 10.0).round() as f32 / 10.0)
    }

    fn sensor_record(&self, heart_rate: f32, spo2: f32) -> Value {
        let now = Local::now();
        let (heart_rate, saturation) = if self.samples % 3 == 0 {
            (json!(format!("{heart_rate:.1}")), json!(format!("{spo2:.1}")))
        } else {
            (json!(heart_rate), json!(spo2))
        };
        json!({
            "dev60_HR": heart_rate,
            "saturation": saturation,
            "date": now.format("%Y-%m-%d").to_string(),
            "time": now.format("%H:%M:%S").to_string(),
        })
    }
}

/// Classify a pair of vitals the way the inference service labels them
pub fn prediction_record(heart_rate: f32, spo2: f32) -> Value {
    let (stress, hypoxemia) = if heart_rate == 0.0 || spo2 == 0.0 {
        (NOT_AVAILABLE, NOT_AVAILABLE)
    } else {
        (stress_class(heart_rate), hypoxemia_class(spo2))
    };
    json!({
        "stress_class": stress,
        "hypoxemia_class": hypoxemia,
        "timestamp": Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
    })
}

fn stress_class(heart_rate: f32) -> &'static str {
    if heart_rate > 100.0 {
        "high"
    } else if heart_rate > 85.0 {
        "moderate"
    } else {
        "low"
    }
}

fn hypoxemia_class(spo2: f32) -> &'static str {
    if spo2 < 90.0 {
        "severe"
    } else if spo2 < 95.0 {
        "mild"
    } else {
        "normal"
    }
}
