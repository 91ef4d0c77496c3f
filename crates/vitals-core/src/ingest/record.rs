//! Raw record shapes written to the database and their normalization

use alloc::format;
use alloc::string::{String, ToString};
use serde::Deserialize;
use serde_json::Value;
use thiserror_no_std::Error;

use super::Clock;
use crate::predictions::Prediction;
use crate::reading::Reading;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("record is missing required field `{0}`")]
    MissingField(&'static str),
}

/// One sensor record as the bedside device writes it.
///
/// Every field is optional and loosely typed: the device has been seen to
/// write numbers as strings; extra fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawSensorRecord {
    #[serde(rename = "dev60_HR", default)]
    pub heart_rate: Option<Value>,
    #[serde(default)]
    pub saturation: Option<Value>,
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default)]
    pub time: Option<Value>,
}

/// The heart-rate and saturation readings carved out of one record
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSample {
    pub heart_rate: Reading,
    pub spo2: Reading,
}

impl RawSensorRecord {
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        if !value.is_object() {
            return Err(RecordError::NotAnObject);
        }
        // All fields are optional `Value`s, so an object always deserializes.
        serde_json::from_value(value).map_err(|_| RecordError::NotAnObject)
    }

    /// Heart rate in bpm, 0 when missing or not a number
    pub fn heart_rate(&self) -> f32 {
        coerce_number(self.heart_rate.as_ref())
    }

    /// Saturation in percent, 0 when missing or not a number
    pub fn saturation(&self) -> f32 {
        coerce_number(self.saturation.as_ref())
    }

    /// `"{date} {time}"` trimmed, or `None` if both are absent or blank
    pub fn device_label(&self) -> Option<String> {
        let date = text(self.date.as_ref());
        let time = text(self.time.as_ref());
        let label = format!("{date} {time}");
        let label = label.trim();
        if label.is_empty() {
            None
        } else {
            Some(label.to_string())
        }
    }

    /// Build the reading pair, stamping it with the receipt time
    pub fn normalize(&self, clock: &impl Clock) -> SensorSample {
        let timestamp = clock.now_iso8601();
        let label = self.device_label().unwrap_or_else(|| clock.now_label());

        SensorSample {
            heart_rate: Reading::new(self.heart_rate(), timestamp.clone(), label.clone()),
            spo2: Reading::new(self.saturation(), timestamp, label),
        }
    }
}

/// One record written by the prediction service
#[derive(Debug, Clone, PartialEq)]
pub struct RawPrediction {
    pub stress_class: String,
    pub hypoxemia_class: String,
    pub timestamp: Option<String>,
}

impl RawPrediction {
    /// Both class labels must be present; their values are not validated.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        let object = value.as_object().ok_or(RecordError::NotAnObject)?;
        let field = |name: &'static str| {
            object
                .get(name)
                .filter(|v| !v.is_null())
                .map(|v| text(Some(v)))
                .ok_or(RecordError::MissingField(name))
        };

        Ok(Self {
            stress_class: field("stress_class")?,
            hypoxemia_class: field("hypoxemia_class")?,
            timestamp: object
                .get("timestamp")
                .and_then(Value::as_str)
                .map(String::from),
        })
    }

    pub fn into_prediction(self) -> Prediction {
        Prediction {
            stress_class: self.stress_class,
            hypoxemia_class: self.hypoxemia_class,
            timestamp: self.timestamp,
        }
    }
}

/// Parse a loosely typed numeric field; anything unparseable is 0.
fn coerce_number(value: Option<&Value>) -> f32 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => v as f32,
        _ => 0.0,
    }
}

/// Render a loosely typed text field the way it would print
fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FixedClock;

    impl Clock for FixedClock {
        fn now_iso8601(&self) -> String {
            "2025-03-01T08:30:00.000Z".into()
        }

        fn now_label(&self) -> String {
            "8:30:00 AM".into()
        }
    }

    #[test]
    fn test_numbers_and_numeric_strings() {
        let record = RawSensorRecord::from_value(json!({
            "dev60_HR": "78",
            "saturation": 97.5,
            "RR": 16,
        }))
        .unwrap();
        assert_eq!(record.heart_rate(), 78.0);
        assert_eq!(record.saturation(), 97.5);
    }

    #[test]
    fn test_missing_or_garbage_is_zero() {
        let record = RawSensorRecord::from_value(json!({
            "dev60_HR": "abc",
            "saturation": null,
        }))
        .unwrap();
        assert_eq!(record.heart_rate(), 0.0);
        assert_eq!(record.saturation(), 0.0);

        let empty = RawSensorRecord::from_value(json!({})).unwrap();
        assert_eq!(empty.heart_rate(), 0.0);
        assert_eq!(RawSensorRecord::from_value(json!({ "dev60_HR": "" })).unwrap().heart_rate(), 0.0);
    }

    #[test]
    fn test_label_prefers_device_date_time() {
        let record = RawSensorRecord::from_value(json!({
            "dev60_HR": 70,
            "date": "2025-03-01",
            "time": "08:29:58",
        }))
        .unwrap();
        let sample = record.normalize(&FixedClock);
        assert_eq!(sample.heart_rate.label(), "2025-03-01 08:29:58");
        assert_eq!(sample.spo2.label(), "2025-03-01 08:29:58");
        assert_eq!(sample.heart_rate.timestamp(), "2025-03-01T08:30:00.000Z");
    }

    #[test]
    fn test_label_trims_single_field() {
        let record = RawSensorRecord::from_value(json!({ "time": "08:29:58" })).unwrap();
        assert_eq!(record.device_label().as_deref(), Some("08:29:58"));
    }

    #[test]
    fn test_label_falls_back_to_clock() {
        let record = RawSensorRecord::from_value(json!({ "dev60_HR": 70, "date": "  " })).unwrap();
        let sample = record.normalize(&FixedClock);
        assert_eq!(sample.heart_rate.label(), "8:30:00 AM");
    }

    #[test]
    fn test_non_object_sensor_record() {
        assert_eq!(
            RawSensorRecord::from_value(json!(72)),
            Err(RecordError::NotAnObject)
        );
    }

    #[test]
    fn test_prediction_requires_both_labels() {
        let prediction = RawPrediction::from_value(json!({
            "stress_class": "moderate",
            "hypoxemia_class": "normal",
            "timestamp": "2025-03-01T08:30:01",
        }))
        .unwrap();
        assert_eq!(prediction.stress_class, "moderate");
        assert_eq!(prediction.timestamp.as_deref(), Some("2025-03-01T08:30:01"));

        assert_eq!(
            RawPrediction::from_value(json!({ "stress_class": "low" })),
            Err(RecordError::MissingField("hypoxemia_class"))
        );
    }

    #[test]
    fn test_prediction_numeric_label_is_stringified() {
        let prediction = RawPrediction::from_value(json!({
            "stress_class": 2,
            "hypoxemia_class": "N/A",
        }))
        .unwrap();
        assert_eq!(prediction.stress_class, "2");
        assert!(prediction.timestamp.is_none());
    }
}
