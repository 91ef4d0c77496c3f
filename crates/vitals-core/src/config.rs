use serde::{Deserialize, Serialize};

use crate::feed::FeedKind;

/// Number of sensor records requested from the database when subscribing.
pub const DEFAULT_SENSOR_LIMIT: usize = crate::storage::REPORT_CAPACITY;

/// Only the newest prediction is ever displayed.
pub const DEFAULT_PREDICTION_LIMIT: usize = 1;

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct Config<'a> {
    pub feed: FeedConfig<'a>,
}

/// Where the real-time database lives and which nodes to stream.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct FeedConfig<'a> {
    /// Base URL, e.g. `https://example-default-rtdb.firebaseio.com`.
    /// Empty means no live database is configured.
    pub database_url: &'a str,
    pub sensor_path: &'a str,
    pub predictions_path: &'a str,
    /// Optional database secret or ID token appended as `auth=`.
    #[serde(borrow)]
    pub auth: Option<&'a str>,
    pub sensor_limit: usize,
    pub prediction_limit: usize,
}

impl Default for FeedConfig<'_> {
    fn default() -> Self {
        Self {
            database_url: "",
            sensor_path: "SensorData",
            predictions_path: "predictions",
            auth: None,
            sensor_limit: DEFAULT_SENSOR_LIMIT,
            prediction_limit: DEFAULT_PREDICTION_LIMIT,
        }
    }
}

impl FeedConfig<'_> {
    pub fn is_live(&self) -> bool {
        !self.database_url.trim().is_empty()
    }

    pub fn path(&self, feed: FeedKind) -> &str {
        match feed {
            FeedKind::SensorData => self.sensor_path,
            FeedKind::Predictions => self.predictions_path,
        }
    }

    pub fn limit(&self, feed: FeedKind) -> usize {
        match feed {
            FeedKind::SensorData => self.sensor_limit,
            FeedKind::Predictions => self.prediction_limit,
        }
    }
}
