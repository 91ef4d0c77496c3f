//! Feed settings read from the environment.
//!
//! A `.env` file in the working directory is loaded first, so a local
//! setup can be kept out of the shell profile:
//!
//! ```text
//! VITALS_DATABASE_URL=https://example-default-rtdb.firebaseio.com
//! VITALS_AUTH=<database secret or ID token>
//! VITALS_SENSOR_PATH=SensorData
//! VITALS_PREDICTIONS_PATH=predictions
//! ```
//!
//! Without `VITALS_DATABASE_URL` the simulator generates its own data.

use log::{debug, info};
use vitals_core::config::FeedConfig;

pub const DATABASE_URL_VAR: &str = "VITALS_DATABASE_URL";
pub const AUTH_VAR: &str = "VITALS_AUTH";
pub const SENSOR_PATH_VAR: &str = "VITALS_SENSOR_PATH";
pub const PREDICTIONS_PATH_VAR: &str = "VITALS_PREDICTIONS_PATH";

/// Owned copy of the feed settings; borrow it as a [`FeedConfig`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub auth: Option<String>,
    pub sensor_path: Option<String>,
    pub predictions_path: Option<String>,
}

impl Settings {
    /// Load `.env` (if any) and read the process environment
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => info!("Loaded settings from {}", path.display()),
            Err(e) if e.not_found() => debug!("No .env file"),
            Err(e) => log::warn!("Ignoring unreadable .env: {}", e),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        Self {
            database_url: get(DATABASE_URL_VAR).unwrap_or_default(),
            auth: get(AUTH_VAR),
            sensor_path: get(SENSOR_PATH_VAR),
            predictions_path: get(PREDICTIONS_PATH_VAR),
        }
    }

    pub fn feed_config(&self) -> FeedConfig<'_> {
        let defaults = FeedConfig::default();
        FeedConfig {
            database_url: &self.database_url,
            auth: self.auth.as_deref(),
            sensor_path: self.sensor_path.as_deref().unwrap_or(defaults.sensor_path),
            predictions_path: self
                .predictions_path
                .as_deref()
                .unwrap_or(defaults.predictions_path),
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use vitals_core::feed::FeedKind;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_empty_environment_is_offline() {
        let settings = Settings::from_lookup(lookup(&[]));
        let config = settings.feed_config();
        assert!(!config.is_live());
        assert_eq!(config.path(FeedKind::SensorData), "SensorData");
        assert_eq!(config.path(FeedKind::Predictions), "predictions");
        assert!(config.auth.is_none());
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            (DATABASE_URL_VAR, " https://vitals-default-rtdb.firebaseio.com "),
            (AUTH_VAR, "token"),
            (SENSOR_PATH_VAR, "ward/bed4/SensorData"),
            (PREDICTIONS_PATH_VAR, ""),
        ]));
        let config = settings.feed_config();
        assert!(config.is_live());
        assert_eq!(config.database_url, "https://vitals-default-rtdb.firebaseio.com");
        assert_eq!(config.auth, Some("token"));
        assert_eq!(config.path(FeedKind::SensorData), "ward/bed4/SensorData");
        assert_eq!(config.path(FeedKind::Predictions), "predictions");
        assert_eq!(config.limit(FeedKind::SensorData), 100);
    }
}
