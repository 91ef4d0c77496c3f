//! Session state of the monitoring dashboard
//!
//! [`Monitor`] is the single owner of every buffer, the latest values, the
//! current prediction and the feed subscriptions. It is created empty when
//! the session starts and is only ever mutated by the UI loop, one message at
//! a time.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use log::{debug, warn};

use crate::feed::{ConnectionState, FeedKind, FeedMessage, SubscriptionHandle, Subscriptions};
use crate::ingest::{Clock, RawPrediction, RawSensorRecord, SensorSample};
use crate::metrics::{
    HeartRateInsights, HeartRateStatus, HeartRateZone, SpO2Quality, SpO2RiskAssessment, SpO2Status,
};
use crate::predictions::{Prediction, PredictionBand};
use crate::reading::{Reading, SignalKind};
use crate::stats::{self, DAY_WINDOW, HOUR_WINDOW, Stability, Trend};
use crate::storage::{ChartHistory, LatestValues, ReportHistory};
use crate::ui::core::PageEvent;

/// Readings listed under "recent readings" on a report
pub const RECENT_READINGS: usize = 10;

/// Everything the heart-rate report shows
#[derive(Debug, Clone, PartialEq)]
pub struct HeartRateReport {
    /// Latest bpm, 0 when there is no signal
    pub current: f32,
    pub average: Option<u32>,
    /// Peak bpm
    pub max: Option<f32>,
    /// Lowest bpm
    pub min: Option<f32>,
    pub status: HeartRateStatus,
    pub trend: Trend,
    pub variability: Option<f32>,
    pub zone: HeartRateZone,
    pub hour_average: f32,
    pub day_average: f32,
    pub insights: HeartRateInsights,
    /// Newest first
    pub recent: Vec<Reading>,
    pub readings: usize,
}

/// Everything the saturation report shows
#[derive(Debug, Clone, PartialEq)]
pub struct SpO2Report {
    pub current: f32,
    pub average: Option<u32>,
    pub max: Option<f32>,
    pub min: Option<f32>,
    pub status: SpO2Status,
    pub trend: Trend,
    pub stability: Stability,
    pub quality: SpO2Quality,
    pub hour_average: f32,
    pub day_average: f32,
    pub risk: SpO2RiskAssessment,
    pub recent: Vec<Reading>,
    pub readings: usize,
}

/// The current prediction and its presentation band
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionView {
    pub prediction: Prediction,
    pub band: PredictionBand,
}

impl PredictionView {
    pub fn new(prediction: Prediction) -> Self {
        let band = prediction.band();
        Self { prediction, band }
    }
}

/// Dashboard figures
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub latest: LatestValues,
    pub heart_rate_status: HeartRateStatus,
    pub spo2_status: SpO2Status,
    /// Display label of the newest reading
    pub last_label: Option<String>,
    pub heart_rate_average: Option<u32>,
    pub spo2_average: Option<u32>,
    /// Chart points, oldest first
    pub heart_rate_chart: Vec<f32>,
    pub spo2_chart: Vec<f32>,
    pub prediction: Option<PredictionView>,
    pub sensor_connection: ConnectionState,
    pub prediction_connection: ConnectionState,
    pub readings: usize,
}

/// Recomputed figures after one sensor record
#[derive(Debug, Clone, PartialEq)]
pub struct VitalsUpdate {
    pub overview: Overview,
    pub heart_rate: HeartRateReport,
    pub spo2: SpO2Report,
}

pub struct Monitor {
    heart_rate: ReportHistory,
    spo2: ReportHistory,
    heart_rate_chart: ChartHistory,
    spo2_chart: ChartHistory,
    latest: LatestValues,
    prediction: Option<Prediction>,
    sensor_connection: ConnectionState,
    prediction_connection: ConnectionState,
    subscriptions: Subscriptions,
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new()
    }
}

impl Monitor {
    pub fn new() -> Self {
        Self {
            heart_rate: ReportHistory::new(),
            spo2: ReportHistory::new(),
            heart_rate_chart: ChartHistory::new(),
            spo2_chart: ChartHistory::new(),
            latest: LatestValues::default(),
            prediction: None,
            sensor_connection: ConnectionState::default(),
            prediction_connection: ConnectionState::default(),
            subscriptions: Subscriptions::new(),
        }
    }

    /// Start (or restart) a feed subscription; messages from any earlier
    /// subscription to the same feed are ignored from now on.
    pub fn subscribe(&mut self, feed: FeedKind) -> SubscriptionHandle {
        self.set_connection(feed, ConnectionState::Connecting);
        self.subscriptions.subscribe(feed)
    }

    pub fn release(&mut self, handle: SubscriptionHandle) -> bool {
        self.subscriptions.release(handle)
    }

    pub fn subscriptions(&self) -> &Subscriptions {
        &self.subscriptions
    }

    /// Dispatch one feed message.
    ///
    /// Returns the event to forward to the active page, or `None` when the
    /// message was stale or unusable.
    pub fn apply(&mut self, message: FeedMessage, clock: &impl Clock) -> Option<PageEvent> {
        let feed = message.feed();
        if !self.subscriptions.is_current(feed, message.generation()) {
            debug!(
                "Dropping {} message from stale subscription #{}",
                feed.name(),
                message.generation()
            );
            return None;
        }

        match message {
            FeedMessage::Sensor { record, .. } => match RawSensorRecord::from_value(record) {
                Ok(record) => Some(PageEvent::Vitals(Box::new(self.ingest_sensor(&record, clock)))),
                Err(e) => {
                    warn!("Skipping sensor record: {}", e);
                    None
                }
            },
            FeedMessage::Prediction { record, .. } => match RawPrediction::from_value(record) {
                Ok(record) => Some(PageEvent::Prediction(self.ingest_prediction(record))),
                Err(e) => {
                    warn!("Skipping prediction: {}", e);
                    None
                }
            },
            FeedMessage::Connection { feed, state, .. } => {
                self.set_connection(feed, state);
                Some(PageEvent::FeedHealth { feed, state })
            }
        }
    }

    /// Normalize one sensor record and fold it into every buffer
    pub fn ingest_sensor(&mut self, record: &RawSensorRecord, clock: &impl Clock) -> VitalsUpdate {
        let SensorSample { heart_rate, spo2 } = record.normalize(clock);
        debug!(
            "Ingesting reading {}: {} bpm, {}%",
            heart_rate.label(),
            heart_rate.value(),
            spo2.value()
        );

        self.latest.update(heart_rate.value(), spo2.value());
        self.heart_rate_chart.append(heart_rate.clone());
        self.spo2_chart.append(spo2.clone());
        self.heart_rate.append(heart_rate);
        self.spo2.append(spo2);

        VitalsUpdate {
            overview: self.overview(),
            heart_rate: self.heart_rate_report(),
            spo2: self.spo2_report(),
        }
    }

    /// Replace the current prediction
    pub fn ingest_prediction(&mut self, record: RawPrediction) -> PredictionView {
        let view = PredictionView::new(record.into_prediction());
        debug!(
            "Prediction stress={} hypoxemia={} -> {}",
            view.prediction.stress_class,
            view.prediction.hypoxemia_class,
            view.band.label()
        );
        self.prediction = Some(view.prediction.clone());
        view
    }

    pub fn latest(&self) -> LatestValues {
        self.latest
    }

    pub fn prediction(&self) -> Option<PredictionView> {
        self.prediction.clone().map(PredictionView::new)
    }

    pub fn connection(&self, feed: FeedKind) -> ConnectionState {
        match feed {
            FeedKind::SensorData => self.sensor_connection,
            FeedKind::Predictions => self.prediction_connection,
        }
    }

    fn set_connection(&mut self, feed: FeedKind, state: ConnectionState) {
        match feed {
            FeedKind::SensorData => self.sensor_connection = state,
            FeedKind::Predictions => self.prediction_connection = state,
        }
    }

    pub fn heart_rate_history(&self) -> &ReportHistory {
        &self.heart_rate
    }

    pub fn spo2_history(&self) -> &ReportHistory {
        &self.spo2
    }

    pub fn heart_rate_report(&self) -> HeartRateReport {
        let values: Vec<f32> = self.heart_rate.values().collect();
        let current = self.latest.bpm.max(0.0);

        HeartRateReport {
            current,
            average: stats::average(SignalKind::HeartRate, &values),
            max: stats::max(&values),
            min: stats::min(&values),
            status: HeartRateStatus::assess(current),
            trend: stats::trend(SignalKind::HeartRate, &values),
            variability: stats::variability(&values),
            zone: HeartRateZone::assess(current),
            hour_average: stats::windowed_average(&values, HOUR_WINDOW),
            day_average: stats::windowed_average(&values, DAY_WINDOW),
            insights: HeartRateInsights::assess(current),
            recent: self.heart_rate.recent(RECENT_READINGS).cloned().collect(),
            readings: values.len(),
        }
    }

    pub fn spo2_report(&self) -> SpO2Report {
        let values: Vec<f32> = self.spo2.values().collect();
        let current = self.latest.spo2;
        let stability = stats::stability(&values);

        SpO2Report {
            current,
            average: stats::average(SignalKind::SpO2, &values),
            max: stats::max(&values),
            min: stats::min(&values),
            status: SpO2Status::assess(current),
            trend: stats::trend(SignalKind::SpO2, &values),
            stability,
            quality: SpO2Quality::assess(current, stability),
            hour_average: stats::windowed_average(&values, HOUR_WINDOW),
            day_average: stats::windowed_average(&values, DAY_WINDOW),
            risk: SpO2RiskAssessment::assess(current),
            recent: self.spo2.recent(RECENT_READINGS).cloned().collect(),
            readings: values.len(),
        }
    }

    pub fn overview(&self) -> Overview {
        let heart_rate: Vec<f32> = self.heart_rate.values().collect();
        let spo2: Vec<f32> = self.spo2.values().collect();

        Overview {
            latest: self.latest,
            heart_rate_status: HeartRateStatus::assess(self.latest.bpm),
            spo2_status: SpO2Status::assess(self.latest.spo2),
            last_label: self.heart_rate.latest().map(|r| String::from(r.label())),
            heart_rate_average: stats::average(SignalKind::HeartRate, &heart_rate),
            spo2_average: stats::average(SignalKind::SpO2, &spo2),
            heart_rate_chart: self.heart_rate_chart.values().collect(),
            spo2_chart: self.spo2_chart.values().collect(),
            prediction: self.prediction(),
            sensor_connection: self.sensor_connection,
            prediction_connection: self.prediction_connection,
            readings: self.heart_rate.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::HistoryBuffer;
    use alloc::format;
    use serde_json::json;

    struct TestClock;

    impl Clock for TestClock {
        fn now_iso8601(&self) -> String {
            "2025-03-01T08:30:00.000Z".into()
        }

        fn now_label(&self) -> String {
            "8:30:00 AM".into()
        }
    }

    fn sensor(bpm: f32, spo2: f32) -> RawSensorRecord {
        RawSensorRecord::from_value(json!({ "dev60_HR": bpm, "saturation": spo2 })).unwrap()
    }

    #[test]
    fn test_rolling_window_end_to_end() {
        let mut buffer = HistoryBuffer::<10>::new();
        for i in 0..12 {
            let record = sensor(60.0 + 2.0 * i as f32, 97.0);
            buffer.append(record.normalize(&TestClock).heart_rate);
        }

        let values: Vec<f32> = buffer.values().collect();
        assert_eq!(values.len(), 10);
        assert_eq!(values.first(), Some(&64.0));
        assert_eq!(values.last(), Some(&82.0));
        assert_eq!(stats::average(SignalKind::HeartRate, &values), Some(73));
        assert_eq!(stats::max(&values), Some(82.0));
        assert_eq!(stats::min(&values), Some(64.0));
        // 82 - 78 = 4 does not clear the 5 bpm threshold
        assert_eq!(stats::trend(SignalKind::HeartRate, &values), Trend::Stable);
    }

    #[test]
    fn test_steeper_ramp_trends_upward() {
        let mut monitor = Monitor::new();
        for bpm in [60.0, 63.0, 66.0, 69.0] {
            monitor.ingest_sensor(&sensor(bpm, 97.0), &TestClock);
        }
        let report = monitor.heart_rate_report();
        assert_eq!(report.trend, Trend::Rising);
        assert_eq!(report.trend.label(SignalKind::HeartRate), "Increasing");
    }

    #[test]
    fn test_empty_monitor_reports_no_data() {
        let monitor = Monitor::new();
        let report = monitor.heart_rate_report();
        assert_eq!(report.average, None);
        assert_eq!(report.max, None);
        assert_eq!(report.readings, 0);
        assert!(report.recent.is_empty());

        let overview = monitor.overview();
        assert_eq!(overview.last_label, None);
        assert_eq!(overview.sensor_connection, ConnectionState::Connecting);
    }

    #[test]
    fn test_latest_values_follow_last_reading() {
        let mut monitor = Monitor::new();
        monitor.ingest_sensor(&sensor(72.0, 97.0), &TestClock);
        let update = monitor.ingest_sensor(&sensor(88.0, 0.0), &TestClock);

        assert_eq!(update.overview.latest, LatestValues { bpm: 88.0, spo2: 0.0 });
        assert_eq!(update.spo2.current, 0.0);
        // SpO2 average skips the no-signal reading
        assert_eq!(update.spo2.average, Some(97));
        assert_eq!(update.heart_rate.recent[0].value(), 88.0);
    }

    #[test]
    fn test_chart_buffers_cap_at_thirty() {
        let mut monitor = Monitor::new();
        let mut update = None;
        for i in 0..45 {
            update = Some(monitor.ingest_sensor(&sensor(60.0 + i as f32, 97.0), &TestClock));
        }
        let overview = update.unwrap().overview;
        assert_eq!(overview.heart_rate_chart.len(), 30);
        assert_eq!(overview.heart_rate_chart[0], 75.0);
        assert_eq!(overview.spo2_chart.len(), 30);
        assert_eq!(overview.readings, 45);
    }

    #[test]
    fn test_report_history_caps_at_hundred() {
        let mut monitor = Monitor::new();
        for i in 0..130 {
            monitor.ingest_sensor(&sensor(50.0 + (i % 40) as f32, 95.0), &TestClock);
        }
        assert_eq!(monitor.heart_rate_history().len(), 100);
        assert_eq!(monitor.spo2_history().len(), 100);
        assert_eq!(monitor.heart_rate_report().recent.len(), RECENT_READINGS);
    }

    #[test]
    fn test_apply_drops_stale_generation() {
        let mut monitor = Monitor::new();
        let old = monitor.subscribe(FeedKind::SensorData);
        let current = monitor.subscribe(FeedKind::SensorData);

        let stale = old.record(json!({ "dev60_HR": 70, "saturation": 97 }));
        assert!(monitor.apply(stale, &TestClock).is_none());
        assert!(monitor.heart_rate_history().is_empty());

        let fresh = current.record(json!({ "dev60_HR": 71, "saturation": 97 }));
        assert!(matches!(
            monitor.apply(fresh, &TestClock),
            Some(PageEvent::Vitals(_))
        ));
        assert_eq!(monitor.latest().bpm, 71.0);
    }

    #[test]
    fn test_apply_without_subscription_is_ignored() {
        let mut monitor = Monitor::new();
        let message = FeedMessage::Prediction {
            generation: 1,
            record: json!({ "stress_class": "high", "hypoxemia_class": "normal" }),
        };
        assert!(monitor.apply(message, &TestClock).is_none());
        assert!(monitor.prediction().is_none());
    }

    #[test]
    fn test_apply_prediction_replaces_current() {
        let mut monitor = Monitor::new();
        let handle = monitor.subscribe(FeedKind::Predictions);

        let first = handle.record(json!({ "stress_class": "low", "hypoxemia_class": "normal" }));
        monitor.apply(first, &TestClock);
        let second = handle.record(json!({ "stress_class": "Moderate", "hypoxemia_class": "mild" }));
        let event = monitor.apply(second, &TestClock);

        match event {
            Some(PageEvent::Prediction(view)) => assert_eq!(view.band, PredictionBand::Warning),
            other => panic!("unexpected event {:?}", other),
        }
        let current = monitor.prediction().unwrap();
        assert_eq!(current.prediction.stress_class, "Moderate");
    }

    #[test]
    fn test_invalid_prediction_keeps_previous() {
        let mut monitor = Monitor::new();
        let handle = monitor.subscribe(FeedKind::Predictions);
        monitor.apply(
            handle.record(json!({ "stress_class": "high", "hypoxemia_class": "normal" })),
            &TestClock,
        );

        let broken = handle.record(json!({ "stress_class": "low" }));
        assert!(monitor.apply(broken, &TestClock).is_none());
        assert_eq!(monitor.prediction().unwrap().band, PredictionBand::Danger);
    }

    #[test]
    fn test_connection_messages_update_health() {
        let mut monitor = Monitor::new();
        let handle = monitor.subscribe(FeedKind::SensorData);
        let event = monitor.apply(handle.connection(ConnectionState::Connected), &TestClock);

        assert!(matches!(
            event,
            Some(PageEvent::FeedHealth {
                feed: FeedKind::SensorData,
                state: ConnectionState::Connected,
            })
        ));
        assert_eq!(monitor.connection(FeedKind::SensorData), ConnectionState::Connected);
        assert_eq!(monitor.connection(FeedKind::Predictions), ConnectionState::Connecting);

        monitor.subscribe(FeedKind::SensorData);
        assert_eq!(monitor.connection(FeedKind::SensorData), ConnectionState::Connecting);
    }

    #[test]
    fn test_reports_are_idempotent() {
        let mut monitor = Monitor::new();
        for (i, spo2) in [96.0, 97.0, 0.0, 98.0].into_iter().enumerate() {
            let record = RawSensorRecord::from_value(json!({
                "dev60_HR": 70 + i,
                "saturation": spo2,
                "time": format!("08:30:0{i}"),
            }))
            .unwrap();
            monitor.ingest_sensor(&record, &TestClock);
        }
        assert_eq!(monitor.spo2_report(), monitor.spo2_report());
        assert_eq!(monitor.overview().last_label.as_deref(), Some("08:30:03"));
        assert_eq!(monitor.spo2_report().stability, Stability::VeryStable);
    }
}
