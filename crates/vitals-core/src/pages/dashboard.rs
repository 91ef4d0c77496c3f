//! Live dashboard: both gauges, their charts, the latest prediction and the
//! health of each feed.

use alloc::format;
use alloc::string::String;
use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{
    Circle, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle, RoundedRectangle,
};
use embedded_graphics::text::Alignment;

use crate::feed::{ConnectionState, FeedKind};
use crate::monitor::{Overview, PredictionView};
use crate::pages::page::Page;
use crate::reading::SignalKind;
use crate::ui::components::text::draw_text;
use crate::ui::core::{Action, Drawable, PageEvent, PageId, TouchEvent, TouchResult, Touchable};
use crate::ui::styling::{
    COLOR_HEART_RATE, COLOR_SPO2, ColorPalette, HEADER_HEIGHT_PX, MARGIN_PX, TextSize,
};
use crate::ui::{Gauge, Sparkline};

const GAUGE_TOP_PX: i32 = 32;
const GAUGE_HEIGHT_PX: u32 = 124;
const CHART_TOP_PX: i32 = 160;
const CHART_HEIGHT_PX: u32 = 36;
const FOOTER_TOP_PX: i32 = 202;
const FOOTER_HEIGHT_PX: u32 = 32;

pub struct DashboardPage {
    bounds: Rectangle,
    palette: ColorPalette,
    heart_rate_gauge: Gauge,
    spo2_gauge: Gauge,
    heart_rate_chart: Sparkline,
    spo2_chart: Sparkline,
    prediction: Option<PredictionView>,
    last_label: Option<String>,
    sensor_connection: ConnectionState,
    prediction_connection: ConnectionState,
    dirty: bool,
}

impl DashboardPage {
    pub fn new(bounds: Rectangle) -> Self {
        Self::with_palette(bounds, ColorPalette::default())
    }

    pub fn with_palette(bounds: Rectangle, palette: ColorPalette) -> Self {
        let column_width = (bounds.size.width - 3 * MARGIN_PX as u32) / 2;
        let left = bounds.top_left.x + MARGIN_PX;
        let right = left + column_width as i32 + MARGIN_PX;
        let top = bounds.top_left.y;

        let gauge_size = Size::new(column_width, GAUGE_HEIGHT_PX);
        let chart_size = Size::new(column_width, CHART_HEIGHT_PX);

        Self {
            bounds,
            palette,
            heart_rate_gauge: Gauge::new(
                Rectangle::new(Point::new(left, top + GAUGE_TOP_PX), gauge_size),
                SignalKind::HeartRate,
                COLOR_HEART_RATE,
                Action::NavigateToPage(PageId::HeartRateReport),
            )
            .with_palette(palette),
            spo2_gauge: Gauge::new(
                Rectangle::new(Point::new(right, top + GAUGE_TOP_PX), gauge_size),
                SignalKind::SpO2,
                COLOR_SPO2,
                Action::NavigateToPage(PageId::SpO2Report),
            )
            .with_palette(palette),
            heart_rate_chart: Sparkline::new(
                Rectangle::new(Point::new(left, top + CHART_TOP_PX), chart_size),
                COLOR_HEART_RATE,
            )
            .with_palette(palette),
            spo2_chart: Sparkline::new(
                Rectangle::new(Point::new(right, top + CHART_TOP_PX), chart_size),
                COLOR_SPO2,
            )
            .with_palette(palette),
            prediction: None,
            last_label: None,
            sensor_connection: ConnectionState::default(),
            prediction_connection: ConnectionState::default(),
            dirty: true,
        }
    }

    fn apply_overview(&mut self, overview: &Overview) {
        self.heart_rate_gauge.set_value(
            overview.latest.bpm,
            overview.heart_rate_status.severity(),
            overview.heart_rate_status.label(),
        );
        self.spo2_gauge.set_value(
            overview.latest.spo2,
            overview.spo2_status.severity(),
            overview.spo2_status.label(),
        );
        self.heart_rate_chart.set_points(&overview.heart_rate_chart);
        self.spo2_chart.set_points(&overview.spo2_chart);
        self.prediction = overview.prediction.clone();
        self.last_label = overview.last_label.clone();
        self.sensor_connection = overview.sensor_connection;
        self.prediction_connection = overview.prediction_connection;
        self.dirty = true;
    }

    pub fn prediction(&self) -> Option<&PredictionView> {
        self.prediction.as_ref()
    }

    pub fn connection(&self, feed: FeedKind) -> ConnectionState {
        match feed {
            FeedKind::SensorData => self.sensor_connection,
            FeedKind::Predictions => self.prediction_connection,
        }
    }

    /// Footer text for the prediction pill, suffixed with the time the
    /// prediction was produced when the record carried one
    pub fn prediction_text(&self) -> String {
        let Some(view) = &self.prediction else {
            return String::from("Waiting for prediction...");
        };
        let prediction = &view.prediction;
        let text = if prediction.is_unavailable() {
            String::from("Prediction unavailable (no signal)")
        } else {
            format!(
                "Stress: {}  Hypoxemia: {}",
                prediction.stress_class, prediction.hypoxemia_class
            )
        };
        match prediction.timestamp.as_deref().and_then(time_of_day) {
            Some(time) => format!("{text} @ {time}"),
            None => text,
        }
    }

    fn draw_header<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        let top = self.bounds.top_left.y;
        draw_text(
            display,
            "Vitals Monitor",
            Point::new(self.bounds.top_left.x + MARGIN_PX, top + 8),
            TextSize::Medium,
            self.palette.text_primary,
            Alignment::Left,
        )?;

        // One status dot per feed, sensor first
        let right = self.bounds.top_left.x + self.bounds.size.width as i32 - MARGIN_PX;
        let label = self.sensor_connection.label();
        draw_text(
            display,
            label,
            Point::new(right - 24, top + 9),
            TextSize::Small,
            self.palette.text_secondary,
            Alignment::Right,
        )?;
        for (i, state) in [self.sensor_connection, self.prediction_connection]
            .into_iter()
            .enumerate()
        {
            Circle::new(Point::new(right - 20 + 12 * i as i32, top + 10), 8)
                .into_styled(PrimitiveStyle::with_fill(self.palette.severity(state.severity())))
                .draw(display)?;
        }
        Ok(())
    }

    fn draw_footer<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        let left = self.bounds.top_left.x + MARGIN_PX;
        let top = self.bounds.top_left.y + FOOTER_TOP_PX;
        let pill = Rectangle::new(
            Point::new(left, top),
            Size::new(self.bounds.size.width - 2 * MARGIN_PX as u32, FOOTER_HEIGHT_PX),
        );

        let accent = match &self.prediction {
            Some(view) => self.palette.severity(view.band.severity()),
            None => self.palette.border,
        };
        RoundedRectangle::with_equal_corners(pill, Size::new(6, 6))
            .into_styled(
                PrimitiveStyleBuilder::new()
                    .fill_color(self.palette.surface)
                    .stroke_color(accent)
                    .stroke_width(2)
                    .build(),
            )
            .draw(display)?;

        draw_text(
            display,
            &self.prediction_text(),
            Point::new(left + 8, top + 4),
            TextSize::Small,
            accent,
            Alignment::Left,
        )?;

        let updated = match &self.last_label {
            Some(label) => format!("Last reading: {label}"),
            None => String::from("No readings yet"),
        };
        draw_text(
            display,
            &updated,
            Point::new(left + 8, top + 17),
            TextSize::Small,
            self.palette.text_secondary,
            Alignment::Left,
        )
    }
}

/// `HH:MM:SS` of an ISO-8601 stamp such as `2025-03-01T08:30:01.123456`
fn time_of_day(timestamp: &str) -> Option<&str> {
    let (_, time) = timestamp.trim().split_once('T')?;
    let time = time.get(..8)?;
    time.bytes()
        .enumerate()
        .all(|(i, b)| if i == 2 || i == 5 { b == b':' } else { b.is_ascii_digit() })
        .then_some(time)
}

impl Page for DashboardPage {
    fn id(&self) -> PageId {
        PageId::Dashboard
    }

    fn title(&self) -> &str {
        "Dashboard"
    }

    fn on_activate(&mut self) {
        Page::mark_dirty(self);
    }

    fn handle_touch(&mut self, event: TouchEvent) -> Option<Action> {
        for gauge in [&mut self.heart_rate_gauge, &mut self.spo2_gauge] {
            if let TouchResult::Action(action) = gauge.handle_touch(event) {
                return Some(action);
            }
        }
        None
    }

    fn on_event(&mut self, event: &PageEvent) -> bool {
        match event {
            PageEvent::Vitals(update) => {
                self.apply_overview(&update.overview);
                true
            }
            PageEvent::Prediction(view) => {
                self.prediction = Some(view.clone());
                self.dirty = true;
                true
            }
            PageEvent::FeedHealth { feed, state } => {
                let slot = match feed {
                    FeedKind::SensorData => &mut self.sensor_connection,
                    FeedKind::Predictions => &mut self.prediction_connection,
                };
                let changed = *slot != *state;
                *slot = *state;
                self.dirty |= changed;
                changed
            }
        }
    }

    fn draw_page<D: DrawTarget<Color = Rgb565>>(&mut self, display: &mut D) -> Result<(), D::Error> {
        Drawable::draw(self, display)
    }

    fn bounds(&self) -> Rectangle {
        self.bounds
    }

    fn is_dirty(&self) -> bool {
        Drawable::is_dirty(self)
    }

    fn mark_clean(&mut self) {
        Drawable::mark_clean(self)
    }

    fn mark_dirty(&mut self) {
        Drawable::mark_dirty(self)
    }
}

impl Drawable for DashboardPage {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        self.bounds
            .into_styled(PrimitiveStyle::with_fill(self.palette.background))
            .draw(display)?;

        let header = Rectangle::new(
            self.bounds.top_left,
            Size::new(self.bounds.size.width, HEADER_HEIGHT_PX),
        );
        header
            .into_styled(PrimitiveStyle::with_fill(self.palette.surface))
            .draw(display)?;
        self.draw_header(display)?;

        self.heart_rate_gauge.draw(display)?;
        self.spo2_gauge.draw(display)?;
        self.heart_rate_chart.draw(display)?;
        self.spo2_chart.draw(display)?;
        self.draw_footer(display)
    }

    fn bounds(&self) -> Rectangle {
        self.bounds
    }

    fn is_dirty(&self) -> bool {
        self.dirty
            || self.heart_rate_gauge.is_dirty()
            || self.spo2_gauge.is_dirty()
            || self.heart_rate_chart.is_dirty()
            || self.spo2_chart.is_dirty()
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
        self.heart_rate_gauge.mark_clean();
        self.spo2_gauge.mark_clean();
        self.heart_rate_chart.mark_clean();
        self.spo2_chart.mark_clean();
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
        self.heart_rate_gauge.mark_dirty();
        self.spo2_gauge.mark_dirty();
        self.heart_rate_chart.mark_dirty();
        self.spo2_chart.mark_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{Clock, RawSensorRecord};
    use crate::monitor::Monitor;
    use crate::predictions::{Prediction, PredictionBand};
    use crate::ui::core::TouchPoint;
    use crate::ui::styling::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
    use alloc::boxed::Box;
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

    fn page() -> DashboardPage {
        DashboardPage::new(Rectangle::new(
            Point::zero(),
            Size::new(DISPLAY_WIDTH, DISPLAY_HEIGHT),
        ))
    }

    #[test]
    fn test_gauge_taps_open_reports() {
        let mut page = page();
        assert_eq!(
            page.handle_touch(TouchEvent::Press(TouchPoint::new(60, 90))),
            Some(Action::NavigateToPage(PageId::HeartRateReport))
        );
        assert_eq!(
            page.handle_touch(TouchEvent::Press(TouchPoint::new(250, 90))),
            Some(Action::NavigateToPage(PageId::SpO2Report))
        );
        assert_eq!(page.handle_touch(TouchEvent::Press(TouchPoint::new(160, 10))), None);
    }

    #[test]
    fn test_vitals_update_refreshes_gauges() {
        let mut monitor = Monitor::new();
        let record =
            RawSensorRecord::from_value(json!({ "dev60_HR": 104, "saturation": 93 })).unwrap();
        let update = monitor.ingest_sensor(&record, &TestClock);

        let mut page = page();
        Page::mark_clean(&mut page);
        assert!(page.on_event(&PageEvent::Vitals(Box::new(update))));
        assert!(Page::is_dirty(&page));
        assert_eq!(page.heart_rate_gauge.value(), 104.0);
        assert_eq!(page.spo2_gauge.value(), 93.0);
        assert_eq!(page.last_label.as_deref(), Some("8:30:00 AM"));
    }

    #[test]
    fn test_prediction_pill_text() {
        let mut page = page();
        assert_eq!(page.prediction_text(), "Waiting for prediction...");

        let view = PredictionView::new(Prediction::new("high", "normal"));
        page.on_event(&PageEvent::Prediction(view));
        assert_eq!(page.prediction_text(), "Stress: high  Hypoxemia: normal");
        assert_eq!(page.prediction().map(|v| v.band), Some(PredictionBand::Danger));
    }

    #[test]
    fn test_prediction_pill_shows_time_produced() {
        let mut page = page();
        let mut prediction = Prediction::new("moderate", "mild");
        prediction.timestamp = Some("2025-03-01T08:30:01.482913".into());
        page.on_event(&PageEvent::Prediction(PredictionView::new(prediction)));
        assert_eq!(
            page.prediction_text(),
            "Stress: moderate  Hypoxemia: mild @ 08:30:01"
        );

        let mut prediction = Prediction::new("low", "normal");
        prediction.timestamp = Some("yesterday".into());
        page.on_event(&PageEvent::Prediction(PredictionView::new(prediction)));
        assert_eq!(page.prediction_text(), "Stress: low  Hypoxemia: normal");
    }

    #[test]
    fn test_unavailable_prediction_pill() {
        let mut page = page();
        let mut prediction = Prediction::new("N/A", "N/A");
        prediction.timestamp = Some("2025-03-01T08:31:00".into());
        page.on_event(&PageEvent::Prediction(PredictionView::new(prediction)));
        assert_eq!(
            page.prediction_text(),
            "Prediction unavailable (no signal) @ 08:31:00"
        );
        assert_eq!(page.prediction().map(|v| v.band), Some(PredictionBand::Good));
    }

    #[test]
    fn test_feed_health_only_redraws_on_change() {
        let mut page = page();
        Page::mark_clean(&mut page);
        let event = PageEvent::FeedHealth {
            feed: FeedKind::Predictions,
            state: ConnectionState::Connected,
        };
        assert!(page.on_event(&event));
        assert!(!page.on_event(&event));
        assert_eq!(page.connection(FeedKind::Predictions), ConnectionState::Connected);
        assert_eq!(page.connection(FeedKind::SensorData), ConnectionState::Connecting);
    }
}
