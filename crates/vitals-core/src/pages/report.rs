//! Detailed statistics page for one signal.
//!
//! The same page type serves the heart-rate and saturation reports. It only
//! renders; the figures come from the monitor with every vitals update.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::Alignment;

use crate::metrics::Severity;
use crate::monitor::{HeartRateReport, SpO2Report};
use crate::pages::page::Page;
use crate::reading::{Reading, SignalKind};
use crate::ui::Button;
use crate::ui::components::text::{NO_DATA, draw_text};
use crate::ui::core::{Action, Drawable, PageEvent, PageId, TouchEvent, TouchResult, Touchable};
use crate::ui::styling::{ColorPalette, HEADER_HEIGHT_PX, MARGIN_PX, TextSize};

/// Vertical distance between statistic rows
const ROW_HEIGHT_PX: i32 = 13;

/// Width of the statistics column
const STATS_WIDTH_PX: i32 = 176;

/// One "label: value" row
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub label: &'static str,
    pub value: String,
    /// Colour band, for rows that carry a classification
    pub severity: Option<Severity>,
}

impl ReportRow {
    fn plain(label: &'static str, value: String) -> Self {
        Self {
            label,
            value,
            severity: None,
        }
    }

    fn banded(label: &'static str, value: &str, severity: Severity) -> Self {
        Self {
            label,
            value: value.into(),
            severity: Some(severity),
        }
    }
}

pub struct ReportPage {
    bounds: Rectangle,
    kind: SignalKind,
    palette: ColorPalette,
    back_button: Button,
    rows: Vec<ReportRow>,
    recent: Vec<(String, String)>,
    message: &'static str,
    message_severity: Severity,
    readings: usize,
    dirty: bool,
}

impl ReportPage {
    pub fn new(bounds: Rectangle, kind: SignalKind) -> Self {
        Self::with_palette(bounds, kind, ColorPalette::default())
    }

    pub fn with_palette(bounds: Rectangle, kind: SignalKind, palette: ColorPalette) -> Self {
        let back_button = Button::new(
            Rectangle::new(bounds.top_left + Point::new(4, 4), Size::new(52, 20)),
            "< Back",
            Action::GoBack,
        )
        .with_palette(palette);

        let mut page = Self {
            bounds,
            kind,
            palette,
            back_button,
            rows: Vec::new(),
            recent: Vec::new(),
            message: "",
            message_severity: Severity::Normal,
            readings: 0,
            dirty: true,
        };
        match kind {
            SignalKind::HeartRate => page.show_heart_rate(&empty_heart_rate()),
            SignalKind::SpO2 => page.show_spo2(&empty_spo2()),
        }
        page
    }

    pub fn kind(&self) -> SignalKind {
        self.kind
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Recent readings as (label, value) text, newest first
    pub fn recent(&self) -> &[(String, String)] {
        &self.recent
    }

    pub fn message(&self) -> &str {
        self.message
    }

    pub fn show_heart_rate(&mut self, report: &HeartRateReport) {
        let kind = SignalKind::HeartRate;
        let has_data = report.readings > 0;

        let mut rows = Vec::with_capacity(13);
        rows.push(ReportRow::plain("Current", current(kind, report.current, has_data)));
        rows.push(ReportRow::plain("Average", average(kind, report.average)));
        rows.push(ReportRow::plain("Peak", value(kind, report.max)));
        rows.push(ReportRow::plain("Low", value(kind, report.min)));
        if has_data {
            rows.push(ReportRow::banded("Status", report.status.label(), report.status.severity()));
        } else {
            rows.push(ReportRow::plain("Status", NO_DATA.into()));
        }
        rows.push(ReportRow::plain("Trend", report.trend.label(kind).into()));
        rows.push(ReportRow::plain(
            "Variability",
            report
                .variability
                .map_or_else(|| NO_DATA.into(), |v| format!("{v:.1}{}", kind.unit())),
        ));
        rows.push(ReportRow::plain("Zone", report.zone.label().into()));
        rows.push(ReportRow::plain("Last hour", windowed(kind, report.hour_average)));
        rows.push(ReportRow::plain("Last day", windowed(kind, report.day_average)));
        rows.push(ReportRow::plain("Cardiac load", report.insights.cardiac_load.into()));
        rows.push(ReportRow::plain("Recovery", report.insights.recovery_index.into()));
        rows.push(ReportRow::plain("Fitness", report.insights.fitness_level.into()));

        self.rows = rows;
        self.message = if has_data { report.status.message() } else { "" };
        self.message_severity = report.status.severity();
        self.set_recent(kind, &report.recent, report.readings);
    }

    pub fn show_spo2(&mut self, report: &SpO2Report) {
        let kind = SignalKind::SpO2;
        let has_data = report.readings > 0;

        let mut rows = Vec::with_capacity(13);
        rows.push(ReportRow::plain("Current", current(kind, report.current, has_data)));
        rows.push(ReportRow::plain("Average", average(kind, report.average)));
        rows.push(ReportRow::plain("Peak", value(kind, report.max)));
        rows.push(ReportRow::plain("Low", value(kind, report.min)));
        if has_data {
            rows.push(ReportRow::banded("Status", report.status.label(), report.status.severity()));
        } else {
            rows.push(ReportRow::plain("Status", NO_DATA.into()));
        }
        rows.push(ReportRow::plain("Trend", report.trend.label(kind).into()));
        rows.push(ReportRow::plain("Stability", report.stability.label().into()));
        rows.push(ReportRow::plain("Quality", report.quality.label().into()));
        rows.push(ReportRow::plain("Last hour", windowed(kind, report.hour_average)));
        rows.push(ReportRow::plain("Last day", windowed(kind, report.day_average)));
        rows.push(ReportRow::banded(
            "Hypoxemia risk",
            report.risk.hypoxemia_risk.label(),
            report.risk.hypoxemia_risk.severity(),
        ));
        rows.push(ReportRow::plain("O2 efficiency", report.risk.oxygen_efficiency.into()));
        rows.push(ReportRow::plain("Respiratory", report.risk.respiratory_health.into()));

        self.rows = rows;
        self.message = if has_data { report.status.message() } else { "" };
        self.message_severity = report.status.severity();
        self.set_recent(kind, &report.recent, report.readings);
    }

    fn set_recent(&mut self, kind: SignalKind, recent: &[Reading], readings: usize) {
        self.recent = recent
            .iter()
            .map(|r| {
                let value = if r.has_signal() {
                    format!("{:.0}{}", r.value(), kind.unit())
                } else {
                    NO_DATA.into()
                };
                (String::from(r.label()), value)
            })
            .collect();
        self.readings = readings;
        self.dirty = true;
    }

    fn draw_rows<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        let left = self.bounds.top_left.x + MARGIN_PX;
        let value_x = left + STATS_WIDTH_PX - MARGIN_PX;
        let mut y = self.bounds.top_left.y + HEADER_HEIGHT_PX as i32 + 6;

        for row in &self.rows {
            draw_text(
                display,
                row.label,
                Point::new(left, y),
                TextSize::Small,
                self.palette.text_secondary,
                Alignment::Left,
            )?;
            let color = row
                .severity
                .map_or(self.palette.text_primary, |s| self.palette.severity(s));
            draw_text(
                display,
                &row.value,
                Point::new(value_x, y),
                TextSize::Small,
                color,
                Alignment::Right,
            )?;
            y += ROW_HEIGHT_PX;
        }
        Ok(())
    }

    fn draw_recent<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        let left = self.bounds.top_left.x + STATS_WIDTH_PX + MARGIN_PX;
        let right = self.bounds.top_left.x + self.bounds.size.width as i32 - MARGIN_PX;
        let mut y = self.bounds.top_left.y + HEADER_HEIGHT_PX as i32 + 6;

        Line::new(Point::new(left - 6, y), Point::new(left - 6, y + 13 * ROW_HEIGHT_PX))
            .into_styled(PrimitiveStyle::with_stroke(self.palette.border, 1))
            .draw(display)?;

        draw_text(
            display,
            &format!("Recent ({})", self.readings),
            Point::new(left, y),
            TextSize::Small,
            self.palette.text_secondary,
            Alignment::Left,
        )?;
        y += ROW_HEIGHT_PX;

        if self.recent.is_empty() {
            return draw_text(
                display,
                "No readings yet",
                Point::new(left, y),
                TextSize::Small,
                self.palette.text_secondary,
                Alignment::Left,
            );
        }

        for (label, value) in &self.recent {
            // Keep the time portion of long device labels
            let label = label.rsplit(' ').next().unwrap_or(label.as_str());
            draw_text(
                display,
                label,
                Point::new(left, y),
                TextSize::Small,
                self.palette.text_secondary,
                Alignment::Left,
            )?;
            draw_text(
                display,
                value,
                Point::new(right, y),
                TextSize::Small,
                self.palette.text_primary,
                Alignment::Right,
            )?;
            y += ROW_HEIGHT_PX;
        }
        Ok(())
    }
}

impl Page for ReportPage {
    fn id(&self) -> PageId {
        match self.kind {
            SignalKind::HeartRate => PageId::HeartRateReport,
            SignalKind::SpO2 => PageId::SpO2Report,
        }
    }

    fn title(&self) -> &str {
        match self.kind {
            SignalKind::HeartRate => "Heart Rate Report",
            SignalKind::SpO2 => "SpO2 Report",
        }
    }

    fn on_activate(&mut self) {
        Page::mark_dirty(self);
    }

    fn handle_touch(&mut self, event: TouchEvent) -> Option<Action> {
        match self.back_button.handle_touch(event) {
            TouchResult::Action(action) => Some(action),
            TouchResult::Handled => {
                self.dirty = true;
                None
            }
            TouchResult::NotHandled => None,
        }
    }

    fn on_event(&mut self, event: &PageEvent) -> bool {
        match event {
            PageEvent::Vitals(update) => {
                match self.kind {
                    SignalKind::HeartRate => self.show_heart_rate(&update.heart_rate),
                    SignalKind::SpO2 => self.show_spo2(&update.spo2),
                }
                true
            }
            PageEvent::Prediction(_) | PageEvent::FeedHealth { .. } => false,
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

impl Drawable for ReportPage {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        self.bounds
            .into_styled(PrimitiveStyle::with_fill(self.palette.background))
            .draw(display)?;
        Rectangle::new(
            self.bounds.top_left,
            Size::new(self.bounds.size.width, HEADER_HEIGHT_PX),
        )
        .into_styled(PrimitiveStyle::with_fill(self.palette.surface))
        .draw(display)?;

        self.back_button.draw(display)?;
        draw_text(
            display,
            self.title(),
            Point::new(self.bounds.center().x + 24, self.bounds.top_left.y + 8),
            TextSize::Medium,
            self.palette.text_primary,
            Alignment::Center,
        )?;

        self.draw_rows(display)?;
        self.draw_recent(display)?;

        let bottom = self.bounds.top_left.y + self.bounds.size.height as i32;
        draw_text(
            display,
            self.message,
            Point::new(self.bounds.center().x, bottom - 16),
            TextSize::Small,
            self.palette.severity(self.message_severity),
            Alignment::Center,
        )
    }

    fn bounds(&self) -> Rectangle {
        self.bounds
    }

    fn is_dirty(&self) -> bool {
        self.dirty || self.back_button.is_dirty()
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
        self.back_button.mark_clean();
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
        self.back_button.mark_dirty();
    }
}

fn current(kind: SignalKind, value: f32, has_data: bool) -> String {
    if has_data && value > 0.0 {
        format!("{value:.0}{}", kind.unit())
    } else {
        NO_DATA.into()
    }
}

fn average(kind: SignalKind, average: Option<u32>) -> String {
    average.map_or_else(|| NO_DATA.into(), |v| format!("{v}{}", kind.unit()))
}

fn value(kind: SignalKind, value: Option<f32>) -> String {
    value.map_or_else(|| NO_DATA.into(), |v| format!("{v:.0}{}", kind.unit()))
}

fn windowed(kind: SignalKind, average: f32) -> String {
    if average > 0.0 {
        format!("{:.0}{}", crate::stats::round(average), kind.unit())
    } else {
        NO_DATA.into()
    }
}

fn empty_heart_rate() -> HeartRateReport {
    crate::monitor::Monitor::new().heart_rate_report()
}

fn empty_spo2() -> SpO2Report {
    crate::monitor::Monitor::new().spo2_report()
}
