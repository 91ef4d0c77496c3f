//! Arc gauge showing one live signal value

use alloc::format;
use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Arc, PrimitiveStyle, Rectangle, RoundedRectangle};
use embedded_graphics::text::Alignment;

use crate::metrics::Severity;
use crate::reading::SignalKind;
use crate::ui::components::text::{NO_DATA, draw_text};
use crate::ui::core::{Action, Drawable, TouchEvent, TouchPoint, TouchResult, Touchable};
use crate::ui::styling::{ColorPalette, TextSize};

/// Start of the dial, measured clockwise from 3 o'clock
const ARC_START_DEG: f32 = 135.0;

/// Full-scale sweep of the dial
const ARC_SWEEP_DEG: f32 = 270.0;

const ARC_STROKE_PX: u32 = 8;

/// A 270° dial with the value in its centre.
///
/// Tapping the gauge triggers its action (normally opening the signal's
/// report page).
pub struct Gauge {
    bounds: Rectangle,
    kind: SignalKind,
    accent: Rgb565,
    palette: ColorPalette,
    value: f32,
    severity: Severity,
    status: &'static str,
    action: Action,
    dirty: bool,
}

impl Gauge {
    pub fn new(bounds: Rectangle, kind: SignalKind, accent: Rgb565, action: Action) -> Self {
        Self {
            bounds,
            kind,
            accent,
            palette: ColorPalette::default(),
            value: 0.0,
            severity: Severity::Normal,
            status: "",
            action,
            dirty: true,
        }
    }

    pub fn with_palette(mut self, palette: ColorPalette) -> Self {
        self.palette = palette;
        self
    }

    /// Show a new value; 0 means "no signal"
    pub fn set_value(&mut self, value: f32, severity: Severity, status: &'static str) {
        if self.value != value || self.severity != severity || self.status != status {
            self.value = value;
            self.severity = severity;
            self.status = status;
            self.dirty = true;
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Degrees of the dial filled by the current value
    pub fn sweep_degrees(&self) -> f32 {
        let fraction = self.value / self.kind.gauge_max();
        ARC_SWEEP_DEG * fraction.clamp(0.0, 1.0)
    }

    fn dial(&self) -> (Point, u32) {
        let diameter = self.bounds.size.width.min(self.bounds.size.height).saturating_sub(36);
        let top_left = Point::new(
            self.bounds.center().x - diameter as i32 / 2,
            self.bounds.top_left.y + 20,
        );
        (top_left, diameter)
    }
}

impl Drawable for Gauge {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        RoundedRectangle::with_equal_corners(self.bounds, Size::new(8, 8))
            .into_styled(PrimitiveStyle::with_fill(self.palette.surface))
            .draw(display)?;

        let center_x = self.bounds.center().x;
        draw_text(
            display,
            self.kind.name(),
            Point::new(center_x, self.bounds.top_left.y + 5),
            TextSize::Small,
            self.palette.text_secondary,
            Alignment::Center,
        )?;

        let (top_left, diameter) = self.dial();
        Arc::new(top_left, diameter, ARC_START_DEG.deg(), ARC_SWEEP_DEG.deg())
            .into_styled(PrimitiveStyle::with_stroke(self.palette.border, ARC_STROKE_PX))
            .draw(display)?;

        let sweep = self.sweep_degrees();
        if sweep > 0.0 {
            Arc::new(top_left, diameter, ARC_START_DEG.deg(), sweep.deg())
                .into_styled(PrimitiveStyle::with_stroke(self.accent, ARC_STROKE_PX))
                .draw(display)?;
        }

        let dial_center = top_left + Point::new(diameter as i32 / 2, diameter as i32 / 2);
        let value = if self.value > 0.0 {
            format!("{:.0}", self.value)
        } else {
            NO_DATA.into()
        };
        draw_text(
            display,
            &value,
            dial_center - Point::new(0, 14),
            TextSize::Large,
            self.palette.text_primary,
            Alignment::Center,
        )?;
        draw_text(
            display,
            self.kind.unit().trim(),
            dial_center + Point::new(0, 8),
            TextSize::Small,
            self.palette.text_secondary,
            Alignment::Center,
        )?;

        if self.value > 0.0 {
            draw_text(
                display,
                self.status,
                Point::new(center_x, self.bounds.bottom_right().map_or(0, |p| p.y) - 14),
                TextSize::Medium,
                self.palette.severity(self.severity),
                Alignment::Center,
            )?;
        }
        Ok(())
    }

    fn bounds(&self) -> Rectangle {
        self.bounds
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

impl Touchable for Gauge {
    fn contains_point(&self, point: TouchPoint) -> bool {
        self.bounds.contains(point.to_point())
    }

    fn handle_touch(&mut self, event: TouchEvent) -> TouchResult {
        match event {
            TouchEvent::Press(point) if self.contains_point(point) => TouchResult::Action(self.action),
            _ => TouchResult::NotHandled,
        }
    }
}
