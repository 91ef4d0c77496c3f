//! Compact line chart of the recent chart history

use alloc::vec::Vec;
use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle};

use crate::ui::core::Drawable;
use crate::ui::styling::ColorPalette;

/// Inner padding between the frame and the plotted line
const PADDING_PX: i32 = 4;

/// Line chart scaled to the min/max of its points.
///
/// "No signal" zeros are not plotted, so the line breaks across gaps.
pub struct Sparkline {
    bounds: Rectangle,
    color: Rgb565,
    palette: ColorPalette,
    points: Vec<f32>,
    dirty: bool,
}

impl Sparkline {
    pub fn new(bounds: Rectangle, color: Rgb565) -> Self {
        Self {
            bounds,
            color,
            palette: ColorPalette::default(),
            points: Vec::new(),
            dirty: true,
        }
    }

    pub fn with_palette(mut self, palette: ColorPalette) -> Self {
        self.palette = palette;
        self
    }

    pub fn set_points(&mut self, points: &[f32]) {
        if self.points != points {
            self.points.clear();
            self.points.extend_from_slice(points);
            self.dirty = true;
        }
    }

    /// Screen position of every plotted point, `None` for gaps
    fn project(&self) -> Vec<Option<Point>> {
        let mut lo = f32::MAX;
        let mut hi = f32::MIN;
        for &value in self.points.iter().filter(|v| **v > 0.0) {
            lo = lo.min(value);
            hi = hi.max(value);
        }
        if lo > hi {
            return Vec::new();
        }
        let span = if hi - lo < 1.0 { 1.0 } else { hi - lo };

        let left = self.bounds.top_left.x + PADDING_PX;
        let top = self.bounds.top_left.y + PADDING_PX;
        let width = self.bounds.size.width as i32 - 2 * PADDING_PX;
        let height = self.bounds.size.height as i32 - 2 * PADDING_PX;
        let steps = self.points.len().saturating_sub(1).max(1) as i32;

        self.points
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                (value > 0.0).then(|| {
                    let x = left + width * i as i32 / steps;
                    let y = top + height - ((value - lo) / span * height as f32) as i32;
                    Point::new(x, y)
                })
            })
            .collect()
    }
}

impl Drawable for Sparkline {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        self.bounds
            .into_styled(
                PrimitiveStyleBuilder::new()
                    .fill_color(self.palette.surface)
                    .stroke_color(self.palette.border)
                    .stroke_width(1)
                    .build(),
            )
            .draw(display)?;

        let style = PrimitiveStyle::with_stroke(self.color, 2);
        let projected = self.project();
        for pair in projected.windows(2) {
            if let [Some(a), Some(b)] = pair {
                Line::new(*a, *b).into_styled(style).draw(display)?;
            }
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
