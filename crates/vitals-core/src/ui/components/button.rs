//! Button component

use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyleBuilder, Rectangle, RoundedRectangle};
use embedded_graphics::text::Alignment;

use crate::ui::components::text::draw_text;
use crate::ui::core::{Action, Drawable, TouchEvent, TouchPoint, TouchResult, Touchable};
use crate::ui::styling::{ColorPalette, TextSize};

/// Labelled button that triggers its action on press.
///
/// Shows a darkened background between press and release.
pub struct Button {
    bounds: Rectangle,
    label: heapless::String<24>,
    action: Action,
    palette: ColorPalette,
    pressed: bool,
    dirty: bool,
}

impl Button {
    /// Labels longer than 24 bytes are left blank.
    pub fn new(bounds: Rectangle, label: &str, action: Action) -> Self {
        let mut label_string = heapless::String::new();
        label_string.push_str(label).ok();

        Self {
            bounds,
            label: label_string,
            action,
            palette: ColorPalette::default(),
            pressed: false,
            dirty: true,
        }
    }

    pub fn with_palette(mut self, palette: ColorPalette) -> Self {
        self.palette = palette;
        self
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    fn background(&self) -> Rgb565 {
        let bg = self.palette.surface;
        if self.pressed {
            Rgb565::new(
                bg.r().saturating_sub(4),
                bg.g().saturating_sub(8),
                bg.b().saturating_sub(4),
            )
        } else {
            bg
        }
    }
}

impl Drawable for Button {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        let style = PrimitiveStyleBuilder::new()
            .fill_color(self.background())
            .stroke_color(self.palette.border)
            .stroke_width(1)
            .build();
        RoundedRectangle::with_equal_corners(self.bounds, Size::new(6, 6))
            .into_styled(style)
            .draw(display)?;

        let font_height = TextSize::Small.font().character_size.height as i32;
        let center = self.bounds.center();
        draw_text(
            display,
            &self.label,
            Point::new(center.x, center.y - font_height / 2),
            TextSize::Small,
            self.palette.text_primary,
            Alignment::Center,
        )
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

impl Touchable for Button {
    fn contains_point(&self, point: TouchPoint) -> bool {
        self.bounds.contains(point.to_point())
    }

    fn handle_touch(&mut self, event: TouchEvent) -> TouchResult {
        match event {
            TouchEvent::Press(point) if self.contains_point(point) => {
                self.pressed = true;
                self.dirty = true;
                TouchResult::Action(self.action)
            }
            TouchEvent::Release(_) if self.pressed => {
                self.pressed = false;
                self.dirty = true;
                TouchResult::Handled
            }
            _ => TouchResult::NotHandled,
        }
    }
}
