//! Text drawing helpers
//!
//! Pages lay text out by anchor point rather than by box, so a single
//! function covers every label on screen.

use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};

use crate::ui::styling::TextSize;

/// Placeholder shown for "no data"
pub const NO_DATA: &str = "--";

/// Draw `text` with its top edge at `position.y`, aligned around `position.x`
pub fn draw_text<D: DrawTarget<Color = Rgb565>>(
    display: &mut D,
    text: &str,
    position: Point,
    size: TextSize,
    color: Rgb565,
    alignment: Alignment,
) -> Result<(), D::Error> {
    let character_style = MonoTextStyle::new(size.font(), color);
    let text_style = TextStyleBuilder::new()
        .alignment(alignment)
        .baseline(Baseline::Top)
        .build();

    Text::with_text_style(text, position, character_style, text_style).draw(display)?;
    Ok(())
}

/// Width in pixels of `text` set in `size`
pub fn text_width(text: &str, size: TextSize) -> u32 {
    let font = size.font();
    text.chars().count() as u32 * (font.character_size.width + font.character_spacing)
}
