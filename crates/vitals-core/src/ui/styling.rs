//! Colors, fonts and layout constants
//!
//! Colors are RGB565. To convert from 8-bit RGB: R>>3, G>>2, B>>3.

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_6X13_BOLD, FONT_10X20};
use embedded_graphics::pixelcolor::Rgb565;

use crate::metrics::Severity;

pub const DISPLAY_WIDTH: u32 = 320;
pub const DISPLAY_HEIGHT: u32 = 240;

/// Height of the title bar on every page
pub const HEADER_HEIGHT_PX: u32 = 28;

/// Outer margin between content and the display edge
pub const MARGIN_PX: i32 = 8;

// ============================================================================
// Base Colors
// ============================================================================

/// Primary background color - very dark gray-blue
pub const COLOR_BACKGROUND: Rgb565 = Rgb565::new(18 >> 3, 23 >> 2, 24 >> 3);

/// Cards and panels
pub const COLOR_SURFACE: Rgb565 = Rgb565::new(26 >> 3, 32 >> 2, 33 >> 3);

pub const COLOR_STROKE: Rgb565 = Rgb565::new(43 >> 3, 55 >> 2, 57 >> 3);

/// Heart-rate accent - coral
pub const COLOR_HEART_RATE: Rgb565 = Rgb565::new(231 >> 3, 96 >> 2, 96 >> 3);

/// Saturation accent - sky blue
pub const COLOR_SPO2: Rgb565 = Rgb565::new(88 >> 3, 166 >> 2, 230 >> 3);

// ============================================================================
// Severity Colors
// ============================================================================

pub const COLOR_NORMAL: Rgb565 = Rgb565::new(95 >> 3, 185 >> 2, 141 >> 3);

pub const COLOR_WARNING: Rgb565 = Rgb565::new(200 >> 3, 145 >> 2, 85 >> 3);

pub const COLOR_DANGER: Rgb565 = Rgb565::new(190 >> 3, 95 >> 2, 95 >> 3);

// ============================================================================
// Text Colors
// ============================================================================

pub const WHITE: Rgb565 = Rgb565::new(31, 63, 31);

pub const LIGHT_GRAY: Rgb565 = Rgb565::new(21, 42, 21);

pub const GRAY: Rgb565 = Rgb565::new(16, 32, 16);

/// Grouped colors passed to pages at construction.
///
/// Pages never look the palette up globally; whoever builds them decides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorPalette {
    pub background: Rgb565,
    pub surface: Rgb565,
    pub border: Rgb565,
    pub text_primary: Rgb565,
    pub text_secondary: Rgb565,
    pub normal: Rgb565,
    pub warning: Rgb565,
    pub danger: Rgb565,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::dark()
    }
}

impl ColorPalette {
    pub const fn dark() -> Self {
        Self {
            background: COLOR_BACKGROUND,
            surface: COLOR_SURFACE,
            border: COLOR_STROKE,
            text_primary: WHITE,
            text_secondary: LIGHT_GRAY,
            normal: COLOR_NORMAL,
            warning: COLOR_WARNING,
            danger: COLOR_DANGER,
        }
    }

    pub const fn light() -> Self {
        Self {
            background: WHITE,
            surface: LIGHT_GRAY,
            border: GRAY,
            text_primary: COLOR_BACKGROUND,
            text_secondary: COLOR_STROKE,
            normal: COLOR_NORMAL,
            warning: COLOR_WARNING,
            danger: COLOR_DANGER,
        }
    }

    pub const fn severity(&self, severity: Severity) -> Rgb565 {
        match severity {
            Severity::Normal => self.normal,
            Severity::Warning => self.warning,
            Severity::Danger => self.danger,
        }
    }
}

/// Text size presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSize {
    /// 6x10
    Small,
    /// 6x13 bold
    Medium,
    /// 10x20
    Large,
}

impl TextSize {
    pub fn font(self) -> &'static MonoFont<'static> {
        match self {
            TextSize::Small => &FONT_6X10,
            TextSize::Medium => &FONT_6X13_BOLD,
            TextSize::Large => &FONT_10X20,
        }
    }
}
