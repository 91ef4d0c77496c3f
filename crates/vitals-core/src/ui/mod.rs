//! Minimal UI toolkit for the dashboard pages
//!
//! - [`core`]: touch input, navigation actions, page events, and the
//!   [`Drawable`]/[`Touchable`] traits
//! - [`styling`]: palette, fonts and display geometry
//! - [`components`]: gauge, sparkline, button and text helpers

pub mod components;
pub mod core;
pub mod styling;

pub use components::{Button, Gauge, Sparkline};
pub use core::{Action, Drawable, PageEvent, PageId, TouchEvent, TouchPoint, TouchResult, Touchable};
pub use styling::{ColorPalette, TextSize};
