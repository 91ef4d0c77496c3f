//! Core UI traits and types shared by every page and component

use alloc::boxed::Box;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::feed::{ConnectionState, FeedKind};
use crate::monitor::{PredictionView, VitalsUpdate};

/// A 2D touch (or mouse click) position on the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchPoint {
    pub x: u16,
    pub y: u16,
}

impl TouchPoint {
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    pub fn to_point(self) -> Point {
        Point::new(self.x as i32, self.y as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchEvent {
    /// Initial touch press at a point
    Press(TouchPoint),
    /// Touch released at a point
    Release(TouchPoint),
}

/// Result from handling a touch event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchResult {
    Handled,
    NotHandled,
    Action(Action),
}

/// Actions that UI elements can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    NavigateToPage(PageId),
    GoBack,
}

/// Page identifier for navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageId {
    Dashboard,
    HeartRateReport,
    SpO2Report,
}

/// Events delivered to the active page
#[derive(Debug, Clone)]
pub enum PageEvent {
    /// A sensor record was ingested; carries every recomputed figure
    Vitals(Box<VitalsUpdate>),
    /// A new prediction arrived
    Prediction(PredictionView),
    /// A feed connection changed state
    FeedHealth {
        feed: FeedKind,
        state: ConnectionState,
    },
}

/// Any UI element that can be drawn
pub trait Drawable {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error>;

    fn bounds(&self) -> Rectangle;

    fn is_dirty(&self) -> bool;

    fn mark_clean(&mut self);

    fn mark_dirty(&mut self);
}

/// UI elements that respond to touch events
pub trait Touchable {
    fn contains_point(&self, point: TouchPoint) -> bool;

    fn handle_touch(&mut self, event: TouchEvent) -> TouchResult;
}
