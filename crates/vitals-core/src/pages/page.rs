//! Page abstraction and the enum wrapper the [`PageManager`] stores.
//!
//! [`PageManager`]: super::page_manager::PageManager

use alloc::boxed::Box;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::pages::dashboard::DashboardPage;
use crate::pages::report::ReportPage;
use crate::ui::core::{Action, PageEvent, PageId, TouchEvent};

/// Trait that all navigable pages implement.
///
/// The page manager calls, in order: `on_activate` once when the page
/// becomes active, `on_event` for each incoming event, `handle_touch` for
/// input, `draw_page` whenever `is_dirty()`, and `on_deactivate` once when
/// navigating away. Pages never talk to a feed; everything they show
/// arrives through `on_event`.
pub trait Page {
    fn id(&self) -> PageId;

    fn title(&self) -> &str;

    fn on_activate(&mut self) {}

    fn on_deactivate(&mut self) {}

    /// Process a touch event and optionally return a navigation [`Action`].
    fn handle_touch(&mut self, event: TouchEvent) -> Option<Action>;

    /// Returns `true` if the event changed what the page shows.
    fn on_event(&mut self, _event: &PageEvent) -> bool {
        false
    }

    fn draw_page<D: DrawTarget<Color = Rgb565>>(&mut self, display: &mut D) -> Result<(), D::Error>;

    fn bounds(&self) -> Rectangle;

    fn is_dirty(&self) -> bool;

    fn mark_clean(&mut self);

    fn mark_dirty(&mut self);
}

/// One of the concrete page types.
///
/// Each variant boxes its page to keep the enum small.
pub enum PageWrapper {
    Dashboard(Box<DashboardPage>),
    Report(Box<ReportPage>),
}

impl Page for PageWrapper {
    fn id(&self) -> PageId {
        match self {
            PageWrapper::Dashboard(page) => page.id(),
            PageWrapper::Report(page) => page.id(),
        }
    }

    fn title(&self) -> &str {
        match self {
            PageWrapper::Dashboard(page) => page.title(),
            PageWrapper::Report(page) => page.title(),
        }
    }

    fn on_activate(&mut self) {
        match self {
            PageWrapper::Dashboard(page) => page.on_activate(),
            PageWrapper::Report(page) => page.on_activate(),
        }
    }

    fn on_deactivate(&mut self) {
        match self {
            PageWrapper::Dashboard(page) => page.on_deactivate(),
            PageWrapper::Report(page) => page.on_deactivate(),
        }
    }

    fn handle_touch(&mut self, event: TouchEvent) -> Option<Action> {
        match self {
            PageWrapper::Dashboard(page) => page.handle_touch(event),
            PageWrapper::Report(page) => page.handle_touch(event),
        }
    }

    fn on_event(&mut self, event: &PageEvent) -> bool {
        match self {
            PageWrapper::Dashboard(page) => page.on_event(event),
            PageWrapper::Report(page) => page.on_event(event),
        }
    }

    fn draw_page<D: DrawTarget<Color = Rgb565>>(&mut self, display: &mut D) -> Result<(), D::Error> {
        match self {
            PageWrapper::Dashboard(page) => page.draw_page(display),
            PageWrapper::Report(page) => page.draw_page(display),
        }
    }

    fn bounds(&self) -> Rectangle {
        match self {
            PageWrapper::Dashboard(page) => Page::bounds(page.as_ref()),
            PageWrapper::Report(page) => Page::bounds(page.as_ref()),
        }
    }

    fn is_dirty(&self) -> bool {
        match self {
            PageWrapper::Dashboard(page) => Page::is_dirty(page.as_ref()),
            PageWrapper::Report(page) => Page::is_dirty(page.as_ref()),
        }
    }

    fn mark_clean(&mut self) {
        match self {
            PageWrapper::Dashboard(page) => Page::mark_clean(page.as_mut()),
            PageWrapper::Report(page) => Page::mark_clean(page.as_mut()),
        }
    }

    fn mark_dirty(&mut self) {
        match self {
            PageWrapper::Dashboard(page) => Page::mark_dirty(page.as_mut()),
            PageWrapper::Report(page) => Page::mark_dirty(page.as_mut()),
        }
    }
}
