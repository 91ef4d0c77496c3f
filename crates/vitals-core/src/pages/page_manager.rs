//! Page manager with navigation and event dispatching.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use heapless::Vec;
use log::{debug, warn};

use crate::pages::page::{Page, PageWrapper};
use crate::ui::core::{Action, PageEvent, PageId, TouchEvent};

/// Maximum number of registered pages
const MAX_PAGES: usize = 4;

/// Depth of the back-navigation stack
const MAX_HISTORY: usize = 8;

/// Owns every page and routes input, events and drawing to the active one.
pub struct PageManager {
    pages: Vec<PageWrapper, MAX_PAGES>,
    current_page: PageId,
    navigation_stack: Vec<PageId, MAX_HISTORY>,
    display_bounds: Rectangle,
}

impl PageManager {
    pub fn new(initial_page: PageId, display_bounds: Rectangle) -> Self {
        Self {
            pages: Vec::new(),
            current_page: initial_page,
            navigation_stack: Vec::new(),
            display_bounds,
        }
    }

    /// Register a page; the page that matches the initial id is activated.
    pub fn register_page(&mut self, mut page: PageWrapper) {
        if page.id() == self.current_page {
            page.on_activate();
        }
        if self.pages.push(page).is_err() {
            warn!("Page registry full, page dropped");
        }
    }

    /// Navigate to a page, remembering the current one for [`go_back`].
    ///
    /// Navigating to the page already shown does nothing.
    ///
    /// [`go_back`]: Self::go_back
    pub fn navigate_to(&mut self, page_id: PageId) -> bool {
        if page_id == self.current_page || !self.has_page(page_id) {
            return false;
        }

        if let Some(current) = self.current_page_mut() {
            current.on_deactivate();
        }

        if self.navigation_stack.is_full() {
            self.navigation_stack.remove(0);
        }
        self.navigation_stack.push(self.current_page).ok();
        debug!("Navigating {:?} -> {:?}", self.current_page, page_id);
        self.current_page = page_id;

        if let Some(page) = self.current_page_mut() {
            page.on_activate();
        }
        true
    }

    /// Go back to the previous page
    pub fn go_back(&mut self) -> bool {
        let Some(previous) = self.navigation_stack.pop() else {
            return false;
        };

        if let Some(current) = self.current_page_mut() {
            current.on_deactivate();
        }
        debug!("Navigating back {:?} -> {:?}", self.current_page, previous);
        self.current_page = previous;
        if let Some(page) = self.current_page_mut() {
            page.on_activate();
        }
        true
    }

    /// Apply a navigation action; returns `true` if the page changed.
    pub fn handle_action(&mut self, action: Action) -> bool {
        match action {
            Action::NavigateToPage(page_id) => self.navigate_to(page_id),
            Action::GoBack => self.go_back(),
        }
    }

    fn has_page(&self, page_id: PageId) -> bool {
        self.pages.iter().any(|p| p.id() == page_id)
    }

    fn current_page_mut(&mut self) -> Option<&mut PageWrapper> {
        self.pages.iter_mut().find(|p| p.id() == self.current_page)
    }

    fn current_page(&self) -> Option<&PageWrapper> {
        self.pages.iter().find(|p| p.id() == self.current_page)
    }

    /// Pass a touch to the current page, returning any action it triggered
    pub fn handle_touch(&mut self, event: TouchEvent) -> Option<Action> {
        let result = self.current_page_mut().and_then(|page| page.handle_touch(event));
        debug!("Touch {:?} -> {:?}", event, result);
        result
    }

    /// Dispatch an event to every page, so inactive pages are current when
    /// they are next shown.
    pub fn broadcast_event(&mut self, event: &PageEvent) -> bool {
        let current = self.current_page;
        let mut redraw = false;
        for page in self.pages.iter_mut() {
            let changed = page.on_event(event);
            redraw |= changed && page.id() == current;
        }
        redraw
    }

    /// Draw the current page if it is dirty; returns whether anything was drawn
    pub fn draw_dirty<D: DrawTarget<Color = Rgb565>>(
        &mut self,
        display: &mut D,
    ) -> Result<bool, D::Error> {
        match self.current_page_mut() {
            Some(page) if page.is_dirty() => {
                page.draw_page(display)?;
                page.mark_clean();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.current_page().is_some_and(|page| page.is_dirty())
    }

    pub fn current_page_id(&self) -> PageId {
        self.current_page
    }

    pub fn display_bounds(&self) -> Rectangle {
        self.display_bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::PredictionView;
    use crate::pages::{DashboardPage, ReportPage};
    use crate::predictions::Prediction;
    use crate::reading::SignalKind;
    use crate::ui::styling::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
    use alloc::boxed::Box;

    fn manager() -> PageManager {
        let bounds = Rectangle::new(Point::zero(), Size::new(DISPLAY_WIDTH, DISPLAY_HEIGHT));
        let mut manager = PageManager::new(PageId::Dashboard, bounds);
        manager.register_page(PageWrapper::Dashboard(Box::new(DashboardPage::new(bounds))));
        manager.register_page(PageWrapper::Report(Box::new(ReportPage::new(
            bounds,
            SignalKind::HeartRate,
        ))));
        manager.register_page(PageWrapper::Report(Box::new(ReportPage::new(
            bounds,
            SignalKind::SpO2,
        ))));
        manager
    }

    #[test]
    fn test_navigate_and_go_back() {
        let mut manager = manager();
        assert!(manager.navigate_to(PageId::HeartRateReport));
        assert!(manager.navigate_to(PageId::SpO2Report));
        assert_eq!(manager.current_page_id(), PageId::SpO2Report);

        assert!(manager.go_back());
        assert_eq!(manager.current_page_id(), PageId::HeartRateReport);
        assert!(manager.go_back());
        assert_eq!(manager.current_page_id(), PageId::Dashboard);
        assert!(!manager.go_back());
    }

    #[test]
    fn test_reentering_current_page_is_noop() {
        let mut manager = manager();
        manager.navigate_to(PageId::HeartRateReport);
        assert!(!manager.navigate_to(PageId::HeartRateReport));
        assert!(manager.go_back());
        assert!(!manager.go_back());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut manager = manager();
        for _ in 0..10 {
            manager.navigate_to(PageId::HeartRateReport);
            manager.navigate_to(PageId::SpO2Report);
        }
        let mut steps = 0;
        while manager.go_back() {
            steps += 1;
        }
        assert_eq!(steps, MAX_HISTORY);
    }

    #[test]
    fn test_handle_action() {
        let mut manager = manager();
        assert!(manager.handle_action(Action::NavigateToPage(PageId::SpO2Report)));
        assert!(manager.handle_action(Action::GoBack));
        assert_eq!(manager.current_page_id(), PageId::Dashboard);
    }

    #[test]
    fn test_activated_page_is_dirty() {
        let mut manager = manager();
        assert!(manager.is_dirty());
        manager.navigate_to(PageId::HeartRateReport);
        assert!(manager.is_dirty());
    }

    #[test]
    fn test_broadcast_redraws_only_for_current_page() {
        let mut manager = manager();
        let event = PageEvent::Prediction(PredictionView::new(Prediction::new("low", "normal")));

        manager.navigate_to(PageId::HeartRateReport);
        assert!(!manager.broadcast_event(&event));

        manager.go_back();
        assert!(manager.broadcast_event(&event));
    }
}
