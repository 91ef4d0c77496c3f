//! Desktop simulator for the vitals-rs monitoring dashboard.
//!
//! Renders vitals-core pages in an SDL2 window via `embedded-graphics-simulator`.
//! With `VITALS_DATABASE_URL` set (see [`settings`]) both feeds are streamed
//! from the real-time database; otherwise synthetic records are generated
//! so the pages can be exercised offline.
//!
//! # Key bindings
//!
//! | Key       | Action                   |
//! |-----------|--------------------------|
//! | 1         | Dashboard                |
//! | 2         | Heart-rate report        |
//! | 3         | SpO2 report              |
//! | Backspace | Back                     |
//! | R         | Resubscribe both feeds   |
//! | Q / Esc   | Quit                     |
//!
//! Mouse clicks are forwarded as touch events.

mod clock;
mod feed_client;
mod mock;
mod settings;

use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window, sdl2::Keycode,
};
use log::{error, info, warn};

use vitals_core::config::FeedConfig;
use vitals_core::feed::{FEED_CHANNEL, FeedKind, FeedMessage, FeedQuery};
use vitals_core::monitor::Monitor;
use vitals_core::pages::{DashboardPage, PageManager, PageWrapper, ReportPage};
use vitals_core::reading::SignalKind;
use vitals_core::ui::styling::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use vitals_core::ui::{Action, ColorPalette, PageId, TouchEvent, TouchPoint};

use crate::clock::SystemClock;
use crate::feed_client::FeedWorker;
use crate::mock::MockFeed;
use crate::settings::Settings;

/// Pixel scale factor for the simulator window.
const WINDOW_SCALE: u32 = 2;

/// Target frame duration (~30 FPS).
const FRAME_DURATION: Duration = Duration::from_millis(33);

/// Interval between synthetic sensor records.
const MOCK_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Feed sources
// ---------------------------------------------------------------------------

/// Where feed messages come from
enum FeedSource {
    Live(Vec<FeedWorker>),
    Mock { feed: MockFeed, last_sample: Instant },
}

impl FeedSource {
    /// Subscribe to both feeds, replacing any earlier subscriptions
    fn start(config: &FeedConfig<'_>, monitor: &mut Monitor) -> Self {
        if config.is_live() {
            info!("Streaming from {}", config.database_url);
            let workers = FeedKind::ALL
                .into_iter()
                .filter_map(|kind| {
                    let handle = monitor.subscribe(kind);
                    match FeedWorker::spawn(FeedQuery::new(config, kind), handle) {
                        Ok(worker) => Some(worker),
                        Err(e) => {
                            error!("Could not start {} worker: {}", kind.name(), e);
                            monitor.release(handle);
                            None
                        }
                    }
                })
                .collect();
            Self::Live(workers)
        } else {
            info!("No database configured, generating synthetic vitals");
            let sensor = monitor.subscribe(FeedKind::SensorData);
            let predictions = monitor.subscribe(FeedKind::Predictions);
            let feed = MockFeed::new(sensor, predictions);
            for message in feed.connect() {
                send(message);
            }
            Self::Mock {
                feed,
                last_sample: Instant::now(),
            }
        }
    }

    fn stop(self, monitor: &mut Monitor) {
        match self {
            Self::Live(workers) => {
                for worker in workers {
                    worker.stop();
                    monitor.release(worker.handle());
                }
            }
            Self::Mock { .. } => {
                for kind in FeedKind::ALL {
                    if let Some(handle) = monitor.subscriptions().active(kind) {
                        monitor.release(handle);
                    }
                }
            }
        }
    }

    /// Produce synthetic records when due; live workers post on their own
    fn tick(&mut self) {
        if let Self::Mock { feed, last_sample } = self {
            if last_sample.elapsed() >= MOCK_SAMPLE_INTERVAL {
                for message in feed.next_messages(MOCK_SAMPLE_INTERVAL.as_secs_f64()) {
                    send(message);
                }
                *last_sample = Instant::now();
            }
        }
    }
}

fn send(message: FeedMessage) {
    if FEED_CHANNEL.try_send(message).is_err() {
        warn!("Feed channel full, synthetic record dropped");
    }
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// Full-screen bounding rectangle.
fn screen_bounds() -> Rectangle {
    Rectangle::new(Point::zero(), Size::new(DISPLAY_WIDTH, DISPLAY_HEIGHT))
}

fn create_page_manager() -> PageManager {
    let bounds = screen_bounds();
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

/// Map an SDL keycode to a navigation action.
fn keycode_to_action(keycode: Keycode) -> Option<Action> {
    match keycode {
        Keycode::Num1 | Keycode::Kp1 => Some(Action::NavigateToPage(PageId::Dashboard)),
        Keycode::Num2 | Keycode::Kp2 => Some(Action::NavigateToPage(PageId::HeartRateReport)),
        Keycode::Num3 | Keycode::Kp3 => Some(Action::NavigateToPage(PageId::SpO2Report)),
        Keycode::Backspace => Some(Action::GoBack),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    info!("Starting vitals-rs simulator");
    info!(
        "Display: {}×{} (scale {}×)",
        DISPLAY_WIDTH, DISPLAY_HEIGHT, WINDOW_SCALE
    );
    info!("Keys: 1=Dashboard  2=HeartRate  3=SpO2  Backspace=Back  R=Resubscribe  Q=Quit");

    let settings = Settings::from_env();
    let config = settings.feed_config();
    let clock = SystemClock;
    let background = ColorPalette::default().background;

    let mut display = SimulatorDisplay::<Rgb565>::new(Size::new(DISPLAY_WIDTH, DISPLAY_HEIGHT));
    let output_settings = OutputSettingsBuilder::new().scale(WINDOW_SCALE).build();
    let mut window = Window::new("Vitals Simulator", &output_settings);

    let mut monitor = Monitor::new();
    let mut page_manager = create_page_manager();
    let mut source = FeedSource::start(&config, &mut monitor);

    // The SDL window is lazily initialized on the first `update()` call.
    // We must call `update()` once before `events()` or it will panic.
    let _ = display.clear(background);
    if let Err(e) = page_manager.draw_dirty(&mut display) {
        error!("Draw error: {:?}", e);
    }
    window.update(&display);

    'running: loop {
        let frame_start = Instant::now();

        // --- SDL events ---------------------------------------------------
        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'running,

                SimulatorEvent::KeyDown { keycode, .. } => {
                    if keycode == Keycode::Q || keycode == Keycode::Escape {
                        break 'running;
                    }
                    if keycode == Keycode::R {
                        info!("Resubscribing feeds");
                        source.stop(&mut monitor);
                        source = FeedSource::start(&config, &mut monitor);
                        continue;
                    }
                    if let Some(action) = keycode_to_action(keycode) {
                        info!("Key → {:?}", action);
                        page_manager.handle_action(action);
                    }
                }

                SimulatorEvent::MouseButtonDown { point, .. } => {
                    let touch = TouchEvent::Press(TouchPoint::new(
                        point.x.max(0) as u16,
                        point.y.max(0) as u16,
                    ));
                    if let Some(action) = page_manager.handle_touch(touch) {
                        info!("Touch → {:?}", action);
                        page_manager.handle_action(action);
                    }
                }

                SimulatorEvent::MouseButtonUp { point, .. } => {
                    let touch = TouchEvent::Release(TouchPoint::new(
                        point.x.max(0) as u16,
                        point.y.max(0) as u16,
                    ));
                    page_manager.handle_touch(touch);
                }

                _ => {}
            }
        }

        // --- Feeds --------------------------------------------------------
        source.tick();
        while let Ok(message) = FEED_CHANNEL.try_receive() {
            if let Some(event) = monitor.apply(message, &clock) {
                page_manager.broadcast_event(&event);
            }
        }

        // --- Render -------------------------------------------------------
        if page_manager.is_dirty() {
            let _ = display.clear(background);
            if let Err(e) = page_manager.draw_dirty(&mut display) {
                error!("Draw error: {:?}", e);
            }
        }

        window.update(&display);

        // --- Frame pacing -------------------------------------------------
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    source.stop(&mut monitor);
    info!("Simulator exiting");
}
