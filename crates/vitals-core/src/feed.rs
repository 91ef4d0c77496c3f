//! Live feeds from the real-time database and their subscription bookkeeping
//!
//! Two feeds exist: raw sensor records and model predictions. A host-side
//! client streams each one and posts [`FeedMessage`]s into [`FEED_CHANNEL`];
//! the UI loop drains the channel and hands every message to the
//! [`Monitor`](crate::monitor::Monitor).
//!
//! Each feed has at most one active subscription. Subscribing again replaces
//! the previous subscription with a new generation, and messages still in
//! flight from the old generation are discarded by the monitor.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{debug, info};
use serde_json::Value;

use crate::config::FeedConfig;
use crate::metrics::Severity;

/// Channel capacity for feed messages
pub const FEED_CHANNEL_CAPACITY: usize = 32;

/// Global channel carrying feed messages from the client to the UI loop
pub static FEED_CHANNEL: Channel<CriticalSectionRawMutex, FeedMessage, FEED_CHANNEL_CAPACITY> =
    Channel::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    SensorData,
    Predictions,
}

impl FeedKind {
    pub const ALL: [FeedKind; 2] = [FeedKind::SensorData, FeedKind::Predictions];

    pub const fn name(self) -> &'static str {
        match self {
            Self::SensorData => "sensor data",
            Self::Predictions => "predictions",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::SensorData => 0,
            Self::Predictions => 1,
        }
    }
}

/// Query for streaming the newest children of one node, ordered by key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub feed: FeedKind,
    /// `{database_url}/{path}.json`
    pub url: String,
    pub limit_to_last: usize,
    pub auth: Option<String>,
}

impl FeedQuery {
    pub fn new(config: &FeedConfig<'_>, feed: FeedKind) -> Self {
        let base = config.database_url.trim().trim_end_matches('/');
        let path = config.path(feed).trim_matches('/');
        Self {
            feed,
            url: format!("{base}/{path}.json"),
            limit_to_last: config.limit(feed).max(1),
            auth: config.auth.map(String::from),
        }
    }

    /// Query-string pairs, unencoded
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(3);
        params.push(("orderBy", String::from("\"$key\"")));
        params.push(("limitToLast", format!("{}", self.limit_to_last)));
        if let Some(auth) = &self.auth {
            params.push(("auth", auth.clone()));
        }
        params
    }
}

/// Health of one feed's connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Connected,
    /// Dropped; the client will reconnect
    Disconnected,
    /// The server refused or revoked access; no reconnect
    Cancelled,
}

impl ConnectionState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Connecting => "Connecting",
            Self::Connected => "Live",
            Self::Disconnected => "Reconnecting",
            Self::Cancelled => "Offline",
        }
    }

    pub const fn severity(self) -> Severity {
        match self {
            Self::Connected => Severity::Normal,
            Self::Connecting | Self::Disconnected => Severity::Warning,
            Self::Cancelled => Severity::Danger,
        }
    }
}

/// Message posted by a feed client for one subscription generation
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    /// A newly added sensor record, as raw JSON
    Sensor { generation: u32, record: Value },
    /// A newly added prediction record, as raw JSON
    Prediction { generation: u32, record: Value },
    Connection {
        feed: FeedKind,
        generation: u32,
        state: ConnectionState,
    },
}

impl FeedMessage {
    pub fn feed(&self) -> FeedKind {
        match self {
            Self::Sensor { .. } => FeedKind::SensorData,
            Self::Prediction { .. } => FeedKind::Predictions,
            Self::Connection { feed, .. } => *feed,
        }
    }

    pub fn generation(&self) -> u32 {
        match self {
            Self::Sensor { generation, .. }
            | Self::Prediction { generation, .. }
            | Self::Connection { generation, .. } => *generation,
        }
    }
}

/// Identifies one subscription to one feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionHandle {
    feed: FeedKind,
    generation: u32,
}

impl SubscriptionHandle {
    pub fn feed(&self) -> FeedKind {
        self.feed
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Wrap a sensor or prediction record for this subscription's feed
    pub fn record(&self, record: Value) -> FeedMessage {
        match self.feed {
            FeedKind::SensorData => FeedMessage::Sensor {
                generation: self.generation,
                record,
            },
            FeedKind::Predictions => FeedMessage::Prediction {
                generation: self.generation,
                record,
            },
        }
    }

    pub fn connection(&self, state: ConnectionState) -> FeedMessage {
        FeedMessage::Connection {
            feed: self.feed,
            generation: self.generation,
            state,
        }
    }
}

/// Registry of the active subscription per feed
#[derive(Debug, Default)]
pub struct Subscriptions {
    next_generation: u32,
    active: [Option<u32>; 2],
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a subscription, replacing any active one for the same feed
    pub fn subscribe(&mut self, feed: FeedKind) -> SubscriptionHandle {
        self.next_generation = self.next_generation.wrapping_add(1);
        let generation = self.next_generation;

        if let Some(previous) = self.active[feed.index()].replace(generation) {
            info!(
                "Replacing {} subscription #{} with #{}",
                feed.name(),
                previous,
                generation
            );
        } else {
            info!("Subscribed to {} (#{})", feed.name(), generation);
        }

        SubscriptionHandle { feed, generation }
    }

    /// End a subscription.
    ///
    /// Returns `false` (and leaves the registry alone) if the handle was
    /// already released or has been replaced.
    pub fn release(&mut self, handle: SubscriptionHandle) -> bool {
        let slot = &mut self.active[handle.feed.index()];
        if *slot == Some(handle.generation) {
            *slot = None;
            debug!("Released {} subscription #{}", handle.feed.name(), handle.generation);
            true
        } else {
            false
        }
    }

    pub fn is_current(&self, feed: FeedKind, generation: u32) -> bool {
        self.active[feed.index()] == Some(generation)
    }

    pub fn active(&self, feed: FeedKind) -> Option<SubscriptionHandle> {
        self.active[feed.index()].map(|generation| SubscriptionHandle { feed, generation })
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|slot| slot.is_some()).count()
    }
}
