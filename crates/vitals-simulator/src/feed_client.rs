//! Streaming client for the real-time database's REST event stream.
//!
//! Each subscription runs on its own worker thread. The worker holds a
//! `text/event-stream` GET open, decodes the events, keeps only children
//! that were not delivered before, and posts them to [`FEED_CHANNEL`].
//! Dropped connections are retried after [`RECONNECT_DELAY`]; a `cancel` or
//! `auth_revoked` event, or an authorization failure, ends the worker.

use std::io::{BufRead, BufReader};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use embassy_sync::channel::TrySendError;
use log::{debug, error, info, warn};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use thiserror::Error;
use vitals_core::feed::{
    ConnectionState, FEED_CHANNEL, FeedMessage, FeedQuery, SubscriptionHandle,
};
use vitals_core::ingest::{ChildCursor, EventStreamDecoder, StreamEvent};

/// Wait before reopening a dropped stream
pub const RECONNECT_DELAY: Duration = Duration::from_secs(3);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Poll interval while the feed channel is full or a delay is pending
const BACKOFF_SLICE: Duration = Duration::from_millis(20);

#[derive(Debug, Error)]
pub enum FeedClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("stream read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("server answered with status {0}")]
    Status(u16),
}

impl FeedClientError {
    /// Errors that retrying will not fix
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Status(401 | 403))
    }
}

/// How one connection ended
#[derive(Debug, Clone, PartialEq, Eq)]
enum StreamEnd {
    /// The server closed the stream; reconnect
    Closed,
    /// `cancel` or `auth_revoked`; do not reconnect
    Terminated,
    Stopped,
}

/// Background thread streaming one subscription
pub struct FeedWorker {
    handle: SubscriptionHandle,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl FeedWorker {
    pub fn spawn(query: FeedQuery, handle: SubscriptionHandle) -> Result<Self, FeedClientError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(None::<Duration>)
            .build()?;
        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = Arc::clone(&stop);

        let thread = thread::Builder::new()
            .name(format!("feed-{}", handle.generation()))
            .spawn(move || run(client, query, handle, worker_stop))?;

        Ok(Self {
            handle,
            stop,
            thread: Some(thread),
        })
    }

    pub fn handle(&self) -> SubscriptionHandle {
        self.handle
    }

    /// Ask the worker to stop; it exits at the next line or retry
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

impl Drop for FeedWorker {
    fn drop(&mut self) {
        self.stop();
        // A stream blocked on a read only wakes at the next keep-alive, so
        // only join threads that are already done.
        if let Some(thread) = self.thread.take_if(|t| t.is_finished()) {
            let _ = thread.join();
        }
    }
}

fn run(client: Client, query: FeedQuery, handle: SubscriptionHandle, stop: Arc<AtomicBool>) {
    let feed = handle.feed().name();
    // Survives reconnects so the replayed history is not delivered twice
    let mut cursor = ChildCursor::new();

    while !stop.load(Ordering::Relaxed) {
        match stream_once(&client, &query, handle, &mut cursor, &stop) {
            Ok(StreamEnd::Stopped) => break,
            Ok(StreamEnd::Terminated) => {
                post(handle.connection(ConnectionState::Cancelled), &stop);
                break;
            }
            Ok(StreamEnd::Closed) => {
                info!("{} stream closed, reconnecting", feed);
            }
            Err(e) if e.is_fatal() => {
                error!("{} stream refused: {}", feed, e);
                post(handle.connection(ConnectionState::Cancelled), &stop);
                break;
            }
            Err(e) => {
                warn!("{} stream failed: {}", feed, e);
            }
        }

        post(handle.connection(ConnectionState::Disconnected), &stop);
        if !sleep_unless_stopped(RECONNECT_DELAY, &stop) {
            break;
        }
    }

    debug!("{} worker #{} exiting", feed, handle.generation());
}

fn stream_once(
    client: &Client,
    query: &FeedQuery,
    handle: SubscriptionHandle,
    cursor: &mut ChildCursor,
    stop: &AtomicBool,
) -> Result<StreamEnd, FeedClientError> {
    debug!("Opening {}", query.url);
    let response = client
        .get(&query.url)
        .query(&query.params())
        .header(ACCEPT, "text/event-stream")
        .send()?;

    let status = response.status();
    if !status.is_success() {
        return Err(FeedClientError::Status(status.as_u16()));
    }
    post(handle.connection(ConnectionState::Connected), stop);

    let mut decoder = EventStreamDecoder::new();
    for line in BufReader::new(response).lines() {
        if stop.load(Ordering::Relaxed) {
            return Ok(StreamEnd::Stopped);
        }

        let event = match decoder.push_line(&line?) {
            None => continue,
            Some(Ok(event)) => event,
            Some(Err(e)) => {
                warn!("Ignoring {} event: {}", handle.feed().name(), e);
                continue;
            }
        };

        if ends_stream(handle.feed().name(), &event) {
            return Ok(StreamEnd::Terminated);
        }

        for (key, record) in cursor.added_children(event) {
            debug!("{} child {}", handle.feed().name(), key);
            if !post(handle.record(record), stop) {
                return Ok(StreamEnd::Stopped);
            }
        }
    }

    Ok(StreamEnd::Closed)
}

/// Whether the server is done with this connection; logs why
fn ends_stream(feed: &str, event: &StreamEvent) -> bool {
    if !event.is_terminal() {
        return false;
    }
    match event {
        StreamEvent::Cancel(reason) => warn!("{} stream cancelled: {}", feed, reason),
        _ => warn!("{} stream auth revoked", feed),
    }
    true
}

/// Post to the feed channel, waiting while it is full.
///
/// Returns `false` if the worker was stopped before the message fit.
fn post(mut message: FeedMessage, stop: &AtomicBool) -> bool {
    loop {
        match FEED_CHANNEL.try_send(message) {
            Ok(()) => return true,
            Err(TrySendError::Full(returned)) => {
                if stop.load(Ordering::Relaxed) {
                    return false;
                }
                message = returned;
                thread::sleep(BACKOFF_SLICE);
            }
        }
    }
}

/// Returns `false` if stopped during the wait
fn sleep_unless_stopped(duration: Duration, stop: &AtomicBool) -> bool {
    let mut waited = Duration::ZERO;
    while waited < duration {
        if stop.load(Ordering::Relaxed) {
            return false;
        }
        thread::sleep(BACKOFF_SLICE);
        waited += BACKOFF_SLICE;
    }
    !stop.load(Ordering::Relaxed)
}
