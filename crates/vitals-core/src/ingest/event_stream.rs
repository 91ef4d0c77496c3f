//! Decoder for the real-time database REST streaming protocol
//!
//! The database answers a `GET` with `Accept: text/event-stream` with a
//! server-sent-events stream. Each frame is an `event:` line, a `data:` line
//! and a blank line:
//!
//! ```text
//! event: put
//! data: {"path":"/","data":{"-Nabc":{"dev60_HR":72,"saturation":97}}}
//!
//! event: keep-alive
//! data: null
//! ```
//!
//! [`EventStreamDecoder`] turns lines into [`StreamEvent`]s, and
//! [`ChildCursor`] turns `put`/`patch` events into newly added children, the
//! same records a `child_added` listener would see.

use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;
use log::debug;
use serde_json::Value;
use thiserror_no_std::Error;

/// One decoded server-sent event
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// `data` replaces whatever was at `path` (relative to the subscribed node)
    Put { path: String, data: Value },
    /// Each key of `data` replaces the matching child of `path`
    Patch { path: String, data: Value },
    KeepAlive,
    /// The server closed the stream, usually because rules denied access
    Cancel(String),
    /// The auth credential expired or was revoked
    AuthRevoked,
}

impl StreamEvent {
    /// Whether the server will send nothing more on this connection
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancel(_) | Self::AuthRevoked)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("unknown stream event `{0}`")]
    UnknownEvent(String),
    #[error("event payload is not valid JSON")]
    InvalidJson,
    #[error("event payload is missing `{0}`")]
    MissingField(&'static str),
    #[error("data received without an event name")]
    MissingEvent,
}

/// Line-oriented SSE frame decoder.
///
/// Feed it every line of the response body with the line terminator removed
/// (a trailing `\r` is tolerated). `id:` and `retry:` fields and `:` comments
/// are ignored.
#[derive(Debug, Default)]
pub struct EventStreamDecoder {
    event: Option<String>,
    data: String,
    has_data: bool,
}

impl EventStreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one line; returns an event when the line completes a frame.
    pub fn push_line(&mut self, line: &str) -> Option<Result<StreamEvent, StreamError>> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            return self.finish_frame();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => {
                if self.has_data {
                    self.data.push('\n');
                }
                self.data.push_str(value);
                self.has_data = true;
            }
            _ => {}
        }
        None
    }

    fn finish_frame(&mut self) -> Option<Result<StreamEvent, StreamError>> {
        let event = self.event.take();
        let data = core::mem::take(&mut self.data);
        let had_data = core::mem::replace(&mut self.has_data, false);

        match event {
            Some(name) => Some(parse_event(&name, &data)),
            None if had_data => Some(Err(StreamError::MissingEvent)),
            // Stray blank line between frames
            None => None,
        }
    }
}

fn parse_event(name: &str, data: &str) -> Result<StreamEvent, StreamError> {
    match name {
        "put" | "patch" => {
            let mut payload: Value =
                serde_json::from_str(data).map_err(|_| StreamError::InvalidJson)?;
            let path = payload
                .get("path")
                .and_then(Value::as_str)
                .map(String::from)
                .ok_or(StreamError::MissingField("path"))?;
            let data = payload
                .get_mut("data")
                .map(Value::take)
                .ok_or(StreamError::MissingField("data"))?;

            if name == "put" {
                Ok(StreamEvent::Put { path, data })
            } else {
                Ok(StreamEvent::Patch { path, data })
            }
        }
        "keep-alive" => Ok(StreamEvent::KeepAlive),
        "cancel" => {
            let reason = serde_json::from_str::<String>(data).unwrap_or_else(|_| data.to_string());
            Ok(StreamEvent::Cancel(reason))
        }
        "auth_revoked" => Ok(StreamEvent::AuthRevoked),
        other => Err(StreamError::UnknownEvent(other.to_string())),
    }
}

/// Order of two child keys as the database sorts them by key.
///
/// Keys that parse as 32-bit integers sort first, numerically; all other keys
/// follow in lexicographic order. Push IDs are lexicographically increasing
/// so they sort in creation order.
pub fn compare_keys(a: &str, b: &str) -> Ordering {
    match (integer_key(a), integer_key(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn integer_key(key: &str) -> Option<i32> {
    let digits = key.strip_prefix('-').unwrap_or(key);
    let canonical = !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits.len() == 1 || !digits.starts_with('0'));
    if canonical { key.parse().ok() } else { None }
}

/// Tracks which children of a streamed node have been delivered.
///
/// Only children whose key sorts after the last delivered key are emitted,
/// so a reconnect that replays the initial snapshot yields nothing twice.
/// Deletions (`null` data) and edits below a child are not additions and
/// are ignored.
#[derive(Debug, Default, Clone)]
pub struct ChildCursor {
    last_key: Option<String>,
}

impl ChildCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key of the newest child delivered so far
    pub fn last_key(&self) -> Option<&str> {
        self.last_key.as_deref()
    }

    /// Newly added children carried by `event`, in key order
    pub fn added_children(&mut self, event: StreamEvent) -> Vec<(String, Value)> {
        let (path, data, replaces_node) = match event {
            StreamEvent::Put { path, data } => (path, data, true),
            StreamEvent::Patch { path, data } => (path, data, false),
            _ => return Vec::new(),
        };

        let child = path.trim_matches('/');
        let mut children = if child.is_empty() {
            match data {
                Value::Object(map) => map.into_iter().filter(|(_, v)| !v.is_null()).collect(),
                _ => Vec::new(),
            }
        } else if replaces_node && !child.contains('/') && !data.is_null() {
            // A put at `/<key>` adds (or replaces) one child
            vec![(child.to_string(), data)]
        } else {
            Vec::new()
        };

        children.sort_by(|(a, _), (b, _)| compare_keys(a, b));
        children.retain(|(key, _)| self.is_new(key));

        if let Some((key, _)) = children.last() {
            debug!("Stream cursor advanced to {}", key);
            self.last_key = Some(key.clone());
        }
        children
    }

    fn is_new(&self, key: &str) -> bool {
        match &self.last_key {
            Some(last) => compare_keys(key, last) == Ordering::Greater,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(lines: &[&str]) -> Vec<Result<StreamEvent, StreamError>> {
        let mut decoder = EventStreamDecoder::new();
        lines.iter().filter_map(|line| decoder.push_line(line)).collect()
    }

    fn keys(children: &[(String, Value)]) -> Vec<&str> {
        children.iter().map(|(k, _)| k.as_str()).collect()
    }

    fn put(path: &str, data: Value) -> StreamEvent {
        StreamEvent::Put {
            path: path.into(),
            data,
        }
    }

    #[test]
    fn test_decodes_put_frame() {
        let events = decode(&[
            "event: put",
            r#"data: {"path":"/","data":{"a":1}}"#,
            "",
        ]);
        assert_eq!(events, [Ok(put("/", json!({ "a": 1 })))]);
    }

    #[test]
    fn test_keep_alive_and_auth_revoked() {
        let events = decode(&[
            "event: keep-alive",
            "data: null",
            "",
            "",
            "event: auth_revoked",
            "data: credential is no longer valid",
            "",
        ]);
        assert_eq!(events, [Ok(StreamEvent::KeepAlive), Ok(StreamEvent::AuthRevoked)]);
        assert!(StreamEvent::AuthRevoked.is_terminal());
    }

    #[test]
    fn test_cancel_carries_reason() {
        let events = decode(&["event: cancel", r#"data: "Permission denied""#, ""]);
        assert_eq!(events, [Ok(StreamEvent::Cancel("Permission denied".into()))]);
    }

    #[test]
    fn test_tolerates_crlf_and_comments() {
        let events = decode(&[
            ": hello\r",
            "event:patch\r",
            "data:{\"path\":\"/k\",\"data\":{\"saturation\":96}}\r",
            "\r",
        ]);
        assert_eq!(
            events,
            [Ok(StreamEvent::Patch {
                path: "/k".into(),
                data: json!({ "saturation": 96 }),
            })]
        );
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let events = decode(&["event: put", "data: {not json", ""]);
        assert_eq!(events, [Err(StreamError::InvalidJson)]);
    }

    #[test]
    fn test_unknown_event_and_missing_name() {
        let events = decode(&["event: rumble", "data: 1", "", "data: orphan", ""]);
        assert_eq!(
            events,
            [
                Err(StreamError::UnknownEvent("rumble".into())),
                Err(StreamError::MissingEvent),
            ]
        );
    }

    #[test]
    fn test_decoder_recovers_after_error() {
        let events = decode(&[
            "event: put",
            "data: []",
            "",
            "event: put",
            r#"data: {"path":"/x","data":5}"#,
            "",
        ]);
        assert_eq!(events[0], Err(StreamError::MissingField("path")));
        assert_eq!(events[1], Ok(put("/x", json!(5))));
    }

    #[test]
    fn test_key_order() {
        assert_eq!(compare_keys("2", "10"), Ordering::Less);
        assert_eq!(compare_keys("-5", "3"), Ordering::Less);
        assert_eq!(compare_keys("99", "-Nabc"), Ordering::Less);
        assert_eq!(compare_keys("007", "7"), Ordering::Greater);
        assert_eq!(compare_keys("-NaB", "-Nab"), Ordering::Less);
        assert_eq!(compare_keys("99999999999", "1"), Ordering::Greater);
    }

    #[test]
    fn test_snapshot_children_in_key_order() {
        let mut cursor = ChildCursor::new();
        let children = cursor.added_children(put(
            "/",
            json!({ "10": { "dev60_HR": 3 }, "9": { "dev60_HR": 2 }, "-Nz": { "dev60_HR": 4 } }),
        ));
        assert_eq!(keys(&children), ["9", "10", "-Nz"]);
        assert_eq!(cursor.last_key(), Some("-Nz"));
    }

    #[test]
    fn test_single_child_put() {
        let mut cursor = ChildCursor::new();
        cursor.added_children(put("/", json!({ "-Na": {} })));
        let children = cursor.added_children(put("/-Nb", json!({ "dev60_HR": 80 })));
        assert_eq!(keys(&children), ["-Nb"]);
        assert_eq!(children[0].1, json!({ "dev60_HR": 80 }));
    }

    #[test]
    fn test_replayed_snapshot_yields_nothing_new() {
        let mut cursor = ChildCursor::new();
        let snapshot = json!({ "-Na": {}, "-Nb": {} });
        assert_eq!(cursor.added_children(put("/", snapshot.clone())).len(), 2);
        assert!(cursor.added_children(put("/", snapshot)).is_empty());

        let resumed = cursor.added_children(put("/", json!({ "-Nb": {}, "-Nc": {} })));
        assert_eq!(keys(&resumed), ["-Nc"]);
    }

    #[test]
    fn test_ignores_deletes_edits_and_keep_alive() {
        let mut cursor = ChildCursor::new();
        cursor.added_children(put("/-Nb", json!({ "dev60_HR": 1 })));
        assert!(cursor.added_children(put("/-Nc", Value::Null)).is_empty());
        assert!(cursor.added_children(put("/-Nd/saturation", json!(97))).is_empty());
        assert!(cursor
            .added_children(StreamEvent::Patch {
                path: "/-Nb".into(),
                data: json!({ "saturation": 97 }),
            })
            .is_empty());
        assert!(cursor.added_children(StreamEvent::KeepAlive).is_empty());
        assert!(cursor.added_children(put("/", Value::Null)).is_empty());
        assert_eq!(cursor.last_key(), Some("-Nb"));
    }

    #[test]
    fn test_root_patch_adds_children() {
        let mut cursor = ChildCursor::new();
        let children = cursor.added_children(StreamEvent::Patch {
            path: "/".into(),
            data: json!({ "-Nb": { "dev60_HR": 1 }, "-Na": null }),
        });
        assert_eq!(keys(&children), ["-Nb"]);
    }
}
