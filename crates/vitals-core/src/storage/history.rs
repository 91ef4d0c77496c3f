use heapless::Deque;

use crate::reading::Reading;

/// Fixed-capacity FIFO of readings for one signal.
///
/// Appending to a full buffer evicts the oldest reading, so the buffer always
/// holds the last `N` readings in the order they arrived.
#[derive(Debug, Clone)]
pub struct HistoryBuffer<const N: usize> {
    readings: Deque<Reading, N>,
}

impl<const N: usize> HistoryBuffer<N> {
    pub const fn new() -> Self {
        Self {
            readings: Deque::new(),
        }
    }

    /// Append a reading at the tail, evicting the head if the buffer is full
    pub fn append(&mut self, reading: Reading) {
        if self.readings.is_full() {
            self.readings.pop_front();
        }
        // Cannot fail: a slot was freed above if the deque was full.
        let _ = self.readings.push_back(reading);
    }

    /// The last `n` readings in arrival order (fewer if the buffer is shorter)
    pub fn snapshot(&self, n: usize) -> impl Iterator<Item = &Reading> + '_ {
        let skip = self.readings.len().saturating_sub(n);
        self.readings.iter().skip(skip)
    }

    /// The last `n` readings, newest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &Reading> + '_ {
        self.readings.iter().rev().take(n)
    }

    /// Signal values in arrival order, with "no signal" coerced to 0.
    ///
    /// The iterator borrows the buffer; take a fresh one after every append.
    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.readings.iter().map(Reading::signal_value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reading> + '_ {
        self.readings.iter()
    }

    /// Most recently appended reading
    pub fn latest(&self) -> Option<&Reading> {
        self.readings.back()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for HistoryBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::vec::Vec;

    fn reading(value: f32) -> Reading {
        Reading::new(value, "2025-01-01T00:00:00Z", format!("#{value}"))
    }

    #[test]
    fn test_length_never_exceeds_capacity() {
        let mut buffer = HistoryBuffer::<5>::new();
        for n in 1..=12 {
            buffer.append(reading(n as f32));
            assert_eq!(buffer.len(), n.min(5));
        }
        assert_eq!(buffer.capacity(), 5);
    }

    #[test]
    fn test_keeps_last_capacity_in_arrival_order() {
        let mut buffer = HistoryBuffer::<4>::new();
        for value in [9.0, 3.0, 7.0, 1.0, 8.0, 2.0] {
            buffer.append(reading(value));
        }
        let values: Vec<f32> = buffer.values().collect();
        assert_eq!(values, [7.0, 1.0, 8.0, 2.0]);
    }

    #[test]
    fn test_order_ignores_timestamps() {
        let mut buffer = HistoryBuffer::<3>::new();
        buffer.append(Reading::new(1.0, "2025-01-01T00:00:09Z", "late"));
        buffer.append(Reading::new(2.0, "2025-01-01T00:00:01Z", "early"));
        let labels: Vec<&str> = buffer.iter().map(Reading::label).collect();
        assert_eq!(labels, ["late", "early"]);
    }

    #[test]
    fn test_snapshot_returns_tail() {
        let mut buffer = HistoryBuffer::<10>::new();
        for value in 1..=6 {
            buffer.append(reading(value as f32));
        }
        let tail: Vec<f32> = buffer.snapshot(3).map(Reading::value).collect();
        assert_eq!(tail, [4.0, 5.0, 6.0]);

        let all: Vec<f32> = buffer.snapshot(50).map(Reading::value).collect();
        assert_eq!(all.len(), 6);
        assert_eq!(buffer.len(), 6, "snapshot must not mutate");
    }

    #[test]
    fn test_recent_is_newest_first() {
        let mut buffer = HistoryBuffer::<10>::new();
        for value in 1..=4 {
            buffer.append(reading(value as f32));
        }
        let recent: Vec<f32> = buffer.recent(2).map(Reading::value).collect();
        assert_eq!(recent, [4.0, 3.0]);
        assert_eq!(buffer.latest().map(Reading::value), Some(4.0));
    }

    #[test]
    fn test_values_coerce_missing_to_zero() {
        let mut buffer = HistoryBuffer::<4>::new();
        buffer.append(reading(72.0));
        buffer.append(reading(0.0));
        buffer.append(reading(-3.0));
        let values: Vec<f32> = buffer.values().collect();
        assert_eq!(values, [72.0, 0.0, 0.0]);
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = HistoryBuffer::<4>::default();
        assert!(buffer.is_empty());
        assert!(buffer.latest().is_none());
        assert_eq!(buffer.snapshot(3).count(), 0);
    }
}
