//! Ordered capture buffer shared by the input and mutation channels.
//!
//! Every entry is tagged with the channel it came from and a sequence
//! number. With dedupe on, a value is dropped only when it equals the
//! immediately preceding entry and that entry came from the other channel.

use crate::types::CaptureSource;

const LARGE_VALUE_THRESHOLD: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedValue {
    pub seq: u64,
    pub source: CaptureSource,
    pub value: String,
}

impl CapturedValue {
    /// Value as written to logs: verbatim, or `<hash:sha256:XXXXXXXXXXXXXXXX>`
    /// once it grows past the threshold.
    pub fn log_repr(&self) -> String {
        log_repr(&self.value)
    }
}

pub fn log_repr(value: &str) -> String {
    if value.len() <= LARGE_VALUE_THRESHOLD {
        return value.to_string();
    }
    use sha2::{Digest, Sha256};
    let hash = Sha256::digest(value.as_bytes());
    let prefix = hex_bytes(&hash[..8]);
    format!("<hash:sha256:{prefix}>")
}

fn hex_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[derive(Debug, Clone)]
pub struct CaptureBuffer {
    entries: Vec<CapturedValue>,
    next_seq: u64,
    dedupe_across_sources: bool,
}

impl CaptureBuffer {
    pub fn new(dedupe_across_sources: bool) -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 1,
            dedupe_across_sources,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Appends `value` and returns its sequence number. Returns `None`, and
    /// stores nothing, when dedupe is on and the last entry has an equal value
    /// from the other channel. Older entries are never consulted.
    pub fn push(&mut self, source: CaptureSource, value: impl Into<String>) -> Option<u64> {
        let value = value.into();
        if self.dedupe_across_sources {
            if let Some(last) = self.entries.last() {
                if last.source != source && last.value == value {
                    return None;
                }
            }
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(CapturedValue { seq, source, value });
        Some(seq)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|entry| entry.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CapturedValue] {
        &self.entries
    }

    pub fn values(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.value.clone()).collect()
    }
}

impl Default for CaptureBuffer {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_channel_duplicates_are_kept() {
        let mut buffer = CaptureBuffer::new(true);
        assert_eq!(buffer.push(CaptureSource::Input, "a"), Some(1));
        assert_eq!(buffer.push(CaptureSource::Input, "a"), Some(2));
        assert_eq!(buffer.push(CaptureSource::Input, ""), Some(3));
        assert_eq!(buffer.values(), vec!["a", "a", ""]);
    }

    #[test]
    fn cross_channel_echo_is_dropped_when_deduping() {
        let mut buffer = CaptureBuffer::new(true);
        buffer.push(CaptureSource::Mutation, "hello");
        assert_eq!(buffer.push(CaptureSource::Input, "hello"), None);
        assert_eq!(buffer.push(CaptureSource::Input, "hello!"), Some(2));
        assert_eq!(buffer.values(), vec!["hello", "hello!"]);
    }

    #[test]
    fn cross_channel_repeat_is_kept_when_not_adjacent() {
        let mut buffer = CaptureBuffer::new(true);
        buffer.push(CaptureSource::Mutation, "hello");
        buffer.push(CaptureSource::Input, "hell");
        assert_eq!(buffer.push(CaptureSource::Input, "hello"), Some(3));
        assert_eq!(buffer.push(CaptureSource::Mutation, "hell"), Some(4));
        assert_eq!(buffer.values(), vec!["hello", "hell", "hello", "hell"]);
    }

    #[test]
    fn cross_channel_echo_is_kept_without_dedupe() {
        let mut buffer = CaptureBuffer::new(false);
        buffer.push(CaptureSource::Mutation, "hello");
        buffer.push(CaptureSource::Input, "hello");
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.entries()[1].source, CaptureSource::Input);
    }

    #[test]
    fn clear_keeps_sequence_numbers_monotonic() {
        let mut buffer = CaptureBuffer::default();
        buffer.push(CaptureSource::Input, "a");
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.push(CaptureSource::Input, "b"), Some(2));
        assert_eq!(buffer.get(0), Some("b"));
        assert_eq!(buffer.get(1), None);
    }

    #[test]
    fn log_repr_hashes_large_values() {
        let small = CapturedValue {
            seq: 1,
            source: CaptureSource::Input,
            value: "abc".to_string(),
        };
        assert_eq!(small.log_repr(), "abc");

        let big = log_repr(&"x".repeat(LARGE_VALUE_THRESHOLD + 1));
        assert!(big.starts_with("<hash:sha256:"));
        assert_eq!(big.len(), "<hash:sha256:>".len() + 16);
    }
}
