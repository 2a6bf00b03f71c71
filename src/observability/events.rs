//! Structured navigation event stream.
//!
//! Events are written as newline-delimited JSON, each line carrying a
//! monotonically increasing sequence number and a UTC timestamp.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete navigation event, tagged with `"type"` when serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The navigation list was (re)built.
    NavigationBuilt {
        /// When the list was built.
        timestamp: DateTime<Utc>,
        /// Number of entries.
        entries: usize,
        /// Target ids in list order.
        target_ids: Vec<String>,
    },

    /// A different entry became active.
    SectionActivated {
        /// When the entry was activated.
        timestamp: DateTime<Utc>,
        /// Section id of the new active entry.
        target_id: String,
        /// Label of the new active entry.
        label: String,
        /// Index of the previously active entry.
        previous: Option<usize>,
    },

    /// The back-to-top control changed visibility.
    BackToTopToggled {
        /// When the control toggled.
        timestamp: DateTime<Utc>,
        /// Scroll offset that caused the toggle.
        offset: f64,
        /// New visibility.
        visible: bool,
    },

    /// A smooth scroll was requested.
    ScrollRequested {
        /// When the scroll was requested.
        timestamp: DateTime<Utc>,
        /// Section scrolled to; `None` for a return to the top.
        target_id: Option<String>,
    },

    /// A click did nothing because its target is gone.
    ClickIgnored {
        /// When the click happened.
        timestamp: DateTime<Utc>,
        /// Index of the clicked item.
        index: usize,
        /// Target id, when the index was in range.
        target_id: Option<String>,
    },
}

impl Event {
    /// A [`NavigationBuilt`](Self::NavigationBuilt) event stamped now.
    #[must_use]
    pub fn navigation_built(target_ids: Vec<String>) -> Self {
        Self::NavigationBuilt {
            timestamp: Utc::now(),
            entries: target_ids.len(),
            target_ids,
        }
    }

    /// A [`SectionActivated`](Self::SectionActivated) event stamped now.
    #[must_use]
    pub fn section_activated(target_id: &str, label: &str, previous: Option<usize>) -> Self {
        Self::SectionActivated {
            timestamp: Utc::now(),
            target_id: target_id.to_string(),
            label: label.to_string(),
            previous,
        }
    }

    /// A [`BackToTopToggled`](Self::BackToTopToggled) event stamped now.
    #[must_use]
    pub fn back_to_top_toggled(offset: f64, visible: bool) -> Self {
        Self::BackToTopToggled {
            timestamp: Utc::now(),
            offset,
            visible,
        }
    }

    /// A [`ScrollRequested`](Self::ScrollRequested) event stamped now.
    #[must_use]
    pub fn scroll_requested(target_id: Option<&str>) -> Self {
        Self::ScrollRequested {
            timestamp: Utc::now(),
            target_id: target_id.map(str::to_string),
        }
    }

    /// A [`ClickIgnored`](Self::ClickIgnored) event stamped now.
    #[must_use]
    pub fn click_ignored(index: usize, target_id: Option<&str>) -> Self {
        Self::ClickIgnored {
            timestamp: Utc::now(),
            index,
            target_id: target_id.map(str::to_string),
        }
    }

    /// Variant name as it appears in the `"type"` field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NavigationBuilt { .. } => "NavigationBuilt",
            Self::SectionActivated { .. } => "SectionActivated",
            Self::BackToTopToggled { .. } => "BackToTopToggled",
            Self::ScrollRequested { .. } => "ScrollRequested",
            Self::ClickIgnored { .. } => "ClickIgnored",
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EventEnvelope {
    sequence: u64,
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Serialization and I/O failures are dropped: event output never
/// interrupts navigation.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that writes to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Creates an emitter that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates an emitter that discards everything.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Creates an emitter writing into a shared in-memory buffer.
    #[must_use]
    pub fn in_memory() -> (Self, SharedBuffer) {
        let buffer = SharedBuffer::default();
        (Self::new(Box::new(buffer.clone())), buffer)
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope { sequence, event };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

/// Cloneable in-memory sink for [`EventEmitter::in_memory`].
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// Everything written so far, lossily decoded.
    #[must_use]
    pub fn contents(&self) -> String {
        self.0
            .lock()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("event buffer poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(buffer: &SharedBuffer) -> Vec<serde_json::Value> {
        buffer
            .contents()
            .lines()
            .map(|l| serde_json::from_str(l).expect("valid JSON line"))
            .collect()
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let json = serde_json::to_value(Event::scroll_requested(Some("usage"))).unwrap();
        assert_eq!(json["type"], "ScrollRequested");
        assert_eq!(json["target_id"], "usage");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn emitter_writes_sequenced_jsonl() {
        let (emitter, buffer) = EventEmitter::in_memory();
        emitter.emit(Event::navigation_built(vec!["a".into(), "b".into()]));
        emitter.emit(Event::back_to_top_toggled(350.0, true));
        emitter.emit(Event::click_ignored(4, None));

        let lines = lines(&buffer);
        assert_eq!(lines.len(), 3);
        assert_eq!(emitter.event_count(), 3);
        for (i, line) in lines.iter().enumerate() {
            assert_eq!(line["sequence"], i as u64);
        }
        assert_eq!(lines[0]["entries"], 2);
        assert_eq!(lines[1]["visible"], true);
        assert!(lines[2]["target_id"].is_null());
    }

    #[test]
    fn every_variant_round_trips_its_kind() {
        let events = [
            Event::navigation_built(Vec::new()),
            Event::section_activated("b", "Overview", Some(0)),
            Event::back_to_top_toggled(0.0, false),
            Event::scroll_requested(None),
            Event::click_ignored(1, Some("gone")),
        ];
        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["type"], event.kind());
        }
    }

    #[test]
    fn noop_emitter_still_counts() {
        let emitter = EventEmitter::noop();
        emitter.emit(Event::scroll_requested(None));
        assert_eq!(emitter.event_count(), 1);
    }

    #[test]
    fn file_emitter_writes_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let emitter = EventEmitter::from_file(&path).unwrap();
        emitter.emit(Event::section_activated("a", "a", None));
        drop(emitter);
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("\"SectionActivated\""));
    }
}
