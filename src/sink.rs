//! Event sinks: the one-way boundary between a table and whoever watches it.
//!
//! A sink gets each event synchronously and may fail; the table logs the
//! failure and carries on. Sinks cannot reach back into the table.

use crate::error::SinkError;
use crate::events::Event;
use core::fmt::Display;
use log::Level;
use std::io::Write;

pub trait Sink<K, V> {
    fn record(&mut self, event: &Event<'_, K, V>) -> Result<(), SinkError>;
}

impl<K, V, T: Sink<K, V> + ?Sized> Sink<K, V> for &mut T {
    fn record(&mut self, event: &Event<'_, K, V>) -> Result<(), SinkError> {
        (**self).record(event)
    }
}

impl<K, V, T: Sink<K, V> + ?Sized> Sink<K, V> for Box<T> {
    fn record(&mut self, event: &Event<'_, K, V>) -> Result<(), SinkError> {
        (**self).record(event)
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl<K, V> Sink<K, V> for NullSink {
    #[inline]
    fn record(&mut self, _event: &Event<'_, K, V>) -> Result<(), SinkError> {
        Ok(())
    }
}

pub const DEFAULT_LOG_TARGET: &str = "traced_hashmap::events";

/// Routes rendered events through the `log` facade.
///
/// Insertion announcements and load factor changes log at `info`, resizes
/// at `warn`, index computations at `debug`, bucket dumps at `info`.
#[derive(Debug, Clone)]
pub struct LogSink {
    target: &'static str,
}

impl LogSink {
    pub fn new() -> Self {
        Self::with_target(DEFAULT_LOG_TARGET)
    }

    pub fn with_target(target: &'static str) -> Self {
        Self { target }
    }

    pub fn level_for<K, V>(event: &Event<'_, K, V>) -> Level {
        match event {
            Event::InsertionStarted { .. } | Event::LoadFactorObserved { .. } => Level::Info,
            Event::ThresholdChanged { .. } => Level::Warn,
            Event::InsertionComputed(_) => Level::Debug,
            Event::BucketsDumped { .. } => Level::Info,
        }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Display, V: Display> Sink<K, V> for LogSink {
    fn record(&mut self, event: &Event<'_, K, V>) -> Result<(), SinkError> {
        let level = Self::level_for(event);
        log::log!(target: self.target, level, "{event}");
        Ok(())
    }
}

/// Writes each rendered event followed by a newline.
#[derive(Debug)]
pub struct WriterSink<W> {
    out: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<K: Display, V: Display, W: Write> Sink<K, V> for WriterSink<W> {
    fn record(&mut self, event: &Event<'_, K, V>) -> Result<(), SinkError> {
        writeln!(self.out, "{event}")?;
        Ok(())
    }
}

/// Owned copy of an `Event`, as kept by `Recorder`.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedEvent<K, V> {
    InsertionStarted {
        key: K,
        value: V,
    },
    LoadFactorObserved(f32),
    ThresholdChanged {
        old_threshold: usize,
        new_threshold: usize,
        non_empty_buckets: usize,
    },
    InsertionComputed {
        key: K,
        value: V,
        native_hash: i32,
        hash: i32,
        capacity: usize,
        index: usize,
        binary_hash: String,
        binary_mask: String,
    },
    /// One inner list per bucket, each `(key, value, hash)` in chain order.
    BucketsDumped(Vec<Vec<(K, V, i32)>>),
}

impl<'a, K: Clone, V: Clone> From<&Event<'a, K, V>> for RecordedEvent<K, V> {
    fn from(event: &Event<'a, K, V>) -> Self {
        match event {
            Event::InsertionStarted { key, value } => RecordedEvent::InsertionStarted {
                key: (*key).clone(),
                value: (*value).clone(),
            },
            Event::LoadFactorObserved { value } => RecordedEvent::LoadFactorObserved(*value),
            Event::ThresholdChanged {
                old_threshold,
                new_threshold,
                non_empty_buckets,
            } => RecordedEvent::ThresholdChanged {
                old_threshold: *old_threshold,
                new_threshold: *new_threshold,
                non_empty_buckets: *non_empty_buckets,
            },
            Event::InsertionComputed(r) => RecordedEvent::InsertionComputed {
                key: r.key.clone(),
                value: r.value.clone(),
                native_hash: r.native_hash,
                hash: r.hash,
                capacity: r.capacity,
                index: r.index,
                binary_hash: r.binary_hash(),
                binary_mask: r.binary_mask(),
            },
            Event::BucketsDumped { buckets } => RecordedEvent::BucketsDumped(
                buckets
                    .iter()
                    .map(|chain| {
                        chain
                            .nodes
                            .iter()
                            .map(|n| (n.key.clone(), n.value.clone(), n.hash))
                            .collect()
                    })
                    .collect(),
            ),
        }
    }
}

/// Keeps owned copies of every event in arrival order.
#[derive(Debug, Clone)]
pub struct Recorder<K, V> {
    events: Vec<RecordedEvent<K, V>>,
}

impl<K, V> Recorder<K, V> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn events(&self) -> &[RecordedEvent<K, V>] {
        &self.events
    }

    /// Returns and forgets everything recorded so far.
    pub fn take(&mut self) -> Vec<RecordedEvent<K, V>> {
        std::mem::take(&mut self.events)
    }

    pub fn thresholds(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.events.iter().filter_map(|e| match e {
            RecordedEvent::ThresholdChanged {
                old_threshold,
                new_threshold,
                non_empty_buckets,
            } => Some((*old_threshold, *new_threshold, *non_empty_buckets)),
            _ => None,
        })
    }
}

impl<K, V> Default for Recorder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Sink<K, V> for Recorder<K, V> {
    fn record(&mut self, event: &Event<'_, K, V>) -> Result<(), SinkError> {
        self.events.push(RecordedEvent::from(event));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::InsertionReport;

    #[test]
    fn writer_sink_renders_one_event_per_line() {
        let mut sink = WriterSink::new(Vec::new());
        let e: Event<'_, &str, i32> = Event::LoadFactorObserved { value: 0.5 };
        sink.record(&e).unwrap();
        let e: Event<'_, &str, i32> = Event::InsertionStarted {
            key: &"a",
            value: &1,
        };
        sink.record(&e).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "LOAD FACTOR = 0.5\nInserting pair (a, 1)\n");
    }

    #[test]
    fn writer_sink_reports_io_failure() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let mut sink = WriterSink::new(Broken);
        let e: Event<'_, &str, i32> = Event::LoadFactorObserved { value: 1.0 };
        assert!(matches!(sink.record(&e), Err(SinkError::Io(_))));
    }

    #[test]
    fn recorder_keeps_owned_copies() {
        let mut rec: Recorder<String, i32> = Recorder::new();
        let key = "k".to_string();
        let report = InsertionReport::new(&key, &3, 107, 107, 16, 11);
        rec.record(&Event::InsertionComputed(report)).unwrap();
        rec.record(&Event::ThresholdChanged {
            old_threshold: 12,
            new_threshold: 24,
            non_empty_buckets: 9,
        })
        .unwrap();
        drop(key);
        assert_eq!(rec.events().len(), 2);
        assert!(matches!(
            &rec.events()[0],
            RecordedEvent::InsertionComputed { key, index: 11, .. } if key == "k"
        ));
        assert_eq!(rec.thresholds().collect::<Vec<_>>(), vec![(12, 24, 9)]);
        assert_eq!(rec.take().len(), 2);
        assert!(rec.events().is_empty());
    }

    #[test]
    fn log_levels_per_event() {
        let e: Event<'_, &str, i32> = Event::ThresholdChanged {
            old_threshold: 0,
            new_threshold: 0,
            non_empty_buckets: 0,
        };
        assert_eq!(LogSink::level_for(&e), Level::Warn);
        let e: Event<'_, &str, i32> = Event::LoadFactorObserved { value: 0.75 };
        assert_eq!(LogSink::level_for(&e), Level::Info);
        // Logging without an installed logger is a silent no-op.
        let mut sink = LogSink::new();
        assert!(sink.record(&e).is_ok());
    }

    #[test]
    fn borrowed_and_boxed_sinks_forward() {
        let e: Event<'_, &str, i32> = Event::LoadFactorObserved { value: 2.0 };
        let mut rec: Recorder<&str, i32> = Recorder::new();
        {
            let mut borrowed: &mut Recorder<&str, i32> = &mut rec;
            Sink::record(&mut borrowed, &e).unwrap();
        }
        let mut boxed: Box<dyn Sink<&str, i32>> = Box::new(NullSink);
        boxed.record(&e).unwrap();
        assert_eq!(rec.events(), &[RecordedEvent::LoadFactorObserved(2.0)]);
    }
}
