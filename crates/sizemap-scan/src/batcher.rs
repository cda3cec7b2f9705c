//! Time-windowed batching of scan records.
//!
//! The walker hands every record it yields to a [`RecordSink`]. The
//! [`StreamingBatcher`] is the sink used for live consumers: it buffers
//! records and delivers them to a [`BatchSink`] whenever the update interval
//! has elapsed since the previous delivery. Delivery happens synchronously on
//! the thread that adds the record; there is no background timer.

use std::time::{Duration, Instant};

use sizemap_core::{DeliveryError, FileRecord};

/// Receiver of record batches.
///
/// The slice is only valid for the duration of the call; implementations
/// that keep records must clone them.
pub trait BatchSink {
    fn on_batch(&mut self, records: &[FileRecord]) -> Result<(), DeliveryError>;
}

impl<F> BatchSink for F
where
    F: FnMut(&[FileRecord]) -> Result<(), DeliveryError>,
{
    fn on_batch(&mut self, records: &[FileRecord]) -> Result<(), DeliveryError> {
        self(records)
    }
}

/// Observer that receives each record as the walker yields it.
pub trait RecordSink {
    fn add_record(&mut self, record: FileRecord);
}

/// Delivery counters for a batcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatcherStats {
    /// Batches handed to the sink, failed or not.
    pub batches_delivered: u64,
    /// Records contained in those batches.
    pub records_delivered: u64,
    /// Batches the sink rejected.
    pub failed_deliveries: u64,
}

/// Update interval for live progress consumers.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(500);

/// Accumulates records and delivers them in time-windowed batches.
#[derive(Debug)]
pub struct StreamingBatcher<S> {
    sink: S,
    interval: Duration,
    last_flush: Instant,
    buffer: Vec<FileRecord>,
    stats: BatcherStats,
}

impl<S: BatchSink> StreamingBatcher<S> {
    /// Create a batcher delivering to `sink` at most once per `interval`,
    /// except for explicit flushes.
    pub fn new(sink: S, interval: Duration) -> Self {
        Self {
            sink,
            interval,
            last_flush: Instant::now(),
            buffer: Vec::new(),
            stats: BatcherStats::default(),
        }
    }

    /// Buffer a record, flushing if the update interval has elapsed.
    pub fn add_record(&mut self, record: FileRecord) {
        self.buffer.push(record);
        if self.last_flush.elapsed() >= self.interval {
            self.flush();
        }
    }

    /// Deliver the buffered records to the sink.
    ///
    /// Does nothing when the buffer is empty. A sink failure is logged and
    /// the batch is dropped; the buffer is cleared either way.
    pub fn flush(&mut self) {
        if self.buffer.is_empty() {
            tracing::trace!("flush called with an empty buffer");
            return;
        }

        let count = self.buffer.len() as u64;
        tracing::debug!(records = count, "delivering batch");

        if let Err(err) = self.sink.on_batch(&self.buffer) {
            tracing::error!(records = count, error = %err, "batch sink failed, dropping batch");
            self.stats.failed_deliveries += 1;
        }
        self.stats.batches_delivered += 1;
        self.stats.records_delivered += count;

        self.buffer.clear();
        self.last_flush = Instant::now();
    }

    /// Number of records waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn stats(&self) -> BatcherStats {
        self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consume the batcher and return its sink. Buffered records that were
    /// never flushed are discarded.
    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<S: BatchSink> RecordSink for StreamingBatcher<S> {
    fn add_record(&mut self, record: FileRecord) {
        StreamingBatcher::add_record(self, record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    #[derive(Default)]
    struct Collect {
        batches: Vec<Vec<FileRecord>>,
    }

    impl BatchSink for Collect {
        fn on_batch(&mut self, records: &[FileRecord]) -> Result<(), DeliveryError> {
            self.batches.push(records.to_vec());
            Ok(())
        }
    }

    fn record(i: u64) -> FileRecord {
        FileRecord::file(format!("/f{i}"), i + 1, 1, SystemTime::UNIX_EPOCH)
    }

    #[test]
    fn test_flush_empty_is_noop() {
        let mut batcher = StreamingBatcher::new(Collect::default(), Duration::from_secs(60));
        batcher.flush();
        assert!(batcher.sink().batches.is_empty());
        assert_eq!(batcher.stats().batches_delivered, 0);
    }

    #[test]
    fn test_long_interval_buffers_until_flush() {
        let mut batcher = StreamingBatcher::new(Collect::default(), Duration::from_secs(3600));
        for i in 0..5 {
            batcher.add_record(record(i));
        }
        assert_eq!(batcher.pending(), 5);
        assert!(batcher.sink().batches.is_empty());

        batcher.flush();
        assert_eq!(batcher.pending(), 0);
        let sink = batcher.into_sink();
        assert_eq!(sink.batches.len(), 1);
        assert_eq!(sink.batches[0].len(), 5);
    }

    #[test]
    fn test_zero_interval_flushes_every_record() {
        let mut batcher = StreamingBatcher::new(Collect::default(), Duration::ZERO);
        for i in 0..3 {
            batcher.add_record(record(i));
        }
        assert_eq!(batcher.pending(), 0);
        assert_eq!(batcher.stats().batches_delivered, 3);
        assert_eq!(batcher.stats().records_delivered, 3);
    }

    #[test]
    fn test_failed_delivery_still_clears() {
        let mut calls = 0;
        let sink = |_: &[FileRecord]| -> Result<(), DeliveryError> {
            calls += 1;
            Err(DeliveryError::new("consumer gone"))
        };
        let mut batcher = StreamingBatcher::new(sink, Duration::from_secs(3600));
        batcher.add_record(record(1));
        batcher.flush();
        assert_eq!(batcher.pending(), 0);
        assert_eq!(batcher.stats().failed_deliveries, 1);

        batcher.add_record(record(2));
        batcher.flush();
        assert_eq!(batcher.stats().failed_deliveries, 2);
        drop(batcher);
        assert_eq!(calls, 2);
    }
}
