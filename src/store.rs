use parking_lot::Mutex;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store capacity must be greater than zero")]
    ZeroCapacity,
}

/// Lookup outside `[0, size)`. The only way `by_index` fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("index {index} out of range for window of {size}")]
pub struct OutOfRange {
    pub index: i64,
    pub size:  usize,
}

/// Buffer, cursor and occupied count. Always mutated together under one lock.
#[derive(Debug)]
struct Window {
    buffer:       Vec<i64>,
    write_cursor: usize,
    occupied:     usize,
}

impl Window {
    fn push(&mut self, value: i64) {
        let cap = self.buffer.len();
        self.buffer[self.write_cursor] = value;
        self.write_cursor = (self.write_cursor + 1) % cap;
        if self.occupied < cap {
            self.occupied += 1;
        }
    }

    /// Up to `k` most-recent values, oldest first.
    fn last_n(&self, k: usize) -> Vec<i64> {
        let cap = self.buffer.len();
        let n = k.min(self.occupied);
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            let idx = (self.write_cursor + cap - 1 - i) % cap;
            out.push(self.buffer[idx]);
        }
        out.reverse();
        out
    }

    /// Physical slot of the oldest retained value.
    fn start(&self) -> usize {
        let cap = self.buffer.len();
        (self.write_cursor + cap - self.occupied) % cap
    }
}

/// Point-in-time view of the store, taken under the window lock.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Retained window, oldest first.
    pub values:       Vec<i64>,
    pub write_cursor: usize,
    pub occupied:     usize,
    pub capacity:     usize,
    pub total_count:  u64,
    pub total_sum:    i64,
}

impl Snapshot {
    /// Mean of the retained window only. 0.0 when empty.
    pub fn window_average(&self) -> f64 {
        mean(&self.values)
    }

    pub fn average_all_time(&self) -> f64 {
        if self.total_count == 0 { return 0.0; }
        self.total_sum as f64 / self.total_count as f64
    }
}

/// Fixed-capacity FIFO window of the most recent integers, plus exact
/// all-time count and sum.
///
/// The window (buffer, write cursor, occupied count) sits behind a single
/// mutex; every window read and write takes it, and a batch holds it for the
/// whole batch so no reader sees half of one.
///
/// `total_count` and `total_sum` are atomics bumped inside that lock and read
/// without it by [`RingStore::average_all_time`]. The two loads are
/// independent, so under heavy writes the average may pair a count and a sum
/// that never co-existed. Each is still a value its field held at some
/// instant, and both only move forward per ingest, so the race is benign.
///
/// `total_sum` is 64-bit and wraps on overflow. That needs inputs near
/// `i64::MAX` in aggregate and is not guarded.
#[derive(Debug)]
pub struct RingStore {
    capacity:    usize,
    window:      Mutex<Window>,
    total_count: AtomicU64,
    total_sum:   AtomicI64,
}

impl RingStore {
    pub fn new(capacity: usize) -> Result<Self, StoreError> {
        if capacity == 0 {
            return Err(StoreError::ZeroCapacity);
        }
        Ok(Self {
            capacity,
            window: Mutex::new(Window {
                buffer:       vec![0; capacity],
                write_cursor: 0,
                occupied:     0,
            }),
            total_count: AtomicU64::new(0),
            total_sum:   AtomicI64::new(0),
        })
    }

    /// Append one value, evicting the oldest when the window is full.
    pub fn ingest(&self, value: i64) {
        let mut w = self.window.lock();
        w.push(value);
        self.record(1, value);
    }

    /// Append every value in order as one unit with respect to readers.
    pub fn ingest_batch(&self, values: &[i64]) {
        if values.is_empty() { return; }
        let mut w = self.window.lock();
        let mut sum = 0i64;
        for &v in values {
            w.push(v);
            sum = sum.wrapping_add(v);
        }
        self.record(values.len() as u64, sum);
    }

    fn record(&self, count: u64, sum: i64) {
        self.total_count.fetch_add(count, Ordering::Relaxed);
        self.total_sum.fetch_add(sum, Ordering::Relaxed);
    }

    /// Up to `k` most-recent values, oldest first; the last element is the
    /// newest value ingested.
    pub fn latest(&self, k: usize) -> Vec<i64> {
        self.window.lock().last_n(k)
    }

    /// Value at position `n` of the retained window, where 0 is the oldest
    /// retained value and `size() - 1` the newest. Evicted values are gone.
    pub fn by_index(&self, n: i64) -> Result<i64, OutOfRange> {
        let w = self.window.lock();
        if n < 0 || n as u64 >= w.occupied as u64 {
            return Err(OutOfRange { index: n, size: w.occupied });
        }
        let slot = (w.start() + n as usize) % self.capacity;
        Ok(w.buffer[slot])
    }

    /// Mean over every value ever ingested, evicted ones included.
    pub fn average_all_time(&self) -> f64 {
        let count = self.total_count.load(Ordering::Relaxed);
        if count == 0 { return 0.0; }
        let sum = self.total_sum.load(Ordering::Relaxed);
        sum as f64 / count as f64
    }

    pub fn size(&self) -> usize {
        self.window.lock().occupied
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn total_count(&self) -> u64 {
        self.total_count.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> Snapshot {
        let w = self.window.lock();
        Snapshot {
            values:       w.last_n(w.occupied),
            write_cursor: w.write_cursor,
            occupied:     w.occupied,
            capacity:     self.capacity,
            total_count:  self.total_count.load(Ordering::Relaxed),
            total_sum:    self.total_sum.load(Ordering::Relaxed),
        }
    }
}

/// Arithmetic mean of a slice, 0.0 when empty.
pub fn mean(values: &[i64]) -> f64 {
    if values.is_empty() { return 0.0; }
    let sum: i128 = values.iter().map(|&v| v as i128).sum();
    sum as f64 / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::thread;

    fn filled(capacity: usize, values: &[i64]) -> RingStore {
        let store = RingStore::new(capacity).unwrap();
        for &v in values {
            store.ingest(v);
        }
        store
    }

    #[test]
    fn test_new_is_empty() {
        let store = RingStore::new(5).unwrap();
        assert_eq!(store.size(), 0);
        assert_eq!(store.capacity(), 5);
        assert_eq!(store.total_count(), 0);
        assert!(store.latest(5).is_empty());
        assert_eq!(store.average_all_time(), 0.0);
        let snap = store.snapshot();
        assert_eq!(snap.write_cursor, 0);
        assert_eq!(snap.occupied, 0);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(RingStore::new(0).unwrap_err(), StoreError::ZeroCapacity);
    }

    #[test]
    fn test_capacity_three_scenario() {
        let store = filled(3, &[10, 20, 30, 40]);
        assert_eq!(store.size(), 3);
        assert_eq!(store.latest(3), vec![20, 30, 40]);
        assert_eq!(store.by_index(0), Ok(20));
        assert_eq!(store.by_index(2), Ok(40));
        assert_eq!(
            store.by_index(3),
            Err(OutOfRange { index: 3, size: 3 })
        );
        assert!((store.average_all_time() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_fill_keeps_ingestion_order() {
        for cap in 1..8usize {
            for m in 0..=cap {
                let values: Vec<i64> = (0..m as i64).map(|i| i * 7 - 3).collect();
                let store = filled(cap, &values);
                assert_eq!(store.size(), m);
                for (i, v) in values.iter().enumerate() {
                    assert_eq!(store.by_index(i as i64), Ok(*v));
                }
            }
        }
    }

    #[test]
    fn test_overfill_keeps_oldest_survivor_at_zero() {
        for cap in 1..6usize {
            for m in cap + 1..cap * 3 {
                let values: Vec<i64> = (0..m as i64).map(|i| 100 + i).collect();
                let store = filled(cap, &values);
                assert_eq!(store.size(), cap);
                assert_eq!(store.by_index(0), Ok(values[m - cap]));
                assert_eq!(store.by_index(cap as i64 - 1), Ok(values[m - 1]));
            }
        }
    }

    #[test]
    fn test_latest_lengths() {
        let store = filled(4, &[1, 2, 3]);
        assert!(store.latest(0).is_empty());
        assert_eq!(store.latest(2), vec![2, 3]);
        assert_eq!(store.latest(3), vec![1, 2, 3]);
        assert_eq!(store.latest(100), vec![1, 2, 3]);
        assert_eq!(store.latest(store.size()), store.snapshot().values);
    }

    #[test]
    fn test_latest_wraps_around_cursor() {
        let store = filled(4, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(store.snapshot().write_cursor, 2);
        assert_eq!(store.latest(4), vec![3, 4, 5, 6]);
        assert_eq!(store.latest(3), vec![4, 5, 6]);
    }

    #[test]
    fn test_by_index_rejects_negative_and_past_end() {
        let store = filled(3, &[5]);
        assert_eq!(store.by_index(-1), Err(OutOfRange { index: -1, size: 1 }));
        assert_eq!(store.by_index(1), Err(OutOfRange { index: 1, size: 1 }));
        assert!(store.by_index(i64::MIN).is_err());
        assert!(store.by_index(i64::MAX).is_err());

        let empty = RingStore::new(3).unwrap();
        assert!(empty.by_index(0).is_err());
    }

    #[test]
    fn test_all_time_average_outlives_window() {
        let store = filled(2, &[100, 100, 1, 3]);
        assert_eq!(store.latest(store.capacity()), vec![1, 3]);
        let window_avg = mean(&store.latest(store.capacity()));
        assert!((window_avg - 2.0).abs() < 1e-9);
        assert!((store.average_all_time() - 51.0).abs() < 1e-9);
        assert!((store.average_all_time() - window_avg).abs() > 1.0);
    }

    #[test]
    fn test_all_time_average_with_negatives() {
        let store = filled(3, &[-10, 4, -6, 0, 7]);
        assert!((store.average_all_time() - (-5.0 / 5.0)).abs() < 1e-9);
        assert_eq!(store.total_count(), 5);
    }

    #[test]
    fn test_batch_matches_single_ingest() {
        let a = filled(5, &[1, 2, 3, 4, 5, 6, 7]);
        let b = RingStore::new(5).unwrap();
        b.ingest_batch(&[1, 2, 3]);
        b.ingest_batch(&[]);
        b.ingest_batch(&[4, 5, 6, 7]);
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let store = RingStore::new(2).unwrap();
        store.ingest_batch(&[]);
        assert_eq!(store.size(), 0);
        assert_eq!(store.total_count(), 0);
    }

    #[test]
    fn test_occupied_never_exceeds_capacity() {
        let store = RingStore::new(3).unwrap();
        let mut last = 0;
        for i in 0..20 {
            store.ingest(i);
            let size = store.size();
            assert!(size >= last);
            assert!(size <= 3);
            assert!(store.total_count() >= size as u64);
            last = size;
        }
    }

    #[test]
    fn test_sum_wraps_instead_of_panicking() {
        let store = filled(1, &[i64::MAX, 1]);
        assert_eq!(store.snapshot().total_sum, i64::MIN);
        assert_eq!(store.total_count(), 2);
    }

    #[test]
    fn test_concurrent_batches_are_atomic() {
        const BATCH: usize = 4;
        const CAP: usize = BATCH * 8;
        let store = Arc::new(RingStore::new(CAP).unwrap());
        let done = Arc::new(AtomicBool::new(false));

        let writers: Vec<_> = (0..4i64).map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for b in 0..500i64 {
                    let v = t * 1_000_000 + b;
                    store.ingest_batch(&[v; BATCH]);
                }
            })
        }).collect();

        let readers: Vec<_> = (0..3).map(|_| {
            let store = Arc::clone(&store);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                while !done.load(Ordering::Relaxed) {
                    let snap = store.snapshot();
                    assert!(snap.occupied <= snap.capacity);
                    assert_eq!(snap.values.len(), snap.occupied);
                    assert_eq!(snap.occupied % BATCH, 0);
                    assert!(snap.total_count >= snap.occupied as u64);

                    let start = (snap.write_cursor + snap.capacity - snap.occupied) % snap.capacity;
                    let slots: HashSet<usize> = (0..snap.occupied)
                        .map(|i| (start + i) % snap.capacity)
                        .collect();
                    assert_eq!(slots.len(), snap.occupied);

                    for chunk in snap.values.chunks(BATCH) {
                        assert!(chunk.iter().all(|&v| v == chunk[0]), "torn batch: {:?}", chunk);
                    }

                    let latest = store.latest(CAP);
                    assert_eq!(latest.len() % BATCH, 0);
                }
            })
        }).collect();

        for w in writers {
            w.join().unwrap();
        }
        done.store(true, Ordering::Relaxed);
        for r in readers {
            r.join().unwrap();
        }

        assert_eq!(store.size(), CAP);
        assert_eq!(store.total_count(), 4 * 500 * BATCH as u64);
    }

    #[test]
    fn test_mean_helper() {
        assert_eq!(mean(&[]), 0.0);
        assert!((mean(&[1, 2, 3, 4]) - 2.5).abs() < 1e-9);
        assert!((mean(&[i64::MAX, i64::MAX]) - i64::MAX as f64).abs() < 1e6);
    }
}
