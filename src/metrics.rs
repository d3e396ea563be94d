use crate::store::RingStore;
use std::fmt::Write;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Process-wide counters, rendered in Prometheus text exposition format.
#[derive(Debug, Default)]
pub struct Metrics {
    pub requests_total:          AtomicU64,
    pub numbers_ingested_total:  AtomicU64,
    pub out_of_range_total:      AtomicU64,
    pub producer_thread_starts:  AtomicU64,
    pub producer_thread_ends:    AtomicU64,
    start_time_seconds:          AtomicI64,
    shutdown_time_seconds:       AtomicI64,
}

impl Metrics {
    pub fn new() -> Self {
        let m = Self::default();
        m.start_time_seconds.store(chrono::Utc::now().timestamp(), Ordering::Relaxed);
        m
    }

    pub fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }

    pub fn start_time_seconds(&self) -> i64 {
        self.start_time_seconds.load(Ordering::Relaxed)
    }

    /// 0 until [`Metrics::mark_shutdown`] runs.
    pub fn shutdown_time_seconds(&self) -> i64 {
        self.shutdown_time_seconds.load(Ordering::Relaxed)
    }

    pub fn mark_shutdown(&self) {
        self.shutdown_time_seconds.store(chrono::Utc::now().timestamp(), Ordering::Relaxed);
    }

    pub fn render(&self, store: &RingStore) -> String {
        let mut out = String::new();
        counter(&mut out, "numring_requests_total", "Total requests handled",
            Self::get(&self.requests_total));
        counter(&mut out, "numring_numbers_ingested_total", "Total numbers ingested",
            Self::get(&self.numbers_ingested_total));
        counter(&mut out, "numring_out_of_range_total", "Index lookups outside the window",
            Self::get(&self.out_of_range_total));
        counter(&mut out, "numring_producer_thread_starts_total", "Count of producer thread starts",
            Self::get(&self.producer_thread_starts));
        counter(&mut out, "numring_producer_thread_ends_total", "Count of producer thread ends",
            Self::get(&self.producer_thread_ends));
        gauge(&mut out, "numring_service_start_time_seconds", "Unix time when service started",
            self.start_time_seconds() as f64);
        gauge(&mut out, "numring_service_shutdown_time_seconds", "Unix time when service shut down",
            self.shutdown_time_seconds() as f64);
        gauge(&mut out, "numring_store_size", "Values currently retained",
            store.size() as f64);
        gauge(&mut out, "numring_store_capacity", "Maximum values retained",
            store.capacity() as f64);
        gauge(&mut out, "numring_store_average_all_time", "Mean of every value ever ingested",
            store.average_all_time());
        out
    }
}

fn counter(out: &mut String, name: &str, help: &str, value: u64) {
    let _ = writeln!(out, "# HELP {} {}", name, help);
    let _ = writeln!(out, "# TYPE {} counter", name);
    let _ = writeln!(out, "{} {}", name, value);
}

fn gauge(out: &mut String, name: &str, help: &str, value: f64) {
    let _ = writeln!(out, "# HELP {} {}", name, help);
    let _ = writeln!(out, "# TYPE {} gauge", name);
    let _ = writeln!(out, "{} {}", name, value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_reports_counters_and_store() {
        let m = Metrics::new();
        let store = RingStore::new(2).unwrap();
        store.ingest_batch(&[2, 4, 6]);
        Metrics::inc(&m.requests_total);
        Metrics::add(&m.numbers_ingested_total, 3);

        let text = m.render(&store);
        assert!(text.contains("# TYPE numring_requests_total counter"));
        assert!(text.contains("numring_requests_total 1\n"));
        assert!(text.contains("numring_numbers_ingested_total 3\n"));
        assert!(text.contains("numring_store_size 2\n"));
        assert!(text.contains("numring_store_capacity 2\n"));
        assert!(text.contains("numring_store_average_all_time 4\n"));
    }

    #[test]
    fn test_start_time_is_set() {
        let m = Metrics::new();
        assert!(m.start_time_seconds() > 0);
    }

    #[test]
    fn test_shutdown_time_set_on_mark() {
        let m = Metrics::new();
        let store = RingStore::new(1).unwrap();
        assert_eq!(m.shutdown_time_seconds(), 0);
        assert!(m.render(&store).contains("numring_service_shutdown_time_seconds 0\n"));

        m.mark_shutdown();
        assert!(m.shutdown_time_seconds() >= m.start_time_seconds());
        assert!(!m.render(&store).contains("numring_service_shutdown_time_seconds 0\n"));
    }
}
