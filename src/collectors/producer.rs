use crate::config::ProducerConfig;
use crate::metrics::Metrics;
use crate::store::RingStore;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info};

const STOP_POLL: Duration = Duration::from_millis(50);

/// Background threads that feed random integers into the store.
pub struct ProducerPool {
    handles: Vec<JoinHandle<()>>,
    stop:    Arc<AtomicBool>,
    paused:  Arc<AtomicBool>,
}

impl ProducerPool {
    pub fn spawn(cfg: &ProducerConfig, store: Arc<RingStore>, metrics: Arc<Metrics>) -> Self {
        let stop   = Arc::new(AtomicBool::new(false));
        let paused = Arc::new(AtomicBool::new(false));
        let pause  = Duration::from_millis(cfg.pause_ms);

        let handles = (1..=cfg.threads).map(|id| {
            let store   = Arc::clone(&store);
            let metrics = Arc::clone(&metrics);
            let stop    = Arc::clone(&stop);
            let paused  = Arc::clone(&paused);
            let (min, max) = (cfg.min, cfg.max);
            thread::spawn(move || {
                Metrics::inc(&metrics.producer_thread_starts);
                debug!(id, "producer thread start");
                let mut rng = rand::rng();
                while !stop.load(Ordering::Relaxed) {
                    if !paused.load(Ordering::Relaxed) {
                        let v = rng.random_range(min..=max);
                        store.ingest(v);
                        Metrics::inc(&metrics.numbers_ingested_total);
                    }
                    sleep_unless_stopped(pause, &stop);
                }
                Metrics::inc(&metrics.producer_thread_ends);
                debug!(id, "producer thread end");
            })
        }).collect::<Vec<_>>();

        if !handles.is_empty() {
            info!(threads = handles.len(), pause_ms = cfg.pause_ms, min = cfg.min, max = cfg.max,
                "producers started");
        }
        Self { handles, stop, paused }
    }

    pub fn threads(&self) -> usize {
        self.handles.len()
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    /// Flip the paused flag; returns the new state.
    pub fn toggle_pause(&self) -> bool {
        let now = !self.paused.load(Ordering::Relaxed);
        self.paused.store(now, Ordering::Relaxed);
        info!(paused = now, "producers {}", if now { "paused" } else { "resumed" });
        now
    }

    /// Signal every thread and wait for it to finish.
    pub fn stop(self) {
        self.stop.store(true, Ordering::Relaxed);
        let n = self.handles.len();
        for h in self.handles {
            let _ = h.join();
        }
        if n > 0 {
            info!(threads = n, "producers stopped");
        }
    }
}

/// Sleep for `total`, waking early once `stop` is set.
fn sleep_unless_stopped(total: Duration, stop: &AtomicBool) {
    let mut left = total;
    while !left.is_zero() && !stop.load(Ordering::Relaxed) {
        let step = left.min(STOP_POLL);
        thread::sleep(step);
        left -= step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn cfg(threads: usize, pause_ms: u64) -> ProducerConfig {
        ProducerConfig { threads, pause_ms, min: 5, max: 9 }
    }

    fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if cond() { return true; }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_pool_fills_store_within_range() {
        let store   = Arc::new(RingStore::new(16).unwrap());
        let metrics = Arc::new(Metrics::new());
        let pool = ProducerPool::spawn(&cfg(3, 1), Arc::clone(&store), Arc::clone(&metrics));
        assert_eq!(pool.threads(), 3);

        assert!(wait_for(|| store.size() == 16));
        pool.stop();

        assert!(store.latest(16).iter().all(|v| (5..=9).contains(v)));
        assert_eq!(Metrics::get(&metrics.producer_thread_starts), 3);
        assert_eq!(Metrics::get(&metrics.producer_thread_ends), 3);
        assert_eq!(Metrics::get(&metrics.numbers_ingested_total), store.total_count());
    }

    #[test]
    fn test_pause_stops_ingest() {
        let store   = Arc::new(RingStore::new(4).unwrap());
        let metrics = Arc::new(Metrics::new());
        let pool = ProducerPool::spawn(&cfg(1, 1), Arc::clone(&store), metrics);

        assert!(wait_for(|| store.total_count() > 0));
        assert!(pool.toggle_pause());
        assert!(pool.is_paused());
        // Let any in-flight ingest land before sampling.
        thread::sleep(Duration::from_millis(50));
        let frozen = store.total_count();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(store.total_count(), frozen);

        assert!(!pool.toggle_pause());
        assert!(wait_for(|| store.total_count() > frozen));
        pool.stop();
    }

    #[test]
    fn test_zero_threads_is_idle() {
        let store = Arc::new(RingStore::new(4).unwrap());
        let pool = ProducerPool::spawn(&cfg(0, 1), Arc::clone(&store), Arc::new(Metrics::new()));
        assert_eq!(pool.threads(), 0);
        pool.stop();
        assert_eq!(store.size(), 0);
    }

    #[test]
    fn test_stop_interrupts_long_pause() {
        let store = Arc::new(RingStore::new(4).unwrap());
        let pool = ProducerPool::spawn(&cfg(2, 60_000), store, Arc::new(Metrics::new()));
        let started = Instant::now();
        pool.stop();
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
