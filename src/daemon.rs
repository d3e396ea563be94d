use crate::api::Service;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::info;

/// Stop flag is polled this often between summaries.
const STOP_POLL: Duration = Duration::from_millis(50);

/// Log a store summary every `tick` until `stop` is raised.
/// Returns the number of summaries written.
pub fn summarize_until(service: &Service, tick: Duration, stop: &AtomicBool) -> u64 {
    let mut written = 0u64;
    let mut next = Instant::now() + tick;
    while !stop.load(Ordering::Relaxed) {
        let now = Instant::now();
        if now < next {
            std::thread::sleep(STOP_POLL.min(next - now));
            continue;
        }
        next += tick;

        let snap = service.store().snapshot();
        info!(
            size = snap.occupied,
            capacity = snap.capacity,
            total = snap.total_count,
            average_window = snap.window_average(),
            average_all_time = snap.average_all_time(),
            "store summary"
        );
        written += 1;
    }
    written
}
