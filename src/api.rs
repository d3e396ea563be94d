use crate::input::{self, Request, RequestError};
use crate::metrics::Metrics;
use crate::store::{mean, RingStore};
use serde_json::{json, Value};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::{debug, info};

/// Request handler over a shared store. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Service {
    store:        Arc<RingStore>,
    metrics:      Arc<Metrics>,
    latest_limit: usize,
}

impl Service {
    pub fn new(store: Arc<RingStore>, metrics: Arc<Metrics>, latest_limit: usize) -> Self {
        Self { store, metrics, latest_limit }
    }

    pub fn store(&self) -> &RingStore {
        &self.store
    }

    pub fn store_handle(&self) -> Arc<RingStore> {
        Arc::clone(&self.store)
    }

    pub fn handle(&self, req: &Request) -> Value {
        Metrics::inc(&self.metrics.requests_total);
        info!(request = req.name(), "request");
        match req {
            Request::Ping => json!({
                "msg":  "pong!",
                "time": chrono::Utc::now().to_rfc3339(),
            }),
            Request::Numbers => json!({ "numbers": self.store.latest(self.latest_limit) }),
            Request::Average => json!({ "average": mean(&self.store.latest(self.latest_limit)) }),
            Request::AverageAllTime => json!({ "average_all_time": self.store.average_all_time() }),
            Request::Number(n) => match self.store.by_index(*n) {
                Ok(v) => json!({ "index": n, "number": v }),
                Err(e) => {
                    Metrics::inc(&self.metrics.out_of_range_total);
                    debug!(index = e.index, size = e.size, "lookup outside window");
                    not_found("index out of range")
                }
            },
            Request::Put(values) => {
                self.store.ingest_batch(values);
                Metrics::add(&self.metrics.numbers_ingested_total, values.len() as u64);
                json!({ "stored": self.store.size() })
            }
            Request::Stats => {
                let snap = self.store.snapshot();
                json!({
                    "size":             snap.occupied,
                    "capacity":         snap.capacity,
                    "total_count":      snap.total_count,
                    "write_cursor":     snap.write_cursor,
                    "average_window":   snap.window_average(),
                    "average_all_time": snap.average_all_time(),
                })
            }
            Request::Metrics => json!({ "metrics": self.metrics.render(&self.store) }),
            Request::Help => json!({
                "commands": input::COMMANDS.iter()
                    .map(|(c, d)| json!({ "command": c, "description": d }))
                    .collect::<Vec<_>>(),
            }),
            Request::Quit => json!({ "msg": "bye" }),
        }
    }

    /// Parse and answer one line. `None` for blank lines.
    pub fn handle_line(&self, line: &str) -> Option<Value> {
        self.respond(input::parse_line(line))
    }

    fn respond(&self, parsed: Result<Option<Request>, RequestError>) -> Option<Value> {
        match parsed {
            Ok(Some(req)) => Some(self.handle(&req)),
            Ok(None)      => None,
            Err(e)        => Some(request_error(&e)),
        }
    }

    /// Serve requests line by line until `quit` or end of input.
    /// Returns the number of requests answered.
    pub fn serve<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> anyhow::Result<u64> {
        let mut answered = 0u64;
        for line in reader.lines() {
            let line = line?;
            let parsed = input::parse_line(&line);
            let quit = matches!(parsed, Ok(Some(Request::Quit)));
            if let Some(resp) = self.respond(parsed) {
                writeln!(writer, "{}", resp)?;
                writer.flush()?;
                answered += 1;
            }
            if quit {
                info!("session closed by client");
                break;
            }
        }
        Ok(answered)
    }
}

fn not_found(msg: &str) -> Value {
    json!({ "error": msg, "status": 404 })
}

fn bad_request(msg: &str) -> Value {
    json!({ "error": msg, "status": 400 })
}

fn request_error(e: &RequestError) -> Value {
    debug!(error = %e, "rejected request line");
    bad_request(&e.to_string())
}
