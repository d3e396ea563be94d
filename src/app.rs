use crate::api::Service;
use crate::collectors::producer::ProducerPool;
use crate::keys::{handle_key, Action};
use crate::store::{OutOfRange, Snapshot};
use crate::ui::theme::{Theme, ThemeVariant};
use crate::ui::{dashboard, help};
use anyhow::Result;
use crossterm::event::{self, Event};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::info;

const POLL_TIMEOUT: Duration = Duration::from_millis(150);
const RATE_HISTORY: usize = 300;

#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult {
    Found(i64, i64),  // index, value
    OutOfRange(i64, usize),
    Invalid(String),
}

pub struct App {
    pub service:       Service,
    pub theme:         Theme,
    pub theme_variant: ThemeVariant,
    pub show_help:     bool,

    pub snapshot:      Snapshot,
    /// Values ingested per second, one entry per tick (oldest first).
    pub rate_history:  VecDeque<u64>,
    pub paused:        bool,
    pub producer_threads: usize,

    pub lookup_input:  String,
    pub lookup_result: Option<LookupResult>,

    tick:        Duration,
    last_tick:   Instant,
    last_count:  u64,
    pub should_quit: bool,
}

impl App {
    pub fn new(service: Service, theme: ThemeVariant, interval_ms: u64, producer_threads: usize) -> Self {
        let snapshot = service.store().snapshot();
        let last_count = snapshot.total_count;
        Self {
            service,
            theme:         Theme::for_variant(theme),
            theme_variant: theme,
            show_help:     false,
            snapshot,
            rate_history:  VecDeque::with_capacity(RATE_HISTORY),
            paused:        false,
            producer_threads,
            lookup_input:  String::new(),
            lookup_result: None,
            tick:          Duration::from_millis(interval_ms.max(100)),
            last_tick:     Instant::now(),
            last_count,
            should_quit:   false,
        }
    }

    // ── Main event loop ───────────────────────────────────────────────

    pub fn run<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut ratatui::Terminal<B>,
        producers: &ProducerPool,
    ) -> Result<()> {
        loop {
            terminal.draw(|f| {
                dashboard::render(f, self);
                if self.show_help {
                    help::render(f, &self.theme);
                }
            })?;

            if event::poll(POLL_TIMEOUT)? {
                if let Event::Key(key) = event::read()? {
                    match handle_key(key) {
                        Action::TogglePause => self.paused = producers.toggle_pause(),
                        action => self.handle_action(action),
                    }
                }
            }

            if self.should_quit { break; }

            if self.last_tick.elapsed() >= self.tick {
                self.refresh();
            }
        }
        info!(total = self.snapshot.total_count, "dashboard closed");
        Ok(())
    }

    /// Re-read the store and push one ingest-rate sample.
    pub fn refresh(&mut self) {
        let elapsed = self.last_tick.elapsed().as_secs_f64();
        self.snapshot = self.service.store().snapshot();
        let delta = self.snapshot.total_count.saturating_sub(self.last_count);
        let rate = if elapsed > 0.0 { (delta as f64 / elapsed).round() as u64 } else { 0 };
        if self.rate_history.len() >= RATE_HISTORY {
            self.rate_history.pop_front();
        }
        self.rate_history.push_back(rate);
        self.last_count = self.snapshot.total_count;
        self.last_tick = Instant::now();
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::CycleTheme => {
                self.theme_variant = self.theme_variant.next();
                self.theme = Theme::for_variant(self.theme_variant);
            }
            Action::ShowHelp => self.show_help = !self.show_help,
            Action::Digit(c) => {
                if self.lookup_input.len() < 20 {
                    self.lookup_input.push(c);
                }
            }
            Action::Backspace => { self.lookup_input.pop(); }
            Action::Lookup => self.run_lookup(),
            Action::ClearLookup => {
                self.lookup_input.clear();
                self.lookup_result = None;
                self.show_help = false;
            }
            Action::TogglePause | Action::None => {}
        }
    }

    fn run_lookup(&mut self) {
        if self.lookup_input.is_empty() { return; }
        let result = match self.lookup_input.parse::<i64>() {
            Ok(n) => match self.service.store().by_index(n) {
                Ok(v) => LookupResult::Found(n, v),
                Err(OutOfRange { index, size }) => LookupResult::OutOfRange(index, size),
            },
            Err(_) => LookupResult::Invalid(self.lookup_input.clone()),
        };
        self.lookup_result = Some(result);
        self.lookup_input.clear();
    }

    pub fn fill_pct(&self) -> f64 {
        self.snapshot.occupied as f64 / self.snapshot.capacity as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metrics;
    use crate::store::RingStore;
    use std::sync::Arc;

    fn app(values: &[i64]) -> App {
        let store = Arc::new(RingStore::new(3).unwrap());
        store.ingest_batch(values);
        let svc = Service::new(store, Arc::new(Metrics::new()), 100);
        App::new(svc, ThemeVariant::Default, 1000, 0)
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.handle_action(Action::Digit(c));
        }
    }

    #[test]
    fn test_lookup_found_and_out_of_range() {
        let mut app = app(&[10, 20, 30, 40]);
        type_str(&mut app, "1");
        app.handle_action(Action::Lookup);
        assert_eq!(app.lookup_result, Some(LookupResult::Found(1, 30)));
        assert!(app.lookup_input.is_empty());

        type_str(&mut app, "-2");
        app.handle_action(Action::Lookup);
        assert_eq!(app.lookup_result, Some(LookupResult::OutOfRange(-2, 3)));

        type_str(&mut app, "--");
        app.handle_action(Action::Lookup);
        assert_eq!(app.lookup_result, Some(LookupResult::Invalid("--".into())));

        app.handle_action(Action::ClearLookup);
        assert_eq!(app.lookup_result, None);
    }

    #[test]
    fn test_refresh_tracks_rate_and_snapshot() {
        let mut app = app(&[1]);
        app.service.store().ingest_batch(&[2, 3]);
        app.refresh();
        assert_eq!(app.snapshot.values, vec![1, 2, 3]);
        assert_eq!(app.rate_history.len(), 1);
        assert!((app.fill_pct() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_theme_cycle_and_quit() {
        let mut app = app(&[]);
        app.handle_action(Action::CycleTheme);
        assert_eq!(app.theme_variant, ThemeVariant::Dracula);
        app.handle_action(Action::ShowHelp);
        assert!(app.show_help);
        app.handle_action(Action::Quit);
        assert!(app.should_quit);
    }
}
