mod api;
mod app;
mod collectors;
mod config;
mod daemon;
mod input;
mod keys;
mod logging;
mod metrics;
mod store;
mod ui;
mod util;

use anyhow::{Context, Result};
use api::Service;
use app::App;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use collectors::producer::ProducerPool;
use config::Config;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use metrics::Metrics;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::panic;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use store::RingStore;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "numring", about = "Bounded number store with all-time stats", version = "0.1")]
struct Cli {
    /// Values retained in the window (overrides store.capacity)
    #[arg(short = 'n', long)]
    capacity: Option<usize>,

    /// Random-number producer threads (overrides producers.threads; 0 = none)
    #[arg(long)]
    threads: Option<usize>,

    /// Pause between values per producer thread, ms (overrides producers.pause_ms)
    #[arg(long)]
    pause_ms: Option<u64>,

    /// Dashboard refresh / daemon summary interval in milliseconds
    #[arg(short, long, default_value_t = 1000)]
    interval: u64,

    /// Color theme: default, dracula, gruvbox, nord
    #[arg(short = 't', long, default_value = "default")]
    theme: String,

    /// Answer line requests from stdin with JSON on stdout, then exit at EOF
    #[arg(long)]
    serve: bool,

    /// Run headless: producers feed the store, a summary is logged every interval
    #[arg(long)]
    daemon: bool,

    /// Print config file path and current values, then exit
    #[arg(long)]
    config: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "numring", &mut io::stdout());
        return Ok(());
    }

    let cfg = match effective_config(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("\nnumring: {:#}\n", e);
            eprintln!("Usage: numring [--capacity N] [--threads N] [--pause-ms MS] [--serve | --daemon]\n");
            std::process::exit(2);
        }
    };

    if cli.config {
        return run_print_config(&cfg);
    }
    if cli.serve {
        logging::init_stderr(&cfg.logging.filter);
        return run_serve(&cfg);
    }
    if cli.daemon {
        logging::init_stderr(&cfg.logging.filter);
        return run_daemon(&cfg, cli.interval);
    }

    let log_file = logging::init_file(&cfg.logging.filter)?;
    let initial_theme = ui::theme::ThemeVariant::from_name(&cli.theme);

    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        original_hook(info);
    }));

    let result = run(&cfg, initial_theme, cli.interval);
    restore_terminal()?;
    eprintln!("log: {}", log_file.display());
    result
}

/// File config with CLI overrides applied, then validated. `--serve` runs
/// without producers unless `--threads` asks for them.
fn effective_config(cli: &Cli) -> Result<Config> {
    let mut cfg = Config::load()?;
    if let Some(n) = cli.capacity { cfg.store.capacity = n; }
    if let Some(t) = cli.threads  { cfg.producers.threads = t; }
    else if cli.serve             { cfg.producers.threads = 0; }
    if let Some(p) = cli.pause_ms { cfg.producers.pause_ms = p; }
    cfg.validate()?;
    Ok(cfg)
}

/// Build the shared store and service. Config has already been validated.
fn build(cfg: &Config) -> Result<(Service, Arc<Metrics>)> {
    let store = Arc::new(RingStore::new(cfg.store.capacity).context("building store")?);
    let metrics = Arc::new(Metrics::new());
    info!(capacity = cfg.store.capacity, latest_limit = cfg.store.latest_limit,
        threads = cfg.producers.threads, pause_ms = cfg.producers.pause_ms, "service startup");
    let service = Service::new(store, Arc::clone(&metrics), cfg.store.latest_limit);
    Ok((service, metrics))
}

fn run_print_config(cfg: &Config) -> Result<()> {
    let path = Config::config_path()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "(unknown)".to_string());
    println!("Config: {}", path);
    println!();
    println!("[store]");
    println!("  capacity     = {}", cfg.store.capacity);
    println!("  latest_limit = {}", cfg.store.latest_limit);
    println!();
    println!("[producers]");
    println!("  threads  = {}", cfg.producers.threads);
    println!("  pause_ms = {}", cfg.producers.pause_ms);
    println!("  range    = {}..={}", cfg.producers.min, cfg.producers.max);
    println!();
    println!("[logging]");
    println!("  filter = {}", cfg.logging.filter);
    if let Some(p) = logging::log_path() {
        println!("  dashboard log = {}", p.display());
    }
    Ok(())
}

fn run_serve(cfg: &Config) -> Result<()> {
    let (service, metrics) = build(cfg)?;
    let producers = ProducerPool::spawn(&cfg.producers, service.store_handle(), Arc::clone(&metrics));

    let stdin = io::stdin();
    let answered = service.serve(stdin.lock(), io::stdout().lock())?;

    producers.stop();
    metrics.mark_shutdown();
    info!(requests = answered, total = service.store().total_count(),
        average_all_time = service.store().average_all_time(), "service shutdown");
    Ok(())
}

fn run_daemon(cfg: &Config, interval_ms: u64) -> Result<()> {
    let stop = Arc::new(AtomicBool::new(false));
    for sig in signal_hook::consts::TERM_SIGNALS {
        signal_hook::flag::register(*sig, Arc::clone(&stop))
            .context("registering signal handler")?;
    }

    let (service, metrics) = build(cfg)?;
    let producers = ProducerPool::spawn(&cfg.producers, service.store_handle(), Arc::clone(&metrics));
    if producers.threads() == 0 {
        tracing::warn!("daemon started with no producers; the store will stay empty");
    }

    let tick = Duration::from_millis(interval_ms.max(500));
    let summaries = daemon::summarize_until(&service, tick, &stop);

    info!("termination signal received, stopping producers");
    producers.stop();
    metrics.mark_shutdown();
    info!(summaries, total = service.store().total_count(),
        average_all_time = service.store().average_all_time(),
        producer_starts = Metrics::get(&metrics.producer_thread_starts),
        producer_ends = Metrics::get(&metrics.producer_thread_ends),
        "service shutdown");
    Ok(())
}

fn run(cfg: &Config, initial_theme: ui::theme::ThemeVariant, interval_ms: u64) -> Result<()> {
    let (service, metrics) = build(cfg)?;
    let producers = ProducerPool::spawn(&cfg.producers, service.store_handle(), metrics);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut term = Terminal::new(backend)?;

    let mut app = App::new(service, initial_theme, interval_ms, producers.threads());
    app.paused = producers.is_paused();
    let result = app.run(&mut term, &producers);

    producers.stop();
    result
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}
