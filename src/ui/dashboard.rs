use crate::app::{App, LookupResult};
use crate::ui::footer::render_footer;
use crate::ui::theme::Theme;
use crate::util::human::{fmt_avg, fmt_count};
use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Sparkline},
    Frame,
};

pub fn render(f: &mut Frame, app: &App) {
    let area  = f.area();
    let theme = &app.theme;

    // ── Root: header | body | lookup | footer ──────────────────────
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(f, root[0], app);

    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(root[1]);

    render_window_spark(f, body[0], app);

    let lower = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(body[1]);

    render_stats(f, lower[0], app);
    render_recent(f, lower[1], app);
    render_lookup(f, root[2], app);
    render_footer(f, root[3], app.paused, theme);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let feed = if app.producer_threads == 0 {
        Span::styled("no producers", theme.text_dim)
    } else if app.paused {
        Span::styled(format!("{} producers PAUSED", app.producer_threads), theme.warn)
    } else {
        Span::styled(format!("{} producers live", app.producer_threads), theme.ok)
    };
    let line = Line::from(vec![
        Span::styled(" numring ", theme.title),
        Span::styled("│ ", theme.text_dim),
        feed,
        Span::styled("  │ ", theme.text_dim),
        Span::styled(app.theme_variant.name(), theme.text_dim),
        Span::styled("  │ ", theme.text_dim),
        Span::styled(Local::now().format("%H:%M:%S").to_string(), theme.text),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn bordered<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border)
        .title(Span::styled(title, theme.title))
}

/// Sparkline bars must be non-negative: shift the window so its minimum is 0.
pub fn spark_data(values: &[i64], width: usize) -> Vec<u64> {
    let tail = &values[values.len().saturating_sub(width)..];
    let min = tail.iter().copied().min().unwrap_or(0);
    tail.iter().map(|&v| (v as i128 - min as i128) as u64).collect()
}

fn render_window_spark(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let block = bordered(" Window ", theme);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1), Constraint::Length(2)])
        .split(inner);

    let snap = &app.snapshot;
    let pct = app.fill_pct();
    let gauge = Gauge::default()
        .gauge_style(theme.fill_style(pct))
        .ratio((pct / 100.0).clamp(0.0, 1.0))
        .label(format!("{} / {}", fmt_count(snap.occupied as u64), fmt_count(snap.capacity as u64)));
    f.render_widget(gauge, rows[0]);

    let data = spark_data(&snap.values, rows[1].width as usize);
    let max = data.iter().copied().max().unwrap_or(1).max(1);
    f.render_widget(
        Sparkline::default().data(&data).max(max).style(theme.window_spark),
        rows[1],
    );

    let rate: Vec<u64> = app.rate_history.iter().copied().collect();
    let rate_data = &rate[rate.len().saturating_sub(rows[2].width as usize)..];
    let label = Line::from(vec![
        Span::styled("Rate ", theme.rate_spark),
        Span::styled(format!("{}/s", fmt_count(rate.last().copied().unwrap_or(0))), theme.text),
    ]);
    let rate_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(rows[2]);
    f.render_widget(Paragraph::new(label), rate_rows[0]);
    f.render_widget(
        Sparkline::default()
            .data(rate_data)
            .max(rate_data.iter().copied().max().unwrap_or(1).max(1))
            .style(theme.rate_spark),
        rate_rows[1],
    );
}

fn render_stats(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let snap = &app.snapshot;
    let row = |k: &'static str, v: String| Line::from(vec![
        Span::styled(format!("{:<18}", k), theme.text_dim),
        Span::styled(v, theme.text),
    ]);

    let window_avg = snap.window_average();
    let all_avg    = snap.average_all_time();
    let evicted    = snap.total_count.saturating_sub(snap.occupied as u64);

    let lines = vec![
        row("Retained",        format!("{} of {}", snap.occupied, snap.capacity)),
        row("Ingested (all)",  fmt_count(snap.total_count)),
        row("Evicted",         fmt_count(evicted)),
        row("Write cursor",    snap.write_cursor.to_string()),
        Line::from(""),
        row("Avg (window)",    fmt_avg(window_avg)),
        row("Avg (all time)",  fmt_avg(all_avg)),
        Line::from(Span::styled(
            if evicted > 0 { "  all-time includes evicted values" } else { "" },
            theme.text_dim,
        )),
    ];
    f.render_widget(Paragraph::new(lines).block(bordered(" Stats ", theme)), area);
}

fn render_recent(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let snap = &app.snapshot;
    let rows = area.height.saturating_sub(2) as usize;
    let first = snap.values.len().saturating_sub(rows);

    // Newest on top, labelled with its window index.
    let items: Vec<ListItem> = snap.values[first..].iter().enumerate().rev()
        .map(|(i, v)| ListItem::new(Line::from(vec![
            Span::styled(format!("#{:<8}", first + i), theme.text_dim),
            Span::styled(v.to_string(), theme.text),
        ])))
        .collect();
    f.render_widget(List::new(items).block(bordered(" Recent ", theme)), area);
}

fn render_lookup(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let result = match &app.lookup_result {
        Some(LookupResult::Found(i, v))       => Span::styled(format!("#{} = {}", i, v), theme.ok),
        Some(LookupResult::OutOfRange(i, n))  => Span::styled(
            format!("#{}: index out of range (window holds {})", i, n), theme.crit),
        Some(LookupResult::Invalid(s))        => Span::styled(format!("'{}' is not an index", s), theme.warn),
        None                                  => Span::styled("type an index and press Enter", theme.text_dim),
    };
    let line = Line::from(vec![
        Span::styled("> ", theme.title),
        Span::styled(app.lookup_input.clone(), theme.text),
        Span::styled("   ", theme.text),
        result,
    ]);
    f.render_widget(Paragraph::new(line).block(bordered(" Lookup ", theme)), area);
}
