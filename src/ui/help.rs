use crate::ui::theme::Theme;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, theme: &Theme) {
    let area = centered_rect(60, 22, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border)
        .title(Span::styled(" numring keys (? to close) ", theme.title));

    let lines = vec![
        key_line(theme, "Dashboard", ""),
        key_line(theme, "  q / Ctrl-C",  "Quit"),
        key_line(theme, "  Space",       "Pause / resume producers"),
        key_line(theme, "  0-9, -",      "Type a window index"),
        key_line(theme, "  Enter",       "Look up typed index (0 = oldest)"),
        key_line(theme, "  Backspace",   "Delete last digit"),
        key_line(theme, "  c / Esc",     "Clear lookup"),
        key_line(theme, "  t",           "Cycle color theme"),
        key_line(theme, "  ? / F1",      "Toggle this help"),
        Line::from(""),
        key_line(theme, "CLI modes", ""),
        key_line(theme, "  --serve",         "Line requests on stdin, JSON out"),
        key_line(theme, "  --daemon",        "Headless producers + periodic log"),
        key_line(theme, "  --config",        "Print current config values"),
        key_line(theme, "  --completions",   "Shell completion script"),
        Line::from(""),
        key_line(theme, "Averages", ""),
        key_line(theme, "  window",   "Only values still retained"),
        key_line(theme, "  all time", "Every value ever ingested"),
    ];

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn key_line<'a>(theme: &Theme, key: &'a str, desc: &'a str) -> Line<'a> {
    if desc.is_empty() {
        Line::from(Span::styled(key, theme.title))
    } else {
        Line::from(vec![
            Span::styled(format!("{:<18}", key), theme.footer_key),
            Span::styled(desc, theme.text_dim),
        ])
    }
}

/// Centered Rect of the given size, capped at the available area.
fn centered_rect(width: u16, height: u16, r: Rect) -> Rect {
    let w = width.min(r.width);
    let h = height.min(r.height);
    let x = r.x + (r.width.saturating_sub(w)) / 2;
    let y = r.y + (r.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}
