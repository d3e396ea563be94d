use crate::ui::theme::Theme;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn render_footer(f: &mut Frame, area: Rect, paused: bool, theme: &Theme) {
    let feed = if paused { "Resume" } else { "Pause" };
    let keys: [(&str, &str); 6] = [
        ("q", "Quit"), ("Space", feed), ("0-9 Enter", "Lookup"),
        ("c/Esc", "Clear"), ("t", "Theme"), ("?", "Help"),
    ];

    let mut spans: Vec<Span> = vec![Span::styled(" ", theme.footer_bg)];
    for (key, desc) in keys {
        spans.push(Span::styled(format!(" {} ", key), theme.footer_key));
        spans.push(Span::styled(format!("{}  ", desc), theme.footer_text));
    }

    let para = Paragraph::new(Line::from(spans)).style(theme.footer_bg);
    f.render_widget(para, area);
}
