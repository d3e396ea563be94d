use ratatui::style::{Color, Modifier, Style};

const fn rgb(hex: u32) -> Color {
    Color::Rgb(
        ((hex >> 16) & 0xFF) as u8,
        ((hex >>  8) & 0xFF) as u8,
        ( hex        & 0xFF) as u8,
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThemeVariant {
    Default,
    Dracula,
    Gruvbox,
    Nord,
}

impl ThemeVariant {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Dracula => "Dracula",
            Self::Gruvbox => "Gruvbox",
            Self::Nord    => "Nord",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Default => Self::Dracula,
            Self::Dracula => Self::Gruvbox,
            Self::Gruvbox => Self::Nord,
            Self::Nord    => Self::Default,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "dracula" => Self::Dracula,
            "gruvbox" => Self::Gruvbox,
            "nord"    => Self::Nord,
            _         => Self::Default,
        }
    }
}

#[derive(Clone)]
pub struct Theme {
    pub border:      Style,
    pub title:       Style,
    pub text:        Style,
    pub text_dim:    Style,
    pub ok:          Style,
    pub warn:        Style,
    pub crit:        Style,
    pub window_spark: Style,
    pub rate_spark:  Style,
    pub footer_bg:   Style,
    pub footer_key:  Style,
    pub footer_text: Style,
}

/// Accent colours a palette supplies; everything else is derived.
struct Palette {
    border: Color,
    fg:     Color,
    dim:    Color,
    green:  Color,
    yellow: Color,
    red:    Color,
    cool:   Color,
    warm:   Color,
    bar:    Color,
    accent: Color,
}

impl Theme {
    pub fn for_variant(v: ThemeVariant) -> Self {
        let p = match v {
            ThemeVariant::Default => Palette {
                border: Color::DarkGray, fg: Color::White, dim: Color::DarkGray,
                green: Color::Green, yellow: Color::Yellow, red: Color::Red,
                cool: Color::Cyan, warm: Color::Yellow, bar: Color::DarkGray, accent: Color::Cyan,
            },
            // bg #282a36, line #44475a, comment #6272a4
            ThemeVariant::Dracula => Palette {
                border: rgb(0x6272a4), fg: rgb(0xf8f8f2), dim: rgb(0x6272a4),
                green: rgb(0x50fa7b), yellow: rgb(0xf1fa8c), red: rgb(0xff5555),
                cool: rgb(0x8be9fd), warm: rgb(0xffb86c), bar: rgb(0x44475a), accent: rgb(0xbd93f9),
            },
            ThemeVariant::Gruvbox => Palette {
                border: rgb(0x504945), fg: rgb(0xebdbb2), dim: rgb(0xa89984),
                green: rgb(0xb8bb26), yellow: rgb(0xfabd2f), red: rgb(0xfb4934),
                cool: rgb(0x83a598), warm: rgb(0xfe8019), bar: rgb(0x3c3836), accent: rgb(0x83a598),
            },
            // Polar Night bar, Frost accents, Aurora states
            ThemeVariant::Nord => Palette {
                border: rgb(0x4c566a), fg: rgb(0xe5e9f0), dim: rgb(0x4c566a),
                green: rgb(0xa3be8c), yellow: rgb(0xebcb8b), red: rgb(0xbf616a),
                cool: rgb(0x88c0d0), warm: rgb(0xd08770), bar: rgb(0x3b4252), accent: rgb(0x88c0d0),
            },
        };
        Self::from_palette(&p)
    }

    fn from_palette(p: &Palette) -> Self {
        Self {
            border:       Style::default().fg(p.border),
            title:        Style::default().fg(p.fg).add_modifier(Modifier::BOLD),
            text:         Style::default().fg(p.fg),
            text_dim:     Style::default().fg(p.dim),
            ok:           Style::default().fg(p.green),
            warn:         Style::default().fg(p.yellow),
            crit:         Style::default().fg(p.red).add_modifier(Modifier::BOLD),
            window_spark: Style::default().fg(p.cool),
            rate_spark:   Style::default().fg(p.warm),
            footer_bg:    Style::default().bg(p.bar).fg(p.fg),
            footer_key:   Style::default().bg(p.bar).fg(p.accent).add_modifier(Modifier::BOLD),
            footer_text:  Style::default().bg(p.bar).fg(p.dim),
        }
    }

    /// Fill-level style for the window gauge.
    pub fn fill_style(&self, pct: f64) -> Style {
        if      pct >= 100.0 { self.ok }
        else if pct >= 50.0  { self.warn }
        else                 { self.text_dim }
    }
}
