use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    TogglePause,   // space: freeze / resume the producer feed
    CycleTheme,
    ShowHelp,
    Digit(char),   // 0-9 / '-': build a window index to look up
    Backspace,
    Lookup,        // Enter: run the typed lookup
    ClearLookup,
    None,
}

pub fn handle_key(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _)
        | (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        (KeyCode::Char(' '), _) => Action::TogglePause,
        (KeyCode::Char('t'), _) => Action::CycleTheme,
        (KeyCode::Char('?'), _)
        | (KeyCode::F(1), _)   => Action::ShowHelp,

        (KeyCode::Char(c), _) if c.is_ascii_digit() || c == '-' => Action::Digit(c),
        (KeyCode::Backspace, _) => Action::Backspace,
        (KeyCode::Enter, _)     => Action::Lookup,
        (KeyCode::Esc, _)
        | (KeyCode::Char('c'), _) => Action::ClearLookup,

        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_bindings() {
        assert_eq!(handle_key(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(
            handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
        assert_eq!(handle_key(key(KeyCode::Char('c'))), Action::ClearLookup);
        assert_eq!(handle_key(key(KeyCode::Char(' '))), Action::TogglePause);
        assert_eq!(handle_key(key(KeyCode::Char('7'))), Action::Digit('7'));
        assert_eq!(handle_key(key(KeyCode::Char('-'))), Action::Digit('-'));
        assert_eq!(handle_key(key(KeyCode::Enter)), Action::Lookup);
        assert_eq!(handle_key(key(KeyCode::F(1))), Action::ShowHelp);
        assert_eq!(handle_key(key(KeyCode::Char('z'))), Action::None);
    }
}
