//! Key bindings: normal and vim-style.

use blockfall::Command;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Rotate,
    SoftDrop,
    HardDrop,
    Hold,
    Start,
    Pause,
    Quit,
    None,
}

impl Action {
    /// Engine command for in-game actions; `None` for Quit and unbound keys.
    pub fn command(self) -> Option<Command> {
        match self {
            Self::MoveLeft => Some(Command::MoveLeft),
            Self::MoveRight => Some(Command::MoveRight),
            Self::Rotate => Some(Command::Rotate),
            Self::SoftDrop => Some(Command::SoftDrop),
            Self::HardDrop => Some(Command::HardDrop),
            Self::Hold => Some(Command::Hold),
            Self::Start => Some(Command::Start),
            Self::Pause => Some(Command::Pause),
            Self::Quit | Self::None => None,
        }
    }

    /// Held keys that auto-repeat (DAS/ARR).
    pub fn repeats(self) -> bool {
        matches!(self, Self::MoveLeft | Self::MoveRight | Self::SoftDrop)
    }
}

/// Map key event to game action. Supports both normal (arrows, space) and vim (hjkl, etc.).
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p') => Action::Pause,
        KeyCode::Enter | KeyCode::Char('s') => Action::Start,
        KeyCode::Left | KeyCode::Char('h') => Action::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') => Action::MoveRight,
        KeyCode::Up | KeyCode::Char('k') => Action::HardDrop,
        KeyCode::Down | KeyCode::Char('j') => Action::SoftDrop,
        KeyCode::Char(' ') | KeyCode::Char('x') => Action::Rotate,
        KeyCode::Char('c') | KeyCode::Char('C') => Action::Hold,
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
    fn browser_layout_bindings() {
        assert_eq!(key_to_action(key(KeyCode::Left)), Action::MoveLeft);
        assert_eq!(key_to_action(key(KeyCode::Right)), Action::MoveRight);
        assert_eq!(key_to_action(key(KeyCode::Down)), Action::SoftDrop);
        assert_eq!(key_to_action(key(KeyCode::Up)), Action::HardDrop);
        assert_eq!(key_to_action(key(KeyCode::Char(' '))), Action::Rotate);
        assert_eq!(key_to_action(key(KeyCode::Char('c'))), Action::Hold);
    }

    #[test]
    fn vim_bindings_and_modifiers() {
        assert_eq!(key_to_action(key(KeyCode::Char('h'))), Action::MoveLeft);
        assert_eq!(key_to_action(key(KeyCode::Char('j'))), Action::SoftDrop);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(ctrl_c), Action::Quit);
        let alt_h = KeyEvent::new(KeyCode::Char('h'), KeyModifiers::ALT);
        assert_eq!(key_to_action(alt_h), Action::None);
    }

    #[test]
    fn quit_has_no_engine_command() {
        assert_eq!(Action::Quit.command(), None);
        assert_eq!(Action::Hold.command(), Some(Command::Hold));
        assert!(Action::MoveLeft.repeats());
        assert!(!Action::HardDrop.repeats());
    }
}
