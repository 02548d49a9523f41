//! Key input to action mapping.
//!
//! Kept as a pure function so it can be tested without a terminal.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const NONE: KeyModifiers = KeyModifiers::NONE;
const CTRL: KeyModifiers = KeyModifiers::CONTROL;
const SHIFT: KeyModifiers = KeyModifiers::SHIFT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    // history
    HistoryPrevious,
    HistoryNext,

    // editing
    InsertChar(char),
    Backspace,
    DeleteToBeginning,

    TriggerCompletion,
    Execute,
    ClearScreen,
    Exit,

    Unsupported,
}

/// Decide what a key press does. `input_empty` turns Ctrl+D into exit.
pub fn determine_key_action(key: &KeyEvent, input_empty: bool) -> KeyAction {
    match (key.code, key.modifiers) {
        (KeyCode::Up, NONE) => KeyAction::HistoryPrevious,
        (KeyCode::Down, NONE) => KeyAction::HistoryNext,
        (KeyCode::Tab, NONE) => KeyAction::TriggerCompletion,
        (KeyCode::Enter, NONE) => KeyAction::Execute,
        (KeyCode::Backspace, NONE) => KeyAction::Backspace,

        (KeyCode::Char('c'), CTRL) => KeyAction::Exit,
        (KeyCode::Char('d'), CTRL) if input_empty => KeyAction::Exit,
        (KeyCode::Char('u'), CTRL) => KeyAction::DeleteToBeginning,
        (KeyCode::Char('l'), CTRL) => KeyAction::ClearScreen,
        (KeyCode::Char('p'), CTRL) => KeyAction::HistoryPrevious,
        (KeyCode::Char('n'), CTRL) => KeyAction::HistoryNext,

        (KeyCode::Char(ch), NONE) | (KeyCode::Char(ch), SHIFT) => KeyAction::InsertChar(ch),

        _ => KeyAction::Unsupported,
    }
}
