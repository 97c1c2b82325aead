use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::state::DashboardState;

/// What the runner must do after a key press.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Refresh,
    /// Auto-refresh was switched on; the poll timer restarts.
    AutoRefreshEnabled,
    Submit,
    Quit,
}

pub fn handle_key(state: &mut DashboardState, key: KeyEvent) -> KeyAction {
    if key.kind == KeyEventKind::Release {
        return KeyAction::None;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Esc, _) => KeyAction::Quit,
        (KeyCode::F(5), _) | (KeyCode::Char('r'), KeyModifiers::CONTROL) => KeyAction::Refresh,
        (KeyCode::F(2), _) => {
            state.toggle_auto_refresh();
            if state.auto_refresh {
                KeyAction::AutoRefreshEnabled
            } else {
                KeyAction::None
            }
        }
        (KeyCode::F(3), _) => {
            state.cycle_filter();
            KeyAction::None
        }
        (KeyCode::Tab, _) => {
            state.form.severity = state.form.severity.next();
            KeyAction::None
        }
        (KeyCode::Enter, _) if !state.form.submitting => KeyAction::Submit,
        (KeyCode::Backspace, _) => {
            state.form.message.pop();
            KeyAction::None
        }
        (KeyCode::Char(c), m) if !m.contains(KeyModifiers::CONTROL) => {
            state.form.message.push(c);
            KeyAction::None
        }
        _ => KeyAction::None,
    }
}
