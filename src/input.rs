//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions.  Navigation mutates the app
//! directly; anything that needs the outside world (a fetch, the browser,
//! the clipboard) is returned as a [`Command`] for the main loop to run.
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] or a [`Command`] variant for the action.
//! 2. Add a `KeyCode` match arm in [`handle_key_event`].
//! 3. Update the help text in [`crate::ui`]'s status bar.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::App;

/// Side effects the main loop performs on behalf of a keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Refresh,
    Open,
    Share,
}

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.  While the error popup is
/// shown, the only keys that do anything are the ones that close it.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if app.error.is_some() {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
            app.dismiss_error();
        }
        return None;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Char('r') => return Some(Command::Refresh),
        KeyCode::Enter | KeyCode::Char('o') => return Some(Command::Open),
        KeyCode::Char('s') => return Some(Command::Share),
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::source::make_article;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with_error() -> App {
        let mut app = App::new();
        let seq = app.begin_fetch();
        app.apply_fetch(seq, Err(FetchError::EmptyBody));
        app
    }

    #[test]
    fn q_quits() {
        let mut app = App::new();
        assert_eq!(handle_key_event(&mut app, press(KeyCode::Char('q'))), None);
        assert!(app.quit);
    }

    #[test]
    fn action_keys_return_commands() {
        let mut app = App::new();
        assert_eq!(
            handle_key_event(&mut app, press(KeyCode::Char('r'))),
            Some(Command::Refresh)
        );
        assert_eq!(handle_key_event(&mut app, press(KeyCode::Enter)), Some(Command::Open));
        assert_eq!(
            handle_key_event(&mut app, press(KeyCode::Char('s'))),
            Some(Command::Share)
        );
    }

    #[test]
    fn navigation_moves_selection() {
        let mut app = App::new();
        let seq = app.begin_fetch();
        app.apply_fetch(
            seq,
            Ok(vec![make_article("A", "http://a"), make_article("B", "http://b")]),
        );

        handle_key_event(&mut app, press(KeyCode::Char('j')));
        assert_eq!(app.list_state.selected(), Some(1));
        handle_key_event(&mut app, press(KeyCode::Char('g')));
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn esc_dismisses_popup_instead_of_quitting() {
        let mut app = app_with_error();
        handle_key_event(&mut app, press(KeyCode::Esc));
        assert!(app.error.is_none());
        assert!(!app.quit);
    }

    #[test]
    fn popup_swallows_other_keys() {
        let mut app = app_with_error();
        assert_eq!(handle_key_event(&mut app, press(KeyCode::Char('r'))), None);
        handle_key_event(&mut app, press(KeyCode::Char('q')));
        assert!(!app.quit);
        assert!(app.error.is_some());
    }

    #[test]
    fn release_events_are_ignored() {
        let mut app = App::new();
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        handle_key_event(&mut app, release);
        assert!(!app.quit);
    }
}
