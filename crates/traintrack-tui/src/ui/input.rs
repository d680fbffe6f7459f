//! Keyboard input handling for the TUI.
//!
//! Translates key events into application state changes and store calls.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState, Focus, Tab, PAGE_SCROLL_SIZE};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::EditingForm => {
            handle_form_input(app, key).await;
            return Ok(false);
        }
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::ConfirmingDelete => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.confirm_delete().await;
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.cancel_delete();
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::Searching => {
            handle_search_input(app, key);
            return Ok(false);
        }
        AppState::Normal | AppState::Quitting => {}
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('1') => app.switch_tab(Tab::Athletes),
        KeyCode::Char('2') => app.switch_tab(Tab::Groups),
        KeyCode::Char('3') => app.switch_tab(Tab::Schedule),
        KeyCode::Left => app.switch_tab(app.current_tab.prev()),
        KeyCode::Right => app.switch_tab(app.current_tab.next()),
        KeyCode::Char('u') => app.refresh_background(),
        KeyCode::Char('/') => {
            app.switch_tab(Tab::Athletes);
            app.state = AppState::Searching;
            app.search_query.clear();
            app.athlete_selection = 0;
        }
        KeyCode::Tab => {
            // Toggle focus between list and detail panels
            app.focus = match app.focus {
                Focus::List => Focus::Detail,
                Focus::Detail => Focus::List,
            };
        }
        KeyCode::Esc => {
            if !app.search_query.is_empty() {
                app.search_query.clear();
                app.clamp_selections();
            }
            app.focus = Focus::List;
        }
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::PageUp => app.move_selection(-(PAGE_SCROLL_SIZE as isize)),
        KeyCode::PageDown => app.move_selection(PAGE_SCROLL_SIZE as isize),
        KeyCode::Home => app.move_selection(isize::MIN),
        KeyCode::End => app.select_last(),
        _ => match app.current_tab {
            Tab::Athletes => handle_athletes_input(app, key).await,
            Tab::Groups => handle_groups_input(app, key),
            Tab::Schedule => handle_schedule_input(app, key),
        },
    }

    Ok(false)
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.search_query.clear();
        }
        KeyCode::Enter => {
            // Keep search query active
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => {
            app.search_query.pop();
        }
        KeyCode::Char(c) => {
            app.search_query.push(c);
            // Reset selection when search changes
            app.athlete_selection = 0;
        }
        _ => {}
    }
    app.clamp_selections();
}

async fn handle_form_input(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Enter {
        app.submit_form().await;
        return;
    }
    if key.code == KeyCode::Esc {
        app.cancel_form();
        return;
    }

    let Some(form) = app.form.as_mut() else {
        app.state = AppState::Normal;
        return;
    };
    match key.code {
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        KeyCode::Left => form.cycle_choice(false),
        KeyCode::Right => form.cycle_choice(true),
        KeyCode::Backspace => form.pop_char(),
        KeyCode::Char(c) => form.push_char(c),
        _ => {}
    }
}

async fn handle_athletes_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(' ') | KeyCode::Char('c') | KeyCode::Enter => app.check_in_selected().await,
        KeyCode::Char('n') => app.start_new_athlete(),
        KeyCode::Char('e') => app.start_edit_athlete(),
        _ => {}
    }
}

fn handle_groups_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('e') | KeyCode::Enter => app.start_edit_group(),
        KeyCode::Char('n') => app.start_new_schedule(),
        _ => {}
    }
}

fn handle_schedule_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('n') => app.start_new_schedule(),
        KeyCode::Char('d') | KeyCode::Delete => app.start_delete_schedule(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use traintrack_core::cache::CacheManager;
    use traintrack_core::{ApiClient, Config};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app(dir: &tempfile::TempDir) -> App {
        let api = ApiClient::new("http://127.0.0.1:9/api", None).unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();
        App::from_parts(Config::default(), api, cache)
    }

    #[tokio::test]
    async fn test_quit_requires_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);

        assert!(!handle_input(&mut app, key(KeyCode::Char('q'))).await.unwrap());
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(!handle_input(&mut app, key(KeyCode::Char('n'))).await.unwrap());
        assert_eq!(app.state, AppState::Normal);

        handle_input(&mut app, key(KeyCode::Char('q'))).await.unwrap();
        assert!(handle_input(&mut app, key(KeyCode::Char('y'))).await.unwrap());
    }

    #[tokio::test]
    async fn test_search_typing() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.switch_tab(Tab::Schedule);

        handle_input(&mut app, key(KeyCode::Char('/'))).await.unwrap();
        assert_eq!(app.current_tab, Tab::Athletes);
        for c in "box".chars() {
            handle_input(&mut app, key(KeyCode::Char(c))).await.unwrap();
        }
        handle_input(&mut app, key(KeyCode::Backspace)).await.unwrap();
        handle_input(&mut app, key(KeyCode::Enter)).await.unwrap();

        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.search_query, "bo");

        handle_input(&mut app, key(KeyCode::Esc)).await.unwrap();
        assert!(app.search_query.is_empty());
    }

    #[tokio::test]
    async fn test_form_keys_edit_and_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);

        handle_input(&mut app, key(KeyCode::Char('n'))).await.unwrap();
        assert_eq!(app.state, AppState::EditingForm);

        // 'q' is text inside a form, not quit
        handle_input(&mut app, key(KeyCode::Char('q'))).await.unwrap();
        assert_eq!(app.state, AppState::EditingForm);
        assert_eq!(app.form.as_ref().map(|f| f.fields[0].value.as_str()), Some("q"));

        handle_input(&mut app, key(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.state, AppState::Normal);
        assert!(app.form.is_none());
    }

    #[tokio::test]
    async fn test_tab_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);

        handle_input(&mut app, key(KeyCode::Char('3'))).await.unwrap();
        assert_eq!(app.current_tab, Tab::Schedule);
        handle_input(&mut app, key(KeyCode::Right)).await.unwrap();
        assert_eq!(app.current_tab, Tab::Athletes);
        handle_input(&mut app, key(KeyCode::Tab)).await.unwrap();
        assert_eq!(app.focus, Focus::Detail);
        handle_input(&mut app, key(KeyCode::Left)).await.unwrap();
        assert_eq!(app.current_tab, Tab::Schedule);
        assert_eq!(app.focus, Focus::List);
    }
}
