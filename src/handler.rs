use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crate::app::{App, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // The notice is modal: the next key dismisses it and does nothing else
    if app.notice.is_some() {
        app.dismiss_notice();
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Char('q') => app.should_quit = true,

        // Back to the prompt
        KeyCode::Char('i') | KeyCode::Char('/') | KeyCode::Tab => {
            app.input_mode = InputMode::Editing;
            app.prompt_cursor = app.prompt_input.chars().count();
        }

        // Re-send without entering the input (the send control itself)
        KeyCode::Enter => {
            app.submit_prompt();
        }

        // Scroll the response region
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(),
        KeyCode::Char('g') => app.display_scroll = 0,
        KeyCode::Char('G') => {
            app.display_scroll = app
                .total_display_lines
                .saturating_sub(app.display_height);
        }

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            // Leave editing on dispatch so the response can be scrolled
            if app.submit_prompt() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Backspace => {
            if app.prompt_cursor > 0 {
                app.prompt_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.prompt_input, app.prompt_cursor);
                app.prompt_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.prompt_input.chars().count();
            if app.prompt_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.prompt_input, app.prompt_cursor);
                app.prompt_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.prompt_cursor = app.prompt_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.prompt_input.chars().count();
            app.prompt_cursor = (app.prompt_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.prompt_cursor = 0;
        }
        KeyCode::End => {
            app.prompt_cursor = app.prompt_input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.prompt_input, app.prompt_cursor);
            app.prompt_input.insert(byte_pos, c);
            app.prompt_cursor += 1;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::AgentClient;
    use std::time::Duration;

    fn test_app() -> App {
        let client =
            AgentClient::new("http://127.0.0.1:9", Duration::from_secs(1)).expect("client");
        App::new(client)
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_char_to_byte_index_handles_multibyte() {
        let s = "héllo";
        assert_eq!(char_to_byte_index(s, 0), 0);
        assert_eq!(char_to_byte_index(s, 1), 1);
        assert_eq!(char_to_byte_index(s, 2), 3);
        assert_eq!(char_to_byte_index(s, 99), s.len());
    }

    #[test]
    fn test_editing_inserts_at_cursor() {
        let mut app = test_app();

        for c in "héllo".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(app.prompt_input, "héllo");
        assert_eq!(app.prompt_cursor, 5);

        press(&mut app, KeyCode::Home);
        press(&mut app, KeyCode::Char('>'));
        assert_eq!(app.prompt_input, ">héllo");

        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.prompt_input, ">héll");
    }

    #[test]
    fn test_backspace_removes_multibyte_char_cleanly() {
        let mut app = test_app();
        for c in "añ".chars() {
            press(&mut app, KeyCode::Char(c));
        }

        press(&mut app, KeyCode::Backspace);

        assert_eq!(app.prompt_input, "a");
        assert_eq!(app.prompt_cursor, 1);
    }

    #[tokio::test]
    async fn test_notice_blocks_input_until_dismissed() {
        let mut app = test_app();

        // Empty dispatch raises the notice
        press(&mut app, KeyCode::Enter);
        assert!(app.notice.is_some());
        assert!(app.request_task.is_none());

        // The next key only dismisses; nothing is typed or dispatched
        press(&mut app, KeyCode::Char('x'));
        assert!(app.notice.is_none());
        assert!(app.prompt_input.is_empty());
        assert!(app.request_task.is_none());
    }

    #[tokio::test]
    async fn test_enter_dispatches_and_leaves_editing() {
        let mut app = test_app();
        for c in "hello".chars() {
            press(&mut app, KeyCode::Char(c));
        }

        press(&mut app, KeyCode::Enter);

        assert!(app.request_task.is_some());
        assert_eq!(app.input_mode, InputMode::Normal);
        if let Some(task) = app.request_task.take() {
            task.abort();
        }
    }
}
