use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use std::time::Instant;
use crate::app::{App, InputMode, Screen};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    let now = Instant::now();
    match event {
        AppEvent::Key(key) => handle_key(app, key, now),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick(now),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent, now: Instant) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match (app.screen, app.input_mode) {
        (Screen::Chat, InputMode::Editing) => handle_chat_editing(app, key, now),
        (Screen::Chat, InputMode::Normal) => handle_chat_normal(app, key, now),
        (Screen::Directory, _) => handle_directory(app, key, now),
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Back to typing
        KeyCode::Char('i') | KeyCode::Char('/') => {
            app.selected_reply = None;
            app.input_mode = InputMode::Editing;
        }

        // Quick replies: number keys pick directly, arrows move the highlight
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            app.choose_quick_reply(index, now);
        }
        KeyCode::Left | KeyCode::Char('h') => app.reply_prev(),
        KeyCode::Right | KeyCode::Char('l') => app.reply_next(),
        KeyCode::Enter => {
            if !app.choose_selected_reply(now) {
                app.input_mode = InputMode::Editing;
            }
        }

        // Chat scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_chat_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_chat_up(1),
        KeyCode::PageDown => app.scroll_chat_down(10),
        KeyCode::PageUp => app.scroll_chat_up(10),
        KeyCode::Char('G') | KeyCode::End => app.follow_bottom = true,

        KeyCode::Char('r') => app.restart_conversation(now),
        KeyCode::Tab => app.screen = Screen::Directory,

        _ => {}
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Tab => {
            // Jump to the quick-reply bar
            app.input_mode = InputMode::Normal;
            app.selected_reply = None;
            app.reply_next();
        }
        KeyCode::Enter => {
            app.submit_input(now);
        }
        KeyCode::Backspace => {
            if app.cursor > 0 {
                app.cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.cursor = (app.cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.cursor = 0;
        }
        KeyCode::End => {
            app.cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.cursor);
            app.input.insert(byte_pos, c);
            app.cursor += 1;
        }
        _ => {}
    }
}

fn handle_directory(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Tab | KeyCode::Esc => app.screen = Screen::Chat,

        KeyCode::Char('j') | KeyCode::Down => app.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Char('g') | KeyCode::Home => app.nav_first(),
        KeyCode::Char('G') | KeyCode::End => app.nav_last(),
        KeyCode::Char('l') | KeyCode::Right => app.nav_enter(),
        KeyCode::Char('h') | KeyCode::Left | KeyCode::Backspace => app.nav_back(),

        // Enter drills into a region, or asks the bot about a country
        KeyCode::Enter => {
            if app.selected_country().is_some() {
                app.ask_about_selected_country(now);
            } else {
                app.nav_enter();
            }
        }
        KeyCode::Char('a') => app.ask_about_selected_country(now),

        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);

    match (app.screen, mouse.kind) {
        (Screen::Chat, MouseEventKind::ScrollDown) if in_chat => app.scroll_chat_down(3),
        (Screen::Chat, MouseEventKind::ScrollUp) if in_chat => app.scroll_chat_up(3),
        (Screen::Directory, MouseEventKind::ScrollDown) => app.nav_down(),
        (Screen::Directory, MouseEventKind::ScrollUp) => app.nav_up(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ostravels_core::{Conversation, MessageBody, Pacing, Resolver, VisaDb};
    use std::sync::Arc;

    fn app() -> App {
        let resolver = Resolver::new(Arc::new(VisaDb::embedded().unwrap()));
        App::new(Conversation::new(resolver, Pacing::instant()))
    }

    fn press(app: &mut App, code: KeyCode) {
        let key = KeyEvent::new(code, KeyModifiers::NONE);
        handle_event(app, AppEvent::Key(key)).unwrap();
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_char_to_byte_index_handles_multibyte() {
        assert_eq!(char_to_byte_index("héllo", 2), 3);
        assert_eq!(char_to_byte_index("abc", 10), 3);
    }

    #[test]
    fn test_typing_and_enter_submits() {
        let mut app = app();
        type_text(&mut app, "egpyt");
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Right);
        type_text(&mut app, "p");
        assert_eq!(app.input, "egypt");

        press(&mut app, KeyCode::Enter);
        handle_event(&mut app, AppEvent::Tick).unwrap();
        assert_eq!(app.conversation.messages().len(), 2);
    }

    #[test]
    fn test_number_key_picks_quick_reply() {
        let mut app = app();
        app.conversation.open(Instant::now());
        handle_event(&mut app, AppEvent::Tick).unwrap();

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(
            app.conversation.messages()[1].body,
            MessageBody::Text("Book a Flight".to_string())
        );
    }

    #[test]
    fn test_tab_switches_to_directory_from_normal_mode() {
        let mut app = app();
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.screen, Screen::Directory);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
