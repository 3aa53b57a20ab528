use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};
use ostravels_core::{ChatMessage, CountryVisaRecord, MessageBody, Region, Sender};
use crate::app::{App, InputMode, NavLevel, Screen};

const BOT_NAME: &str = "O.S Travel:";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);

    match app.screen {
        Screen::Chat => render_chat_screen(app, frame, body_area),
        Screen::Directory => render_directory_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" O.S Travel Visa Assistant ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match (app.screen, app.input_mode) {
        (Screen::Directory, _) => " COUNTRIES ",
        (Screen::Chat, InputMode::Editing) => " TYPE ",
        (Screen::Chat, InputMode::Normal) => " CHAT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let pairs: &[(&str, &str)] = match (app.screen, app.input_mode) {
        (Screen::Chat, InputMode::Editing) => &[
            (" Enter ", " send "),
            (" Tab ", " replies "),
            (" Esc ", " normal "),
        ],
        (Screen::Chat, InputMode::Normal) => &[
            (" 1-9 ", " reply "),
            (" h/l ", " pick "),
            (" Enter ", " choose "),
            (" j/k ", " scroll "),
            (" i ", " type "),
            (" r ", " restart "),
            (" Tab ", " countries "),
            (" q ", " quit "),
        ],
        (Screen::Directory, _) => &[
            (" j/k ", " nav "),
            (" Enter ", " select/ask "),
            (" h ", " back "),
            (" Tab ", " chat "),
            (" q ", " quit "),
        ],
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    for (key, label) in pairs {
        spans.push(Span::styled(*key, key_style));
        spans.push(Span::styled(*label, label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Wrap text to `width` columns at word boundaries. Words longer than a
/// whole row are split.
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();

        while chars.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current_line));
                current_len = 0;
            }
            lines.push(chars.drain(..width).collect());
        }

        let word_len = chars.len();
        let word: String = chars.into_iter().collect();

        if current_len == 0 {
            current_line = word;
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current_line.push(' ');
            current_line.push_str(&word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::replace(&mut current_line, word));
            current_len = word_len;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Append `text` wrapped to `width`, one styled [`Line`] per row.
/// `prefix` leads the first row; later rows are indented to match.
fn push_wrapped(
    lines: &mut Vec<Line<'static>>,
    text: &str,
    width: usize,
    style: Style,
    prefix: &str,
) {
    let indent = " ".repeat(prefix.chars().count());
    let available = width.saturating_sub(indent.len()).max(1);

    for (i, row) in wrap_text_to_width(text, available).into_iter().enumerate() {
        let lead = if i == 0 { prefix } else { indent.as_str() };
        lines.push(Line::from(Span::styled(format!("{}{}", lead, row), style)));
    }
}

fn country_card_lines(country: &CountryVisaRecord, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    push_wrapped(
        &mut lines,
        &format!("{} Visa", country.name),
        width,
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        "",
    );
    push_wrapped(&mut lines, &country.snippet, width, Style::default(), "");
    push_wrapped(&mut lines, "Learn more:", width, Style::default(), "");
    push_wrapped(
        &mut lines,
        &country.url,
        width,
        Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
        "",
    );
    lines
}

fn label_style(sender: Sender) -> Style {
    let color = match sender {
        Sender::User => Color::Cyan,
        Sender::Bot => Color::Yellow,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Rows for one message, already wrapped to `width`
fn message_lines(msg: &ChatMessage, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let label = match msg.sender {
        Sender::User => "You:",
        Sender::Bot => BOT_NAME,
    };
    push_wrapped(&mut lines, label, width, label_style(msg.sender), "");

    match &msg.body {
        MessageBody::Text(text) => {
            for line in text.lines() {
                push_wrapped(&mut lines, line, width, Style::default(), "");
            }
        }
        MessageBody::CountryInfo(country) => lines.extend(country_card_lines(country, width)),
        MessageBody::CountryList(list) => {
            push_wrapped(
                &mut lines,
                &list.title,
                width,
                Style::default().add_modifier(Modifier::BOLD),
                "",
            );
            for country in &list.countries {
                push_wrapped(&mut lines, &country.name, width, Style::default(), "  • ");
            }
        }
    }

    lines.push(Line::default());
    lines
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let has_replies = !app.conversation.quick_replies().is_empty();

    let [chat_area, replies_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(if has_replies { 3 } else { 0 }),
        Constraint::Length(3),
    ])
    .areas(area);

    // Store area for mouse hit-testing
    app.chat_area = Some(chat_area);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" O.S Travel Bot ");

    let inner_height = chat_area.height.saturating_sub(2);
    let inner_width = chat_area.width.saturating_sub(2) as usize;

    let mut lines: Vec<Line> = Vec::new();
    for msg in app.conversation.messages() {
        lines.extend(message_lines(msg, inner_width));
    }

    if app.conversation.is_composing() {
        push_wrapped(&mut lines, BOT_NAME, inner_width, label_style(Sender::Bot), "");
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat(app.animation_frame() + 1);
        push_wrapped(
            &mut lines,
            &format!("typing{}", dots),
            inner_width,
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            "",
        );
    }

    // Lines are pre-wrapped, so one line is one row
    let total_rows = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let max_scroll = total_rows.saturating_sub(inner_height);
    if app.follow_bottom || app.chat_scroll >= max_scroll {
        app.chat_scroll = max_scroll;
        app.follow_bottom = true;
    }

    let chat_text = if lines.is_empty() {
        Text::from(Span::styled(
            "Ask about a country (e.g. Thailand) or a region (e.g. Schengen)...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    if has_replies {
        render_quick_replies(app, frame, replies_area);
    }

    render_input(app, frame, input_area);
}

fn render_quick_replies(app: &App, frame: &mut Frame, area: Rect) {
    let selected_style = Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let reply_style = Style::default().bg(Color::DarkGray).fg(Color::White);

    let mut spans = Vec::new();
    for (i, reply) in app.conversation.quick_replies().iter().enumerate() {
        let style = if app.input_mode == InputMode::Normal && app.selected_reply == Some(i) {
            selected_style
        } else {
            reply_style
        };
        spans.push(Span::styled(format!(" {} {} ", i + 1, reply.label), style));
        spans.push(Span::raw(" "));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Quick replies ");

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { Color::Yellow } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Type your message ");

    // Horizontal scrolling keeps the cursor visible
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width > 0 && app.cursor >= inner_width {
        app.cursor - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);
    frame.render_widget(input, area);

    if editing {
        let cursor_x = (app.cursor - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_directory_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [list_area, card_area] = Layout::horizontal([
        Constraint::Percentage(35),
        Constraint::Percentage(65),
    ])
    .areas(area);

    let list_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", app.directory_title()));

    let items: Vec<ListItem> = match app.nav_level {
        NavLevel::Region => {
            let db = app.conversation.resolver().db();
            Region::all()
                .into_iter()
                .map(|region| {
                    let count = db.countries_in_region(region).len();
                    ListItem::new(format!(" {} ({}) ", region.display_name(), count))
                })
                .collect()
        }
        NavLevel::Country => app
            .cached_countries
            .iter()
            .map(|country| ListItem::new(format!(" {} ", country.name)))
            .collect(),
    };

    let list = List::new(items)
        .block(list_block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    match app.nav_level {
        NavLevel::Region => frame.render_stateful_widget(list, list_area, &mut app.region_state),
        NavLevel::Country => frame.render_stateful_widget(list, list_area, &mut app.country_state),
    }

    let card_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Visa Details ");

    let card_width = card_area.width.saturating_sub(2) as usize;
    let card_text = match app.selected_country() {
        Some(country) => {
            let mut lines = country_card_lines(country, card_width);
            lines.push(Line::default());
            push_wrapped(
                &mut lines,
                "Press Enter to ask the bot about this country",
                card_width,
                Style::default().fg(Color::DarkGray),
                "",
            );
            Text::from(lines)
        }
        None => Text::from(Span::styled(
            "Select a region to see the countries we service",
            Style::default().fg(Color::DarkGray),
        )),
    };

    let card = Paragraph::new(card_text).block(card_block);
    frame.render_widget(card, card_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ostravels_core::{Conversation, Pacing, Resolver, VisaDb};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use std::time::Instant;

    fn screen_rows(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
            .collect()
    }

    #[test]
    fn test_wrap_text_breaks_at_words_and_splits_long_words() {
        assert_eq!(
            wrap_text_to_width("Learn more about visas", 10),
            vec!["Learn more", "about", "visas"]
        );
        assert_eq!(
            wrap_text_to_width("go https://ostravels.com", 8),
            vec!["go", "https://", "ostravel", "s.com"]
        );
        assert_eq!(wrap_text_to_width("", 8), vec![String::new()]);
    }

    #[test]
    fn test_bullets_keep_their_indent_when_wrapped() {
        let mut lines = Vec::new();
        push_wrapped(&mut lines, "Bosnia and Herzegovina", 12, Style::default(), "  • ");
        let rows: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        assert_eq!(rows, vec!["  • Bosnia", "    and", "    Herzegov", "    ina"]);
    }

    #[test]
    fn test_country_list_renders_one_line_per_country() {
        let msg = ChatMessage {
            sender: Sender::Bot,
            body: MessageBody::CountryList(ostravels_core::CountryList {
                title: "Schengen Countries We Service".to_string(),
                countries: vec![
                    CountryVisaRecord {
                        name: "France".to_string(),
                        snippet: String::new(),
                        url: String::new(),
                    },
                    CountryVisaRecord {
                        name: "Spain".to_string(),
                        snippet: String::new(),
                        url: String::new(),
                    },
                ],
            }),
            replies: Vec::new(),
        };

        // label + title + 2 countries + spacer
        assert_eq!(message_lines(&msg, 40).len(), 5);
    }

    #[test]
    fn test_typing_indicator_stays_visible_at_any_width() {
        for width in 12..=80 {
            let resolver = Resolver::new(Arc::new(VisaDb::embedded().unwrap()));
            let mut app = App::new(Conversation::new(resolver, Pacing::default()));
            let now = Instant::now();

            app.conversation.open(now);
            for text in ["asia", "schengen", "Thailand", "price", "contact", "visa"] {
                app.conversation.submit(text, now);
            }
            app.conversation.flush();
            app.conversation.submit("flights", now);
            assert!(app.conversation.is_composing());

            let mut terminal = Terminal::new(TestBackend::new(width, 24)).unwrap();
            terminal.draw(|frame| render(&mut app, frame)).unwrap();

            let rows = screen_rows(&terminal);
            assert!(
                rows.iter().any(|row| row.contains("typing")),
                "typing indicator hidden at width {}",
                width
            );
        }
    }
}
