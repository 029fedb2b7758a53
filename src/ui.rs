use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use crate::app::{App, BackendStatus, DisplayState, InputMode};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, response region, input, footer
    let [header_area, display_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_display(app, frame, display_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);

    if app.notice.is_some() {
        render_notice(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let backend = match &app.backend {
        BackendStatus::Unknown => {
            Span::styled(" probing ", Style::default().fg(Color::Gray))
        }
        BackendStatus::Reachable(provider) => {
            Span::styled(format!(" {} ", provider), Style::default().fg(Color::Green))
        }
        BackendStatus::Unreachable => {
            Span::styled(" unreachable ", Style::default().fg(Color::Red))
        }
    };

    let title = Line::from(vec![
        Span::styled(" Agent Console ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            app.client.endpoint().to_string(),
            Style::default().fg(Color::White),
        ),
        backend,
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_display(app: &mut App, frame: &mut Frame, area: Rect) {
    // Inner size minus borders, for scroll calculations
    app.display_height = area.height.saturating_sub(2);
    let inner_width = area.width.saturating_sub(2) as usize;

    let display_text = match &app.display {
        DisplayState::Idle => Text::from(Span::styled(
            "Ask the agent anything...",
            Style::default().fg(Color::DarkGray),
        )),
        DisplayState::Loading => {
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            Text::from(Span::styled(
                format!("Loading{}", dots),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ))
        }
        DisplayState::Answer(answer) => {
            let lines: Vec<Line> = answer.lines().map(Line::from).collect();
            Text::from(lines)
        }
        DisplayState::Error(message) => Text::from(Span::styled(
            format!("Error: {}", message),
            Style::default().fg(Color::Red),
        )),
    };

    app.total_display_lines = wrapped_line_count(&display_text, inner_width);

    let focused = app.input_mode == InputMode::Normal;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let display_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Response ");

    // trim must stay off so indented JSON keeps its leading spaces
    let display = Paragraph::new(display_text)
        .block(display_block)
        .wrap(Wrap { trim: false })
        .scroll((app.display_scroll, 0));

    frame.render_widget(display, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let input_border_color = if editing { Color::Yellow } else { Color::DarkGray };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(input_border_color))
        .title(" Prompt (Enter to send) ");

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.prompt_cursor;

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    // Get the visible slice of the input
    let visible_text: String = app
        .prompt_input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    // Show cursor when editing
    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((
            area.x + cursor_x + 1,
            area.y + 1,
        ));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match app.input_mode {
        InputMode::Editing => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" Ctrl-C ", key_style),
            Span::styled(" quit ", label_style),
        ],
        InputMode::Normal => vec![
            Span::styled(" i ", key_style),
            Span::styled(" edit ", label_style),
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
    };

    let footer = Paragraph::new(Line::from(hints));
    frame.render_widget(footer, area);
}

fn render_notice(app: &App, frame: &mut Frame, area: Rect) {
    let Some(message) = &app.notice else {
        return;
    };

    // Calculate popup size and position (centered)
    let popup_width = ((message.chars().count() as u16) + 6)
        .max(30)
        .min(area.width.saturating_sub(4));
    let popup_height = 5;

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Notice ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let body = Paragraph::new(vec![
        Line::from(message.as_str()),
        Line::default(),
        Line::from(Span::styled(
            "Press any key to continue",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .wrap(Wrap { trim: true });

    frame.render_widget(body, inner);
}

/// Number of terminal rows a text occupies after wrapping to `width` columns.
/// Uses character counts, not byte lengths, for proper UTF-8 handling.
fn wrapped_line_count(text: &Text, width: usize) -> u16 {
    if width == 0 {
        return 0;
    }

    let mut total: u16 = 0;
    for line in &text.lines {
        let char_count: usize = line
            .spans
            .iter()
            .map(|span| span.content.chars().count())
            .sum();
        if char_count == 0 {
            total = total.saturating_add(1); // Empty line still takes one row
        } else {
            total = total.saturating_add(((char_count - 1) / width + 1) as u16);
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_line_count_single_line() {
        let text = Text::from("hello");
        assert_eq!(wrapped_line_count(&text, 10), 1);
    }

    #[test]
    fn test_wrapped_line_count_wraps_long_lines() {
        let text = Text::from("abcdefghij");
        assert_eq!(wrapped_line_count(&text, 4), 3);
        assert_eq!(wrapped_line_count(&text, 5), 2);
        assert_eq!(wrapped_line_count(&text, 10), 1);
    }

    #[test]
    fn test_wrapped_line_count_keeps_empty_lines() {
        let text = Text::from("a\n\nb");
        assert_eq!(wrapped_line_count(&text, 10), 3);
    }

    #[test]
    fn test_wrapped_line_count_zero_width() {
        let text = Text::from("anything");
        assert_eq!(wrapped_line_count(&text, 0), 0);
    }
}
