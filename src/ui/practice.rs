use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use super::keyboard::{keyboard_lines, keyboard_width, rgb};
use crate::App;

pub fn render(app: &App, area: Rect, buf: &mut Buffer) {
    let typing = &app.typing;
    let layout = &app.layout;

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = bold_style.fg(Color::Green);
    let red_bold_style = bold_style.fg(Color::Red);
    let dim_bold_style = bold_style.add_modifier(Modifier::DIM);
    let key_text_style = Style::default().fg(Color::Black);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // progress
            Constraint::Min(1),
            Constraint::Length(1), // word
            Constraint::Length(1), // input echo
            Constraint::Length(1), // finger hint
            Constraint::Length(1),
            Constraint::Length(layout.row_count() as u16),
            Constraint::Length(1),
            Constraint::Length(1), // banner
            Constraint::Min(1),
            Constraint::Length(1), // help
        ])
        .split(area);

    Paragraph::new(Span::styled(typing.progress_label(), dim_bold_style))
        .alignment(Alignment::Right)
        .render(chunks[0], buf);

    let view = typing.view();
    let mut spans = vec![Span::styled(view.completed.to_string(), green_bold_style)];
    if let Some(c) = view.current {
        let current_style = if view.has_error {
            red_bold_style.add_modifier(Modifier::UNDERLINED | Modifier::REVERSED)
        } else {
            bold_style.fg(Color::Blue).add_modifier(Modifier::UNDERLINED)
        };
        spans.push(Span::styled(c.to_string(), current_style));
    }
    spans.push(Span::styled(view.remaining.to_string(), dim_bold_style));
    Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    let echo_style = if typing.has_error() {
        red_bold_style
    } else {
        Style::default().add_modifier(Modifier::ITALIC)
    };
    Paragraph::new(Span::styled(format!("> {}", typing.input()), echo_style))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    let highlight = typing.highlight();
    if let Some(h) = &highlight {
        let hint = Line::from(vec![
            Span::raw("next key "),
            Span::styled(
                format!(" {} ", h.key_label),
                key_text_style.bg(rgb(h.colors.dark)).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" with {}", h.finger)),
        ]);
        Paragraph::new(hint)
            .alignment(Alignment::Center)
            .render(chunks[4], buf);
    }

    let rows = keyboard_lines(layout, |key| {
        let lit = highlight
            .as_ref()
            .is_some_and(|h| h.key_label == key.legend);
        let style = match typing.guide().resting_colors(&key.legend) {
            Some(pair) if lit => key_text_style
                .bg(rgb(pair.dark))
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            Some(pair) => key_text_style.bg(rgb(pair.light)),
            None => Style::default().add_modifier(Modifier::DIM),
        };
        (key.legend.clone(), style)
    });
    let board = centered(chunks[6], keyboard_width(layout));
    Paragraph::new(rows).render(board, buf);

    if let Some(banner) = &app.banner {
        Paragraph::new(Span::styled(
            banner.as_str(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[8], buf);
    }

    Paragraph::new(Span::styled(
        "(tab) keymap editor / (esc) quit",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[10], buf);
}

/// Horizontally centers a block `width` columns wide inside `area`.
pub fn centered(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}
