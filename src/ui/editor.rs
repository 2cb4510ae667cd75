use layertype::{
    editor::Notice,
    keymap::{Layer, UNASSIGNED},
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Tabs, Widget},
};

use super::{
    keyboard::{keyboard_lines, keyboard_width},
    practice::centered,
};
use crate::App;

const STATUS_WIDTH: u16 = 24;

pub fn render(app: &App, area: Rect, buf: &mut Buffer) {
    let editor = &app.editor;
    let layout = &app.layout;

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // layer tabs + status
            Constraint::Length(1),
            Constraint::Length(layout.row_count() as u16),
            Constraint::Length(1),
            Constraint::Length(1), // selection / draft
            Constraint::Length(1), // notice
            Constraint::Min(0),
            Constraint::Length(1), // help
        ])
        .split(area);

    let header = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(STATUS_WIDTH)])
        .split(chunks[0]);

    Tabs::new(Layer::all().map(|l| format!("Layer {l}")))
        .select(editor.current_layer().index())
        .style(dim_style)
        .highlight_style(bold_style.fg(Color::Cyan).add_modifier(Modifier::UNDERLINED))
        .render(header[0], buf);

    let status = if editor.saves_in_flight() > 0 {
        Span::styled("saving...", italic_style.fg(Color::Yellow))
    } else if app.confirm_quit {
        Span::styled("unsaved! esc again to quit", bold_style.fg(Color::Red))
    } else if editor.is_dirty() {
        Span::styled("* unsaved changes", bold_style.fg(Color::Yellow))
    } else {
        Span::styled("saved", dim_style)
    };
    Paragraph::new(status)
        .alignment(Alignment::Right)
        .render(header[1], buf);

    let cursor_key = app.cursor.key(layout).map(|k| &k.position);
    let selected = editor.selected_position();
    let rows = keyboard_lines(layout, |key| {
        let label = editor.label(key.position.as_str());
        let mut style = if Some(&key.position) == selected {
            bold_style.fg(Color::Black).bg(Color::Yellow)
        } else if label == UNASSIGNED {
            dim_style
        } else {
            bold_style.fg(Color::White).bg(Color::DarkGray)
        };
        if Some(&key.position) == cursor_key {
            style = style.add_modifier(Modifier::REVERSED);
        }
        (label.to_string(), style)
    });
    let board = centered(chunks[2], keyboard_width(layout));
    Paragraph::new(rows).render(board, buf);

    let selection_line = match (selected, editor.draft()) {
        (Some(position), Some(draft)) => {
            let legend = layout
                .find(position.as_str())
                .map(|k| k.legend.as_str())
                .unwrap_or("?");
            Line::from(vec![
                Span::styled(
                    format!("{legend} ({position}) on layer {}: ", editor.current_layer()),
                    italic_style,
                ),
                Span::styled(format!("{draft}_"), bold_style.fg(Color::Cyan)),
            ])
        }
        _ => {
            let legend = app
                .cursor
                .key(layout)
                .map(|k| k.legend.as_str())
                .unwrap_or("?");
            Line::from(Span::styled(format!("key {legend}"), dim_style))
        }
    };
    Paragraph::new(selection_line)
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

    if let Some(notice) = editor.notice() {
        let span = match notice {
            Notice::Invalid(msg) => Span::styled(msg.as_str(), bold_style.fg(Color::Red)),
            Notice::Saved(msg) => Span::styled(msg.as_str(), bold_style.fg(Color::Green)),
            Notice::SaveFailed(msg) => {
                Span::styled(format!("save failed: {msg}"), bold_style.fg(Color::Red))
            }
        };
        Paragraph::new(span)
            .alignment(Alignment::Center)
            .render(chunks[5], buf);
    }

    let help = if selected.is_some() {
        "(type) character / (enter) assign / (esc) cancel"
    } else {
        "(arrows) move / (enter) edit / (0-5) layer / (s) save / (tab) practice / (esc) quit"
    };
    Paragraph::new(Span::styled(help, italic_style))
        .alignment(Alignment::Center)
        .render(chunks[7], buf);
}
