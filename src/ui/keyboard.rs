use layertype::{
    finger::Rgb,
    layout::{KeyboardLayout, PhysicalKey},
};
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthChar;

/// Terminal columns per key unit, gap included.
pub const KEY_UNIT: u16 = 5;

pub fn rgb(c: Rgb) -> Color {
    Color::Rgb(c.0, c.1, c.2)
}

/// Cells available for a key's label.
pub fn key_cells(key: &PhysicalKey) -> usize {
    usize::from(key.width * KEY_UNIT).saturating_sub(1)
}

/// Truncates `label` to `cells` display columns and centers it.
pub fn fit(label: &str, cells: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for c in label.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > cells {
            break;
        }
        used += w;
        out.push(c);
    }

    let pad = cells - used;
    let left = pad / 2;
    format!("{}{}{}", " ".repeat(left), out, " ".repeat(pad - left))
}

/// One line per keyboard row; `cell` decides each key's label and style.
pub fn keyboard_lines<'a, F>(layout: &KeyboardLayout, cell: F) -> Vec<Line<'a>>
where
    F: Fn(&PhysicalKey) -> (String, Style),
{
    layout
        .rows()
        .iter()
        .map(|row| {
            let spans = row
                .iter()
                .flat_map(|key| {
                    let (label, style) = cell(key);
                    [
                        Span::styled(fit(&label, key_cells(key)), style),
                        Span::raw(" "),
                    ]
                })
                .collect::<Vec<Span>>();
            Line::from(spans)
        })
        .collect()
}

/// Widest row in terminal columns.
pub fn keyboard_width(layout: &KeyboardLayout) -> u16 {
    layout
        .rows()
        .iter()
        .map(|row| row.iter().map(|k| k.width * KEY_UNIT).sum::<u16>())
        .max()
        .unwrap_or(0)
}
