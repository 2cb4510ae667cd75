pub mod editor;
pub mod keyboard;
pub mod practice;

use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 3;
const VERTICAL_MARGIN: u16 = 1;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = area.inner(ratatui::layout::Margin {
            horizontal: HORIZONTAL_MARGIN.min(area.width / 4),
            vertical: VERTICAL_MARGIN.min(area.height / 4),
        });

        match self.state {
            AppState::Practice => practice::render(self, inner, buf),
            AppState::Editor => editor::render(self, inner, buf),
        }
    }
}
