use crate::app::state::AppState;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

const TOAST_WIDTH: u16 = 36;
const TOAST_HEIGHT: u16 = 4;

/// Stacks alert toasts in the top-right corner, newest last.
pub fn render(frame: &mut Frame, state: &AppState) {
    let screen = frame.area();
    let width = TOAST_WIDTH.min(screen.width);
    let mut y = screen.y + 1;
    for toast in &state.toasts {
        if y + TOAST_HEIGHT > screen.bottom() {
            break;
        }
        let area = Rect::new(screen.right().saturating_sub(width + 1), y, width, TOAST_HEIGHT);
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(format!(" {} ", toast.title))
            .title_style(Theme::title())
            .borders(Borders::ALL)
            .border_type(Theme::border_type_focused())
            .border_style(Style::default().fg(Theme::ACCENT_AMBER))
            .style(Theme::toast());
        let paragraph = Paragraph::new(toast.text.as_str())
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        y += TOAST_HEIGHT;
    }
}
