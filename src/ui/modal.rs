use crate::app::state::AppState;
use crate::ui::layout::centered;
use crate::ui::page::paint;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};

/// Draws open modals bottom to top; only the topmost gets the focused border.
pub fn render(frame: &mut Frame, state: &AppState) {
    let count = state.modals.len();
    for (i, modal) in state.modals.iter().enumerate() {
        let top = i + 1 == count;
        // Each stacked dialog sits a little lower and to the right
        let shift = (i as u16) * 2;
        let base = centered(frame.area(), 60, 50, (40, 10));
        let area = Rect::new(
            (base.x + shift).min(frame.area().right().saturating_sub(base.width)),
            (base.y + shift / 2).min(frame.area().bottom().saturating_sub(base.height)),
            base.width,
            base.height,
        );
        frame.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(if top {
                Theme::border_type_focused()
            } else {
                Theme::border_type()
            })
            .border_style(if top {
                Theme::border_focused()
            } else {
                Theme::border()
            })
            .padding(Padding::horizontal(1))
            .style(Style::default().bg(Theme::BG_ELEVATED));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let painted = paint(state, modal.node, inner.width);
        let height = inner.height as usize;
        let scroll = match painted.focus_line {
            Some(line) if top && height > 0 && line >= height => line + 1 - height,
            _ => 0,
        };
        let paragraph = Paragraph::new(painted.lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll as u16, 0));
        frame.render_widget(paragraph, inner);
    }
}
