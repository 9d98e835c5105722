use crate::app::state::*;
use crate::ui::page::glyph;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem};

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.focus == FocusPanel::Modules;
    let (border_style, border_type, bg) = if focused {
        (
            Theme::border_focused(),
            Theme::border_type_focused(),
            Theme::panel_bg_focused(),
        )
    } else {
        (Theme::border(), Theme::border_type(), Theme::panel_bg())
    };

    let block = Block::default()
        .title(" Modules ")
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border_style)
        .style(bg);

    let mut items: Vec<ListItem> = Vec::new();

    // Host badge at the top
    if let Some(session) = &state.session {
        let colour = Theme::named(&session.host_badge_color);
        items.push(ListItem::new(Line::from(vec![
            Span::styled(" ◆ ", Style::default().fg(colour).add_modifier(Modifier::BOLD)),
            Span::styled(
                session.host_name.clone(),
                Style::default().fg(Theme::BG_DARK).bg(colour),
            ),
        ])));
    }

    let entries = state.sidebar_entries();
    let current = state.nav.current();
    for (i, entry) in entries.iter().enumerate() {
        let is_current = current
            .is_some_and(|c| c.module == entry.module && c.sub_module == entry.sub_module);
        let under_cursor = focused && i == state.sidebar_cursor;

        let mut style = if is_current {
            Theme::entry_active()
        } else {
            Theme::entry_normal()
        };
        if under_cursor {
            style = style.add_modifier(Modifier::REVERSED);
        }

        let spans = if entry.sub_module == 0 {
            vec![
                Span::styled(
                    format!(" {} ", glyph(&entry.icon)),
                    Style::default().fg(Theme::ACCENT_TEAL),
                ),
                Span::styled(entry.title.clone(), style),
            ]
        } else {
            let last = entries
                .get(i + 1)
                .map_or(true, |next| next.module != entry.module);
            let prefix = if last { " └─" } else { " ├─" };
            vec![
                Span::styled(prefix, Style::default().fg(Theme::BORDER_DIM)),
                Span::styled(entry.title.clone(), style),
            ]
        };
        items.push(ListItem::new(Line::from(spans)));
    }

    if entries.is_empty() {
        items.push(ListItem::new(Span::styled(" No modules", Theme::muted())));
    }

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}
