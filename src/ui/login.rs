//! The login screen: two fields in a centered box.

use crate::app::state::*;
use crate::ui::layout::centered;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

pub fn render(frame: &mut Frame, state: &AppState) {
    let area = centered(frame.area(), 40, 30, (44, 11));
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Log in ")
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_type(Theme::border_type_focused())
        .border_style(Theme::border_focused())
        .padding(Padding::horizontal(1))
        .style(Theme::panel_bg_focused());
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height < 7 {
        return;
    }

    let form = &state.login;
    let login_area = Rect::new(inner.x, inner.y, inner.width, 3);
    let password_area = Rect::new(inner.x, inner.y + 3, inner.width, 3);
    let masked = "*".repeat(form.password.text.chars().count());
    render_field(frame, login_area, "Login", &form.login.text, form, LoginField::Login);
    render_field(frame, password_area, "Password", &masked, form, LoginField::Password);

    let hint = if form.pending {
        Span::styled("Signing in...", Style::default().fg(Theme::ACCENT_AMBER))
    } else if form.invalid {
        Span::styled("Invalid login or password", Theme::invalid())
    } else {
        Span::styled("Enter to continue, Ctrl+C to quit", Theme::muted())
    };
    let hint_area = Rect::new(inner.x, inner.y + 6, inner.width, 1);
    frame.render_widget(Paragraph::new(Line::from(hint)), hint_area);
}

fn render_field(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    text: &str,
    form: &LoginForm,
    field: LoginField,
) {
    let focused = form.field == field && !form.pending;
    let border_style = if form.invalid {
        Theme::invalid()
    } else if focused {
        Theme::border_focused()
    } else {
        Theme::border()
    };

    let block = Block::default()
        .title(format!(" {} ", title))
        .title_style(if focused { Theme::title() } else { Theme::border() })
        .borders(Borders::ALL)
        .border_type(if focused {
            Theme::border_type_focused()
        } else {
            Theme::border_type()
        })
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let line = Line::from(vec![
        Span::styled("❯ ", Style::default().fg(Theme::ACCENT_TEAL)),
        Span::styled(text.to_string(), Theme::input_text()),
    ]);
    frame.render_widget(Paragraph::new(line), inner);

    if focused && inner.width > 0 {
        // Cursor offset: chevron "❯ " (2 chars)
        let input = match field {
            LoginField::Login => &form.login,
            LoginField::Password => &form.password,
        };
        let chars = input.text[..input.cursor].chars().count() as u16;
        let cursor_x = inner.x + 2 + chars;
        frame.set_cursor_position((cursor_x.min(inner.right() - 1), inner.y));
    }
}
