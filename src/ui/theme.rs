use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;

pub struct Theme;

impl Theme {
    pub const BG_DARK: Color = Color::Rgb(18, 18, 24);
    pub const BG_SURFACE: Color = Color::Rgb(28, 28, 38);
    pub const BG_ELEVATED: Color = Color::Rgb(40, 40, 54);
    pub const BORDER_DIM: Color = Color::Rgb(70, 70, 90);
    pub const TEXT_PRIMARY: Color = Color::Rgb(220, 220, 230);
    pub const TEXT_SECONDARY: Color = Color::Rgb(150, 150, 170);
    pub const TEXT_MUTED: Color = Color::Rgb(100, 100, 120);
    pub const ACCENT_TEAL: Color = Color::Rgb(80, 200, 190);
    pub const ACCENT_AMBER: Color = Color::Rgb(240, 180, 70);
    pub const ACCENT_LAVENDER: Color = Color::Rgb(170, 150, 240);
    pub const ACCENT_RED: Color = Color::Rgb(235, 90, 90);
    pub const ACCENT_GREEN: Color = Color::Rgb(110, 210, 120);

    pub fn border() -> Style {
        Style::default().fg(Self::BORDER_DIM)
    }

    pub fn border_focused() -> Style {
        Style::default().fg(Self::ACCENT_TEAL)
    }

    pub fn border_type() -> BorderType {
        BorderType::Plain
    }

    pub fn border_type_focused() -> BorderType {
        BorderType::Rounded
    }

    pub fn panel_bg() -> Style {
        Style::default().bg(Self::BG_DARK)
    }

    pub fn panel_bg_focused() -> Style {
        Style::default().bg(Self::BG_SURFACE)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    pub fn muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    pub fn input_text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    pub fn invalid() -> Style {
        Style::default().fg(Self::ACCENT_RED)
    }

    pub fn link() -> Style {
        Style::default()
            .fg(Self::ACCENT_TEAL)
            .add_modifier(Modifier::UNDERLINED)
    }

    pub fn entry_active() -> Style {
        Style::default()
            .fg(Self::ACCENT_TEAL)
            .add_modifier(Modifier::BOLD)
            .bg(Self::BG_ELEVATED)
    }

    pub fn entry_normal() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    pub fn status_bar() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY).bg(Self::BG_ELEVATED)
    }

    pub fn toast() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY).bg(Self::BG_ELEVATED)
    }

    /// Bootstrap-style colour names (`primary`, `danger`, ...).
    pub fn named(name: &str) -> Color {
        match name {
            "primary" => Self::ACCENT_TEAL,
            "danger" => Self::ACCENT_RED,
            "success" => Self::ACCENT_GREEN,
            "warning" => Self::ACCENT_AMBER,
            "info" => Self::ACCENT_LAVENDER,
            "secondary" | "light" => Self::TEXT_SECONDARY,
            "dark" => Self::BG_ELEVATED,
            _ => Self::TEXT_PRIMARY,
        }
    }
}
