use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct AppLayout {
    pub sidebar: Rect,
    pub page: Rect,
    pub status_bar: Rect,
}

pub fn compute_layout(area: Rect) -> AppLayout {
    // Main vertical split: content | status bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    // Horizontal: module sidebar | gap | page
    let h_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .spacing(1)
        .constraints([
            Constraint::Length(26), // Sidebar
            Constraint::Min(30),    // Page
        ])
        .split(main_chunks[0]);

    AppLayout {
        sidebar: h_chunks[0],
        page: h_chunks[1],
        status_bar: main_chunks[1],
    }
}

/// A rectangle of `percent_x` by `percent_y` of `area`, centered, at least `min` cells.
pub fn centered(area: Rect, percent_x: u16, percent_y: u16, min: (u16, u16)) -> Rect {
    let w = (area.width * percent_x / 100)
        .max(min.0)
        .min(area.width.saturating_sub(2));
    let h = (area.height * percent_y / 100)
        .max(min.1)
        .min(area.height.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(w) / 2;
    let y = area.y + area.height.saturating_sub(h) / 2;
    Rect::new(x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_splits_sidebar_and_status() {
        let layout = compute_layout(Rect::new(0, 0, 100, 30));
        assert_eq!(layout.sidebar.width, 26);
        assert_eq!(layout.status_bar.height, 1);
        assert_eq!(layout.status_bar.y, 29);
        assert!(layout.page.x > layout.sidebar.right());
    }

    #[test]
    fn test_centered_stays_inside() {
        let area = Rect::new(0, 0, 40, 10);
        let popup = centered(area, 50, 50, (60, 20));
        assert!(popup.width <= 38 && popup.height <= 8);
        assert!(popup.right() <= area.right());
    }
}
