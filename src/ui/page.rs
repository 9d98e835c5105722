//! Paints a rendered node tree as terminal lines.
//!
//! Block tags start a new line, everything else flows inline. Form controls get
//! bracketed stand-ins; the focused control is reversed and busy ones carry a
//! spinner mark.

use crate::app::state::{AppState, FocusPanel};
use crate::tree::{Node, NodeId, Tree};
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::UnicodeWidthStr;

const BLOCK_TAGS: &[&str] = &[
    "div", "p", "h2", "h3", "h5", "form", "ul", "li", "main", "body", "thead", "tbody",
];
const PROGRESS_WIDTH: usize = 20;

pub struct Painted {
    pub lines: Vec<Line<'static>>,
    /// Line holding the focused node, if it was painted.
    pub focus_line: Option<usize>,
}

pub fn paint(state: &AppState, root: NodeId, width: u16) -> Painted {
    let mut painter = Painter {
        state,
        tree: &state.tree,
        width: width as usize,
        lines: Vec::new(),
        current: Vec::new(),
        focus_line: None,
    };
    for child in state.tree.children(root) {
        painter.walk(*child, Theme::text(), false);
    }
    painter.flush();
    Painted {
        lines: painter.lines,
        focus_line: painter.focus_line,
    }
}

struct Painter<'a> {
    state: &'a AppState,
    tree: &'a Tree,
    width: usize,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    focus_line: Option<usize>,
}

impl Painter<'_> {
    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.current)));
        }
    }

    fn push(&mut self, text: impl Into<String>, style: Style) {
        self.current.push(Span::styled(text.into(), style));
    }

    /// `inline` is set inside flex rows, where block tags stop breaking lines.
    fn walk(&mut self, id: NodeId, style: Style, inline: bool) {
        let tree = self.tree;
        let Some(node) = tree.get(id) else {
            return;
        };
        if node.is_text() {
            if let Some(text) = &node.text {
                self.push(text.clone(), style);
            }
            return;
        }

        let mut style = style;
        if node.has_class("disabled") {
            style = style.add_modifier(Modifier::DIM);
        }
        if tree.focus() == Some(id) {
            style = style.add_modifier(Modifier::REVERSED);
            self.focus_line = Some(self.lines.len());
        }

        if tree.embedded(id).is_some() {
            self.embedded(id, style);
            return;
        }

        let block = !inline && BLOCK_TAGS.contains(&node.tag.as_str());
        let row = node.has_class("d-flex") || node.has_class("row");
        if block {
            self.flush();
            if tree.focus() == Some(id) {
                self.focus_line = Some(self.lines.len());
            }
        }

        match node.tag.as_str() {
            "br" => self.flush(),
            "hr" => {
                self.flush();
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(self.width.max(1)),
                    Theme::muted(),
                )));
            }
            "input" => self.input(node, style),
            "select" => self.select(id, style),
            "textarea" => {
                let value = node.attr("value").unwrap_or_default().replace('\n', "⏎");
                self.push(format!("[{}]", value), style);
            }
            "button" if node.has_class("btn-close") => self.push("[×]", style.fg(Theme::ACCENT_RED)),
            "button" => {
                let colour = button_colour(node);
                self.push("[ ", style.fg(colour));
                self.children(id, style.fg(colour).add_modifier(Modifier::BOLD), true);
                self.push(" ]", style.fg(colour));
            }
            "a" => self.children(id, style.patch(Theme::link()), inline),
            "i" => self.push(icon_glyph(node), style),
            "svg" => self.push("[img]", style.patch(Theme::muted())),
            "h2" | "h3" | "h5" | "strong" | "b" | "th" => {
                self.children(id, style.add_modifier(Modifier::BOLD), inline)
            }
            "span" if node.has_class("badge") => {
                let colour = node
                    .classes
                    .iter()
                    .find_map(|c| c.strip_prefix("bg-"))
                    .map(Theme::named)
                    .unwrap_or(Theme::ACCENT_TEAL);
                self.push(" ", style.bg(colour));
                self.children(id, style.bg(colour).fg(Theme::BG_DARK), true);
                self.push(" ", style.bg(colour));
            }
            "table" => self.table(id, style),
            "li" if node.children.is_empty() => {}
            "div" if node.has_class("progress") => self.progress(id, style),
            "div" if node.has_class("invalid-feedback") => {
                self.children(id, style.patch(Theme::invalid()), inline)
            }
            "div" if node.has_class("modal") => {}
            _ if row => {
                for (i, child) in tree.children(id).iter().enumerate() {
                    if i > 0 {
                        self.push(" ", Style::default());
                    }
                    self.walk(*child, style, true);
                }
            }
            _ => self.children(id, style, inline),
        }

        if self.state.busy.contains(&id) {
            self.push(" ⟳", style.fg(Theme::ACCENT_AMBER));
        }
        if block {
            self.flush();
        } else if node.has_class("me-1") || node.has_class("me-2") || node.has_class("ms-2") {
            self.push(" ", Style::default());
        }
    }

    fn children(&mut self, id: NodeId, style: Style, inline: bool) {
        let tree = self.tree;
        for child in tree.children(id) {
            self.walk(*child, style, inline);
        }
    }

    fn input(&mut self, node: &Node, style: Style) {
        let style = if node.has_class("is-invalid") {
            style.patch(Theme::invalid())
        } else {
            style
        };
        match node.attr("type") {
            Some("hidden") => {}
            Some("checkbox") => {
                let mark = if node.attributes.contains_key("checked") {
                    "[x]"
                } else {
                    "[ ]"
                };
                self.push(mark, style);
            }
            Some("password") => {
                let len = node.attr("value").unwrap_or_default().chars().count();
                self.push(format!("[{}]", "*".repeat(len)), style);
            }
            _ => {
                let value = node.attr("value").unwrap_or_default();
                self.push(format!("[{}]", value), style);
            }
        }
    }

    fn select(&mut self, id: NodeId, style: Style) {
        let tree = self.tree;
        let options: Vec<&Node> = tree
            .children(id)
            .iter()
            .filter_map(|c| tree.get(*c))
            .filter(|o| o.tag == "option")
            .collect();
        let chosen = options
            .iter()
            .find(|o| o.attributes.contains_key("selected"))
            .or(options.first())
            .map(|o| text_of(tree, o))
            .unwrap_or_default();
        self.push(format!("‹{}›", chosen), style);
    }

    fn progress(&mut self, id: NodeId, style: Style) {
        let tree = self.tree;
        let percent = tree
            .children(id)
            .first()
            .and_then(|bar| tree.get(*bar))
            .and_then(|bar| bar.attr("style"))
            .and_then(parse_width)
            .unwrap_or(0.0);
        let filled = ((percent / 100.0) * PROGRESS_WIDTH as f64).round() as usize;
        let filled = filled.min(PROGRESS_WIDTH);
        self.push("█".repeat(filled), style.fg(Theme::ACCENT_TEAL));
        self.push("░".repeat(PROGRESS_WIDTH - filled), style.patch(Theme::muted()));
        self.push(format!(" {:>3}%", percent.round()), style);
    }

    fn table(&mut self, id: NodeId, style: Style) {
        self.flush();
        let tree = self.tree;
        let mut rows: Vec<(NodeId, Vec<Vec<Span<'static>>>)> = Vec::new();
        let mut row_ids = Vec::new();
        let mut focus_row = None;
        collect_rows(tree, id, &mut row_ids);

        for (index, row) in row_ids.into_iter().enumerate() {
            let mut cells = Vec::new();
            for cell in tree.children(row) {
                let mut sub = Painter {
                    state: self.state,
                    tree: self.tree,
                    width: self.width,
                    lines: Vec::new(),
                    current: Vec::new(),
                    focus_line: None,
                };
                sub.walk(*cell, style, true);
                sub.flush();
                if sub.focus_line.is_some() {
                    focus_row = Some(index);
                }
                cells.push(sub.lines.into_iter().flat_map(|l| l.spans).collect());
            }
            rows.push((row, cells));
        }

        let columns = rows.iter().map(|(_, c)| c.len()).max().unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for (_, cells) in &rows {
            for (i, cell) in cells.iter().enumerate() {
                widths[i] = widths[i].max(spans_width(cell));
            }
        }

        for (index, (row, cells)) in rows.into_iter().enumerate() {
            let focused = tree.focus() == Some(row);
            if focused || focus_row == Some(index) {
                self.focus_line = Some(self.lines.len());
            }
            let row_style = if focused {
                style.add_modifier(Modifier::REVERSED)
            } else {
                style
            };
            let mut spans = Vec::new();
            for (i, cell) in cells.into_iter().enumerate() {
                if i > 0 {
                    spans.push(Span::styled(" │ ", row_style.patch(Theme::muted())));
                }
                let pad = widths[i].saturating_sub(spans_width(&cell));
                spans.extend(cell.into_iter().map(|s| {
                    let style = if focused {
                        s.style.add_modifier(Modifier::REVERSED)
                    } else {
                        s.style
                    };
                    Span::styled(s.content, style)
                }));
                spans.push(Span::styled(" ".repeat(pad), row_style));
            }
            if self.state.busy.contains(&row) {
                spans.push(Span::styled(" ⟳", style.fg(Theme::ACCENT_AMBER)));
            }
            self.lines.push(Line::from(spans));
        }
    }

    fn embedded(&mut self, id: NodeId, style: Style) {
        let Some(widget) = self.tree.embedded(id) else {
            return;
        };
        self.flush();
        self.lines.push(Line::from(Span::styled(
            format!("┌ {}", widget.title()),
            style.patch(Theme::muted()),
        )));
        for line in widget.lines() {
            self.lines
                .push(Line::from(vec![Span::styled("│ ", Theme::muted()), Span::styled(line, style)]));
        }
        self.lines
            .push(Line::from(Span::styled("└", style.patch(Theme::muted()))));
    }
}

fn collect_rows(tree: &Tree, id: NodeId, out: &mut Vec<NodeId>) {
    for child in tree.children(id) {
        match tree.get(*child).map(|n| n.tag.as_str()) {
            Some("tr") => out.push(*child),
            Some(_) => collect_rows(tree, *child, out),
            None => {}
        }
    }
}

fn spans_width(spans: &[Span<'_>]) -> usize {
    spans.iter().map(|s| s.content.width()).sum()
}

fn text_of(tree: &Tree, node: &Node) -> String {
    node.children
        .iter()
        .filter_map(|c| tree.get(*c))
        .filter_map(|c| c.text.clone())
        .collect()
}

fn button_colour(node: &Node) -> Color {
    node.classes
        .iter()
        .filter_map(|c| c.strip_prefix("btn-"))
        .find(|c| *c != "sm")
        .map(Theme::named)
        .unwrap_or(Theme::ACCENT_TEAL)
}

/// Percentage out of a `width: N%` style.
fn parse_width(style: &str) -> Option<f64> {
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .find(|(key, _)| key.trim() == "width")
        .and_then(|(_, value)| value.trim().trim_end_matches('%').parse().ok())
}

fn icon_glyph(node: &Node) -> &'static str {
    let name = node
        .classes
        .iter()
        .find(|c| c.starts_with("bi-"))
        .map(String::as_str)
        .unwrap_or("");
    glyph(name)
}

/// Terminal stand-in for a bootstrap icon name, with or without the `bi-` prefix.
pub fn glyph(name: &str) -> &'static str {
    match name.trim_start_matches("bi-") {
        "pencil" => "✎",
        "check-lg" => "✓",
        "x-lg" => "✕",
        "three-dots-vertical" => "⋮",
        "trash" => "🗑",
        "play" | "play-fill" => "▶",
        "stop" | "stop-fill" => "■",
        "arrow-clockwise" => "↻",
        "gear" | "gear-fill" => "⚙",
        "hdd" | "hdd-fill" | "device-hdd" => "⛁",
        "terminal" | "terminal-fill" => "❯",
        "people" | "person" | "people-fill" => "☺",
        "hdd-network" | "diagram-3" => "⇄",
        _ => "•",
    }
}

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.focus == FocusPanel::Page && state.modals.is_empty();
    let (border_style, border_type, bg) = if focused {
        (
            Theme::border_focused(),
            Theme::border_type_focused(),
            Theme::panel_bg_focused(),
        )
    } else {
        (Theme::border(), Theme::border_type(), Theme::panel_bg())
    };

    let title = if state.page_title.is_empty() {
        " Page ".to_string()
    } else {
        format!(" {} ", state.page_title)
    };
    let block = Block::default()
        .title(title)
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border_style)
        .style(bg);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let painted = paint(state, state.page_root, inner.width);
    let height = inner.height as usize;
    let scroll = match painted.focus_line {
        Some(line) if height > 0 && line >= height => line + 1 - height,
        _ => 0,
    };
    let mut paragraph = Paragraph::new(painted.lines).scroll((scroll as u16, 0));
    if state.is_fading() {
        paragraph = paragraph.style(Style::default().add_modifier(Modifier::DIM));
    }
    frame.render_widget(paragraph, inner);
}
