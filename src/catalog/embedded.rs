//! Opaque widgets mounted by reference: a terminal and a code editor.

use crate::protocol::widget::CodeEditorOptions;
use crate::tree::{ContainerDescription, EmbeddedWidget, NodeId};

const PROMPT: &str = "$ ";

#[derive(Debug, Default)]
pub struct TerminalView {
    lines: Vec<String>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self {
            lines: vec![PROMPT.to_string()],
        }
    }
}

impl EmbeddedWidget for TerminalView {
    fn title(&self) -> &str {
        "terminal"
    }

    fn lines(&self) -> Vec<String> {
        self.lines.clone()
    }

    fn insert_char(&mut self, c: char) {
        if let Some(last) = self.lines.last_mut() {
            last.push(c);
        }
    }

    fn newline(&mut self) {
        self.lines.push(PROMPT.to_string());
    }

    fn backspace(&mut self) {
        if let Some(last) = self.lines.last_mut() {
            if last.len() > PROMPT.len() {
                last.pop();
            }
        }
    }
}

/// Editor whose text is mirrored into a hidden form field.
#[derive(Debug)]
pub struct CodeEditorView {
    buffer: String,
    field: NodeId,
}

impl CodeEditorView {
    pub fn new(buffer: String, field: NodeId) -> Self {
        Self { buffer, field }
    }
}

impl EmbeddedWidget for CodeEditorView {
    fn title(&self) -> &str {
        "editor"
    }

    fn lines(&self) -> Vec<String> {
        if self.buffer.is_empty() {
            return vec![String::new()];
        }
        self.buffer.split('\n').map(str::to_string).collect()
    }

    fn insert_char(&mut self, c: char) {
        self.buffer.push(c);
    }

    fn newline(&mut self) {
        self.buffer.push('\n');
    }

    fn backspace(&mut self) {
        self.buffer.pop();
    }

    fn mirror(&self) -> Option<(NodeId, String)> {
        Some((self.field, self.buffer.clone()))
    }
}

pub fn terminal() -> ContainerDescription {
    ContainerDescription::new("div")
        .attr("id", "terminal")
        .class("embedded")
        .on_mount(|tree, node| tree.embed(node, Box::new(TerminalView::new())))
}

pub fn code_editor(o: &CodeEditorOptions) -> ContainerDescription {
    let field = ContainerDescription::new("input")
        .attr("type", "hidden")
        .attr("name", o.name.clone())
        .attr("value", o.value.clone());
    let editor = ContainerDescription::new("div")
        .class("form-control")
        .class("embedded")
        .attr_nonempty("id", &o.id);
    let initial = o.value.clone();
    ContainerDescription::new("div")
        .class("code-editor")
        .child(field)
        .child(editor)
        .on_mount(move |tree, node| {
            let children = tree.children(node).to_vec();
            if let [field, editor] = children[..] {
                tree.embed(editor, Box::new(CodeEditorView::new(initial, field)));
            }
        })
}
