//! One lowering per widget kind: typed options in, container description out.
//!
//! Lowering is pure apart from registering controllers for the stateful widgets
//! (dropdowns and value editors). Unknown kinds lower to nothing and are logged.

pub mod controller;
pub mod controls;
pub mod embedded;
pub mod interactive;
pub mod layout;
pub mod overlay;

use crate::protocol::{ActionDescriptor, LabelData, WidgetDescription};
use crate::tree::{ContainerDescription, EventKind, Followup, Handler};
use tracing::warn;

pub use controller::{Controller, Controllers, EditorKind, Scope};

/// Lowering context: where new controllers live.
pub struct Catalog<'a> {
    controllers: &'a mut Controllers,
    scope: Scope,
}

impl<'a> Catalog<'a> {
    pub fn new(controllers: &'a mut Controllers, scope: Scope) -> Self {
        Self { controllers, scope }
    }

    pub(crate) fn register(&mut self, controller: Controller) -> crate::tree::ControllerId {
        self.controllers.register(self.scope, controller)
    }

    pub fn lower(&mut self, widget: &WidgetDescription) -> Option<ContainerDescription> {
        let desc = match widget {
            WidgetDescription::Button(o) => controls::button(o),
            WidgetDescription::Input(o) => controls::input(o),
            WidgetDescription::Select(o) => controls::select(o),
            WidgetDescription::Textarea(o) => controls::textarea(o),
            WidgetDescription::Switch(o) => controls::switch(o),
            WidgetDescription::FormLabel(o) => controls::form_label(o),
            WidgetDescription::Form(o) => controls::form(self, o),
            WidgetDescription::Text(o) => layout::text(o),
            WidgetDescription::Header(o) => layout::header(o),
            WidgetDescription::Label(o) => layout::label(o),
            WidgetDescription::Badge(o) => layout::badge(o),
            WidgetDescription::Icon(o) => layout::icon(&o.name),
            WidgetDescription::Image(o) => layout::image(o),
            WidgetDescription::ElementList(o) => layout::element_list(self, o),
            WidgetDescription::Card(o) => layout::card(self, o),
            WidgetDescription::Table(o) => layout::table(self, o),
            WidgetDescription::TableView(o) => layout::table_view(o),
            WidgetDescription::Line(o) => layout::line(self, o),
            WidgetDescription::Progress(o) => layout::progress(o),
            WidgetDescription::Updated(o) => layout::updated(self, o),
            WidgetDescription::Dropdown(o) => interactive::dropdown(self, o),
            WidgetDescription::InputEdit(o) => {
                interactive::value_editor(self, EditorKind::Input(o.clone()))
            }
            WidgetDescription::TextareaEdit(o) => {
                interactive::value_editor(self, EditorKind::Textarea(o.clone()))
            }
            WidgetDescription::SelectEdit(o) => {
                interactive::value_editor(self, EditorKind::Select(o.clone()))
            }
            WidgetDescription::TagsEdit(o) => {
                interactive::value_editor(self, EditorKind::Tags(o.clone()))
            }
            WidgetDescription::Terminal => embedded::terminal(),
            WidgetDescription::CodeEditor(o) => embedded::code_editor(o),
            WidgetDescription::Unknown { kind, reason } => {
                match reason {
                    Some(reason) => warn!("Skipping {} widget with bad options: {}", kind, reason),
                    None => warn!("Skipping unknown widget kind {:?}", kind),
                }
                return None;
            }
        };
        Some(desc)
    }

    /// Lowers each widget, skipping the ones that lower to nothing.
    pub fn lower_all<'w>(
        &mut self,
        widgets: impl IntoIterator<Item = &'w WidgetDescription>,
    ) -> Vec<ContainerDescription> {
        widgets.into_iter().filter_map(|w| self.lower(w)).collect()
    }
}

/// Icon, count badge and (optionally bold) text of a label.
pub fn label_elements(label: &LabelData) -> Vec<ContainerDescription> {
    let mut out = Vec::new();
    if !label.icon.is_empty() {
        out.push(layout::named_icon(&label.icon).class("me-1"));
    }
    if label.num != 0 {
        out.push(
            ContainerDescription::new("span")
                .class("badge")
                .class("bg-secondary")
                .class("me-1")
                .with_text(label.num.to_string()),
        );
    }
    if !label.text.is_empty() {
        if label.strong {
            out.push(ContainerDescription::new("strong").with_text(label.text.clone()));
        } else {
            out.push(ContainerDescription::text_leaf(label.text.clone()));
        }
    }
    out
}

/// Wires a click dispatch onto `desc`, or marks it disabled when the command is empty.
pub fn actionable(
    desc: ContainerDescription,
    action: &ActionDescriptor,
    followup: Option<Followup>,
) -> ContainerDescription {
    if action.is_disabled() {
        disabled(desc)
    } else {
        desc.on(
            EventKind::Click,
            Handler::Dispatch {
                action: action.clone(),
                followup,
            },
        )
    }
}

pub fn disabled(desc: ContainerDescription) -> ContainerDescription {
    desc.class("disabled").attr("aria-disabled", "true")
}
