//! Widgets that change shape after rendering: dropdown menus and value editors.
//!
//! The rendered nodes only carry handlers naming a controller; the app layer
//! looks the controller up and re-renders through the builders below.

use super::controller::{EditorController, EditorKind, MenuController};
use super::{actionable, label_elements, layout, Catalog, Controller};
use crate::protocol::widget::{DropdownItem, DropdownOptions};
use crate::protocol::{ActionDescriptor, LIST_FIELD_PREFIX};
use crate::tree::{ContainerDescription, ControllerId, EventKind, Followup, Handler};

pub fn dropdown(catalog: &mut Catalog<'_>, o: &DropdownOptions) -> ContainerDescription {
    let id = catalog.register(Controller::Menu(MenuController {
        items: o.items.clone(),
        menu: None,
    }));
    let toggle = ContainerDescription::new("a")
        .class("dropdown-toggle")
        .on(EventKind::Click, Handler::ToggleMenu(id))
        .on(EventKind::Blur, Handler::CloseMenu(id))
        .child(layout::icon("bi-three-dots-vertical"));
    ContainerDescription::new("div").class("dropdown").child(toggle)
}

/// The open menu of a dropdown, rendered next to its toggle.
pub fn menu(id: ControllerId, items: &[Option<DropdownItem>]) -> ContainerDescription {
    let entries = items.iter().map(|item| match item {
        None => ContainerDescription::new("li")
            .child(ContainerDescription::new("hr").class("dropdown-divider")),
        Some(item) => {
            let mut link = ContainerDescription::new("a")
                .class("dropdown-item")
                .on(EventKind::Press, Handler::RetainFocus)
                .children(label_elements(&item.label));
            if item.danger {
                link = link.class("dropdown-item-danger");
            }
            let link = actionable(link, &item.action, Some(Followup::CloseMenu(id)));
            ContainerDescription::new("li").child(link)
        }
    });
    ContainerDescription::new("ul")
        .class("dropdown-menu")
        .class("show")
        .children(entries)
}

pub fn value_editor(catalog: &mut Catalog<'_>, kind: EditorKind) -> ContainerDescription {
    let id = catalog.register(Controller::Editor(EditorController {
        kind: kind.clone(),
        editing: false,
    }));
    ContainerDescription::new("form")
        .class("d-flex")
        .class("value-editor")
        .child(editor_display(id, &kind))
}

fn action_of(kind: &EditorKind) -> &ActionDescriptor {
    match kind {
        EditorKind::Input(o) | EditorKind::Textarea(o) => &o.action,
        EditorKind::Select(o) => &o.action,
        EditorKind::Tags(o) => &o.action,
    }
}

/// Read-only view with a pencil that switches to edit mode.
pub fn editor_display(id: ControllerId, kind: &EditorKind) -> ContainerDescription {
    let value = match kind {
        EditorKind::Input(o) | EditorKind::Textarea(o) => {
            ContainerDescription::new("span").with_text(o.value.clone())
        }
        EditorKind::Select(o) => {
            let shown = o.options.get(&o.value).unwrap_or(&o.value);
            ContainerDescription::new("span")
                .class("badge")
                .class(format!("bg-{}", o.badge_style))
                .with_text(shown.clone())
        }
        EditorKind::Tags(o) => ContainerDescription::new("span").children(
            o.value
                .iter()
                .flatten()
                .map(|t| tag(t, &o.name, false)),
        ),
    };
    let pencil = ContainerDescription::new("a")
        .class("edit")
        .on(EventKind::Click, Handler::BeginEdit(id))
        .child(layout::icon("bi-pencil").class("ms-2"));
    ContainerDescription::new("div").child(value).child(pencil)
}

fn focus_on_mount(desc: ContainerDescription) -> ContainerDescription {
    desc.on_mount(|tree, node| tree.set_focus(Some(node)))
}

fn edit_handlers(desc: ContainerDescription, id: ControllerId, action: &ActionDescriptor) -> ContainerDescription {
    let desc = desc.on(EventKind::Blur, Handler::EndEdit(id));
    if action.is_disabled() {
        desc
    } else {
        desc.on(EventKind::KeyPress, Handler::SubmitOnCtrlEnter(action.clone()))
    }
}

/// Edit mode: the field itself followed by a confirm link.
pub fn editor_input(id: ControllerId, kind: &EditorKind) -> Vec<ContainerDescription> {
    let action = action_of(kind);
    let field = match kind {
        EditorKind::Input(o) => ContainerDescription::new("input")
            .class("form-control")
            .class("form-control-sm")
            .attr("type", "text")
            .attr("name", o.name.clone())
            .attr("value", o.value.clone()),
        EditorKind::Textarea(o) => ContainerDescription::new("textarea")
            .class("form-control")
            .attr("name", o.name.clone())
            .attr("value", o.value.clone()),
        EditorKind::Select(o) => ContainerDescription::new("select")
            .class("form-control")
            .class("form-control-sm")
            .attr("name", o.name.clone())
            .children(o.options.iter().map(|(value, text)| {
                let option = ContainerDescription::new("option")
                    .attr("value", value.clone())
                    .with_text(text.clone());
                if *value == o.value {
                    option.attr("selected", "selected")
                } else {
                    option
                }
            })),
        EditorKind::Tags(o) => {
            let entry = ContainerDescription::new("input")
                .class("tag-entry")
                .attr("type", "text")
                .attr("value", "")
                .attr("name", format!("{LIST_FIELD_PREFIX}{}", o.name));
            let entry = edit_handlers(entry, id, action).on(
                EventKind::KeyPress,
                Handler::AppendTag {
                    name: o.name.clone(),
                },
            );
            let host = ContainerDescription::new("div")
                .class("tags-editor")
                .class("form-control")
                .children(o.value.iter().flatten().map(|t| tag(t, &o.name, true)))
                .child(focus_on_mount(entry));
            return vec![host, confirm(action)];
        }
    };
    vec![focus_on_mount(edit_handlers(field, id, action)), confirm(action)]
}

fn confirm(action: &ActionDescriptor) -> ContainerDescription {
    let link = ContainerDescription::new("a")
        .class("ms-2")
        .on(EventKind::Press, Handler::RetainFocus)
        .child(layout::icon("bi-check-lg"));
    actionable(link, action, None)
}

/// One tag badge. Editable tags carry a remove icon and a hidden list field.
pub fn tag(text: &str, name: &str, editable: bool) -> ContainerDescription {
    let badge = ContainerDescription::new("span")
        .class("badge")
        .class("bg-primary")
        .class("me-1")
        .child(ContainerDescription::text_leaf(text));
    if !editable {
        return badge;
    }
    badge
        .child(
            layout::icon("bi-x-lg")
                .class("ms-1")
                .on(EventKind::Press, Handler::RetainFocus)
                .on(EventKind::Click, Handler::RemoveTag),
        )
        .child(
            ContainerDescription::new("input")
                .attr("type", "hidden")
                .attr("name", format!("{LIST_FIELD_PREFIX}{name}"))
                .attr("value", text),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Controllers, Scope};
    use crate::protocol::widget::{TagsEditOptions, ValueEditOptions};

    #[test]
    fn test_dropdown_registers_closed_menu() {
        let mut controllers = Controllers::new();
        let desc = Catalog::new(&mut controllers, Scope::Page).lower(
            &serde_json::from_value(serde_json::json!({
                "type": "dropdown",
                "options": {"items": [{"text": "Edit", "cmd": "edit"}]}
            }))
            .unwrap(),
        );
        let toggle = &desc.unwrap().children[0];
        let Handler::ToggleMenu(id) = toggle.handlers[0].1 else {
            panic!("expected toggle");
        };
        assert!(!controllers.menu_mut(id).unwrap().is_open());
    }

    #[test]
    fn test_menu_items_close_after_dispatch() {
        let items = vec![
            Some(DropdownItem {
                action: ActionDescriptor::new("edit", vec![]),
                ..Default::default()
            }),
            None,
            Some(DropdownItem::default()),
        ];
        let desc = menu(ControllerId(1), &items);
        let first = &desc.children[0].children[0];
        assert!(first.handlers.contains(&(
            EventKind::Click,
            Handler::Dispatch {
                action: ActionDescriptor::new("edit", vec![]),
                followup: Some(Followup::CloseMenu(ControllerId(1))),
            }
        )));
        assert_eq!(desc.children[1].children[0].tag, "hr");
        assert!(desc.children[2].children[0].has_class("disabled"));
    }

    #[test]
    fn test_editor_input_binds_blur_and_submit() {
        let kind = EditorKind::Input(ValueEditOptions {
            name: "hostname".into(),
            value: "box".into(),
            action: ActionDescriptor::new("rename", vec![]),
        });
        let parts = editor_input(ControllerId(7), &kind);
        assert_eq!(parts.len(), 2);
        let field = &parts[0];
        assert_eq!(field.attributes["value"], "box");
        assert!(field.mount.is_some());
        assert!(field
            .handlers
            .contains(&(EventKind::Blur, Handler::EndEdit(ControllerId(7)))));
        assert!(parts[1]
            .handlers
            .contains(&(EventKind::Press, Handler::RetainFocus)));
    }

    #[test]
    fn test_tags_editor_fields_are_list_named() {
        let kind = EditorKind::Tags(TagsEditOptions {
            name: "dns".into(),
            value: Some(vec!["1.1.1.1".into()]),
            action: ActionDescriptor::new("set-dns", vec![]),
        });
        let parts = editor_input(ControllerId(2), &kind);
        let hidden = parts[0]
            .find(&|d| d.attributes.get("type").map(String::as_str) == Some("hidden"))
            .unwrap();
        assert_eq!(hidden.attributes["name"], "[]dns");
        assert_eq!(hidden.attributes["value"], "1.1.1.1");
        let entry = parts[0].find(&|d| d.has_class("tag-entry")).unwrap();
        assert_eq!(entry.attributes["name"], "[]dns");
    }
}
