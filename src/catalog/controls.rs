//! Form controls: buttons, fields, switches and the form container itself.

use super::{actionable, disabled, label_elements, Catalog};
use crate::protocol::widget::{
    display_value, ButtonOptions, FormLabelOptions, FormOptions, InputOptions, SelectOptions,
    SwitchOptions, TextareaOptions,
};
use crate::tree::{ContainerDescription, EventKind, Handler};

pub fn button(o: &ButtonOptions) -> ContainerDescription {
    let desc = if o.style == "link" {
        ContainerDescription::new("a")
    } else {
        let button = ContainerDescription::new("button")
            .class("btn")
            .class("btn-sm")
            .attr("type", "button");
        if o.style.is_empty() {
            button
        } else {
            button.class(format!("btn-{}", o.style))
        }
    };
    let desc = desc.children(label_elements(&o.label));
    if o.disabled {
        disabled(desc)
    } else {
        actionable(desc, &o.action, None)
    }
}

/// Field plus an optional validation message underneath.
pub fn input(o: &InputOptions) -> ContainerDescription {
    let mut field = ContainerDescription::new("input")
        .class("form-control")
        .attr("type", o.input_type.clone())
        .attr("value", display_value(&o.value))
        .attr("autocomplete", o.name.clone())
        .attr_nonempty("name", &o.name)
        .attr_nonempty("id", &o.id);
    if o.error.is_some() {
        field = field.class("is-invalid");
    }
    with_feedback(ContainerDescription::new("div").child(field), o.error.as_deref())
}

fn with_feedback(host: ContainerDescription, error: Option<&str>) -> ContainerDescription {
    match error {
        Some(text) => host.child(
            ContainerDescription::new("div")
                .class("invalid-feedback")
                .with_text(text),
        ),
        None => host,
    }
}

pub fn select(o: &SelectOptions) -> ContainerDescription {
    let options = o.options.iter().map(|(value, text)| {
        let option = ContainerDescription::new("option")
            .attr("value", value.clone())
            .with_text(text.clone());
        if *value == o.value {
            option.attr("selected", "selected")
        } else {
            option
        }
    });
    let mut desc = ContainerDescription::new("select")
        .class("form-control")
        .attr_nonempty("name", &o.name)
        .attr_nonempty("id", &o.id)
        .children(options);
    if let Some(action) = o.change_action.as_ref().filter(|a| !a.is_disabled()) {
        desc = desc.on(
            EventKind::Input,
            Handler::Dispatch {
                action: action.clone(),
                followup: None,
            },
        );
    }
    desc
}

pub fn textarea(o: &TextareaOptions) -> ContainerDescription {
    let mut field = ContainerDescription::new("textarea")
        .class("form-control")
        .attr("value", o.value.clone())
        .attr_nonempty("name", &o.name)
        .attr_nonempty("id", &o.id);
    if o.error.is_some() {
        field = field.class("is-invalid");
    }
    with_feedback(ContainerDescription::new("div").child(field), o.error.as_deref())
}

pub fn switch(o: &SwitchOptions) -> ContainerDescription {
    let mut input = ContainerDescription::new("input")
        .class("form-check-input")
        .attr("type", "checkbox")
        .attr("role", "switch")
        .attr_nonempty("name", &o.name)
        .attr_nonempty("id", &o.id);
    if o.checked {
        input = input.attr("checked", "checked");
    }
    if let Some(action) = o.action.as_ref().filter(|a| !a.is_disabled()) {
        input = input.on(
            EventKind::Input,
            Handler::Dispatch {
                action: action.clone(),
                followup: None,
            },
        );
    }
    ContainerDescription::new("div")
        .class("form-check")
        .class("form-switch")
        .child(input)
}

pub fn form_label(o: &FormLabelOptions) -> ContainerDescription {
    ContainerDescription::new("label")
        .class("form-label")
        .attr_nonempty("for", &o.target)
        .with_text(o.text.clone())
}

pub fn form(catalog: &mut Catalog<'_>, o: &FormOptions) -> ContainerDescription {
    let mut desc = ContainerDescription::new("form");
    if let Some(body) = catalog.lower(&o.elements) {
        desc = desc.child(body);
    }
    for action in catalog.lower_all(&o.actions) {
        desc = desc.child(action).child(ContainerDescription::text_leaf(" "));
    }
    desc
}
