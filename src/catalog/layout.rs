//! Static and structural widgets.

use super::{controls, label_elements, Catalog};
use crate::protocol::widget::{
    BadgeOptions, ButtonOptions, CardOptions, ElementListOptions, ImageOptions, LabelOptions,
    LineOptions, ProgressOptions, TableOptions, TableViewColumn, TableViewOptions, TextOptions,
    UpdatedOptions,
};
use crate::protocol::{ActionDescriptor, LabelData};
use crate::tree::{ContainerDescription, EventKind, Handler};
use tracing::warn;

pub fn text(o: &TextOptions) -> ContainerDescription {
    ContainerDescription::new("p").with_text(o.text.clone())
}

pub fn header(o: &TextOptions) -> ContainerDescription {
    ContainerDescription::new("h3").with_text(o.text.clone())
}

pub fn label(o: &LabelOptions) -> ContainerDescription {
    let desc = ContainerDescription::new("span").children(label_elements(&o.label));
    if o.monospace {
        desc.class("font-monospace")
    } else {
        desc
    }
}

pub fn badge(o: &BadgeOptions) -> ContainerDescription {
    ContainerDescription::new("span")
        .class("badge")
        .class(format!("bg-{}", o.style))
        .with_text(o.text.clone())
}

pub fn icon(name: &str) -> ContainerDescription {
    ContainerDescription::new("i").class("bi").class(name.to_string())
}

/// Icon from a bare name such as `pencil`, as sent in labels and table cells.
pub fn named_icon(name: &str) -> ContainerDescription {
    if name.starts_with("bi-") {
        icon(name)
    } else {
        icon(&format!("bi-{}", name))
    }
}

pub fn image(o: &ImageOptions) -> ContainerDescription {
    ContainerDescription::new("svg")
        .attr("width", o.width.to_string())
        .attr("height", o.height.to_string())
        .attr("use", format!("{}#{}", o.svg, o.name))
        .attr("alt", o.name.clone())
}

pub fn element_list(catalog: &mut Catalog<'_>, o: &ElementListOptions) -> ContainerDescription {
    let line_mode = o.mode == "line";
    let mut list = ContainerDescription::new("div");
    for entry in &o.elements {
        let Some(item) = catalog.lower(&entry.item) else {
            continue;
        };
        let title = entry.title.as_ref().and_then(|t| catalog.lower(t));
        let row = if line_mode {
            let head = ContainerDescription::new("div")
                .class("col-4")
                .children(title);
            ContainerDescription::new("div")
                .class("row")
                .class("mb-2")
                .child(head)
                .child(ContainerDescription::new("div").class("col-8").child(item))
        } else {
            ContainerDescription::new("div")
                .class("mb-3")
                .children(title)
                .child(item)
        };
        list = list.child(row);
    }
    list
}

pub fn card(catalog: &mut Catalog<'_>, o: &CardOptions) -> ContainerDescription {
    let title = o.header.clone().unwrap_or_default();
    let mut head = ContainerDescription::new("div")
        .class("card-header")
        .class("d-flex")
        .class("flex-row")
        .child(
            ContainerDescription::new("div")
                .class("me-auto")
                .children(label_elements(&title)),
        );
    if let Some(extra) = o.additional.as_deref().and_then(|a| catalog.lower(a)) {
        head = head.child(extra);
    }
    let body = ContainerDescription::new("div")
        .class("card-body")
        .children(catalog.lower(&o.body));
    ContainerDescription::new("div")
        .class("card")
        .class("shadow-sm")
        .class("mb-3")
        .child(head)
        .child(body)
}

pub fn table(catalog: &mut Catalog<'_>, o: &TableOptions) -> ContainerDescription {
    let head = ContainerDescription::new("tr").children(
        o.header
            .iter()
            .map(|h| ContainerDescription::new("th").with_text(h.clone())),
    );
    let mut body = ContainerDescription::new("tbody");
    for row in o.body.iter().flatten() {
        let cells = row.iter().map(|cell| {
            ContainerDescription::new("td").children(catalog.lower(cell))
        });
        let cells: Vec<_> = cells.collect();
        body = body.child(ContainerDescription::new("tr").children(cells));
    }
    ContainerDescription::new("table")
        .class("table")
        .class("table-hover")
        .child(ContainerDescription::new("thead").child(head))
        .child(body)
}

fn cell<'a>(row: &'a [String], column: &TableViewColumn, slot: usize) -> &'a str {
    column
        .items
        .get(slot)
        .and_then(|i| row.get(*i))
        .map(String::as_str)
        .unwrap_or("")
}

fn table_view_cell(row: &[String], column: &TableViewColumn) -> ContainerDescription {
    let td = ContainerDescription::new("td");
    match column.kind.as_str() {
        "text" | "" => td.with_text(cell(row, column, 0).to_string()),
        "icon" => td.child(named_icon(cell(row, column, 0))),
        "button" => {
            let args = column
                .items
                .iter()
                .skip(3)
                .filter_map(|i| row.get(*i).cloned())
                .collect();
            let button = controls::button(&ButtonOptions {
                label: LabelData {
                    text: cell(row, column, 0).to_string(),
                    ..Default::default()
                },
                style: cell(row, column, 1).to_string(),
                action: ActionDescriptor::new(cell(row, column, 2), args),
                disabled: false,
            });
            td.child(button)
        }
        other => {
            warn!("Unknown table-view column type {:?}", other);
            td
        }
    }
}

/// A table of plain string rows whose columns choose how to show them.
pub fn table_view(o: &TableViewOptions) -> ContainerDescription {
    let head = ContainerDescription::new("tr").children(o.header.iter().map(|c| {
        let th = ContainerDescription::new("th").with_text(c.title.clone());
        if !c.width.is_empty() {
            th.attr("width", c.width.clone())
        } else {
            th
        }
    }));
    let select = o.select_action.as_ref().filter(|a| !a.is_disabled());
    let mut body = ContainerDescription::new("tbody");
    for row in o.body.iter().flatten() {
        let mut tr = ContainerDescription::new("tr")
            .children(o.header.iter().map(|c| table_view_cell(row, c)));
        if let Some(action) = select {
            let mut args = action.args.clone();
            args.push(row.get(o.data_item).cloned().unwrap_or_default());
            tr = tr.class("selectable").on(
                EventKind::Click,
                Handler::Dispatch {
                    action: ActionDescriptor::new(action.cmd.clone(), args),
                    followup: None,
                },
            );
        }
        body = body.child(tr);
    }
    ContainerDescription::new("table")
        .class("table")
        .class("table-hover")
        .class("table-view")
        .child(ContainerDescription::new("thead").child(head))
        .child(body)
}

pub fn line(catalog: &mut Catalog<'_>, o: &LineOptions) -> ContainerDescription {
    let mut desc = ContainerDescription::new("div").class("d-flex");
    for (element, flex) in o.children() {
        let Some(child) = catalog.lower(element) else {
            continue;
        };
        let mut slot = ContainerDescription::new("div").class("me-2").child(child);
        if let Some(flex) = flex {
            slot = slot.attr("style", format!("flex: {flex}"));
        }
        desc = desc.child(slot);
    }
    desc
}

/// Fill percentage of a progress value relative to `max`, clamped to 0..=100.
pub fn fill_percent(value: f64, max: f64) -> f64 {
    let pct = if max > 0.0 { value * 100.0 / max } else { value };
    if pct.is_nan() {
        0.0
    } else {
        pct.clamp(0.0, 100.0)
    }
}

pub fn progress(o: &ProgressOptions) -> ContainerDescription {
    let pct = fill_percent(o.value, o.max);
    ContainerDescription::new("div")
        .class("progress")
        .attr_nonempty("id", &o.id)
        .child(
            ContainerDescription::new("div")
                .class("progress-bar")
                .attr("role", "progressbar")
                .attr("style", format!("width: {}%", pct.round())),
        )
}

pub fn updated(catalog: &mut Catalog<'_>, o: &UpdatedOptions) -> ContainerDescription {
    ContainerDescription::new("div")
        .class("updatable")
        .attr_nonempty("id", &o.id)
        .children(catalog.lower(&o.element))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Controllers, Scope};
    use crate::protocol::WidgetDescription;
    use serde_json::json;

    fn lower(v: serde_json::Value) -> ContainerDescription {
        let widget: WidgetDescription = serde_json::from_value(v).unwrap();
        let mut controllers = Controllers::new();
        Catalog::new(&mut controllers, Scope::Page)
            .lower(&widget)
            .unwrap()
    }

    #[test]
    fn test_table_view_row_dispatches_data_item() {
        let desc = lower(json!({"type": "table-view", "options": {
            "header": [
                {"type": "text", "title": "Name", "items": [1]},
                {"type": "button", "title": "", "items": [2, 3, 4, 0]}
            ],
            "body": [["42", "web", "Stop", "danger", "stop"]],
            "select-action": {"cmd": "open", "args": ["svc"]},
            "data-item": 0
        }}));
        let row = desc
            .find(&|d| d.tag == "tr" && d.has_class("selectable"))
            .unwrap();
        match &row.handlers[0].1 {
            Handler::Dispatch { action, .. } => {
                assert_eq!(action.cmd, "open");
                assert_eq!(action.args, vec!["svc", "42"]);
            }
            other => panic!("unexpected handler {other:?}"),
        }
        assert_eq!(row.children[0].text.as_deref(), Some("web"));
        let button = row.find(&|d| d.tag == "button").unwrap();
        assert!(button.has_class("btn-danger"));
        match &button.handlers[0].1 {
            Handler::Dispatch { action, .. } => {
                assert_eq!(action.cmd, "stop");
                assert_eq!(action.args, vec!["42"]);
            }
            other => panic!("unexpected handler {other:?}"),
        }
    }

    #[test]
    fn test_table_view_accepts_string_widths() {
        let desc = lower(json!({"type": "table-view", "options": {
            "header": [
                {"type": "text", "title": "Name", "items": [0], "proportion": 0, "width": ""},
                {"type": "text", "title": "State", "items": [1], "proportion": 0, "width": "20%"}
            ],
            "body": [["web", "running"]],
            "select-action": null,
            "data-item": 0
        }}));
        assert!(desc.has_class("table-view"));
        let name = desc.find(&|d| d.tag == "th" && d.text.as_deref() == Some("Name")).unwrap();
        assert!(!name.attributes.contains_key("width"));
        let state = desc.find(&|d| d.tag == "th" && d.text.as_deref() == Some("State")).unwrap();
        assert_eq!(state.attributes["width"], "20%");
        assert!(desc.find(&|d| d.has_class("selectable")).is_none());
        assert!(desc.find(&|d| d.text.as_deref() == Some("running")).is_some());
    }

    #[test]
    fn test_progress_initial_fill() {
        let desc = lower(json!({"type": "progress", "options": {"id": "job", "value": 5, "max": 20}}));
        assert_eq!(desc.attributes["id"], "job");
        assert_eq!(desc.children[0].attributes["style"], "width: 25%");
    }

    #[test]
    fn test_fill_percent_clamps() {
        assert_eq!(fill_percent(150.0, 100.0), 100.0);
        assert_eq!(fill_percent(-3.0, 100.0), 0.0);
        assert_eq!(fill_percent(40.0, 0.0), 40.0);
    }

    #[test]
    fn test_card_with_additional() {
        let desc = lower(json!({"type": "card", "options": {
            "header": {"text": "Disks"},
            "additional": {"type": "badge", "options": {"text": "3", "style": "info"}},
            "body": {"type": "text", "options": {"text": "sda"}}
        }}));
        let head = &desc.children[0];
        assert_eq!(head.children.len(), 2);
        assert!(desc.children[1].has_class("card-body"));
    }

    #[test]
    fn test_element_list_line_mode() {
        let desc = lower(json!({"type": "element-list", "options": {
            "mode": "line",
            "elements": [{"title": {"type": "text", "options": {"text": "Host"}},
                          "item": {"type": "label", "options": {"text": "box"}}}]
        }}));
        let row = &desc.children[0];
        assert!(row.has_class("row"));
        assert!(row.children[0].has_class("col-4"));
        assert!(row.children[1].has_class("col-8"));
    }
}
