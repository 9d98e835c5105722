//! Collecting field values from the form that owns a control.

use crate::protocol::{FieldValue, FormData, LIST_FIELD_PREFIX};
use crate::tree::{Node, NodeId, Tree};

const FIELD_TAGS: [&str; 3] = ["input", "select", "textarea"];

/// Field data of the form owning `origin`; `None` when `origin` has no form.
///
/// Fields are visited in document order. `[]name` fields accumulate into a list
/// (empty values are skipped but the key is still created), checkboxes become
/// booleans and number fields are parsed as integers.
pub fn extract(tree: &Tree, origin: NodeId) -> Option<FormData> {
    let form = tree.get(origin)?.owner.form?;
    let mut data = FormData::new();

    for id in tree.descendants(form) {
        let Some(node) = tree.get(id) else { continue };
        if !FIELD_TAGS.contains(&node.tag.as_str()) {
            continue;
        }
        let Some(name) = node.attr("name").filter(|n| !n.is_empty()) else {
            continue;
        };
        let value = field_value(tree, node);

        if let Some(base) = name.strip_prefix(LIST_FIELD_PREFIX) {
            let entry = data
                .entry(base.to_string())
                .or_insert_with(|| FieldValue::List(Vec::new()));
            if !matches!(entry, FieldValue::List(_)) {
                *entry = FieldValue::List(Vec::new());
            }
            if let FieldValue::List(items) = entry {
                if !value.is_empty() {
                    items.push(value);
                }
            }
            continue;
        }

        let field = match node.attr("type") {
            Some("checkbox") => FieldValue::Flag(node.attributes.contains_key("checked")),
            Some("number") => FieldValue::Number(parse_int(&value)),
            _ => FieldValue::Text(value),
        };
        data.insert(name.to_string(), field);
    }
    Some(data)
}

/// Current value of a field: the selected option for selects (first option when
/// none is flagged), the `value` attribute otherwise.
pub fn field_value(tree: &Tree, node: &Node) -> String {
    if node.tag == "select" {
        let options: Vec<&Node> = node
            .children
            .iter()
            .filter_map(|c| tree.get(*c))
            .filter(|n| n.tag == "option")
            .collect();
        return options
            .iter()
            .find(|o| o.attributes.contains_key("selected"))
            .or(options.first())
            .and_then(|o| o.attr("value"))
            .unwrap_or_default()
            .to_string();
    }
    node.attr("value").unwrap_or_default().to_string()
}

/// Leading integer of `text`: optional whitespace, optional sign, digits.
pub fn parse_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i64>().ok().map(|n| sign * n)
}
