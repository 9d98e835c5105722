//! Widget descriptions: `{"type": <kind>, "options": {...}}`.
//!
//! Decoding never fails as a whole. An unknown `type`, or options that do not fit
//! the kind's shape, decode to [`WidgetDescription::Unknown`] so that the rest of
//! the page still renders.

use super::{ActionDescriptor, LabelData};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
struct RawWidget {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    options: Value,
}

/// One node of server-described UI. The set of kinds is closed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawWidget")]
pub enum WidgetDescription {
    Button(ButtonOptions),
    Text(TextOptions),
    Label(LabelOptions),
    FormLabel(FormLabelOptions),
    Header(TextOptions),
    Input(InputOptions),
    Select(SelectOptions),
    Textarea(TextareaOptions),
    Switch(SwitchOptions),
    ElementList(ElementListOptions),
    Form(FormOptions),
    Table(TableOptions),
    TableView(TableViewOptions),
    Badge(BadgeOptions),
    Image(ImageOptions),
    Icon(IconOptions),
    Card(CardOptions),
    Dropdown(DropdownOptions),
    InputEdit(ValueEditOptions),
    TextareaEdit(ValueEditOptions),
    SelectEdit(SelectEditOptions),
    TagsEdit(TagsEditOptions),
    Line(LineOptions),
    Progress(ProgressOptions),
    Updated(UpdatedOptions),
    Terminal,
    CodeEditor(CodeEditorOptions),
    /// Unknown kind (`reason` is `None`) or options that failed to decode.
    Unknown {
        kind: String,
        reason: Option<String>,
    },
}

impl WidgetDescription {
    /// Wire name of the kind.
    pub fn kind(&self) -> &str {
        match self {
            Self::Button(_) => "button",
            Self::Text(_) => "text",
            Self::Label(_) => "label",
            Self::FormLabel(_) => "form-label",
            Self::Header(_) => "header",
            Self::Input(_) => "input",
            Self::Select(_) => "select",
            Self::Textarea(_) => "textarea",
            Self::Switch(_) => "switch",
            Self::ElementList(_) => "element-list",
            Self::Form(_) => "form",
            Self::Table(_) => "table",
            Self::TableView(_) => "table-view",
            Self::Badge(_) => "badge",
            Self::Image(_) => "image",
            Self::Icon(_) => "icon",
            Self::Card(_) => "card",
            Self::Dropdown(_) => "dropdown",
            Self::InputEdit(_) => "input-edit",
            Self::TextareaEdit(_) => "textarea-edit",
            Self::SelectEdit(_) => "select-edit",
            Self::TagsEdit(_) => "tags-edit",
            Self::Line(_) => "line",
            Self::Progress(_) => "progress",
            Self::Updated(_) => "updated-element",
            Self::Terminal => "terminal",
            Self::CodeEditor(_) => "codeEditor",
            Self::Unknown { kind, .. } => kind,
        }
    }
}

fn decode<T: DeserializeOwned>(options: Value) -> Result<T, serde_json::Error> {
    serde_json::from_value(options)
}

impl From<RawWidget> for WidgetDescription {
    fn from(raw: RawWidget) -> Self {
        let RawWidget { kind, options } = raw;
        // `options` may be omitted entirely for kinds whose fields all default
        let options = if options.is_null() {
            Value::Object(Default::default())
        } else {
            options
        };

        let decoded = match kind.as_str() {
            "button" => decode(options).map(Self::Button),
            "text" => decode(options).map(Self::Text),
            "label" => decode(options).map(Self::Label),
            "form-label" => decode(options).map(Self::FormLabel),
            "header" => decode(options).map(Self::Header),
            "input" => decode(options).map(Self::Input),
            "select" => decode(options).map(Self::Select),
            "textarea" => decode(options).map(Self::Textarea),
            "switch" => decode(options).map(Self::Switch),
            "element-list" => decode(options).map(Self::ElementList),
            "form" => decode(options).map(Self::Form),
            "table" => decode(options).map(Self::Table),
            "table-view" => decode(options).map(Self::TableView),
            "badge" => decode(options).map(Self::Badge),
            "image" => decode(options).map(Self::Image),
            "icon" => decode(options).map(Self::Icon),
            "card" => decode(options).map(Self::Card),
            "dropdown" => decode(options).map(Self::Dropdown),
            "input-edit" => decode(options).map(Self::InputEdit),
            "textarea-edit" => decode(options).map(Self::TextareaEdit),
            "select-edit" => decode(options).map(Self::SelectEdit),
            "tags-edit" => decode(options).map(Self::TagsEdit),
            "line" => decode(options).map(Self::Line),
            "progress" => decode(options).map(Self::Progress),
            "updated-element" => decode(options).map(Self::Updated),
            "terminal" => Ok(Self::Terminal),
            "codeEditor" => decode(options).map(Self::CodeEditor),
            _ => {
                return Self::Unknown {
                    kind: kind.clone(),
                    reason: None,
                }
            }
        };

        decoded.unwrap_or_else(|e| Self::Unknown {
            kind,
            reason: Some(e.to_string()),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ButtonOptions {
    #[serde(flatten)]
    pub label: LabelData,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub action: ActionDescriptor,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TextOptions {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LabelOptions {
    #[serde(flatten)]
    pub label: LabelData,
    #[serde(default)]
    pub monospace: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FormLabelOptions {
    #[serde(default)]
    pub text: String,
    #[serde(rename = "for", default)]
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InputOptions {
    #[serde(rename = "type", default = "default_input_type")]
    pub input_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub error: Option<String>,
}

fn default_input_type() -> String {
    "text".to_string()
}

/// Renders a loosely typed JSON value the way a text field would show it.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SelectOptions {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
    #[serde(rename = "change-action", default)]
    pub change_action: Option<ActionDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TextareaOptions {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SwitchOptions {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub action: Option<ActionDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ElementListOptions {
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub elements: Vec<ElementListItem>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ElementListItem {
    #[serde(default)]
    pub title: Option<WidgetDescription>,
    pub item: WidgetDescription,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FormOptions {
    pub elements: Box<WidgetDescription>,
    #[serde(default)]
    pub actions: Vec<WidgetDescription>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TableOptions {
    #[serde(default)]
    pub header: Vec<String>,
    #[serde(default)]
    pub body: Option<Vec<Vec<WidgetDescription>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TableViewOptions {
    #[serde(default)]
    pub header: Vec<TableViewColumn>,
    #[serde(default)]
    pub body: Option<Vec<Vec<String>>>,
    #[serde(rename = "select-action", default)]
    pub select_action: Option<ActionDescriptor>,
    #[serde(rename = "data-item", default)]
    pub data_item: usize,
}

/// Column of a table view. `items` index into each body row.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TableViewColumn {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub items: Vec<usize>,
    #[serde(default)]
    pub proportion: u16,
    /// Free-form column width, sent as `""` when unset.
    #[serde(default)]
    pub width: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BadgeOptions {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub style: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ImageOptions {
    #[serde(default)]
    pub svg: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IconOptions {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CardOptions {
    #[serde(default)]
    pub header: Option<LabelData>,
    #[serde(default)]
    pub additional: Option<Box<WidgetDescription>>,
    pub body: Box<WidgetDescription>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DropdownOptions {
    /// `None` entries are separators.
    #[serde(default)]
    pub items: Vec<Option<DropdownItem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DropdownItem {
    #[serde(flatten)]
    pub label: LabelData,
    #[serde(flatten)]
    pub action: ActionDescriptor,
    #[serde(default)]
    pub danger: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ValueEditOptions {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub action: ActionDescriptor,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SelectEditOptions {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
    #[serde(rename = "badge-style", default)]
    pub badge_style: String,
    #[serde(default)]
    pub action: ActionDescriptor,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TagsEditOptions {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: Option<Vec<String>>,
    #[serde(default)]
    pub action: ActionDescriptor,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LineOptions {
    #[serde(default)]
    pub elements: Vec<WidgetDescription>,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl LineOptions {
    /// Both spellings in document order: bare `elements` first, then `items`.
    pub fn children(&self) -> impl Iterator<Item = (&WidgetDescription, Option<u32>)> {
        self.elements
            .iter()
            .map(|e| (e, None))
            .chain(self.items.iter().map(|i| (&i.element, i.flex)))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LineItem {
    pub element: WidgetDescription,
    #[serde(default)]
    pub flex: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProgressOptions {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default = "default_progress_max")]
    pub max: f64,
}

fn default_progress_max() -> f64 {
    100.0
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdatedOptions {
    #[serde(default)]
    pub id: String,
    pub element: Box<WidgetDescription>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CodeEditorOptions {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub value: String,
}
