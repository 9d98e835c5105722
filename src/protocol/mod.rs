//! Wire types exchanged with the panel server.
//!
//! The server ships JSON descriptions of pages and typed replies to actions; the
//! client never receives markup. Field names follow the server's JSON spelling.

pub mod envelope;
pub mod widget;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use envelope::{ElementUpdate, ModalOptions, PushMessage, ResponseEnvelope};
pub use widget::WidgetDescription;

/// A server-defined command plus positional arguments.
///
/// An empty `cmd` is reserved: the control carrying it is disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    #[serde(default)]
    pub cmd: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ActionDescriptor {
    pub fn new(cmd: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            cmd: cmd.into(),
            args,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.cmd.is_empty()
    }
}

/// Text with an optional icon, shared by buttons, labels, card headers and menu items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LabelData {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub num: i64,
    #[serde(default)]
    pub strong: bool,
}

/// Field names starting with this collect into a list under the rest of the name.
pub const LIST_FIELD_PREFIX: &str = "[]";

/// One collected form field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    /// `None` when the field did not start with an integer; encoded as `null`.
    Number(Option<i64>),
    List(Vec<String>),
}

/// Field name to value mapping attached to a dispatched action.
pub type FormData = BTreeMap<String, FieldValue>;

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub login: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "access-token", default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RenderRequest<'a> {
    pub sub_mod: usize,
    pub args: &'a [String],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRequest {
    pub cmd: String,
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<FormData>,
}

/// Outbound push-channel message: where this client currently is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationMessage {
    pub module: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MainPage {
    #[serde(rename = "host-name", default)]
    pub host_name: String,
    #[serde(rename = "host-badge-color", default)]
    pub host_badge_color: String,
    #[serde(default)]
    pub plugins: Option<Vec<PluginInfo>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PluginInfo {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub icon: String,
    #[serde(rename = "sub-pages", default)]
    pub sub_pages: Option<Vec<SubPage>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SubPage {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageData {
    #[serde(default)]
    pub title: String,
    pub elements: WidgetDescription,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_request_omits_missing_data() {
        let req = ActionRequest {
            cmd: "restart".into(),
            args: vec!["nginx".into()],
            data: None,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"cmd": "restart", "args": ["nginx"]})
        );
    }

    #[test]
    fn test_field_values_encode_untagged() {
        let mut data = FormData::new();
        data.insert("a".into(), FieldValue::Text("x".into()));
        data.insert("b".into(), FieldValue::Flag(true));
        data.insert("c".into(), FieldValue::Number(Some(42)));
        data.insert("d".into(), FieldValue::Number(None));
        data.insert("e".into(), FieldValue::List(vec!["p".into(), "q".into()]));
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({"a": "x", "b": true, "c": 42, "d": null, "e": ["p", "q"]})
        );
    }

    #[test]
    fn test_main_page_tolerates_null_plugins() {
        let page: MainPage =
            serde_json::from_value(json!({"host-name": "box", "plugins": null})).unwrap();
        assert_eq!(page.host_name, "box");
        assert!(page.plugins.is_none());
    }

    #[test]
    fn test_disabled_action() {
        assert!(ActionDescriptor::default().is_disabled());
        assert!(!ActionDescriptor::new("go", vec![]).is_disabled());
    }
}
