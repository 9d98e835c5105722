//! Replies to actions and unsolicited push-channel messages.

use super::{LabelData, WidgetDescription};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    options: Value,
}

/// The effect the server asks for after an action.
///
/// Absent, `null` and unknown types all mean "reload the page", as does a body
/// that is not a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum ResponseEnvelope {
    #[default]
    Reload,
    SetArgs {
        args: Vec<String>,
    },
    Alert {
        title: String,
        text: String,
    },
    Modal(ModalOptions),
    /// Same effect as `Reload`; kept apart so logs show what the server sent.
    Update,
    PartUpdate {
        id: String,
        element: WidgetDescription,
    },
    Unrecognized(String),
    /// A known type whose options did not decode. Applied as a no-op.
    Malformed {
        kind: String,
        reason: String,
    },
}

impl ResponseEnvelope {
    pub fn kind(&self) -> &str {
        match self {
            Self::Reload => "reload",
            Self::SetArgs { .. } => "set-args",
            Self::Alert { .. } => "alert",
            Self::Modal(_) => "modal",
            Self::Update => "update",
            Self::PartUpdate { .. } => "part-update",
            Self::Unrecognized(kind) => kind,
            Self::Malformed { kind, .. } => kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModalOptions {
    #[serde(default)]
    pub title: LabelData,
    pub content: WidgetDescription,
    #[serde(default)]
    pub actions: Vec<WidgetDescription>,
}

#[derive(Deserialize)]
struct SetArgsOptions {
    #[serde(default)]
    args: Vec<String>,
}

#[derive(Deserialize)]
struct AlertOptions {
    #[serde(default)]
    title: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct PartUpdateOptions {
    id: String,
    element: WidgetDescription,
}

fn options_or_empty(options: Value) -> Value {
    if options.is_null() {
        Value::Object(Default::default())
    } else {
        options
    }
}

impl From<Value> for ResponseEnvelope {
    fn from(value: Value) -> Self {
        if !value.is_object() {
            return Self::Reload;
        }
        match serde_json::from_value::<RawMessage>(value) {
            Ok(raw) => raw.into(),
            Err(_) => Self::Reload,
        }
    }
}

impl From<RawMessage> for ResponseEnvelope {
    fn from(raw: RawMessage) -> Self {
        let Some(kind) = raw.kind else {
            return Self::Reload;
        };
        let options = options_or_empty(raw.options);
        let decoded = match kind.as_str() {
            "reload" => Ok(Self::Reload),
            "update" => Ok(Self::Update),
            "set-args" => serde_json::from_value::<SetArgsOptions>(options)
                .map(|o| Self::SetArgs { args: o.args }),
            "alert" => serde_json::from_value::<AlertOptions>(options).map(|o| Self::Alert {
                title: o.title,
                text: o.text,
            }),
            "modal" => serde_json::from_value(options).map(Self::Modal),
            "part-update" => serde_json::from_value::<PartUpdateOptions>(options)
                .map(|o| Self::PartUpdate {
                    id: o.id,
                    element: o.element,
                }),
            _ => return Self::Unrecognized(kind.clone()),
        };
        decoded.unwrap_or_else(|e| Self::Malformed {
            kind,
            reason: e.to_string(),
        })
    }
}

/// Targeted patch request: `{id, element, data}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ElementUpdate {
    pub id: String,
    #[serde(alias = "elementKind")]
    pub element: String,
    #[serde(default)]
    pub data: Value,
}

/// Unsolicited message from the push channel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawMessage")]
pub enum PushMessage {
    Reload,
    Update(ElementUpdate),
    Unrecognized(String),
    Malformed { kind: String, reason: String },
}

impl From<RawMessage> for PushMessage {
    fn from(raw: RawMessage) -> Self {
        let kind = raw.kind.unwrap_or_default();
        match kind.as_str() {
            "reload" => Self::Reload,
            "update" => match serde_json::from_value(raw.options) {
                Ok(update) => Self::Update(update),
                Err(e) => Self::Malformed {
                    kind,
                    reason: e.to_string(),
                },
            },
            _ => Self::Unrecognized(kind),
        }
    }
}
