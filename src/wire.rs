//! Wire-level message shapes for the two transports.
//!
//! Values stay typed until serialization. The remote-control protocol is
//! string-typed, so [`WireCommand`] stringifies numbers and flags only when it
//! is written out.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// A single field value inside a socket command.
#[derive(Debug, Clone, PartialEq)]
pub enum WireField {
    Text(String),
    /// Numeric field. `None` is an unparseable input and renders as `"NaN"`.
    Number(Option<i64>),
    Flag(bool),
    List(Vec<String>),
    /// Passed through verbatim (custom actions).
    Raw(Value),
}

impl WireField {
    pub fn text(s: impl Into<String>) -> Self {
        WireField::Text(s.into())
    }

    /// String form as it appears on the wire.
    pub fn to_value(&self) -> Value {
        match self {
            WireField::Text(s) => Value::String(s.clone()),
            WireField::Number(n) => Value::String(number_text(*n)),
            WireField::Flag(b) => Value::String(b.to_string()),
            WireField::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            WireField::Raw(v) => v.clone(),
        }
    }
}

/// Render an optional number the way the remote receives garbage input.
pub fn number_text(n: Option<i64>) -> String {
    n.map_or_else(|| "NaN".to_string(), |v| v.to_string())
}

/// A compiled socket command: `{"action": ..., <fields>}`.
#[derive(Debug, Clone, PartialEq)]
pub struct WireCommand {
    pub action: String,
    pub fields: Vec<(String, WireField)>,
}

impl WireCommand {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field, replacing any earlier field with the same name.
    pub fn with(mut self, name: impl Into<String>, value: WireField) -> Self {
        let name = name.into();
        self.fields.retain(|(n, _)| *n != name);
        self.fields.push((name, value));
        self
    }

    pub fn field(&self, name: &str) -> Option<&WireField> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Build a command from an arbitrary JSON object. Returns `None` when the
    /// object has no string `action`.
    pub fn from_object(mut object: Map<String, Value>) -> Option<Self> {
        let action = match object.remove("action") {
            Some(Value::String(a)) => a,
            _ => return None,
        };
        let fields = object
            .into_iter()
            .map(|(k, v)| (k, WireField::Raw(v)))
            .collect();
        Some(Self { action, fields })
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn to_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Serialize for WireCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry("action", &self.action)?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, &value.to_value())?;
        }
        map.end()
    }
}

/// A compiled REST link request. `data` always disables certificate validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkRequest {
    pub endpoint: String,
    pub data: Map<String, Value>,
}

impl LinkRequest {
    /// Build a request, prefixing `/` onto the endpoint when missing and
    /// injecting the connection-policy override.
    pub fn new(endpoint: &str, mut data: Map<String, Value>) -> Self {
        let endpoint = if endpoint.starts_with('/') {
            endpoint.to_string()
        } else {
            format!("/{endpoint}")
        };
        data.insert(
            "connection".to_string(),
            json!({ "rejectUnauthorized": false }),
        );
        Self { endpoint, data }
    }
}

/// `{index, name}` addressing element used by link requests.
pub fn index_name(index: Option<i64>, name: &str) -> Value {
    json!({ "index": index, "name": name })
}

// ── Remote action names ─────────────────────────────────────────

pub mod action {
    pub const AUTHENTICATE: &str = "authenticate";
    pub const TRIGGER_NEXT: &str = "presentationTriggerNext";
    pub const TRIGGER_PREVIOUS: &str = "presentationTriggerPrevious";
    pub const TRIGGER_INDEX: &str = "presentationTriggerIndex";
    pub const SLIDE_INDEX: &str = "presentationSlideIndex";
    pub const PRESENTATION_REQUEST: &str = "presentationRequest";
    pub const PRESENTATION_CURRENT: &str = "presentationCurrent";
    pub const PLAYLIST_REQUEST_ALL: &str = "playlistRequestAll";
    pub const CLOCK_REQUEST: &str = "clockRequest";
    pub const CLOCK_CURRENT_TIMES: &str = "clockCurrentTimes";
    pub const CLOCK_START_SENDING: &str = "clockStartSendingCurrentTime";
    pub const STAGE_DISPLAY_SETS: &str = "stageDisplaySets";
    pub const LOOKS_REQUEST: &str = "looksRequest";
    pub const MACROS_REQUEST: &str = "macrosRequest";
}

// ── Link endpoints ──────────────────────────────────────────────

pub mod endpoint {
    pub const TRIGGER_PLAYLIST: &str = "/trigger/playlist";
    pub const TRIGGER_MEDIA: &str = "/trigger/media";
    pub const TRIGGER_AUDIO: &str = "/trigger/audio";
    pub const TRIGGER_VIDEO_INPUT: &str = "/trigger/video_input";
    pub const PROP_TRIGGER: &str = "/prop/trigger";
    pub const PROP_CLEAR: &str = "/prop/clear";
    pub const MESSAGE_CLEAR: &str = "/message/clear";
}
