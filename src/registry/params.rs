//! Option structs, one per intent family.
//!
//! Options arrive as text from the trigger surface; every field defaults to
//! blank so a host can omit what the user left empty. "Index" options are
//! 1-based as the user sees them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ── Slide options ───────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SlideNumberParams {
    /// 1-based slide number, or `+n` / `-n` relative to the current slide.
    /// `0` re-triggers the current slide.
    pub slide: String,
    /// Blank = current presentation, `n` = presentation n of the current
    /// playlist, `a.b:n` = absolute path.
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SlideLabelParams {
    /// Supports variables.
    pub playlist_name: String,
    /// Supports variables.
    pub presentation_name: String,
    /// Supports variables.
    pub slide_label: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GroupSlideParams {
    /// Group name; separate alternatives with `|`. Supports variables.
    pub group_name: String,
    /// 1-based slide number within the group. Supports variables.
    pub slide_number: String,
    /// Blank = the current presentation. Supports variables.
    pub presentation_path: String,
}

// ── Stage options ───────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StageDisplayIndexParams {
    pub index: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StageLayoutParams {
    /// Stage screen id. Blank = first known screen.
    pub screen: String,
    /// Stage layout id. Blank = first known layout.
    pub layout: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StageMessageParams {
    /// Supports variables.
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LookParams {
    /// Look id. Blank = first known look.
    pub look: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MacroParams {
    /// Macro id. Blank = first known macro.
    pub macro_id: String,
}

// ── Clock options ───────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ClockIndexParams {
    /// Clock index as numbered by the remote.
    pub clock_index: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ClockUpdateParams {
    pub clock_index: String,
    /// Countdown duration / target time. `+n` / `-n` adjusts the current reading.
    pub clock_time: String,
    /// `0` countdown, `1` countdown to time, `2` elapsed.
    pub clock_type: String,
    pub overrun: bool,
    pub is_pm: bool,
    /// Elapsed end time. `+n` / `-n` adjusts the current reading.
    pub elapsed_time: String,
    /// Blank keeps the clock's name.
    pub clock_name: String,
}

// ── Message options ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MessageSendParams {
    pub message_index: String,
    /// Comma-separated token names; `,,` is a literal comma.
    pub keys: String,
    /// Comma-separated token values; `,,` is a literal comma. A single value
    /// supports variables.
    pub values: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MessageIndexParams {
    pub message_index: String,
}

// ── Timeline options ────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TimelineParams {
    /// Same forms as the slide `path` option.
    pub presentation_path: String,
}

// ── Custom options ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CustomActionParams {
    /// A JSON object with an `action` field.
    pub json: String,
}

// ── Link options ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LinkSlideParams {
    pub playlist_name: String,
    pub playlist_index: String,
    pub presentation_name: String,
    pub presentation_index: String,
    pub slide_name: String,
    pub slide_index: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LinkIdParams {
    /// 1-based; blank or 0 = match by name only.
    pub index: String,
    /// Supports variables.
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LinkPlaylistItemParams {
    pub playlist_name: String,
    pub playlist_index: String,
    pub item_name: String,
    pub item_index: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LinkCustomParams {
    /// Endpoint path, e.g. `/timer/start`.
    pub endpoint: String,
    /// JSON object body. Blank = `{}`.
    pub json: String,
}
