pub mod catalog;
pub mod execute;
pub mod handlers;
pub mod params;
pub mod validation;

use serde::{Deserialize, Serialize};

use crate::error::DriverError;
use crate::state::Instance;
use crate::variables::VariableResolver;
use crate::wire::{LinkRequest, WireCommand};

// ── Param types (used in Intent enum) ───────────────────────────
use params::{
    ClockIndexParams, ClockUpdateParams, CustomActionParams, GroupSlideParams, LinkCustomParams,
    LinkIdParams, LinkPlaylistItemParams, LinkSlideParams, LookParams, MacroParams,
    MessageIndexParams, MessageSendParams, SlideLabelParams, SlideNumberParams,
    StageDisplayIndexParams, StageLayoutParams, StageMessageParams, TimelineParams,
};

// ── Handler modules (compile targets) ───────────────────────────
use handlers::{clock, custom, link, message, slide, stage, timeline};

// ── Intent metadata ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntentCategory {
    Slide,
    Clear,
    Stage,
    Clock,
    Message,
    Timeline,
    Link,
    Custom,
}

impl IntentCategory {
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Slide => "slide",
            Self::Clear => "clear",
            Self::Stage => "stage",
            Self::Clock => "clock",
            Self::Message => "message",
            Self::Timeline => "timeline",
            Self::Link => "link",
            Self::Custom => "custom",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Slide => "Move between slides, trigger by index, label or group",
            Self::Clear => "Clear layers, props, audio, messages",
            Self::Stage => "Stage display layouts and messages, looks, macros",
            Self::Clock => "Start, stop, reset and update clocks",
            Self::Message => "Show and hide audience messages",
            Self::Timeline => "Presentation timeline transport",
            Self::Link => "REST link triggers (props, media, audio, video input)",
            Self::Custom => "Raw JSON actions",
        }
    }

    pub fn all() -> &'static [IntentCategory] {
        &[
            Self::Slide,
            Self::Clear,
            Self::Stage,
            Self::Clock,
            Self::Message,
            Self::Timeline,
            Self::Link,
            Self::Custom,
        ]
    }
}

pub struct IntentInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub category: IntentCategory,
    /// Sends a discovery command and parks the real target in a correlation slot.
    pub discovery: bool,
    /// Compiles to a REST link request instead of a socket command.
    pub link: bool,
}

// ── Compile context and output ──────────────────────────────────

/// Everything a compilation rule may touch: the instance (session state and
/// correlation slots) and the variable resolver.
pub struct CompileContext<'a, V> {
    pub instance: &'a Instance,
    pub variables: &'a V,
}

impl<'a, V: VariableResolver> CompileContext<'a, V> {
    pub fn new(instance: &'a Instance, variables: &'a V) -> Self {
        Self {
            instance,
            variables,
        }
    }

    /// Substitute variables in an option that supports them.
    pub async fn var(&self, text: &str) -> String {
        self.variables.resolve(text).await
    }
}

/// Result of compiling one intent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "payload")]
pub enum Compiled {
    Socket(WireCommand),
    Link(LinkRequest),
    /// Nothing addressable; no command is sent.
    Dropped { reason: String },
}

impl Compiled {
    pub fn dropped(reason: impl Into<String>) -> Self {
        Compiled::Dropped {
            reason: reason.into(),
        }
    }

    /// One-line human-readable summary for CLI/API output.
    pub fn summary(&self) -> String {
        match self {
            Compiled::Socket(cmd) => format!("socket {}", cmd.to_text()),
            Compiled::Link(req) => format!(
                "link POST {} {}",
                req.endpoint,
                serde_json::Value::Object(req.data.clone())
            ),
            Compiled::Dropped { reason } => format!("dropped: {reason}"),
        }
    }
}

// ── define_intents! macro ───────────────────────────────────────

/// Single source of truth for all intents. Generates:
/// 1. `Intent` enum (serde-tagged `{"intent": name, "options": {...}}`)
/// 2. `Intent::info()`: metadata (name, description, category, flags)
/// 3. `Intent::compile()`: run the compilation rule
/// 4. `Intent::registry_entries()`: catalog entries with JSON schemas
/// 5. `Intent::from_request()`: deserialize from a (name, JSON) pair
///
/// `params` intents route to a handler; `fixed` intents compile to a bare
/// socket action with no fields.
macro_rules! define_intents {
    (
        params {
            $(
                [ $pc:expr $(, $pf:ident)* ]
                $pv:ident ( $pp:ty )
                => $ph:path, $pn:literal : $pd:literal ;
            )*
        }
        fixed {
            $(
                [ $fc:expr ]
                $fv:ident => $fa:literal, $fnm:literal : $fd:literal ;
            )*
        }
    ) => {
        // ── 1. Intent enum ──
        /// Every user intent the driver understands. Adding a variant causes
        /// compiler errors until it's fully handled.
        #[derive(Debug, Clone, Serialize, Deserialize)]
        #[serde(tag = "intent", content = "options", rename_all = "snake_case")]
        pub enum Intent {
            $( $pv($pp), )*
            $( $fv, )*
        }

        // ── 2. Intent::info() ──
        impl Intent {
            pub fn info(&self) -> IntentInfo {
                match self {
                    $( Intent::$pv(_) => IntentInfo {
                        name: $pn,
                        description: $pd,
                        category: $pc,
                        discovery: define_intents!(@has_flag discovery; $($pf)*),
                        link: define_intents!(@has_flag link; $($pf)*),
                    }, )*
                    $( Intent::$fv => IntentInfo {
                        name: $fnm,
                        description: $fd,
                        category: $fc,
                        discovery: false,
                        link: false,
                    }, )*
                }
            }

            pub fn name(&self) -> &'static str {
                self.info().name
            }
        }

        // ── 3. Intent::compile() ──
        impl Intent {
            pub async fn compile<V: VariableResolver>(
                self,
                ctx: &CompileContext<'_, V>,
            ) -> Result<Compiled, DriverError> {
                match self {
                    $( Intent::$pv(p) => $ph(ctx, p).await, )*
                    $( Intent::$fv => Ok(Compiled::Socket(WireCommand::new($fa))), )*
                }
            }
        }

        // ── 4. Intent::registry_entries() ──
        impl Intent {
            pub(crate) fn registry_entries() -> Vec<catalog::IntentRegistryEntry> {
                vec![
                    $( catalog::entry(
                        IntentInfo {
                            name: $pn,
                            description: $pd,
                            category: $pc,
                            discovery: define_intents!(@has_flag discovery; $($pf)*),
                            link: define_intents!(@has_flag link; $($pf)*),
                        },
                        catalog::schema_value::<$pp>(),
                    ), )*
                    $( catalog::entry(
                        IntentInfo {
                            name: $fnm,
                            description: $fd,
                            category: $fc,
                            discovery: false,
                            link: false,
                        },
                        catalog::empty_object_schema(),
                    ), )*
                ]
            }
        }

        // ── 5. Intent::from_request() ──
        impl Intent {
            pub fn from_request(
                name: &str,
                options: &serde_json::Value,
            ) -> Result<Intent, DriverError> {
                match name {
                    $( $pn => Ok(Intent::$pv(catalog::de(options)?)), )*
                    $( $fnm => Ok(Intent::$fv), )*
                    _ => Err(DriverError::UnknownIntent { name: name.to_string() }),
                }
            }
        }
    };

    // Flag helpers: check whether a specific flag appears in a list of flags.
    (@has_flag discovery; discovery $($rest:ident)*) => { true };
    (@has_flag discovery; $_other:ident $($rest:ident)*) => { define_intents!(@has_flag discovery; $($rest)*) };
    (@has_flag discovery;) => { false };

    (@has_flag link; link $($rest:ident)*) => { true };
    (@has_flag link; $_other:ident $($rest:ident)*) => { define_intents!(@has_flag link; $($rest)*) };
    (@has_flag link;) => { false };
}

// ── Intent definitions ──────────────────────────────────────────

define_intents! {
    params {
        // ── Slide (3) ───────────────────────────────────────────
        [IntentCategory::Slide]
        SlideNumber(SlideNumberParams)
        => slide::slide_number, "slide_number": "Trigger a slide by 1-based number or +/- offset, optionally in another presentation.";

        [IntentCategory::Slide, discovery]
        SlideLabel(SlideLabelParams)
        => slide::slide_label, "slide_label": "Trigger the slide with a given label in a named playlist presentation.";

        [IntentCategory::Slide, discovery]
        GroupSlide(GroupSlideParams)
        => slide::group_slide, "group_slide": "Trigger slide N of a named group (alternatives separated by |).";

        // ── Stage (5) ───────────────────────────────────────────
        [IntentCategory::Stage]
        StageDisplayIndex(StageDisplayIndexParams)
        => stage::stage_display_index, "stage_display_index": "Select a stage display layout by index (generation 6).";

        [IntentCategory::Stage]
        StageLayout(StageLayoutParams)
        => stage::stage_layout, "stage_layout": "Put a stage layout on a stage screen.";

        [IntentCategory::Stage]
        StageMessage(StageMessageParams)
        => stage::stage_message, "stage_message": "Show a message on the stage display.";

        [IntentCategory::Stage]
        SetLook(LookParams)
        => stage::set_look, "set_look": "Activate an audience look.";

        [IntentCategory::Stage]
        TriggerMacro(MacroParams)
        => stage::trigger_macro, "trigger_macro": "Trigger a macro.";

        // ── Clock (4) ───────────────────────────────────────────
        [IntentCategory::Clock]
        ClockStart(ClockIndexParams)
        => clock::clock_start, "clock_start": "Start a clock.";

        [IntentCategory::Clock]
        ClockStop(ClockIndexParams)
        => clock::clock_stop, "clock_stop": "Stop a clock.";

        [IntentCategory::Clock]
        ClockReset(ClockIndexParams)
        => clock::clock_reset, "clock_reset": "Reset a clock.";

        [IntentCategory::Clock]
        ClockUpdate(ClockUpdateParams)
        => clock::clock_update, "clock_update": "Update a clock's type, times and overrun. Times accept +/- deltas.";

        // ── Message (2) ─────────────────────────────────────────
        [IntentCategory::Message]
        MessageSend(MessageSendParams)
        => message::message_send, "message_send": "Show a message, filling its tokens from key/value lists.";

        [IntentCategory::Message]
        MessageHide(MessageIndexParams)
        => message::message_hide, "message_hide": "Hide a message.";

        // ── Timeline (2) ────────────────────────────────────────
        [IntentCategory::Timeline]
        TimelinePlayPause(TimelineParams)
        => timeline::timeline_play_pause, "timeline_play_pause": "Toggle the timeline of a presentation.";

        [IntentCategory::Timeline]
        TimelineRewind(TimelineParams)
        => timeline::timeline_rewind, "timeline_rewind": "Rewind the timeline of a presentation.";

        // ── Custom (1) ──────────────────────────────────────────
        [IntentCategory::Custom]
        CustomAction(CustomActionParams)
        => custom::custom_action, "custom_action": "Send a raw JSON action over the socket.";

        // ── Link (9) ────────────────────────────────────────────
        [IntentCategory::Link, link]
        LinkTriggerSlide(LinkSlideParams)
        => link::link_trigger_slide, "link_trigger_slide": "Trigger a playlist slide by name and/or index.";

        [IntentCategory::Link, link]
        LinkPropTrigger(LinkIdParams)
        => link::link_prop_trigger, "link_prop_trigger": "Trigger a prop by name and/or index.";

        [IntentCategory::Link, link]
        LinkPropClear(LinkIdParams)
        => link::link_prop_clear, "link_prop_clear": "Clear a prop by name and/or index.";

        [IntentCategory::Link, link]
        LinkMediaTrigger(LinkPlaylistItemParams)
        => link::link_media_trigger, "link_media_trigger": "Trigger a media playlist item.";

        [IntentCategory::Link, link]
        LinkAudioTrigger(LinkPlaylistItemParams)
        => link::link_audio_trigger, "link_audio_trigger": "Trigger an audio playlist item.";

        [IntentCategory::Link, link]
        LinkVideoInputTrigger(LinkIdParams)
        => link::link_video_input_trigger, "link_video_input_trigger": "Trigger a video input.";

        [IntentCategory::Link, link]
        LinkMessageClear(LinkIdParams)
        => link::link_message_clear, "link_message_clear": "Clear a message by name and/or index.";

        [IntentCategory::Link, link]
        LinkCustom(LinkCustomParams)
        => link::link_custom, "link_custom": "POST a raw JSON body to a link endpoint.";
    }
    fixed {
        // ── Slide (2) ───────────────────────────────────────────
        [IntentCategory::Slide]
        Next => "presentationTriggerNext", "next": "Go to the next slide.";

        [IntentCategory::Slide]
        Last => "presentationTriggerPrevious", "last": "Go to the previous slide.";

        // ── Clear (9) ───────────────────────────────────────────
        [IntentCategory::Clear]
        ClearAll => "clearAll", "clear_all": "Clear all layers.";

        [IntentCategory::Clear]
        ClearSlide => "clearText", "clear_slide": "Clear the slide layer.";

        [IntentCategory::Clear]
        ClearProps => "clearProps", "clear_props": "Clear all props.";

        [IntentCategory::Clear]
        ClearAudio => "clearAudio", "clear_audio": "Clear audio.";

        [IntentCategory::Clear]
        ClearBackground => "clearVideo", "clear_background": "Clear the media/background layer.";

        [IntentCategory::Clear]
        ClearTelestrator => "clearTelestrator", "clear_telestrator": "Clear telestrator drawings.";

        [IntentCategory::Clear]
        ClearToLogo => "clearToLogo", "clear_to_logo": "Clear to the logo.";

        [IntentCategory::Clear]
        ClearAnnouncements => "clearAnnouncements", "clear_announcements": "Clear the announcements layer.";

        [IntentCategory::Clear]
        ClearMessages => "clearMessages", "clear_messages": "Clear all messages.";

        // ── Stage (1) ───────────────────────────────────────────
        [IntentCategory::Stage]
        StageHideMessage => "stageDisplayHideMessage", "stage_hide_message": "Hide the stage display message.";
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn request_names_match_serde_tags() {
        for entry in catalog::intent_registry() {
            let intent = Intent::from_request(entry.name, &serde_json::json!({})).unwrap();
            let json = serde_json::to_value(&intent).unwrap();
            assert_eq!(json["intent"], entry.name, "serde tag mismatch for {}", entry.name);
            assert_eq!(intent.name(), entry.name);
        }
    }

    #[test]
    fn unknown_intent_is_rejected() {
        let err = Intent::from_request("nope", &serde_json::json!({})).unwrap_err();
        assert!(matches!(err, DriverError::UnknownIntent { .. }));
    }

    #[test]
    fn flags_are_recorded() {
        let label = Intent::from_request("slide_label", &serde_json::json!({})).unwrap();
        assert!(label.info().discovery);
        assert!(!label.info().link);
        let prop = Intent::from_request("link_prop_trigger", &serde_json::json!({})).unwrap();
        assert!(prop.info().link);
        assert_eq!(Intent::ClearAll.info().category, IntentCategory::Clear);
    }

    #[test]
    fn deserializes_tagged_form() {
        let intent: Intent = serde_json::from_value(serde_json::json!({
            "intent": "slide_number",
            "options": { "slide": "+2", "path": "" }
        }))
        .unwrap();
        assert!(matches!(intent, Intent::SlideNumber(ref p) if p.slide == "+2"));
    }
}
