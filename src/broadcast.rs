//! Handling of unsolicited frames from the remote.
//!
//! Updates session state with what the remote reports, refreshes choice
//! lists and variables, and completes pending correlation slots by returning
//! the follow-up commands the caller should send.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::clock::parse_seconds;
use crate::correlation::GroupSlideSlot;
use crate::registry::handlers::slide::CURRENT_PRESENTATION_PATH;
use crate::state::{ChoiceItem, Instance, SessionState};
use crate::transport::SocketSender;
use crate::wire::{action, WireCommand, WireField};

/// 1-based number of the slide the remote last reported.
pub const CURRENT_SLIDE: &str = "current_slide";

pub struct BroadcastHandler {
    instance: Arc<Instance>,
}

impl BroadcastHandler {
    pub fn new(instance: Arc<Instance>) -> Self {
        Self { instance }
    }

    /// Handle one text frame. Frames that are not JSON objects with an
    /// `action` are ignored.
    pub fn handle_text(&self, text: &str) -> Vec<WireCommand> {
        match serde_json::from_str::<Value>(text) {
            Ok(frame) => self.handle(&frame),
            Err(e) => {
                warn!("ignoring unparseable frame: {e}");
                Vec::new()
            }
        }
    }

    pub fn handle(&self, frame: &Value) -> Vec<WireCommand> {
        let Some(name) = frame.get("action").and_then(Value::as_str) else {
            return Vec::new();
        };
        debug!(action = name, "broadcast");
        match name {
            action::AUTHENTICATE => self.on_authenticate(frame),
            action::TRIGGER_INDEX | action::SLIDE_INDEX => {
                self.on_slide_index(frame);
                Vec::new()
            }
            action::PRESENTATION_CURRENT => {
                if let Some(path) = presentation_path(frame) {
                    self.instance.with_session_mut(|s| {
                        s.presentation_path.clone_from(&path);
                        s.set_variable(CURRENT_PRESENTATION_PATH, path);
                    });
                }
                self.match_presentation(frame)
            }
            action::PRESENTATION_REQUEST => self.match_presentation(frame),
            action::PLAYLIST_REQUEST_ALL => self.match_playlists(frame),
            action::CLOCK_REQUEST => {
                self.on_clock_info(frame);
                Vec::new()
            }
            action::CLOCK_CURRENT_TIMES => {
                self.on_clock_times(frame);
                Vec::new()
            }
            action::STAGE_DISPLAY_SETS => {
                self.on_stage_display_sets(frame);
                Vec::new()
            }
            action::LOOKS_REQUEST => {
                let looks = choice_items(frame.get("looks"), "lookID", "lookName");
                self.instance.with_session_mut(|s| s.choice_lists.looks = looks);
                Vec::new()
            }
            action::MACROS_REQUEST => {
                let macros = choice_items(frame.get("macros"), "macroID", "macroName");
                self.instance.with_session_mut(|s| s.choice_lists.macros = macros);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// On success, asks for everything the choice lists and variables are
    /// built from.
    fn on_authenticate(&self, frame: &Value) -> Vec<WireCommand> {
        let authenticated = int_field(frame, "authenticated").unwrap_or(0) == 1;
        if !authenticated {
            let reason = frame.get("error").and_then(Value::as_str).unwrap_or("");
            warn!(%reason, "remote rejected authentication");
            return Vec::new();
        }
        if let Some(major) = int_field(frame, "majorVersion").and_then(|v| u32::try_from(v).ok()) {
            info!(major, "authenticated with remote");
            self.instance.with_session_mut(|s| s.major_version = major);
        }
        vec![
            WireCommand::new(action::PRESENTATION_CURRENT)
                .with("presentationSlideQuality", WireField::Number(Some(0))),
            WireCommand::new(action::SLIDE_INDEX),
            WireCommand::new(action::CLOCK_REQUEST),
            WireCommand::new(action::CLOCK_START_SENDING),
            WireCommand::new(action::STAGE_DISPLAY_SETS),
            WireCommand::new(action::LOOKS_REQUEST),
            WireCommand::new(action::MACROS_REQUEST),
        ]
    }

    fn on_slide_index(&self, frame: &Value) {
        let index = int_field(frame, "slideIndex");
        let path = presentation_path(frame);
        self.instance.with_session_mut(|s| {
            if let Some(i) = index {
                s.slide_index = i;
                s.set_variable(CURRENT_SLIDE, (i + 1).to_string());
            }
            if let Some(path) = path {
                s.presentation_path.clone_from(&path);
                s.set_variable(CURRENT_PRESENTATION_PATH, path);
            }
        });
    }

    // ── Presentation detail ────────────────────────────────────────

    fn match_presentation(&self, frame: &Value) -> Vec<WireCommand> {
        let path = presentation_path(frame);
        let groups = slide_groups(frame);
        let correlation = &self.instance.correlation;

        // Slot is consumed whether or not the group exists.
        if let Some(slot) =
            correlation.take_group_slide_if(|s| path_matches(path.as_deref(), &s.presentation_path))
        {
            return match find_group_slide(&groups, &slot) {
                Some(index) => vec![trigger_index(index, &slot.presentation_path)],
                None => {
                    warn!(group = %slot.group_name, slide = %slot.slide_number_text, "no matching group slide");
                    Vec::new()
                }
            };
        }

        if let Some(lookup) =
            correlation.take_label_lookup_if(|l| path_matches(path.as_deref(), &l.presentation_path))
        {
            let found = groups
                .iter()
                .flat_map(|g| g.slide_labels.iter())
                .position(|label| label == &lookup.slide_label);
            return match found {
                Some(index) => vec![trigger_index(index, &lookup.presentation_path)],
                None => {
                    warn!(label = %lookup.slide_label, "no slide with that label");
                    Vec::new()
                }
            };
        }
        Vec::new()
    }

    // ── Playlist listing ───────────────────────────────────────────

    fn match_playlists(&self, frame: &Value) -> Vec<WireCommand> {
        let correlation = &self.instance.correlation;
        let Some(slot) = correlation.slide_by_label() else {
            return Vec::new();
        };
        let playlists = frame
            .get("playlistAll")
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice);
        let Some(location) =
            find_presentation(playlists, &slot.playlist_name, &slot.presentation_name)
        else {
            debug!(playlist = %slot.playlist_name, presentation = %slot.presentation_name, "presentation not in playlists yet");
            return Vec::new();
        };

        if !correlation.advance_slide_by_label_if(&slot, location.clone()) {
            debug!(label = %slot.slide_label, "slide-by-label request superseded during match");
            return Vec::new();
        }
        vec![WireCommand::new(action::PRESENTATION_REQUEST)
            .with("presentationPath", WireField::Text(location))
            .with("presentationSlideQuality", WireField::Number(Some(0)))]
    }

    // ── Clocks ─────────────────────────────────────────────────────

    fn on_clock_info(&self, frame: &Value) {
        let Some(clocks) = frame.get("clockInfo").and_then(Value::as_array) else {
            return;
        };
        self.instance.with_session_mut(|s| {
            for (n, clock) in clocks.iter().enumerate() {
                let time = text_field(clock, "clockTime");
                let name = text_field(clock, "clockName");
                s.set_variable(format!("pro7_clock_{n}_name"), name);
                set_clock_time(s, n, &time);
            }
        });
    }

    fn on_clock_times(&self, frame: &Value) {
        let Some(times) = frame.get("clockTimes").and_then(Value::as_array) else {
            return;
        };
        self.instance.with_session_mut(|s| {
            for (n, time) in times.iter().enumerate() {
                set_clock_time(s, n, time.as_str().unwrap_or(""));
            }
        });
    }

    // ── Choice lists ───────────────────────────────────────────────

    fn on_stage_display_sets(&self, frame: &Value) {
        let screens = choice_items(frame.get("stageScreens"), "stageScreenUUID", "stageScreenName");
        let layouts = choice_items(frame.get("stageLayouts"), "stageLayoutUUID", "stageLayoutName");
        self.instance.with_session_mut(|s| {
            if !screens.is_empty() {
                s.choice_lists.stage_screens = screens;
            }
            if !layouts.is_empty() {
                s.choice_lists.stage_layouts = layouts;
            }
        });
    }
}

async fn dispatch<S: SocketSender>(handler: &BroadcastHandler, text: &str, socket: &S) {
    for command in handler.handle_text(text) {
        if let Err(e) = socket.send(&command).await {
            warn!(action = %command.action, "follow-up not sent: {e}");
        }
    }
}

/// Feed socket frames through the handler and send its follow-ups. Returns
/// when the frame channel closes, which happens once the connection drops.
pub async fn pump<S: SocketSender>(
    handler: &BroadcastHandler,
    mut frames: broadcast::Receiver<String>,
    socket: &S,
) {
    loop {
        match frames.recv().await {
            Ok(text) => dispatch(handler, &text, socket).await,
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "broadcast handler fell behind"),
            Err(RecvError::Closed) => break,
        }
    }
}

/// Like [`pump`], but stops as soon as `ready` holds for the session.
/// Returns false if the channel closes first.
pub async fn pump_until<S: SocketSender>(
    handler: &BroadcastHandler,
    frames: &mut broadcast::Receiver<String>,
    socket: &S,
    ready: impl Fn(&SessionState) -> bool,
) -> bool {
    loop {
        if handler.instance.with_session(&ready) {
            return true;
        }
        match frames.recv().await {
            Ok(text) => dispatch(handler, &text, socket).await,
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "broadcast handler fell behind"),
            Err(RecvError::Closed) => return false,
        }
    }
}

fn set_clock_time(session: &mut SessionState, n: usize, time: &str) {
    session.set_variable(format!("pro7_clock_{n}"), time);
    let total = crate::clock::total_seconds_var(&n.to_string());
    match parse_seconds(time) {
        Some(seconds) => session.set_variable(total, seconds.to_string()),
        None => {
            session.dynamic_variables.remove(&total);
        }
    }
}

fn trigger_index(index: usize, path: &str) -> WireCommand {
    WireCommand::new(action::TRIGGER_INDEX)
        .with("slideIndex", WireField::Number(i64::try_from(index).ok()))
        .with("presentationPath", WireField::text(path))
}

/// A frame with no path is taken to answer the pending request.
fn path_matches(reported: Option<&str>, wanted: &str) -> bool {
    reported.map_or(true, |p| p == wanted)
}

// ── Frame parsing ──────────────────────────────────────────────────

/// Integer field that the remote may send either as a number or a string.
fn int_field(value: &Value, key: &str) -> Option<i64> {
    match value.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn presentation_path(frame: &Value) -> Option<String> {
    let direct = frame.get("presentationPath").and_then(Value::as_str);
    let nested = frame
        .get("presentation")
        .and_then(|p| p.get("presentationCurrentLocation"))
        .and_then(Value::as_str);
    direct.or(nested).filter(|p| !p.is_empty()).map(str::to_string)
}

#[derive(Debug)]
struct SlideGroup {
    name: String,
    slide_labels: Vec<String>,
}

fn slide_groups(frame: &Value) -> Vec<SlideGroup> {
    frame
        .get("presentation")
        .and_then(|p| p.get("presentationSlideGroups"))
        .and_then(Value::as_array)
        .map(|groups| {
            groups
                .iter()
                .map(|g| SlideGroup {
                    name: text_field(g, "groupName"),
                    slide_labels: g
                        .get("groupSlides")
                        .and_then(Value::as_array)
                        .map(|slides| slides.iter().map(|s| text_field(s, "slideLabel")).collect())
                        .unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Absolute index of slide N (1-based) of the first group matching any of the
/// slot's alternatives.
fn find_group_slide(groups: &[SlideGroup], slot: &GroupSlideSlot) -> Option<usize> {
    let number: usize = slot.slide_number_text.trim().parse().ok()?;
    let within = number.checked_sub(1)?;
    let mut offset = 0;
    for group in groups {
        let hit = slot
            .group_alternatives()
            .any(|alt| alt.eq_ignore_ascii_case(group.name.trim()));
        if hit {
            return (within < group.slide_labels.len()).then_some(offset + within);
        }
        offset += group.slide_labels.len();
    }
    None
}

/// Location of a named presentation inside a named playlist, searching
/// playlist groups recursively.
fn find_presentation(playlists: &[Value], playlist_name: &str, presentation_name: &str) -> Option<String> {
    for playlist in playlists {
        let items = playlist
            .get("playlist")
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice);
        if playlist.get("playlistType").and_then(Value::as_str) == Some("playlistTypeGroup") {
            if let Some(found) = find_presentation(items, playlist_name, presentation_name) {
                return Some(found);
            }
            continue;
        }
        if text_field(playlist, "playlistName") != playlist_name {
            continue;
        }
        let found = items
            .iter()
            .find(|item| text_field(item, "playlistItemName") == presentation_name)
            .map(|item| text_field(item, "playlistItemLocation"));
        if found.is_some() {
            return found;
        }
    }
    None
}

fn choice_items(list: Option<&Value>, id_key: &str, label_key: &str) -> Vec<ChoiceItem> {
    list.and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| ChoiceItem::new(text_field(item, id_key), text_field(item, label_key)))
                .filter(|item| !item.id.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
