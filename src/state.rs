use std::collections::HashMap;

use parking_lot::Mutex;
use serde::Serialize;

use crate::correlation::CorrelationStore;
use crate::settings::ConnectionSettings;

// ── Instance ───────────────────────────────────────────────────────

/// Per-connection state shared by the compiler, the broadcast handler and
/// every trigger surface. Lives from connect to disconnect.
pub struct Instance {
    pub session: Mutex<SessionState>,
    pub correlation: CorrelationStore,
    pub settings: ConnectionSettings,
}

impl Instance {
    pub fn new(settings: ConnectionSettings) -> Self {
        Self {
            session: Mutex::new(SessionState::new(settings.major_version)),
            correlation: CorrelationStore::new(),
            settings,
        }
    }

    /// Read-only access to the session. Locks the mutex for the duration of `f`.
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&SessionState) -> R,
    {
        let guard = self.session.lock();
        f(&guard)
    }

    /// Mutating access to the session. Locks the mutex for the duration of `f`.
    pub fn with_session_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut SessionState) -> R,
    {
        let mut guard = self.session.lock();
        f(&mut guard)
    }
}

// ── Session state ──────────────────────────────────────────────────

/// Best-effort view of the remote application. Written optimistically by the
/// compiler and authoritatively by the broadcast handler; may be stale.
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    /// Last known slide position, 0-based.
    pub slide_index: i64,
    /// `<playlistId>[.<subIndex>]*:<presentationIndex>` or empty.
    pub presentation_path: String,
    pub dynamic_variables: HashMap<String, String>,
    pub choice_lists: ChoiceLists,
    /// Remote firmware generation.
    pub major_version: u32,
}

impl SessionState {
    pub fn new(major_version: u32) -> Self {
        Self {
            slide_index: 0,
            presentation_path: String::new(),
            dynamic_variables: HashMap::new(),
            choice_lists: ChoiceLists::default(),
            major_version,
        }
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.dynamic_variables.get(name).map(String::as_str)
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.dynamic_variables.insert(name.into(), value.into());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceItem {
    pub id: String,
    pub label: String,
}

impl ChoiceItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Option lists refreshed from the remote, used as defaults when a
/// picker option is left blank.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChoiceLists {
    pub stage_screens: Vec<ChoiceItem>,
    pub stage_layouts: Vec<ChoiceItem>,
    pub looks: Vec<ChoiceItem>,
    pub macros: Vec<ChoiceItem>,
}

/// `choice` when non-blank, else the id of the first entry in `list`.
pub fn choice_or_first(choice: &str, list: &[ChoiceItem]) -> String {
    let choice = choice.trim();
    if choice.is_empty() {
        list.first().map(|c| c.id.clone()).unwrap_or_default()
    } else {
        choice.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_falls_back_to_first_entry() {
        let looks = vec![ChoiceItem::new("L1", "Default"), ChoiceItem::new("L2", "Worship")];
        assert_eq!(choice_or_first("", &looks), "L1");
        assert_eq!(choice_or_first("L2", &looks), "L2");
        assert_eq!(choice_or_first(" ", &[]), "");
    }

    #[test]
    fn variables_are_last_write_wins() {
        let mut session = SessionState::new(7);
        session.set_variable("current_slide", "1");
        session.set_variable("current_slide", "2");
        assert_eq!(session.variable("current_slide"), Some("2"));
        assert_eq!(session.dynamic_variables.len(), 1);
    }
}
