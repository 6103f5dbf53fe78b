//! Option shape checks run by the trigger surfaces before compiling.
//!
//! The compiler itself never re-validates: anything that slips past these
//! checks flows through to the wire as-is.

use crate::addressing::is_valid_presentation_path;
use crate::broadcast::CURRENT_SLIDE;
use crate::error::DriverError;
use crate::registry::handlers::slide::CURRENT_PRESENTATION_PATH;
use crate::state::SessionState;

use super::Intent;

/// Slide option: an optionally signed run of digits.
pub fn validate_slide(slide: &str) -> Result<(), DriverError> {
    let digits = slide
        .strip_prefix('+')
        .or_else(|| slide.strip_prefix('-'))
        .unwrap_or(slide);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DriverError::InvalidIntent {
            message: format!("Slide '{slide}' must be a number, optionally prefixed with + or -"),
        });
    }
    Ok(())
}

/// Presentation path option: empty, bare digits, or `digits(.digits)*:digits`.
pub fn validate_presentation_path(path: &str) -> Result<(), DriverError> {
    if !is_valid_presentation_path(path) {
        return Err(DriverError::InvalidIntent {
            message: format!(
                "Presentation path '{path}' must be empty, a number, or of the form 1.2:3"
            ),
        });
    }
    Ok(())
}

/// Check the options of intents whose inputs have a fixed shape.
pub fn validate_intent(intent: &Intent) -> Result<(), DriverError> {
    match intent {
        Intent::SlideNumber(p) => {
            validate_slide(p.slide.trim())?;
            validate_presentation_path(p.path.trim())
        }
        Intent::TimelinePlayPause(p) | Intent::TimelineRewind(p) => {
            validate_presentation_path(p.presentation_path.trim())
        }
        _ => Ok(()),
    }
}

/// What an intent resolves against the remote's live session. A one-shot
/// surface has to hear these from the remote before compiling, or the
/// intent targets a slide nobody asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionNeeds {
    pub slide: bool,
    pub presentation: bool,
}

impl SessionNeeds {
    pub fn any(self) -> bool {
        self.slide || self.presentation
    }

    /// True once the remote has reported everything needed.
    pub fn met_by(self, session: &SessionState) -> bool {
        (!self.slide || session.variable(CURRENT_SLIDE).is_some())
            && (!self.presentation || session.variable(CURRENT_PRESENTATION_PATH).is_some())
    }
}

/// Blank paths and bare playlist positions both lean on the current presentation.
fn path_needs_session(path: &str) -> bool {
    path.is_empty() || path.bytes().all(|b| b.is_ascii_digit())
}

pub fn session_needs(intent: &Intent) -> SessionNeeds {
    match intent {
        Intent::SlideNumber(p) => {
            let slide = p.slide.trim();
            SessionNeeds {
                slide: slide.starts_with(['+', '-']) || slide.parse::<i64>() == Ok(0),
                presentation: path_needs_session(p.path.trim()),
            }
        }
        Intent::GroupSlide(p) => SessionNeeds {
            slide: false,
            presentation: p.presentation_path.trim().is_empty(),
        },
        Intent::TimelinePlayPause(p) | Intent::TimelineRewind(p) => SessionNeeds {
            slide: false,
            presentation: path_needs_session(p.presentation_path.trim()),
        },
        _ => SessionNeeds::default(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn slide_shapes() {
        for ok in ["1", "+2", "-10", "0"] {
            assert!(validate_slide(ok).is_ok(), "{ok}");
        }
        for bad in ["", "+", "x", "1.5", "--1"] {
            assert!(validate_slide(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn path_shapes() {
        for ok in ["", "5", "3:2", "0.1.2:4"] {
            assert!(validate_presentation_path(ok).is_ok(), "{ok}");
        }
        for bad in ["a", "3:", ":2", "1..2:3", "1:2:3"] {
            assert!(validate_presentation_path(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn intents_are_checked_by_kind() {
        let bad = Intent::from_request("slide_number", &json!({"slide": "two"})).unwrap();
        assert!(matches!(
            validate_intent(&bad),
            Err(DriverError::InvalidIntent { .. })
        ));

        let ok = Intent::from_request("slide_number", &json!({"slide": "+1", "path": "4"})).unwrap();
        assert!(validate_intent(&ok).is_ok());

        let bad_path =
            Intent::from_request("timeline_rewind", &json!({"presentation_path": "x:y"})).unwrap();
        assert!(validate_intent(&bad_path).is_err());

        assert!(validate_intent(&Intent::ClearAll).is_ok());
    }

    #[test]
    fn relative_input_needs_the_live_session() {
        let needs = |name: &str, options: serde_json::Value| {
            session_needs(&Intent::from_request(name, &options).unwrap())
        };

        let relative = needs("slide_number", json!({"slide": "+1"}));
        assert_eq!(relative, SessionNeeds { slide: true, presentation: true });
        assert!(needs("slide_number", json!({"slide": "0", "path": "1:2"})).slide);
        assert!(!needs("slide_number", json!({"slide": "3", "path": "1:2"})).any());
        assert!(needs("slide_number", json!({"slide": "3", "path": "2"})).presentation);

        assert!(needs("group_slide", json!({"group_name": "Chorus"})).presentation);
        assert!(!needs("group_slide", json!({"group_name": "Chorus", "presentation_path": "0:1"})).any());
        assert!(needs("timeline_rewind", json!({})).presentation);
        assert!(!session_needs(&Intent::ClearAll).any());
    }

    #[test]
    fn needs_are_met_by_reported_variables() {
        let needs = SessionNeeds { slide: true, presentation: true };
        let mut session = SessionState::new(7);
        assert!(!needs.met_by(&session));
        session.set_variable(CURRENT_PRESENTATION_PATH, "0:1");
        assert!(!needs.met_by(&session));
        session.set_variable(CURRENT_SLIDE, "4");
        assert!(needs.met_by(&session));
        assert!(SessionNeeds::default().met_by(&SessionState::new(7)));
    }
}
