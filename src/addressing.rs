//! Turns user-facing slide, presentation and index addressing into the
//! absolute form the remote expects.
//!
//! Presentation paths look like `<playlistId>[.<subIndex>]*:<presentationIndex>`.
//! Slide indices on the wire are 0-based.

/// Resolve a slide option against the last known slide index.
///
/// `+k`/`-k` move relative to `current`, flooring at 0. Anything else is an
/// absolute 1-based slide number. A result below 0 (an absolute `0` or an
/// unparseable absolute value) re-triggers the current slide. Returns `None`
/// only for an unparseable relative delta.
pub fn resolve_slide_index(input: &str, current: i64) -> Option<i64> {
    let input = input.trim();
    let index = if input.starts_with('+') || input.starts_with('-') {
        let delta: i64 = input.parse().ok()?;
        current.saturating_add(delta).max(0)
    } else {
        input.parse::<i64>().map_or(-1, |n| n - 1)
    };
    Some(if index < 0 { current } else { index })
}

/// Playlist-id prefix of a presentation path (the text before the first `:`).
pub fn playlist_prefix(path: &str) -> &str {
    path.split(':').next().unwrap_or_default()
}

/// Resolve a presentation path option against the stored current path.
///
/// Blank reuses `stored`; bare digits replace the presentation index within
/// the stored playlist; a full `a.b:n` path is used verbatim.
pub fn resolve_presentation_path(input: &str, stored: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        stored.to_string()
    } else if is_digits(input) {
        format!("{}:{input}", playlist_prefix(stored))
    } else {
        input.to_string()
    }
}

/// Resolve the target of a group-slide request. Blank input falls back to the
/// observed `current_presentation_path`. `None` means nothing is addressable.
pub fn resolve_group_path(input: &str, observed: Option<&str>) -> Option<String> {
    let input = input.trim();
    let path = if input.is_empty() {
        observed.unwrap_or_default().trim()
    } else {
        input
    };
    if path.is_empty() || path == "undefined" {
        None
    } else {
        Some(path.to_string())
    }
}

/// Convert a user-facing 1-based index to a 0-based wire index.
///
/// Zero, blank, non-numeric or the literal `undefined` all map to `None`
/// (match by name only).
pub fn wire_index(input: &str) -> Option<i64> {
    let input = input.trim();
    if input.is_empty() || input == "undefined" {
        return None;
    }
    match input.parse::<i64>() {
        Ok(n) if n > 0 => Some(n - 1),
        _ => None,
    }
}

/// Shape check for the presentation path option:
/// empty, bare digits, or `digits(.digits)*:digits`.
pub fn is_valid_presentation_path(path: &str) -> bool {
    if path.is_empty() || is_digits(path) {
        return true;
    }
    let Some((playlist, presentation)) = path.split_once(':') else {
        return false;
    };
    is_digits(presentation) && playlist.split('.').all(is_digits)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_slide_moves_from_current() {
        assert_eq!(resolve_slide_index("+2", 3), Some(5));
        assert_eq!(resolve_slide_index("-1", 3), Some(2));
        for i in 0..10 {
            assert_eq!(resolve_slide_index("+4", i), Some(i + 4));
        }
    }

    #[test]
    fn relative_slide_floors_at_zero() {
        assert_eq!(resolve_slide_index("-5", 2), Some(0));
    }

    #[test]
    fn absolute_slide_is_one_based() {
        assert_eq!(resolve_slide_index("1", 7), Some(0));
        assert_eq!(resolve_slide_index("12", 0), Some(11));
    }

    #[test]
    fn zero_retriggers_current_slide() {
        assert_eq!(resolve_slide_index("0", 6), Some(6));
        assert_eq!(resolve_slide_index("abc", 6), Some(6));
    }

    #[test]
    fn garbage_relative_delta_is_nan() {
        assert_eq!(resolve_slide_index("+x", 6), None);
    }

    #[test]
    fn presentation_path_resolution() {
        assert_eq!(resolve_presentation_path("", "1:1"), "1:1");
        assert_eq!(resolve_presentation_path("5", "3:2"), "3:5");
        assert_eq!(resolve_presentation_path("5", "0.2.1:9"), "0.2.1:5");
        assert_eq!(resolve_presentation_path("4.1:3", "3:2"), "4.1:3");
    }

    #[test]
    fn group_path_falls_back_to_observed() {
        assert_eq!(resolve_group_path("", Some("2:4")), Some("2:4".into()));
        assert_eq!(resolve_group_path("1:0", Some("2:4")), Some("1:0".into()));
        assert_eq!(resolve_group_path("", None), None);
        assert_eq!(resolve_group_path("", Some("undefined")), None);
        assert_eq!(resolve_group_path("undefined", Some("2:4")), None);
    }

    #[test]
    fn index_bias() {
        assert_eq!(wire_index("1"), Some(0));
        assert_eq!(wire_index("3"), Some(2));
        assert_eq!(wire_index("0"), None);
        assert_eq!(wire_index(""), None);
        assert_eq!(wire_index("undefined"), None);
        assert_eq!(wire_index("-2"), None);
    }

    #[test]
    fn path_shape() {
        assert!(is_valid_presentation_path(""));
        assert!(is_valid_presentation_path("12"));
        assert!(is_valid_presentation_path("0:3"));
        assert!(is_valid_presentation_path("0.1.2:3"));
        assert!(!is_valid_presentation_path("0.:3"));
        assert!(!is_valid_presentation_path(":3"));
        assert!(!is_valid_presentation_path("a:3"));
        assert!(!is_valid_presentation_path("1:"));
    }
}
