//! Comma-separated token lists with `,,` as an escaped literal comma.

const ESCAPED_COMMA: char = '\u{1}';
const SEPARATOR: char = '\u{2}';

/// Split `input` on single commas, keeping `,,` as a literal comma.
///
/// The replacement order matters: escaped pairs are claimed before the
/// remaining commas become separators.
pub fn split_tokens(input: &str) -> Vec<String> {
    input
        .replace(",,", &ESCAPED_COMMA.to_string())
        .replace(',', &SEPARATOR.to_string())
        .replace(ESCAPED_COMMA, ",")
        .split(SEPARATOR)
        .map(str::to_string)
        .collect()
}
