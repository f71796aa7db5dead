//! Utility module
//!
//! Text helpers shared by the codec and the engine.

/// Character terminating each node's contribution inside an aggregate
pub const FRAGMENT_TERMINATOR: char = ';';

/// Removes line terminators so the text fits on a single wire line
pub fn strip_line_terminators(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '\n' | '\r')).collect()
}

/// Makes a local result safe to embed as one contribution.
///
/// Line breaks become `|` (the sensor convention for multi-line output) and
/// fragment terminators become `,`.
pub fn sanitize_contribution(text: &str) -> String {
    text.trim_end_matches(['\r', '\n'])
        .chars()
        .map(|c| match c {
            '\n' | '\r' => '|',
            FRAGMENT_TERMINATOR => ',',
            other => other,
        })
        .collect()
}
