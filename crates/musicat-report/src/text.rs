//! Text shaping for the paginated document: the built-in PDF fonts only cover
//! printable ASCII here, everything else is replaced rather than rejected.

use std::borrow::Cow;

/// Stand-in for characters the document font cannot draw.
pub const SUBSTITUTION_MARKER: char = '?';

const ELLIPSIS: &str = "...";

/// Replace every character outside printable ASCII with [`SUBSTITUTION_MARKER`].
/// Tabs and newlines become spaces so a value stays on its line.
pub fn printable_ascii_lossy(text: &str) -> Cow<'_, str> {
    if text.chars().all(|c| matches!(c, ' '..='~')) {
        return Cow::Borrowed(text);
    }

    Cow::Owned(
        text.chars()
            .map(|c| match c {
                ' '..='~' => c,
                '\t' | '\n' | '\r' => ' ',
                _ => SUBSTITUTION_MARKER,
            })
            .collect(),
    )
}

/// Cut `text` to at most `max_chars` characters, ending in `...` when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> Cow<'_, str> {
    if text.chars().count() <= max_chars {
        return Cow::Borrowed(text);
    }
    if max_chars <= ELLIPSIS.len() {
        return Cow::Owned(text.chars().take(max_chars).collect());
    }

    let mut cut: String = text.chars().take(max_chars - ELLIPSIS.len()).collect();
    cut.push_str(ELLIPSIS);
    Cow::Owned(cut)
}
