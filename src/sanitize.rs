//! Text cleanup ahead of sentiment inference.
//!
//! Course codes (`CS1010S`, `MA1521`, ...) carry no sentiment and confuse the
//! classifier, so they are deleted outright. The result is then cut to a
//! character budget that stays under the model's token limit after subword
//! expansion.

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum number of characters handed to the classifier per text.
pub const MAX_SANITIZED_CHARS: usize = 1500;

/// More than this many course codes marks a body as noise (timetable dumps,
/// module lists) rather than discussion.
pub const MAX_COURSE_CODES: usize = 2;

/// 1-3 letters, exactly four digits, optional trailing letter.
static COURSE_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z]{1,3}[0-9]{4}[A-Za-z]?").expect("course code pattern is valid")
});

/// Count the course-code-like substrings in `text`.
pub fn course_code_count(text: &str) -> usize {
    COURSE_CODE.find_iter(text).count()
}

/// True when `text` mentions more course codes than a discussion would.
pub fn has_too_many_codes(text: &str) -> bool {
    course_code_count(text) > MAX_COURSE_CODES
}

/// Delete course codes and truncate to [`MAX_SANITIZED_CHARS`].
pub fn sanitize(text: &str) -> String {
    sanitize_with_limit(text, MAX_SANITIZED_CHARS)
}

/// Delete course codes and keep at most `max_chars` characters.
///
/// Truncation counts Unicode scalar values, so multi-byte characters are
/// never split.
pub fn sanitize_with_limit(text: &str, max_chars: usize) -> String {
    let stripped = COURSE_CODE.replace_all(text, "");
    match stripped.char_indices().nth(max_chars) {
        Some((cut, _)) => stripped[..cut].to_string(),
        None => stripped.into_owned(),
    }
}
