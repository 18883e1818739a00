//! Normalization of untrusted client text
//!
//! Usernames are cleaned and truncated; messages are only trimmed, since an
//! oversized message is rejected by the hub rather than shortened.

/// Longest username kept after sanitizing, in characters
pub const MAX_USERNAME_CHARS: usize = 20;

/// Longest accepted message after trimming, in characters
pub const MAX_MESSAGE_CHARS: usize = 300;

/// Clean a requested display name.
///
/// Whitespace runs collapse to a single space, C0 control characters and
/// DEL are removed, and the result is trimmed and cut to
/// [`MAX_USERNAME_CHARS`]. Returns an empty string when nothing printable
/// remains; the caller picks a fallback.
///
/// The output never starts or ends with a space, even when a control
/// character sat next to whitespace or truncation stopped after a space.
pub fn sanitize_username(raw: &str) -> String {
    let mut collapsed = String::with_capacity(raw.len());
    let mut in_space = false;

    for ch in raw.chars() {
        if ch.is_whitespace() {
            if !in_space {
                collapsed.push(' ');
                in_space = true;
            }
        } else if !ch.is_ascii_control() {
            collapsed.push(ch);
            in_space = false;
        }
    }

    let truncated: String = collapsed
        .trim()
        .chars()
        .take(MAX_USERNAME_CHARS)
        .collect();

    // Truncation can stop right after a space
    truncated.trim_end().to_string()
}

/// Trim surrounding whitespace from a chat message
pub fn trim_message(raw: &str) -> &str {
    raw.trim()
}

/// Length of a message as counted against [`MAX_MESSAGE_CHARS`]
pub fn message_len(text: &str) -> usize {
    text.chars().count()
}
