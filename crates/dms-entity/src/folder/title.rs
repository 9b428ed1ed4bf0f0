//! Folder title sanitization.

/// Characters the blob storage and WebDAV clients cannot handle in a title.
pub const INVALID_CHARACTERS: [char; 12] =
    ['[', ']', '/', '\\', '?', '"', ':', '<', '>', '#', '%', '*'];

/// Title used when nothing is left after sanitization.
pub const UNTITLED: &str = "Untitled";

/// Returns a title that is safe for the storage layer.
///
/// Invalid characters become dots, runs of dots collapse into one, and
/// trailing dots and surrounding whitespace are removed. The result is a
/// fixed point: sanitizing it again returns it unchanged.
pub fn valid_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        let c = if INVALID_CHARACTERS.contains(&c) { '.' } else { c };
        if c == '.' && out.ends_with('.') {
            continue;
        }
        out.push(c);
    }

    let trimmed = out
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace())
        .trim_start();

    if trimmed.is_empty() {
        UNTITLED.to_string()
    } else {
        trimmed.to_string()
    }
}
