//! Filename sanitization for names derived from URLs.

/// Replaces characters that cannot appear in a single Linux path component.
///
/// - Replaces NUL, `/`, `\` and control characters with `_`
/// - Limits length to 255 bytes (Linux NAME_MAX)
///
/// Spaces and dots are preserved: the derived name should match what the
/// server calls the file.
pub fn sanitize_file_name(name: &str) -> String {
    const NAME_MAX: usize = 255;

    let out: String = name
        .chars()
        .map(|c| {
            if c == '\0' || c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    if out.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !out.is_char_boundary(take) {
            take -= 1;
        }
        out[..take].to_string()
    } else {
        out
    }
}
