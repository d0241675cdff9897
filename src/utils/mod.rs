use url::Url;

/// Last non-empty path segment of `url`, ignoring query and fragment.
pub fn last_path_segment(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}

/// Playback code embedded in slugs like `/e/show-name-episode-abc123.html`.
///
/// Drops the file extension, then keeps what follows the last `-`.
pub fn playback_code(url: &str) -> Option<String> {
    let segment = last_path_segment(url)?;
    let stem = match segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => stem,
        _ => segment.as_str(),
    };

    stem.rsplit('-')
        .next()
        .filter(|code| !code.is_empty())
        .map(str::to_string)
}

/// Cuts `s` to at most `max` chars for log lines.
pub fn preview(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
