/// Truncate a string to at most `max_len` characters, adding an ellipsis
/// if needed. Counts characters, not bytes.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Case-insensitive substring check. `needle` should already be lowercased.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(needle)
}

/// Fixed-width bar for an attendance percentage, e.g. `[#######---]`.
pub fn attendance_bar(percent: u8, width: usize) -> String {
    let filled = (usize::from(percent.min(100)) * width + 50) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Pad or cut `s` to exactly `width` characters.
pub fn fit(s: &str, width: usize) -> String {
    format!("{:<width$}", truncate(s, width), width = width)
}
