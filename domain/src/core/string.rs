//! String utilities for the domain layer.

/// Truncate a string to at most `max_chars` characters (no ellipsis).
///
/// Counts Unicode scalar values, so multi-byte text is never split.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => s[..end].to_string(),
        None => s.to_string(),
    }
}

/// Number of characters in `s` (not bytes).
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Capitalize the first letter of an agent name for display (`"lyra"` → `"Lyra"`).
pub fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
