//! Name canonicalization used for fuzzy identity comparison.

/// Canonicalizes a raw name for comparison. Total: a missing name yields an
/// empty string and malformed input degrades rather than failing.
///
/// Lower-cases, strips characters that are neither word characters nor
/// whitespace (commas survive so the reorder rule below can see them),
/// rewrites a `Last, First` form into `first last` when the comma splits
/// the name into exactly two non-empty parts, collapses whitespace runs,
/// and trims. Inputs with zero or more than one comma keep their comma
/// form untouched. Idempotent.
pub fn normalize_name(name: Option<&str>) -> String {
    let Some(name) = name else {
        return String::new();
    };

    let cleaned: String = name
        .to_lowercase()
        .chars()
        .filter(|ch| ch.is_alphanumeric() || *ch == '_' || *ch == ',' || ch.is_whitespace())
        .collect();

    let parts: Vec<&str> = cleaned.split(',').map(str::trim).collect();
    let reordered = if parts.len() == 2 && parts.iter().all(|part| !part.is_empty()) {
        format!("{} {}", parts[1], parts[0])
    } else {
        cleaned
    };

    collapse_whitespace(&reordered)
}

fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.trim().chars() {
        if ch.is_whitespace() {
            pending_space = true;
        } else {
            if pending_space && !result.is_empty() {
                result.push(' ');
            }
            pending_space = false;
            result.push(ch);
        }
    }
    result
}
