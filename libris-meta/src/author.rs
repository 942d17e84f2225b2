//! Author name normalization
//!
//! Library catalogs often spell authors "Last, First". The catalog displays
//! "First Last", so provider author lists pass through [`normalize`] before
//! they are joined.

/// Rewrite "Last, First" as "First Last"
///
/// Splits on the first comma only. If either side is blank after trimming,
/// the trimmed input is returned unchanged.
pub fn normalize(name: &str) -> String {
    let name = name.trim();

    if let Some((last, first)) = name.split_once(',') {
        let (last, first) = (last.trim(), first.trim());
        if !last.is_empty() && !first.is_empty() {
            return format!("{} {}", first, last);
        }
    }

    name.to_string()
}

/// Normalize every name and join with ", "
///
/// Names that normalize to an empty string are dropped. Returns `None` when
/// nothing is left.
pub fn join_authors<S: AsRef<str>>(names: &[S]) -> Option<String> {
    let normalized: Vec<String> = names
        .iter()
        .map(|name| normalize(name.as_ref()))
        .filter(|name| !name.is_empty())
        .collect();

    if normalized.is_empty() {
        None
    } else {
        Some(normalized.join(", "))
    }
}
