//! Shared utility helpers.

/// Case-insensitive starts_with check without allocating.
#[inline]
pub fn starts_with_ci(haystack: &str, needle: &str) -> bool {
    haystack.len() >= needle.len()
        && haystack.as_bytes()[..needle.len()].eq_ignore_ascii_case(needle.as_bytes())
}

/// Case-insensitive equality of two optional names. Absent on either side
/// counts as equal, so only names present on both sides are compared.
#[inline]
pub fn eq_ci_if_present(left: Option<&str>, right: Option<&str>) -> bool {
    match (left, right) {
        (Some(l), Some(r)) => l.eq_ignore_ascii_case(r),
        _ => true,
    }
}

/// Lookup key for case-insensitive maps.
#[inline]
pub fn ci_key(name: &str) -> String {
    name.to_lowercase()
}

/// Dotted, case-insensitive key for a multi-part object name.
pub fn ci_full_key(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.to_lowercase())
        .collect::<Vec<_>>()
        .join(".")
}

/// `#local` and `##global` temp tables live only for the session that made them.
#[inline]
pub fn is_temp_table_name(name: &str) -> bool {
    name.starts_with('#')
}
