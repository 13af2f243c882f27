//! Key validation helpers.

/// Returns true if the string is empty or only whitespace.
#[must_use]
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Returns true if the value is absent, empty or only whitespace.
#[must_use]
pub fn is_blank_opt(value: Option<&str>) -> bool {
    value.is_none_or(is_blank)
}
