pub mod filter;
pub mod folder;
pub mod note;
pub mod tag;
pub mod version;

/// Trims `value` and records `required_msg` if nothing is left.
pub(crate) fn required(value: Option<String>, required_msg: &str, errors: &mut Vec<String>) -> String {
    let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
    if value.is_empty() {
        errors.push(required_msg.to_string());
    }
    value
}

pub(crate) fn check_max_chars(value: &str, field: &str, max: usize, errors: &mut Vec<String>) {
    if value.chars().count() > max {
        errors.push(format!("{field} cannot exceed {max} characters"));
    }
}

/// Builds a case-insensitive `LIKE` pattern matching `needle` anywhere.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
