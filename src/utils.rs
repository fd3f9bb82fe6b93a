use crate::errors::ServerError;

/// Parses a numeric path segment, reporting `what` (e.g. "note ID") on failure.
pub fn parse_id(raw: &str, what: &'static str) -> Result<i32, ServerError> {
    raw.trim().parse::<i32>().map_err(|_| ServerError::InvalidId(what))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_ids() {
        assert_eq!(parse_id("42", "note ID").unwrap(), 42);
    }

    #[test]
    fn rejects_anything_else() {
        for raw in ["abc", "12abc", "", "1.5", "99999999999"] {
            let err = parse_id(raw, "note ID").unwrap_err();
            assert_eq!(err.to_string(), "Invalid note ID");
        }
    }
}
