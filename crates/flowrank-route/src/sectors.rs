//! Sector list normalization.
//!
//! The host wires the sector filter in whatever shape the flow author
//! produced: a JSON array, a JSON-encoded array string, a comma-separated
//! string, or one bare name. All of them normalize to a JSON-encoded
//! array of trimmed non-empty strings.

use serde_json::Value;

/// Normalize any accepted sector input to a JSON array string.
pub fn normalize_sectors(input: &Value) -> String {
    let sectors = match input {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            })
            .collect(),
        Value::String(s) => sectors_from_str(s),
        _ => Vec::new(),
    };

    let sectors: Vec<String> = sectors.into_iter().filter(|s| !s.is_empty()).collect();
    serde_json::to_string(&sectors).unwrap_or_else(|_| "[]".into())
}

fn sectors_from_str(input: &str) -> Vec<String> {
    let input = input.trim();
    if input.is_empty() {
        return Vec::new();
    }

    // JSON array first, then comma-separated, then a single bare name
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(input) {
        return items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            })
            .collect();
    }

    if input.contains(',') {
        return input.split(',').map(|s| s.trim().to_string()).collect();
    }

    vec![input.to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_array_input() {
        assert_eq!(
            normalize_sectors(&json!(["Apoio", " Sistemas "])),
            r#"["Apoio","Sistemas"]"#
        );
    }

    #[test]
    fn test_json_encoded_string() {
        assert_eq!(
            normalize_sectors(&json!("[\"Apoio\", \"Sistemas\"]")),
            r#"["Apoio","Sistemas"]"#
        );
    }

    #[test]
    fn test_comma_separated_string() {
        assert_eq!(
            normalize_sectors(&json!("Apoio, Sistemas")),
            r#"["Apoio","Sistemas"]"#
        );
    }

    #[test]
    fn test_bare_string() {
        assert_eq!(normalize_sectors(&json!("Apoio")), r#"["Apoio"]"#);
    }

    #[test]
    fn test_empty_and_blank_entries_dropped() {
        assert_eq!(normalize_sectors(&json!("")), "[]");
        assert_eq!(normalize_sectors(&json!(["", "  ", "Apoio"])), r#"["Apoio"]"#);
        assert_eq!(normalize_sectors(&json!(null)), "[]");
    }
}
