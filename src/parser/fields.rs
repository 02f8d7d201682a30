//! Lenient accessors over stored configuration JSON
//!
//! Panel operators fill node configuration by hand, so ports arrive as strings,
//! booleans as `"1"`, and lists as comma separated text. Every accessor here
//! accepts those spellings and treats anything unusable as absent.

use serde_json::Value;

/// First non-empty scalar under any of `keys`, rendered as a string
pub fn string(section: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| scalar_to_string(section.get(*key)?))
}

/// First value under any of `keys` that parses as a port
pub fn port(section: &Value, keys: &[&str]) -> Option<u16> {
    keys.iter().find_map(|key| match section.get(*key)? {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u16>().ok(),
        _ => None,
    })
    .filter(|port| *port > 0)
}

/// First value under any of `keys` that parses as an unsigned number
pub fn number(section: &Value, keys: &[&str]) -> Option<u32> {
    keys.iter().find_map(|key| match section.get(*key)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    })
}

/// Truthiness of the first present key: `true`, non-zero numbers, `"1"`, `"true"`, `"tls"`
pub fn flag(section: &Value, keys: &[&str]) -> bool {
    keys.iter()
        .find_map(|key| section.get(*key))
        .map(|value| match value {
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
            Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "tls"),
            _ => false,
        })
        .unwrap_or(false)
}

/// First non-empty list under any of `keys`; accepts arrays and comma separated strings
pub fn list(section: &Value, keys: &[&str]) -> Vec<String> {
    for key in keys {
        let items: Vec<String> = match section.get(*key) {
            Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
            Some(Value::String(s)) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            _ => continue,
        };
        if !items.is_empty() {
            return items;
        }
    }
    Vec::new()
}

fn scalar_to_string(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_skips_empty_values() {
        let section = json!({"sni": "", "server_name": "a.example.com", "port": 443});
        assert_eq!(
            string(&section, &["sni", "server_name"]),
            Some("a.example.com".to_string())
        );
        assert_eq!(string(&section, &["port"]), Some("443".to_string()));
        assert_eq!(string(&section, &["missing"]), None);
    }

    #[test]
    fn test_port_accepts_strings() {
        assert_eq!(port(&json!({"port": "8443"}), &["port"]), Some(8443));
        assert_eq!(port(&json!({"port": 70000}), &["port"]), None);
        assert_eq!(port(&json!({"port": 0}), &["port"]), None);
    }

    #[test]
    fn test_list_normalizes_commas() {
        let section = json!({"short_ids": " ab12, ,cd34 "});
        assert_eq!(list(&section, &["short_ids"]), vec!["ab12", "cd34"]);
        let section = json!({"short_ids": ["ab12", 7]});
        assert_eq!(list(&section, &["short_ids"]), vec!["ab12", "7"]);
    }

    #[test]
    fn test_flag_spellings() {
        assert!(flag(&json!({"tls": "1"}), &["tls"]));
        assert!(flag(&json!({"tls": 1}), &["tls"]));
        assert!(!flag(&json!({"tls": "none"}), &["tls"]));
        assert!(!flag(&json!({}), &["tls"]));
    }
}
