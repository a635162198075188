//! API endpoint modules organized by category.
//!
//! Each module provides typed methods for a group of related endpoints.

pub mod account;
pub mod links;
pub mod magnets;
pub mod saved;

use serde::{Deserialize, Deserializer};

/// Identifiers arrive either as JSON strings or numbers depending on the
/// endpoint; both are kept as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Int(i64),
    Float(f64),
}

impl From<StringOrNumber> for String {
    fn from(v: StringOrNumber) -> Self {
        match v {
            StringOrNumber::String(s) => s,
            StringOrNumber::Int(n) => n.to_string(),
            StringOrNumber::Float(n) => n.to_string(),
        }
    }
}

pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

pub(crate) fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StringOrNumber>::deserialize(deserializer).map(|v| v.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "string_or_number")]
        id: String,
        #[serde(default, deserialize_with = "opt_string_or_number")]
        delayed: Option<String>,
    }

    #[test]
    fn test_string_or_number() {
        let p: Probe = serde_json::from_str(r#"{"id":"abc","delayed":123}"#).unwrap();
        assert_eq!(p.id, "abc");
        assert_eq!(p.delayed.as_deref(), Some("123"));

        let p: Probe = serde_json::from_str(r#"{"id":42}"#).unwrap();
        assert_eq!(p.id, "42");
        assert!(p.delayed.is_none());
    }
}
