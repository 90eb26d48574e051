//! Wire shape of the provider's token endpoint response.

use serde::{Deserialize, Deserializer, Serialize};

/// Token endpoint response body.
///
/// Every field defaults to empty, so a body using unexpected field names
/// still decodes; callers must check [`ProviderToken::is_valid`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderToken {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub access_token: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub token_type: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub expires_in: String,
}

impl ProviderToken {
    /// Return `true` if the provider populated the access token.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty()
    }
}

/// Treat an explicit `null` like an absent field.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept `"3600"`, `3600`, or `null` for numeric-ish fields.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_well_formed() {
        let t: ProviderToken = serde_json::from_value(json!({
            "access_token": "t1",
            "token_type": "type1",
            "expires_in": "10000"
        }))
        .unwrap();
        assert_eq!(t.access_token, "t1");
        assert_eq!(t.token_type, "type1");
        assert_eq!(t.expires_in, "10000");
        assert!(t.is_valid());
    }

    #[test]
    fn test_decode_numeric_expiry() {
        let t: ProviderToken =
            serde_json::from_value(json!({ "access_token": "t1", "expires_in": 3600 })).unwrap();
        assert_eq!(t.expires_in, "3600");
        assert!(t.token_type.is_empty());
    }

    #[test]
    fn test_decode_mismatched_fields_is_invalid() {
        let t: ProviderToken =
            serde_json::from_value(json!({ "xx": "t1", "xx2": "type1", "xx3": "10000" }))
                .unwrap();
        assert!(!t.is_valid());
        assert_eq!(t, ProviderToken::default());
    }

    #[test]
    fn test_decode_null_fields_are_empty() {
        let t: ProviderToken = serde_json::from_value(json!({
            "access_token": null,
            "token_type": null,
            "expires_in": "10"
        }))
        .unwrap();
        assert!(!t.is_valid());
        assert!(t.token_type.is_empty());
        assert_eq!(t.expires_in, "10");
    }

    #[test]
    fn test_decode_rejects_object_expiry() {
        let r = serde_json::from_value::<ProviderToken>(json!({ "expires_in": {} }));
        assert!(r.is_err());
    }
}
