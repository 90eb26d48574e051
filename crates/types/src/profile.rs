//! Normalized user profile returned by the userinfo endpoint.

use serde::{Deserialize, Serialize};

/// The authenticated user's profile, derived entirely from the provider's response.
///
/// `id` is required; `email` and `location` are empty when the provider omits them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "id")]
    pub user_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub location: String,
    /// The decoded response body, kept for callers that need extra fields.
    #[serde(skip)]
    pub raw: serde_json::Value,
}

impl UserProfile {
    /// Decode a userinfo body, keeping a copy of the raw JSON.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the body is not an object, lacks
    /// `id`, or a field has a non-string value.
    pub fn from_json(raw: serde_json::Value) -> Result<Self, serde_json::Error> {
        let mut profile: Self = serde_json::from_value(raw.clone())?;
        profile.raw = raw;
        Ok(profile)
    }
}

impl PartialEq for UserProfile {
    fn eq(&self, other: &Self) -> bool {
        self.user_id == other.user_id && self.email == other.email && self.location == other.location
    }
}

impl Eq for UserProfile {}
