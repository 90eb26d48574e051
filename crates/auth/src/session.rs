//! Per-attempt login state carried between the two legs of the flow.
//!
//! A session is `Created` by [`ProviderClient::begin_login`] holding only the
//! authorization URL, and becomes `Authorized` once
//! [`ProviderClient::exchange_code`] stores the access token. A failed
//! exchange leaves it `Created`. Each login attempt gets a fresh session.
//!
//! [`ProviderClient::begin_login`]: crate::ProviderClient::begin_login
//! [`ProviderClient::exchange_code`]: crate::ProviderClient::exchange_code

use aps_types::{ApsError, Result};
use serde::{Deserialize, Serialize};

/// One in-flight authorization attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginSession {
    #[serde(default)]
    auth_url: String,
    #[serde(default)]
    access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state: Option<String>,
}

impl LoginSession {
    pub(crate) fn new(auth_url: String, state: Option<String>) -> Self {
        Self {
            auth_url,
            access_token: String::new(),
            state,
        }
    }

    /// Rebuild a session from values kept by the caller between requests.
    pub fn restore(auth_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            auth_url: auth_url.into(),
            access_token: access_token.into(),
            state: None,
        }
    }

    /// The URL the end user must be redirected to.
    ///
    /// # Errors
    ///
    /// Returns [`ApsError::UninitializedSession`] if the session was not
    /// produced by `begin_login`.
    pub fn auth_url(&self) -> Result<&str> {
        if self.auth_url.is_empty() {
            return Err(ApsError::UninitializedSession);
        }
        Ok(&self.auth_url)
    }

    /// The access token, empty until the code exchange succeeds.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    #[must_use]
    pub fn is_authorized(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// The `state` value sent on the authorization URL, if any.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub(crate) fn authorize(&mut self, access_token: String) {
        self.access_token = access_token;
    }

    /// Serialize the session to JSON for storage between the two round trips.
    ///
    /// # Errors
    ///
    /// Returns [`ApsError::Serialization`] if encoding fails.
    pub fn marshal(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Inverse of [`LoginSession::marshal`].
    ///
    /// # Errors
    ///
    /// Returns [`ApsError::Serialization`] if `data` is not a valid session.
    pub fn unmarshal(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }
}
