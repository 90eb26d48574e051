//! Unified error type for the aps-login workspace.

use thiserror::Error;

/// Enumerates all error kinds that can occur during a login attempt.
///
/// Every variant is scoped to the single attempt that produced it; callers
/// decide whether to restart the flow with a fresh session.
#[derive(Debug, Error)]
pub enum ApsError {
    /// Token exchange failed at the transport level, returned a non-success
    /// status, or produced an undecodable body.
    #[error("token exchange failed: {0}")]
    ExchangeFailed(String),

    /// The token endpoint answered, but the decoded token has no access token.
    #[error("Invalid token received from provider")]
    InvalidToken,

    /// Profile fetch failed at the transport level or returned a non-success status.
    #[error("profile fetch failed: {0}")]
    ProfileFetchFailed(String),

    /// The userinfo body could not be decoded into a profile.
    #[error("profile decode failed: {0}")]
    ProfileDecodeFailed(String),

    /// The session was never initialized by `begin_login`.
    #[error("login session has not been initialized")]
    UninitializedSession,

    /// The session already holds an access token.
    #[error("login session is already authorized")]
    SessionAlreadyAuthorized,

    /// The `state` returned by the provider does not match the session's.
    #[error("state mismatch, possible CSRF attack")]
    StateMismatch,

    /// A configured endpoint is not a valid URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The local redirect listener failed.
    #[error("callback error: {0}")]
    Callback(String),

    /// Configuration loading or validation error.
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApsError {
    /// Returns `true` if the error belongs to the token exchange leg.
    #[must_use]
    pub fn is_exchange_error(&self) -> bool {
        matches!(
            self,
            Self::ExchangeFailed(_)
                | Self::InvalidToken
                | Self::SessionAlreadyAuthorized
                | Self::StateMismatch
        )
    }

    /// Returns `true` if the error belongs to the profile fetch leg.
    #[must_use]
    pub fn is_profile_error(&self) -> bool {
        matches!(self, Self::ProfileFetchFailed(_) | Self::ProfileDecodeFailed(_))
    }
}
