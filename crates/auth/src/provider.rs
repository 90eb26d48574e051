//! Authorization Code OAuth client for the APS identity provider.
//!
//! The provider serves three fixed endpoints under one base URL:
//! `/authorize`, `/token` and `/userinfo`. The client holds credentials and
//! endpoint knowledge only; per-attempt state lives in [`LoginSession`].
use aps_types::{ApsError, CallbackParams, ProviderToken, Result, UserProfile};
use reqwest::{Client, Url, header::ACCEPT};
use std::fmt;

use crate::LoginSession;

/// Default base URL of the provider.
pub const DEFAULT_BASE_URL: &str = "http://localhost:9096";
pub const AUTHORIZE_PATH: &str = "/authorize";
pub const TOKEN_PATH: &str = "/token";
pub const USERINFO_PATH: &str = "/userinfo";

/// Credentials and endpoints for one registered OAuth application.
///
/// All operations take `&self`, so one client can drive many concurrent
/// [`LoginSession`]s.
#[derive(Clone)]
pub struct ProviderClient {
    client_key: String,
    client_secret: String,
    callback_url: String,
    scopes: Vec<String>,
    prompt: Option<String>,
    authorize_endpoint: String,
    token_endpoint: String,
    userinfo_endpoint: String,
    http: Client,
}

impl ProviderClient {
    /// Create a client against [`DEFAULT_BASE_URL`]. Scopes keep the given order.
    pub fn new<I, S>(
        client_key: impl Into<String>,
        client_secret: impl Into<String>,
        callback_url: impl Into<String>,
        scopes: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            client_key: client_key.into(),
            client_secret: client_secret.into(),
            callback_url: callback_url.into(),
            scopes: scopes.into_iter().map(Into::into).collect(),
            prompt: None,
            authorize_endpoint: format!("{DEFAULT_BASE_URL}{AUTHORIZE_PATH}"),
            token_endpoint: format!("{DEFAULT_BASE_URL}{TOKEN_PATH}"),
            userinfo_endpoint: format!("{DEFAULT_BASE_URL}{USERINFO_PATH}"),
            http: Client::new(),
        }
    }

    /// Point all three endpoints at a different base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        self.authorize_endpoint = format!("{base}{AUTHORIZE_PATH}");
        self.token_endpoint = format!("{base}{TOKEN_PATH}");
        self.userinfo_endpoint = format!("{base}{USERINFO_PATH}");
        self
    }

    /// Use a preconfigured HTTP client (timeouts, proxies, TLS roots).
    #[must_use]
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// Set the `prompt` hint (e.g. `consent`) added to authorization URLs.
    /// The last value set wins.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = Some(prompt.into());
    }

    #[must_use]
    pub fn client_key(&self) -> &str {
        &self.client_key
    }

    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    #[must_use]
    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }

    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    #[must_use]
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    #[must_use]
    pub fn authorize_endpoint(&self) -> &str {
        &self.authorize_endpoint
    }

    #[must_use]
    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint
    }

    #[must_use]
    pub fn userinfo_endpoint(&self) -> &str {
        &self.userinfo_endpoint
    }

    /// Start a login attempt by building the authorization URL.
    ///
    /// Query parameters are sorted by key; repeated `scope` keys keep the
    /// configured order. `state` is omitted when empty.
    ///
    /// # Errors
    ///
    /// Returns [`ApsError::InvalidEndpoint`] if the authorize endpoint is not a URL.
    pub fn begin_login(&self, state: &str) -> Result<LoginSession> {
        let mut url = Url::parse(&self.authorize_endpoint).map_err(|e| {
            ApsError::InvalidEndpoint(format!("{}: {e}", self.authorize_endpoint))
        })?;

        let mut params = vec![
            ("client_id", self.client_key.as_str()),
            ("redirect_uri", self.callback_url.as_str()),
            ("response_type", "code"),
        ];
        if let Some(prompt) = &self.prompt {
            params.push(("prompt", prompt.as_str()));
        }
        params.extend(self.scopes.iter().map(|s| ("scope", s.as_str())));
        if !state.is_empty() {
            params.push(("state", state));
        }
        params.sort_by_key(|&(key, _)| key);
        url.query_pairs_mut().extend_pairs(params);

        let state = (!state.is_empty()).then(|| state.to_string());
        Ok(LoginSession::new(String::from(url), state))
    }

    /// Exchange the callback's authorization code for an access token.
    ///
    /// On success the token is stored on `session` and returned. On failure
    /// the session is left untouched.
    ///
    /// # Errors
    ///
    /// - [`ApsError::SessionAlreadyAuthorized`] if the session already holds a token.
    /// - [`ApsError::StateMismatch`] if the callback `state` differs from the session's.
    /// - [`ApsError::ExchangeFailed`] if the callback carries an `error`, lacks a
    ///   `code`, or the token request fails, returns a non-2xx status, or has an
    ///   undecodable body.
    /// - [`ApsError::InvalidToken`] if the decoded token has no access token.
    pub async fn exchange_code<P>(&self, session: &mut LoginSession, params: &P) -> Result<String>
    where
        P: CallbackParams + ?Sized,
    {
        if session.is_authorized() {
            return Err(ApsError::SessionAlreadyAuthorized);
        }

        if let Some(error) = params.param("error").filter(|e| !e.is_empty()) {
            let description = params.param("error_description").unwrap_or_default();
            return Err(ApsError::ExchangeFailed(format!(
                "provider returned error: {error} {description}"
            )));
        }

        if let Some(expected) = session.state() {
            if params.param("state").as_deref() != Some(expected) {
                return Err(ApsError::StateMismatch);
            }
        }

        let code = params
            .param("code")
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ApsError::ExchangeFailed("missing code parameter in callback".into()))?;

        let form = [
            ("client_id", self.client_key.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.callback_url.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
        ];

        tracing::debug!(endpoint = %self.token_endpoint, "exchanging authorization code");
        let resp = self
            .http
            .post(&self.token_endpoint)
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| ApsError::ExchangeFailed(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "token endpoint rejected the exchange");
            return Err(ApsError::ExchangeFailed(format!(
                "status={}, body={body}",
                status.as_u16()
            )));
        }

        let token: ProviderToken = resp
            .json()
            .await
            .map_err(|e| ApsError::ExchangeFailed(format!("failed to parse token response: {e}")))?;

        if !token.is_valid() {
            tracing::warn!("token response has no access_token");
            return Err(ApsError::InvalidToken);
        }

        session.authorize(token.access_token.clone());
        Ok(token.access_token)
    }

    /// Fetch the profile of the user the session's token belongs to.
    ///
    /// # Errors
    ///
    /// - [`ApsError::ProfileFetchFailed`] if the session holds no token, or the
    ///   request fails or returns a non-2xx status.
    /// - [`ApsError::ProfileDecodeFailed`] if the body is not a valid profile.
    pub async fn fetch_profile(&self, session: &LoginSession) -> Result<UserProfile> {
        if !session.is_authorized() {
            return Err(ApsError::ProfileFetchFailed(
                "session holds no access token".into(),
            ));
        }

        tracing::debug!(endpoint = %self.userinfo_endpoint, "fetching user profile");
        let resp = self
            .http
            .get(&self.userinfo_endpoint)
            .query(&[("access_token", session.access_token())])
            .send()
            .await
            .map_err(|e| ApsError::ProfileFetchFailed(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "userinfo endpoint returned an error");
            return Err(ApsError::ProfileFetchFailed(format!(
                "status={}",
                status.as_u16()
            )));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| ApsError::ProfileFetchFailed(e.to_string()))?;
        let raw: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|e| ApsError::ProfileDecodeFailed(e.to_string()))?;
        UserProfile::from_json(raw).map_err(|e| ApsError::ProfileDecodeFailed(e.to_string()))
    }
}

impl fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderClient")
            .field("client_key", &self.client_key)
            .field("client_secret", &"<redacted>")
            .field("callback_url", &self.callback_url)
            .field("scopes", &self.scopes)
            .field("prompt", &self.prompt)
            .field("authorize_endpoint", &self.authorize_endpoint)
            .field("token_endpoint", &self.token_endpoint)
            .field("userinfo_endpoint", &self.userinfo_endpoint)
            .finish_non_exhaustive()
    }
}
