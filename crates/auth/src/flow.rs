//! Interactive login: redirect the user, wait for the callback, exchange the
//! code and fetch the profile with one [`LoginSession`].

use aps_types::{Result, UserProfile};
use rand::{Rng as _, distributions::Alphanumeric};
use tokio::net::TcpListener;

use crate::{LoginSession, ProviderClient, callback};

const STATE_LEN: usize = 32;

/// Run the full interactive login flow on the local callback `port`.
///
/// A fresh `state` is generated for the attempt and checked against the
/// redirect before the code is exchanged.
///
/// # Errors
///
/// Returns an error if the callback port cannot be bound, the redirect never
/// arrives, or any step of the exchange fails.
pub async fn login(client: &ProviderClient, port: u16, open_browser: bool) -> Result<UserProfile> {
    // Bind before redirecting so the callback cannot race the listener.
    let listener = callback::bind_callback(port).await?;
    login_with_listener(client, &new_state(), listener, open_browser).await
}

/// Same as [`login`], on a listener the caller has already bound and with a
/// caller-chosen `state`.
///
/// # Errors
///
/// See [`login`].
pub async fn login_with_listener(
    client: &ProviderClient,
    state: &str,
    listener: TcpListener,
    open_browser: bool,
) -> Result<UserProfile> {
    let mut session: LoginSession = client.begin_login(state)?;
    let auth_url = session.auth_url()?;
    if open_browser {
        open_in_browser(auth_url);
    } else {
        eprintln!("Open the following URL to log in:");
        eprintln!("{auth_url}");
    }

    let expected_path = callback::callback_path(client.callback_url());
    let params = callback::accept_callback(listener, expected_path.as_deref()).await?;
    client.exchange_code(&mut session, &params).await?;
    let profile = client.fetch_profile(&session).await?;
    tracing::info!(user_id = %profile.user_id, "login completed");
    Ok(profile)
}

fn new_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LEN)
        .map(char::from)
        .collect()
}

fn open_in_browser(url: &str) {
    eprintln!("Opening browser: {url}");
    if let Err(e) = open::that(url) {
        tracing::warn!(error = %e, "failed to open browser");
        eprintln!("Please open the following URL manually to complete login:");
        eprintln!("{url}");
    }
}
