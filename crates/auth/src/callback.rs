//! Local HTTP listener for the provider's redirect.
//!
//! Only requests whose path matches the registered callback path count as the
//! redirect; anything else the browser sends first (`/favicon.ico`, a stale
//! tab) is answered with 404 and the listener keeps waiting.

use aps_types::{ApsError, Result};
use reqwest::Url;
use std::{collections::HashMap, time::Duration};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const TIMEOUT: Duration = Duration::from_secs(120);

/// Bind the local callback port and return the listener.
///
/// Bind **before** sending the user to the provider, then call
/// [`accept_callback`] on the returned listener.
///
/// # Errors
///
/// Returns [`ApsError::Callback`] if the port is in use or cannot be bound.
pub async fn bind_callback(port: u16) -> Result<TcpListener> {
    TcpListener::bind(("127.0.0.1", port)).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::AddrInUse {
            ApsError::Callback(format!(
                "port {port} is already in use; stop the process holding it \
                 (`lsof -i :{port}`) or configure another callback_port"
            ))
        } else {
            ApsError::Callback(format!("cannot bind callback port {port}: {e}"))
        }
    })
}

/// Path component of the registered redirect URL, or `None` when the
/// callback URL is not absolute (any path is then accepted).
#[must_use]
pub fn callback_path(callback_url: &str) -> Option<String> {
    Url::parse(callback_url).ok().map(|u| u.path().to_string())
}

/// Wait for the redirect on `expected_path` and return its query parameters.
///
/// Times out after 120 seconds.
///
/// # Errors
///
/// Returns [`ApsError::Callback`] on accept/read failure, a request that is
/// not HTTP, or timeout.
pub async fn accept_callback(
    listener: TcpListener,
    expected_path: Option<&str>,
) -> Result<HashMap<String, String>> {
    accept_callback_within(listener, expected_path, TIMEOUT).await
}

async fn accept_callback_within(
    listener: TcpListener,
    expected_path: Option<&str>,
    timeout: Duration,
) -> Result<HashMap<String, String>> {
    let wait = async {
        loop {
            let (stream, peer) = listener
                .accept()
                .await
                .map_err(|e| ApsError::Callback(e.to_string()))?;
            if let Some(params) = serve_one(stream, expected_path).await? {
                return Ok(params);
            }
            tracing::debug!(%peer, "ignored request outside the callback path");
        }
    };

    tokio::time::timeout(timeout, wait)
        .await
        .map_err(|_| ApsError::Callback("timed out waiting for OAuth callback".into()))?
}

/// Answer one connection. Returns `None` when the request was not the redirect.
async fn serve_one(
    mut stream: TcpStream,
    expected_path: Option<&str>,
) -> Result<Option<HashMap<String, String>>> {
    let mut buf = vec![0u8; 8192];
    let n = stream
        .read(&mut buf)
        .await
        .map_err(|e| ApsError::Callback(e.to_string()))?;
    let request = String::from_utf8_lossy(&buf[..n]);

    let target = request_target(&request)?;
    let redirect = expected_path.is_none_or(|p| target.path() == p);
    let params: Option<HashMap<String, String>> =
        redirect.then(|| target.query_pairs().into_owned().collect());

    let page = match &params {
        None => response("404 Not Found", "<h1>Not found</h1>"),
        Some(p) => match p.get("error") {
            Some(error) => response(
                "400 Bad Request",
                &format!(
                    "<h1>Login failed</h1><p>The provider returned <code>{}</code>.</p>",
                    escape_html(error)
                ),
            ),
            None => response(
                "200 OK",
                "<h1>Login successful!</h1><p>You may close this tab.</p>",
            ),
        },
    };
    stream
        .write_all(page.as_bytes())
        .await
        .map_err(|e| ApsError::Callback(format!("write error: {e}")))?;
    let _ = stream.shutdown().await;

    Ok(params)
}

/// Resolve the request-target of `GET /path?query HTTP/1.1` against a dummy origin.
fn request_target(request: &str) -> Result<Url> {
    let mut parts = request.lines().next().unwrap_or("").split_ascii_whitespace();
    let (Some(_method), Some(target)) = (parts.next(), parts.next()) else {
        return Err(ApsError::Callback("malformed callback request".into()));
    };
    Url::parse("http://localhost")
        .and_then(|origin| origin.join(target))
        .map_err(|e| ApsError::Callback(format!("invalid callback target {target}: {e}")))
}

fn response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
