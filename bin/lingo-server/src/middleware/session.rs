//! Session identity.
//!
//! The id comes from the `x-session-id` header, then the `lingo_session`
//! cookie. A request carrying neither gets a freshly minted id, which is
//! returned to the client in a `Set-Cookie` header. Handlers read the
//! resolved id through the [`SessionId`] request extension.

use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};
use uuid::Uuid;

pub static X_SESSION_ID: &str = "x-session-id";
pub const SESSION_COOKIE: &str = "lingo_session";

const MAX_SESSION_ID_LEN: usize = 128;

/// Opaque per-client session key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn mint() -> Self {
        Self(format!("session_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub async fn session_middleware(mut req: Request, next: Next) -> Response {
    let resolved = resolve(req.headers());
    let minted = resolved.is_none();
    let session = resolved.unwrap_or_else(SessionId::mint);
    if minted {
        debug!(session_id = %session, "minted session id");
    }

    let cookie = minted.then(|| set_cookie(&session));
    req.extensions_mut().insert(session);

    let mut response = next.run(req).await;
    match cookie {
        Some(Ok(value)) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Some(Err(e)) => warn!(error = %e, "session cookie is not a valid header value"),
        None => {}
    }
    response
}

/// Session id carried by the request, if any.
fn resolve(headers: &HeaderMap) -> Option<SessionId> {
    let from_header = headers
        .get(X_SESSION_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| is_valid(id));

    from_header
        .or_else(|| cookie_value(headers, SESSION_COOKIE).filter(|id| is_valid(id)))
        .map(|id| SessionId(id.to_owned()))
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
}

fn is_valid(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_SESSION_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

fn set_cookie(session: &SessionId) -> Result<HeaderValue, header::InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={session}; Path=/; HttpOnly; SameSite=Lax"
    ))
}
