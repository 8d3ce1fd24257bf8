// Resolves the caller's session from its signed cookie (or mints a new id) and
// runs the request inside a span tagged with the session and a hashed client
// address. Nothing is stored until a handler saves a result.

use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{info_span, warn, Instrument};

use crate::models::AppState;
use crate::session::{session_cookie, session_from_headers, SessionId};
use crate::utils::client_fingerprint;

/// Peer address of the connection, when the server was started with connect info.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

pub async fn session_middleware(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let secret = state.config.session.secret.as_str();

    let existing = session_from_headers(req.headers(), secret);
    if let Some(id) = &existing {
        state.sessions.touch(id).await;
    }
    let issued = existing.is_none();
    let session = existing.unwrap_or_else(SessionId::generate);

    let (mut parts, body) = req.into_parts();
    let client_ip = ConnectInfo::<SocketAddr>::from_request_parts(&mut parts, &state)
        .await
        .ok()
        .map(|ConnectInfo(addr)| ClientIp(addr.ip()));
    let mut req = Request::from_parts(parts, body);

    let client = client_ip
        .map(|ClientIp(ip)| client_fingerprint(&ip.to_string(), secret))
        .unwrap_or_else(|| "unknown".to_string());

    let span = info_span!("request", session = %session.short(), client = %client);
    req.extensions_mut().insert(session.clone());
    if let Some(ip) = client_ip {
        req.extensions_mut().insert(ip);
    }

    let mut response = next.run(req).instrument(span).await;

    if issued {
        let cookie = session_cookie(&session.signed(secret), state.config.session.cookie_secure);
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => warn!("Could not encode session cookie: {}", e),
        }
    }

    response
}
