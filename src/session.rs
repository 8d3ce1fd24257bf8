use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{header, HeaderMap};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::SummaryResult;

pub const SESSION_COOKIE: &str = "digest_session";

type HmacSha256 = Hmac<Sha256>;

/// Opaque per-browser identifier carried in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Accepts only well-formed UUIDs, normalized to lowercase hyphenated form.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(|id| Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Cookie value: the id followed by its HMAC-SHA256 under `secret`.
    pub fn signed(&self, secret: &str) -> String {
        match HmacSha256::new_from_slice(secret.as_bytes()) {
            Ok(mut mac) => {
                mac.update(self.0.as_bytes());
                format!("{}.{}", self.0, hex::encode(mac.finalize().into_bytes()))
            }
            Err(_) => self.0.clone(),
        }
    }

    /// Inverse of [`SessionId::signed`]. Unsigned or tampered values are rejected.
    pub fn verify(value: &str, secret: &str) -> Option<Self> {
        let (raw, tag) = value.trim().split_once('.')?;
        let id = Self::parse(raw)?;
        let tag = hex::decode(tag).ok()?;

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
        mac.update(id.0.as_bytes());
        mac.verify_slice(&tag).ok()?;
        Some(id)
    }

    /// First block of the UUID, enough to correlate log lines.
    pub fn short(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
struct SessionEntry {
    result: SummaryResult,
    last_seen: Instant,
}

/// In-memory session table. Entries idle for longer than `ttl` are dropped
/// the next time the table is written.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<SessionId, SessionEntry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Refresh a stored session's idle timer. Unknown ids are not recorded;
    /// a session only takes up room once it holds a result.
    pub async fn touch(&self, id: &SessionId) -> bool {
        let mut guard = self.inner.write().await;
        match guard.get_mut(id) {
            Some(entry) if entry.last_seen.elapsed() <= self.ttl => {
                entry.last_seen = Instant::now();
                true
            }
            Some(_) => {
                guard.remove(id);
                false
            }
            None => false,
        }
    }

    /// Replace the session's latest result.
    pub async fn put_result(&self, id: &SessionId, result: SummaryResult) {
        let mut guard = self.inner.write().await;
        Self::purge_locked(&mut guard, self.ttl);
        guard.insert(
            id.clone(),
            SessionEntry {
                result,
                last_seen: Instant::now(),
            },
        );
    }

    pub async fn latest(&self, id: &SessionId) -> Option<SummaryResult> {
        let guard = self.inner.read().await;
        guard
            .get(id)
            .filter(|entry| entry.last_seen.elapsed() <= self.ttl)
            .map(|entry| entry.result.clone())
    }

    /// Forget the session's result. The cookie stays valid.
    pub async fn clear(&self, id: &SessionId) -> bool {
        self.inner.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn purge_expired(&self) -> usize {
        let mut guard = self.inner.write().await;
        Self::purge_locked(&mut guard, self.ttl)
    }

    fn purge_locked(map: &mut HashMap<SessionId, SessionEntry>, ttl: Duration) -> usize {
        let before = map.len();
        map.retain(|_, entry| entry.last_seen.elapsed() <= ttl);
        before - map.len()
    }
}

/// Read the session id from the request's `Cookie` headers, if present and
/// signed with `secret`.
pub fn session_from_headers(headers: &HeaderMap, secret: &str) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| SessionId::verify(value, secret))
}

/// Browser-session cookie carrying a signed id. Idle expiry is enforced
/// server-side by [`SessionStore`].
pub fn session_cookie(value: &str, secure: bool) -> String {
    let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, value);
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
