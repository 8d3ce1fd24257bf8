// Per-client limit on summary generation, backed by governor

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::warn;

use crate::middleware::session::ClientIp;
use crate::models::AppState;
use crate::session::SessionId;
use crate::types::AppError;

#[derive(Clone)]
pub struct GenerateLimiter {
    inner: Option<Arc<DefaultKeyedRateLimiter<String>>>,
}

impl GenerateLimiter {
    /// `per_minute == 0` disables limiting.
    pub fn new(per_minute: u32) -> Self {
        let inner = NonZeroU32::new(per_minute)
            .map(|burst| Arc::new(RateLimiter::keyed(Quota::per_minute(burst))));
        Self { inner }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Consume one permit for `key`. Returns false when the key is over quota.
    pub fn check(&self, key: &str) -> bool {
        match &self.inner {
            Some(limiter) => limiter.check_key(&key.to_string()).is_ok(),
            None => true,
        }
    }

    /// Drop keys whose quota has fully replenished.
    pub fn prune(&self) {
        if let Some(limiter) = &self.inner {
            limiter.retain_recent();
            limiter.shrink_to_fit();
        }
    }

    pub fn tracked_keys(&self) -> usize {
        self.inner.as_ref().map_or(0, |limiter| limiter.len())
    }
}

/// The peer address when known, so clearing cookies does not reset the quota.
fn limit_key(req: &Request) -> String {
    if let Some(ClientIp(ip)) = req.extensions().get::<ClientIp>() {
        return format!("ip:{}", ip);
    }
    req.extensions()
        .get::<SessionId>()
        .map(|id| format!("session:{}", id))
        .unwrap_or_else(|| "anonymous".to_string())
}

pub async fn rate_limiter_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let allowed = state.limiter.check(&limit_key(&req));
    state.limiter.prune();

    if !allowed {
        warn!("Summary rate limit reached");
        return Err(AppError::RateLimited);
    }

    Ok(next.run(req).await)
}
