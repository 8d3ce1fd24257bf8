// Middleware for CORS, sessions and rate limiting

pub mod cors;
pub mod rate_limiter;
pub mod session;

pub use cors::*;
pub use rate_limiter::*;
pub use session::*;
