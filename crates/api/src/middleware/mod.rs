//! HTTP middleware for the API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. CORS
//! 3. `TraceLayer` (request tracing)
//! 4. Request ID (add unique ID to each request)
//! 5. Rate limiting on vote submission (governor)

pub mod rate_limit;
pub mod request_id;

pub use rate_limit::vote_rate_limiter;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
