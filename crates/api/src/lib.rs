//! Omniswap API
//!
//! HTTP surface of the gateway: the router, handlers, the uniform response
//! envelope and the inbound rate-limit guard.

pub mod handlers;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod rate_limit;
pub mod router;
pub mod security;
pub mod state;

pub use rate_limit::RateLimitGuard;
pub use router::create_router;
pub use state::AppState;
