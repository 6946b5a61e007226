//! Global limits and defaults for configuration and runtime

/// Timeout for provider health probes in milliseconds
pub const HEALTH_PROBE_TIMEOUT_MS: u64 = 5_000; // 5s

/// Freshness window for cached provider health in seconds
pub const HEALTH_CACHE_TTL_SECONDS: u64 = 300; // 5 minutes

/// Timeout for individual quote requests in milliseconds
pub const QUOTE_TIMEOUT_MS: u64 = 15_000; // 15s

/// Timeout for transaction-assembly requests in milliseconds
pub const ASSEMBLE_TIMEOUT_MS: u64 = 15_000; // 15s

/// Maximum quote acquisition attempts inside the execution coordinator
pub const MAX_QUOTE_ATTEMPTS: u32 = 3;

/// Maximum transaction submission attempts inside the execution coordinator
pub const MAX_SUBMIT_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff between attempts in milliseconds
pub const RETRY_BASE_DELAY_MS: u64 = 1_000; // 1s, then 2s, 4s, ...

/// Ceiling for waiting on transaction confirmation in seconds
pub const CONFIRMATION_TIMEOUT_SECONDS: u64 = 300; // 5 minutes

/// Lifetime of a cached allowance-holder spender address in seconds
pub const SPENDER_CACHE_TTL_SECONDS: u64 = 86_400; // 24 hours

/// Inbound rate limit: requests per window per client IP
pub const RATE_LIMIT_MAX_REQUESTS: u32 = 100;

/// Inbound rate limit window duration in seconds
pub const RATE_LIMIT_WINDOW_SECONDS: u64 = 60;

/// Interval for the rate-limiter background cleanup task in seconds
pub const RATE_LIMIT_CLEANUP_INTERVAL_SECONDS: u64 = 60;

/// Default slippage tolerance in basis points when the request omits one
pub const DEFAULT_SLIPPAGE_BPS: u32 = 100; // 1%

/// Basis-point denominator for slippage and price-difference arithmetic
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Provider scoring: starting score before health and latency adjustments
pub const SCORE_BASE: i64 = 100;

/// Provider scoring: bonus applied to healthy providers
pub const SCORE_HEALTHY_BONUS: i64 = 50;

/// Provider scoring: penalty applied to unhealthy providers
pub const SCORE_UNHEALTHY_PENALTY: i64 = 100;

/// Provider scoring: latency bonus ceiling in milliseconds
pub const SCORE_LATENCY_CEILING_MS: i64 = 100;

/// Client-side validity window for an Odos path before it is re-quoted.
///
/// Odos documents a 60-second path lifetime; assembling inside the last
/// seconds of it races the upstream expiry, so the client treats paths older
/// than 55 seconds as already expired.
pub const ODOS_PATH_VALIDITY_SECONDS: i64 = 55;
