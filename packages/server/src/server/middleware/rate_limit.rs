// Rate limiting middleware using tower-governor
//
// Per client IP, keyed on X-Forwarded-For / X-Real-IP / Forwarded when present
// and the peer address otherwise (SmartIpKeyExtractor). The peer address comes
// from `ConnectInfo`, so the router must be served with
// `into_make_service_with_connect_info::<SocketAddr>()`. `use_headers` only
// adds the x-ratelimit-* response headers.
//
// Applied in main.rs around the router built by `build_app`.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};

/// Wrap `router` in a per-IP limiter: `per_second` replenish rate, `burst`
/// requests allowed at once.
pub fn with_rate_limit(router: Router, per_second: u64, burst: u32) -> Result<Router> {
    let config = GovernorConfigBuilder::default()
        .per_second(per_second)
        .burst_size(burst)
        .key_extractor(SmartIpKeyExtractor)
        .use_headers()
        .finish()
        .context("invalid rate limit configuration (values must be non-zero)")?;

    Ok(router.layer(GovernorLayer {
        config: Arc::new(config),
    }))
}
