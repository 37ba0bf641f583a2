use std::sync::LazyLock;
use std::time::Duration;

use axum::http::{HeaderValue, request::Parts};
use regex::Regex;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// Local frontend dev server plus any preview deployment.
const ORIGIN_PATTERN: &str = r"^https?://(localhost:3000|.*\.vercel\.app)$";

static ORIGIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ORIGIN_PATTERN).expect("origin pattern should compile"));

#[must_use]
pub fn origin_allowed(origin: &str) -> bool {
    ORIGIN_RE.is_match(origin)
}

/// Credentialed CORS restricted to the allowed origins.
///
/// Methods and headers are mirrored from the preflight since wildcards are not
/// permitted alongside credentials.
#[must_use]
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            |origin: &HeaderValue, _parts: &Parts| origin.to_str().is_ok_and(origin_allowed),
        ))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .max_age(Duration::from_secs(60 * 60))
}
