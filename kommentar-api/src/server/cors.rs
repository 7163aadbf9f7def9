use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Cross-origin policy for the whole router, including preflight replies.
/// With no configured allow-list every origin is admitted; a configured
/// list admits exactly the listed origins.
#[must_use]
pub fn layer(allowed_origins: Option<&str>) -> CorsLayer {
    let allow_origin = match allowed_origins {
        Some(list) => AllowOrigin::list(
            list.split(',')
                .filter_map(|origin| HeaderValue::from_str(origin.trim()).ok()),
        ),
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
