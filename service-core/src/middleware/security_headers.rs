use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::IntoResponse,
};

/// Paths answered by API handlers. Anything else is treated as a page or
/// static asset.
#[derive(Debug, Clone, Copy)]
pub struct ApiPaths(pub &'static [&'static str]);

impl ApiPaths {
    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(&path)
    }
}

/// Use with `from_fn_with_state(ApiPaths(..), security_headers_middleware)`.
pub async fn security_headers_middleware(
    State(api_paths): State<ApiPaths>,
    req: Request,
    next: Next,
) -> impl IntoResponse {
    let is_api_route = api_paths.contains(req.uri().path());

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::REFERRER_POLICY,
        header::HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    if is_api_route {
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        );
        headers.insert(
            header::X_FRAME_OPTIONS,
            header::HeaderValue::from_static("DENY"),
        );
    } else {
        // Pages may ship inline script and style and embed remote images.
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static(
                "default-src 'self'; \
                 script-src 'self' 'unsafe-inline'; \
                 style-src 'self' 'unsafe-inline'; \
                 img-src 'self' data: https:; \
                 connect-src 'self'",
            ),
        );
        headers.insert(
            header::X_FRAME_OPTIONS,
            header::HeaderValue::from_static("SAMEORIGIN"),
        );
    }

    response
}
