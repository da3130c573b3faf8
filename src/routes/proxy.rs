use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderName, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use super::AppState;

const API_PREFIX: &str = "/api";

/// Request bodies are buffered before forwarding; larger ones are refused.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

const HOP_BY_HOP: [HeaderName; 9] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::HOST,
];

/// Copy end-to-end headers only.
fn forwardable(headers: &HeaderMap, drop_cookies: bool) -> HeaderMap {
    headers
        .iter()
        .filter(|(name, _)| !HOP_BY_HOP.contains(*name))
        .filter(|(name, _)| !(drop_cookies && **name == header::COOKIE))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Upstream base joined with the request path minus its `/api` prefix. The
/// path is taken still percent-encoded so `%2F`, `%3F` and `%23` survive.
fn upstream_url(base: &str, uri: &Uri) -> String {
    let path = uri.path();
    let rest = path.strip_prefix(API_PREFIX).unwrap_or(path);
    format!("{base}/{}", rest.trim_start_matches('/'))
}

/// ANY /api/{*path}: forward a widget "try it out" call to the upstream API
pub async fn forward(
    State(state): State<AppState>,
    request: Request,
) -> Response {
    let Some(upstream) = &state.config.upstream else {
        return (StatusCode::NOT_FOUND, "no upstream configured").into_response();
    };

    let mut url = upstream_url(&upstream.url, request.uri());
    if let Some(query) = request.uri().query() {
        url.push('?');
        url.push_str(query);
    }

    let method = request.method().clone();
    let headers = forwardable(request.headers(), true);
    let body = match axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(method = %method, url = %url, error = %e, "Failed to read request body");
            return (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response();
        }
    };

    tracing::debug!(method = %method, url = %url, "Forwarding request upstream");

    let upstream_response = match state
        .http
        .request(method.clone(), url.as_str())
        .headers(headers)
        .body(body)
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(method = %method, url = %url, error = %e, "Upstream request failed");
            return (StatusCode::BAD_GATEWAY, "upstream unavailable").into_response();
        }
    };

    let status = upstream_response.status();
    let headers = forwardable(upstream_response.headers(), false);

    let mut response = Response::new(Body::from_stream(upstream_response.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
