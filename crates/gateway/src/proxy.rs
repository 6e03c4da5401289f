//! Path-prefix reverse proxy: forwards method, query string, headers (minus
//! `host`), and body to the upstream service named by the first path
//! segment, and returns its status/body/headers unchanged. Grounded on
//! `original_source`'s `api-gateway/src/main.py` `proxy_endpoint`, rebuilt
//! on `axum` + `reqwest` instead of FastAPI + `httpx`.

use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::config::Config;

#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub client: reqwest::Client,
}

fn leading_segment(path: &str) -> &str {
    path.trim_start_matches('/').split('/').next().unwrap_or("")
}

fn forward_headers(headers: &HeaderMap) -> HeaderMap {
    let mut forwarded = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if name.as_str().eq_ignore_ascii_case("host") {
            continue;
        }
        forwarded.insert(name.clone(), value.clone());
    }
    forwarded
}

/// Unknown service prefix → 404; upstream connection failure → 503 with
/// `{"detail": "Service '<name>' is unavailable"}` (spec.md §4.4).
pub async fn proxy(State(state): State<GatewayState>, req: Request<Body>) -> Response {
    let path = req.uri().path().to_string();
    let prefix = leading_segment(&path);

    let Some(base) = state.config.upstream_for(prefix) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": format!("Service '{prefix}' not found") })),
        )
            .into_response();
    };

    let mut target = format!("{base}{path}");
    if let Some(query) = req.uri().query() {
        target.push('?');
        target.push_str(query);
    }

    let method = req.method().clone();
    let headers = forward_headers(req.headers());
    let body = match axum::body::to_bytes(req.into_body(), usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!(%error, "failed to buffer request body");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let upstream = state
        .client
        .request(method, &target)
        .headers(headers)
        .body(body)
        .send()
        .await;

    match upstream {
        Ok(response) => {
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await.unwrap_or_default();

            let mut builder = Response::builder().status(status);
            for (name, value) in headers.iter() {
                builder = builder.header(name, value);
            }
            builder
                .body(Body::from(body))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
        Err(error) => {
            tracing::warn!(%error, service = prefix, "upstream unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "detail": format!("Service '{prefix}' is unavailable") })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_segment_ignores_trailing_path() {
        assert_eq!(leading_segment("/orders/123/cancel"), "orders");
        assert_eq!(leading_segment("/health"), "health");
        assert_eq!(leading_segment("/"), "");
    }

    #[test]
    fn forward_headers_drops_host_only() {
        let mut headers = HeaderMap::new();
        headers.insert("host", "gateway:8000".parse().unwrap());
        headers.insert("x-request-id", "abc".parse().unwrap());
        let forwarded = forward_headers(&headers);
        assert!(forwarded.get("host").is_none());
        assert_eq!(forwarded.get("x-request-id").unwrap(), "abc");
    }
}
