use crate::ids::RequestId;
use axum::extract::{ConnectInfo, Request};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use std::net::SocketAddr;
use tracing::{info, info_span, Instrument};

/// Header carrying the per-request correlation id, inbound and outbound.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Access logging for every inbound request.
///
/// Emits one line with the remote address, method and URL, then hands the
/// request on unconditionally. The rest of the exchange runs inside a
/// `request` span keyed by a [`RequestId`], which is echoed back to the client.
///
/// Install with `axum::middleware::from_fn(log_request)`.
pub async fn log_request(request: Request, next: Next) -> Response {
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());
    let request_id = RequestId::from_header_or_new(
        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok()),
    );

    let span = info_span!("request", request_id = %request_id);
    async move {
        info!(
            remote = %remote,
            method = %request.method(),
            url = %request.uri(),
            "inbound request"
        );

        let mut response = next.run(request).await;
        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}
