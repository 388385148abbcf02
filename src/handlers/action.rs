use crate::model::{ActionRequest, REBOOT_DEVICE, TEST_SERIAL};
use axum::body::to_bytes;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, Request};
use axum::Json;
use http::{request::Parts, StatusCode};
use std::collections::HashMap;
use tracing::{info, warn};

/// Largest request body copied into the DELETE dump.
pub const MAX_DUMP_BODY_BYTES: usize = 64 * 1024;

/// `GET /action/{id}`
///
/// Fabricates a fresh reboot request. The path id is not consulted; nothing is
/// looked up because nothing is ever stored.
pub async fn create_stub_action() -> Json<ActionRequest> {
    let action = ActionRequest::new(TEST_SERIAL, REBOOT_DEVICE);
    info!(action_id = %action.id, "request action");
    Json(action)
}

/// `DELETE /action/{id}`
///
/// Logs the inbound request and acknowledges that the action can be removed.
/// A missing or undecodable `id` is treated as empty.
pub async fn acknowledge_removal(
    params: Result<Path<HashMap<String, String>>, PathRejection>,
    request: Request,
) -> StatusCode {
    let id = params
        .ok()
        .and_then(|Path(params)| params.get("id").cloned())
        .unwrap_or_default();

    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, MAX_DUMP_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(error = %err, "could not buffer request body for dump");
            Default::default()
        }
    };
    info!(dump = %dump_request(&parts, &body), "inbound removal request");
    info!(action_id = %id, "action can be removed");

    StatusCode::OK
}

/// Render a request in HTTP/1.x wire form: request line, headers, blank line, body.
pub fn dump_request(parts: &Parts, body: &[u8]) -> String {
    let mut out = format!("{} {} {:?}\r\n", parts.method, parts.uri, parts.version);
    for (name, value) in &parts.headers {
        out.push_str(name.as_str());
        out.push_str(": ");
        out.push_str(&String::from_utf8_lossy(value.as_bytes()));
        out.push_str("\r\n");
    }
    out.push_str("\r\n");
    out.push_str(&String::from_utf8_lossy(body));
    out
}
