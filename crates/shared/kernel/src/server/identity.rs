use axum::http::HeaderMap;
use tracing::trace;
use vista_domain::identity::Identity;

/// Reads the requesting user from the trusted identity header.
///
/// A missing header, a non-UTF-8 value or a blank value all yield the anonymous identity;
/// whether anonymous users get anything is decided by the access checks, not here.
#[must_use]
pub fn identity_from_headers(headers: &HeaderMap, header_name: &str) -> Identity {
    let identity = Identity::from(headers.get(header_name).and_then(|v| v.to_str().ok()));
    trace!(header = header_name, identity = %identity, "Resolved request identity");
    identity
}
