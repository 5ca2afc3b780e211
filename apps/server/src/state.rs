use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;
use std::sync::Arc;
use vista::Service;
use vista::domain::identity::Identity;
use vista::server::identity_from_headers;

/// Shared by every handler.
#[derive(Debug, Clone)]
pub(crate) struct AppState {
    pub(crate) service: Service,
    identity_header: Arc<str>,
}

impl AppState {
    pub(crate) fn new(service: Service, identity_header: &str) -> Self {
        Self { service, identity_header: Arc::from(identity_header) }
    }
}

/// The user a request is made for, read from the configured identity header.
#[derive(Debug, Clone)]
pub(crate) struct RequestIdentity(pub(crate) Identity);

impl FromRequestParts<AppState> for RequestIdentity {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(identity_from_headers(&parts.headers, &state.identity_header)))
    }
}
