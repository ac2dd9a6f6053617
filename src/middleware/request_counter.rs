use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::routes::AppState;

/// Running total at the time a request arrived; stored in request extensions
/// for handlers to log alongside the [`crate::middleware::RequestId`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestNumber(pub u64);

impl std::fmt::Display for RequestNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Counts every request through the injected [`crate::db::RequestCounter`].
///
/// A failing counter is logged and never fails the request itself.
pub async fn count_requests(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    match state.request_counter.increment().await {
        Ok(count) => {
            request.extensions_mut().insert(RequestNumber(count));
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to increment request counter");
        }
    }

    next.run(request).await
}
