use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::AppState;
use crate::models::observations::ObservationsRequest;
use crate::resolve::{self, ResolveError};

/// Resolve a batch of named queries over one shared window and reduce each
/// result to a scalar or a per-label map of scalars.
pub async fn observations(
    State(state): State<AppState>,
    Json(req): Json<ObservationsRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.window_minutes == 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "window_minutes must be positive".to_string(),
        ));
    }

    // Fresh snapshot per request so catalog edits apply without restart.
    let queries = state.catalog.load().map_err(|e| {
        tracing::error!("catalog load failed: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("catalog load failed: {e}"),
        )
    })?;

    let results = resolve::resolve(
        queries.as_ref(),
        state.prom.as_ref(),
        &req.queries,
        req.window_minutes,
        req.end_ts,
        req.step_seconds,
    )
    .await
    .map_err(|e| match &e {
        ResolveError::UnknownQuery(_) => (StatusCode::BAD_REQUEST, e.to_string()),
        ResolveError::Backend { .. } => {
            tracing::error!("observation resolution failed: {e}");
            (StatusCode::BAD_GATEWAY, e.to_string())
        }
    })?;

    Ok(Json(results))
}
