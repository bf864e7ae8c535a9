use super::{app_context, ApiError};
use axum::extract::Path;
use axum::http::StatusCode;
use axum::Json;
use contracts::usecases::u505_match_nomenclature::{
    progress::MatchProgress, MatchRequest, MatchResponse, MatchRunResult,
};

// ============================================================================
// UseCase u505: Match Nomenclature
// ============================================================================

/// POST /api/u505/match
pub async fn u505_run_matching(
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchRunResult>, ApiError> {
    let ctx = app_context()?;
    let result = ctx.match_executor.run(&request).await?;
    Ok(Json(result))
}

/// POST /api/u505/match/start
pub async fn u505_start_matching(
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, ApiError> {
    let ctx = app_context()?;
    Ok(Json(ctx.match_executor.start_matching(request)))
}

/// GET /api/u505/match/:session_id/progress
pub async fn u505_get_progress(
    Path(session_id): Path<String>,
) -> Result<Json<MatchProgress>, StatusCode> {
    let ctx = app_context().map_err(|e| e.status)?;
    match ctx.match_executor.get_progress(&session_id) {
        Some(progress) => Ok(Json(progress)),
        None => Err(StatusCode::NOT_FOUND),
    }
}
