use super::{app_context, ApiError};
use crate::domain::a004_nomenclature::picker::ProductPicker;
use crate::shared::debounce::QueryResult;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a004_nomenclature::CanonicalProduct;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Serialize)]
pub struct OpenPickerResponse {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub products: usize,
}

#[derive(Debug, Deserialize)]
pub struct PickerQuery {
    #[serde(default)]
    pub q: String,
}

fn picker(session_id: &str) -> Result<Arc<Mutex<ProductPicker>>, ApiError> {
    app_context()?
        .pickers
        .get(session_id)
        .ok_or_else(|| ApiError::not_found("Product picker", session_id))
}

/// POST /api/a004/pickers
pub async fn open_picker() -> Result<Json<OpenPickerResponse>, ApiError> {
    let ctx = app_context()?;
    let (session_id, products) = ctx.open_product_picker().await?;
    Ok(Json(OpenPickerResponse {
        session_id,
        products,
    }))
}

/// PUT /api/a004/pickers/:session_id/query
pub async fn type_query(
    Path(session_id): Path<String>,
    Json(query): Json<PickerQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let scheduled = picker(&session_id)?.lock().await.type_query(&query.q);
    Ok(Json(serde_json::json!({ "scheduled": scheduled })))
}

/// GET /api/a004/pickers/:session_id/suggestions
pub async fn suggestions(
    Path(session_id): Path<String>,
) -> Result<Json<Option<QueryResult<Vec<CanonicalProduct>>>>, ApiError> {
    let latest = picker(&session_id)?.lock().await.latest();
    Ok(Json(latest))
}

/// DELETE /api/a004/pickers/:session_id
pub async fn close_picker(Path(session_id): Path<String>) -> Result<StatusCode, ApiError> {
    if app_context()?.pickers.close(&session_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Product picker", &session_id))
    }
}
