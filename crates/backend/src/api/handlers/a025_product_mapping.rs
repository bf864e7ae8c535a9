use super::{app_context, parse_marketplace, ApiError};
use crate::shared::errors::ReconcileError;
use axum::extract::Path;
use axum::Json;
use contracts::domain::a025_product_mapping::{
    AutoLinkListingsRequest, AutoLinkReport, AutoLinkRequest, ConfirmLinkRequest, ProductMapping,
    UnlinkReport,
};
use contracts::usecases::u505_match_nomenclature::MatchRequest;

/// POST /api/a025/mappings/confirm
pub async fn confirm(
    Json(request): Json<ConfirmLinkRequest>,
) -> Result<Json<ProductMapping>, ApiError> {
    let ctx = app_context()?;
    let mapping = ctx
        .mappings
        .confirm_link(&request.listing, &request.product)
        .await?;
    Ok(Json(mapping))
}

/// POST /api/a025/mappings/auto-link
///
/// Загружает свежий снимок товаров и сохраняет пары с точным артикулом.
pub async fn auto_link(
    Json(request): Json<AutoLinkRequest>,
) -> Result<Json<AutoLinkReport>, ApiError> {
    let ctx = app_context()?;
    let result = ctx
        .match_executor
        .run(&MatchRequest {
            marketplaces: request.marketplaces,
            integration_id: request.integration_id,
            auto_link: true,
        })
        .await?;
    Ok(Json(result.auto_link.unwrap_or_default()))
}

/// POST /api/a025/mappings/auto-link-listings
///
/// Связывает по артикулу уже загруженный клиентом снимок товаров.
pub async fn auto_link_listings(
    Json(request): Json<AutoLinkListingsRequest>,
) -> Result<Json<AutoLinkReport>, ApiError> {
    let ctx = app_context()?;
    let catalog = ctx.store.get_catalog_products().await.map_err(|e| {
        tracing::error!("Failed to load catalog products: {}", e);
        ReconcileError::remote("get_catalog_products", e)
    })?;
    let report = ctx
        .mappings
        .auto_link_by_sku(&request.listings, &catalog)
        .await?;
    Ok(Json(report))
}

/// DELETE /api/a025/mappings/:product_id/:marketplace
pub async fn remove(
    Path((product_id, marketplace)): Path<(String, String)>,
) -> Result<Json<UnlinkReport>, ApiError> {
    let ctx = app_context()?;
    let marketplace = parse_marketplace(&marketplace)?;
    let report = ctx.mappings.remove_link(&product_id, marketplace).await?;
    Ok(Json(report))
}
