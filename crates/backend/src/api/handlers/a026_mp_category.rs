use super::{app_context, parse_marketplace, ApiError};
use crate::domain::a026_mp_category::editing_session::AttributeEditingSession;
use crate::domain::a026_mp_category::merger;
use crate::shared::debounce::QueryResult;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a007_marketplace_product::AttributeAssignment;
use contracts::domain::a026_mp_category::{
    AttributeSchema, AttributeValue, AttributeValueKey, Category, MergedAttribute,
};
use contracts::enums::marketplace_type::MarketplaceType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Deserialize)]
pub struct CategorySearchQuery {
    pub marketplace: String,
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct AttributesQuery {
    pub marketplace: String,
    pub category_id: i64,
    pub type_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ValuesQuery {
    pub marketplace: String,
    pub category_id: i64,
    pub attribute_id: i64,
    pub type_id: Option<i64>,
}

impl ValuesQuery {
    fn key(&self) -> Result<AttributeValueKey, ApiError> {
        Ok(AttributeValueKey::new(
            parse_marketplace(&self.marketplace)?,
            self.category_id,
            self.attribute_id,
            self.type_id,
        ))
    }
}

/// Схемы атрибутов одного маркетплейса для объединения
#[derive(Debug, Deserialize)]
pub struct MarketplaceSchemas {
    pub marketplace: MarketplaceType,
    pub schemas: Vec<AttributeSchema>,
}

/// GET /api/a026/categories?marketplace=&q=
pub async fn search_categories(
    Query(query): Query<CategorySearchQuery>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let ctx = app_context()?;
    let marketplace = parse_marketplace(&query.marketplace)?;
    Ok(Json(
        ctx.resolver.search_categories(marketplace, &query.q).await,
    ))
}

/// GET /api/a026/attributes?marketplace=&category_id=&type_id=
///
/// Обязательные атрибуты; справочники подгружаются в общий кэш.
pub async fn list_attributes(
    Query(query): Query<AttributesQuery>,
) -> Result<Json<Vec<AttributeSchema>>, ApiError> {
    let ctx = app_context()?;
    let marketplace = parse_marketplace(&query.marketplace)?;
    let attributes = ctx
        .resolver
        .load_attributes(marketplace, query.category_id, query.type_id)
        .await?;
    Ok(Json(attributes))
}

/// GET /api/a026/values?marketplace=&category_id=&attribute_id=&type_id=
pub async fn list_values(
    Query(query): Query<ValuesQuery>,
) -> Result<Json<Vec<AttributeValue>>, ApiError> {
    let ctx = app_context()?;
    let key = query.key()?;
    Ok(Json(ctx.resolver.cache().get_values(&key).await?))
}

/// DELETE /api/a026/values?marketplace=&category_id=&attribute_id=&type_id=
///
/// Сбросить справочник в общем кэше, следующий запрос загрузит его заново.
pub async fn invalidate_values(
    Query(query): Query<ValuesQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let ctx = app_context()?;
    let key = query.key()?;
    let invalidated = ctx.resolver.cache().invalidate(&key);
    Ok(Json(serde_json::json!({ "invalidated": invalidated })))
}

/// DELETE /api/a026/cache
///
/// Сбросить общий кэш справочников целиком.
pub async fn clear_cache() -> Result<Json<serde_json::Value>, ApiError> {
    let ctx = app_context()?;
    let cache = ctx.resolver.cache();
    let cleared = cache.len();
    cache.clear();
    tracing::info!("Attribute value cache cleared, {} dictionaries dropped", cleared);
    Ok(Json(serde_json::json!({ "cleared": cleared })))
}

/// POST /api/a026/attributes/merge
///
/// Порядок элементов запроса задает приоритет маркетплейсов.
pub async fn merge_attributes(
    Json(request): Json<Vec<MarketplaceSchemas>>,
) -> Result<Json<Vec<MergedAttribute>>, ApiError> {
    let mut seen = Vec::new();
    let mut inputs = Vec::with_capacity(request.len());
    for item in request {
        if seen.contains(&item.marketplace) {
            return Err(ApiError::bad_request(format!(
                "Marketplace {} is listed more than once",
                item.marketplace
            )));
        }
        seen.push(item.marketplace);
        inputs.push((item.marketplace, item.schemas));
    }
    Ok(Json(merger::merge(&inputs)))
}

// ========================================
// Сессии заполнения атрибутов
// ========================================

#[derive(Debug, Default, Deserialize)]
pub struct OpenSessionRequest {
    /// Порядок маркетплейсов при объединении; пустой - все
    #[serde(default)]
    pub marketplaces: Vec<MarketplaceType>,
}

#[derive(Debug, Serialize)]
pub struct OpenSessionResponse {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub marketplaces: Vec<MarketplaceType>,
}

/// Состояние сессии: выбранные категории, объединенные атрибуты и значения
#[derive(Debug, Serialize)]
pub struct SessionState {
    pub categories: BTreeMap<MarketplaceType, Category>,
    pub attributes: Vec<MergedAttribute>,
    pub values: BTreeMap<String, String>,
}

impl SessionState {
    fn of(session: &AttributeEditingSession) -> Self {
        Self {
            categories: session
                .priority()
                .iter()
                .filter_map(|mp| session.selection(*mp).map(|s| (*mp, s.category.clone())))
                .collect(),
            attributes: session.merged().to_vec(),
            values: session
                .merged()
                .iter()
                .filter_map(|m| session.value(&m.name).map(|v| (m.name.clone(), v.to_string())))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoryQueryRequest {
    pub marketplace: MarketplaceType,
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct DictionaryQuery {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SetValueRequest {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

fn editing_session(session_id: &str) -> Result<Arc<Mutex<AttributeEditingSession>>, ApiError> {
    app_context()?
        .editing_sessions
        .get(session_id)
        .ok_or_else(|| ApiError::not_found("Editing session", session_id))
}

/// POST /api/a026/sessions
pub async fn open_session(
    Json(request): Json<OpenSessionRequest>,
) -> Result<Json<OpenSessionResponse>, ApiError> {
    let ctx = app_context()?;
    let session_id = ctx.open_editing_session(request.marketplaces);
    let marketplaces = editing_session(&session_id)?.lock().await.priority().to_vec();
    Ok(Json(OpenSessionResponse {
        session_id,
        marketplaces,
    }))
}

/// DELETE /api/a026/sessions/:session_id
pub async fn close_session(Path(session_id): Path<String>) -> Result<StatusCode, ApiError> {
    if app_context()?.editing_sessions.close(&session_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Editing session", &session_id))
    }
}

/// POST /api/a026/sessions/:session_id/category-query
///
/// Поиск при наборе: уходит после окна тишины, результат -
/// GET .../category-results
pub async fn type_category_query(
    Path(session_id): Path<String>,
    Json(request): Json<CategoryQueryRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session = editing_session(&session_id)?;
    let scheduled = session
        .lock()
        .await
        .type_category_query(request.marketplace, &request.q);
    Ok(Json(serde_json::json!({ "scheduled": scheduled })))
}

/// GET /api/a026/sessions/:session_id/category-results
pub async fn category_results(
    Path(session_id): Path<String>,
) -> Result<Json<Option<QueryResult<Vec<Category>>>>, ApiError> {
    let session = editing_session(&session_id)?;
    let latest = session.lock().await.latest_categories();
    Ok(Json(latest))
}

/// PUT /api/a026/sessions/:session_id/categories
pub async fn select_category(
    Path(session_id): Path<String>,
    Json(category): Json<Category>,
) -> Result<Json<Vec<MergedAttribute>>, ApiError> {
    let session = editing_session(&session_id)?;
    let mut session = session.lock().await;
    let merged = session.select_category(category).await?;
    Ok(Json(merged.to_vec()))
}

/// DELETE /api/a026/sessions/:session_id/categories/:marketplace
pub async fn clear_category(
    Path((session_id, marketplace)): Path<(String, String)>,
) -> Result<Json<Vec<MergedAttribute>>, ApiError> {
    let marketplace = parse_marketplace(&marketplace)?;
    let session = editing_session(&session_id)?;
    let mut session = session.lock().await;
    session.clear_category(marketplace);
    Ok(Json(session.merged().to_vec()))
}

/// GET /api/a026/sessions/:session_id
pub async fn session_state(Path(session_id): Path<String>) -> Result<Json<SessionState>, ApiError> {
    let session = editing_session(&session_id)?;
    let state = SessionState::of(&*session.lock().await);
    Ok(Json(state))
}

/// GET /api/a026/sessions/:session_id/values?name=
pub async fn session_dictionary(
    Path(session_id): Path<String>,
    Query(query): Query<DictionaryQuery>,
) -> Result<Json<Vec<AttributeValue>>, ApiError> {
    let session = editing_session(&session_id)?;
    let values = session.lock().await.dictionary_values(&query.name).await?;
    Ok(Json(values))
}

/// PUT /api/a026/sessions/:session_id/values
pub async fn set_value(
    Path(session_id): Path<String>,
    Json(request): Json<SetValueRequest>,
) -> Result<StatusCode, ApiError> {
    let session = editing_session(&session_id)?;
    session
        .lock()
        .await
        .set_value(&request.name, &request.value)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/a026/sessions/:session_id/payloads
pub async fn build_payloads(
    Path(session_id): Path<String>,
) -> Result<Json<BTreeMap<MarketplaceType, Vec<AttributeAssignment>>>, ApiError> {
    let session = editing_session(&session_id)?;
    let payloads = session.lock().await.build_payloads()?;
    Ok(Json(payloads))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a026_mp_category::service::CategoryAttributeResolver;
    use crate::shared::testing::{attr, FakeGateway};
    use std::time::Duration;

    #[tokio::test]
    async fn test_session_state_lists_selected_categories_and_values() {
        let mut gateway = FakeGateway::default();
        gateway.attributes.insert(
            (MarketplaceType::Wildberries, 105),
            vec![attr(1, "Бренд", true, None), attr(2, "Состав", false, None)],
        );
        let resolver = CategoryAttributeResolver::new(Arc::new(gateway), 2);
        let mut session =
            AttributeEditingSession::new(resolver, Vec::new(), Duration::from_millis(500));
        session
            .select_category(Category {
                id: 105,
                name: "Кружки".into(),
                type_id: None,
                marketplace: MarketplaceType::Wildberries,
            })
            .await
            .unwrap();
        session.set_value("Бренд", "Acme").await.unwrap();

        let state = SessionState::of(&session);

        assert_eq!(state.categories.len(), 1);
        assert_eq!(state.categories[&MarketplaceType::Wildberries].id, 105);
        assert_eq!(state.attributes.len(), 1);
        assert_eq!(state.values.get("Бренд").map(String::as_str), Some("Acme"));
    }
}
