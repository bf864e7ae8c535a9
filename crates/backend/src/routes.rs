use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::api::handlers;

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // A004 NOMENCLATURE
        // ========================================
        .route(
            "/api/a004/pickers",
            post(handlers::a004_nomenclature::open_picker),
        )
        .route(
            "/api/a004/pickers/:session_id",
            delete(handlers::a004_nomenclature::close_picker),
        )
        .route(
            "/api/a004/pickers/:session_id/query",
            put(handlers::a004_nomenclature::type_query),
        )
        .route(
            "/api/a004/pickers/:session_id/suggestions",
            get(handlers::a004_nomenclature::suggestions),
        )
        // ========================================
        // A025 PRODUCT MAPPING
        // ========================================
        .route(
            "/api/a025/mappings/confirm",
            post(handlers::a025_product_mapping::confirm),
        )
        .route(
            "/api/a025/mappings/auto-link",
            post(handlers::a025_product_mapping::auto_link),
        )
        .route(
            "/api/a025/mappings/auto-link-listings",
            post(handlers::a025_product_mapping::auto_link_listings),
        )
        .route(
            "/api/a025/mappings/:product_id/:marketplace",
            delete(handlers::a025_product_mapping::remove),
        )
        // ========================================
        // A026 MARKETPLACE CATEGORIES
        // ========================================
        .route(
            "/api/a026/categories",
            get(handlers::a026_mp_category::search_categories),
        )
        .route(
            "/api/a026/attributes",
            get(handlers::a026_mp_category::list_attributes),
        )
        .route(
            "/api/a026/attributes/merge",
            post(handlers::a026_mp_category::merge_attributes),
        )
        .route(
            "/api/a026/values",
            get(handlers::a026_mp_category::list_values)
                .delete(handlers::a026_mp_category::invalidate_values),
        )
        .route(
            "/api/a026/cache",
            delete(handlers::a026_mp_category::clear_cache),
        )
        .route(
            "/api/a026/sessions",
            post(handlers::a026_mp_category::open_session),
        )
        .route(
            "/api/a026/sessions/:session_id",
            get(handlers::a026_mp_category::session_state)
                .delete(handlers::a026_mp_category::close_session),
        )
        .route(
            "/api/a026/sessions/:session_id/category-query",
            post(handlers::a026_mp_category::type_category_query),
        )
        .route(
            "/api/a026/sessions/:session_id/category-results",
            get(handlers::a026_mp_category::category_results),
        )
        .route(
            "/api/a026/sessions/:session_id/categories",
            put(handlers::a026_mp_category::select_category),
        )
        .route(
            "/api/a026/sessions/:session_id/categories/:marketplace",
            delete(handlers::a026_mp_category::clear_category),
        )
        .route(
            "/api/a026/sessions/:session_id/values",
            get(handlers::a026_mp_category::session_dictionary)
                .put(handlers::a026_mp_category::set_value),
        )
        .route(
            "/api/a026/sessions/:session_id/payloads",
            post(handlers::a026_mp_category::build_payloads),
        )
        // ========================================
        // USECASES
        // ========================================
        // UseCase u505: Match Nomenclature
        .route(
            "/api/u505/match",
            post(handlers::usecases::u505_run_matching),
        )
        .route(
            "/api/u505/match/start",
            post(handlers::usecases::u505_start_matching),
        )
        .route(
            "/api/u505/match/:session_id/progress",
            get(handlers::usecases::u505_get_progress),
        )
}
