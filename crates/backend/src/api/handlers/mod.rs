// Aggregate handlers
pub mod a004_nomenclature;
pub mod a025_product_mapping;
pub mod a026_mp_category;

// UseCase handlers
pub mod usecases;

use crate::shared::errors::ReconcileError;
use crate::system::initialization::{self, AppContext};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::enums::marketplace_type::MarketplaceType;
use contracts::usecases::common::UseCaseError;

/// Ошибка API: HTTP статус и тело в формате UseCaseError
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: UseCaseError,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: UseCaseError::validation(message),
        }
    }

    pub fn not_found(what: &str, id: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: UseCaseError::new("NOT_FOUND", format!("{} '{}' not found", what, id)),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            error: UseCaseError::new("NOT_INITIALIZED", "Application context is not initialized"),
        }
    }
}

impl From<ReconcileError> for ApiError {
    fn from(err: ReconcileError) -> Self {
        let status = match &err {
            ReconcileError::Validation(_) | ReconcileError::MissingRequiredValues(_) => {
                StatusCode::BAD_REQUEST
            }
            ReconcileError::MalformedListing { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ReconcileError::RemoteFetchFailed { .. } => StatusCode::BAD_GATEWAY,
            ReconcileError::PersistenceFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            error: err.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.error.is_operator_recoverable() {
            tracing::warn!("Request rejected ({}): {}", self.status, self.error);
        } else {
            tracing::error!("Request failed ({}): {}", self.status, self.error);
        }
        (self.status, Json(self.error)).into_response()
    }
}

/// Контекст приложения или 503, если он еще не создан
pub(crate) fn app_context() -> Result<&'static AppContext, ApiError> {
    initialization::context().ok_or_else(ApiError::unavailable)
}

/// Маркетплейс из параметра запроса: код или любое узнаваемое название
pub(crate) fn parse_marketplace(value: &str) -> Result<MarketplaceType, ApiError> {
    MarketplaceType::detect(value)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown marketplace '{}'", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let err: ApiError = ReconcileError::remote("search", "timeout").into();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(err.error.code, UseCaseError::REMOTE_FETCH_FAILED);

        let err: ApiError = ReconcileError::MissingRequiredValues(vec!["Цвет".into()]).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_parse_marketplace() {
        assert_eq!(parse_marketplace("wb").unwrap(), MarketplaceType::Wildberries);
        assert_eq!(parse_marketplace("bogus").unwrap_err().status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_names_the_session() {
        let err = ApiError::not_found("Editing session", "abc");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.error.message, "Editing session 'abc' not found");
    }
}
