use contracts::enums::marketplace_type::MarketplaceType;
use contracts::usecases::common::UseCaseError;
use thiserror::Error;

/// Ошибки движка сверки
///
/// Ни одна из них не фатальна для процесса: элемент остается
/// несопоставленным, оператор получает сообщение.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Строка выгрузки маркетплейса без обязательного поля
    #[error("Malformed {marketplace} listing: missing field '{field}'")]
    MalformedListing {
        marketplace: MarketplaceType,
        field: &'static str,
        /// ID или артикул, если удалось прочитать
        hint: Option<String>,
    },

    /// Запрос к маркетплейсу или хранилищу не выполнен
    #[error("Remote fetch failed ({operation}): {message}")]
    RemoteFetchFailed { operation: String, message: String },

    /// Не удалось сохранить или удалить связь
    #[error("Persistence failed for {item}: {message}")]
    PersistenceFailed { item: String, message: String },

    /// Локальная проверка ввода, до обращения к удаленным сервисам
    #[error("Validation error: {0}")]
    Validation(String),

    /// Не заполнены обязательные атрибуты
    #[error("Required attributes are missing: {}", .0.join(", "))]
    MissingRequiredValues(Vec<String>),
}

impl ReconcileError {
    pub fn remote(operation: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::RemoteFetchFailed {
            operation: operation.into(),
            message: err.to_string(),
        }
    }

    pub fn persistence(item: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::PersistenceFailed {
            item: item.into(),
            message: err.to_string(),
        }
    }
}

impl From<ReconcileError> for UseCaseError {
    fn from(err: ReconcileError) -> Self {
        let message = err.to_string();
        match err {
            ReconcileError::MalformedListing { hint, .. } => {
                let e = UseCaseError::new(UseCaseError::MALFORMED_LISTING, message);
                match hint {
                    Some(hint) => e.with_details(hint),
                    None => e,
                }
            }
            ReconcileError::RemoteFetchFailed { operation, .. } => {
                UseCaseError::remote(message).with_details(operation)
            }
            ReconcileError::PersistenceFailed { item, .. } => {
                UseCaseError::persistence(message).with_details(item)
            }
            ReconcileError::Validation(_) => UseCaseError::validation(message),
            ReconcileError::MissingRequiredValues(names) => {
                UseCaseError::new(UseCaseError::MISSING_REQUIRED, message)
                    .with_details(names.join(", "))
            }
        }
    }
}
