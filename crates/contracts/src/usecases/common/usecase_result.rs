use serde::{Deserialize, Serialize};

/// Результат выполнения UseCase
pub type UseCaseResult<T> = Result<T, UseCaseError>;

/// Ошибка выполнения UseCase в виде, пригодном для передачи клиенту
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCaseError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl UseCaseError {
    pub const MALFORMED_LISTING: &'static str = "MALFORMED_LISTING";
    pub const REMOTE_FETCH_FAILED: &'static str = "REMOTE_FETCH_FAILED";
    pub const PERSISTENCE_FAILED: &'static str = "PERSISTENCE_FAILED";
    pub const VALIDATION_ERROR: &'static str = "VALIDATION_ERROR";
    pub const MISSING_REQUIRED: &'static str = "MISSING_REQUIRED";

    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(Self::VALIDATION_ERROR, message)
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::new(Self::REMOTE_FETCH_FAILED, message)
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::new(Self::PERSISTENCE_FAILED, message)
    }

    /// Ошибка не требует вмешательства разработчика: оператор может
    /// исправить ввод или повторить операцию
    pub fn is_operator_recoverable(&self) -> bool {
        matches!(
            self.code.as_str(),
            Self::VALIDATION_ERROR | Self::MISSING_REQUIRED | Self::MALFORMED_LISTING
        )
    }
}

impl std::fmt::Display for UseCaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, ": {}", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for UseCaseError {}
