use serde::{Deserialize, Serialize};

/// Прогресс сопоставления
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchProgress {
    #[serde(rename = "sessionId")]
    pub session_id: String,

    pub status: MatchStatus,

    /// Всего товаров в снимке (известно после загрузки)
    pub total: Option<i32>,

    /// Загружено товаров
    pub loaded: i32,

    /// Пропущено некорректных строк
    pub skipped: i32,

    /// Сопоставлено (сохраненная связь или точный артикул)
    pub matched: i32,

    /// Осталось без связи
    pub unmatched: i32,

    /// Создано связей автоматически
    #[serde(rename = "autoLinked")]
    pub auto_linked: i32,

    pub errors: i32,

    #[serde(rename = "errorList", default)]
    pub error_list: Vec<MatchError>,

    /// Текущий этап
    #[serde(rename = "currentItem")]
    pub current_item: Option<String>,

    #[serde(rename = "startedAt")]
    pub started_at: chrono::DateTime<chrono::Utc>,

    #[serde(rename = "completedAt")]
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Статус выполнения сопоставления
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchStatus {
    InProgress,
    Completed,
    CompletedWithErrors,
    Failed,
}

/// Информация об ошибке сопоставления
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchError {
    pub message: String,

    pub details: Option<String>,

    /// ID товара маркетплейса, при обработке которого произошла ошибка
    #[serde(rename = "listingId")]
    pub listing_id: Option<String>,
}
