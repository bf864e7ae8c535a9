use crate::domain::a004_nomenclature::CanonicalProduct;
use crate::domain::a007_marketplace_product::MarketplaceListing;
use crate::domain::a025_product_mapping::{AutoLinkReport, MatchType};
use serde::{Deserialize, Serialize};

/// Ответ на запуск фонового сопоставления
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    #[serde(rename = "sessionId")]
    pub session_id: String,

    pub status: MatchStartStatus,

    pub message: String,
}

/// Статус запуска процесса сопоставления
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchStartStatus {
    Started,
    Failed,
}

/// Откуда взялась связь
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchSource {
    /// Сохраненная ранее связь
    #[serde(rename = "persisted_link")]
    PersistedLink,
    /// Точное совпадение артикула (с учетом регистра)
    #[serde(rename = "exact_sku")]
    ExactSku,
}

/// Сопоставленная пара
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub listing: MarketplaceListing,

    #[serde(rename = "canonicalProductId")]
    pub canonical_product_id: String,

    /// Товар каталога; отсутствует, если сохраненная связь ссылается
    /// на товар, которого нет в текущем снимке каталога
    #[serde(default)]
    pub product: Option<CanonicalProduct>,

    #[serde(rename = "matchType")]
    pub match_type: MatchType,

    pub source: MatchSource,
}

/// Почему товар остался без связи
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UnmatchedReason {
    /// Точного совпадения артикула нет
    #[serde(rename = "not_found")]
    NotFound,
    /// Артикул совпал с несколькими товарами каталога
    #[serde(rename = "ambiguous")]
    Ambiguous,
    /// Товар каталога уже связан с другим товаром этого маркетплейса
    #[serde(rename = "already_linked")]
    AlreadyLinked,
}

/// Товар без связи с подсказками для оператора
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedListing {
    pub listing: MarketplaceListing,

    /// Не более трех кандидатов, требуют подтверждения оператора
    #[serde(default)]
    pub suggestions: Vec<CanonicalProduct>,

    pub reason: UnmatchedReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub total: usize,

    #[serde(rename = "persistedLinks")]
    pub persisted_links: usize,

    #[serde(rename = "exactSku")]
    pub exact_sku: usize,

    pub unmatched: usize,

    #[serde(rename = "withSuggestions")]
    pub with_suggestions: usize,
}

/// Результат сопоставления снимка
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub matched: Vec<MatchedPair>,

    pub unmatched: Vec<UnmatchedListing>,

    pub summary: MatchSummary,
}

/// Результат полного прогона (загрузка + сопоставление + автосвязывание)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchRunResult {
    pub outcome: MatchOutcome,

    /// Строки, пропущенные нормализатором
    #[serde(rename = "skippedListings", default)]
    pub skipped_listings: Vec<String>,

    /// Ошибки загрузки по отдельным маркетплейсам
    #[serde(rename = "fetchErrors", default)]
    pub fetch_errors: Vec<String>,

    #[serde(rename = "autoLink", default)]
    pub auto_link: Option<AutoLinkReport>,
}
