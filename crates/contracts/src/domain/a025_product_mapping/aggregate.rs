use crate::domain::a004_nomenclature::CanonicalProduct;
use crate::domain::a007_marketplace_product::MarketplaceListing;
use crate::enums::marketplace_type::MarketplaceType;
use serde::{Deserialize, Serialize};

/// Способ установки связи
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchType {
    /// Связь подтверждена оператором
    #[serde(rename = "linked_manual")]
    LinkedManual,
    /// Связь установлена автоматически по точному совпадению артикула
    #[serde(rename = "linked_auto_sku")]
    LinkedAutoSku,
    #[serde(rename = "unmatched")]
    Unmatched,
}

/// Подтвержденная связь товара маркетплейса с товаром каталога
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMapping {
    /// Ключ связи, см. [`mapping_id`]
    pub id: String,

    #[serde(rename = "marketplaceListingId")]
    pub marketplace_listing_id: String,

    #[serde(rename = "canonicalProductId")]
    pub canonical_product_id: String,

    pub marketplace: MarketplaceType,

    #[serde(rename = "matchType")]
    pub match_type: MatchType,

    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// ID связи: один товар маркетплейса имеет не более одной связи,
/// поэтому повторное сохранение перезаписывает предыдущую
pub fn mapping_id(marketplace: MarketplaceType, listing_id: &str) -> String {
    format!("{}:{}", marketplace.code(), listing_id)
}

impl ProductMapping {
    pub fn new(
        marketplace: MarketplaceType,
        listing_id: impl Into<String>,
        canonical_product_id: impl Into<String>,
        match_type: MatchType,
    ) -> Self {
        let listing_id = listing_id.into();
        Self {
            id: mapping_id(marketplace, &listing_id),
            marketplace_listing_id: listing_id,
            canonical_product_id: canonical_product_id.into(),
            marketplace,
            match_type,
            updated_at: Some(chrono::Utc::now()),
        }
    }

    pub fn is_for_listing(&self, marketplace: MarketplaceType, listing_id: &str) -> bool {
        self.marketplace == marketplace && self.marketplace_listing_id == listing_id
    }
}

/// Запрос на ручное подтверждение связи
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmLinkRequest {
    pub listing: MarketplaceListing,
    pub product: CanonicalProduct,
}

/// Запрос на автоматическое связывание по артикулу
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoLinkRequest {
    /// Маркетплейсы для обработки (пусто - все)
    #[serde(default)]
    pub marketplaces: Vec<MarketplaceType>,

    #[serde(rename = "integrationId", default)]
    pub integration_id: Option<String>,
}

/// Связывание по артикулу для переданного снимка товаров маркетплейсов
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoLinkListingsRequest {
    pub listings: Vec<MarketplaceListing>,
}

/// Итог автоматического связывания по артикулу
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoLinkReport {
    /// Создано новых связей
    pub created: usize,

    /// Пар, уже связанных ранее
    #[serde(rename = "alreadyLinked")]
    pub already_linked: usize,

    /// Пар, которые не удалось сохранить
    pub failed: usize,

    #[serde(default)]
    pub failures: Vec<LinkFailure>,
}

/// Итог удаления связей товара каталога с маркетплейсом
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnlinkReport {
    /// Удалено связей
    pub removed: usize,

    /// Связей, которые не удалось удалить
    pub failed: usize,

    #[serde(default)]
    pub failures: Vec<LinkFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkFailure {
    pub marketplace: MarketplaceType,

    #[serde(rename = "listingId")]
    pub listing_id: String,

    pub message: String,
}
