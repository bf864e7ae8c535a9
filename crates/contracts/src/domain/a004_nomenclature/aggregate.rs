use crate::enums::marketplace_type::MarketplaceType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Aggregate Root
// ============================================================================

/// Товар собственного каталога продавца (не зависит от маркетплейса)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalProduct {
    pub id: String,

    /// Артикул продавца
    #[serde(alias = "article")]
    pub sku: String,

    pub name: String,

    /// Связи с товарами маркетплейсов: не более одной на маркетплейс
    #[serde(rename = "marketplaceLinks", default)]
    pub marketplace_links: BTreeMap<MarketplaceType, ListingRef>,
}

/// Ссылка на товар маркетплейса
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRef {
    #[serde(rename = "listingId")]
    pub listing_id: String,

    pub sku: String,

    #[serde(default)]
    pub name: Option<String>,
}

impl CanonicalProduct {
    pub fn new(id: impl Into<String>, sku: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sku: sku.into(),
            name: name.into(),
            marketplace_links: BTreeMap::new(),
        }
    }

    /// Получить связь с указанным маркетплейсом
    pub fn link_for(&self, marketplace: MarketplaceType) -> Option<&ListingRef> {
        self.marketplace_links.get(&marketplace)
    }
}
