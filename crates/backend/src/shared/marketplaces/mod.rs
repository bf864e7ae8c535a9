pub mod http_gateway;
pub mod ozon;
pub mod wildberries;
pub mod yandex_market;

use crate::shared::errors::ReconcileError;
use async_trait::async_trait;
use contracts::domain::a007_marketplace_product::MarketplaceListing;
use contracts::domain::a026_mp_category::{
    AttributeSchema, AttributeValue, AttributeValueKey, Category,
};
use contracts::enums::marketplace_type::MarketplaceType;

/// Шлюз к API маркетплейсов
///
/// Категории и атрибуты приходят уже в общем виде, товары - как есть,
/// их форму приводит к общему виду [`normalize`].
#[async_trait]
pub trait MarketplaceGateway: Send + Sync {
    async fn search_categories(
        &self,
        marketplace: MarketplaceType,
        query: &str,
    ) -> anyhow::Result<Vec<Category>>;

    async fn get_category_attributes(
        &self,
        marketplace: MarketplaceType,
        category_id: i64,
        type_id: Option<i64>,
    ) -> anyhow::Result<Vec<AttributeSchema>>;

    async fn get_attribute_values(
        &self,
        key: &AttributeValueKey,
    ) -> anyhow::Result<Vec<AttributeValue>>;

    async fn list_products(
        &self,
        marketplace: MarketplaceType,
        integration_id: Option<&str>,
    ) -> anyhow::Result<Vec<serde_json::Value>>;
}

/// Товар маркетплейса в исходном формате
#[derive(Debug, Clone)]
pub enum RawListing {
    Ozon(ozon::OzonRawProduct),
    Wildberries(wildberries::WbRawCard),
    YandexMarket(yandex_market::YandexRawEntry),
}

impl RawListing {
    pub fn parse(
        raw: &serde_json::Value,
        marketplace: MarketplaceType,
    ) -> Result<Self, ReconcileError> {
        let parsed = match marketplace {
            MarketplaceType::Ozon => {
                serde_json::from_value(raw.clone()).map(RawListing::Ozon)
            }
            MarketplaceType::Wildberries => {
                serde_json::from_value(raw.clone()).map(RawListing::Wildberries)
            }
            MarketplaceType::YandexMarket => {
                yandex_market::YandexRawEntry::from_value(raw).map(RawListing::YandexMarket)
            }
        };
        parsed.map_err(|e| ReconcileError::MalformedListing {
            marketplace,
            field: "payload",
            hint: Some(e.to_string()),
        })
    }

    pub fn marketplace(&self) -> MarketplaceType {
        match self {
            RawListing::Ozon(_) => MarketplaceType::Ozon,
            RawListing::Wildberries(_) => MarketplaceType::Wildberries,
            RawListing::YandexMarket(_) => MarketplaceType::YandexMarket,
        }
    }

    pub fn into_listing(self) -> Result<MarketplaceListing, ReconcileError> {
        match self {
            RawListing::Ozon(p) => p.into_listing(),
            RawListing::Wildberries(c) => c.into_listing(),
            RawListing::YandexMarket(e) => e.into_listing(),
        }
    }
}

/// Привести товар маркетплейса к общему виду
pub fn normalize(
    raw: &serde_json::Value,
    marketplace: MarketplaceType,
) -> Result<MarketplaceListing, ReconcileError> {
    RawListing::parse(raw, marketplace)?.into_listing()
}

/// Нормализовать выгрузку целиком: некорректные строки пропускаются
/// и возвращаются отдельно, пакет не прерывается
pub fn normalize_batch(
    raws: &[serde_json::Value],
    marketplace: MarketplaceType,
) -> (Vec<MarketplaceListing>, Vec<ReconcileError>) {
    let mut listings = Vec::with_capacity(raws.len());
    let mut skipped = Vec::new();

    for (index, raw) in raws.iter().enumerate() {
        match normalize(raw, marketplace) {
            Ok(listing) => listings.push(listing),
            Err(e) => {
                tracing::warn!("Skipping {} listing #{}: {}", marketplace, index, e);
                skipped.push(e);
            }
        }
    }

    tracing::info!(
        "Normalized {} {} listings ({} skipped)",
        listings.len(),
        marketplace,
        skipped.len()
    );

    (listings, skipped)
}

/// ID может прийти числом или строкой
pub(crate) fn id_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => non_blank(Some(s.as_str())),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub(crate) fn collect_image_urls(value: &serde_json::Value, out: &mut Vec<String>) {
    match value {
        serde_json::Value::String(s) => {
            if let Some(url) = non_blank(Some(s.as_str())) {
                if !out.contains(&url) {
                    out.push(url);
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                collect_image_urls(item, out);
            }
        }
        _ => {}
    }
}
