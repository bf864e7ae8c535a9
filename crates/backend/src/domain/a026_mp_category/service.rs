use super::attribute_cache::AttributeValueCache;
use crate::shared::errors::ReconcileError;
use crate::shared::marketplaces::MarketplaceGateway;
use contracts::domain::a026_mp_category::{AttributeSchema, AttributeValueKey, Category};
use contracts::enums::marketplace_type::MarketplaceType;
use std::collections::HashSet;
use std::sync::Arc;

/// Поиск категорий и загрузка обязательных атрибутов
#[derive(Clone)]
pub struct CategoryAttributeResolver {
    gateway: Arc<dyn MarketplaceGateway>,
    cache: AttributeValueCache,
    min_query_len: usize,
}

impl CategoryAttributeResolver {
    pub fn new(gateway: Arc<dyn MarketplaceGateway>, min_query_len: usize) -> Self {
        let cache = AttributeValueCache::new(Arc::clone(&gateway));
        Self {
            gateway,
            cache,
            min_query_len,
        }
    }

    pub fn cache(&self) -> &AttributeValueCache {
        &self.cache
    }

    pub fn min_query_len(&self) -> usize {
        self.min_query_len
    }

    /// Поиск категорий по подстроке
    ///
    /// Короткий запрос не отправляется. Ошибка маркетплейса логируется,
    /// вызывающий получает пустой список.
    pub async fn search_categories(
        &self,
        marketplace: MarketplaceType,
        query: &str,
    ) -> Vec<Category> {
        let query = query.trim();
        if query.chars().count() < self.min_query_len {
            return Vec::new();
        }

        match self.gateway.search_categories(marketplace, query).await {
            Ok(categories) => {
                tracing::debug!(
                    "Found {} {} categories for '{}'",
                    categories.len(),
                    marketplace,
                    query
                );
                categories
            }
            Err(e) => {
                tracing::error!(
                    "Category search failed for {} '{}': {}",
                    marketplace,
                    query,
                    e
                );
                Vec::new()
            }
        }
    }

    /// Обязательные атрибуты категории без подгрузки справочников
    ///
    /// Дубли по ID отбрасываются (первый выигрывает).
    pub async fn required_attributes(
        &self,
        marketplace: MarketplaceType,
        category_id: i64,
        type_id: Option<i64>,
    ) -> Result<Vec<AttributeSchema>, ReconcileError> {
        let all = self
            .gateway
            .get_category_attributes(marketplace, category_id, type_id)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to load attributes for {} category {}: {}",
                    marketplace,
                    category_id,
                    e
                );
                ReconcileError::remote(
                    format!("get_category_attributes {}/{}", marketplace, category_id),
                    e,
                )
            })?;

        let total = all.len();
        let mut seen = HashSet::new();
        let required: Vec<AttributeSchema> = all
            .into_iter()
            .filter(|a| seen.insert(a.attribute_id))
            .filter(|a| a.is_required)
            .collect();

        tracing::info!(
            "{} category {}: {} attributes, {} required",
            marketplace,
            category_id,
            total,
            required.len()
        );
        Ok(required)
    }

    /// Обязательные атрибуты категории
    ///
    /// Справочники обязательных атрибутов сразу подгружаются в кэш;
    /// ошибка подгрузки не мешает вернуть схему.
    pub async fn load_attributes(
        &self,
        marketplace: MarketplaceType,
        category_id: i64,
        type_id: Option<i64>,
    ) -> Result<Vec<AttributeSchema>, ReconcileError> {
        let required = self
            .required_attributes(marketplace, category_id, type_id)
            .await?;

        let keys: Vec<AttributeValueKey> = required
            .iter()
            .filter(|a| a.is_dictionary())
            .map(|a| AttributeValueKey::new(marketplace, category_id, a.attribute_id, type_id))
            .collect();
        if !keys.is_empty() {
            let failed = self.cache.prefetch(&keys).await;
            if failed > 0 {
                tracing::warn!(
                    "Prefetch of {} category {}: {} of {} dictionaries failed",
                    marketplace,
                    category_id,
                    failed,
                    keys.len()
                );
            }
        }

        Ok(required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::testing::{attr, FakeGateway};
    use contracts::domain::a026_mp_category::AttributeValue;

    fn category(id: i64, name: &str) -> Category {
        Category {
            id,
            name: name.to_string(),
            type_id: None,
            marketplace: MarketplaceType::Ozon,
        }
    }

    fn color_value(id: i64, value: &str) -> AttributeValue {
        AttributeValue {
            id,
            value: value.to_string(),
            info: None,
        }
    }

    #[tokio::test]
    async fn test_short_query_is_not_sent() {
        let gateway = Arc::new(FakeGateway::default());
        let resolver = CategoryAttributeResolver::new(gateway.clone(), 2);

        assert!(resolver.search_categories(MarketplaceType::Ozon, " к ").await.is_empty());
        assert!(gateway.searches().is_empty());
    }

    #[tokio::test]
    async fn test_search_returns_matches() {
        let mut gateway = FakeGateway::default();
        gateway.categories.insert(
            MarketplaceType::Ozon,
            vec![category(1, "Кружки"), category(2, "Тарелки"), category(3, "Кружки и чашки")],
        );
        let gateway = Arc::new(gateway);
        let resolver = CategoryAttributeResolver::new(gateway.clone(), 2);

        let found = resolver.search_categories(MarketplaceType::Ozon, "круж").await;
        let ids: Vec<i64> = found.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(gateway.searches(), vec!["круж".to_string()]);
    }

    #[tokio::test]
    async fn test_search_failure_yields_empty_list() {
        let mut gateway = FakeGateway::default();
        gateway.failing.insert(MarketplaceType::Wildberries);
        let resolver = CategoryAttributeResolver::new(Arc::new(gateway), 2);

        let found = resolver
            .search_categories(MarketplaceType::Wildberries, "платья")
            .await;
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_load_attributes_filters_required_and_dedupes() {
        let mut gateway = FakeGateway::default();
        gateway.attributes.insert(
            (MarketplaceType::Ozon, 17),
            vec![
                attr(85, "Бренд", true, None),
                attr(4180, "Название", false, None),
                attr(85, "Бренд (дубль)", true, None),
                attr(10096, "Цвет", true, Some(10096)),
            ],
        );
        let resolver = CategoryAttributeResolver::new(Arc::new(gateway), 2);

        let required = resolver
            .load_attributes(MarketplaceType::Ozon, 17, None)
            .await
            .unwrap();
        let names: Vec<&str> = required.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Бренд", "Цвет"]);
    }

    #[tokio::test]
    async fn test_load_attributes_prefetches_dictionaries() {
        let key = AttributeValueKey::new(MarketplaceType::Ozon, 17, 10096, Some(94765));
        let mut gateway = FakeGateway::default();
        gateway.attributes.insert(
            (MarketplaceType::Ozon, 17),
            vec![
                attr(10096, "Цвет", true, Some(10096)),
                attr(9048, "Материал", false, Some(9048)),
            ],
        );
        gateway
            .values
            .insert(key, vec![color_value(1, "красный"), color_value(2, "синий")]);
        let gateway = Arc::new(gateway);
        let resolver = CategoryAttributeResolver::new(gateway.clone(), 2);

        resolver
            .load_attributes(MarketplaceType::Ozon, 17, Some(94765))
            .await
            .unwrap();

        assert_eq!(gateway.value_calls_for(&key), 1);
        assert_eq!(resolver.cache().cached(&key).map(|v| v.len()), Some(2));
        let optional = AttributeValueKey::new(MarketplaceType::Ozon, 17, 9048, Some(94765));
        assert_eq!(gateway.value_calls_for(&optional), 0);

        // Повторное обращение берется из кэша
        resolver.cache().get_values(&key).await.unwrap();
        assert_eq!(gateway.value_calls_for(&key), 1);
    }

    #[tokio::test]
    async fn test_prefetch_failure_does_not_fail_load() {
        let key = AttributeValueKey::new(MarketplaceType::Ozon, 17, 10096, None);
        let mut gateway = FakeGateway::default();
        gateway
            .attributes
            .insert((MarketplaceType::Ozon, 17), vec![attr(10096, "Цвет", true, Some(10096))]);
        gateway.failing_values.insert(key);
        let resolver = CategoryAttributeResolver::new(Arc::new(gateway), 2);

        let required = resolver
            .load_attributes(MarketplaceType::Ozon, 17, None)
            .await
            .unwrap();
        assert_eq!(required.len(), 1);
        assert!(resolver.cache().cached(&key).is_none());
    }

    #[tokio::test]
    async fn test_load_attributes_remote_failure() {
        let mut gateway = FakeGateway::default();
        gateway.failing.insert(MarketplaceType::YandexMarket);
        let resolver = CategoryAttributeResolver::new(Arc::new(gateway), 2);

        let err = resolver
            .load_attributes(MarketplaceType::YandexMarket, 5, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::RemoteFetchFailed { .. }));
    }
}
