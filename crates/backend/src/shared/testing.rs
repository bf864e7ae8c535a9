//! In-memory реализации внешних сервисов для тестов

use crate::shared::data::remote_store::RemoteStore;
use crate::shared::marketplaces::MarketplaceGateway;
use async_trait::async_trait;
use contracts::domain::a004_nomenclature::CanonicalProduct;
use contracts::domain::a007_marketplace_product::MarketplaceListing;
use contracts::domain::a025_product_mapping::ProductMapping;
use contracts::domain::a026_mp_category::{
    AttributeSchema, AttributeValue, AttributeValueKey, Category,
};
use contracts::enums::marketplace_type::MarketplaceType;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct FakeGateway {
    pub categories: HashMap<MarketplaceType, Vec<Category>>,
    pub attributes: HashMap<(MarketplaceType, i64), Vec<AttributeSchema>>,
    pub values: HashMap<AttributeValueKey, Vec<AttributeValue>>,
    pub products: HashMap<MarketplaceType, Vec<serde_json::Value>>,
    /// Маркетплейсы, на которых любой запрос завершается ошибкой
    pub failing: HashSet<MarketplaceType>,
    /// Ключи справочников, запрос которых завершается ошибкой
    pub failing_values: HashSet<AttributeValueKey>,
    /// Задержка ответа справочника
    pub values_delay: Option<Duration>,
    pub search_calls: Mutex<Vec<String>>,
    pub value_calls: Mutex<HashMap<AttributeValueKey, usize>>,
    pub product_calls: AtomicUsize,
}

impl FakeGateway {
    pub fn value_calls_for(&self, key: &AttributeValueKey) -> usize {
        self.value_calls
            .lock()
            .unwrap()
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    pub fn searches(&self) -> Vec<String> {
        self.search_calls.lock().unwrap().clone()
    }

    fn check(&self, marketplace: MarketplaceType) -> anyhow::Result<()> {
        if self.failing.contains(&marketplace) {
            anyhow::bail!("{} is unavailable", marketplace);
        }
        Ok(())
    }
}

#[async_trait]
impl MarketplaceGateway for FakeGateway {
    async fn search_categories(
        &self,
        marketplace: MarketplaceType,
        query: &str,
    ) -> anyhow::Result<Vec<Category>> {
        self.search_calls.lock().unwrap().push(query.to_string());
        self.check(marketplace)?;
        let query = query.to_lowercase();
        Ok(self
            .categories
            .get(&marketplace)
            .map(|all| {
                all.iter()
                    .filter(|c| c.name.to_lowercase().contains(&query))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_category_attributes(
        &self,
        marketplace: MarketplaceType,
        category_id: i64,
        _type_id: Option<i64>,
    ) -> anyhow::Result<Vec<AttributeSchema>> {
        self.check(marketplace)?;
        Ok(self
            .attributes
            .get(&(marketplace, category_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn get_attribute_values(
        &self,
        key: &AttributeValueKey,
    ) -> anyhow::Result<Vec<AttributeValue>> {
        *self.value_calls.lock().unwrap().entry(*key).or_insert(0) += 1;
        if let Some(delay) = self.values_delay {
            tokio::time::sleep(delay).await;
        }
        self.check(key.marketplace)?;
        if self.failing_values.contains(key) {
            anyhow::bail!("dictionary {} is unavailable", key);
        }
        Ok(self.values.get(key).cloned().unwrap_or_default())
    }

    async fn list_products(
        &self,
        marketplace: MarketplaceType,
        _integration_id: Option<&str>,
    ) -> anyhow::Result<Vec<serde_json::Value>> {
        self.product_calls.fetch_add(1, Ordering::SeqCst);
        self.check(marketplace)?;
        Ok(self.products.get(&marketplace).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeStore {
    pub catalog: Vec<CanonicalProduct>,
    pub mappings: Mutex<BTreeMap<String, ProductMapping>>,
    /// ID товаров маркетплейса, сохранение которых завершается ошибкой
    pub failing_listings: HashSet<String>,
    pub fail_reads: bool,
    pub fail_deletes: bool,
    /// ID связей, удаление которых завершается ошибкой
    pub failing_deletes: HashSet<String>,
    pub save_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl FakeStore {
    pub fn with_catalog(catalog: Vec<CanonicalProduct>) -> Self {
        Self {
            catalog,
            ..Default::default()
        }
    }

    pub fn with_mappings(self, mappings: Vec<ProductMapping>) -> Self {
        {
            let mut stored = self.mappings.lock().unwrap();
            for m in mappings {
                stored.insert(m.id.clone(), m);
            }
        }
        self
    }

    pub fn stored(&self) -> Vec<ProductMapping> {
        self.mappings.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl RemoteStore for FakeStore {
    async fn get_catalog_products(&self) -> anyhow::Result<Vec<CanonicalProduct>> {
        if self.fail_reads {
            anyhow::bail!("store is unavailable");
        }
        Ok(self.catalog.clone())
    }

    async fn get_saved_mappings(&self) -> anyhow::Result<Vec<ProductMapping>> {
        if self.fail_reads {
            anyhow::bail!("store is unavailable");
        }
        Ok(self.stored())
    }

    async fn save_mappings(&self, mappings: &[ProductMapping]) -> anyhow::Result<()> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(m) = mappings
            .iter()
            .find(|m| self.failing_listings.contains(&m.marketplace_listing_id))
        {
            anyhow::bail!("write rejected for {}", m.id);
        }
        let mut stored = self.mappings.lock().unwrap();
        for m in mappings {
            stored.insert(m.id.clone(), m.clone());
        }
        Ok(())
    }

    async fn delete_mapping(&self, id: &str) -> anyhow::Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes || self.failing_deletes.contains(id) {
            anyhow::bail!("delete rejected for {}", id);
        }
        self.mappings.lock().unwrap().remove(id);
        Ok(())
    }
}

pub fn listing(marketplace: MarketplaceType, id: &str, sku: &str) -> MarketplaceListing {
    MarketplaceListing {
        id: id.to_string(),
        sku: sku.to_string(),
        name: format!("Товар {}", sku),
        barcode: None,
        photos: Vec::new(),
        marketplace,
        characteristics: None,
    }
}

pub fn product(id: &str, sku: &str) -> CanonicalProduct {
    CanonicalProduct::new(id, sku, format!("Каталог {}", sku))
}

pub fn attr(id: i64, name: &str, required: bool, dictionary_id: Option<i64>) -> AttributeSchema {
    AttributeSchema {
        attribute_id: id,
        name: name.to_string(),
        is_required: required,
        dictionary_id,
        description: None,
        value_type: None,
        is_collection: false,
    }
}
