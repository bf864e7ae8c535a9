use super::service::suggest_products;
use crate::shared::debounce::{DebouncedScheduler, QueryResult};
use contracts::domain::a004_nomenclature::CanonicalProduct;
use std::sync::Arc;
use std::time::Duration;

/// Выбор товара каталога для ручной связи: подсказки при наборе текста
pub struct ProductPicker {
    catalog: Arc<Vec<CanonicalProduct>>,
    limit: usize,
    scheduler: DebouncedScheduler<Vec<CanonicalProduct>>,
}

impl ProductPicker {
    pub fn new(catalog: Vec<CanonicalProduct>, limit: usize, window: Duration, min_len: usize) -> Self {
        Self {
            catalog: Arc::new(catalog),
            limit,
            scheduler: DebouncedScheduler::new(window, min_len),
        }
    }

    pub fn type_query(&self, query: &str) -> bool {
        let catalog = Arc::clone(&self.catalog);
        let limit = self.limit;
        self.scheduler
            .schedule(query, move |q| async move { suggest_products(&catalog, &q, limit) })
    }

    pub fn latest(&self) -> Option<QueryResult<Vec<CanonicalProduct>>> {
        self.scheduler.latest()
    }
}
