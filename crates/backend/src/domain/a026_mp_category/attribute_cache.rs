use crate::shared::errors::ReconcileError;
use crate::shared::marketplaces::MarketplaceGateway;
use contracts::domain::a026_mp_category::{AttributeValue, AttributeValueKey};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

type Slot = Arc<OnceCell<Arc<Vec<AttributeValue>>>>;

/// Кэш значений справочных атрибутов на время сессии редактирования
///
/// Ключ - (маркетплейс, категория, атрибут, тип). Параллельные запросы
/// одного ключа ждут одну загрузку. TTL нет: кэш живет, пока жива сессия.
#[derive(Clone)]
pub struct AttributeValueCache {
    gateway: Arc<dyn MarketplaceGateway>,
    slots: Arc<Mutex<HashMap<AttributeValueKey, Slot>>>,
}

impl AttributeValueCache {
    pub fn new(gateway: Arc<dyn MarketplaceGateway>) -> Self {
        Self {
            gateway,
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn slot(&self, key: &AttributeValueKey) -> Slot {
        match self.slots.lock() {
            Ok(mut slots) => Arc::clone(slots.entry(*key).or_default()),
            // Отравленный мьютекс: работаем без кэша, но корректно
            Err(_) => Arc::new(OnceCell::new()),
        }
    }

    /// Получить значения справочника, загрузив их при первом обращении
    pub async fn get_values(
        &self,
        key: &AttributeValueKey,
    ) -> Result<Vec<AttributeValue>, ReconcileError> {
        let slot = self.slot(key);
        let values = slot
            .get_or_try_init(|| async {
                tracing::debug!("Loading attribute values for {}", key);
                let values = self.gateway.get_attribute_values(key).await?;
                tracing::info!("Loaded {} attribute values for {}", values.len(), key);
                Ok::<_, anyhow::Error>(Arc::new(values))
            })
            .await
            .map_err(|e| {
                tracing::error!("Failed to load attribute values for {}: {}", key, e);
                self.discard_empty(key, &slot);
                ReconcileError::remote(format!("get_attribute_values {}", key), e)
            })?;
        Ok((**values).clone())
    }

    /// Убрать пустой слот после неудачной загрузки, если его не заменили
    fn discard_empty(&self, key: &AttributeValueKey, slot: &Slot) {
        if let Ok(mut slots) = self.slots.lock() {
            let stale = slots
                .get(key)
                .is_some_and(|current| Arc::ptr_eq(current, slot) && !current.initialized());
            if stale {
                slots.remove(key);
            }
        }
    }

    /// Значения из кэша без обращения к маркетплейсу
    pub fn cached(&self, key: &AttributeValueKey) -> Option<Vec<AttributeValue>> {
        let slots = self.slots.lock().ok()?;
        slots
            .get(key)
            .and_then(|slot| slot.get())
            .map(|values| (**values).clone())
    }

    /// Удалить одну запись. Загрузка, начатая до удаления, завершится
    /// для своих ожидающих, но в кэш уже не попадет.
    ///
    /// Возвращает `true`, только если значения были загружены.
    pub fn invalidate(&self, key: &AttributeValueKey) -> bool {
        match self.slots.lock() {
            Ok(mut slots) => slots
                .remove(key)
                .is_some_and(|slot| slot.initialized()),
            Err(_) => false,
        }
    }

    pub fn clear(&self) {
        if let Ok(mut slots) = self.slots.lock() {
            slots.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .map(|slots| slots.values().filter(|s| s.initialized()).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Загрузить справочники заранее. Ошибки отдельных справочников
    /// только логируются; возвращается число неудачных загрузок.
    pub async fn prefetch(&self, keys: &[AttributeValueKey]) -> usize {
        let mut failed = 0;
        for key in keys {
            if let Err(e) = self.get_values(key).await {
                tracing::warn!("Prefetch of {} skipped: {}", key, e);
                failed += 1;
            }
        }
        failed
    }
}
