use super::merger;
use super::service::CategoryAttributeResolver;
use crate::shared::debounce::{DebouncedScheduler, QueryResult};
use crate::shared::errors::ReconcileError;
use contracts::domain::a007_marketplace_product::{AssignedValue, AttributeAssignment};
use contracts::domain::a026_mp_category::{
    AttributeSchema, AttributeValue, AttributeValueKey, Category, MergedAttribute,
};
use contracts::enums::marketplace_type::MarketplaceType;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

/// Выбранная категория маркетплейса и ее обязательные атрибуты
#[derive(Debug, Clone)]
pub struct CategorySelection {
    pub category: Category,
    pub attributes: Vec<AttributeSchema>,
}

impl CategorySelection {
    fn value_key(&self, attribute_id: i64) -> AttributeValueKey {
        AttributeValueKey::new(
            self.category.marketplace,
            self.category.id,
            attribute_id,
            self.category.type_id,
        )
    }
}

/// Сессия заполнения атрибутов товара для нескольких маркетплейсов
///
/// Владеет кэшем справочников (через резолвер), выбранными категориями,
/// объединенным списком атрибутов и введенными значениями. Значения
/// хранятся по названию объединенного атрибута и при сборке
/// раскладываются по всем маркетплейсам, где этот атрибут есть.
pub struct AttributeEditingSession {
    resolver: CategoryAttributeResolver,
    priority: Vec<MarketplaceType>,
    selections: BTreeMap<MarketplaceType, CategorySelection>,
    merged: Vec<MergedAttribute>,
    values: HashMap<String, String>,
    category_search: DebouncedScheduler<Vec<Category>>,
}

impl AttributeEditingSession {
    /// `priority` - порядок маркетплейсов при объединении атрибутов.
    /// Пустой список означает все маркетплейсы в стандартном порядке.
    pub fn new(
        resolver: CategoryAttributeResolver,
        priority: Vec<MarketplaceType>,
        debounce_window: Duration,
    ) -> Self {
        let mut seen = HashSet::new();
        let mut priority: Vec<MarketplaceType> =
            priority.into_iter().filter(|mp| seen.insert(*mp)).collect();
        if priority.is_empty() {
            priority = MarketplaceType::all();
        }

        let category_search = DebouncedScheduler::new(debounce_window, resolver.min_query_len());
        Self {
            resolver,
            priority,
            selections: BTreeMap::new(),
            merged: Vec::new(),
            values: HashMap::new(),
            category_search,
        }
    }

    pub fn priority(&self) -> &[MarketplaceType] {
        &self.priority
    }

    pub fn merged(&self) -> &[MergedAttribute] {
        &self.merged
    }

    pub fn selection(&self, marketplace: MarketplaceType) -> Option<&CategorySelection> {
        self.selections.get(&marketplace)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name.trim()).map(|v| v.as_str())
    }

    /// Поиск категорий при наборе текста: запрос уходит после окна тишины,
    /// результат доступен через [`latest_categories`](Self::latest_categories)
    pub fn type_category_query(&self, marketplace: MarketplaceType, query: &str) -> bool {
        let resolver = self.resolver.clone();
        self.category_search.schedule(query, move |q| async move {
            resolver.search_categories(marketplace, &q).await
        })
    }

    pub fn latest_categories(&self) -> Option<QueryResult<Vec<Category>>> {
        self.category_search.latest()
    }

    /// Выбрать категорию маркетплейса: загрузить обязательные атрибуты
    /// и пересобрать объединенный список. При ошибке состояние не меняется.
    pub async fn select_category(
        &mut self,
        category: Category,
    ) -> Result<&[MergedAttribute], ReconcileError> {
        let marketplace = category.marketplace;
        if !self.priority.contains(&marketplace) {
            return Err(ReconcileError::Validation(format!(
                "{} is not part of this session",
                marketplace
            )));
        }

        self.category_search.cancel();
        let attributes = self
            .resolver
            .load_attributes(marketplace, category.id, category.type_id)
            .await?;

        tracing::info!(
            "Selected {} category {} '{}' with {} required attributes",
            marketplace,
            category.id,
            category.name,
            attributes.len()
        );
        self.selections.insert(
            marketplace,
            CategorySelection {
                category,
                attributes,
            },
        );
        self.rebuild();
        Ok(&self.merged)
    }

    pub fn clear_category(&mut self, marketplace: MarketplaceType) -> bool {
        let removed = self.selections.remove(&marketplace).is_some();
        if removed {
            self.rebuild();
        }
        removed
    }

    fn rebuild(&mut self) {
        let schemas: Vec<(MarketplaceType, Vec<AttributeSchema>)> = self
            .priority
            .iter()
            .filter_map(|mp| {
                self.selections
                    .get(mp)
                    .map(|s| (*mp, s.attributes.clone()))
            })
            .collect();
        self.merged = merger::merge(&schemas);

        let names: HashSet<&str> = self.merged.iter().map(|m| m.name.as_str()).collect();
        self.values.retain(|name, _| names.contains(name.as_str()));
    }

    fn find(&self, name: &str) -> Result<&MergedAttribute, ReconcileError> {
        let name = name.trim();
        self.merged
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| ReconcileError::Validation(format!("Unknown attribute '{}'", name)))
    }

    /// Справочные значения атрибута по всем маркетплейсам (без повторов)
    ///
    /// Недоступный справочник пропускается. Ошибка возвращается, только если
    /// не загрузился ни один справочник.
    pub async fn dictionary_values(
        &self,
        name: &str,
    ) -> Result<Vec<AttributeValue>, ReconcileError> {
        let attribute = self.find(name)?;
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        let mut loaded = false;
        let mut last_error = None;
        for (key, _) in self.dictionary_keys(attribute) {
            match self.resolver.cache().get_values(&key).await {
                Ok(values) => {
                    loaded = true;
                    for value in values {
                        if seen.insert(value.value.clone()) {
                            result.push(value);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Dictionary {} for '{}' skipped: {}", key, attribute.name, e);
                    last_error = Some(e);
                }
            }
        }
        match last_error {
            Some(e) if !loaded => Err(e),
            _ => Ok(result),
        }
    }

    fn dictionary_keys(&self, attribute: &MergedAttribute) -> Vec<(AttributeValueKey, MarketplaceType)> {
        attribute
            .sources
            .iter()
            .filter(|s| s.schema.is_dictionary())
            .filter_map(|s| {
                self.selections
                    .get(&s.marketplace)
                    .map(|sel| (sel.value_key(s.schema.attribute_id), s.marketplace))
            })
            .collect()
    }

    /// Ввести значение атрибута
    ///
    /// Пустое значение очищает поле. Для справочного атрибута значение
    /// должно быть в справочнике хотя бы одного маркетплейса. Ошибка загрузки
    /// справочника возвращается, только если недоступны все справочники.
    pub async fn set_value(&mut self, name: &str, value: &str) -> Result<(), ReconcileError> {
        let attribute = self.find(name)?;
        let key = attribute.name.clone();
        let value = value.trim();

        if value.is_empty() {
            self.values.remove(&key);
            return Ok(());
        }

        let dictionaries = self.dictionary_keys(attribute);
        if !dictionaries.is_empty() {
            let mut known = false;
            let mut failures = Vec::new();
            for (dictionary, _) in &dictionaries {
                match self.resolver.cache().get_values(dictionary).await {
                    Ok(values) if values.iter().any(|v| v.value == value) => {
                        known = true;
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!("Dictionary {} for '{}' skipped: {}", dictionary, key, e);
                        failures.push(e);
                    }
                }
            }
            if !known && failures.len() == dictionaries.len() {
                if let Some(e) = failures.pop() {
                    return Err(e);
                }
            }
            if !known {
                return Err(ReconcileError::Validation(format!(
                    "'{}' is not an allowed value for '{}'",
                    value, key
                )));
            }
        }

        self.values.insert(key, value.to_string());
        Ok(())
    }

    /// Проверить, что заполнены все обязательные атрибуты
    pub fn validate(&self) -> Result<(), ReconcileError> {
        let missing: Vec<String> = self
            .merged
            .iter()
            .filter(|m| m.is_required() && !self.values.contains_key(&m.name))
            .map(|m| m.name.clone())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ReconcileError::MissingRequiredValues(missing))
        }
    }

    /// Собрать значения атрибутов для отправки на каждый маркетплейс
    pub fn build_payloads(
        &self,
    ) -> Result<BTreeMap<MarketplaceType, Vec<AttributeAssignment>>, ReconcileError> {
        self.validate()?;

        let mut payloads: BTreeMap<MarketplaceType, Vec<AttributeAssignment>> = self
            .selections
            .keys()
            .map(|mp| (*mp, Vec::new()))
            .collect();

        for attribute in &self.merged {
            let Some(value) = self.values.get(&attribute.name) else {
                continue;
            };
            for source in &attribute.sources {
                let Some(selection) = self.selections.get(&source.marketplace) else {
                    continue;
                };
                let dictionary_value_id = if source.schema.is_dictionary() {
                    let id = self
                        .resolver
                        .cache()
                        .cached(&selection.value_key(source.schema.attribute_id))
                        .and_then(|values| values.into_iter().find(|v| &v.value == value))
                        .map(|v| v.id);
                    if id.is_none() {
                        tracing::warn!(
                            "'{}' for '{}' is not in the {} dictionary, sent as text",
                            value,
                            attribute.name,
                            source.marketplace
                        );
                    }
                    id
                } else {
                    None
                };

                payloads
                    .entry(source.marketplace)
                    .or_default()
                    .push(AttributeAssignment {
                        attribute_id: source.schema.attribute_id,
                        name: Some(source.schema.name.clone()),
                        values: vec![AssignedValue {
                            dictionary_value_id,
                            value: value.clone(),
                        }],
                    });
            }
        }

        Ok(payloads)
    }
}
