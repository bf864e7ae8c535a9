use crate::enums::marketplace_type::MarketplaceType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Категория в таксономии маркетплейса
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,

    pub name: String,

    /// Тип товара внутри категории (только Ozon)
    #[serde(rename = "typeId", default)]
    pub type_id: Option<i64>,

    pub marketplace: MarketplaceType,
}

/// Описание атрибута категории
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSchema {
    #[serde(rename = "attributeId")]
    pub attribute_id: i64,

    pub name: String,

    #[serde(rename = "isRequired", default)]
    pub is_required: bool,

    /// 0 или отсутствует - свободный текст, >0 - значение из справочника
    #[serde(rename = "dictionaryId", default)]
    pub dictionary_id: Option<i64>,

    #[serde(default)]
    pub description: Option<String>,

    /// Тип значения в терминах маркетплейса (String, Decimal, ...)
    #[serde(rename = "valueType", default)]
    pub value_type: Option<String>,

    #[serde(rename = "isCollection", default)]
    pub is_collection: bool,
}

impl AttributeSchema {
    pub fn is_dictionary(&self) -> bool {
        self.dictionary_id.map_or(false, |id| id > 0)
    }
}

/// Значение справочного атрибута
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub id: i64,

    pub value: String,

    #[serde(default)]
    pub info: Option<String>,
}

/// Ключ кэша справочных значений
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttributeValueKey {
    pub marketplace: MarketplaceType,

    #[serde(rename = "categoryId")]
    pub category_id: i64,

    #[serde(rename = "attributeId")]
    pub attribute_id: i64,

    #[serde(rename = "typeId", default)]
    pub type_id: Option<i64>,
}

impl AttributeValueKey {
    pub fn new(
        marketplace: MarketplaceType,
        category_id: i64,
        attribute_id: i64,
        type_id: Option<i64>,
    ) -> Self {
        Self {
            marketplace,
            category_id,
            attribute_id,
            type_id,
        }
    }
}

impl std::fmt::Display for AttributeValueKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.marketplace, self.category_id, self.attribute_id)?;
        if let Some(type_id) = self.type_id {
            write!(f, "/{}", type_id)?;
        }
        Ok(())
    }
}

/// Атрибут одного маркетплейса в составе объединенного атрибута
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceAttribute {
    pub marketplace: MarketplaceType,

    pub schema: AttributeSchema,
}

/// Объединенный атрибут нескольких маркетплейсов (ключ - название)
///
/// Производная структура, не сохраняется.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedAttribute {
    pub name: String,

    pub sources: Vec<SourceAttribute>,

    /// Маркетплейсы, принимающие атрибут
    pub marketplaces: BTreeSet<MarketplaceType>,

    /// Маркетплейсы, для которых атрибут обязателен
    #[serde(rename = "requiredFor")]
    pub required_for: BTreeSet<MarketplaceType>,
}

impl MergedAttribute {
    pub fn is_required(&self) -> bool {
        !self.required_for.is_empty()
    }

    pub fn is_dictionary(&self) -> bool {
        self.sources.iter().any(|s| s.schema.is_dictionary())
    }
}
