use crate::domain::a004_nomenclature::ListingRef;
use crate::enums::marketplace_type::MarketplaceType;
use serde::{Deserialize, Serialize};

/// Товар в том виде, в котором его отдает маркетплейс (после нормализации)
///
/// Создается при загрузке снимка и больше не изменяется.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceListing {
    /// Внутренний ID товара в маркетплейсе
    pub id: String,

    /// Артикул продавца на маркетплейсе
    pub sku: String,

    pub name: String,

    #[serde(default)]
    pub barcode: Option<String>,

    #[serde(default)]
    pub photos: Vec<String>,

    pub marketplace: MarketplaceType,

    #[serde(default)]
    pub characteristics: Option<Vec<AttributeAssignment>>,
}

/// Значение характеристики товара
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeAssignment {
    #[serde(rename = "attributeId")]
    pub attribute_id: i64,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub values: Vec<AssignedValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedValue {
    /// ID значения из справочника (для словарных атрибутов)
    #[serde(rename = "dictionaryValueId", default)]
    pub dictionary_value_id: Option<i64>,

    pub value: String,
}

impl MarketplaceListing {
    /// Ключ товара: (маркетплейс, ID в маркетплейсе)
    pub fn key(&self) -> (MarketplaceType, &str) {
        (self.marketplace, self.id.as_str())
    }

    pub fn to_listing_ref(&self) -> ListingRef {
        ListingRef {
            listing_id: self.id.clone(),
            sku: self.sku.clone(),
            name: Some(self.name.clone()),
        }
    }
}
