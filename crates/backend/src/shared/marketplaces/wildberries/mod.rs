use super::{id_to_string, non_blank};
use crate::shared::errors::ReconcileError;
use contracts::domain::a007_marketplace_product::{
    AssignedValue, AttributeAssignment, MarketplaceListing,
};
use contracts::enums::marketplace_type::MarketplaceType;
use serde::Deserialize;

/// Карточка товара Wildberries (content/v2/get/cards/list)
#[derive(Debug, Clone, Deserialize)]
pub struct WbRawCard {
    #[serde(rename = "nmID", default)]
    pub nm_id: Option<serde_json::Value>,
    #[serde(rename = "vendorCode", default)]
    pub vendor_code: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub photos: Vec<WbRawPhoto>,
    #[serde(default)]
    pub sizes: Vec<WbRawSize>,
    #[serde(default)]
    pub characteristics: Vec<WbRawCharacteristic>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WbRawPhoto {
    #[serde(default)]
    pub big: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WbRawSize {
    /// Старый формат API отдавал один штрихкод
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub skus: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WbRawCharacteristic {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    /// Строка, число или массив
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

impl WbRawCard {
    pub fn into_listing(self) -> Result<MarketplaceListing, ReconcileError> {
        let malformed = |field: &'static str, hint: Option<String>| {
            ReconcileError::MalformedListing {
                marketplace: MarketplaceType::Wildberries,
                field,
                hint,
            }
        };

        let id = self
            .nm_id
            .as_ref()
            .and_then(id_to_string)
            .ok_or_else(|| malformed("nmID", non_blank(self.vendor_code.as_deref())))?;
        let sku = non_blank(self.vendor_code.as_deref())
            .ok_or_else(|| malformed("vendorCode", Some(id.clone())))?;
        let name =
            non_blank(self.title.as_deref()).ok_or_else(|| malformed("title", Some(id.clone())))?;

        let barcode = self.sizes.iter().find_map(|size| {
            size.skus
                .iter()
                .find_map(|s| non_blank(Some(s.as_str())))
                .or_else(|| non_blank(size.barcode.as_deref()))
        });

        let photos = self
            .photos
            .iter()
            .filter_map(|p| non_blank(p.big.as_deref()))
            .collect();

        let characteristics: Vec<AttributeAssignment> = self
            .characteristics
            .into_iter()
            .filter_map(|c| {
                let attribute_id = c.id?;
                let mut values = Vec::new();
                if let Some(value) = &c.value {
                    collect_values(value, &mut values);
                }
                Some(AttributeAssignment {
                    attribute_id,
                    name: c.name,
                    values,
                })
            })
            .collect();

        Ok(MarketplaceListing {
            id,
            sku,
            name,
            barcode,
            photos,
            marketplace: MarketplaceType::Wildberries,
            characteristics: if characteristics.is_empty() {
                None
            } else {
                Some(characteristics)
            },
        })
    }
}

fn collect_values(value: &serde_json::Value, out: &mut Vec<AssignedValue>) {
    match value {
        serde_json::Value::Array(items) => {
            for item in items {
                collect_values(item, out);
            }
        }
        serde_json::Value::String(s) => out.push(AssignedValue {
            dictionary_value_id: None,
            value: s.clone(),
        }),
        serde_json::Value::Number(n) => out.push(AssignedValue {
            dictionary_value_id: None,
            value: n.to_string(),
        }),
        serde_json::Value::Bool(b) => out.push(AssignedValue {
            dictionary_value_id: None,
            value: b.to_string(),
        }),
        _ => {}
    }
}
