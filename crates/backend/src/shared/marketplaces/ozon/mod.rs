use super::{collect_image_urls, id_to_string, non_blank};
use crate::shared::errors::ReconcileError;
use contracts::domain::a007_marketplace_product::{
    AssignedValue, AttributeAssignment, MarketplaceListing,
};
use contracts::enums::marketplace_type::MarketplaceType;
use serde::Deserialize;

/// Товар Ozon в формате /v3/product/info/list (только используемые поля)
#[derive(Debug, Clone, Deserialize)]
pub struct OzonRawProduct {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    /// В /v3/product/list поле называется product_id
    #[serde(default)]
    pub product_id: Option<serde_json::Value>,
    #[serde(default)]
    pub offer_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub barcodes: Vec<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    /// Строка в старых версиях API, массив в /v3
    #[serde(default)]
    pub primary_image: Option<serde_json::Value>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<OzonRawAttribute>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OzonRawAttribute {
    #[serde(default, alias = "attribute_id")]
    pub id: Option<i64>,
    #[serde(default)]
    pub values: Vec<OzonRawAttributeValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OzonRawAttributeValue {
    /// 0 - значение не из справочника
    #[serde(default)]
    pub dictionary_value_id: Option<i64>,
    #[serde(default)]
    pub value: Option<String>,
}

impl OzonRawProduct {
    pub fn into_listing(self) -> Result<MarketplaceListing, ReconcileError> {
        let malformed = |field: &'static str, hint: Option<String>| {
            ReconcileError::MalformedListing {
                marketplace: MarketplaceType::Ozon,
                field,
                hint,
            }
        };

        let id = self
            .id
            .as_ref()
            .and_then(id_to_string)
            .or_else(|| self.product_id.as_ref().and_then(id_to_string))
            .ok_or_else(|| malformed("id", non_blank(self.offer_id.as_deref())))?;
        let sku = non_blank(self.offer_id.as_deref())
            .ok_or_else(|| malformed("offer_id", Some(id.clone())))?;
        let name =
            non_blank(self.name.as_deref()).ok_or_else(|| malformed("name", Some(id.clone())))?;

        let barcode = self
            .barcodes
            .iter()
            .find_map(|b| non_blank(Some(b.as_str())))
            .or_else(|| non_blank(self.barcode.as_deref()));

        let mut photos = Vec::new();
        if let Some(primary) = &self.primary_image {
            collect_image_urls(primary, &mut photos);
        }
        for image in &self.images {
            if let Some(url) = non_blank(Some(image.as_str())) {
                if !photos.contains(&url) {
                    photos.push(url);
                }
            }
        }

        let characteristics: Vec<AttributeAssignment> = self
            .attributes
            .into_iter()
            .filter_map(|attr| {
                let attribute_id = attr.id?;
                let values = attr
                    .values
                    .into_iter()
                    .filter_map(|v| {
                        Some(AssignedValue {
                            dictionary_value_id: v.dictionary_value_id.filter(|id| *id > 0),
                            value: v.value?,
                        })
                    })
                    .collect();
                Some(AttributeAssignment {
                    attribute_id,
                    name: None,
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
            marketplace: MarketplaceType::Ozon,
            characteristics: if characteristics.is_empty() {
                None
            } else {
                Some(characteristics)
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<MarketplaceListing, ReconcileError> {
        serde_json::from_value::<OzonRawProduct>(value)
            .unwrap()
            .into_listing()
    }

    #[test]
    fn test_full_product() {
        let listing = parse(json!({
            "id": 123456,
            "offer_id": "ABC-100",
            "name": "Смеситель",
            "barcodes": ["", "4600000000017"],
            "primary_image": ["https://cdn/1.jpg"],
            "images": ["https://cdn/1.jpg", "https://cdn/2.jpg"],
            "attributes": [
                {"id": 10096, "values": [{"dictionary_value_id": 61574, "value": "белый"}]},
                {"attribute_id": 4191, "values": [{"dictionary_value_id": 0, "value": "Описание"}]}
            ]
        }))
        .unwrap();

        assert_eq!(listing.id, "123456");
        assert_eq!(listing.sku, "ABC-100");
        assert_eq!(listing.barcode.as_deref(), Some("4600000000017"));
        assert_eq!(listing.photos, vec!["https://cdn/1.jpg", "https://cdn/2.jpg"]);
        let chars = listing.characteristics.unwrap();
        assert_eq!(chars.len(), 2);
        assert_eq!(chars[0].values[0].dictionary_value_id, Some(61574));
        assert_eq!(chars[1].attribute_id, 4191);
        assert_eq!(chars[1].values[0].dictionary_value_id, None);
    }

    #[test]
    fn test_product_id_fallback_and_optional_fields() {
        let listing = parse(json!({
            "product_id": "777",
            "offer_id": "X-1",
            "name": "Товар",
            "primary_image": "https://cdn/main.jpg"
        }))
        .unwrap();
        assert_eq!(listing.id, "777");
        assert_eq!(listing.barcode, None);
        assert_eq!(listing.photos, vec!["https://cdn/main.jpg"]);
        assert!(listing.characteristics.is_none());
    }

    #[test]
    fn test_blank_offer_id_is_malformed() {
        let err = parse(json!({"id": 1, "offer_id": "  ", "name": "Товар"})).unwrap_err();
        match err {
            ReconcileError::MalformedListing { field, hint, .. } => {
                assert_eq!(field, "offer_id");
                assert_eq!(hint.as_deref(), Some("1"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
