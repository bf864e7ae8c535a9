use super::non_blank;
use crate::shared::errors::ReconcileError;
use contracts::domain::a007_marketplace_product::{
    AssignedValue, AttributeAssignment, MarketplaceListing,
};
use contracts::enums::marketplace_type::MarketplaceType;
use serde::Deserialize;

/// Элемент offer-mappings: `{offer, mapping}`
#[derive(Debug, Clone, Deserialize)]
pub struct YandexRawEntry {
    pub offer: YandexRawOffer,
    #[serde(default)]
    pub mapping: Option<YandexRawMapping>,
}

/// Оффер продавца. offerId - основной идентификатор товара в Partner API
#[derive(Debug, Clone, Deserialize)]
pub struct YandexRawOffer {
    #[serde(rename = "offerId", default)]
    pub offer_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub barcodes: Vec<String>,
    #[serde(default)]
    pub pictures: Vec<String>,
    #[serde(rename = "parameterValues", default)]
    pub parameter_values: Vec<YandexRawParameterValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YandexRawMapping {
    #[serde(rename = "marketSkuName", default)]
    pub market_sku_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YandexRawParameterValue {
    #[serde(rename = "parameterId", default)]
    pub parameter_id: Option<i64>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(rename = "valueId", default)]
    pub value_id: Option<i64>,
}

impl YandexRawEntry {
    /// Принимает как `{offer, mapping}`, так и оффер без обертки
    pub fn from_value(raw: &serde_json::Value) -> Result<Self, serde_json::Error> {
        if raw.get("offer").map_or(false, |o| o.is_object()) {
            serde_json::from_value(raw.clone())
        } else {
            Ok(Self {
                offer: serde_json::from_value(raw.clone())?,
                mapping: None,
            })
        }
    }

    pub fn into_listing(self) -> Result<MarketplaceListing, ReconcileError> {
        let malformed = |field: &'static str, hint: Option<String>| {
            ReconcileError::MalformedListing {
                marketplace: MarketplaceType::YandexMarket,
                field,
                hint,
            }
        };

        let offer = self.offer;
        let offer_id = non_blank(offer.offer_id.as_deref()).ok_or_else(|| {
            malformed("offerId", non_blank(offer.name.as_deref()))
        })?;
        let name = non_blank(offer.name.as_deref())
            .or_else(|| {
                self.mapping
                    .as_ref()
                    .and_then(|m| non_blank(m.market_sku_name.as_deref()))
            })
            .ok_or_else(|| malformed("name", Some(offer_id.clone())))?;

        let barcode = offer.barcodes.iter().find_map(|b| non_blank(Some(b.as_str())));
        let photos = offer
            .pictures
            .iter()
            .filter_map(|p| non_blank(Some(p.as_str())))
            .collect();

        let mut characteristics: Vec<AttributeAssignment> = Vec::new();
        for param in offer.parameter_values {
            let Some(parameter_id) = param.parameter_id else {
                continue;
            };
            let value = AssignedValue {
                dictionary_value_id: param.value_id,
                value: param.value.unwrap_or_default(),
            };
            // Множественные значения приходят отдельными элементами с одним parameterId
            match characteristics
                .iter_mut()
                .find(|c| c.attribute_id == parameter_id)
            {
                Some(existing) => existing.values.push(value),
                None => characteristics.push(AttributeAssignment {
                    attribute_id: parameter_id,
                    name: None,
                    values: vec![value],
                }),
            }
        }

        Ok(MarketplaceListing {
            id: offer_id.clone(),
            sku: offer_id,
            name,
            barcode,
            photos,
            marketplace: MarketplaceType::YandexMarket,
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
        YandexRawEntry::from_value(&value).unwrap().into_listing()
    }

    #[test]
    fn test_wrapped_entry_groups_parameters() {
        let listing = parse(json!({
            "offer": {
                "offerId": "ABC-100",
                "name": "Смеситель",
                "barcodes": ["4600000000017"],
                "pictures": ["https://ym/1.jpg"],
                "parameterValues": [
                    {"parameterId": 7, "value": "белый", "valueId": 100},
                    {"parameterId": 7, "value": "серый", "valueId": 101},
                    {"parameterId": 8, "value": "25"}
                ]
            },
            "mapping": {"marketSku": 1001, "marketSkuName": "Смеситель ABC"}
        }))
        .unwrap();

        assert_eq!(listing.id, "ABC-100");
        assert_eq!(listing.sku, "ABC-100");
        assert_eq!(listing.name, "Смеситель");
        let chars = listing.characteristics.unwrap();
        assert_eq!(chars.len(), 2);
        assert_eq!(chars[0].values.len(), 2);
        assert_eq!(chars[0].values[1].dictionary_value_id, Some(101));
    }

    #[test]
    fn test_bare_offer_uses_mapping_name_fallback() {
        let listing = parse(json!({"offerId": "X", "name": "Товар"})).unwrap();
        assert_eq!(listing.id, "X");
        assert!(listing.photos.is_empty());

        let listing = parse(json!({
            "offer": {"offerId": "Y"},
            "mapping": {"marketSkuName": "Название с витрины"}
        }))
        .unwrap();
        assert_eq!(listing.name, "Название с витрины");
    }

    #[test]
    fn test_missing_offer_id_is_malformed() {
        let err = parse(json!({"offer": {"name": "Товар"}})).unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::MalformedListing { field: "offerId", .. }
        ));
    }
}
