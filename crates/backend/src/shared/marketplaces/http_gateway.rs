use super::MarketplaceGateway;
use crate::shared::config::RemoteConfig;
use crate::shared::data::http_client::RemoteJsonClient;
use anyhow::Result;
use async_trait::async_trait;
use contracts::domain::a026_mp_category::{
    AttributeSchema, AttributeValue, AttributeValueKey, Category,
};
use contracts::enums::marketplace_type::MarketplaceType;

/// HTTP-клиент шлюза интеграций с маркетплейсами
///
/// Маршруты: `/{mp}/categories`, `/{mp}/categories/{id}/attributes`,
/// `/{mp}/categories/{id}/attributes/{attr}/values`, `/{mp}/products`.
pub struct HttpGateway {
    client: RemoteJsonClient,
}

impl HttpGateway {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        Ok(Self {
            client: RemoteJsonClient::new("marketplace gateway", config)?,
        })
    }
}

fn type_id_query(type_id: Option<i64>) -> Vec<(&'static str, String)> {
    type_id
        .map(|t| vec![("type_id", t.to_string())])
        .unwrap_or_default()
}

#[async_trait]
impl MarketplaceGateway for HttpGateway {
    async fn search_categories(
        &self,
        marketplace: MarketplaceType,
        query: &str,
    ) -> Result<Vec<Category>> {
        self.client
            .get_json(
                &format!("{}/categories", marketplace.code()),
                &[("q", query.to_string())],
            )
            .await
    }

    async fn get_category_attributes(
        &self,
        marketplace: MarketplaceType,
        category_id: i64,
        type_id: Option<i64>,
    ) -> Result<Vec<AttributeSchema>> {
        self.client
            .get_json(
                &format!("{}/categories/{}/attributes", marketplace.code(), category_id),
                &type_id_query(type_id),
            )
            .await
    }

    async fn get_attribute_values(&self, key: &AttributeValueKey) -> Result<Vec<AttributeValue>> {
        self.client
            .get_json(
                &format!(
                    "{}/categories/{}/attributes/{}/values",
                    key.marketplace.code(),
                    key.category_id,
                    key.attribute_id
                ),
                &type_id_query(key.type_id),
            )
            .await
    }

    async fn list_products(
        &self,
        marketplace: MarketplaceType,
        integration_id: Option<&str>,
    ) -> Result<Vec<serde_json::Value>> {
        let query: Vec<(&str, String)> = integration_id
            .map(|id| vec![("integration_id", id.to_string())])
            .unwrap_or_default();
        self.client
            .get_json(&format!("{}/products", marketplace.code()), &query)
            .await
    }
}
