use super::http_client::RemoteJsonClient;
use crate::shared::config::RemoteConfig;
use anyhow::Result;
use async_trait::async_trait;
use contracts::domain::a004_nomenclature::CanonicalProduct;
use contracts::domain::a025_product_mapping::ProductMapping;

/// Удаленное хранилище каталога и сохраненных связей
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn get_catalog_products(&self) -> Result<Vec<CanonicalProduct>>;

    async fn get_saved_mappings(&self) -> Result<Vec<ProductMapping>>;

    /// Создает или перезаписывает связи по их id
    async fn save_mappings(&self, mappings: &[ProductMapping]) -> Result<()>;

    /// Удаление отсутствующей связи не является ошибкой
    async fn delete_mapping(&self, id: &str) -> Result<()>;
}

/// HTTP-реализация хранилища
pub struct HttpRemoteStore {
    client: RemoteJsonClient,
}

impl HttpRemoteStore {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        Ok(Self {
            client: RemoteJsonClient::new("catalog store", config)?,
        })
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn get_catalog_products(&self) -> Result<Vec<CanonicalProduct>> {
        self.client.get_json("products", &[]).await
    }

    async fn get_saved_mappings(&self) -> Result<Vec<ProductMapping>> {
        self.client.get_json("mappings", &[]).await
    }

    async fn save_mappings(&self, mappings: &[ProductMapping]) -> Result<()> {
        if mappings.is_empty() {
            return Ok(());
        }
        self.client.put_json("mappings", mappings).await
    }

    async fn delete_mapping(&self, id: &str) -> Result<()> {
        self.client
            .delete(&format!("mappings/{}", urlencoding::encode(id)))
            .await
    }
}
