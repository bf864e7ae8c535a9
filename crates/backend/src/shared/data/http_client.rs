use crate::shared::config::RemoteConfig;
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Общий JSON-клиент для удаленных сервисов (шлюз маркетплейсов, хранилище каталога)
#[derive(Clone)]
pub struct RemoteJsonClient {
    client: reqwest::Client,
    base_url: String,
    service: &'static str,
}

impl RemoteJsonClient {
    pub fn new(service: &'static str, config: &RemoteConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(path);
        tracing::debug!("{} GET {} {:?}", self.service, url, query);

        let response = self.client.get(&url).query(query).send().await?;
        let body = Self::read_success_body(self.service, &url, response).await?;

        serde_json::from_str::<T>(&body).map_err(|e| {
            let preview: String = body.chars().take(500).collect();
            tracing::error!("Failed to parse {} response from {}: {}", self.service, url, e);
            anyhow::anyhow!("Failed to parse {} JSON: {}. Response: {}", self.service, e, preview)
        })
    }

    pub async fn put_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let url = self.url(path);
        tracing::debug!("{} PUT {}", self.service, url);

        let response = self.client.put(&url).json(body).send().await?;
        Self::read_success_body(self.service, &url, response).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        tracing::debug!("{} DELETE {}", self.service, url);

        let response = self.client.delete(&url).send().await?;
        let status = response.status();
        // Повторное удаление уже удаленной связи - не ошибка
        if status == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!("{} DELETE {}: already absent", self.service, url);
            return Ok(());
        }
        Self::read_success_body(self.service, &url, response).await?;
        Ok(())
    }

    async fn read_success_body(
        service: &str,
        url: &str,
        response: reqwest::Response,
    ) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("{} request {} failed: {} {}", service, url, status, body);
            anyhow::bail!("{} request failed with status {}: {}", service, status, body);
        }
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client = RemoteJsonClient::new(
            "store",
            &RemoteConfig {
                base_url: "http://localhost:8082/api/".into(),
                timeout_secs: 1,
            },
        )
        .unwrap();
        assert_eq!(client.url("/mappings"), "http://localhost:8082/api/mappings");
        assert_eq!(client.url("products"), "http://localhost:8082/api/products");
    }
}
