use crate::enums::marketplace_type::MarketplaceType;
use serde::{Deserialize, Serialize};

/// Запрос на сопоставление товаров маркетплейсов с каталогом
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchRequest {
    /// Маркетплейсы для загрузки снимка (пусто - все)
    #[serde(default)]
    pub marketplaces: Vec<MarketplaceType>,

    /// ID подключения к маркетплейсу, передается шлюзу как есть
    #[serde(rename = "integrationId", default)]
    pub integration_id: Option<String>,

    /// Сохранить пары с точным совпадением артикула без подтверждения оператора
    #[serde(rename = "autoLink", default)]
    pub auto_link: bool,
}

impl MatchRequest {
    /// Маркетплейсы в порядке обработки
    pub fn effective_marketplaces(&self) -> Vec<MarketplaceType> {
        if self.marketplaces.is_empty() {
            MarketplaceType::all()
        } else {
            let mut result = Vec::new();
            for mp in &self.marketplaces {
                if !result.contains(mp) {
                    result.push(*mp);
                }
            }
            result
        }
    }
}
