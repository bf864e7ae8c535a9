use serde::{Deserialize, Serialize};

/// Типы маркетплейсов
///
/// Порядок вариантов задает стабильный порядок обхода в множествах и словарях.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MarketplaceType {
    #[serde(rename = "ozon")]
    Ozon,
    #[serde(rename = "wb")]
    Wildberries,
    #[serde(rename = "yandex")]
    YandexMarket,
}

impl MarketplaceType {
    /// Получить код маркетплейса
    pub fn code(&self) -> &'static str {
        match self {
            MarketplaceType::Ozon => "ozon",
            MarketplaceType::Wildberries => "wb",
            MarketplaceType::YandexMarket => "yandex",
        }
    }

    /// Получить человекочитаемое название
    pub fn display_name(&self) -> &'static str {
        match self {
            MarketplaceType::Ozon => "Ozon",
            MarketplaceType::Wildberries => "Wildberries",
            MarketplaceType::YandexMarket => "Яндекс Маркет",
        }
    }

    /// Получить все типы маркетплейсов
    pub fn all() -> Vec<MarketplaceType> {
        vec![
            MarketplaceType::Ozon,
            MarketplaceType::Wildberries,
            MarketplaceType::YandexMarket,
        ]
    }

    /// Парсинг из строки
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ozon" => Some(MarketplaceType::Ozon),
            "wb" => Some(MarketplaceType::Wildberries),
            "yandex" => Some(MarketplaceType::YandexMarket),
            _ => None,
        }
    }

    /// Определение типа маркетплейса по коду или описанию
    pub fn detect(value: &str) -> Option<Self> {
        let code_lower = value.trim().to_lowercase();

        // Сначала проверяем точные совпадения кодов
        if let Some(mp_type) = Self::from_code(&code_lower) {
            return Some(mp_type);
        }

        // Затем проверяем частичные совпадения
        if code_lower.contains("ozon") || code_lower.contains("озон") {
            return Some(MarketplaceType::Ozon);
        }
        if code_lower.contains("wildberries") || code_lower.contains("вб") || code_lower.contains("wb") {
            return Some(MarketplaceType::Wildberries);
        }
        if code_lower.contains("yandex")
            || code_lower.contains("яндекс")
            || code_lower.contains("market")
            || code_lower.contains("ym")
        {
            return Some(MarketplaceType::YandexMarket);
        }

        None
    }
}

impl std::fmt::Display for MarketplaceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
