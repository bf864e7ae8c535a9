use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub gateway: RemoteConfig,
    pub store: RemoteConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Адрес удаленного сервиса (шлюз маркетплейсов или хранилище каталога)
#[derive(Debug, Deserialize, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MatchingConfig {
    /// Максимум подсказок для несопоставленного товара
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
    /// Минимальная длина поискового запроса
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
    /// Окно тишины для отложенного поиска, мс
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Максимум товаров в подсказке при выборе товара каталога
    #[serde(default = "default_picker_limit")]
    pub picker_limit: usize,
}

fn default_port() -> u16 {
    3000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_suggestions() -> usize {
    3
}

fn default_min_query_len() -> usize {
    2
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_picker_limit() -> usize {
    20
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            max_suggestions: default_max_suggestions(),
            min_query_len: default_min_query_len(),
            debounce_ms: default_debounce_ms(),
            picker_limit: default_picker_limit(),
        }
    }
}

impl MatchingConfig {
    pub fn debounce_window(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.debounce_ms)
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
port = 3000

[gateway]
base_url = "http://127.0.0.1:8081/api/marketplaces"
timeout_secs = 30

[store]
base_url = "http://127.0.0.1:8082/api/catalog"
timeout_secs = 30

[matching]
max_suggestions = 3
min_query_len = 2
debounce_ms = 500
picker_limit = 20
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

pub(crate) fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    if config.matching.min_query_len == 0 {
        anyhow::bail!("matching.min_query_len must be at least 1");
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.matching.max_suggestions, 3);
        assert_eq!(config.matching.min_query_len, 2);
        assert_eq!(config.matching.debounce_window().as_millis(), 500);
    }

    #[test]
    fn test_optional_sections_use_defaults() {
        let config = parse_config(
            r#"
[gateway]
base_url = "http://gw"

[store]
base_url = "http://store"
timeout_secs = 5
"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.gateway.timeout_secs, 30);
        assert_eq!(config.store.timeout_secs, 5);
        assert_eq!(config.matching.debounce_ms, 500);
        assert_eq!(config.matching.picker_limit, 20);
    }

    #[test]
    fn test_zero_query_len_rejected() {
        let result = parse_config(
            r#"
[gateway]
base_url = "http://gw"

[store]
base_url = "http://store"

[matching]
min_query_len = 0
"#,
        );
        assert!(result.is_err());
    }
}
