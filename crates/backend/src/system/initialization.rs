use crate::domain::a004_nomenclature::picker::ProductPicker;
use crate::domain::a004_nomenclature::service::apply_mappings;
use crate::domain::a025_product_mapping::matcher::MatchOptions;
use crate::domain::a025_product_mapping::service::MappingService;
use crate::domain::a026_mp_category::editing_session::AttributeEditingSession;
use crate::domain::a026_mp_category::service::CategoryAttributeResolver;
use crate::shared::config::Config;
use crate::shared::data::remote_store::{HttpRemoteStore, RemoteStore};
use crate::shared::errors::ReconcileError;
use crate::shared::marketplaces::http_gateway::HttpGateway;
use crate::shared::marketplaces::MarketplaceGateway;
use crate::shared::session_registry::SessionRegistry;
use crate::usecases::u505_match_nomenclature::executor::MatchExecutor;
use crate::usecases::u505_match_nomenclature::progress_tracker::ProgressTracker;
use anyhow::Result;
use contracts::enums::marketplace_type::MarketplaceType;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Общее состояние приложения, создается один раз при старте
pub struct AppContext {
    pub config: Config,
    pub gateway: Arc<dyn MarketplaceGateway>,
    pub store: Arc<dyn RemoteStore>,
    pub resolver: CategoryAttributeResolver,
    pub mappings: MappingService,
    pub match_executor: MatchExecutor,
    pub progress_tracker: Arc<ProgressTracker>,
    pub editing_sessions: SessionRegistry<AttributeEditingSession>,
    pub pickers: SessionRegistry<ProductPicker>,
}

static APP_CONTEXT: OnceCell<AppContext> = OnceCell::new();

impl AppContext {
    pub fn new(
        config: Config,
        gateway: Arc<dyn MarketplaceGateway>,
        store: Arc<dyn RemoteStore>,
    ) -> Self {
        let options = MatchOptions {
            max_suggestions: config.matching.max_suggestions,
        };
        let progress_tracker = Arc::new(ProgressTracker::new());
        Self {
            resolver: CategoryAttributeResolver::new(
                Arc::clone(&gateway),
                config.matching.min_query_len,
            ),
            mappings: MappingService::new(Arc::clone(&store), options.clone()),
            match_executor: MatchExecutor::new(
                Arc::clone(&gateway),
                Arc::clone(&store),
                Arc::clone(&progress_tracker),
                options,
            ),
            progress_tracker,
            editing_sessions: SessionRegistry::new("attribute editing"),
            pickers: SessionRegistry::new("product picker"),
            gateway,
            store,
            config,
        }
    }

    /// Открыть сессию заполнения атрибутов со своим кэшем справочников
    pub fn open_editing_session(&self, priority: Vec<MarketplaceType>) -> String {
        let resolver =
            CategoryAttributeResolver::new(Arc::clone(&self.gateway), self.config.matching.min_query_len);
        let session =
            AttributeEditingSession::new(resolver, priority, self.config.matching.debounce_window());
        self.editing_sessions.open(session)
    }

    /// Открыть выбор товара каталога: каталог загружается один раз,
    /// связи с маркетплейсами берутся из сохраненных связей
    pub async fn open_product_picker(&self) -> Result<(String, usize), ReconcileError> {
        let mut catalog = self.store.get_catalog_products().await.map_err(|e| {
            tracing::error!("Failed to load catalog products: {}", e);
            ReconcileError::remote("get_catalog_products", e)
        })?;
        let mappings = self.store.get_saved_mappings().await.map_err(|e| {
            tracing::error!("Failed to load saved mappings: {}", e);
            ReconcileError::remote("get_saved_mappings", e)
        })?;
        apply_mappings(&mut catalog, &mappings, &[]);

        let products = catalog.len();
        let picker = ProductPicker::new(
            catalog,
            self.config.matching.picker_limit,
            self.config.matching.debounce_window(),
            self.config.matching.min_query_len,
        );
        Ok((self.pickers.open(picker), products))
    }

    /// Удалить простаивающие сессии интерфейса
    pub fn cleanup_idle_sessions(&self, max_idle_hours: i64) -> usize {
        self.editing_sessions.cleanup_idle(max_idle_hours) + self.pickers.cleanup_idle(max_idle_hours)
    }
}

/// Создать HTTP клиенты по конфигу и сохранить контекст
pub fn initialize(config: Config) -> Result<&'static AppContext> {
    let gateway: Arc<dyn MarketplaceGateway> = Arc::new(HttpGateway::new(&config.gateway)?);
    let store: Arc<dyn RemoteStore> = Arc::new(HttpRemoteStore::new(&config.store)?);

    tracing::info!(
        "Marketplace gateway: {}, catalog store: {}",
        config.gateway.base_url,
        config.store.base_url
    );

    let context = AppContext::new(config, gateway, store);
    APP_CONTEXT
        .set(context)
        .map_err(|_| anyhow::anyhow!("Application context is already initialized"))?;
    APP_CONTEXT
        .get()
        .ok_or_else(|| anyhow::anyhow!("Application context is not initialized"))
}

pub fn context() -> Option<&'static AppContext> {
    APP_CONTEXT.get()
}
