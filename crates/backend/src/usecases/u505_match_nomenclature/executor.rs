use super::progress_tracker::{MatchCounters, ProgressTracker};
use crate::domain::a025_product_mapping::matcher::{self, MatchOptions};
use crate::domain::a025_product_mapping::service::MappingService;
use crate::shared::data::remote_store::RemoteStore;
use crate::shared::errors::ReconcileError;
use crate::shared::marketplaces::{self, MarketplaceGateway};
use contracts::domain::a007_marketplace_product::MarketplaceListing;
use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u505_match_nomenclature::{
    progress::{MatchProgress, MatchStatus},
    request::MatchRequest,
    response::{MatchResponse, MatchRunResult, MatchStartStatus},
    MatchNomenclature,
};
use std::sync::Arc;
use uuid::Uuid;

/// Executor для UseCase сопоставления товаров маркетплейсов с каталогом
#[derive(Clone)]
pub struct MatchExecutor {
    gateway: Arc<dyn MarketplaceGateway>,
    store: Arc<dyn RemoteStore>,
    mappings: MappingService,
    progress_tracker: Arc<ProgressTracker>,
    options: MatchOptions,
}

impl MatchExecutor {
    pub fn new(
        gateway: Arc<dyn MarketplaceGateway>,
        store: Arc<dyn RemoteStore>,
        progress_tracker: Arc<ProgressTracker>,
        options: MatchOptions,
    ) -> Self {
        let mappings = MappingService::new(Arc::clone(&store), options.clone());
        Self {
            gateway,
            store,
            mappings,
            progress_tracker,
            options,
        }
    }

    /// Выполнить сопоставление и дождаться результата
    pub async fn run(&self, request: &MatchRequest) -> Result<MatchRunResult, ReconcileError> {
        let session_id = Uuid::new_v4().to_string();
        self.progress_tracker.create_session(session_id.clone());
        self.execute(&session_id, request).await
    }

    /// Запустить сопоставление (создает async task и возвращает session_id)
    pub fn start_matching(&self, request: MatchRequest) -> MatchResponse {
        tracing::info!(
            "Starting {} with request: {:?}",
            MatchNomenclature::full_name(),
            request
        );

        let session_id = Uuid::new_v4().to_string();
        self.progress_tracker.create_session(session_id.clone());

        let self_clone = self.clone();
        let session_id_clone = session_id.clone();
        let marketplaces = request.effective_marketplaces();

        tokio::spawn(async move {
            // Ошибка уже записана в прогресс сессии
            let _ = self_clone.execute(&session_id_clone, &request).await;
        });

        MatchResponse {
            session_id,
            status: MatchStartStatus::Started,
            message: format!(
                "Сопоставление запущено для маркетплейсов: {}",
                marketplaces
                    .iter()
                    .map(|mp| mp.display_name())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }

    /// Получить текущий прогресс сопоставления
    pub fn get_progress(&self, session_id: &str) -> Option<MatchProgress> {
        self.progress_tracker.get_progress(session_id)
    }

    async fn execute(
        &self,
        session_id: &str,
        request: &MatchRequest,
    ) -> Result<MatchRunResult, ReconcileError> {
        match self.run_matching(session_id, request).await {
            Ok(result) => {
                self.progress_tracker
                    .complete_session(session_id, MatchStatus::Completed);
                Ok(result)
            }
            Err(e) => {
                tracing::error!("Matching failed for session {}: {}", session_id, e);
                self.progress_tracker.add_error(
                    session_id,
                    format!("Matching failed: {}", e),
                    None,
                    None,
                );
                self.progress_tracker
                    .complete_session(session_id, MatchStatus::Failed);
                Err(e)
            }
        }
    }

    /// Загрузить товары маркетплейсов. Ошибка одного маркетплейса
    /// не прерывает загрузку остальных.
    async fn load_listings(
        &self,
        session_id: &str,
        request: &MatchRequest,
        result: &mut MatchRunResult,
    ) -> Vec<MarketplaceListing> {
        let mut listings = Vec::new();

        for marketplace in request.effective_marketplaces() {
            self.progress_tracker.set_current_item(
                session_id,
                Some(format!("Загрузка товаров {}", marketplace.display_name())),
            );

            let raws = match self
                .gateway
                .list_products(marketplace, request.integration_id.as_deref())
                .await
            {
                Ok(raws) => raws,
                Err(e) => {
                    let err = ReconcileError::remote(format!("list_products {}", marketplace), e);
                    tracing::error!("{}", err);
                    self.progress_tracker.add_error(
                        session_id,
                        format!("Failed to load {} products", marketplace),
                        Some(err.to_string()),
                        None,
                    );
                    result.fetch_errors.push(err.to_string());
                    continue;
                }
            };

            let (mut normalized, skipped) = marketplaces::normalize_batch(&raws, marketplace);
            for err in skipped {
                let listing_id = match &err {
                    ReconcileError::MalformedListing { hint, .. } => hint.clone(),
                    _ => None,
                };
                self.progress_tracker.add_error(
                    session_id,
                    format!("Skipped malformed {} listing", marketplace),
                    Some(err.to_string()),
                    listing_id,
                );
                result.skipped_listings.push(err.to_string());
            }
            listings.append(&mut normalized);
        }

        listings
    }

    /// Выполнить сопоставление
    async fn run_matching(
        &self,
        session_id: &str,
        request: &MatchRequest,
    ) -> Result<MatchRunResult, ReconcileError> {
        let overall_start = std::time::Instant::now();
        tracing::info!("Running matching for session: {}", session_id);

        let mut result = MatchRunResult::default();
        let mut counters = MatchCounters::default();

        let load_start = std::time::Instant::now();
        let listings = self.load_listings(session_id, request, &mut result).await;
        let load_duration = load_start.elapsed();

        counters.loaded = listings.len() as i32;
        counters.skipped = result.skipped_listings.len() as i32;
        self.progress_tracker
            .set_total(session_id, (listings.len() + result.skipped_listings.len()) as i32);
        self.progress_tracker.update_progress(session_id, counters);

        self.progress_tracker
            .set_current_item(session_id, Some("Загрузка каталога и связей".to_string()));
        let catalog = self
            .store
            .get_catalog_products()
            .await
            .map_err(|e| ReconcileError::remote("get_catalog_products", e))?;
        let mappings = self
            .store
            .get_saved_mappings()
            .await
            .map_err(|e| ReconcileError::remote("get_saved_mappings", e))?;
        tracing::info!(
            "Loaded {} catalog products and {} saved mappings",
            catalog.len(),
            mappings.len()
        );

        let match_start = std::time::Instant::now();
        let outcome = matcher::match_listings(&listings, &catalog, &mappings, &self.options);
        let match_duration = match_start.elapsed();

        counters.matched = outcome.matched.len() as i32;
        counters.unmatched = outcome.unmatched.len() as i32;
        self.progress_tracker.update_progress(session_id, counters);

        if request.auto_link {
            self.progress_tracker
                .set_current_item(session_id, Some("Сохранение связей".to_string()));
            let report = self.mappings.persist_exact_matches(&outcome).await;
            for failure in &report.failures {
                self.progress_tracker.add_error(
                    session_id,
                    format!("Failed to save {} link", failure.marketplace),
                    Some(failure.message.clone()),
                    Some(failure.listing_id.clone()),
                );
            }
            counters.auto_linked = report.created as i32;
            self.progress_tracker.update_progress(session_id, counters);
            result.auto_link = Some(report);
        }

        self.progress_tracker.set_current_item(session_id, None);
        result.outcome = outcome;

        tracing::info!(
            "Matching completed for session: {} in {}ms (load {}ms, match {}ms). Loaded: {}, Skipped: {}, Matched: {}, Unmatched: {}, Auto-linked: {}",
            session_id,
            overall_start.elapsed().as_millis(),
            load_duration.as_millis(),
            match_duration.as_millis(),
            counters.loaded,
            counters.skipped,
            counters.matched,
            counters.unmatched,
            counters.auto_linked
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::testing::{product, FakeGateway, FakeStore};
    use contracts::domain::a025_product_mapping::{MatchType, ProductMapping};
    use contracts::enums::marketplace_type::MarketplaceType;
    use serde_json::json;
    use std::time::Duration;

    fn gateway() -> FakeGateway {
        let mut gateway = FakeGateway::default();
        gateway.products.insert(
            MarketplaceType::Ozon,
            vec![
                json!({"id": 101, "offer_id": "ABC-100", "name": "Кружка"}),
                json!({"id": 102, "offer_id": "kr-200", "name": "Кружка большая"}),
                json!({"id": 103, "name": "Без артикула"}),
            ],
        );
        gateway.products.insert(
            MarketplaceType::Wildberries,
            vec![json!({"nmID": 201, "vendorCode": "KR-200", "title": "Кружка большая"})],
        );
        gateway
    }

    fn store() -> FakeStore {
        FakeStore::with_catalog(vec![product("1", "ABC-100"), product("2", "KR-200")])
    }

    fn executor(gateway: FakeGateway, store: Arc<FakeStore>) -> MatchExecutor {
        MatchExecutor::new(
            Arc::new(gateway),
            store,
            Arc::new(ProgressTracker::new()),
            MatchOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_run_matches_snapshot() {
        let store = Arc::new(store());
        let request = MatchRequest {
            marketplaces: vec![MarketplaceType::Ozon, MarketplaceType::Wildberries],
            ..Default::default()
        };

        let result = executor(gateway(), store.clone()).run(&request).await.unwrap();

        assert_eq!(result.skipped_listings.len(), 1);
        assert_eq!(result.outcome.summary.exact_sku, 2);
        assert_eq!(result.outcome.unmatched.len(), 1);
        assert_eq!(result.outcome.unmatched[0].listing.id, "102");
        assert_eq!(result.outcome.unmatched[0].suggestions[0].id, "2");
        assert!(result.auto_link.is_none());
        assert!(store.stored().is_empty());
    }

    #[tokio::test]
    async fn test_run_with_auto_link_persists_exact_pairs() {
        let store = Arc::new(store().with_mappings(vec![ProductMapping::new(
            MarketplaceType::Ozon,
            "102",
            "2",
            MatchType::LinkedManual,
        )]));
        let request = MatchRequest {
            marketplaces: vec![MarketplaceType::Ozon, MarketplaceType::Wildberries],
            auto_link: true,
            ..Default::default()
        };

        let result = executor(gateway(), store.clone()).run(&request).await.unwrap();

        let report = result.auto_link.unwrap();
        assert_eq!(report.created, 2);
        assert_eq!(report.already_linked, 1);
        assert_eq!(store.stored().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_marketplace_does_not_abort_run() {
        let mut gateway = gateway();
        gateway.failing.insert(MarketplaceType::Wildberries);
        let request = MatchRequest {
            marketplaces: vec![MarketplaceType::Wildberries, MarketplaceType::Ozon],
            ..Default::default()
        };

        let result = executor(gateway, Arc::new(store())).run(&request).await.unwrap();

        assert_eq!(result.fetch_errors.len(), 1);
        assert_eq!(result.outcome.summary.total, 2);
    }

    #[tokio::test]
    async fn test_store_failure_fails_run() {
        let mut store = store();
        store.fail_reads = true;

        let err = executor(gateway(), Arc::new(store))
            .run(&MatchRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::RemoteFetchFailed { .. }));
    }

    #[tokio::test]
    async fn test_background_session_reports_progress() {
        let executor = executor(gateway(), Arc::new(store()));
        let response = executor.start_matching(MatchRequest {
            marketplaces: vec![MarketplaceType::Ozon],
            ..Default::default()
        });
        assert_eq!(response.status, MatchStartStatus::Started);

        let mut progress = None;
        for _ in 0..100 {
            let current = executor.get_progress(&response.session_id).unwrap();
            if current.status != MatchStatus::InProgress {
                progress = Some(current);
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let progress = progress.expect("matching did not finish");
        // Строка без артикула записана как ошибка
        assert_eq!(progress.status, MatchStatus::CompletedWithErrors);
        assert_eq!(progress.total, Some(3));
        assert_eq!(progress.loaded, 2);
        assert_eq!(progress.skipped, 1);
        assert_eq!(progress.matched, 1);
        assert_eq!(progress.unmatched, 1);
        assert_eq!(progress.error_list[0].listing_id.as_deref(), Some("103"));
    }
}
