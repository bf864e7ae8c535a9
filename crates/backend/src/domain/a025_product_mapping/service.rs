use super::matcher::{self, MatchOptions};
use crate::shared::data::remote_store::RemoteStore;
use crate::shared::errors::ReconcileError;
use contracts::domain::a004_nomenclature::CanonicalProduct;
use contracts::domain::a007_marketplace_product::MarketplaceListing;
use contracts::domain::a025_product_mapping::{
    AutoLinkReport, LinkFailure, MatchType, ProductMapping, UnlinkReport,
};
use contracts::enums::marketplace_type::MarketplaceType;
use contracts::usecases::u505_match_nomenclature::{MatchOutcome, MatchSource};
use std::sync::Arc;

/// Сохранение и удаление связей товаров маркетплейсов с каталогом
#[derive(Clone)]
pub struct MappingService {
    store: Arc<dyn RemoteStore>,
    options: MatchOptions,
}

impl MappingService {
    pub fn new(store: Arc<dyn RemoteStore>, options: MatchOptions) -> Self {
        Self { store, options }
    }

    async fn saved_mappings(&self) -> Result<Vec<ProductMapping>, ReconcileError> {
        self.store.get_saved_mappings().await.map_err(|e| {
            tracing::error!("Failed to load saved mappings: {}", e);
            ReconcileError::remote("get_saved_mappings", e)
        })
    }

    /// Подтвердить связь вручную
    ///
    /// Создает или перезаписывает связь для товара маркетплейса. Другой товар
    /// того же маркетплейса, ранее связанный с этим товаром каталога,
    /// отвязывается. Если отвязать не удалось, новая связь не сохраняется.
    pub async fn confirm_link(
        &self,
        listing: &MarketplaceListing,
        product: &CanonicalProduct,
    ) -> Result<ProductMapping, ReconcileError> {
        if listing.id.trim().is_empty() {
            return Err(ReconcileError::Validation("Listing id is empty".into()));
        }
        if product.id.trim().is_empty() {
            return Err(ReconcileError::Validation("Product id is empty".into()));
        }

        let mapping = ProductMapping::new(
            listing.marketplace,
            listing.id.clone(),
            product.id.clone(),
            MatchType::LinkedManual,
        );

        let existing = self.saved_mappings().await?;
        if let Some(previous) = existing
            .iter()
            .find(|m| m.is_for_listing(listing.marketplace, &listing.id))
        {
            if previous.canonical_product_id != product.id {
                tracing::warn!(
                    "Relinking {} from product {} to {}",
                    mapping.id,
                    previous.canonical_product_id,
                    product.id
                );
            }
        }

        for displaced in existing.iter().filter(|m| {
            m.marketplace == listing.marketplace
                && m.canonical_product_id == product.id
                && m.id != mapping.id
        }) {
            tracing::info!(
                "Unlinking {} listing {} displaced by {}",
                displaced.marketplace,
                displaced.marketplace_listing_id,
                listing.id
            );
            self.store
                .delete_mapping(&displaced.id)
                .await
                .map_err(|e| ReconcileError::persistence(displaced.id.clone(), e))?;
        }

        self.store
            .save_mappings(std::slice::from_ref(&mapping))
            .await
            .map_err(|e| {
                tracing::error!("Failed to save mapping {}: {}", mapping.id, e);
                ReconcileError::persistence(mapping.id.clone(), e)
            })?;

        tracing::info!(
            "Linked {} listing {} to product {}",
            listing.marketplace,
            listing.id,
            product.id
        );
        Ok(mapping)
    }

    /// Связать по точному совпадению артикула и сохранить каждую пару
    ///
    /// Ошибка сохранения одной пары не прерывает обработку остальных.
    /// Ошибкой завершается только чтение сохраненных связей.
    pub async fn auto_link_by_sku(
        &self,
        listings: &[MarketplaceListing],
        catalog: &[CanonicalProduct],
    ) -> Result<AutoLinkReport, ReconcileError> {
        let mappings = self.saved_mappings().await?;
        let outcome = matcher::match_listings(listings, catalog, &mappings, &self.options);
        Ok(self.persist_exact_matches(&outcome).await)
    }

    /// Сохранить пары, найденные по точному артикулу
    pub async fn persist_exact_matches(&self, outcome: &MatchOutcome) -> AutoLinkReport {
        let mut report = AutoLinkReport::default();

        for pair in &outcome.matched {
            match pair.source {
                MatchSource::PersistedLink => {
                    report.already_linked += 1;
                }
                MatchSource::ExactSku => {
                    let mapping = ProductMapping::new(
                        pair.listing.marketplace,
                        pair.listing.id.clone(),
                        pair.canonical_product_id.clone(),
                        MatchType::LinkedAutoSku,
                    );
                    match self.store.save_mappings(std::slice::from_ref(&mapping)).await {
                        Ok(()) => report.created += 1,
                        Err(e) => {
                            tracing::error!("Failed to save mapping {}: {}", mapping.id, e);
                            report.failed += 1;
                            report.failures.push(LinkFailure {
                                marketplace: pair.listing.marketplace,
                                listing_id: pair.listing.id.clone(),
                                message: e.to_string(),
                            });
                        }
                    }
                }
            }
        }

        tracing::info!(
            "Auto-link by SKU: created {}, already linked {}, failed {}",
            report.created,
            report.already_linked,
            report.failed
        );
        report
    }

    /// Удалить связь товара каталога с маркетплейсом
    ///
    /// Отсутствие связи ошибкой не считается. Ошибка удаления одной связи не
    /// прерывает удаление остальных и попадает в отчет. Ошибкой завершается
    /// только чтение сохраненных связей.
    pub async fn remove_link(
        &self,
        canonical_product_id: &str,
        marketplace: MarketplaceType,
    ) -> Result<UnlinkReport, ReconcileError> {
        let mappings = self.saved_mappings().await?;
        let mut report = UnlinkReport::default();
        for mapping in mappings.iter().filter(|m| {
            m.marketplace == marketplace && m.canonical_product_id == canonical_product_id
        }) {
            match self.store.delete_mapping(&mapping.id).await {
                Ok(()) => report.removed += 1,
                Err(e) => {
                    tracing::error!("Failed to delete mapping {}: {}", mapping.id, e);
                    report.failed += 1;
                    report.failures.push(LinkFailure {
                        marketplace,
                        listing_id: mapping.marketplace_listing_id.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        if report.removed == 0 && report.failed == 0 {
            tracing::debug!(
                "No {} link for product {}, nothing to remove",
                marketplace,
                canonical_product_id
            );
        } else {
            tracing::info!(
                "Unlink {} for product {}: removed {}, failed {}",
                marketplace,
                canonical_product_id,
                report.removed,
                report.failed
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::testing::{listing, product, FakeStore};
    use std::sync::atomic::Ordering;

    fn service(store: Arc<FakeStore>) -> MappingService {
        MappingService::new(store, MatchOptions::default())
    }

    #[tokio::test]
    async fn test_confirm_link_creates_manual_mapping() {
        let store = Arc::new(FakeStore::default());
        let mapping = service(store.clone())
            .confirm_link(
                &listing(MarketplaceType::Ozon, "999", "abc-100"),
                &product("1", "ABC-100"),
            )
            .await
            .unwrap();

        assert_eq!(mapping.id, "ozon:999");
        assert_eq!(mapping.match_type, MatchType::LinkedManual);
        assert_eq!(store.stored(), vec![mapping]);
    }

    #[tokio::test]
    async fn test_confirm_link_overwrites_previous_product() {
        let store = Arc::new(FakeStore::default().with_mappings(vec![ProductMapping::new(
            MarketplaceType::Ozon,
            "999",
            "1",
            MatchType::LinkedAutoSku,
        )]));

        service(store.clone())
            .confirm_link(&listing(MarketplaceType::Ozon, "999", "X"), &product("2", "X"))
            .await
            .unwrap();

        let stored = store.stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].canonical_product_id, "2");
        assert_eq!(stored[0].match_type, MatchType::LinkedManual);
    }

    #[tokio::test]
    async fn test_confirm_link_displaces_other_listing_of_same_marketplace() {
        let store = Arc::new(FakeStore::default().with_mappings(vec![
            ProductMapping::new(MarketplaceType::Ozon, "100", "1", MatchType::LinkedAutoSku),
            ProductMapping::new(MarketplaceType::Wildberries, "200", "1", MatchType::LinkedManual),
        ]));

        service(store.clone())
            .confirm_link(&listing(MarketplaceType::Ozon, "101", "A"), &product("1", "A"))
            .await
            .unwrap();

        let ids: Vec<String> = store.stored().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["ozon:101", "wb:200"]);
    }

    #[tokio::test]
    async fn test_confirm_link_keeps_state_when_displacement_fails() {
        let mut fake = FakeStore::default().with_mappings(vec![ProductMapping::new(
            MarketplaceType::Ozon,
            "100",
            "1",
            MatchType::LinkedAutoSku,
        )]);
        fake.fail_deletes = true;
        let store = Arc::new(fake);

        let err = service(store.clone())
            .confirm_link(&listing(MarketplaceType::Ozon, "101", "A"), &product("1", "A"))
            .await
            .unwrap_err();

        assert!(matches!(err, ReconcileError::PersistenceFailed { .. }));
        assert_eq!(store.save_calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.stored().len(), 1);
    }

    #[tokio::test]
    async fn test_confirm_link_rejects_blank_ids_before_remote_call() {
        let store = Arc::new(FakeStore::default());
        let err = service(store.clone())
            .confirm_link(&listing(MarketplaceType::Ozon, "999", "A"), &product(" ", "A"))
            .await
            .unwrap_err();

        assert!(matches!(err, ReconcileError::Validation(_)));
        assert_eq!(store.save_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_auto_link_is_idempotent() {
        let store = Arc::new(FakeStore::default());
        let service = service(store.clone());
        let catalog = vec![product("1", "ABC-100"), product("2", "XYZ")];
        let listings = vec![
            listing(MarketplaceType::Ozon, "999", "ABC-100"),
            listing(MarketplaceType::Wildberries, "555", "XYZ"),
            listing(MarketplaceType::Ozon, "998", "abc-100"),
        ];

        let first = service.auto_link_by_sku(&listings, &catalog).await.unwrap();
        assert_eq!(first.created, 2);
        assert_eq!(first.already_linked, 0);
        let after_first = store.stored();

        let second = service.auto_link_by_sku(&listings, &catalog).await.unwrap();
        assert_eq!(second.created, 0);
        assert_eq!(second.already_linked, 2);
        assert_eq!(store.stored(), after_first);
    }

    #[tokio::test]
    async fn test_auto_link_continues_after_failed_pair() {
        let mut fake = FakeStore::default();
        fake.failing_listings.insert("555".to_string());
        let store = Arc::new(fake);
        let catalog = vec![product("1", "A"), product("2", "B"), product("3", "C")];
        let listings = vec![
            listing(MarketplaceType::Ozon, "1", "A"),
            listing(MarketplaceType::Ozon, "555", "B"),
            listing(MarketplaceType::Ozon, "3", "C"),
        ];

        let report = service(store.clone())
            .auto_link_by_sku(&listings, &catalog)
            .await
            .unwrap();

        assert_eq!(report.created, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failures[0].listing_id, "555");
        assert_eq!(store.stored().len(), 2);
    }

    #[tokio::test]
    async fn test_auto_link_fails_when_mappings_unreadable() {
        let mut fake = FakeStore::default();
        fake.fail_reads = true;
        let err = service(Arc::new(fake))
            .auto_link_by_sku(&[listing(MarketplaceType::Ozon, "1", "A")], &[product("1", "A")])
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::RemoteFetchFailed { .. }));
    }

    #[tokio::test]
    async fn test_remove_link_is_idempotent() {
        let store = Arc::new(FakeStore::default().with_mappings(vec![
            ProductMapping::new(MarketplaceType::Ozon, "100", "1", MatchType::LinkedManual),
            ProductMapping::new(MarketplaceType::Wildberries, "200", "1", MatchType::LinkedManual),
        ]));
        let service = service(store.clone());

        let first = service.remove_link("1", MarketplaceType::Ozon).await.unwrap();
        assert_eq!(first.removed, 1);
        assert_eq!(first.failed, 0);
        let again = service.remove_link("1", MarketplaceType::Ozon).await.unwrap();
        assert_eq!(again, UnlinkReport::default());
        let missing = service
            .remove_link("404", MarketplaceType::YandexMarket)
            .await
            .unwrap();
        assert_eq!(missing.removed, 0);

        let stored = store.stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].marketplace, MarketplaceType::Wildberries);
    }

    #[tokio::test]
    async fn test_remove_link_reports_partial_failure() {
        let mut store = FakeStore::default().with_mappings(vec![
            ProductMapping::new(MarketplaceType::Ozon, "100", "1", MatchType::LinkedManual),
            ProductMapping::new(MarketplaceType::Ozon, "101", "1", MatchType::LinkedAutoSku),
            ProductMapping::new(MarketplaceType::Ozon, "102", "1", MatchType::LinkedManual),
        ]);
        store.failing_deletes.insert("ozon:101".to_string());
        let store = Arc::new(store);
        let service = service(store.clone());

        let report = service.remove_link("1", MarketplaceType::Ozon).await.unwrap();

        assert_eq!(report.removed, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failures[0].listing_id, "101");
        assert_eq!(store.delete_calls.load(Ordering::SeqCst), 3);
        let stored = store.stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].marketplace_listing_id, "101");
    }
}
