use contracts::domain::a004_nomenclature::CanonicalProduct;
use contracts::domain::a007_marketplace_product::MarketplaceListing;
use contracts::domain::a025_product_mapping::{MatchType, ProductMapping};
use contracts::enums::marketplace_type::MarketplaceType;
use contracts::usecases::u505_match_nomenclature::{
    MatchOutcome, MatchSource, MatchSummary, MatchedPair, UnmatchedListing, UnmatchedReason,
};
use std::collections::{HashMap, HashSet};

/// Параметры сопоставления
#[derive(Debug, Clone)]
pub struct MatchOptions {
    /// Максимум подсказок для одного товара
    pub max_suggestions: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self { max_suggestions: 3 }
    }
}

/// Индекс артикул -> товары каталога (в порядке каталога)
///
/// Артикул сравнивается побайтно, без обрезки пробелов и с учетом регистра.
/// Пустые артикулы не индексируются.
pub fn build_sku_index(catalog: &[CanonicalProduct]) -> HashMap<&str, Vec<&CanonicalProduct>> {
    let mut index: HashMap<&str, Vec<&CanonicalProduct>> = HashMap::new();
    for product in catalog {
        if product.sku.trim().is_empty() {
            continue;
        }
        index.entry(product.sku.as_str()).or_default().push(product);
    }
    index
}

/// Кандидаты для ручного подтверждения: артикул каталога содержит
/// артикул товара или наоборот, без учета регистра
pub fn suggest_by_sku(
    sku: &str,
    catalog: &[CanonicalProduct],
    limit: usize,
) -> Vec<CanonicalProduct> {
    let needle = sku.trim().to_lowercase();
    if needle.is_empty() || limit == 0 {
        return Vec::new();
    }

    catalog
        .iter()
        .filter(|product| {
            let candidate = product.sku.trim().to_lowercase();
            !candidate.is_empty() && (candidate.contains(&needle) || needle.contains(&candidate))
        })
        .take(limit)
        .cloned()
        .collect()
}

enum Resolution {
    Matched(MatchedPair),
    Unmatched(UnmatchedReason),
}

/// Сопоставить снимок товаров маркетплейсов с каталогом
///
/// Приоритет: сохраненная связь, затем точное совпадение артикула, затем
/// подсказки. Каталог обходится в порядке входного массива, поэтому
/// результат детерминирован. Каждый товар каталога на одном маркетплейсе
/// связан не более чем с одним товаром: сохраненные связи занимают место
/// первыми, точные совпадения - в порядке товаров.
pub fn match_listings(
    listings: &[MarketplaceListing],
    catalog: &[CanonicalProduct],
    mappings: &[ProductMapping],
    options: &MatchOptions,
) -> MatchOutcome {
    let mut persisted: HashMap<(MarketplaceType, &str), &ProductMapping> = HashMap::new();
    for mapping in mappings {
        if mapping.match_type == MatchType::Unmatched {
            continue;
        }
        persisted
            .entry((mapping.marketplace, mapping.marketplace_listing_id.as_str()))
            .or_insert(mapping);
    }

    let by_id: HashMap<&str, &CanonicalProduct> =
        catalog.iter().map(|p| (p.id.as_str(), p)).collect();
    let index = build_sku_index(catalog);
    let mut claimed: HashSet<(&str, MarketplaceType)> = HashSet::new();

    // Проход 1: сохраненные связи
    let persisted_pass: Vec<Option<MatchedPair>> = listings
        .iter()
        .map(|listing| {
            persisted
                .get(&(listing.marketplace, listing.id.as_str()))
                .map(|mapping| {
                    claimed.insert((mapping.canonical_product_id.as_str(), listing.marketplace));
                    MatchedPair {
                        listing: listing.clone(),
                        canonical_product_id: mapping.canonical_product_id.clone(),
                        product: by_id
                            .get(mapping.canonical_product_id.as_str())
                            .map(|p| (*p).clone()),
                        match_type: mapping.match_type,
                        source: MatchSource::PersistedLink,
                    }
                })
        })
        .collect();

    // Проход 2: точное совпадение артикула
    let mut outcome = MatchOutcome::default();
    for (listing, persisted_pair) in listings.iter().zip(persisted_pass) {
        let resolution = match persisted_pair {
            Some(pair) => Resolution::Matched(pair),
            None => resolve_by_sku(listing, &index, &mut claimed),
        };
        match resolution {
            Resolution::Matched(pair) => outcome.matched.push(pair),
            Resolution::Unmatched(reason) => outcome.unmatched.push(UnmatchedListing {
                listing: listing.clone(),
                suggestions: suggest_by_sku(&listing.sku, catalog, options.max_suggestions),
                reason,
            }),
        }
    }
    outcome.summary = summarize(&outcome);

    tracing::info!(
        "Matched {} of {} listings ({} persisted, {} exact SKU), {} unmatched",
        outcome.matched.len(),
        listings.len(),
        outcome.summary.persisted_links,
        outcome.summary.exact_sku,
        outcome.summary.unmatched
    );

    outcome
}

fn resolve_by_sku<'a>(
    listing: &MarketplaceListing,
    index: &HashMap<&'a str, Vec<&'a CanonicalProduct>>,
    claimed: &mut HashSet<(&'a str, MarketplaceType)>,
) -> Resolution {
    let sku = listing.sku.as_str();
    let candidates = if sku.trim().is_empty() {
        None
    } else {
        index.get(sku).map(|c| c.as_slice())
    };

    match candidates {
        None | Some(&[]) => Resolution::Unmatched(UnmatchedReason::NotFound),
        Some(&[product]) => {
            if claimed.insert((product.id.as_str(), listing.marketplace)) {
                Resolution::Matched(MatchedPair {
                    listing: listing.clone(),
                    canonical_product_id: product.id.clone(),
                    product: Some(product.clone()),
                    match_type: MatchType::LinkedAutoSku,
                    source: MatchSource::ExactSku,
                })
            } else {
                tracing::debug!(
                    "Product {} is already linked on {}, listing {} left unmatched",
                    product.id,
                    listing.marketplace,
                    listing.id
                );
                Resolution::Unmatched(UnmatchedReason::AlreadyLinked)
            }
        }
        Some(many) => {
            tracing::warn!(
                "Ambiguous SKU '{}' for {} listing {}: {} catalog products",
                sku,
                listing.marketplace,
                listing.id,
                many.len()
            );
            Resolution::Unmatched(UnmatchedReason::Ambiguous)
        }
    }
}

fn summarize(outcome: &MatchOutcome) -> MatchSummary {
    let count = |source| outcome.matched.iter().filter(|m| m.source == source).count();
    MatchSummary {
        total: outcome.matched.len() + outcome.unmatched.len(),
        persisted_links: count(MatchSource::PersistedLink),
        exact_sku: count(MatchSource::ExactSku),
        unmatched: outcome.unmatched.len(),
        with_suggestions: outcome
            .unmatched
            .iter()
            .filter(|u| !u.suggestions.is_empty())
            .count(),
    }
}
