use contracts::domain::a004_nomenclature::{CanonicalProduct, ListingRef};
use contracts::domain::a007_marketplace_product::MarketplaceListing;
use contracts::domain::a025_product_mapping::{MatchType, ProductMapping};
use contracts::enums::marketplace_type::MarketplaceType;
use std::collections::HashMap;

/// Подбор товаров каталога для ручного связывания
///
/// Артикул или название содержит запрос без учета регистра. Порядок -
/// порядок каталога.
pub fn suggest_products(
    catalog: &[CanonicalProduct],
    query: &str,
    limit: usize,
) -> Vec<CanonicalProduct> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    catalog
        .iter()
        .filter(|p| p.sku.to_lowercase().contains(&query) || p.name.to_lowercase().contains(&query))
        .take(limit)
        .cloned()
        .collect()
}

/// Пересобрать связи товаров каталога по сохраненным связям
///
/// Если для пары (товар, маркетплейс) связей несколько, остается первая.
/// Данные товара маркетплейса берутся из `listings`, если он там есть.
pub fn apply_mappings(
    catalog: &mut [CanonicalProduct],
    mappings: &[ProductMapping],
    listings: &[MarketplaceListing],
) {
    let by_key: HashMap<(MarketplaceType, &str), &MarketplaceListing> = listings
        .iter()
        .map(|l| ((l.marketplace, l.id.as_str()), l))
        .collect();
    let mut index: HashMap<String, usize> = HashMap::new();
    for (position, product) in catalog.iter().enumerate() {
        index.entry(product.id.clone()).or_insert(position);
    }

    for product in catalog.iter_mut() {
        product.marketplace_links.clear();
    }

    for mapping in mappings {
        if mapping.match_type == MatchType::Unmatched {
            continue;
        }
        let Some(&position) = index.get(&mapping.canonical_product_id) else {
            tracing::debug!(
                "Mapping {} points to unknown product {}",
                mapping.id,
                mapping.canonical_product_id
            );
            continue;
        };

        let link = match by_key.get(&(mapping.marketplace, mapping.marketplace_listing_id.as_str())) {
            Some(listing) => listing.to_listing_ref(),
            None => ListingRef {
                listing_id: mapping.marketplace_listing_id.clone(),
                sku: String::new(),
                name: None,
            },
        };
        let product = &mut catalog[position];
        if product.link_for(mapping.marketplace).is_none() {
            product.marketplace_links.insert(mapping.marketplace, link);
        }
    }
}
