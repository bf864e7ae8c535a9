use contracts::domain::a026_mp_category::{AttributeSchema, MergedAttribute, SourceAttribute};
use contracts::enums::marketplace_type::MarketplaceType;
use std::collections::{BTreeSet, HashMap};

/// Объединить схемы атрибутов нескольких маркетплейсов
///
/// Маркетплейсы обходятся в порядке приоритета, заданном вызывающим.
/// Ключ объединения - название атрибута: ID у каждого маркетплейса свои.
/// Порядок результата - порядок первого появления названия.
pub fn merge(schemas_by_marketplace: &[(MarketplaceType, Vec<AttributeSchema>)]) -> Vec<MergedAttribute> {
    let mut merged: Vec<MergedAttribute> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (marketplace, schemas) in schemas_by_marketplace {
        for schema in schemas {
            let key = schema.name.trim().to_string();
            if key.is_empty() {
                tracing::warn!(
                    "Skipping unnamed attribute {} of {}",
                    schema.attribute_id,
                    marketplace
                );
                continue;
            }

            let position = *index.entry(key.clone()).or_insert_with(|| {
                merged.push(MergedAttribute {
                    name: key,
                    sources: Vec::new(),
                    marketplaces: BTreeSet::new(),
                    required_for: BTreeSet::new(),
                });
                merged.len() - 1
            });

            let entry = &mut merged[position];
            entry.marketplaces.insert(*marketplace);
            if schema.is_required {
                entry.required_for.insert(*marketplace);
            }
            entry.sources.push(SourceAttribute {
                marketplace: *marketplace,
                schema: schema.clone(),
            });
        }
    }

    tracing::debug!(
        "Merged {} marketplaces into {} attributes ({} required)",
        schemas_by_marketplace.len(),
        merged.len(),
        merged.iter().filter(|m| m.is_required()).count()
    );

    merged
}
