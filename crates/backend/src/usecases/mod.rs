pub mod u505_match_nomenclature;
