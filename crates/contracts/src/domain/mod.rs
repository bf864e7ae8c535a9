pub mod a004_nomenclature;
pub mod a007_marketplace_product;
pub mod a025_product_mapping;
pub mod a026_mp_category;
