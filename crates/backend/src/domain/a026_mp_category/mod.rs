pub mod attribute_cache;
pub mod editing_session;
pub mod merger;
pub mod service;
