pub mod config;
pub mod data;
pub mod debounce;
pub mod errors;
pub mod marketplaces;
pub mod session_registry;

#[cfg(test)]
pub mod testing;
