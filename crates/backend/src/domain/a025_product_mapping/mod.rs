pub mod matcher;
pub mod service;
