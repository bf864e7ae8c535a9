pub mod picker;
pub mod service;
