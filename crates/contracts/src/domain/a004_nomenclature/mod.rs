pub mod aggregate;

pub use aggregate::{CanonicalProduct, ListingRef};
