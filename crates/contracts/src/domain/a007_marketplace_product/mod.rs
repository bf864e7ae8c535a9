pub mod aggregate;

pub use aggregate::{AssignedValue, AttributeAssignment, MarketplaceListing};
