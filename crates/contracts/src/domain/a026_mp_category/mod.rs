pub mod aggregate;

pub use aggregate::{
    AttributeSchema, AttributeValue, AttributeValueKey, Category, MergedAttribute,
    SourceAttribute,
};
