pub mod aggregate;

pub use aggregate::{
    mapping_id, AutoLinkListingsRequest, AutoLinkReport, AutoLinkRequest, ConfirmLinkRequest, LinkFailure, MatchType,
    ProductMapping, UnlinkReport,
};
