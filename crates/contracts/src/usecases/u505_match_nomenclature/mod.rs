pub mod progress;
pub mod request;
pub mod response;

pub use progress::MatchProgress;
pub use request::MatchRequest;
pub use response::{
    MatchOutcome, MatchResponse, MatchRunResult, MatchSource, MatchSummary, MatchedPair,
    UnmatchedListing, UnmatchedReason,
};

use crate::usecases::common::UseCaseMetadata;

pub struct MatchNomenclature;

impl UseCaseMetadata for MatchNomenclature {
    fn usecase_index() -> &'static str {
        "u505"
    }

    fn usecase_name() -> &'static str {
        "match_nomenclature"
    }

    fn display_name() -> &'static str {
        "Сопоставление товаров маркетплейсов"
    }

    fn description() -> &'static str {
        "Сопоставление товаров маркетплейсов с каталогом: сохраненные связи, точное совпадение артикула, подсказки по вхождению"
    }
}
