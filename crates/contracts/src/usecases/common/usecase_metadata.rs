/// Метаданные UseCase для идентификации в логах и API
pub trait UseCaseMetadata {
    /// Индекс UseCase (например, "u505")
    fn usecase_index() -> &'static str;

    /// Техническое имя (например, "match_nomenclature")
    fn usecase_name() -> &'static str;

    /// Отображаемое имя для UI
    fn display_name() -> &'static str;

    fn description() -> &'static str {
        ""
    }

    /// Полное имя вида "u505_match_nomenclature"
    fn full_name() -> String {
        format!("{}_{}", Self::usecase_index(), Self::usecase_name())
    }
}
