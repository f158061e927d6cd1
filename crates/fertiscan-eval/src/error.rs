use fertiscan_core::FieldKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreError {
    /// Two values of different categories were handed to one comparator.
    #[error("field `{field}`: cannot compare {expected} against {actual}")]
    CategoryMismatch {
        field: String,
        expected: FieldKind,
        actual: FieldKind,
    },
}
