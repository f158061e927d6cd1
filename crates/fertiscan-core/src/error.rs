use thiserror::Error;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("raw inspection is not a JSON object")]
    NotAnObject,

    #[error("mandatory field `{field}` is absent after normalization")]
    MissingField { field: String },

    #[error("mandatory field `{field}` is not an inspection field")]
    UnknownField { field: String },
}
