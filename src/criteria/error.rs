use thiserror::Error;

/// Errors raised when editing a criteria model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CriteriaError {
    #[error("Unknown operator: '{0}'. Valid operators are: match, exclude, since, until, min, max, in")]
    InvalidOperator(String),

    #[error("Unknown field: '{0}'")]
    UnknownField(String),

    #[error("Operator '{operator}' is not supported by field '{field}'")]
    UnsupportedOperator {
        field: &'static str,
        operator: &'static str,
    },
}
