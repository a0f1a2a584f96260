use std::fmt;

/// Questionnaire answers outside the ranges the engine is defined over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidInputError {
    pub field: &'static str,
    pub detail: String,
}

impl InvalidInputError {
    pub fn new(field: &'static str, detail: impl Into<String>) -> Self {
        Self {
            field,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for InvalidInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid input (field={}): {}", self.field, self.detail)
    }
}

impl std::error::Error for InvalidInputError {}
