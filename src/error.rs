// ⚠️ Error types shared by every page and the storage layer

use crate::validation::ValidationError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BudgetError>;

#[derive(Debug, Error)]
pub enum BudgetError {
    /// Form-level failure. The display string is what the user sees as a toast.
    #[error("{}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("insufficient funds: balance ₹{balance:.2}, requested ₹{requested:.2}")]
    InsufficientFunds { balance: f64, requested: f64 },

    #[error("{entity} already exists: {key}")]
    Duplicate { entity: &'static str, key: String },

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BudgetError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Single validation failure without building a `Validator`.
    pub fn invalid(context: &str, field: &str, message: impl Into<String>) -> Self {
        Self::Validation(vec![ValidationError::new(context, field, message)])
    }

    /// True for failures caused by user input rather than the environment.
    /// A malformed CSV upload counts as input.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::NotFound { .. }
                | Self::InsufficientFunds { .. }
                | Self::Duplicate { .. }
                | Self::Auth(_)
                | Self::Csv(_)
        )
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_toast_joins_messages() {
        let err = BudgetError::Validation(vec![
            ValidationError::new("Goal", "title", "Please enter a goal title"),
            ValidationError::new("Goal", "targetAmount", "Target amount must be greater than zero"),
        ]);

        assert_eq!(
            err.to_string(),
            "Please enter a goal title; Target amount must be greater than zero"
        );
        assert!(err.is_user_error());
    }

    #[test]
    fn test_not_found_message() {
        let err = BudgetError::not_found("goal", "abc");
        assert_eq!(err.to_string(), "goal not found: abc");
    }
}
