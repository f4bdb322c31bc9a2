// 📐 Form Validation
// Required-field and numeric checks run before any page mutates its state

use crate::error::{BudgetError, Result};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// VALIDATION ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub context: String,
}

impl ValidationError {
    pub fn new(context: &str, field: &str, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.to_string(),
            message: message.into(),
            context: context.to_string(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.context, self.field, self.message)
    }
}

pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

// ============================================================================
// VALIDATOR
// ============================================================================

/// Collects every failure for one form so the user sees them together.
pub struct Validator {
    context: &'static str,
    errors: Vec<ValidationError>,
}

impl Validator {
    pub fn new(context: &'static str) -> Self {
        Validator {
            context,
            errors: Vec::new(),
        }
    }

    pub fn require_text(mut self, field: &str, value: &str, label: &str) -> Self {
        if value.trim().is_empty() {
            self.push(field, format!("Please enter {}", label));
        }
        self
    }

    pub fn require_positive(mut self, field: &str, value: f64, label: &str) -> Self {
        if !value.is_finite() || value <= 0.0 {
            self.push(field, format!("{} must be greater than zero", label));
        }
        self
    }

    pub fn require_non_negative(mut self, field: &str, value: f64, label: &str) -> Self {
        if !value.is_finite() || value < 0.0 {
            self.push(field, format!("{} cannot be negative", label));
        }
        self
    }

    pub fn require_percentage(mut self, field: &str, value: f64, label: &str) -> Self {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            self.push(field, format!("{} must be between 0 and 100", label));
        }
        self
    }

    /// Arbitrary predicate, for checks specific to one form.
    pub fn check(mut self, ok: bool, field: &str, message: impl Into<String>) -> Self {
        if !ok {
            self.push(field, message.into());
        }
        self
    }

    pub fn result(self) -> ValidationResult {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    /// Finish the form; failures become a `BudgetError::Validation`.
    pub fn finish(self) -> Result<()> {
        self.result().map_err(BudgetError::Validation)
    }

    fn push(&mut self, field: &str, message: String) {
        self.errors
            .push(ValidationError::new(self.context, field, message));
    }
}

/// Parse user-entered amounts. Invalid input coerces to zero.
///
/// Accepts a leading `₹`, thousands separators and surrounding whitespace.
pub fn coerce_amount(input: &str) -> f64 {
    let cleaned: String = input
        .trim()
        .trim_start_matches('₹')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Serde hook for form amounts: numbers pass through, text goes through
/// `coerce_amount`, so `"abc"` reaches the validator as zero.
pub fn lenient_amount<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(v) => v,
        Raw::Text(text) => coerce_amount(&text),
    })
}
