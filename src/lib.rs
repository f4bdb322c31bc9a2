// Family Budget - Core Library
// Exposes all modules for use in the CLI/TUI, the API server, and tests

pub mod error;
pub mod validation;
pub mod finance;
pub mod storage;
pub mod config;
pub mod logging;
pub mod auth;
pub mod i18n;
pub mod routes;
pub mod pages;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use error::{BudgetError, Result};
pub use validation::{coerce_amount, ValidationError, ValidationResult, Validator};
pub use finance::{emi, format_inr, loan_quote, BudgetRule, BudgetSplit, LoanQuote};
pub use storage::{keys, Event, LocalStore, Persisted};
pub use config::AppConfig;
pub use logging::init_logging;
pub use auth::{AuthSession, User};
pub use i18n::{translate, Language, LanguageState};
pub use routes::{resolve, Page, Route, Section};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
