// Page view-models
//
// Each page owns its records, validates form input before mutating, and
// persists under one local-storage key through `Persisted`.

pub mod assistant;
pub mod banking;
pub mod budget_planner;
pub mod clothing;
pub mod dashboard;
pub mod expenses;
pub mod family;
pub mod goals;
pub mod healthcare;
pub mod investments;
pub mod profile;
pub mod reminders;
pub mod schemes;
pub mod subscriptions;
pub mod summary;
pub mod vault;

pub use assistant::{AssistantContext, AssistantReply, Intent};
pub use banking::{BankTransaction, Beneficiary, LoanApplication, LoanDecision, LoanType, OnlineBanking};
pub use budget_planner::{BudgetPlan, BudgetStatus, CategoryUtilization};
pub use clothing::ClothingBudget;
pub use dashboard::DashboardOverview;
pub use expenses::{Expense, ExpenseLedger, NewExpense};
pub use family::FamilyBudget;
pub use goals::{Goal, GoalStatus, GoalTracker, Priority};
pub use healthcare::{HealthLog, Medicine, ScanAnalysis};
pub use investments::{ChitFund, Investment, InvestmentKind, Portfolio};
pub use profile::Profile;
pub use reminders::{Recurrence, Reminder, ReminderBoard};
pub use schemes::{EligibilityQuery, Scheme, SchemeNotifications};
pub use subscriptions::{Subscription, SubscriptionList};
pub use summary::{FinancialSummary, SummarySources};
pub use vault::{PasswordEntry, PasswordStrength, PasswordVault};

use crate::error::Result;
use crate::storage::{LocalStore, Persisted};
use tracing::info;

/// Write every page's sample records, replacing what is stored.
pub fn seed_all(store: &LocalStore) -> Result<()> {
    ExpenseLedger::seed().save(store)?;
    BudgetPlan::seed().save(store)?;
    GoalTracker::seed().save(store)?;
    ReminderBoard::seed().save(store)?;
    PasswordVault::seed().save(store)?;
    SchemeNotifications::seed().save(store)?;
    HealthLog::seed().save(store)?;
    SubscriptionList::seed().save(store)?;
    ClothingBudget::seed().save(store)?;
    Portfolio::seed().save(store)?;
    FamilyBudget::seed().save(store)?;
    Profile::seed().save(store)?;

    // Banking spans two keys; an empty store loads its seed
    store.remove(crate::storage::keys::BANK_TRANSACTIONS)?;
    store.remove(crate::storage::keys::BENEFICIARIES)?;
    OnlineBanking::load(store)?.save(store)?;

    info!("sample data written for every page");
    Ok(())
}
