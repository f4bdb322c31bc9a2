// Pages written through one store handle are read back by the next one.

use chrono::NaiveDate;
use family_budget::i18n::{Language, LanguageState};
use family_budget::pages::expenses::NewExpense;
use family_budget::pages::goals::NewGoal;
use family_budget::pages::vault::NewPasswordEntry;
use family_budget::pages::{
    seed_all, BudgetPlan, ExpenseLedger, GoalTracker, OnlineBanking, PasswordVault, Priority, ReminderBoard,
};
use family_budget::{keys, AuthSession, LocalStore, Persisted};
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn open(dir: &TempDir) -> LocalStore {
    LocalStore::open(&dir.path().join("budget.db")).unwrap()
}

#[test]
fn test_pages_survive_reopen() {
    let dir = TempDir::new().unwrap();

    let (expense_id, goal_id, balance) = {
        let store = open(&dir);

        let mut ledger = ExpenseLedger::load(&store).unwrap();
        let expense = ledger
            .add(NewExpense {
                title: "Auto fare".to_string(),
                amount: 120.0,
                category: "Transport".to_string(),
                date: date(2025, 3, 2),
                payment_method: "Cash".to_string(),
                notes: String::new(),
            })
            .unwrap();
        ledger.save(&store).unwrap();

        let mut goals = GoalTracker::load(&store).unwrap();
        let goal = goals
            .add(NewGoal {
                title: "Diwali fund".to_string(),
                target_amount: 30000.0,
                current_amount: 5000.0,
                deadline: date(2025, 10, 20),
                priority: Priority::Medium,
                category: "Festival".to_string(),
            })
            .unwrap();
        goals.save(&store).unwrap();

        let mut plan = BudgetPlan::load(&store).unwrap();
        plan.set_income(72000.0).unwrap();
        plan.save(&store).unwrap();

        let mut banking = OnlineBanking::load(&store).unwrap();
        banking.deposit(5000.0, "Salary", "Bonus", date(2025, 3, 3)).unwrap();
        banking.save(&store).unwrap();

        LanguageState::load(&store)
            .unwrap()
            .set_language(&store, Language::Tamil)
            .unwrap();

        (expense.id, goal.id, banking.balance())
    };

    let store = open(&dir);

    let ledger = ExpenseLedger::load(&store).unwrap();
    assert!(ledger.all().iter().any(|e| e.id == expense_id && e.amount == 120.0));

    let goals = GoalTracker::load(&store).unwrap();
    assert_eq!(goals.get(&goal_id).unwrap().current_amount, 5000.0);

    assert_eq!(BudgetPlan::load(&store).unwrap().monthly_income, 72000.0);
    assert_eq!(OnlineBanking::load(&store).unwrap().balance(), balance);
    assert_eq!(LanguageState::load(&store).unwrap().current(), Language::Tamil);
}

#[test]
fn test_vault_keeps_password_but_lists_masked() {
    let dir = TempDir::new().unwrap();
    {
        let store = open(&dir);
        let mut vault = PasswordVault::new();
        vault
            .add(NewPasswordEntry {
                website: "irctc.co.in".to_string(),
                username: "priya".to_string(),
                password: "Tatkal#2025!".to_string(),
                category: "Travel".to_string(),
            })
            .unwrap();
        vault.save(&store).unwrap();
    }

    let store = open(&dir);
    let vault = PasswordVault::load(&store).unwrap();
    assert_eq!(vault.all()[0].password, "Tatkal#2025!");
    assert!(!vault.masked()[0].password.contains("Tatkal"));
}

#[test]
fn test_session_restored_after_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = open(&dir);
        let mut session = AuthSession::restore(&store).unwrap();
        session.signup(&store, "Priya", "priya@example.com", "secret123").unwrap();
    }

    let store = open(&dir);
    let mut session = AuthSession::restore(&store).unwrap();
    assert_eq!(session.current_user().unwrap().email, "priya@example.com");

    session.logout(&store).unwrap();
    let store = open(&dir);
    assert!(AuthSession::restore(&store).unwrap().current_user().is_none());
}

#[test]
fn test_seed_all_then_reset() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);

    seed_all(&store).unwrap();
    let stored = store.keys().unwrap();
    for key in [
        keys::EXPENSES,
        keys::GOALS,
        keys::REMINDERS,
        keys::BANK_TRANSACTIONS,
        keys::BENEFICIARIES,
        keys::PASSWORDS,
        keys::SCHEME_NOTIFICATIONS,
        keys::SUBSCRIPTIONS,
        keys::FAMILY,
        keys::PROFILE,
    ] {
        assert!(stored.iter().any(|k| k == key), "missing {}", key);
    }

    assert!(!ReminderBoard::load(&store).unwrap().all().is_empty());
    assert!(OnlineBanking::load(&store).unwrap().balance() > 0.0);

    let removed = store.clear().unwrap();
    assert_eq!(removed, stored.len());
    assert!(store.keys().unwrap().is_empty());
}
