// 🏠 Dashboard - the landing overview

use crate::finance::{percent_of, progress_percent};
use crate::pages::budget_planner::BudgetPlan;
use crate::pages::expenses::{CategoryTotal, Expense, ExpenseLedger};
use crate::pages::goals::{GoalStatus, GoalTracker};
use crate::pages::reminders::{Reminder, ReminderBoard};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

pub const RECENT_EXPENSES: usize = 5;
pub const UPCOMING_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub title: String,
    pub progress: f64,
    pub remaining: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub month: String,
    pub income: f64,
    pub expenses: f64,
    pub savings: f64,
    pub savings_rate: f64,
    pub budget_used: f64,
    pub top_categories: Vec<CategoryTotal>,
    pub recent_expenses: Vec<Expense>,
    pub goals: Vec<GoalProgress>,
    pub goals_progress: f64,
    pub upcoming_bills: Vec<Reminder>,
    pub upcoming_total: f64,
    pub alerts: Vec<String>,
}

impl DashboardOverview {
    pub fn build(
        today: NaiveDate,
        plan: &BudgetPlan,
        ledger: &ExpenseLedger,
        goals: &GoalTracker,
        reminders: &ReminderBoard,
    ) -> Self {
        let (y, m) = (today.year(), today.month());
        let income = plan.monthly_income;
        let expenses = ledger.month_total(y, m);
        let savings = income - expenses;

        let active_goals: Vec<GoalProgress> = goals
            .all()
            .iter()
            .filter(|g| g.status != GoalStatus::Completed)
            .map(|g| GoalProgress {
                title: g.title.clone(),
                progress: g.progress(),
                remaining: g.remaining(),
            })
            .collect();
        let summary = goals.summary();

        let upcoming_bills: Vec<Reminder> = reminders
            .due_within(today, UPCOMING_DAYS)
            .into_iter()
            .cloned()
            .collect();
        let upcoming_total = upcoming_bills.iter().map(|r| r.amount).sum();

        let mut top_categories = ledger.category_breakdown_for_month(y, m);
        top_categories.truncate(5);

        DashboardOverview {
            month: format!("{:04}-{:02}", y, m),
            income,
            expenses,
            savings,
            savings_rate: percent_of(savings, income),
            budget_used: progress_percent(expenses, income),
            top_categories,
            recent_expenses: ledger.recent(RECENT_EXPENSES).into_iter().cloned().collect(),
            goals: active_goals,
            goals_progress: summary.overall_progress,
            upcoming_bills,
            upcoming_total,
            alerts: plan.alerts(ledger, y, m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::expenses::tests::{date, sample_ledger};
    use crate::pages::goals::{NewGoal, Priority};
    use crate::pages::reminders::{NewReminder, Recurrence};

    #[test]
    fn test_overview_for_january() {
        let mut plan = BudgetPlan::new(40000.0);
        plan.set_limit("Groceries", 4000.0).unwrap();
        let ledger = sample_ledger();

        let mut goals = GoalTracker::new();
        goals
            .add(NewGoal {
                title: "Laptop".to_string(),
                target_amount: 50000.0,
                current_amount: 10000.0,
                deadline: date(2025, 6, 1),
                priority: Priority::Medium,
                category: String::new(),
            })
            .unwrap();

        let mut reminders = ReminderBoard::new();
        reminders
            .add(NewReminder {
                title: "EB".to_string(),
                category: "Utilities".to_string(),
                amount: 1200.0,
                due_date: date(2025, 1, 28),
                priority: Priority::High,
                recurring: Recurrence::Monthly,
            })
            .unwrap();

        let overview = DashboardOverview::build(date(2025, 1, 25), &plan, &ledger, &goals, &reminders);

        assert_eq!(overview.month, "2025-01");
        assert_eq!(overview.expenses, 21000.0);
        assert_eq!(overview.savings, 19000.0);
        assert_eq!(overview.savings_rate, 47.5);
        assert_eq!(overview.top_categories[0].category, "Rent");
        assert_eq!(overview.recent_expenses.len(), RECENT_EXPENSES);
        assert_eq!(overview.goals[0].progress, 20.0);
        assert_eq!(overview.upcoming_total, 1200.0);
        assert_eq!(overview.alerts, vec!["Groceries budget exceeded by ₹1000".to_string()]);
    }

    #[test]
    fn test_overview_without_income() {
        let overview = DashboardOverview::build(
            date(2025, 1, 25),
            &BudgetPlan::new(0.0),
            &ExpenseLedger::new(),
            &GoalTracker::new(),
            &ReminderBoard::new(),
        );
        assert_eq!(overview.savings_rate, 0.0);
        assert_eq!(overview.budget_used, 0.0);
        assert!(overview.recent_expenses.is_empty());
    }
}
