// 🖨️ Printable Summary - one report across every page
//
// The text report is what the print view shows; the CSV carries the
// month's expense lines for spreadsheets.

use crate::error::Result;
use crate::finance::{format_inr, percent_of};
use crate::pages::banking::OnlineBanking;
use crate::pages::budget_planner::{BudgetPlan, CategoryUtilization};
use crate::pages::expenses::{CategoryTotal, Expense, ExpenseLedger};
use crate::pages::goals::{GoalSummary, GoalTracker};
use crate::pages::healthcare::HealthLog;
use crate::pages::investments::Portfolio;
use crate::pages::profile::Profile;
use crate::pages::reminders::ReminderBoard;
use crate::pages::subscriptions::SubscriptionList;
use crate::storage::{LocalStore, Persisted};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;
use tracing::info;

/// Borrowed view of every page the report draws from.
pub struct SummarySources<'a> {
    pub profile: &'a Profile,
    pub plan: &'a BudgetPlan,
    pub ledger: &'a ExpenseLedger,
    pub goals: &'a GoalTracker,
    pub reminders: &'a ReminderBoard,
    pub banking: &'a OnlineBanking,
    pub subscriptions: &'a SubscriptionList,
    pub investments: &'a Portfolio,
    pub health: &'a HealthLog,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub generated_at: DateTime<Utc>,
    pub month: String,
    pub name: String,
    pub income: f64,
    pub expenses: f64,
    pub savings: f64,
    pub savings_rate: f64,
    pub categories: Vec<CategoryTotal>,
    pub budget: Vec<CategoryUtilization>,
    pub goals: GoalSummary,
    pub bank_balance: f64,
    pub upcoming_bills: usize,
    pub upcoming_bills_total: f64,
    pub subscriptions_monthly: f64,
    pub investments_monthly: f64,
    pub investments_projected: f64,
    pub health_spend_year: f64,
    pub section_80d_remaining: f64,
    pub expense_lines: Vec<Expense>,
}

impl FinancialSummary {
    pub fn build(today: NaiveDate, src: &SummarySources<'_>) -> Self {
        let (y, m) = (today.year(), today.month());
        let income = src.plan.monthly_income;
        let expenses = src.ledger.month_total(y, m);
        let savings = income - expenses;

        let upcoming = src.reminders.due_within(today, 30);
        let portfolio = src.investments.portfolio_summary(today);

        let mut expense_lines: Vec<Expense> = src.ledger.in_month(y, m).into_iter().cloned().collect();
        expense_lines.sort_by(|a, b| a.date.cmp(&b.date));

        FinancialSummary {
            generated_at: Utc::now(),
            month: format!("{:04}-{:02}", y, m),
            name: src.profile.name.clone(),
            income,
            expenses,
            savings,
            savings_rate: percent_of(savings, income),
            categories: src.ledger.category_breakdown_for_month(y, m),
            budget: src.plan.utilization(src.ledger, y, m),
            goals: src.goals.summary(),
            bank_balance: src.banking.balance(),
            upcoming_bills: upcoming.len(),
            upcoming_bills_total: upcoming.iter().map(|r| r.amount).sum(),
            subscriptions_monthly: src.subscriptions.monthly_total(),
            investments_monthly: portfolio.monthly_outflow,
            investments_projected: portfolio.projected_value,
            health_spend_year: src.health.annual_total(y),
            section_80d_remaining: src.health.section_80d_remaining(y),
            expense_lines,
        }
    }

    /// Load every page from the store and build the report.
    pub fn from_store(store: &LocalStore, today: NaiveDate) -> Result<Self> {
        let profile = Profile::load(store)?;
        let plan = BudgetPlan::load(store)?;
        let ledger = ExpenseLedger::load(store)?;
        let goals = GoalTracker::load(store)?;
        let reminders = ReminderBoard::load(store)?;
        let banking = OnlineBanking::load(store)?;
        let subscriptions = SubscriptionList::load(store)?;
        let investments = Portfolio::load(store)?;
        let health = HealthLog::load(store)?;

        let summary = FinancialSummary::build(
            today,
            &SummarySources {
                profile: &profile,
                plan: &plan,
                ledger: &ledger,
                goals: &goals,
                reminders: &reminders,
                banking: &banking,
                subscriptions: &subscriptions,
                investments: &investments,
                health: &health,
            },
        );
        info!(month = %summary.month, lines = summary.expense_lines.len(), "summary built");
        Ok(summary)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let rule = "=".repeat(48);

        // Writing into a String cannot fail
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "FINANCIAL SUMMARY - {}", self.month);
        let _ = writeln!(out, "Prepared for: {}", self.name);
        let _ = writeln!(out, "{}", rule);

        let _ = writeln!(out, "\nINCOME & SPENDING");
        let _ = writeln!(out, "  {:<24}{:>16}", "Monthly income", format_inr(self.income));
        let _ = writeln!(out, "  {:<24}{:>16}", "Expenses this month", format_inr(self.expenses));
        let _ = writeln!(out, "  {:<24}{:>16}", "Savings", format_inr(self.savings));
        let _ = writeln!(out, "  {:<24}{:>15.1}%", "Savings rate", self.savings_rate);

        if !self.categories.is_empty() {
            let _ = writeln!(out, "\nBY CATEGORY");
            for c in &self.categories {
                let _ = writeln!(out, "  {:<24}{:>16}  {:>5.1}%", c.category, format_inr(c.total), c.share);
            }
        }

        if !self.budget.is_empty() {
            let _ = writeln!(out, "\nBUDGET LIMITS");
            for u in &self.budget {
                let _ = writeln!(
                    out,
                    "  {:<24}{:>16} of {}  ({:?})",
                    u.category,
                    format_inr(u.spent),
                    format_inr(u.limit),
                    u.status
                );
            }
        }

        let _ = writeln!(out, "\nGOALS");
        let _ = writeln!(
            out,
            "  {} goals, {} completed, {} of {} saved ({:.0}%)",
            self.goals.total_goals,
            self.goals.completed,
            format_inr(self.goals.total_saved),
            format_inr(self.goals.total_target),
            self.goals.overall_progress
        );

        let _ = writeln!(out, "\nACCOUNTS & COMMITMENTS");
        let _ = writeln!(out, "  {:<24}{:>16}", "Bank balance", format_inr(self.bank_balance));
        let _ = writeln!(
            out,
            "  {:<24}{:>16}  ({} due in 30 days)",
            "Upcoming bills",
            format_inr(self.upcoming_bills_total),
            self.upcoming_bills
        );
        let _ = writeln!(out, "  {:<24}{:>16}", "OTT per month", format_inr(self.subscriptions_monthly));
        let _ = writeln!(out, "  {:<24}{:>16}", "Investing per month", format_inr(self.investments_monthly));
        let _ = writeln!(out, "  {:<24}{:>16}", "Projected maturity", format_inr(self.investments_projected));
        let _ = writeln!(out, "  {:<24}{:>16}", "Health spend (year)", format_inr(self.health_spend_year));
        let _ = writeln!(out, "  {:<24}{:>16}", "80D headroom", format_inr(self.section_80d_remaining));

        let _ = writeln!(out, "\n{}", rule);
        let _ = writeln!(out, "Generated {}", self.generated_at.format("%d %b %Y %H:%M UTC"));
        out
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["Date", "Title", "Category", "Amount", "Payment_Method"])?;
        for e in &self.expense_lines {
            wtr.write_record([
                e.date.to_string(),
                e.title.clone(),
                e.category.clone(),
                format!("{:.2}", e.amount),
                e.payment_method.clone(),
            ])?;
        }
        wtr.write_record([
            String::new(),
            "TOTAL".to_string(),
            String::new(),
            format!("{:.2}", self.expenses),
            String::new(),
        ])?;
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::expenses::tests::{date, sample_ledger};

    fn summary() -> FinancialSummary {
        let profile = Profile {
            name: "Priya".to_string(),
            ..Profile::seed()
        };
        let mut plan = BudgetPlan::new(40000.0);
        plan.set_limit("Rent", 15000.0).unwrap();
        let ledger = sample_ledger();

        FinancialSummary::build(
            date(2025, 1, 25),
            &SummarySources {
                profile: &profile,
                plan: &plan,
                ledger: &ledger,
                goals: &GoalTracker::new(),
                reminders: &ReminderBoard::new(),
                banking: &OnlineBanking::new(125000.0),
                subscriptions: &SubscriptionList::new(),
                investments: &Portfolio::new(),
                health: &HealthLog::new(),
            },
        )
    }

    #[test]
    fn test_build_month_figures() {
        let s = summary();
        assert_eq!(s.month, "2025-01");
        assert_eq!(s.expenses, 21000.0);
        assert_eq!(s.savings, 19000.0);
        assert_eq!(s.expense_lines.len(), 4);
        assert_eq!(s.section_80d_remaining, 25000.0);
        assert_eq!(s.budget[0].spent, 15000.0);
    }

    #[test]
    fn test_render_text_uses_inr() {
        let text = summary().render_text();
        assert!(text.contains("FINANCIAL SUMMARY - 2025-01"));
        assert!(text.contains("Prepared for: Priya"));
        assert!(text.contains("₹21,000"));
        assert!(text.contains("₹1,25,000"));
        assert!(text.contains("47.5%"));
    }

    #[test]
    fn test_csv_lines_and_total() {
        let mut buf = Vec::new();
        summary().write_csv(&mut buf).unwrap();
        let csv = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Date,Title,Category,Amount,Payment_Method");
        assert_eq!(lines[1], "2025-01-01,Rent,Rent,15000.00,UPI");
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[5], ",TOTAL,,21000.00,");
    }

    #[test]
    fn test_from_store_uses_seeds() {
        let store = LocalStore::open_in_memory().unwrap();
        let today = chrono::Local::now().date_naive();
        let s = FinancialSummary::from_store(&store, today).unwrap();
        assert_eq!(s.name, "Guest");
        assert!(s.expenses > 0.0);
        assert!(s.bank_balance > 0.0);
    }
}
