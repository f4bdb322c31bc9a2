// 📊 Budget Planner - income split by rule plus per-category limits

use crate::error::{BudgetError, Result};
use crate::finance::{percent_of, BudgetRule, BudgetSplit};
use crate::pages::expenses::ExpenseLedger;
use crate::storage::{keys, Persisted};
use crate::validation::Validator;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Utilization at or above this share of the limit raises a warning.
pub const WARNING_THRESHOLD: f64 = 80.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryLimit {
    pub category: String,
    pub limit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    Ok,
    Warning,
    Exceeded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUtilization {
    pub category: String,
    pub limit: f64,
    pub spent: f64,
    pub remaining: f64,
    pub percent: f64,
    pub status: BudgetStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPlan {
    pub monthly_income: f64,
    pub rule: BudgetRule,
    pub category_limits: Vec<CategoryLimit>,
}

impl Default for BudgetPlan {
    fn default() -> Self {
        BudgetPlan {
            monthly_income: 0.0,
            rule: BudgetRule::default(),
            category_limits: Vec::new(),
        }
    }
}

impl BudgetPlan {
    pub fn new(monthly_income: f64) -> Self {
        BudgetPlan {
            monthly_income: monthly_income.max(0.0),
            ..BudgetPlan::default()
        }
    }

    pub fn set_income(&mut self, income: f64) -> Result<()> {
        Validator::new("BudgetPlan")
            .require_non_negative("monthlyIncome", income, "Monthly income")
            .finish()?;
        self.monthly_income = income;
        Ok(())
    }

    pub fn set_rule(&mut self, rule: BudgetRule) -> Result<()> {
        rule.validate()?;
        self.rule = rule;
        Ok(())
    }

    pub fn allocation(&self) -> BudgetSplit {
        self.rule.split(self.monthly_income)
    }

    /// Add or replace the limit for a category.
    pub fn set_limit(&mut self, category: &str, limit: f64) -> Result<()> {
        Validator::new("CategoryLimit")
            .require_text("category", category, "a category")
            .require_positive("limit", limit, "Limit")
            .finish()?;

        let category = category.trim();
        match self
            .category_limits
            .iter_mut()
            .find(|l| l.category.eq_ignore_ascii_case(category))
        {
            Some(existing) => existing.limit = limit,
            None => self.category_limits.push(CategoryLimit {
                category: category.to_string(),
                limit,
            }),
        }
        info!(category, limit, "category limit set");
        Ok(())
    }

    pub fn remove_limit(&mut self, category: &str) -> Result<CategoryLimit> {
        let pos = self
            .category_limits
            .iter()
            .position(|l| l.category.eq_ignore_ascii_case(category))
            .ok_or_else(|| BudgetError::not_found("category limit", category))?;
        Ok(self.category_limits.remove(pos))
    }

    /// Income not yet promised to a category limit (negative when over-planned).
    pub fn unallocated(&self) -> f64 {
        self.monthly_income - self.category_limits.iter().map(|l| l.limit).sum::<f64>()
    }

    pub fn utilization(&self, ledger: &ExpenseLedger, year: i32, month: u32) -> Vec<CategoryUtilization> {
        let month_expenses = ledger.in_month(year, month);

        self.category_limits
            .iter()
            .map(|l| {
                let spent: f64 = month_expenses
                    .iter()
                    .filter(|e| e.category.eq_ignore_ascii_case(&l.category))
                    .map(|e| e.amount)
                    .sum();
                let percent = percent_of(spent, l.limit);
                let status = if percent > 100.0 {
                    BudgetStatus::Exceeded
                } else if percent >= WARNING_THRESHOLD {
                    BudgetStatus::Warning
                } else {
                    BudgetStatus::Ok
                };
                CategoryUtilization {
                    category: l.category.clone(),
                    limit: l.limit,
                    spent,
                    remaining: l.limit - spent,
                    percent,
                    status,
                }
            })
            .collect()
    }

    /// User-facing messages for categories in warning or exceeded state.
    pub fn alerts(&self, ledger: &ExpenseLedger, year: i32, month: u32) -> Vec<String> {
        self.utilization(ledger, year, month)
            .into_iter()
            .filter_map(|u| match u.status {
                BudgetStatus::Exceeded => Some(format!(
                    "{} budget exceeded by ₹{:.0}",
                    u.category,
                    u.spent - u.limit
                )),
                BudgetStatus::Warning => Some(format!(
                    "{} budget {:.0}% used",
                    u.category, u.percent
                )),
                BudgetStatus::Ok => None,
            })
            .collect()
    }
}

impl Persisted for BudgetPlan {
    const STORAGE_KEY: &'static str = keys::BUDGET_PLAN;

    fn seed() -> Self {
        let mut plan = BudgetPlan::new(45000.0);
        for (category, limit) in [
            ("Rent", 15000.0),
            ("Groceries", 7000.0),
            ("Utilities", 2500.0),
            ("Transport", 3000.0),
            ("Education", 4000.0),
            ("Entertainment", 1500.0),
        ] {
            plan.category_limits.push(CategoryLimit {
                category: category.to_string(),
                limit,
            });
        }
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::expenses::tests::{date, expense, sample_ledger};

    #[test]
    fn test_allocation_follows_rule() {
        let plan = BudgetPlan::new(45000.0);
        let split = plan.allocation();
        assert_eq!(split.needs, 22500.0);
        assert_eq!(split.wants, 13500.0);
        assert_eq!(split.savings, 9000.0);
    }

    #[test]
    fn test_set_rule_rejects_bad_percentages() {
        let mut plan = BudgetPlan::new(45000.0);
        let bad = BudgetRule { needs: 50.0, wants: 50.0, savings: 50.0 };
        assert!(plan.set_rule(bad).is_err());
        assert_eq!(plan.rule, BudgetRule::default());
    }

    #[test]
    fn test_set_limit_replaces_case_insensitively() {
        let mut plan = BudgetPlan::new(45000.0);
        plan.set_limit("Groceries", 6000.0).unwrap();
        plan.set_limit("groceries", 7000.0).unwrap();
        assert_eq!(plan.category_limits.len(), 1);
        assert_eq!(plan.category_limits[0].limit, 7000.0);
        assert_eq!(plan.unallocated(), 38000.0);

        assert!(plan.set_limit("Rent", -1.0).is_err());
        assert!(plan.remove_limit("Rent").is_err());
        assert!(plan.remove_limit("GROCERIES").is_ok());
    }

    #[test]
    fn test_utilization_statuses() {
        let mut ledger = sample_ledger();
        ledger.add(expense("Concert", 300.0, "Entertainment", date(2025, 1, 25))).unwrap();

        let mut plan = BudgetPlan::new(45000.0);
        plan.set_limit("Rent", 15000.0).unwrap();
        plan.set_limit("Groceries", 4000.0).unwrap();
        plan.set_limit("Entertainment", 1500.0).unwrap();
        plan.set_limit("Transport", 3000.0).unwrap();

        let usage = plan.utilization(&ledger, 2025, 1);
        let status = |c: &str| usage.iter().find(|u| u.category == c).unwrap().status;

        assert_eq!(status("Rent"), BudgetStatus::Warning); // exactly 100%
        assert_eq!(status("Groceries"), BudgetStatus::Exceeded);
        assert_eq!(status("Entertainment"), BudgetStatus::Warning); // 1300 / 1500
        assert_eq!(status("Transport"), BudgetStatus::Ok);

        let alerts = plan.alerts(&ledger, 2025, 1);
        assert_eq!(alerts.len(), 3);
        assert!(alerts.contains(&"Groceries budget exceeded by ₹1000".to_string()));
    }
}
