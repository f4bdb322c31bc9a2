// 🧮 Finance Arithmetic
// EMI, budget-rule splits, progress ratios and projections used across pages

use crate::error::Result;
use crate::validation::Validator;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// LOANS
// ============================================================================

/// Equated Monthly Installment.
///
/// `emi = P·r·(1+r)^n / ((1+r)^n − 1)` with `r` the monthly rate.
/// A zero rate spreads the principal evenly; zero tenure or a non-positive
/// principal yields 0.
pub fn emi(principal: f64, annual_rate_percent: f64, tenure_months: u32) -> f64 {
    if tenure_months == 0 || principal <= 0.0 {
        return 0.0;
    }

    let n = tenure_months as f64;
    let r = annual_rate_percent / 12.0 / 100.0;

    if r <= 0.0 {
        return principal / n;
    }

    let growth = (1.0 + r).powf(n);
    principal * r * growth / (growth - 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanQuote {
    pub principal: f64,
    pub annual_rate: f64,
    pub tenure_months: u32,
    pub emi: f64,
    pub total_payment: f64,
    pub total_interest: f64,
}

pub fn loan_quote(principal: f64, annual_rate_percent: f64, tenure_months: u32) -> LoanQuote {
    let monthly = emi(principal, annual_rate_percent, tenure_months);
    let total_payment = monthly * tenure_months as f64;

    LoanQuote {
        principal,
        annual_rate: annual_rate_percent,
        tenure_months,
        emi: monthly,
        total_payment,
        total_interest: (total_payment - principal).max(0.0),
    }
}

// ============================================================================
// BUDGET RULES
// ============================================================================

/// Percentage split of income into needs, wants and savings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetRule {
    pub needs: f64,
    pub wants: f64,
    pub savings: f64,
}

pub const FIFTY_THIRTY_TWENTY: BudgetRule = BudgetRule {
    needs: 50.0,
    wants: 30.0,
    savings: 20.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetSplit {
    pub needs: f64,
    pub wants: f64,
    pub savings: f64,
}

impl BudgetRule {
    pub fn new(needs: f64, wants: f64, savings: f64) -> Result<Self> {
        let rule = BudgetRule {
            needs,
            wants,
            savings,
        };
        rule.validate()?;
        Ok(rule)
    }

    pub fn validate(&self) -> Result<()> {
        Validator::new("BudgetRule")
            .require_percentage("needs", self.needs, "Needs share")
            .require_percentage("wants", self.wants, "Wants share")
            .require_percentage("savings", self.savings, "Savings share")
            .check(
                ((self.needs + self.wants + self.savings) - 100.0).abs() < 1e-6,
                "rule",
                "Needs, wants and savings must add up to 100%",
            )
            .finish()
    }

    pub fn split(&self, income: f64) -> BudgetSplit {
        let income = income.max(0.0);
        BudgetSplit {
            needs: income * self.needs / 100.0,
            wants: income * self.wants / 100.0,
            savings: income * self.savings / 100.0,
        }
    }
}

impl Default for BudgetRule {
    fn default() -> Self {
        FIFTY_THIRTY_TWENTY
    }
}

// ============================================================================
// RATIOS & DATES
// ============================================================================

/// `current / target × 100`, clamped to `[0, 100]` for display.
pub fn progress_percent(current: f64, target: f64) -> f64 {
    if target <= 0.0 || !target.is_finite() {
        return 0.0;
    }
    (current / target * 100.0).clamp(0.0, 100.0)
}

/// Share of `whole` taken by `part`, unclamped (over-budget shows > 100).
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

/// Signed day count; negative once the deadline has passed.
pub fn days_until(deadline: NaiveDate, today: NaiveDate) -> i64 {
    (deadline - today).num_days()
}

// ============================================================================
// PROJECTIONS
// ============================================================================

/// Future value of a monthly SIP paid at the start of each month.
///
/// `FV = P × ((1+r)^n − 1) / r × (1+r)`
pub fn sip_future_value(monthly: f64, annual_return_percent: f64, months: u32) -> f64 {
    let n = months as f64;
    let r = annual_return_percent / 12.0 / 100.0;
    if r <= 0.0 {
        return monthly * n;
    }
    monthly * ((1.0 + r).powf(n) - 1.0) / r * (1.0 + r)
}

/// Compound growth of a one-off amount, compounded monthly.
pub fn lump_sum_future_value(amount: f64, annual_return_percent: f64, months: u32) -> f64 {
    let r = annual_return_percent / 12.0 / 100.0;
    amount * (1.0 + r).powf(months as f64)
}

/// Spare change when rounding `amount` up to the next multiple of `base`.
pub fn round_up(amount: f64, base: f64) -> f64 {
    if base <= 0.0 || amount <= 0.0 {
        return 0.0;
    }
    let rounded = (amount / base).ceil() * base;
    let spare = rounded - amount;
    // Float noise on exact multiples
    if spare < 1e-9 {
        0.0
    } else {
        spare
    }
}

// ============================================================================
// FORMATTING
// ============================================================================

/// Rupee amount with Indian digit grouping, rounded to whole rupees.
///
/// `format_inr(123456.0)` → `₹1,23,456`
pub fn format_inr(amount: f64) -> String {
    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{}", rounded.abs() as u64);

    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, last3) = digits.split_at(digits.len() - 3);
        let mut parts: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 2 {
            parts.push(&head[end - 2..end]);
            end -= 2;
        }
        parts.push(&head[..end]);
        parts.reverse();
        format!("{},{}", parts.join(","), last3)
    };

    if negative {
        format!("-₹{}", grouped)
    } else {
        format!("₹{}", grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_emi_home_loan() {
        let monthly = emi(500000.0, 8.5, 20 * 12);
        assert!((monthly - 4339.0).abs() < 1.0, "got {}", monthly);
    }

    #[test]
    fn test_emi_edge_cases() {
        assert_eq!(emi(120000.0, 0.0, 12), 10000.0);
        assert_eq!(emi(120000.0, 10.0, 0), 0.0);
        assert_eq!(emi(0.0, 10.0, 12), 0.0);
    }

    #[test]
    fn test_loan_quote_totals() {
        let quote = loan_quote(500000.0, 8.5, 240);
        assert!((quote.total_payment - quote.emi * 240.0).abs() < 1e-6);
        assert!((quote.total_interest - (quote.total_payment - 500000.0)).abs() < 1e-6);
    }

    #[test]
    fn test_fifty_thirty_twenty_split() {
        let split = FIFTY_THIRTY_TWENTY.split(45000.0);
        assert_eq!(split.needs, 22500.0);
        assert_eq!(split.wants, 13500.0);
        assert_eq!(split.savings, 9000.0);
    }

    #[test]
    fn test_budget_rule_must_sum_to_hundred() {
        assert!(BudgetRule::new(60.0, 30.0, 20.0).is_err());
        assert!(BudgetRule::new(70.0, 20.0, 10.0).is_ok());
    }

    #[test]
    fn test_progress_percent_clamped() {
        assert_eq!(progress_percent(50.0, 200.0), 25.0);
        assert_eq!(progress_percent(500.0, 200.0), 100.0);
        assert_eq!(progress_percent(-5.0, 200.0), 0.0);
        assert_eq!(progress_percent(10.0, 0.0), 0.0);
    }

    #[test]
    fn test_days_until() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let deadline = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        assert_eq!(days_until(deadline, today), 30);
        assert_eq!(days_until(today, deadline), -30);
    }

    #[test]
    fn test_sip_future_value() {
        // ₹1,000/month at 12% for 12 months
        let fv = sip_future_value(1000.0, 12.0, 12);
        assert!((fv - 12809.33).abs() < 0.5, "got {}", fv);
        assert_eq!(sip_future_value(1000.0, 0.0, 12), 12000.0);
    }

    #[test]
    fn test_round_up() {
        assert_eq!(round_up(87.0, 10.0), 3.0);
        assert_eq!(round_up(90.0, 10.0), 0.0);
        assert_eq!(round_up(1.0, 0.0), 0.0);
    }

    #[test]
    fn test_format_inr() {
        assert_eq!(format_inr(0.0), "₹0");
        assert_eq!(format_inr(999.0), "₹999");
        assert_eq!(format_inr(4339.2), "₹4,339");
        assert_eq!(format_inr(123456.0), "₹1,23,456");
        assert_eq!(format_inr(12345678.0), "₹1,23,45,678");
        assert_eq!(format_inr(-22500.0), "-₹22,500");
    }

    proptest! {
        #[test]
        fn prop_progress_stays_in_range(current in -1.0e7f64..1.0e7, target in -1.0e7f64..1.0e7) {
            let p = progress_percent(current, target);
            prop_assert!((0.0..=100.0).contains(&p));
        }

        #[test]
        fn prop_split_preserves_income(income in 0.0f64..1.0e8) {
            let split = FIFTY_THIRTY_TWENTY.split(income);
            prop_assert!((split.needs + split.wants + split.savings - income).abs() < 1e-4);
        }
    }
}
