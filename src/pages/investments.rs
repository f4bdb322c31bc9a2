// 📈 Micro Investment - small monthly instruments, chit funds, round-ups

use crate::error::{BudgetError, Result};
use crate::finance::{round_up, sip_future_value};
use crate::pages::expenses::ExpenseLedger;
use crate::storage::{keys, Persisted};
use crate::validation::Validator;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvestmentKind {
    #[serde(rename = "SIP")]
    Sip,
    #[serde(rename = "RD")]
    Rd,
    DigitalGold,
    #[serde(rename = "PPF")]
    Ppf,
    ChitFund,
}

impl InvestmentKind {
    pub const ALL: [InvestmentKind; 5] = [
        InvestmentKind::Sip,
        InvestmentKind::Rd,
        InvestmentKind::DigitalGold,
        InvestmentKind::Ppf,
        InvestmentKind::ChitFund,
    ];

    pub fn label(self) -> &'static str {
        match self {
            InvestmentKind::Sip => "Mutual Fund SIP",
            InvestmentKind::Rd => "Recurring Deposit",
            InvestmentKind::DigitalGold => "Digital Gold",
            InvestmentKind::Ppf => "Public Provident Fund",
            InvestmentKind::ChitFund => "Chit Fund",
        }
    }

    /// Indicative annual return used when the form leaves it blank.
    pub fn typical_return(self) -> f64 {
        match self {
            InvestmentKind::Sip => 12.0,
            InvestmentKind::Rd => 6.8,
            InvestmentKind::DigitalGold => 8.0,
            InvestmentKind::Ppf => 7.1,
            InvestmentKind::ChitFund => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub id: String,
    pub kind: InvestmentKind,
    pub name: String,
    pub monthly_amount: f64,
    pub expected_return: f64,
    pub start_date: NaiveDate,
    pub tenure_months: u32,
}

impl Investment {
    /// Months paid in as of `today`, capped at the tenure.
    pub fn months_elapsed(&self, today: NaiveDate) -> u32 {
        if today < self.start_date {
            return 0;
        }
        let months = (today.year() - self.start_date.year()) * 12 + today.month() as i32
            - self.start_date.month() as i32
            + 1;
        (months.max(0) as u32).min(self.tenure_months)
    }

    pub fn invested(&self, today: NaiveDate) -> f64 {
        self.monthly_amount * self.months_elapsed(today) as f64
    }

    pub fn total_commitment(&self) -> f64 {
        self.monthly_amount * self.tenure_months as f64
    }

    /// Maturity value at the end of the tenure.
    pub fn projected_value(&self) -> f64 {
        sip_future_value(self.monthly_amount, self.expected_return, self.tenure_months)
    }

    pub fn projected_gain(&self) -> f64 {
        self.projected_value() - self.total_commitment()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvestment {
    pub kind: InvestmentKind,
    pub name: String,
    #[serde(deserialize_with = "crate::validation::lenient_amount")]
    pub monthly_amount: f64,
    #[serde(default)]
    pub expected_return: Option<f64>,
    pub start_date: NaiveDate,
    pub tenure_months: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KindTotal {
    pub kind: InvestmentKind,
    pub monthly: f64,
    pub invested: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub monthly_outflow: f64,
    pub invested: f64,
    pub projected_value: f64,
    pub projected_gain: f64,
    pub by_kind: Vec<KindTotal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Portfolio {
    investments: Vec<Investment>,
}

impl Portfolio {
    pub fn new() -> Self {
        Portfolio::default()
    }

    pub fn all(&self) -> &[Investment] {
        &self.investments
    }

    pub fn add(&mut self, input: NewInvestment) -> Result<Investment> {
        let expected_return = input.expected_return.unwrap_or(input.kind.typical_return());
        Validator::new("Investment")
            .require_text("name", &input.name, "a name")
            .require_positive("monthlyAmount", input.monthly_amount, "Monthly amount")
            .require_percentage("expectedReturn", expected_return, "Expected return")
            .check(input.tenure_months > 0, "tenureMonths", "Tenure must be at least one month")
            .finish()?;

        let investment = Investment {
            id: uuid::Uuid::new_v4().to_string(),
            kind: input.kind,
            name: input.name.trim().to_string(),
            monthly_amount: input.monthly_amount,
            expected_return,
            start_date: input.start_date,
            tenure_months: input.tenure_months,
        };
        info!(id = %investment.id, kind = ?investment.kind, monthly = investment.monthly_amount, "investment added");
        self.investments.push(investment.clone());
        Ok(investment)
    }

    pub fn remove(&mut self, id: &str) -> Result<Investment> {
        let pos = self
            .investments
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| BudgetError::not_found("investment", id))?;
        Ok(self.investments.remove(pos))
    }

    pub fn portfolio_summary(&self, today: NaiveDate) -> PortfolioSummary {
        let by_kind = InvestmentKind::ALL
            .iter()
            .filter_map(|kind| {
                let of_kind: Vec<&Investment> = self.investments.iter().filter(|i| i.kind == *kind).collect();
                if of_kind.is_empty() {
                    return None;
                }
                Some(KindTotal {
                    kind: *kind,
                    monthly: of_kind.iter().map(|i| i.monthly_amount).sum(),
                    invested: of_kind.iter().map(|i| i.invested(today)).sum(),
                })
            })
            .collect();

        let projected_value: f64 = self.investments.iter().map(Investment::projected_value).sum();
        let commitment: f64 = self.investments.iter().map(Investment::total_commitment).sum();
        PortfolioSummary {
            monthly_outflow: self.investments.iter().map(|i| i.monthly_amount).sum(),
            invested: self.investments.iter().map(|i| i.invested(today)).sum(),
            projected_value,
            projected_gain: projected_value - commitment,
            by_kind,
        }
    }
}

impl Persisted for Portfolio {
    const STORAGE_KEY: &'static str = keys::INVESTMENTS;

    fn seed() -> Self {
        let today = chrono::Local::now().date_naive();
        let start = today.with_day(1).unwrap_or(today);
        let mut portfolio = Portfolio::new();
        for (kind, name, monthly, months) in [
            (InvestmentKind::Sip, "Nifty 50 Index Fund", 2000.0, 60),
            (InvestmentKind::Rd, "Post Office RD", 1000.0, 60),
            (InvestmentKind::DigitalGold, "Gold savings", 500.0, 24),
        ] {
            let _ = portfolio.add(NewInvestment {
                kind,
                name: name.to_string(),
                monthly_amount: monthly,
                expected_return: None,
                start_date: start,
                tenure_months: months,
            });
        }
        portfolio
    }
}

// ============================================================================
// CHIT FUND
// ============================================================================

/// Rotating savings group: every member pays in each month and one member
/// takes the pot, less the foreman's commission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChitFund {
    pub members: u32,
    pub monthly_contribution: f64,
    #[serde(default = "default_foreman_commission")]
    pub foreman_commission: f64,
}

fn default_foreman_commission() -> f64 {
    5.0
}

impl ChitFund {
    pub fn new(members: u32, monthly_contribution: f64) -> Result<Self> {
        Validator::new("ChitFund")
            .check(members >= 2, "members", "A chit needs at least two members")
            .require_positive("monthlyContribution", monthly_contribution, "Monthly contribution")
            .finish()?;
        Ok(ChitFund {
            members,
            monthly_contribution,
            foreman_commission: default_foreman_commission(),
        })
    }

    pub fn pot_size(&self) -> f64 {
        self.monthly_contribution * self.members as f64
    }

    /// Runs for one month per member.
    pub fn duration_months(&self) -> u32 {
        self.members
    }

    pub fn total_contribution(&self) -> f64 {
        self.monthly_contribution * self.duration_months() as f64
    }

    /// What the month's winner takes home after commission.
    pub fn payout(&self) -> f64 {
        self.pot_size() * (1.0 - self.foreman_commission / 100.0)
    }
}

// ============================================================================
// ROUND-UP SAVINGS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundUpSummary {
    pub base: f64,
    pub transactions: usize,
    pub total: f64,
}

/// Spare change if every expense were rounded up to `base`.
pub fn round_up_savings(ledger: &ExpenseLedger, base: f64) -> RoundUpSummary {
    let spare: Vec<f64> = ledger
        .all()
        .iter()
        .map(|e| round_up(e.amount, base))
        .filter(|s| *s > 0.0)
        .collect();
    RoundUpSummary {
        base,
        transactions: spare.len(),
        total: spare.iter().sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::expenses::tests::{date, expense};

    fn sip(monthly: f64, rate: Option<f64>, start: NaiveDate, months: u32) -> NewInvestment {
        NewInvestment {
            kind: InvestmentKind::Sip,
            name: "Index fund".to_string(),
            monthly_amount: monthly,
            expected_return: rate,
            start_date: start,
            tenure_months: months,
        }
    }

    #[test]
    fn test_invested_counts_months_paid() {
        let mut portfolio = Portfolio::new();
        let inv = portfolio.add(sip(1000.0, Some(12.0), date(2025, 1, 15), 12)).unwrap();

        assert_eq!(inv.invested(date(2024, 12, 31)), 0.0);
        assert_eq!(inv.invested(date(2025, 1, 20)), 1000.0);
        assert_eq!(inv.invested(date(2025, 6, 1)), 6000.0);
        assert_eq!(inv.invested(date(2027, 1, 1)), 12000.0);
    }

    #[test]
    fn test_projection_beats_principal() {
        let mut portfolio = Portfolio::new();
        let inv = portfolio.add(sip(1000.0, None, date(2025, 1, 1), 12)).unwrap();
        assert_eq!(inv.expected_return, 12.0);
        assert!(inv.projected_value() > 12000.0);
        assert!(inv.projected_gain() > 0.0);

        let flat = portfolio.add(sip(1000.0, Some(0.0), date(2025, 1, 1), 12)).unwrap();
        assert_eq!(flat.projected_value(), 12000.0);
    }

    #[test]
    fn test_portfolio_summary_groups_by_kind() {
        let mut portfolio = Portfolio::new();
        portfolio.add(sip(1000.0, Some(0.0), date(2025, 1, 1), 12)).unwrap();
        portfolio.add(sip(500.0, Some(0.0), date(2025, 1, 1), 12)).unwrap();
        let mut rd = sip(2000.0, Some(0.0), date(2025, 1, 1), 6);
        rd.kind = InvestmentKind::Rd;
        portfolio.add(rd).unwrap();

        let summary = portfolio.portfolio_summary(date(2025, 3, 10));
        assert_eq!(summary.monthly_outflow, 3500.0);
        assert_eq!(summary.invested, 10500.0);
        assert_eq!(summary.projected_gain, 0.0);
        assert_eq!(summary.by_kind.len(), 2);
        assert_eq!(summary.by_kind[0].kind, InvestmentKind::Sip);
        assert_eq!(summary.by_kind[0].monthly, 1500.0);
    }

    #[test]
    fn test_add_validates() {
        let mut portfolio = Portfolio::new();
        assert!(portfolio.add(sip(0.0, Some(150.0), date(2025, 1, 1), 0)).is_err());
        assert!(portfolio.all().is_empty());
    }

    #[test]
    fn test_chit_fund_pot() {
        let chit = ChitFund::new(20, 5000.0).unwrap();
        assert_eq!(chit.pot_size(), 100000.0);
        assert_eq!(chit.duration_months(), 20);
        assert_eq!(chit.payout(), 95000.0);
        assert!(ChitFund::new(1, 5000.0).is_err());
    }

    #[test]
    fn test_round_up_savings() {
        let mut ledger = ExpenseLedger::new();
        ledger.add(expense("Tea", 18.0, "Dining", date(2025, 1, 1))).unwrap();
        ledger.add(expense("Auto", 73.0, "Transport", date(2025, 1, 1))).unwrap();
        ledger.add(expense("Exact", 100.0, "Other", date(2025, 1, 1))).unwrap();

        let summary = round_up_savings(&ledger, 10.0);
        assert_eq!(summary.transactions, 2);
        assert!((summary.total - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_kind_serialises_short_codes() {
        assert_eq!(serde_json::to_string(&InvestmentKind::Sip).unwrap(), "\"SIP\"");
        assert_eq!(serde_json::to_string(&InvestmentKind::DigitalGold).unwrap(), "\"DigitalGold\"");
    }
}
