// 🏦 Online Banking - simulated account, beneficiaries and loan desk
//
// Balance = opening balance + credits - debits. Each transaction records the
// running balance after it was applied.

use crate::error::{BudgetError, Result};
use crate::finance::{loan_quote, percent_of, LoanQuote};
use crate::storage::{keys, LocalStore};
use crate::validation::Validator;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const OPENING_BALANCE: f64 = 125000.0;

/// Loans are approved while the EMI stays within this share of income.
pub const MAX_EMI_TO_INCOME: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Credit,
    Debit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankTransaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: f64,
    pub date: NaiveDate,
    pub balance: f64,
    pub category: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beneficiary {
    pub id: String,
    pub name: String,
    pub account_number: String,
    pub ifsc: String,
    pub bank_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBeneficiary {
    pub name: String,
    pub account_number: String,
    pub ifsc: String,
    pub bank_name: String,
}

// ============================================================================
// LOANS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanType {
    Home,
    Car,
    Personal,
    Education,
    Gold,
}

impl LoanType {
    /// Indicative annual rate (%).
    pub fn annual_rate(self) -> f64 {
        match self {
            LoanType::Home => 8.5,
            LoanType::Car => 9.2,
            LoanType::Personal => 11.5,
            LoanType::Education => 9.8,
            LoanType::Gold => 9.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
    pub loan_type: LoanType,
    pub amount: f64,
    pub tenure_months: u32,
    pub monthly_income: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanDecision {
    pub quote: LoanQuote,
    pub emi_to_income: f64,
    pub approved: bool,
    pub message: String,
}

/// Deterministic stand-in for the bank's loan desk.
pub fn assess_loan(app: &LoanApplication) -> Result<LoanDecision> {
    Validator::new("LoanApplication")
        .require_positive("amount", app.amount, "Loan amount")
        .require_positive("monthlyIncome", app.monthly_income, "Monthly income")
        .check(app.tenure_months > 0, "tenureMonths", "Tenure must be at least one month")
        .finish()?;

    let quote = loan_quote(app.amount, app.loan_type.annual_rate(), app.tenure_months);
    let ratio = percent_of(quote.emi, app.monthly_income);
    let approved = ratio <= MAX_EMI_TO_INCOME;

    let message = if approved {
        format!(
            "Pre-approved: EMI ₹{:.0} is {:.1}% of your monthly income",
            quote.emi, ratio
        )
    } else {
        format!(
            "Not approved: EMI ₹{:.0} would be {:.1}% of your income (limit {:.0}%)",
            quote.emi, ratio, MAX_EMI_TO_INCOME
        )
    };

    Ok(LoanDecision {
        quote,
        emi_to_income: ratio,
        approved,
        message,
    })
}

// ============================================================================
// ACCOUNT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineBanking {
    pub opening_balance: f64,
    pub transactions: Vec<BankTransaction>,
    pub beneficiaries: Vec<Beneficiary>,
}

impl OnlineBanking {
    pub fn new(opening_balance: f64) -> Self {
        OnlineBanking {
            opening_balance,
            transactions: Vec::new(),
            beneficiaries: Vec::new(),
        }
    }

    /// Transactions and beneficiaries live under separate keys.
    pub fn load(store: &LocalStore) -> Result<Self> {
        let mut banking = OnlineBanking::new(OPENING_BALANCE);
        match store.get_json::<Vec<BankTransaction>>(keys::BANK_TRANSACTIONS)? {
            Some(txs) => banking.transactions = txs,
            None => banking.seed_transactions(),
        }
        banking.beneficiaries = store
            .get_json(keys::BENEFICIARIES)?
            .unwrap_or_else(seed_beneficiaries);
        Ok(banking)
    }

    pub fn save(&self, store: &LocalStore) -> Result<()> {
        store.set_json(keys::BANK_TRANSACTIONS, &self.transactions)?;
        store.set_json(keys::BENEFICIARIES, &self.beneficiaries)?;
        Ok(())
    }

    pub fn balance(&self) -> f64 {
        self.transactions
            .last()
            .map(|t| t.balance)
            .unwrap_or(self.opening_balance)
    }

    pub fn deposit(&mut self, amount: f64, category: &str, description: &str, date: NaiveDate) -> Result<BankTransaction> {
        Validator::new("Deposit")
            .require_positive("amount", amount, "Amount")
            .finish()?;
        Ok(self.post(TransactionType::Credit, amount, category, description, date))
    }

    pub fn withdraw(&mut self, amount: f64, category: &str, description: &str, date: NaiveDate) -> Result<BankTransaction> {
        Validator::new("Withdrawal")
            .require_positive("amount", amount, "Amount")
            .finish()?;

        let balance = self.balance();
        if amount > balance {
            warn!(balance, requested = amount, "withdrawal refused");
            return Err(BudgetError::InsufficientFunds {
                balance,
                requested: amount,
            });
        }
        Ok(self.post(TransactionType::Debit, amount, category, description, date))
    }

    pub fn transfer(&mut self, beneficiary_id: &str, amount: f64, date: NaiveDate) -> Result<BankTransaction> {
        let name = self
            .beneficiaries
            .iter()
            .find(|b| b.id == beneficiary_id)
            .map(|b| b.name.clone())
            .ok_or_else(|| BudgetError::not_found("beneficiary", beneficiary_id))?;

        self.withdraw(amount, "Transfer", &format!("Transfer to {}", name), date)
    }

    pub fn add_beneficiary(&mut self, input: NewBeneficiary) -> Result<Beneficiary> {
        let ifsc = input.ifsc.trim().to_ascii_uppercase();
        let account = input.account_number.trim().to_string();

        Validator::new("Beneficiary")
            .require_text("name", &input.name, "the beneficiary name")
            .require_text("bankName", &input.bank_name, "the bank name")
            .check(is_valid_ifsc(&ifsc), "ifsc", "IFSC must look like SBIN0001234")
            .check(
                is_valid_account_number(&account),
                "accountNumber",
                "Account number must be 9 to 18 digits",
            )
            .finish()?;

        if self.beneficiaries.iter().any(|b| b.account_number == account) {
            return Err(BudgetError::Duplicate {
                entity: "beneficiary",
                key: account,
            });
        }

        let beneficiary = Beneficiary {
            id: uuid::Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            account_number: account,
            ifsc,
            bank_name: input.bank_name.trim().to_string(),
        };
        info!(id = %beneficiary.id, name = %beneficiary.name, "beneficiary added");
        self.beneficiaries.push(beneficiary.clone());
        Ok(beneficiary)
    }

    pub fn remove_beneficiary(&mut self, id: &str) -> Result<Beneficiary> {
        let pos = self
            .beneficiaries
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| BudgetError::not_found("beneficiary", id))?;
        Ok(self.beneficiaries.remove(pos))
    }

    /// Last `n` transactions, newest first.
    pub fn mini_statement(&self, n: usize) -> Vec<&BankTransaction> {
        self.transactions.iter().rev().take(n).collect()
    }

    pub fn totals(&self) -> (f64, f64) {
        self.transactions.iter().fold((0.0, 0.0), |(cr, dr), t| match t.kind {
            TransactionType::Credit => (cr + t.amount, dr),
            TransactionType::Debit => (cr, dr + t.amount),
        })
    }

    fn post(&mut self, kind: TransactionType, amount: f64, category: &str, description: &str, date: NaiveDate) -> BankTransaction {
        let balance = match kind {
            TransactionType::Credit => self.balance() + amount,
            TransactionType::Debit => self.balance() - amount,
        };
        let category = if category.trim().is_empty() {
            "General".to_string()
        } else {
            category.trim().to_string()
        };

        let tx = BankTransaction {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            amount,
            date,
            balance,
            category,
            description: description.trim().to_string(),
        };
        info!(id = %tx.id, kind = ?tx.kind, amount, balance, "bank transaction posted");
        self.transactions.push(tx.clone());
        tx
    }

    fn seed_transactions(&mut self) {
        let today = chrono::Local::now().date_naive();
        let ago = |d: u64| today.checked_sub_days(chrono::Days::new(d)).unwrap_or(today);

        self.post(TransactionType::Credit, 65000.0, "Salary", "Monthly salary", ago(20));
        self.post(TransactionType::Debit, 15000.0, "Rent", "House rent", ago(18));
        self.post(TransactionType::Debit, 1850.0, "Utilities", "TANGEDCO bill", ago(12));
        self.post(TransactionType::Debit, 3200.0, "Shopping", "Amazon order", ago(6));
        self.post(TransactionType::Credit, 1200.0, "Refund", "Cashback", ago(2));
    }
}

fn seed_beneficiaries() -> Vec<Beneficiary> {
    vec![
        Beneficiary {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Lakshmi Narayanan".to_string(),
            account_number: "30012345678".to_string(),
            ifsc: "SBIN0001234".to_string(),
            bank_name: "State Bank of India".to_string(),
        },
        Beneficiary {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Ravi Shankar".to_string(),
            account_number: "50100234567890".to_string(),
            ifsc: "HDFC0000123".to_string(),
            bank_name: "HDFC Bank".to_string(),
        },
    ]
}

/// Four letters, a zero, then six letters or digits.
pub fn is_valid_ifsc(ifsc: &str) -> bool {
    let bytes = ifsc.as_bytes();
    bytes.len() == 11
        && bytes[..4].iter().all(|b| b.is_ascii_uppercase())
        && bytes[4] == b'0'
        && bytes[5..].iter().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

pub fn is_valid_account_number(number: &str) -> bool {
    (9..=18).contains(&number.len()) && number.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn beneficiary(account: &str) -> NewBeneficiary {
        NewBeneficiary {
            name: "Kavya".to_string(),
            account_number: account.to_string(),
            ifsc: "icic0001234".to_string(),
            bank_name: "ICICI Bank".to_string(),
        }
    }

    #[test]
    fn test_running_balance() {
        let mut bank = OnlineBanking::new(10000.0);
        bank.deposit(5000.0, "Salary", "", today()).unwrap();
        let tx = bank.withdraw(2500.0, "", "ATM", today()).unwrap();

        assert_eq!(tx.balance, 12500.0);
        assert_eq!(tx.category, "General");
        assert_eq!(bank.balance(), 12500.0);
        assert_eq!(bank.totals(), (5000.0, 2500.0));
    }

    #[test]
    fn test_withdraw_never_overdraws() {
        let mut bank = OnlineBanking::new(1000.0);
        let err = bank.withdraw(1000.01, "Shopping", "", today()).unwrap_err();
        assert!(matches!(err, BudgetError::InsufficientFunds { .. }));
        assert_eq!(bank.balance(), 1000.0);
        assert!(bank.transactions.is_empty());

        assert!(bank.withdraw(-5.0, "Shopping", "", today()).is_err());
        assert_eq!(bank.withdraw(1000.0, "Shopping", "", today()).unwrap().balance, 0.0);
    }

    #[test]
    fn test_beneficiary_validation_and_duplicates() {
        let mut bank = OnlineBanking::new(0.0);
        let added = bank.add_beneficiary(beneficiary("123456789012")).unwrap();
        assert_eq!(added.ifsc, "ICIC0001234");

        assert!(matches!(
            bank.add_beneficiary(beneficiary("123456789012")),
            Err(BudgetError::Duplicate { .. })
        ));
        assert!(bank.add_beneficiary(beneficiary("12345")).is_err());

        let mut bad_ifsc = beneficiary("987654321");
        bad_ifsc.ifsc = "ICIC1001234".to_string();
        assert!(bank.add_beneficiary(bad_ifsc).is_err());

        bank.remove_beneficiary(&added.id).unwrap();
        assert!(bank.beneficiaries.is_empty());
    }

    #[test]
    fn test_transfer_to_beneficiary() {
        let mut bank = OnlineBanking::new(20000.0);
        let b = bank.add_beneficiary(beneficiary("123456789012")).unwrap();

        let tx = bank.transfer(&b.id, 7500.0, today()).unwrap();
        assert_eq!(tx.kind, TransactionType::Debit);
        assert_eq!(tx.description, "Transfer to Kavya");
        assert_eq!(bank.balance(), 12500.0);

        assert!(bank.transfer("nobody", 10.0, today()).is_err());
        assert!(bank.transfer(&b.id, 50000.0, today()).is_err());
    }

    #[test]
    fn test_mini_statement_newest_first() {
        let mut bank = OnlineBanking::new(0.0);
        bank.deposit(100.0, "A", "first", today()).unwrap();
        bank.deposit(200.0, "B", "second", today()).unwrap();
        bank.deposit(300.0, "C", "third", today()).unwrap();

        let stmt = bank.mini_statement(2);
        assert_eq!(stmt.len(), 2);
        assert_eq!(stmt[0].description, "third");
    }

    #[test]
    fn test_assess_home_loan() {
        let decision = assess_loan(&LoanApplication {
            loan_type: LoanType::Home,
            amount: 500000.0,
            tenure_months: 240,
            monthly_income: 45000.0,
        })
        .unwrap();
        assert!((decision.quote.emi - 4339.0).abs() < 1.0);
        assert!(decision.approved);

        let refused = assess_loan(&LoanApplication {
            loan_type: LoanType::Personal,
            amount: 1000000.0,
            tenure_months: 12,
            monthly_income: 30000.0,
        })
        .unwrap();
        assert!(!refused.approved);
        assert!(refused.message.starts_with("Not approved"));
    }

    #[test]
    fn test_assess_rejects_zero_tenure() {
        let result = assess_loan(&LoanApplication {
            loan_type: LoanType::Car,
            amount: 100000.0,
            tenure_months: 0,
            monthly_income: 30000.0,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_load_save_round_trip_uses_both_keys() {
        let store = LocalStore::open_in_memory().unwrap();
        let mut bank = OnlineBanking::load(&store).unwrap();
        assert_eq!(bank.transactions.len(), 5);
        assert_eq!(bank.balance(), OPENING_BALANCE + 65000.0 + 1200.0 - 15000.0 - 1850.0 - 3200.0);

        bank.deposit(1000.0, "Gift", "", today()).unwrap();
        bank.save(&store).unwrap();

        let reloaded = OnlineBanking::load(&store).unwrap();
        assert_eq!(reloaded.transactions.len(), 6);
        assert_eq!(reloaded.beneficiaries.len(), 2);
        assert!(store.get_raw(keys::BENEFICIARIES).unwrap().is_some());
    }
}
