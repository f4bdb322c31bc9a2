// 💸 Expense Ledger - the records behind Dashboard and Analytics
//
// Expenses are free-form: the category is a tag, not a reference into a
// category table.

use crate::error::{BudgetError, Result};
use crate::finance::percent_of;
use crate::storage::{keys, Persisted};
use crate::validation::Validator;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use tracing::info;

pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Groceries",
    "Rent",
    "Utilities",
    "Transport",
    "Education",
    "Healthcare",
    "Entertainment",
    "Dining",
    "Shopping",
    "Other",
];

// ============================================================================
// EXPENSE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub title: String,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub notes: String,
}

/// Form input for a new expense.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub title: String,
    #[serde(deserialize_with = "crate::validation::lenient_amount")]
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
    pub share: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTotal {
    /// `YYYY-MM`
    pub month: String,
    pub total: f64,
}

/// CSV row layout for import/export.
#[derive(Debug, Serialize, Deserialize)]
struct ExpenseRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Amount")]
    amount: f64,
    #[serde(rename = "Payment_Method", default)]
    payment_method: String,
    #[serde(rename = "Notes", default)]
    notes: String,
}

// ============================================================================
// LEDGER
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseLedger {
    expenses: Vec<Expense>,
}

impl ExpenseLedger {
    pub fn new() -> Self {
        ExpenseLedger::default()
    }

    pub fn all(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    pub fn add(&mut self, input: NewExpense) -> Result<Expense> {
        let expense = build_expense(input)?;
        info!(id = %expense.id, category = %expense.category, amount = expense.amount, "expense added");
        self.expenses.push(expense.clone());
        Ok(expense)
    }

    pub fn remove(&mut self, id: &str) -> Result<Expense> {
        let pos = self
            .expenses
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| BudgetError::not_found("expense", id))?;
        info!(id, "expense removed");
        Ok(self.expenses.remove(pos))
    }

    pub fn by_category(&self, category: &str) -> Vec<&Expense> {
        self.expenses
            .iter()
            .filter(|e| e.category.eq_ignore_ascii_case(category))
            .collect()
    }

    pub fn in_month(&self, year: i32, month: u32) -> Vec<&Expense> {
        self.expenses
            .iter()
            .filter(|e| e.date.year() == year && e.date.month() == month)
            .collect()
    }

    pub fn total(&self) -> f64 {
        self.expenses.iter().map(|e| e.amount).sum()
    }

    pub fn month_total(&self, year: i32, month: u32) -> f64 {
        self.in_month(year, month).iter().map(|e| e.amount).sum()
    }

    /// Newest first.
    pub fn recent(&self, n: usize) -> Vec<&Expense> {
        let mut sorted: Vec<&Expense> = self.expenses.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        sorted.truncate(n);
        sorted
    }

    // ------------------------------------------------------------------------
    // Analytics
    // ------------------------------------------------------------------------

    /// Totals per category, largest first.
    pub fn category_breakdown(&self) -> Vec<CategoryTotal> {
        breakdown(self.expenses.iter())
    }

    pub fn category_breakdown_for_month(&self, year: i32, month: u32) -> Vec<CategoryTotal> {
        breakdown(self.in_month(year, month).into_iter())
    }

    pub fn top_categories(&self, n: usize) -> Vec<CategoryTotal> {
        let mut totals = self.category_breakdown();
        totals.truncate(n);
        totals
    }

    /// Chronological month totals.
    pub fn monthly_trend(&self) -> Vec<MonthTotal> {
        let mut months: BTreeMap<(i32, u32), f64> = BTreeMap::new();
        for e in &self.expenses {
            *months.entry((e.date.year(), e.date.month())).or_insert(0.0) += e.amount;
        }
        months
            .into_iter()
            .map(|((y, m), total)| MonthTotal {
                month: format!("{:04}-{:02}", y, m),
                total,
            })
            .collect()
    }

    /// Month spend divided by the days in that month.
    pub fn daily_average(&self, year: i32, month: u32) -> f64 {
        match days_in_month(year, month) {
            Some(days) => self.month_total(year, month) / days as f64,
            None => 0.0,
        }
    }

    // ------------------------------------------------------------------------
    // CSV
    // ------------------------------------------------------------------------

    /// Import rows; every row is validated like a form submit. Rows are
    /// staged first, so one bad row leaves the ledger untouched. Returns how
    /// many were added.
    pub fn import_csv<R: Read>(&mut self, reader: R) -> Result<usize> {
        let mut rdr = csv::Reader::from_reader(reader);
        let mut staged = Vec::new();
        for row in rdr.deserialize() {
            let row: ExpenseRow = row?;
            staged.push(build_expense(NewExpense {
                title: row.title,
                amount: row.amount,
                category: row.category,
                date: row.date,
                payment_method: row.payment_method,
                notes: row.notes,
            })?);
        }

        let added = staged.len();
        self.expenses.extend(staged);
        info!(added, "expenses imported from CSV");
        Ok(added)
    }

    pub fn export_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        let mut sorted: Vec<&Expense> = self.expenses.iter().collect();
        sorted.sort_by(|a, b| a.date.cmp(&b.date));
        for e in sorted {
            wtr.serialize(ExpenseRow {
                date: e.date,
                title: e.title.clone(),
                category: e.category.clone(),
                amount: e.amount,
                payment_method: e.payment_method.clone(),
                notes: e.notes.clone(),
            })?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn build_expense(input: NewExpense) -> Result<Expense> {
    Validator::new("Expense")
        .require_text("title", &input.title, "a description")
        .require_text("category", &input.category, "a category")
        .require_positive("amount", input.amount, "Amount")
        .finish()?;

    Ok(Expense {
        id: uuid::Uuid::new_v4().to_string(),
        title: input.title.trim().to_string(),
        amount: input.amount,
        category: input.category.trim().to_string(),
        date: input.date,
        payment_method: input.payment_method,
        notes: input.notes,
    })
}

fn breakdown<'a>(expenses: impl Iterator<Item = &'a Expense>) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for e in expenses {
        let entry = totals.entry(e.category.clone()).or_insert((0.0, 0));
        entry.0 += e.amount;
        entry.1 += 1;
    }

    let grand_total: f64 = totals.values().map(|(t, _)| t).sum();
    let mut result: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, (total, count))| CategoryTotal {
            category,
            total,
            share: percent_of(total, grand_total),
            count,
        })
        .collect();

    result.sort_by(|a, b| b.total.total_cmp(&a.total));
    result
}

pub(crate) fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}

impl Persisted for ExpenseLedger {
    const STORAGE_KEY: &'static str = keys::EXPENSES;

    fn seed() -> Self {
        let today = chrono::Local::now().date_naive();
        let day = |d: u32| today.with_day(d.min(today.day())).unwrap_or(today);

        let samples: [(&str, f64, &str, u32, &str); 6] = [
            ("House rent", 15000.0, "Rent", 1, "Bank Transfer"),
            ("Monthly groceries - Big Bazaar", 6500.0, "Groceries", 3, "UPI"),
            ("TANGEDCO electricity", 1850.0, "Utilities", 5, "UPI"),
            ("School fees", 4000.0, "Education", 7, "Bank Transfer"),
            ("Petrol", 2200.0, "Transport", 9, "Card"),
            ("Family dinner", 1400.0, "Dining", 12, "Card"),
        ];

        let mut ledger = ExpenseLedger::new();
        for (title, amount, category, d, method) in samples {
            ledger.expenses.push(Expense {
                id: uuid::Uuid::new_v4().to_string(),
                title: title.to_string(),
                amount,
                category: category.to_string(),
                date: day(d),
                payment_method: method.to_string(),
                notes: String::new(),
            });
        }
        ledger
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub(crate) fn expense(title: &str, amount: f64, category: &str, on: NaiveDate) -> NewExpense {
        NewExpense {
            title: title.to_string(),
            amount,
            category: category.to_string(),
            date: on,
            payment_method: "UPI".to_string(),
            notes: String::new(),
        }
    }

    pub(crate) fn sample_ledger() -> ExpenseLedger {
        let mut ledger = ExpenseLedger::new();
        ledger.add(expense("Rent", 15000.0, "Rent", date(2025, 1, 1))).unwrap();
        ledger.add(expense("Vegetables", 2000.0, "Groceries", date(2025, 1, 4))).unwrap();
        ledger.add(expense("Rice and dal", 3000.0, "Groceries", date(2025, 1, 10))).unwrap();
        ledger.add(expense("Movie", 1000.0, "Entertainment", date(2025, 1, 20))).unwrap();
        ledger.add(expense("Rent", 15000.0, "Rent", date(2025, 2, 1))).unwrap();
        ledger
    }

    #[test]
    fn test_add_validates_before_mutating() {
        let mut ledger = ExpenseLedger::new();
        let err = ledger
            .add(expense("", 0.0, "Groceries", date(2025, 1, 1)))
            .unwrap_err();
        assert!(matches!(err, BudgetError::Validation(ref e) if e.len() == 2));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_remove_unknown_id() {
        let mut ledger = sample_ledger();
        assert!(ledger.remove("missing").is_err());
        assert_eq!(ledger.len(), 5);
    }

    #[test]
    fn test_month_filters_and_totals() {
        let ledger = sample_ledger();
        assert_eq!(ledger.in_month(2025, 1).len(), 4);
        assert_eq!(ledger.month_total(2025, 1), 21000.0);
        assert_eq!(ledger.total(), 36000.0);
        assert_eq!(ledger.by_category("groceries").len(), 2);
    }

    #[test]
    fn test_category_breakdown_sorted_with_shares() {
        let ledger = sample_ledger();
        let breakdown = ledger.category_breakdown();

        assert_eq!(breakdown[0].category, "Rent");
        assert_eq!(breakdown[0].total, 30000.0);
        assert_eq!(breakdown[0].count, 2);
        let share_sum: f64 = breakdown.iter().map(|c| c.share).sum();
        assert!((share_sum - 100.0).abs() < 1e-9);

        let january = ledger.category_breakdown_for_month(2025, 1);
        assert_eq!(january[1].category, "Groceries");
        assert_eq!(january[1].total, 5000.0);
    }

    #[test]
    fn test_monthly_trend_is_chronological() {
        let ledger = sample_ledger();
        let trend = ledger.monthly_trend();
        assert_eq!(
            trend,
            vec![
                MonthTotal { month: "2025-01".to_string(), total: 21000.0 },
                MonthTotal { month: "2025-02".to_string(), total: 15000.0 },
            ]
        );
    }

    #[test]
    fn test_daily_average_uses_month_length() {
        let ledger = sample_ledger();
        assert_eq!(ledger.daily_average(2025, 2), 15000.0 / 28.0);
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(ledger.daily_average(2025, 13), 0.0);
    }

    #[test]
    fn test_recent_newest_first() {
        let ledger = sample_ledger();
        let recent = ledger.recent(2);
        assert_eq!(recent[0].date, date(2025, 2, 1));
        assert_eq!(recent[1].date, date(2025, 1, 20));
    }

    #[test]
    fn test_csv_export_then_import() {
        let ledger = sample_ledger();
        let mut buf = Vec::new();
        ledger.export_csv(&mut buf).unwrap();

        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with("Date,Title,Category,Amount,Payment_Method,Notes"));

        let mut imported = ExpenseLedger::new();
        assert_eq!(imported.import_csv(buf.as_slice()).unwrap(), 5);
        assert_eq!(imported.total(), ledger.total());
    }

    #[test]
    fn test_import_rejects_invalid_row() {
        let data = "Date,Title,Category,Amount,Payment_Method,Notes\n2025-01-01,,Rent,100,UPI,\n";
        let mut ledger = ExpenseLedger::new();
        assert!(ledger.import_csv(data.as_bytes()).is_err());
    }

    #[test]
    fn test_failed_import_leaves_ledger_untouched() {
        let data = "Date,Title,Category,Amount,Payment_Method,Notes\n\
                    2025-01-02,Milk packets,Groceries,450,UPI,\n\
                    2025-01-03,,Rent,100,UPI,\n";
        let mut ledger = sample_ledger();
        let (before, total) = (ledger.len(), ledger.total());

        assert!(ledger.import_csv(data.as_bytes()).is_err());
        assert_eq!(ledger.len(), before);
        assert_eq!(ledger.total(), total);
    }

    #[test]
    fn test_seed_has_samples() {
        let seeded = ExpenseLedger::seed();
        assert_eq!(seeded.len(), 6);
        assert!(seeded.total() > 0.0);
    }
}
