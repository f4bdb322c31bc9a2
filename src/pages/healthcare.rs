// 🏥 Healthcare - Jan Aushadhi price finder, health spend log, mock scans

use crate::error::{BudgetError, Result};
use crate::finance::percent_of;
use crate::storage::{keys, Persisted};
use crate::validation::Validator;
use chrono::{Datelike, NaiveDate};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Section 80D deduction ceiling for a self/family policy.
pub const SECTION_80D_LIMIT: f64 = 25000.0;

pub const SCAN_DISCLAIMER: &str =
    "This is a simulated analysis for demonstration only. Please consult a qualified doctor.";

// ============================================================================
// JAN AUSHADHI CATALOGUE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub name: &'static str,
    pub generic_name: &'static str,
    pub use_case: &'static str,
    pub brand_price: f64,
    pub generic_price: f64,
}

impl Medicine {
    pub fn savings(&self) -> f64 {
        (self.brand_price - self.generic_price).max(0.0)
    }

    pub fn savings_percent(&self) -> f64 {
        percent_of(self.savings(), self.brand_price)
    }
}

pub const JAN_AUSHADHI: &[Medicine] = &[
    Medicine {
        name: "Crocin 650",
        generic_name: "Paracetamol 650mg",
        use_case: "Fever, pain",
        brand_price: 32.0,
        generic_price: 10.0,
    },
    Medicine {
        name: "Glycomet 500",
        generic_name: "Metformin 500mg",
        use_case: "Diabetes",
        brand_price: 45.0,
        generic_price: 12.0,
    },
    Medicine {
        name: "Amlong 5",
        generic_name: "Amlodipine 5mg",
        use_case: "Blood pressure",
        brand_price: 68.0,
        generic_price: 9.5,
    },
    Medicine {
        name: "Atorva 10",
        generic_name: "Atorvastatin 10mg",
        use_case: "Cholesterol",
        brand_price: 115.0,
        generic_price: 22.0,
    },
    Medicine {
        name: "Pan 40",
        generic_name: "Pantoprazole 40mg",
        use_case: "Acidity",
        brand_price: 155.0,
        generic_price: 18.0,
    },
    Medicine {
        name: "Augmentin 625",
        generic_name: "Amoxicillin + Clavulanic acid",
        use_case: "Bacterial infection",
        brand_price: 220.0,
        generic_price: 65.0,
    },
];

/// Case-insensitive match on brand name, generic name or use.
pub fn search_medicines(query: &str) -> Vec<&'static Medicine> {
    let q = query.trim().to_lowercase();
    JAN_AUSHADHI
        .iter()
        .filter(|m| {
            q.is_empty()
                || m.name.to_lowercase().contains(&q)
                || m.generic_name.to_lowercase().contains(&q)
                || m.use_case.to_lowercase().contains(&q)
        })
        .collect()
}

// ============================================================================
// HEALTH EXPENSE LOG
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HealthCategory {
    Consultation,
    Medicine,
    LabTest,
    Insurance,
    Hospital,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthExpense {
    pub id: String,
    pub description: String,
    pub category: HealthCategory,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub family_member: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHealthExpense {
    pub description: String,
    pub category: HealthCategory,
    #[serde(deserialize_with = "crate::validation::lenient_amount")]
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub family_member: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HealthLog {
    expenses: Vec<HealthExpense>,
}

impl HealthLog {
    pub fn new() -> Self {
        HealthLog::default()
    }

    pub fn all(&self) -> &[HealthExpense] {
        &self.expenses
    }

    pub fn add(&mut self, input: NewHealthExpense) -> Result<HealthExpense> {
        Validator::new("HealthExpense")
            .require_text("description", &input.description, "a description")
            .require_positive("amount", input.amount, "Amount")
            .finish()?;

        let expense = HealthExpense {
            id: uuid::Uuid::new_v4().to_string(),
            description: input.description.trim().to_string(),
            category: input.category,
            amount: input.amount,
            date: input.date,
            family_member: input.family_member.trim().to_string(),
        };
        info!(id = %expense.id, amount = expense.amount, "health expense logged");
        self.expenses.push(expense.clone());
        Ok(expense)
    }

    pub fn remove(&mut self, id: &str) -> Result<HealthExpense> {
        let pos = self
            .expenses
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| BudgetError::not_found("health expense", id))?;
        Ok(self.expenses.remove(pos))
    }

    pub fn annual_total(&self, year: i32) -> f64 {
        self.expenses
            .iter()
            .filter(|e| e.date.year() == year)
            .map(|e| e.amount)
            .sum()
    }

    /// Premiums paid in `year` that count toward Section 80D.
    pub fn insurance_premiums(&self, year: i32) -> f64 {
        self.expenses
            .iter()
            .filter(|e| e.date.year() == year && e.category == HealthCategory::Insurance)
            .map(|e| e.amount)
            .sum()
    }

    pub fn section_80d_remaining(&self, year: i32) -> f64 {
        (SECTION_80D_LIMIT - self.insurance_premiums(year)).max(0.0)
    }
}

impl Persisted for HealthLog {
    const STORAGE_KEY: &'static str = keys::HEALTH_EXPENSES;

    fn seed() -> Self {
        let today = chrono::Local::now().date_naive();
        let mut log = HealthLog::new();
        for (description, category, amount) in [
            ("Star Health family floater", HealthCategory::Insurance, 14500.0),
            ("Apollo consultation", HealthCategory::Consultation, 800.0),
            ("Thyroid panel", HealthCategory::LabTest, 650.0),
        ] {
            let _ = log.add(NewHealthExpense {
                description: description.to_string(),
                category,
                amount,
                date: today,
                family_member: String::new(),
            });
        }
        log
    }
}

// ============================================================================
// MOCK SCAN ANALYSIS
// ============================================================================

const SCAN_FINDINGS: &[&str] = &[
    "No significant abnormality detected in the uploaded report.",
    "Values are mostly within range; vitamin D appears slightly low.",
    "Blood sugar readings are borderline; consider a follow-up HbA1c test.",
    "Cholesterol is mildly elevated; diet and exercise review suggested.",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanAnalysis {
    pub file_name: String,
    pub finding: String,
    pub confidence: u8,
    pub disclaimer: &'static str,
}

/// Simulated report reading: a random canned finding, never a diagnosis.
pub fn analyze_scan<R: Rng + ?Sized>(rng: &mut R, file_name: &str) -> Result<ScanAnalysis> {
    Validator::new("ScanAnalysis")
        .require_text("fileName", file_name, "a report to analyse")
        .finish()?;

    let finding = SCAN_FINDINGS
        .choose(rng)
        .copied()
        .unwrap_or(SCAN_FINDINGS[0]);
    let analysis = ScanAnalysis {
        file_name: file_name.trim().to_string(),
        finding: finding.to_string(),
        confidence: rng.random_range(70..=95),
        disclaimer: SCAN_DISCLAIMER,
    };
    info!(file = %analysis.file_name, "scan analysed (simulated)");
    Ok(analysis)
}
