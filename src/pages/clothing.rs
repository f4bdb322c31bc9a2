// 👗 Fashion & Clothing - a monthly wardrobe budget

use crate::error::{BudgetError, Result};
use crate::storage::{keys, Persisted};
use crate::validation::Validator;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

pub const CLOTHING_CATEGORIES: &[&str] = &["Ethnic", "Western", "Kids", "Footwear", "Accessories", "Festive"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClothingPurchase {
    pub id: String,
    pub item: String,
    pub category: String,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub store: String,
    #[serde(default)]
    pub family_member: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClothingPurchase {
    pub item: String,
    pub category: String,
    #[serde(deserialize_with = "crate::validation::lenient_amount")]
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub store: String,
    #[serde(default)]
    pub family_member: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClothingBudget {
    pub monthly_budget: f64,
    pub purchases: Vec<ClothingPurchase>,
}

impl ClothingBudget {
    pub fn new(monthly_budget: f64) -> Self {
        ClothingBudget {
            monthly_budget,
            purchases: Vec::new(),
        }
    }

    pub fn set_budget(&mut self, amount: f64) -> Result<()> {
        Validator::new("ClothingBudget")
            .require_non_negative("monthlyBudget", amount, "Monthly budget")
            .finish()?;
        self.monthly_budget = amount;
        info!(budget = amount, "clothing budget set");
        Ok(())
    }

    pub fn add(&mut self, input: NewClothingPurchase) -> Result<ClothingPurchase> {
        Validator::new("ClothingPurchase")
            .require_text("item", &input.item, "an item")
            .require_text("category", &input.category, "a category")
            .require_positive("amount", input.amount, "Amount")
            .finish()?;

        let purchase = ClothingPurchase {
            id: uuid::Uuid::new_v4().to_string(),
            item: input.item.trim().to_string(),
            category: input.category.trim().to_string(),
            amount: input.amount,
            date: input.date,
            store: input.store.trim().to_string(),
            family_member: input.family_member.trim().to_string(),
        };
        self.purchases.push(purchase.clone());
        info!(id = %purchase.id, amount = purchase.amount, "clothing purchase added");

        let (y, m) = (purchase.date.year(), purchase.date.month());
        if self.is_over_budget(y, m) {
            warn!(year = y, month = m, spent = self.spent_in_month(y, m), "clothing budget exceeded");
        }
        Ok(purchase)
    }

    pub fn remove(&mut self, id: &str) -> Result<ClothingPurchase> {
        let pos = self
            .purchases
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| BudgetError::not_found("clothing purchase", id))?;
        Ok(self.purchases.remove(pos))
    }

    pub fn spent_in_month(&self, year: i32, month: u32) -> f64 {
        self.purchases
            .iter()
            .filter(|p| p.date.year() == year && p.date.month() == month)
            .map(|p| p.amount)
            .sum()
    }

    /// Budget left this month; negative once overspent.
    pub fn remaining(&self, year: i32, month: u32) -> f64 {
        self.monthly_budget - self.spent_in_month(year, month)
    }

    pub fn is_over_budget(&self, year: i32, month: u32) -> bool {
        self.remaining(year, month) < 0.0
    }

    pub fn by_category(&self) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        for p in &self.purchases {
            *totals.entry(p.category.clone()).or_insert(0.0) += p.amount;
        }
        totals
    }
}

impl Persisted for ClothingBudget {
    const STORAGE_KEY: &'static str = keys::CLOTHING;

    fn seed() -> Self {
        let today = chrono::Local::now().date_naive();
        let mut budget = ClothingBudget::new(4000.0);
        for (item, category, amount, store) in [
            ("Cotton saree", "Ethnic", 1800.0, "Pothys"),
            ("School shoes", "Footwear", 950.0, "Bata"),
        ] {
            let _ = budget.add(NewClothingPurchase {
                item: item.to_string(),
                category: category.to_string(),
                amount,
                date: today,
                store: store.to_string(),
                family_member: String::new(),
            });
        }
        budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buy(item: &str, category: &str, amount: f64, date: NaiveDate) -> NewClothingPurchase {
        NewClothingPurchase {
            item: item.to_string(),
            category: category.to_string(),
            amount,
            date,
            store: String::new(),
            family_member: String::new(),
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_monthly_budget_tracking() {
        let mut budget = ClothingBudget::new(3000.0);
        budget.add(buy("Kurta", "Ethnic", 1200.0, d(2025, 10, 2))).unwrap();
        budget.add(buy("Sneakers", "Footwear", 1500.0, d(2025, 10, 20))).unwrap();
        budget.add(buy("Shirt", "Western", 800.0, d(2025, 9, 28))).unwrap();

        assert_eq!(budget.spent_in_month(2025, 10), 2700.0);
        assert_eq!(budget.remaining(2025, 10), 300.0);
        assert!(!budget.is_over_budget(2025, 10));

        budget.add(buy("Dupatta", "Ethnic", 500.0, d(2025, 10, 25))).unwrap();
        assert!(budget.is_over_budget(2025, 10));
        assert_eq!(budget.remaining(2025, 10), -200.0);
    }

    #[test]
    fn test_by_category() {
        let mut budget = ClothingBudget::new(5000.0);
        budget.add(buy("Kurta", "Ethnic", 1200.0, d(2025, 10, 2))).unwrap();
        budget.add(buy("Saree", "Ethnic", 2000.0, d(2025, 10, 3))).unwrap();
        budget.add(buy("Belt", "Accessories", 300.0, d(2025, 10, 3))).unwrap();

        let totals = budget.by_category();
        assert_eq!(totals["Ethnic"], 3200.0);
        assert_eq!(totals["Accessories"], 300.0);
    }

    #[test]
    fn test_validation_and_remove() {
        let mut budget = ClothingBudget::new(1000.0);
        assert!(budget.add(buy("", "", -1.0, d(2025, 1, 1))).is_err());
        assert!(budget.set_budget(-5.0).is_err());
        let id = budget.add(buy("Cap", "Accessories", 200.0, d(2025, 1, 1))).unwrap().id;
        budget.remove(&id).unwrap();
        assert!(budget.remove(&id).is_err());
    }
}
