// 👨‍👩‍👧 Family Budget - household members, incomes and shared spending

use crate::error::{BudgetError, Result};
use crate::finance::percent_of;
use crate::storage::{keys, Persisted};
use crate::validation::Validator;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Label used for spending not attributed to any one member.
pub const HOUSEHOLD: &str = "Household";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub id: String,
    pub name: String,
    pub relation: String,
    #[serde(default)]
    pub monthly_income: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedExpense {
    pub id: String,
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    /// `None` when the whole household owns the expense.
    #[serde(default)]
    pub member_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFamilyMember {
    pub name: String,
    pub relation: String,
    #[serde(default)]
    #[serde(deserialize_with = "crate::validation::lenient_amount")]
    pub monthly_income: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSharedExpense {
    pub description: String,
    #[serde(deserialize_with = "crate::validation::lenient_amount")]
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub member_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSpend {
    pub name: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionShare {
    pub name: String,
    pub income: f64,
    pub share: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyBudget {
    pub members: Vec<FamilyMember>,
    pub expenses: Vec<SharedExpense>,
}

impl FamilyBudget {
    pub fn new() -> Self {
        FamilyBudget::default()
    }

    pub fn member(&self, id: &str) -> Option<&FamilyMember> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn add_member(&mut self, input: NewFamilyMember) -> Result<FamilyMember> {
        Validator::new("FamilyMember")
            .require_text("name", &input.name, "a name")
            .require_text("relation", &input.relation, "a relation")
            .require_non_negative("monthlyIncome", input.monthly_income, "Monthly income")
            .finish()?;

        let member = FamilyMember {
            id: uuid::Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            relation: input.relation.trim().to_string(),
            monthly_income: input.monthly_income,
        };
        info!(id = %member.id, name = %member.name, "family member added");
        self.members.push(member.clone());
        Ok(member)
    }

    /// Removing a member hands their expenses back to the household.
    pub fn remove_member(&mut self, id: &str) -> Result<FamilyMember> {
        let pos = self
            .members
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| BudgetError::not_found("family member", id))?;
        for e in self.expenses.iter_mut().filter(|e| e.member_id.as_deref() == Some(id)) {
            e.member_id = None;
        }
        Ok(self.members.remove(pos))
    }

    pub fn add_expense(&mut self, input: NewSharedExpense) -> Result<SharedExpense> {
        let member_known = input
            .member_id
            .as_deref()
            .map_or(true, |id| self.member(id).is_some());
        Validator::new("SharedExpense")
            .require_text("description", &input.description, "a description")
            .require_text("category", &input.category, "a category")
            .require_positive("amount", input.amount, "Amount")
            .check(member_known, "memberId", "Please choose a family member")
            .finish()?;

        let expense = SharedExpense {
            id: uuid::Uuid::new_v4().to_string(),
            description: input.description.trim().to_string(),
            amount: input.amount,
            category: input.category.trim().to_string(),
            date: input.date,
            member_id: input.member_id,
        };
        info!(id = %expense.id, amount = expense.amount, "family expense added");
        self.expenses.push(expense.clone());
        Ok(expense)
    }

    pub fn remove_expense(&mut self, id: &str) -> Result<SharedExpense> {
        let pos = self
            .expenses
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| BudgetError::not_found("family expense", id))?;
        Ok(self.expenses.remove(pos))
    }

    pub fn household_income(&self) -> f64 {
        self.members.iter().map(|m| m.monthly_income).sum()
    }

    pub fn total_expenses(&self) -> f64 {
        self.expenses.iter().map(|e| e.amount).sum()
    }

    /// Spend per member in member order, household-level spend last.
    pub fn spend_by_member(&self) -> Vec<MemberSpend> {
        let mut spend: Vec<MemberSpend> = self
            .members
            .iter()
            .map(|m| MemberSpend {
                name: m.name.clone(),
                total: self
                    .expenses
                    .iter()
                    .filter(|e| e.member_id.as_deref() == Some(m.id.as_str()))
                    .map(|e| e.amount)
                    .sum(),
            })
            .collect();

        let shared: f64 = self
            .expenses
            .iter()
            .filter(|e| e.member_id.is_none())
            .map(|e| e.amount)
            .sum();
        spend.push(MemberSpend {
            name: HOUSEHOLD.to_string(),
            total: shared,
        });
        spend
    }

    /// Each earner's share of household income.
    pub fn contribution_share(&self) -> Vec<ContributionShare> {
        let income = self.household_income();
        self.members
            .iter()
            .filter(|m| m.monthly_income > 0.0)
            .map(|m| ContributionShare {
                name: m.name.clone(),
                income: m.monthly_income,
                share: percent_of(m.monthly_income, income),
            })
            .collect()
    }

    pub fn savings(&self) -> f64 {
        self.household_income() - self.total_expenses()
    }

    pub fn savings_rate(&self) -> f64 {
        percent_of(self.savings(), self.household_income())
    }
}

impl Persisted for FamilyBudget {
    const STORAGE_KEY: &'static str = keys::FAMILY;

    fn seed() -> Self {
        let today = chrono::Local::now().date_naive();
        let mut family = FamilyBudget::new();
        for (name, relation, income) in [
            ("Ravi", "Self", 55000.0),
            ("Lakshmi", "Spouse", 35000.0),
            ("Anu", "Daughter", 0.0),
        ] {
            let _ = family.add_member(NewFamilyMember {
                name: name.to_string(),
                relation: relation.to_string(),
                monthly_income: income,
            });
        }
        let anu = family.members.last().map(|m| m.id.clone());
        for (description, amount, category, member_id) in [
            ("Rent", 18000.0, "Housing", None),
            ("Monthly groceries", 9000.0, "Groceries", None),
            ("School fees", 6500.0, "Education", anu),
        ] {
            let _ = family.add_expense(NewSharedExpense {
                description: description.to_string(),
                amount,
                category: category.to_string(),
                date: today,
                member_id,
            });
        }
        family
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str, income: f64) -> NewFamilyMember {
        NewFamilyMember {
            name: name.to_string(),
            relation: "Parent".to_string(),
            monthly_income: income,
        }
    }

    fn shared(description: &str, amount: f64, member_id: Option<String>) -> NewSharedExpense {
        NewSharedExpense {
            description: description.to_string(),
            amount,
            category: "General".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            member_id,
        }
    }

    #[test]
    fn test_household_totals() {
        let mut family = FamilyBudget::new();
        let ravi = family.add_member(member("Ravi", 60000.0)).unwrap();
        family.add_member(member("Meena", 40000.0)).unwrap();
        family.add_expense(shared("Rent", 20000.0, None)).unwrap();
        family.add_expense(shared("Bike EMI", 5000.0, Some(ravi.id.clone()))).unwrap();

        assert_eq!(family.household_income(), 100000.0);
        assert_eq!(family.total_expenses(), 25000.0);
        assert_eq!(family.savings_rate(), 75.0);

        let spend = family.spend_by_member();
        assert_eq!(spend[0], MemberSpend { name: "Ravi".to_string(), total: 5000.0 });
        assert_eq!(spend[1].total, 0.0);
        assert_eq!(spend[2].name, HOUSEHOLD);
        assert_eq!(spend[2].total, 20000.0);

        let shares = family.contribution_share();
        assert_eq!(shares[0].share, 60.0);
        assert_eq!(shares[1].share, 40.0);
    }

    #[test]
    fn test_unknown_member_rejected() {
        let mut family = FamilyBudget::new();
        assert!(family.add_expense(shared("Phone", 500.0, Some("ghost".to_string()))).is_err());
        assert!(family.expenses.is_empty());
    }

    #[test]
    fn test_removing_member_reassigns_expenses() {
        let mut family = FamilyBudget::new();
        let kid = family.add_member(member("Kid", 0.0)).unwrap();
        family.add_expense(shared("Tuition", 3000.0, Some(kid.id.clone()))).unwrap();

        family.remove_member(&kid.id).unwrap();
        assert_eq!(family.expenses[0].member_id, None);
        assert_eq!(family.spend_by_member().last().unwrap().total, 3000.0);
        assert!(family.contribution_share().is_empty());
    }

    #[test]
    fn test_savings_rate_without_income() {
        let family = FamilyBudget::new();
        assert_eq!(family.savings_rate(), 0.0);
    }
}
