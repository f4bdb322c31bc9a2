// 🎯 Goals Tracker - savings goals with clamped progress
//
// Invariants:
// - current_amount stays within [0, target_amount]
// - status is Completed exactly when current_amount >= target_amount

use crate::error::{BudgetError, Result};
use crate::finance::{days_until, progress_percent};
use crate::storage::{keys, Persisted};
use crate::validation::Validator;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Active,
    Completed,
    Paused,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: NaiveDate,
    pub priority: Priority,
    pub status: GoalStatus,
    #[serde(default)]
    pub category: String,
}

impl Goal {
    pub fn progress(&self) -> f64 {
        progress_percent(self.current_amount, self.target_amount)
    }

    pub fn remaining(&self) -> f64 {
        (self.target_amount - self.current_amount).max(0.0)
    }

    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        days_until(self.deadline, today)
    }

    /// Monthly saving needed to hit the target by the deadline.
    pub fn monthly_required(&self, today: NaiveDate) -> f64 {
        let days = self.days_remaining(today);
        if days <= 0 {
            return self.remaining();
        }
        let months = (days as f64 / 30.0).ceil().max(1.0);
        self.remaining() / months
    }

    /// Clamp and re-derive status. Pausing survives unless the goal is met.
    fn apply_amount(&mut self, amount: f64) {
        self.current_amount = amount.clamp(0.0, self.target_amount);
        if self.current_amount >= self.target_amount {
            self.status = GoalStatus::Completed;
        } else if self.status == GoalStatus::Completed {
            self.status = GoalStatus::Active;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub title: String,
    #[serde(deserialize_with = "crate::validation::lenient_amount")]
    pub target_amount: f64,
    #[serde(default)]
    #[serde(deserialize_with = "crate::validation::lenient_amount")]
    pub current_amount: f64,
    pub deadline: NaiveDate,
    pub priority: Priority,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSummary {
    pub total_goals: usize,
    pub completed: usize,
    pub total_target: f64,
    pub total_saved: f64,
    pub overall_progress: f64,
}

// ============================================================================
// TRACKER
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalTracker {
    goals: Vec<Goal>,
}

impl GoalTracker {
    pub fn new() -> Self {
        GoalTracker::default()
    }

    pub fn all(&self) -> &[Goal] {
        &self.goals
    }

    pub fn get(&self, id: &str) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    pub fn add(&mut self, input: NewGoal) -> Result<Goal> {
        Validator::new("Goal")
            .require_text("title", &input.title, "a goal title")
            .require_positive("targetAmount", input.target_amount, "Target amount")
            .require_non_negative("currentAmount", input.current_amount, "Saved amount")
            .finish()?;

        let mut goal = Goal {
            id: uuid::Uuid::new_v4().to_string(),
            title: input.title.trim().to_string(),
            target_amount: input.target_amount,
            current_amount: 0.0,
            deadline: input.deadline,
            priority: input.priority,
            status: GoalStatus::Active,
            category: input.category,
        };
        goal.apply_amount(input.current_amount);

        info!(id = %goal.id, title = %goal.title, target = goal.target_amount, "goal added");
        self.goals.push(goal.clone());
        Ok(goal)
    }

    /// Set the saved amount outright; clamped to `[0, target]`.
    pub fn set_progress(&mut self, id: &str, amount: f64) -> Result<Goal> {
        if !amount.is_finite() {
            return Err(BudgetError::invalid("Goal", "currentAmount", "Please enter a valid amount"));
        }
        let goal = self.find_mut(id)?;
        goal.apply_amount(amount);
        info!(id, current = goal.current_amount, status = ?goal.status, "goal progress updated");
        Ok(goal.clone())
    }

    /// Add (or withdraw, when negative) from the saved amount.
    pub fn contribute(&mut self, id: &str, delta: f64) -> Result<Goal> {
        let current = self
            .get(id)
            .map(|g| g.current_amount)
            .ok_or_else(|| BudgetError::not_found("goal", id))?;
        self.set_progress(id, current + delta)
    }

    /// Completed goals cannot be paused.
    pub fn pause(&mut self, id: &str) -> Result<Goal> {
        let goal = self.find_mut(id)?;
        if goal.status == GoalStatus::Active {
            goal.status = GoalStatus::Paused;
        }
        Ok(goal.clone())
    }

    pub fn resume(&mut self, id: &str) -> Result<Goal> {
        let goal = self.find_mut(id)?;
        if goal.status == GoalStatus::Paused {
            goal.status = GoalStatus::Active;
        }
        Ok(goal.clone())
    }

    pub fn remove(&mut self, id: &str) -> Result<Goal> {
        let pos = self
            .goals
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| BudgetError::not_found("goal", id))?;
        info!(id, "goal removed");
        Ok(self.goals.remove(pos))
    }

    pub fn by_status(&self, status: GoalStatus) -> Vec<&Goal> {
        self.goals.iter().filter(|g| g.status == status).collect()
    }

    pub fn summary(&self) -> GoalSummary {
        let total_target: f64 = self.goals.iter().map(|g| g.target_amount).sum();
        let total_saved: f64 = self.goals.iter().map(|g| g.current_amount).sum();
        GoalSummary {
            total_goals: self.goals.len(),
            completed: self.by_status(GoalStatus::Completed).len(),
            total_target,
            total_saved,
            overall_progress: progress_percent(total_saved, total_target),
        }
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut Goal> {
        self.goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| BudgetError::not_found("goal", id))
    }
}

impl Persisted for GoalTracker {
    const STORAGE_KEY: &'static str = keys::GOALS;

    fn seed() -> Self {
        let today = chrono::Local::now().date_naive();
        let in_months = |m: u32| {
            today
                .checked_add_months(chrono::Months::new(m))
                .unwrap_or(today)
        };

        let mut tracker = GoalTracker::new();
        let samples = [
            ("Emergency Fund", 150000.0, 85000.0, 6, Priority::High, "Safety"),
            ("Child Education", 500000.0, 120000.0, 36, Priority::High, "Education"),
            ("Family Trip to Kerala", 60000.0, 22000.0, 8, Priority::Medium, "Travel"),
            ("New Two-Wheeler", 90000.0, 15000.0, 12, Priority::Low, "Vehicle"),
        ];
        for (title, target, saved, months, priority, category) in samples {
            // Seed data always passes validation
            let _ = tracker.add(NewGoal {
                title: title.to_string(),
                target_amount: target,
                current_amount: saved,
                deadline: in_months(months),
                priority,
                category: category.to_string(),
            });
        }
        tracker
    }
}
