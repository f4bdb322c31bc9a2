// 🔔 Notifications & Reminders - bill due dates with optional recurrence

use crate::error::{BudgetError, Result};
use crate::finance::days_until;
use crate::pages::goals::Priority;
use crate::storage::{keys, Persisted};
use crate::validation::Validator;
use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Recurrence {
    /// Next due date after `date`, or `None` for one-off reminders.
    ///
    /// Month arithmetic clamps to the last day (31 Jan → 28/29 Feb).
    pub fn next_after(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Recurrence::None => None,
            Recurrence::Daily => date.checked_add_days(Days::new(1)),
            Recurrence::Weekly => date.checked_add_days(Days::new(7)),
            Recurrence::Monthly => date.checked_add_months(Months::new(1)),
            Recurrence::Yearly => date.checked_add_months(Months::new(12)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    pub title: String,
    pub category: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub is_active: bool,
    pub priority: Priority,
    #[serde(default)]
    pub recurring: Recurrence,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReminder {
    pub title: String,
    pub category: String,
    #[serde(default)]
    #[serde(deserialize_with = "crate::validation::lenient_amount")]
    pub amount: f64,
    pub due_date: NaiveDate,
    pub priority: Priority,
    #[serde(default)]
    pub recurring: Recurrence,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReminderBoard {
    reminders: Vec<Reminder>,
}

impl ReminderBoard {
    pub fn new() -> Self {
        ReminderBoard::default()
    }

    pub fn all(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn get(&self, id: &str) -> Option<&Reminder> {
        self.reminders.iter().find(|r| r.id == id)
    }

    pub fn add(&mut self, input: NewReminder) -> Result<Reminder> {
        Validator::new("Reminder")
            .require_text("title", &input.title, "a title")
            .require_text("category", &input.category, "a category")
            .require_non_negative("amount", input.amount, "Amount")
            .finish()?;

        let reminder = Reminder {
            id: uuid::Uuid::new_v4().to_string(),
            title: input.title.trim().to_string(),
            category: input.category.trim().to_string(),
            amount: input.amount,
            due_date: input.due_date,
            is_active: true,
            priority: input.priority,
            recurring: input.recurring,
        };
        info!(id = %reminder.id, title = %reminder.title, due = %reminder.due_date, "reminder added");
        self.reminders.push(reminder.clone());
        Ok(reminder)
    }

    /// Flip the active flag. Nothing else on the reminder changes.
    pub fn toggle_active(&mut self, id: &str) -> Result<Reminder> {
        let reminder = self.find_mut(id)?;
        reminder.is_active = !reminder.is_active;
        info!(id, active = reminder.is_active, "reminder toggled");
        Ok(reminder.clone())
    }

    /// Recurring reminders roll to the next occurrence; one-offs switch off.
    pub fn mark_paid(&mut self, id: &str) -> Result<Reminder> {
        let reminder = self.find_mut(id)?;
        match reminder.recurring.next_after(reminder.due_date) {
            Some(next) => reminder.due_date = next,
            None => reminder.is_active = false,
        }
        info!(id, due = %reminder.due_date, active = reminder.is_active, "reminder paid");
        Ok(reminder.clone())
    }

    pub fn remove(&mut self, id: &str) -> Result<Reminder> {
        let pos = self
            .reminders
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| BudgetError::not_found("reminder", id))?;
        Ok(self.reminders.remove(pos))
    }

    /// Active reminders due from today through `days` ahead, soonest first.
    pub fn due_within(&self, today: NaiveDate, days: i64) -> Vec<&Reminder> {
        let mut due: Vec<&Reminder> = self
            .reminders
            .iter()
            .filter(|r| r.is_active)
            .filter(|r| {
                let d = days_until(r.due_date, today);
                (0..=days).contains(&d)
            })
            .collect();
        due.sort_by_key(|r| r.due_date);
        due
    }

    pub fn overdue(&self, today: NaiveDate) -> Vec<&Reminder> {
        self.reminders
            .iter()
            .filter(|r| r.is_active && r.due_date < today)
            .collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<&Reminder> {
        self.reminders
            .iter()
            .filter(|r| r.category.eq_ignore_ascii_case(category))
            .collect()
    }

    pub fn active_total(&self) -> f64 {
        self.reminders
            .iter()
            .filter(|r| r.is_active)
            .map(|r| r.amount)
            .sum()
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut Reminder> {
        self.reminders
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| BudgetError::not_found("reminder", id))
    }
}

impl Persisted for ReminderBoard {
    const STORAGE_KEY: &'static str = keys::REMINDERS;

    fn seed() -> Self {
        let today = chrono::Local::now().date_naive();
        let in_days = |d: u64| today.checked_add_days(Days::new(d)).unwrap_or(today);

        let mut board = ReminderBoard::new();
        let samples = [
            ("TANGEDCO Electricity Bill", "Utilities", 1850.0, 5, Priority::High, Recurrence::Monthly),
            ("Chennai Metro Water", "Utilities", 450.0, 12, Priority::Medium, Recurrence::Monthly),
            ("GCC Property Tax", "Taxes", 6200.0, 40, Priority::High, Recurrence::Yearly),
            ("LIC Premium", "Insurance", 12500.0, 20, Priority::High, Recurrence::Yearly),
            ("Airtel Fiber", "Internet", 999.0, 3, Priority::Low, Recurrence::Monthly),
        ];
        for (title, category, amount, days, priority, recurring) in samples {
            let _ = board.add(NewReminder {
                title: title.to_string(),
                category: category.to_string(),
                amount,
                due_date: in_days(days),
                priority,
                recurring,
            });
        }
        board
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn reminder(title: &str, due: NaiveDate, recurring: Recurrence) -> NewReminder {
        NewReminder {
            title: title.to_string(),
            category: "Utilities".to_string(),
            amount: 1000.0,
            due_date: due,
            priority: Priority::Medium,
            recurring,
        }
    }

    #[test]
    fn test_toggle_only_touches_active_flag() {
        let mut board = ReminderBoard::new();
        let before = board
            .add(reminder("EB Bill", d(2025, 3, 10), Recurrence::Monthly))
            .unwrap();

        let after = board.toggle_active(&before.id).unwrap();
        assert!(!after.is_active);
        assert_eq!(after.due_date, before.due_date);
        assert_eq!(after.amount, before.amount);
        assert_eq!(after.recurring, before.recurring);

        assert!(board.toggle_active(&before.id).unwrap().is_active);
    }

    #[test]
    fn test_add_requires_title_and_category() {
        let mut board = ReminderBoard::new();
        let mut input = reminder("", d(2025, 1, 1), Recurrence::None);
        input.category = String::new();
        assert!(board.add(input).is_err());
        assert!(board.all().is_empty());
    }

    #[test]
    fn test_mark_paid_advances_one_period() {
        let mut board = ReminderBoard::new();
        let monthly = board.add(reminder("Rent", d(2025, 1, 31), Recurrence::Monthly)).unwrap();
        let weekly = board.add(reminder("Milk", d(2025, 1, 1), Recurrence::Weekly)).unwrap();
        let once = board.add(reminder("Passport", d(2025, 1, 1), Recurrence::None)).unwrap();

        assert_eq!(board.mark_paid(&monthly.id).unwrap().due_date, d(2025, 2, 28));
        assert_eq!(board.mark_paid(&weekly.id).unwrap().due_date, d(2025, 1, 8));

        let paid = board.mark_paid(&once.id).unwrap();
        assert!(!paid.is_active);
        assert_eq!(paid.due_date, d(2025, 1, 1));
    }

    #[test]
    fn test_due_within_and_overdue() {
        let today = d(2025, 3, 1);
        let mut board = ReminderBoard::new();
        board.add(reminder("Late", d(2025, 2, 25), Recurrence::None)).unwrap();
        let soon = board.add(reminder("Soon", d(2025, 3, 5), Recurrence::None)).unwrap();
        board.add(reminder("Today", today, Recurrence::None)).unwrap();
        board.add(reminder("Later", d(2025, 4, 20), Recurrence::None)).unwrap();

        let due: Vec<&str> = board.due_within(today, 7).iter().map(|r| r.title.as_str()).collect();
        assert_eq!(due, vec!["Today", "Soon"]);
        assert_eq!(board.overdue(today).len(), 1);

        board.toggle_active(&soon.id).unwrap();
        assert_eq!(board.due_within(today, 7).len(), 1);
        assert_eq!(board.active_total(), 3000.0);
    }

    #[test]
    fn test_yearly_from_leap_day() {
        assert_eq!(Recurrence::Yearly.next_after(d(2024, 2, 29)), Some(d(2025, 2, 28)));
        assert_eq!(Recurrence::None.next_after(d(2024, 2, 29)), None);
    }

    #[test]
    fn test_seed_uses_chennai_bills() {
        let board = ReminderBoard::seed();
        assert_eq!(board.all().len(), 5);
        assert_eq!(board.by_category("utilities").len(), 2);
    }
}
