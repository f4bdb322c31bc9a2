// 📺 OTT Platforms - streaming subscriptions and what they really cost

use crate::error::{BudgetError, Result};
use crate::finance::days_until;
use crate::storage::{keys, Persisted};
use crate::validation::Validator;
use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Quarterly,
    Yearly,
}

impl BillingCycle {
    pub fn months(self) -> u32 {
        match self {
            BillingCycle::Monthly => 1,
            BillingCycle::Quarterly => 3,
            BillingCycle::Yearly => 12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub platform: String,
    pub plan: String,
    pub cost: f64,
    pub billing_cycle: BillingCycle,
    pub renewal_date: NaiveDate,
    pub active: bool,
    /// People splitting the bill, including the owner. Zero reads as one.
    #[serde(default)]
    pub shared_with: u32,
}

impl Subscription {
    pub fn monthly_cost(&self) -> f64 {
        self.cost / self.billing_cycle.months() as f64
    }

    pub fn per_person_cost(&self) -> f64 {
        self.monthly_cost() / self.shared_with.max(1) as f64
    }

    /// First renewal on or after `today`.
    pub fn next_renewal(&self, today: NaiveDate) -> NaiveDate {
        let mut date = self.renewal_date;
        while date < today {
            match date.checked_add_months(Months::new(self.billing_cycle.months())) {
                Some(next) => date = next,
                None => break,
            }
        }
        date
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscription {
    pub platform: String,
    #[serde(default)]
    pub plan: String,
    #[serde(deserialize_with = "crate::validation::lenient_amount")]
    pub cost: f64,
    pub billing_cycle: BillingCycle,
    pub renewal_date: NaiveDate,
    #[serde(default)]
    pub shared_with: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionList {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionList {
    pub fn new() -> Self {
        SubscriptionList::default()
    }

    pub fn all(&self) -> &[Subscription] {
        &self.subscriptions
    }

    pub fn add(&mut self, input: NewSubscription) -> Result<Subscription> {
        Validator::new("Subscription")
            .require_text("platform", &input.platform, "a platform")
            .require_positive("cost", input.cost, "Cost")
            .finish()?;

        let sub = Subscription {
            id: uuid::Uuid::new_v4().to_string(),
            platform: input.platform.trim().to_string(),
            plan: input.plan.trim().to_string(),
            cost: input.cost,
            billing_cycle: input.billing_cycle,
            renewal_date: input.renewal_date,
            active: true,
            shared_with: input.shared_with.max(1),
        };
        info!(id = %sub.id, platform = %sub.platform, "subscription added");
        self.subscriptions.push(sub.clone());
        Ok(sub)
    }

    pub fn toggle(&mut self, id: &str) -> Result<Subscription> {
        let sub = self
            .subscriptions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| BudgetError::not_found("subscription", id))?;
        sub.active = !sub.active;
        info!(id, active = sub.active, "subscription toggled");
        Ok(sub.clone())
    }

    pub fn remove(&mut self, id: &str) -> Result<Subscription> {
        let pos = self
            .subscriptions
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| BudgetError::not_found("subscription", id))?;
        Ok(self.subscriptions.remove(pos))
    }

    fn active(&self) -> impl Iterator<Item = &Subscription> {
        self.subscriptions.iter().filter(|s| s.active)
    }

    pub fn monthly_total(&self) -> f64 {
        self.active().map(Subscription::monthly_cost).sum()
    }

    pub fn yearly_total(&self) -> f64 {
        self.monthly_total() * 12.0
    }

    /// What the household actually pays per month once shares are split.
    pub fn per_person_cost(&self) -> f64 {
        self.active().map(Subscription::per_person_cost).sum()
    }

    /// Active subscriptions renewing within `days`, soonest first.
    pub fn upcoming_renewals(&self, today: NaiveDate, days: i64) -> Vec<(&Subscription, NaiveDate)> {
        let mut upcoming: Vec<(&Subscription, NaiveDate)> = self
            .active()
            .map(|s| (s, s.next_renewal(today)))
            .filter(|(_, date)| days_until(*date, today) <= days)
            .collect();
        upcoming.sort_by_key(|(_, date)| *date);
        upcoming
    }
}

impl Persisted for SubscriptionList {
    const STORAGE_KEY: &'static str = keys::SUBSCRIPTIONS;

    fn seed() -> Self {
        let today = chrono::Local::now().date_naive();
        let in_days = |d: u64| today.checked_add_days(Days::new(d)).unwrap_or(today);

        let mut list = SubscriptionList::new();
        for (platform, plan, cost, cycle, days, shared) in [
            ("Netflix", "Standard", 499.0, BillingCycle::Monthly, 6, 2),
            ("Disney+ Hotstar", "Super", 899.0, BillingCycle::Yearly, 120, 1),
            ("Amazon Prime", "Annual", 1499.0, BillingCycle::Yearly, 45, 3),
            ("Sun NXT", "Premium", 50.0, BillingCycle::Monthly, 15, 1),
        ] {
            let _ = list.add(NewSubscription {
                platform: platform.to_string(),
                plan: plan.to_string(),
                cost,
                billing_cycle: cycle,
                renewal_date: in_days(days),
                shared_with: shared,
            });
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sub(platform: &str, cost: f64, cycle: BillingCycle, renewal: NaiveDate, shared: u32) -> NewSubscription {
        NewSubscription {
            platform: platform.to_string(),
            plan: "Basic".to_string(),
            cost,
            billing_cycle: cycle,
            renewal_date: renewal,
            shared_with: shared,
        }
    }

    #[test]
    fn test_totals_normalise_cycles() {
        let mut list = SubscriptionList::new();
        list.add(sub("Netflix", 600.0, BillingCycle::Monthly, d(2025, 3, 5), 2)).unwrap();
        list.add(sub("Prime", 1200.0, BillingCycle::Yearly, d(2025, 8, 1), 1)).unwrap();

        assert_eq!(list.monthly_total(), 700.0);
        assert_eq!(list.yearly_total(), 8400.0);
        assert_eq!(list.per_person_cost(), 400.0);
    }

    #[test]
    fn test_toggle_excludes_from_totals() {
        let mut list = SubscriptionList::new();
        let id = list.add(sub("Netflix", 600.0, BillingCycle::Monthly, d(2025, 3, 5), 0)).unwrap().id;
        assert_eq!(list.all()[0].shared_with, 1);

        assert!(!list.toggle(&id).unwrap().active);
        assert_eq!(list.monthly_total(), 0.0);
        assert!(list.toggle("missing").is_err());
    }

    #[test]
    fn test_upcoming_renewals_roll_forward() {
        let today = d(2025, 3, 10);
        let mut list = SubscriptionList::new();
        // Lapsed date rolls monthly to 1 April
        list.add(sub("Old", 100.0, BillingCycle::Monthly, d(2025, 1, 1), 1)).unwrap();
        list.add(sub("Soon", 100.0, BillingCycle::Monthly, d(2025, 3, 12), 1)).unwrap();
        list.add(sub("Far", 100.0, BillingCycle::Yearly, d(2025, 9, 1), 1)).unwrap();

        let upcoming = list.upcoming_renewals(today, 30);
        let names: Vec<&str> = upcoming.iter().map(|(s, _)| s.platform.as_str()).collect();
        assert_eq!(names, vec!["Soon", "Old"]);
        assert_eq!(upcoming[1].1, d(2025, 4, 1));
    }

    #[test]
    fn test_add_validates_and_remove() {
        let mut list = SubscriptionList::new();
        assert!(list.add(sub("", 0.0, BillingCycle::Monthly, d(2025, 1, 1), 1)).is_err());
        let id = list.add(sub("Zee5", 99.0, BillingCycle::Monthly, d(2025, 1, 1), 1)).unwrap().id;
        assert_eq!(list.remove(&id).unwrap().platform, "Zee5");
        assert!(list.all().is_empty());
    }
}
