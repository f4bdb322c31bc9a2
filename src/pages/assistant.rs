// 🎙️ Voice Assistant - keyword intents over live page data
//
// Speech capture happens in the browser; this side only sees the
// transcript. Unmatched questions get a random canned tip.

use crate::finance::format_inr;
use crate::pages::banking::OnlineBanking;
use crate::pages::budget_planner::{BudgetPlan, BudgetStatus};
use crate::pages::expenses::ExpenseLedger;
use crate::pages::goals::{GoalStatus, GoalTracker};
use crate::pages::reminders::ReminderBoard;
use crate::pages::schemes::{eligible, EligibilityQuery};
use chrono::{Datelike, NaiveDate};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

const TIPS: &[&str] = &[
    "Try the 50-30-20 rule: half for needs, 30% for wants, 20% for savings.",
    "Automate a small SIP on salary day so saving happens before spending.",
    "Buy generic medicines at a Jan Aushadhi Kendra to cut pharmacy bills.",
    "Review OTT subscriptions every quarter and drop the ones you rarely watch.",
    "Keep three to six months of expenses in an emergency fund.",
    "Pay utility bills before the due date to avoid late fees.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Balance,
    Budget,
    Goal,
    Bill,
    Scheme,
    Tip,
}

impl Intent {
    /// First matching keyword group wins.
    pub fn detect(question: &str) -> Intent {
        let q = question.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| q.contains(w));

        if has(&["balance", "bank", "account"]) {
            Intent::Balance
        } else if has(&["budget", "spend", "spent", "expense"]) {
            Intent::Budget
        } else if has(&["goal", "saving for", "target"]) {
            Intent::Goal
        } else if has(&["bill", "due", "remind"]) {
            Intent::Bill
        } else if has(&["scheme", "subsidy", "yojana"]) {
            Intent::Scheme
        } else {
            Intent::Tip
        }
    }
}

/// Everything the assistant can look at when answering.
pub struct AssistantContext<'a> {
    pub today: NaiveDate,
    pub banking: &'a OnlineBanking,
    pub ledger: &'a ExpenseLedger,
    pub plan: &'a BudgetPlan,
    pub goals: &'a GoalTracker,
    pub reminders: &'a ReminderBoard,
    pub state: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantReply {
    pub intent: Intent,
    pub answer: String,
}

pub fn answer<R: Rng + ?Sized>(rng: &mut R, question: &str, ctx: &AssistantContext<'_>) -> AssistantReply {
    let intent = Intent::detect(question);
    debug!(?intent, "assistant intent");

    let answer = match intent {
        Intent::Balance => format!("Your account balance is {}.", format_inr(ctx.banking.balance())),
        Intent::Budget => {
            let (y, m) = (ctx.today.year(), ctx.today.month());
            let spent = ctx.ledger.month_total(y, m);
            let over: Vec<String> = ctx
                .plan
                .utilization(ctx.ledger, y, m)
                .into_iter()
                .filter(|u| u.status == BudgetStatus::Exceeded)
                .map(|u| u.category)
                .collect();
            let mut reply = format!(
                "You have spent {} this month out of an income of {}.",
                format_inr(spent),
                format_inr(ctx.plan.monthly_income)
            );
            if !over.is_empty() {
                reply.push_str(&format!(" Over budget in: {}.", over.join(", ")));
            }
            reply
        }
        Intent::Goal => {
            let summary = ctx.goals.summary();
            let active = ctx.goals.by_status(GoalStatus::Active).len();
            format!(
                "You have {} active goals with {} saved of {} overall.",
                active,
                format_inr(summary.total_saved),
                format_inr(summary.total_target)
            )
        }
        Intent::Bill => {
            let due = ctx.reminders.due_within(ctx.today, 7);
            match due.first() {
                None => "No bills are due in the next 7 days.".to_string(),
                Some(next) => format!(
                    "{} bills due this week. Next: {} for {} on {}.",
                    due.len(),
                    next.title,
                    format_inr(next.amount),
                    next.due_date.format("%d %b")
                ),
            }
        }
        Intent::Scheme => {
            let query = EligibilityQuery {
                annual_income: ctx.plan.monthly_income * 12.0,
                state: ctx.state.to_string(),
                category: None,
            };
            match eligible(&query) {
                Ok(schemes) if !schemes.is_empty() => {
                    let names: Vec<&str> = schemes.iter().map(|s| s.name).collect();
                    format!("You may be eligible for: {}.", names.join(", "))
                }
                _ => "Open the Schemes page to check your eligibility.".to_string(),
            }
        }
        Intent::Tip => random_tip(rng).to_string(),
    };

    AssistantReply { intent, answer }
}

pub fn random_tip<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    TIPS.choose(rng).copied().unwrap_or(TIPS[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::expenses::tests::{date, sample_ledger};
    use crate::pages::goals::{NewGoal, Priority};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn ask(question: &str) -> AssistantReply {
        let banking = OnlineBanking::new(50000.0);
        let ledger = sample_ledger();
        let plan = BudgetPlan::new(40000.0);
        let mut goals = GoalTracker::new();
        goals
            .add(NewGoal {
                title: "Emergency fund".to_string(),
                target_amount: 100000.0,
                current_amount: 25000.0,
                deadline: date(2025, 12, 31),
                priority: Priority::High,
                category: "Savings".to_string(),
            })
            .unwrap();
        let reminders = ReminderBoard::new();
        let ctx = AssistantContext {
            today: date(2025, 1, 25),
            banking: &banking,
            ledger: &ledger,
            plan: &plan,
            goals: &goals,
            reminders: &reminders,
            state: "Tamil Nadu",
        };
        let mut rng = SmallRng::seed_from_u64(3);
        answer(&mut rng, question, &ctx)
    }

    #[test]
    fn test_intent_detection() {
        assert_eq!(Intent::detect("What's my BANK balance?"), Intent::Balance);
        assert_eq!(Intent::detect("how much did I spend"), Intent::Budget);
        assert_eq!(Intent::detect("goal progress"), Intent::Goal);
        assert_eq!(Intent::detect("any bills due?"), Intent::Bill);
        assert_eq!(Intent::detect("subsidy for me"), Intent::Scheme);
        assert_eq!(Intent::detect("hello"), Intent::Tip);
    }

    #[test]
    fn test_answers_from_live_data() {
        assert_eq!(ask("balance").answer, "Your account balance is ₹50,000.");
        assert!(ask("what did I spend").answer.contains("₹21,000"));
        assert_eq!(
            ask("goal progress").answer,
            "You have 1 active goals with ₹25,000 saved of ₹1,00,000 overall."
        );
        assert_eq!(ask("bills").answer, "No bills are due in the next 7 days.");
        assert!(ask("schemes").answer.contains("PM-KISAN"));
    }

    #[test]
    fn test_fallback_is_a_tip() {
        let reply = ask("tell me something");
        assert_eq!(reply.intent, Intent::Tip);
        assert!(TIPS.contains(&reply.answer.as_str()));
    }
}
