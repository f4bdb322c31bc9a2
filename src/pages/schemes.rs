// 🏛️ Subsidy Scheme Checker - static catalogue + eligibility scan

use crate::error::{BudgetError, Result};
use crate::storage::{keys, Persisted};
use crate::validation::Validator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scheme {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    /// Maximum annual household income; `None` means open to all.
    pub income_limit: Option<f64>,
    /// Empty means nationwide.
    pub states: &'static [&'static str],
    pub benefit: &'static str,
    pub description: &'static str,
}

impl Scheme {
    pub fn is_nationwide(&self) -> bool {
        self.states.is_empty()
    }

    pub fn accepts_income(&self, annual_income: f64) -> bool {
        self.income_limit.map_or(true, |limit| annual_income <= limit)
    }

    pub fn accepts_state(&self, state: &str) -> bool {
        self.is_nationwide() || self.states.iter().any(|s| s.eq_ignore_ascii_case(state.trim()))
    }
}

pub const SCHEMES: &[Scheme] = &[
    Scheme {
        id: "pm-kisan",
        name: "PM-KISAN",
        category: "Agriculture",
        income_limit: Some(600000.0),
        states: &[],
        benefit: "₹6,000 a year in three instalments",
        description: "Income support for landholding farmer families.",
    },
    Scheme {
        id: "lpg-subsidy",
        name: "LPG Subsidy (PAHAL / PM Ujjwala)",
        category: "Energy",
        income_limit: Some(1000000.0),
        states: &[],
        benefit: "Subsidy credited to bank account per cylinder",
        description: "Direct benefit transfer on domestic LPG refills.",
    },
    Scheme {
        id: "pmay-urban",
        name: "PMAY-Urban (EWS/LIG)",
        category: "Housing",
        income_limit: Some(300000.0),
        states: &[],
        benefit: "Interest subsidy up to ₹2.67 lakh on home loans",
        description: "Pradhan Mantri Awas Yojana for economically weaker sections.",
    },
    Scheme {
        id: "ayushman-bharat",
        name: "Ayushman Bharat PM-JAY",
        category: "Health",
        income_limit: Some(500000.0),
        states: &[],
        benefit: "Health cover of ₹5 lakh per family per year",
        description: "Cashless hospitalisation at empanelled hospitals.",
    },
    Scheme {
        id: "sukanya-samriddhi",
        name: "Sukanya Samriddhi Yojana",
        category: "Savings",
        income_limit: None,
        states: &[],
        benefit: "Tax-free interest on savings for a girl child",
        description: "Small savings scheme under Beti Bachao Beti Padhao.",
    },
    Scheme {
        id: "atal-pension",
        name: "Atal Pension Yojana",
        category: "Pension",
        income_limit: None,
        states: &[],
        benefit: "Guaranteed pension of ₹1,000 to ₹5,000 a month",
        description: "Pension scheme for unorganised sector workers.",
    },
    Scheme {
        id: "tn-magalir-urimai",
        name: "Kalaignar Magalir Urimai Thogai",
        category: "Women",
        income_limit: Some(250000.0),
        states: &["Tamil Nadu"],
        benefit: "₹1,000 a month to women heads of family",
        description: "Tamil Nadu monthly entitlement for women.",
    },
    Scheme {
        id: "tn-cmchis",
        name: "CM Comprehensive Health Insurance Scheme",
        category: "Health",
        income_limit: Some(120000.0),
        states: &["Tamil Nadu"],
        benefit: "Health cover of ₹5 lakh per family",
        description: "Tamil Nadu state health insurance.",
    },
    Scheme {
        id: "ka-gruha-jyothi",
        name: "Gruha Jyothi",
        category: "Energy",
        income_limit: None,
        states: &["Karnataka"],
        benefit: "Up to 200 units of free electricity a month",
        description: "Karnataka household electricity scheme.",
    },
];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityQuery {
    pub annual_income: f64,
    pub state: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// Linear scan of the catalogue; order is preserved.
pub fn eligible(query: &EligibilityQuery) -> Result<Vec<&'static Scheme>> {
    Validator::new("EligibilityQuery")
        .require_non_negative("annualIncome", query.annual_income, "Annual income")
        .require_text("state", &query.state, "your state")
        .finish()?;

    Ok(SCHEMES
        .iter()
        .filter(|s| s.accepts_income(query.annual_income))
        .filter(|s| s.accepts_state(&query.state))
        .filter(|s| {
            query
                .category
                .as_deref()
                .map_or(true, |c| c.trim().is_empty() || s.category.eq_ignore_ascii_case(c.trim()))
        })
        .collect())
}

pub fn find_scheme(id: &str) -> Option<&'static Scheme> {
    SCHEMES.iter().find(|s| s.id == id)
}

// ============================================================================
// NOTIFICATIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeSubscription {
    pub scheme_id: String,
    pub subscribed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemeNotifications {
    subscriptions: Vec<SchemeSubscription>,
}

impl SchemeNotifications {
    pub fn all(&self) -> &[SchemeSubscription] {
        &self.subscriptions
    }

    pub fn is_subscribed(&self, scheme_id: &str) -> bool {
        self.subscriptions.iter().any(|s| s.scheme_id == scheme_id)
    }

    /// Subscribing twice is a no-op.
    pub fn subscribe(&mut self, scheme_id: &str) -> Result<&'static Scheme> {
        let scheme = find_scheme(scheme_id).ok_or_else(|| BudgetError::not_found("scheme", scheme_id))?;
        if !self.is_subscribed(scheme_id) {
            self.subscriptions.push(SchemeSubscription {
                scheme_id: scheme.id.to_string(),
                subscribed_at: Utc::now(),
            });
            info!(scheme = scheme.id, "scheme notifications on");
        }
        Ok(scheme)
    }

    pub fn unsubscribe(&mut self, scheme_id: &str) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.scheme_id != scheme_id);
        before != self.subscriptions.len()
    }

    pub fn schemes(&self) -> Vec<&'static Scheme> {
        self.subscriptions
            .iter()
            .filter_map(|s| find_scheme(&s.scheme_id))
            .collect()
    }
}

impl Persisted for SchemeNotifications {
    const STORAGE_KEY: &'static str = keys::SCHEME_NOTIFICATIONS;

    fn seed() -> Self {
        SchemeNotifications::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(income: f64, state: &str) -> EligibilityQuery {
        EligibilityQuery {
            annual_income: income,
            state: state.to_string(),
            category: None,
        }
    }

    fn ids(schemes: &[&Scheme]) -> Vec<&'static str> {
        schemes.iter().map(|s| s.id).collect()
    }

    #[test]
    fn test_tamil_nadu_low_income() {
        let result = eligible(&query(240000.0, "Tamil Nadu")).unwrap();
        let ids = ids(&result);

        assert!(ids.contains(&"lpg-subsidy"));
        assert!(ids.contains(&"pm-kisan"));
        assert!(ids.contains(&"pmay-urban"));
        assert!(ids.contains(&"tn-magalir-urimai"));
        assert!(!ids.contains(&"tn-cmchis"));
        assert!(!ids.contains(&"ka-gruha-jyothi"));
    }

    #[test]
    fn test_pmay_excluded_only_above_its_limit() {
        let at_limit = eligible(&query(300000.0, "Tamil Nadu")).unwrap();
        assert!(ids(&at_limit).contains(&"pmay-urban"));

        let above = eligible(&query(300001.0, "Tamil Nadu")).unwrap();
        let above = ids(&above);
        assert!(!above.contains(&"pmay-urban"));
        assert!(above.contains(&"lpg-subsidy"));
    }

    #[test]
    fn test_state_match_is_case_insensitive() {
        let result = eligible(&query(500000.0, " karnataka ")).unwrap();
        assert!(ids(&result).contains(&"ka-gruha-jyothi"));
    }

    #[test]
    fn test_category_filter() {
        let mut q = query(100000.0, "Tamil Nadu");
        q.category = Some("health".to_string());
        let result = eligible(&q).unwrap();
        assert_eq!(ids(&result), vec!["ayushman-bharat", "tn-cmchis"]);
    }

    #[test]
    fn test_query_validation() {
        assert!(eligible(&query(-1.0, "Kerala")).is_err());
        assert!(eligible(&query(1.0, "")).is_err());
    }

    #[test]
    fn test_subscriptions() {
        let mut notes = SchemeNotifications::default();
        notes.subscribe("pm-kisan").unwrap();
        notes.subscribe("pm-kisan").unwrap();
        assert_eq!(notes.all().len(), 1);
        assert!(notes.subscribe("unknown").is_err());

        assert_eq!(notes.schemes()[0].name, "PM-KISAN");
        assert!(notes.unsubscribe("pm-kisan"));
        assert!(!notes.unsubscribe("pm-kisan"));
    }
}
