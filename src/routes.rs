// 🧭 Routes - page catalogue, sidebar sections and path resolution
//
// Every page lives under /dashboard; the old top-level paths redirect.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Page {
    Dashboard,
    Expenses,
    Analytics,
    BudgetPlanner,
    Goals,
    Reminders,
    Banking,
    Passwords,
    Healthcare,
    Schemes,
    Ott,
    Clothing,
    MicroInvestment,
    FamilyBudget,
    Summary,
    Profile,
    VoiceAssistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Section {
    Overview,
    Planning,
    Services,
    Lifestyle,
    Account,
}

impl Section {
    pub fn title_key(self) -> &'static str {
        match self {
            Section::Overview => "sectionOverview",
            Section::Planning => "sectionPlanning",
            Section::Services => "sectionServices",
            Section::Lifestyle => "sectionLifestyle",
            Section::Account => "sectionAccount",
        }
    }
}

impl Page {
    /// Sidebar order.
    pub const ALL: [Page; 17] = [
        Page::Dashboard,
        Page::Expenses,
        Page::Analytics,
        Page::BudgetPlanner,
        Page::Goals,
        Page::Reminders,
        Page::FamilyBudget,
        Page::Banking,
        Page::Passwords,
        Page::Healthcare,
        Page::Schemes,
        Page::Ott,
        Page::Clothing,
        Page::MicroInvestment,
        Page::Summary,
        Page::Profile,
        Page::VoiceAssistant,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Page::Dashboard => "",
            Page::Expenses => "expenses",
            Page::Analytics => "analytics",
            Page::BudgetPlanner => "budget-planner",
            Page::Goals => "goals",
            Page::Reminders => "reminders",
            Page::Banking => "banking",
            Page::Passwords => "passwords",
            Page::Healthcare => "healthcare",
            Page::Schemes => "schemes",
            Page::Ott => "ott",
            Page::Clothing => "clothing",
            Page::MicroInvestment => "micro-investment",
            Page::FamilyBudget => "family-budget",
            Page::Summary => "summary",
            Page::Profile => "profile",
            Page::VoiceAssistant => "voice-assistant",
        }
    }

    pub fn path(self) -> String {
        match self {
            Page::Dashboard => "/dashboard".to_string(),
            page => format!("/dashboard/{}", page.slug()),
        }
    }

    /// i18n key for the page heading and sidebar label.
    pub fn title_key(self) -> &'static str {
        match self {
            Page::Dashboard => "dashboard",
            Page::Expenses => "expenses",
            Page::Analytics => "analytics",
            Page::BudgetPlanner => "budgetPlanner",
            Page::Goals => "goals",
            Page::Reminders => "reminders",
            Page::Banking => "banking",
            Page::Passwords => "passwords",
            Page::Healthcare => "healthcare",
            Page::Schemes => "schemes",
            Page::Ott => "ott",
            Page::Clothing => "clothing",
            Page::MicroInvestment => "microInvestment",
            Page::FamilyBudget => "familyBudget",
            Page::Summary => "summary",
            Page::Profile => "profile",
            Page::VoiceAssistant => "voiceAssistant",
        }
    }

    pub fn section(self) -> Section {
        match self {
            Page::Dashboard | Page::Expenses | Page::Analytics => Section::Overview,
            Page::BudgetPlanner | Page::Goals | Page::Reminders | Page::FamilyBudget => {
                Section::Planning
            }
            Page::Banking | Page::Passwords | Page::Healthcare | Page::Schemes => {
                Section::Services
            }
            Page::Ott | Page::Clothing | Page::MicroInvestment => Section::Lifestyle,
            Page::Summary | Page::Profile | Page::VoiceAssistant => Section::Account,
        }
    }

    pub fn from_slug(slug: &str) -> Option<Page> {
        Page::ALL.into_iter().find(|p| p.slug() == slug)
    }

    fn index(self) -> usize {
        Page::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }

    pub fn next(self) -> Page {
        Page::ALL[(self.index() + 1) % Page::ALL.len()]
    }

    pub fn previous(self) -> Page {
        let len = Page::ALL.len();
        Page::ALL[(self.index() + len - 1) % len]
    }
}

// ============================================================================
// PATH RESOLUTION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Page(Page),
    Redirect(String),
    Login,
    Signup,
    NotFound,
}

/// Top-level paths from before everything moved under /dashboard.
const LEGACY_ALIASES: &[(&str, Page)] = &[
    ("budget", Page::BudgetPlanner),
    ("goals-tracker", Page::Goals),
    ("notifications", Page::Reminders),
    ("password-manager", Page::Passwords),
    ("online-banking", Page::Banking),
    ("subsidy-schemes", Page::Schemes),
    ("fashion", Page::Clothing),
    ("printable-summary", Page::Summary),
];

pub fn resolve(path: &str) -> Route {
    let path = path.split(['?', '#']).next().unwrap_or("");
    let trimmed = path.trim_end_matches('/');

    match trimmed {
        "" => return Route::Redirect(Page::Dashboard.path()),
        "/login" => return Route::Login,
        "/signup" => return Route::Signup,
        "/dashboard" => return Route::Page(Page::Dashboard),
        _ => {}
    }

    if let Some(slug) = trimmed.strip_prefix("/dashboard/") {
        return match Page::from_slug(slug) {
            Some(page) if page != Page::Dashboard => Route::Page(page),
            _ => Route::NotFound,
        };
    }

    let Some(slug) = trimmed.strip_prefix('/') else {
        return Route::NotFound;
    };

    if let Some((_, page)) = LEGACY_ALIASES.iter().find(|(alias, _)| *alias == slug) {
        return Route::Redirect(page.path());
    }

    match Page::from_slug(slug) {
        Some(page) if page != Page::Dashboard => Route::Redirect(page.path()),
        _ => Route::NotFound,
    }
}

/// Sidebar sections in display order with their pages.
pub fn sidebar() -> Vec<(Section, Vec<Page>)> {
    let mut sections: Vec<(Section, Vec<Page>)> = Vec::new();
    for page in Page::ALL {
        match sections.last_mut() {
            Some((section, pages)) if *section == page.section() => pages.push(page),
            _ => sections.push((page.section(), vec![page])),
        }
    }
    sections
}
