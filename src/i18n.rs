// 🌐 Language selection and UI label dictionaries
//
// Lookups fall back to English, then to the key itself, so a missing
// translation never blanks a label.

use crate::error::Result;
use crate::storage::{keys, LocalStore};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "ta")]
    Tamil,
    #[serde(rename = "te")]
    Telugu,
    #[serde(rename = "kn")]
    Kannada,
    #[serde(rename = "ml")]
    Malayalam,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::English,
        Language::Hindi,
        Language::Tamil,
        Language::Telugu,
        Language::Kannada,
        Language::Malayalam,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::Tamil => "ta",
            Language::Telugu => "te",
            Language::Kannada => "kn",
            Language::Malayalam => "ml",
        }
    }

    /// Accepts `ta`, `TA`, `ta-IN`, `ta_IN`.
    pub fn from_code(code: &str) -> Option<Self> {
        let base = code
            .trim()
            .split(|c| c == '-' || c == '_')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();

        Language::ALL.into_iter().find(|lang| lang.code() == base)
    }

    pub fn native_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "हिन्दी",
            Language::Tamil => "தமிழ்",
            Language::Telugu => "తెలుగు",
            Language::Kannada => "ಕನ್ನಡ",
            Language::Malayalam => "മലയാളം",
        }
    }

    fn dictionary(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Language::English => EN,
            Language::Hindi => HI,
            Language::Tamil => TA,
            Language::Telugu => TE,
            Language::Kannada => KN,
            Language::Malayalam => ML,
        }
    }
}

/// Translate one label.
pub fn translate(lang: Language, key: &str) -> String {
    lookup(lang.dictionary(), key)
        .or_else(|| lookup(EN, key))
        .map(str::to_string)
        .unwrap_or_else(|| key.to_string())
}

/// Every English key resolved for `lang`, for clients that cache the table.
pub fn translations(lang: Language) -> Vec<(&'static str, String)> {
    EN.iter().map(|(key, _)| (*key, translate(lang, key))).collect()
}

fn lookup(dict: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    dict.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

// ============================================================================
// LANGUAGE STATE
// ============================================================================

/// Process-wide language choice, persisted as a raw code string.
pub struct LanguageState {
    current: Language,
}

impl LanguageState {
    pub fn load(store: &LocalStore) -> Result<Self> {
        let current = match store.get_raw(keys::LANGUAGE)? {
            Some(code) => Language::from_code(&code).unwrap_or_else(|| {
                warn!(code = %code, "unknown stored language, using English");
                Language::English
            }),
            None => Language::English,
        };
        Ok(LanguageState { current })
    }

    pub fn current(&self) -> Language {
        self.current
    }

    pub fn set_language(&mut self, store: &LocalStore, lang: Language) -> Result<()> {
        store.set_raw(keys::LANGUAGE, lang.code())?;
        self.current = lang;
        info!(language = lang.code(), "language changed");
        Ok(())
    }

    pub fn t(&self, key: &str) -> String {
        translate(self.current, key)
    }
}

// ============================================================================
// DICTIONARIES
// ============================================================================

const EN: &[(&str, &str)] = &[
    ("dashboard", "Dashboard"),
    ("expenses", "Expenses"),
    ("analytics", "Analytics"),
    ("budgetPlanner", "Budget Planner"),
    ("goals", "Goals Tracker"),
    ("reminders", "Notifications & Reminders"),
    ("banking", "Online Banking"),
    ("passwords", "Password Manager"),
    ("healthcare", "Healthcare"),
    ("schemes", "Subsidy Scheme Checker"),
    ("ott", "OTT Subscriptions"),
    ("clothing", "Fashion & Clothing"),
    ("microInvestment", "Micro Investments"),
    ("familyBudget", "Family Budget"),
    ("summary", "Printable Summary"),
    ("profile", "Profile"),
    ("voiceAssistant", "Voice Assistant"),
    ("sectionOverview", "Overview"),
    ("sectionPlanning", "Planning"),
    ("sectionServices", "Services"),
    ("sectionLifestyle", "Lifestyle"),
    ("sectionAccount", "Account"),
    ("totalIncome", "Total Income"),
    ("totalExpenses", "Total Expenses"),
    ("savings", "Savings"),
    ("savingsRate", "Savings Rate"),
    ("recentExpenses", "Recent Expenses"),
    ("upcomingBills", "Upcoming Bills"),
    ("addExpense", "Add Expense"),
    ("welcome", "Welcome"),
    ("login", "Login"),
    ("logout", "Logout"),
    ("language", "Language"),
];

const HI: &[(&str, &str)] = &[
    ("dashboard", "डैशबोर्ड"),
    ("expenses", "खर्च"),
    ("analytics", "विश्लेषण"),
    ("budgetPlanner", "बजट योजनाकार"),
    ("goals", "लक्ष्य ट्रैकर"),
    ("reminders", "सूचनाएं और अनुस्मारक"),
    ("banking", "ऑनलाइन बैंकिंग"),
    ("passwords", "पासवर्ड प्रबंधक"),
    ("healthcare", "स्वास्थ्य सेवा"),
    ("schemes", "सब्सिडी योजना जांच"),
    ("familyBudget", "परिवार बजट"),
    ("profile", "प्रोफ़ाइल"),
    ("totalIncome", "कुल आय"),
    ("totalExpenses", "कुल खर्च"),
    ("savings", "बचत"),
    ("recentExpenses", "हाल के खर्च"),
    ("addExpense", "खर्च जोड़ें"),
    ("welcome", "स्वागत है"),
    ("login", "लॉग इन"),
    ("logout", "लॉग आउट"),
    ("language", "भाषा"),
];

const TA: &[(&str, &str)] = &[
    ("dashboard", "முகப்பு"),
    ("expenses", "செலவுகள்"),
    ("analytics", "பகுப்பாய்வு"),
    ("budgetPlanner", "பட்ஜெட் திட்டம்"),
    ("goals", "இலக்குகள்"),
    ("reminders", "நினைவூட்டல்கள்"),
    ("banking", "இணைய வங்கி"),
    ("passwords", "கடவுச்சொல் மேலாளர்"),
    ("healthcare", "சுகாதாரம்"),
    ("schemes", "அரசு திட்டங்கள்"),
    ("familyBudget", "குடும்ப பட்ஜெட்"),
    ("profile", "சுயவிவரம்"),
    ("totalIncome", "மொத்த வருமானம்"),
    ("totalExpenses", "மொத்த செலவுகள்"),
    ("savings", "சேமிப்பு"),
    ("addExpense", "செலவைச் சேர்"),
    ("welcome", "வணக்கம்"),
    ("logout", "வெளியேறு"),
    ("language", "மொழி"),
];

const TE: &[(&str, &str)] = &[
    ("dashboard", "డాష్‌బోర్డ్"),
    ("expenses", "ఖర్చులు"),
    ("goals", "లక్ష్యాలు"),
    ("totalIncome", "మొత్తం ఆదాయం"),
    ("totalExpenses", "మొత్తం ఖర్చులు"),
    ("savings", "పొదుపు"),
    ("welcome", "స్వాగతం"),
    ("language", "భాష"),
];

const KN: &[(&str, &str)] = &[
    ("dashboard", "ಡ್ಯಾಶ್‌ಬೋರ್ಡ್"),
    ("expenses", "ಖರ್ಚುಗಳು"),
    ("goals", "ಗುರಿಗಳು"),
    ("totalIncome", "ಒಟ್ಟು ಆದಾಯ"),
    ("savings", "ಉಳಿತಾಯ"),
    ("welcome", "ಸ್ವಾಗತ"),
    ("language", "ಭಾಷೆ"),
];

const ML: &[(&str, &str)] = &[
    ("dashboard", "ഡാഷ്ബോർഡ്"),
    ("expenses", "ചെലവുകൾ"),
    ("goals", "ലക്ഷ്യങ്ങൾ"),
    ("totalIncome", "ആകെ വരുമാനം"),
    ("savings", "സമ്പാദ്യം"),
    ("welcome", "സ്വാഗതം"),
    ("language", "ഭാഷ"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_variants() {
        assert_eq!(Language::from_code("ta"), Some(Language::Tamil));
        assert_eq!(Language::from_code("HI"), Some(Language::Hindi));
        assert_eq!(Language::from_code("ml-IN"), Some(Language::Malayalam));
        assert_eq!(Language::from_code("fr"), None);
    }

    #[test]
    fn test_translate_falls_back_to_english_then_key() {
        assert_eq!(translate(Language::Tamil, "savings"), "சேமிப்பு");
        // Telugu has no entry for "analytics"
        assert_eq!(translate(Language::Telugu, "analytics"), "Analytics");
        assert_eq!(translate(Language::Hindi, "noSuchLabel"), "noSuchLabel");
    }

    #[test]
    fn test_every_dictionary_key_exists_in_english() {
        for lang in Language::ALL {
            for (key, _) in lang.dictionary() {
                assert!(lookup(EN, key).is_some(), "{} has stray key {}", lang.code(), key);
            }
        }
    }

    #[test]
    fn test_translations_cover_english_keys() {
        let table = translations(Language::Kannada);
        assert_eq!(table.len(), EN.len());
        assert!(table.contains(&("welcome", "ಸ್ವಾಗತ".to_string())));
    }

    #[test]
    fn test_language_state_persists_raw_code() {
        let store = LocalStore::open_in_memory().unwrap();
        let mut state = LanguageState::load(&store).unwrap();
        assert_eq!(state.current(), Language::English);

        state.set_language(&store, Language::Tamil).unwrap();
        assert_eq!(store.get_raw(keys::LANGUAGE).unwrap().as_deref(), Some("ta"));
        assert_eq!(LanguageState::load(&store).unwrap().t("welcome"), "வணக்கம்");
    }

    #[test]
    fn test_unknown_stored_language_falls_back() {
        let store = LocalStore::open_in_memory().unwrap();
        store.set_raw(keys::LANGUAGE, "xx").unwrap();
        assert_eq!(LanguageState::load(&store).unwrap().current(), Language::English);
    }
}
