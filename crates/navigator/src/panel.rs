use crate::safety::{SafetyInfo, SafetyTier};
use crate::street::StreetName;

pub const INITIAL_PROMPT_TITLE: &str = "🚶‍♀️ Start Exploring";
pub const INITIAL_PROMPT_BODY: &str = "Use arrow keys to navigate through the streets. \
Safety information will be revealed as you explore different areas.";

/// Snapshot of the revealed street shown in the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetyReport {
    pub street: StreetName,
    pub tier: SafetyTier,
}

impl SafetyReport {
    pub fn info(&self) -> &'static SafetyInfo {
        self.tier.info()
    }

    /// `"<status> – <message>"`, e.g. `"Caution Zone – Be careful"`.
    pub fn headline(&self) -> String {
        let info = self.info();
        format!("{} – {}", info.status, info.message)
    }

    pub fn description(&self) -> &'static str {
        self.street.description()
    }
}

/// Content of the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SafetyPanel {
    #[default]
    Prompt,
    Report(SafetyReport),
}

impl SafetyPanel {
    pub fn report(&self) -> Option<&SafetyReport> {
        match self {
            Self::Prompt => None,
            Self::Report(report) => Some(report),
        }
    }

    pub fn class_name(&self) -> String {
        match self {
            Self::Prompt => "safety-panel".to_string(),
            Self::Report(report) => format!("safety-panel {}", report.tier),
        }
    }
}
