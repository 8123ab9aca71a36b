use std::time::Duration;

/// Substrings that trigger the deferred crisis-resources message.
pub const CRISIS_KEYWORDS: [&str; 5] = [
    "suicide",
    "kill myself",
    "end it all",
    "don't want to live",
    "harm myself",
];

/// Delay between the triggering user message and the resources bubble.
pub const CRISIS_FOLLOW_UP_DELAY: Duration = Duration::from_secs(1);

pub const CRISIS_RESOURCES: &str = "🆘 CRISIS RESOURCES 🆘

IMMEDIATE HELP:
• US: National Suicide Prevention Lifeline - 988
• US: Crisis Text Line - Text HOME to 741741
• Emergency Services: 911 (US), 999 (UK), 112 (EU)

If you're having thoughts of self-harm or suicide, please reach out immediately:
• Call emergency services
• Contact a trusted friend or family member
• Go to your nearest emergency room
• Call a crisis helpline

Remember: You are not alone, and help is available. 💙

Would you like to talk about what you're going through?";

/// A crisis follow-up that the caller must schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrisisAlert {
    pub delay: Duration,
}

/// Case-insensitive substring match against [`CRISIS_KEYWORDS`].
pub fn contains_crisis_keywords(text: &str) -> bool {
    let lowered = text.to_lowercase();
    CRISIS_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_every_keyword_regardless_of_case() {
        for keyword in CRISIS_KEYWORDS {
            let upper = format!("Honestly I think {}", keyword.to_uppercase());
            assert!(contains_crisis_keywords(&upper), "missed {keyword}");
        }
    }

    #[test]
    fn ignores_ordinary_text() {
        assert!(!contains_crisis_keywords("Hello, how are you today?"));
        assert!(!contains_crisis_keywords("I want to live near the harbour"));
        assert!(!contains_crisis_keywords(""));
    }

    #[test]
    fn matches_inside_longer_sentences() {
        assert!(contains_crisis_keywords(
            "sometimes I feel like I want to kill myself."
        ));
        assert!(contains_crisis_keywords("I just don't want to live anymore"));
    }
}
