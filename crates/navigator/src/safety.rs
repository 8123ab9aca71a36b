use rand::Rng;

/// Safety tier of one street. Hidden until the street is visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SafetyTier {
    Safe,
    Caution,
    Unsafe,
}

/// Fixed panel copy for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetyInfo {
    pub icon: &'static str,
    pub status: &'static str,
    pub message: &'static str,
    pub tips: &'static str,
}

const SAFE_INFO: SafetyInfo = SafetyInfo {
    icon: "✅",
    status: "Safe Zone",
    message: "Street is safe",
    tips: "This area has good lighting, regular foot traffic, and security presence. Safe for walking at all times.",
};

const CAUTION_INFO: SafetyInfo = SafetyInfo {
    icon: "⚠️",
    status: "Caution Zone",
    message: "Be careful",
    tips: "Exercise caution in this area. Stay alert, avoid walking alone late at night, and consider alternate routes if possible.",
};

const UNSAFE_INFO: SafetyInfo = SafetyInfo {
    icon: "🚨",
    status: "Unsafe Zone",
    message: "Danger detected",
    tips: "HIGH RISK AREA: Poor lighting, isolated location, or recent incidents reported. Avoid if possible, especially after dark.",
};

impl SafetyTier {
    pub const ALL: [SafetyTier; 3] = [Self::Safe, Self::Caution, Self::Unsafe];

    /// Uniform pick over the three tiers.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn info(self) -> &'static SafetyInfo {
        match self {
            Self::Safe => &SAFE_INFO,
            Self::Caution => &CAUTION_INFO,
            Self::Unsafe => &UNSAFE_INFO,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Caution => "caution",
            Self::Unsafe => "unsafe",
        }
    }
}

impl std::fmt::Display for SafetyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
