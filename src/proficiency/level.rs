//! Proficiency tiers and the ordered scale they live on
//!
//! Six CEFR-style ranks, lowest first. Moving along the scale never wraps.

use serde::{Deserialize, Serialize};

/// A learner's proficiency tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProficiencyTier {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

/// All tiers in ascending order
pub const ALL_TIERS: [ProficiencyTier; 6] = [
    ProficiencyTier::A1,
    ProficiencyTier::A2,
    ProficiencyTier::B1,
    ProficiencyTier::B2,
    ProficiencyTier::C1,
    ProficiencyTier::C2,
];

impl ProficiencyTier {
    /// Zero-based position on the scale
    pub fn rank(self) -> usize {
        match self {
            ProficiencyTier::A1 => 0,
            ProficiencyTier::A2 => 1,
            ProficiencyTier::B1 => 2,
            ProficiencyTier::B2 => 3,
            ProficiencyTier::C1 => 4,
            ProficiencyTier::C2 => 5,
        }
    }

    /// Tier at a given rank, if any
    pub fn from_rank(rank: usize) -> Option<Self> {
        ALL_TIERS.get(rank).copied()
    }

    /// The tier one step up, or `None` at the top
    pub fn next(self) -> Option<Self> {
        Self::from_rank(self.rank() + 1)
    }

    /// The tier one step down, or `None` at the bottom
    pub fn previous(self) -> Option<Self> {
        self.rank().checked_sub(1).and_then(Self::from_rank)
    }

    /// Parse a tier label such as "b1" or "B1"
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "A1" => Some(ProficiencyTier::A1),
            "A2" => Some(ProficiencyTier::A2),
            "B1" => Some(ProficiencyTier::B1),
            "B2" => Some(ProficiencyTier::B2),
            "C1" => Some(ProficiencyTier::C1),
            "C2" => Some(ProficiencyTier::C2),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProficiencyTier::A1 => "A1",
            ProficiencyTier::A2 => "A2",
            ProficiencyTier::B1 => "B1",
            ProficiencyTier::B2 => "B2",
            ProficiencyTier::C1 => "C1",
            ProficiencyTier::C2 => "C2",
        }
    }
}

impl std::fmt::Display for ProficiencyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProficiencyTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown proficiency tier: {}", s))
    }
}
