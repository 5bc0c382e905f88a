use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label persisted for debtors that have not been scored yet.
pub const PENDING_LABEL: &str = "Pending";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriorityTier {
    High,
    Medium,
    Low,
}

impl PriorityTier {
    /// Domain order used by summaries and listings: most urgent first.
    pub const ORDERED: [PriorityTier; 3] = [PriorityTier::High, PriorityTier::Medium, PriorityTier::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityTier::High => "High",
            PriorityTier::Medium => "Medium",
            PriorityTier::Low => "Low",
        }
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for PriorityTier {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "High" => Ok(PriorityTier::High),
            "Medium" => Ok(PriorityTier::Medium),
            "Low" => Ok(PriorityTier::Low),
            other => Err(format!("unknown priority tier: {other}")),
        }
    }
}

/// Parses a stored tier column; `Pending` (or empty) means not yet scored.
pub fn parse_stored_tier(value: Option<&str>) -> Result<Option<PriorityTier>, String> {
    match value.map(str::trim) {
        None | Some("") | Some(PENDING_LABEL) => Ok(None),
        Some(label) => label.parse().map(Some),
    }
}

pub fn stored_tier_label(tier: Option<PriorityTier>) -> &'static str {
    tier.map(|t| t.as_str()).unwrap_or(PENDING_LABEL)
}
