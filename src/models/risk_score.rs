use super::priority::PriorityTier;
use serde::{Deserialize, Serialize};

/// Weighted contributions of each scoring component (0–100 total)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskBreakdown {
    pub debt: f64,
    pub overdue: f64,
    pub history: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: f64,
    pub priority_tier: PriorityTier,
}

/// A debtor after scoring, as reported for each processed row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDebtor {
    pub id: i64,
    pub name: String,
    pub debt_amount: f64,
    pub days_overdue: u32,
    pub score: f64,
    pub priority_tier: PriorityTier,
}
