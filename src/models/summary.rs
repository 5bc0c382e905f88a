use super::priority::PriorityTier;
use super::risk_score::ScoredDebtor;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub tier: PriorityTier,
    pub count: usize,
    pub total_debt: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: i64,
    pub records: Vec<ScoredDebtor>,
    pub updated_count: usize,
    pub summary: Vec<SummaryRow>, // zero-member tiers are absent
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStatistics {
    pub total_debtors: usize,
    pub total_debt: f64,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}
