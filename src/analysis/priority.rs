use crate::models::priority::PriorityTier;

pub const HIGH_THRESHOLD: f64 = 70.0;
pub const MEDIUM_THRESHOLD: f64 = 40.0;

/// Map a risk score onto its priority tier
/// - High: score >= 70
/// - Medium: 40 <= score < 70
/// - Low: score < 40
pub fn classify_priority(score: f64) -> PriorityTier {
    if score >= HIGH_THRESHOLD {
        PriorityTier::High
    } else if score >= MEDIUM_THRESHOLD {
        PriorityTier::Medium
    } else {
        PriorityTier::Low
    }
}
