use crate::models::risk_score::RiskBreakdown;

/// Debt amount at which the debt component saturates.
pub const DEBT_CEILING: f64 = 50_000.0;
/// Days overdue at which the overdue component saturates.
pub const OVERDUE_CEILING_DAYS: f64 = 180.0;

pub const DEBT_WEIGHT: f64 = 0.30;
pub const OVERDUE_WEIGHT: f64 = 0.50;

/// History contribution steps, as (inclusive upper bound in days, points).
/// Anything past the last bound earns `HISTORY_MAX_POINTS`.
pub const HISTORY_STEPS: [(u32, f64); 3] = [(0, 0.0), (30, 10.0), (60, 15.0)];
pub const HISTORY_MAX_POINTS: f64 = 20.0;

/// Compute the collection risk score (0–100, two decimals)
/// - Debt amount: 30% weight, normalized against 50,000
/// - Days overdue: 50% weight, normalized against 180 days
/// - Payment history: absolute step of 0 / 10 / 15 / 20 points
pub fn compute_risk_score(debt_amount: f64, days_overdue: u32) -> f64 {
    risk_breakdown(debt_amount, days_overdue).total
}

pub fn risk_breakdown(debt_amount: f64, days_overdue: u32) -> RiskBreakdown {
    let debt = debt_component(debt_amount);
    let overdue = overdue_component(days_overdue);
    let history = history_component(days_overdue);

    RiskBreakdown {
        debt,
        overdue,
        history,
        total: round_to_cents(debt + overdue + history),
    }
}

pub fn debt_component(debt_amount: f64) -> f64 {
    normalize(debt_amount, DEBT_CEILING) * DEBT_WEIGHT
}

pub fn overdue_component(days_overdue: u32) -> f64 {
    normalize(f64::from(days_overdue), OVERDUE_CEILING_DAYS) * OVERDUE_WEIGHT
}

pub fn history_component(days_overdue: u32) -> f64 {
    HISTORY_STEPS
        .iter()
        .find(|(upper, _)| days_overdue <= *upper)
        .map(|(_, points)| *points)
        .unwrap_or(HISTORY_MAX_POINTS)
}

/// Scale against a ceiling onto 0–100, saturating above the ceiling.
fn normalize(value: f64, ceiling: f64) -> f64 {
    (value / ceiling * 100.0).min(100.0)
}

/// Round half away from zero to two decimals.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
