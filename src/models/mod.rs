pub mod debtor;
pub mod priority;
pub mod risk_score;
pub mod summary;
