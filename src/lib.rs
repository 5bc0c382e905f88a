pub mod analysis;
pub mod commands;
pub mod error;
pub mod models;

pub use analysis::priority::classify_priority;
pub use analysis::risk::compute_risk_score;
pub use commands::db::{DebtorStore, SqliteDebtorStore};
pub use commands::scoring::{run_risk_pass, run_risk_pass_internal};
pub use commands::settings::{AppConfig, StoreConfig};
pub use error::{RiskError, StoreError};
