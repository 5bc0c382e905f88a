use thiserror::Error;

/// Failures raised by a debtor store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("debtor {0} not found")]
    UnknownDebtor(i64),
    #[error("invalid stored value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Error)]
pub enum RiskError {
    #[error("configuration error: {0}")]
    Config(#[from] crate::commands::settings::ConfigError),
    #[error("could not open debtor database {database}: {source}")]
    Connection {
        database: String,
        #[source]
        source: StoreError,
    },
    #[error("failed to fetch debtors: {0}")]
    Fetch(#[source] StoreError),
    #[error("could not begin transaction: {0}")]
    Transaction(#[source] StoreError),
    #[error("failed to update debtor {id}; {issued} issued updates rolled back: {source}")]
    Update {
        id: i64,
        issued: usize,
        #[source]
        source: StoreError,
    },
    #[error("commit failed; {issued} issued updates rolled back: {source}")]
    Commit {
        issued: usize,
        #[source]
        source: StoreError,
    },
    #[error("{updated} debtors committed but the summary query failed: {source}")]
    Summary {
        updated: usize,
        #[source]
        source: StoreError,
    },
    #[error("query failed: {0}")]
    Query(#[source] StoreError),
    #[error("debtor {0} not found")]
    NotFound(i64),
    #[error("failed to render run report: {0}")]
    Render(#[from] serde_json::Error),
}

impl RiskError {
    /// Number of debtor updates that were durably committed before the failure.
    pub fn durable_updates(&self) -> usize {
        match self {
            RiskError::Summary { updated, .. } => *updated,
            _ => 0,
        }
    }
}
