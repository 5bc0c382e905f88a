use crate::analysis::priority::classify_priority;
use crate::analysis::risk::risk_breakdown;
use crate::commands::db::{DebtorStore, SqliteDebtorStore};
use crate::commands::settings::StoreConfig;
use crate::error::RiskError;
use crate::models::debtor::DebtorRecord;
use crate::models::priority::PriorityTier;
use crate::models::risk_score::{ScoreResult, ScoredDebtor};
use crate::models::summary::RunReport;

/// Score one debtor. Depends only on debt amount and days overdue.
pub fn score_debtor(debtor: &DebtorRecord) -> ScoreResult {
    let breakdown = risk_breakdown(debtor.debt_amount, debtor.days_overdue);
    log::debug!(
        "debtor {}: debt {:.4} + overdue {:.4} + history {:.1} = {:.2}",
        debtor.id,
        breakdown.debt,
        breakdown.overdue,
        breakdown.history,
        breakdown.total
    );

    ScoreResult {
        score: breakdown.total,
        priority_tier: classify_priority(breakdown.total),
    }
}

/// Open the configured store, run one pass and release the connection on every path.
pub fn run_risk_pass<F>(config: &StoreConfig, on_scored: F) -> Result<RunReport, RiskError>
where
    F: FnMut(&ScoredDebtor),
{
    let mut store = SqliteDebtorStore::open(&config.path, config.create_if_missing).map_err(|source| {
        RiskError::Connection {
            database: config.to_string(),
            source,
        }
    })?;
    log::info!("connected to debtor database {config}");

    let result = run_risk_pass_internal(&mut store, on_scored);

    match store.close() {
        Ok(()) => log::info!("debtor database connection closed"),
        Err(err) => log::warn!("failed to close debtor database cleanly: {err}"),
    }

    result
}

/// Fetch, score and update every debtor in a single transaction, then summarize.
pub fn run_risk_pass_internal<S, F>(store: &mut S, mut on_scored: F) -> Result<RunReport, RiskError>
where
    S: DebtorStore + ?Sized,
    F: FnMut(&ScoredDebtor),
{
    let start = std::time::Instant::now();
    let started_at = chrono::Utc::now().timestamp();

    let debtors = store.fetch_debtors().map_err(RiskError::Fetch)?;
    log::info!("processing {} debtors", debtors.len());

    store.begin().map_err(RiskError::Transaction)?;

    let mut records = Vec::with_capacity(debtors.len());
    for debtor in &debtors {
        let result = score_debtor(debtor);

        if let Err(source) = store.update_priority(debtor.id, result.priority_tier) {
            rollback_after_failure(store, records.len());
            return Err(RiskError::Update {
                id: debtor.id,
                issued: records.len(),
                source,
            });
        }

        let scored = ScoredDebtor {
            id: debtor.id,
            name: debtor.name.clone(),
            debt_amount: debtor.debt_amount,
            days_overdue: debtor.days_overdue,
            score: result.score,
            priority_tier: result.priority_tier,
        };
        on_scored(&scored);
        records.push(scored);
    }

    if let Err(source) = store.commit() {
        rollback_after_failure(store, records.len());
        return Err(RiskError::Commit {
            issued: records.len(),
            source,
        });
    }

    let updated_count = records.len();
    log::info!("committed priority updates for {updated_count} debtors");

    let summary = store
        .summarize_by_tier(&PriorityTier::ORDERED)
        .map_err(|source| RiskError::Summary {
            updated: updated_count,
            source,
        })?;

    Ok(RunReport {
        started_at,
        records,
        updated_count,
        summary,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

fn rollback_after_failure<S: DebtorStore + ?Sized>(store: &mut S, issued: usize) {
    match store.rollback() {
        Ok(()) => log::warn!("rolled back {issued} issued priority updates"),
        Err(err) => log::error!("rollback of {issued} issued priority updates failed: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::models::summary::SummaryRow;
    use std::collections::HashMap;

    fn refused(operation: &str) -> StoreError {
        StoreError::Sqlite(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            Some(format!("{operation} refused")),
        ))
    }

    /// In-memory store with staged updates and failure injection.
    #[derive(Default)]
    struct MemoryStore {
        debtors: Vec<DebtorRecord>,
        committed: HashMap<i64, PriorityTier>,
        staged: Vec<(i64, PriorityTier)>,
        in_transaction: bool,
        fail_fetch: bool,
        fail_update_on: Option<i64>,
        fail_commit: bool,
        fail_summary: bool,
        rollbacks: usize,
    }

    impl MemoryStore {
        fn with(rows: &[(i64, f64, u32)]) -> Self {
            Self {
                debtors: rows
                    .iter()
                    .map(|(id, debt_amount, days_overdue)| DebtorRecord {
                        id: *id,
                        name: format!("Debtor {id}"),
                        debt_amount: *debt_amount,
                        days_overdue: *days_overdue,
                    })
                    .collect(),
                ..Self::default()
            }
        }
    }

    impl DebtorStore for MemoryStore {
        fn fetch_debtors(&mut self) -> Result<Vec<DebtorRecord>, StoreError> {
            if self.fail_fetch {
                return Err(refused("fetch"));
            }
            Ok(self.debtors.clone())
        }

        fn begin(&mut self) -> Result<(), StoreError> {
            self.in_transaction = true;
            Ok(())
        }

        fn update_priority(&mut self, id: i64, tier: PriorityTier) -> Result<(), StoreError> {
            if self.fail_update_on == Some(id) {
                return Err(refused("update"));
            }
            self.staged.push((id, tier));
            Ok(())
        }

        fn commit(&mut self) -> Result<(), StoreError> {
            if self.fail_commit {
                return Err(refused("commit"));
            }
            self.committed.extend(self.staged.drain(..));
            self.in_transaction = false;
            Ok(())
        }

        fn rollback(&mut self) -> Result<(), StoreError> {
            self.staged.clear();
            self.in_transaction = false;
            self.rollbacks += 1;
            Ok(())
        }

        fn summarize_by_tier(&mut self, order: &[PriorityTier]) -> Result<Vec<SummaryRow>, StoreError> {
            if self.fail_summary {
                return Err(refused("summary"));
            }
            Ok(order
                .iter()
                .filter_map(|tier| {
                    let members: Vec<_> = self
                        .debtors
                        .iter()
                        .filter(|d| self.committed.get(&d.id) == Some(tier))
                        .collect();
                    (!members.is_empty()).then(|| SummaryRow {
                        tier: *tier,
                        count: members.len(),
                        total_debt: members.iter().map(|d| d.debt_amount).sum(),
                    })
                })
                .collect())
        }
    }

    #[test]
    fn scores_each_debtor_independently() {
        let high = score_debtor(&DebtorRecord {
            id: 1,
            name: "A".to_string(),
            debt_amount: 60_000.0,
            days_overdue: 200,
        });
        assert_eq!(high, ScoreResult { score: 100.0, priority_tier: PriorityTier::High });

        let medium = score_debtor(&DebtorRecord {
            id: 2,
            name: "B".to_string(),
            debt_amount: 25_000.0,
            days_overdue: 45,
        });
        // 15 + 12.5 + 15
        assert_eq!(medium.score, 42.5);
        assert_eq!(medium.priority_tier, PriorityTier::Medium);
    }

    #[test]
    fn end_to_end_scores_updates_and_summarizes() {
        let mut store = MemoryStore::with(&[(1, 60_000.0, 200), (2, 0.0, 0)]);
        let mut seen = Vec::new();

        let report = run_risk_pass_internal(&mut store, |scored| seen.push(scored.id)).expect("run");

        assert_eq!(seen, vec![1, 2]);
        assert_eq!(report.updated_count, 2);
        assert_eq!(report.records[0].score, 100.0);
        assert_eq!(report.records[0].priority_tier, PriorityTier::High);
        assert_eq!(report.records[1].score, 0.0);
        assert_eq!(report.records[1].priority_tier, PriorityTier::Low);
        assert_eq!(
            report.summary,
            vec![
                SummaryRow { tier: PriorityTier::High, count: 1, total_debt: 60_000.0 },
                SummaryRow { tier: PriorityTier::Low, count: 1, total_debt: 0.0 },
            ]
        );
    }

    #[test]
    fn preserves_store_order() {
        let mut store = MemoryStore::with(&[(9, 10.0, 1), (3, 10.0, 1), (5, 10.0, 1)]);
        let report = run_risk_pass_internal(&mut store, |_| {}).expect("run");
        let ids: Vec<_> = report.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![9, 3, 5]);
    }

    #[test]
    fn fetch_failure_aborts_before_any_update() {
        let mut store = MemoryStore::with(&[(1, 10.0, 1)]);
        store.fail_fetch = true;

        let err = run_risk_pass_internal(&mut store, |_| {}).unwrap_err();

        assert!(matches!(err, RiskError::Fetch(_)));
        assert!(!store.in_transaction);
        assert!(store.staged.is_empty());
    }

    #[test]
    fn update_failure_rolls_back_whole_batch() {
        let mut store = MemoryStore::with(&[(1, 60_000.0, 200), (2, 100.0, 10), (3, 5.0, 0)]);
        store.fail_update_on = Some(2);
        let mut reported = 0;

        let err = run_risk_pass_internal(&mut store, |_| reported += 1).unwrap_err();

        assert!(matches!(err, RiskError::Update { id: 2, issued: 1, .. }));
        assert_eq!(err.durable_updates(), 0);
        assert_eq!(store.rollbacks, 1);
        assert!(store.committed.is_empty());
        assert_eq!(reported, 1);
    }

    #[test]
    fn commit_failure_rolls_back_and_reports_zero_durable_updates() {
        let mut store = MemoryStore::with(&[(1, 60_000.0, 200), (2, 100.0, 10)]);
        store.fail_commit = true;

        let err = run_risk_pass_internal(&mut store, |_| {}).unwrap_err();

        assert!(matches!(err, RiskError::Commit { issued: 2, .. }));
        assert_eq!(err.durable_updates(), 0);
        assert_eq!(store.rollbacks, 1);
        assert!(store.committed.is_empty());
    }

    #[test]
    fn summary_failure_keeps_committed_updates() {
        let mut store = MemoryStore::with(&[(1, 60_000.0, 200)]);
        store.fail_summary = true;

        let err = run_risk_pass_internal(&mut store, |_| {}).unwrap_err();

        assert!(matches!(err, RiskError::Summary { updated: 1, .. }));
        assert_eq!(err.durable_updates(), 1);
        assert_eq!(store.committed.get(&1), Some(&PriorityTier::High));
        assert_eq!(store.rollbacks, 0);
    }

    #[test]
    fn empty_store_commits_nothing_and_summarizes_nothing() {
        let mut store = MemoryStore::default();
        let report = run_risk_pass_internal(&mut store, |_| {}).expect("run");
        assert_eq!(report.updated_count, 0);
        assert!(report.summary.is_empty());
    }

    #[test]
    fn rerun_yields_identical_summary() {
        let mut store = MemoryStore::with(&[(1, 60_000.0, 200), (2, 30_000.0, 90), (3, 0.0, 0)]);
        let first = run_risk_pass_internal(&mut store, |_| {}).expect("first run");
        let second = run_risk_pass_internal(&mut store, |_| {}).expect("second run");
        assert_eq!(first.summary, second.summary);
        assert_eq!(first.records, second.records);
    }
}
