use crate::error::StoreError;
use crate::models::debtor::{CollectionStatus, DebtorRecord, DebtorRow, NewDebtor};
use crate::models::priority::{parse_stored_tier, PriorityTier, PENDING_LABEL};
use crate::models::summary::{PortfolioStatistics, SummaryRow};
use rusqlite::{params, params_from_iter, Connection, OpenFlags, Result};
use std::path::Path;

const DB_SCHEMA_VERSION: i64 = 3;

/// Data store contract used by the batch processor.
///
/// Updates issued between `begin` and `commit` must become durable together
/// or not at all; `rollback` discards everything issued since `begin`.
pub trait DebtorStore {
    fn fetch_debtors(&mut self) -> Result<Vec<DebtorRecord>, StoreError>;

    fn begin(&mut self) -> Result<(), StoreError>;

    fn update_priority(&mut self, id: i64, tier: PriorityTier) -> Result<(), StoreError>;

    fn commit(&mut self) -> Result<(), StoreError>;

    fn rollback(&mut self) -> Result<(), StoreError>;

    /// Tier -> (count, total debt) over scored debtors, in the given tier order.
    /// Tiers without members are absent.
    fn summarize_by_tier(&mut self, order: &[PriorityTier]) -> Result<Vec<SummaryRow>, StoreError>;
}

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )?;

    let mut version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version < 1 {
        apply_migration_1(conn)?;
        version = 1;
        conn.pragma_update(None, "user_version", version)?;
    }

    if version < 2 {
        apply_migration_2(conn)?;
        version = 2;
        conn.pragma_update(None, "user_version", version)?;
    }

    if version < 3 {
        apply_migration_3(conn)?;
        version = 3;
        conn.pragma_update(None, "user_version", version)?;
    }

    if version > DB_SCHEMA_VERSION {
        log::warn!("debtor database schema v{version} is newer than v{DB_SCHEMA_VERSION}");
    }

    Ok(())
}

fn apply_migration_1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS debtors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            debt_amount REAL NOT NULL CHECK(debt_amount >= 0),
            days_overdue INTEGER NOT NULL CHECK(days_overdue >= 0),
            priority_tier TEXT NOT NULL DEFAULT 'Pending'
                CHECK(priority_tier IN ('High', 'Medium', 'Low', 'Pending'))
        );
        ",
    )
}

fn apply_migration_2(conn: &Connection) -> Result<()> {
    add_column_if_missing(conn, "debtors", "collection_status TEXT NOT NULL DEFAULT 'Not Contacted'")?;
    add_column_if_missing(conn, "debtors", "registered_at INTEGER")?;

    // Backfill registration time for rows created before the column existed.
    conn.execute(
        "UPDATE debtors SET registered_at = ?1 WHERE registered_at IS NULL",
        params![chrono::Utc::now().timestamp()],
    )?;

    Ok(())
}

fn apply_migration_3(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE INDEX IF NOT EXISTS idx_debtors_priority_tier ON debtors(priority_tier);
        CREATE INDEX IF NOT EXISTS idx_debtors_collection_status ON debtors(collection_status);
        ",
    )
}

fn add_column_if_missing(conn: &Connection, table: &str, column_def: &str) -> Result<()> {
    let column_name = column_def
        .split_whitespace()
        .next()
        .unwrap_or(column_def)
        .to_string();

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let exists = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .filter_map(|res| res.ok())
        .any(|name| name == column_name);

    if !exists {
        conn.execute(&format!("ALTER TABLE {table} ADD COLUMN {column_def}"), [])?;
    }

    Ok(())
}

/// SQLite-backed debtor store. The connection is closed when the store is
/// dropped or explicitly via [`SqliteDebtorStore::close`].
pub struct SqliteDebtorStore {
    conn: Connection,
}

impl SqliteDebtorStore {
    /// Open an existing database; with `create` a missing file is created and migrated.
    pub fn open(path: &Path, create: bool) -> Result<Self, StoreError> {
        let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if create {
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
        }

        let conn = Connection::open_with_flags(path, flags)?;
        // Opening is lazy; touch the schema so a corrupt or foreign file fails here.
        conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))?;

        if create {
            initialize_schema(&conn)?;
        }

        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_, err)| StoreError::Sqlite(err))
    }
}

impl DebtorStore for SqliteDebtorStore {
    fn fetch_debtors(&mut self) -> Result<Vec<DebtorRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, debt_amount, days_overdue FROM debtors")?;

        let debtors = stmt
            .query_map([], |row| {
                Ok(DebtorRecord {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    debt_amount: row.get(2)?,
                    days_overdue: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;

        Ok(debtors)
    }

    // The transaction spans several trait calls, so it cannot be a borrowed
    // `rusqlite::Transaction`; plain BEGIN/COMMIT/ROLLBACK statements are used instead.
    fn begin(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn update_priority(&mut self, id: i64, tier: PriorityTier) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE debtors SET priority_tier = ?1 WHERE id = ?2",
            params![tier.as_str(), id],
        )?;

        if changed == 0 {
            return Err(StoreError::UnknownDebtor(id));
        }

        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        // A failed COMMIT may already have ended the transaction.
        if self.conn.is_autocommit() {
            return Ok(());
        }
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn summarize_by_tier(&mut self, order: &[PriorityTier]) -> Result<Vec<SummaryRow>, StoreError> {
        if order.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (1..=order.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let ranking = (1..=order.len())
            .map(|i| format!("WHEN ?{i} THEN {i}"))
            .collect::<Vec<_>>()
            .join(" ");

        let sql = format!(
            "SELECT priority_tier, COUNT(*), COALESCE(SUM(debt_amount), 0)
             FROM debtors
             WHERE priority_tier IN ({placeholders})
             GROUP BY priority_tier
             ORDER BY CASE priority_tier {ranking} END"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(order.iter().map(PriorityTier::as_str)), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, f64>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(label, count, total_debt)| {
                let tier = label.parse::<PriorityTier>().map_err(StoreError::InvalidValue)?;
                Ok(SummaryRow {
                    tier,
                    count: count as usize,
                    total_debt,
                })
            })
            .collect()
    }
}

pub fn insert_debtor(conn: &Connection, debtor: &NewDebtor) -> Result<i64> {
    let now = chrono::Utc::now().timestamp();

    conn.execute(
        "INSERT INTO debtors (name, debt_amount, days_overdue, priority_tier, collection_status, registered_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            debtor.name,
            debtor.debt_amount,
            debtor.days_overdue,
            PENDING_LABEL,
            CollectionStatus::default().as_str(),
            now,
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

/// Debtors ordered High, Medium, Low, Pending; then most overdue and largest debt first.
pub fn list_debtors(conn: &Connection) -> Result<Vec<DebtorRow>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, debt_amount, days_overdue, priority_tier, collection_status, registered_at
         FROM debtors
         ORDER BY
            CASE priority_tier WHEN 'High' THEN 0 WHEN 'Medium' THEN 1 WHEN 'Low' THEN 2 ELSE 3 END,
            days_overdue DESC,
            debt_amount DESC",
    )?;

    let raw = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, Option<i64>>(6)?,
            ))
        })?
        .collect::<Result<Vec<_>>>()?;

    raw.into_iter()
        .map(|(id, name, debt_amount, days_overdue, tier, status, registered_at)| {
            let priority = parse_stored_tier(tier.as_deref()).map_err(StoreError::InvalidValue)?;
            let collection_status = match status {
                Some(label) => label.parse::<CollectionStatus>().map_err(StoreError::InvalidValue)?,
                None => CollectionStatus::default(),
            };

            Ok(DebtorRow {
                id,
                name,
                debt_amount,
                days_overdue,
                priority,
                collection_status,
                registered_at,
            })
        })
        .collect()
}

pub fn set_collection_status(
    conn: &Connection,
    id: i64,
    status: CollectionStatus,
) -> Result<(), StoreError> {
    let changed = conn.execute(
        "UPDATE debtors SET collection_status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;

    if changed == 0 {
        return Err(StoreError::UnknownDebtor(id));
    }

    Ok(())
}

pub fn portfolio_statistics(conn: &Connection) -> Result<PortfolioStatistics> {
    conn.query_row(
        "SELECT
            COUNT(*),
            COALESCE(SUM(debt_amount), 0),
            COALESCE(SUM(CASE WHEN priority_tier = 'High' THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN priority_tier = 'Medium' THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN priority_tier = 'Low' THEN 1 ELSE 0 END), 0)
         FROM debtors",
        [],
        |row| {
            Ok(PortfolioStatistics {
                total_debtors: row.get::<_, i64>(0)? as usize,
                total_debt: row.get(1)?,
                high: row.get::<_, i64>(2)? as usize,
                medium: row.get::<_, i64>(3)? as usize,
                low: row.get::<_, i64>(4)? as usize,
            })
        },
    )
}
