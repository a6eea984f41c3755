//! SQLite-backed [`Repository`]
//!
//! One row per commit, one row per snapshot. Object state, changed property
//! names, commit tags and diff changes are stored as JSON text; commit dates
//! as RFC 3339.

#![allow(clippy::result_large_err)]

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use histograph_core::commit::Commit;
use histograph_core::errors::{ExError, ExErrorKind};
use histograph_core::model::{CdoSnapshot, CdoState, CommitId, CommitMetadata, GlobalId, SnapshotType};
use histograph_core::repository::Repository;
use rusqlite::{Connection, OptionalExtension, Transaction};

use crate::db;
use crate::errors::{from_rusqlite, lock_poisoned, out_of_range, serialization_error, Result};
use crate::migrations::apply_migrations;

const SNAPSHOT_COLUMNS: &str = "s.entity_type, s.local_id, s.version, s.snapshot_type, s.state,
    s.changed_properties, c.major, c.minor, c.author, c.properties, c.commit_date";

/// Raw snapshot row joined with its commit
struct SnapshotRow {
    entity_type: String,
    local_id: String,
    version: i64,
    snapshot_type: String,
    state: String,
    changed_properties: String,
    major: i64,
    minor: i64,
    author: String,
    properties: String,
    commit_date: String,
}

impl SnapshotRow {
    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            entity_type: row.get(0)?,
            local_id: row.get(1)?,
            version: row.get(2)?,
            snapshot_type: row.get(3)?,
            state: row.get(4)?,
            changed_properties: row.get(5)?,
            major: row.get(6)?,
            minor: row.get(7)?,
            author: row.get(8)?,
            properties: row.get(9)?,
            commit_date: row.get(10)?,
        })
    }
}

/// Durable repository over a single SQLite connection
///
/// Writes are serialized through the connection lock; a commit and all of
/// its snapshots are written in one transaction.
pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    /// Open (or create) the database at `path` and bring its schema up to date
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_connection(db::open(path)?)
    }

    /// Fresh private database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(db::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Number of persisted commits
    pub fn commit_count(&self) -> Result<usize> {
        let conn = self.lock("commit_count")?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM commits", [], |row| row.get(0))
            .map_err(from_rusqlite)?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Stored changes of one commit, in diff order
    pub fn get_commit_changes(&self, id: CommitId) -> Result<Option<Vec<histograph_core::Change>>> {
        let conn = self.lock("get_commit_changes")?;
        let changes: Option<String> = conn
            .query_row(
                "SELECT changes FROM commits WHERE major = ?1 AND minor = ?2",
                rusqlite::params![to_sql_int("get_commit_changes", "commit major", id.major())?, id.minor()],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)?;
        changes
            .map(|json| serde_json::from_str(&json).map_err(|e| serialization_error("get_commit_changes", e)))
            .transpose()
    }

    fn lock(&self, op: &str) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| lock_poisoned(op))
    }
}

fn to_sql_int(op: &str, what: &str, value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| out_of_range(op, what, value))
}

fn from_sql_int(op: &str, what: &str, value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| {
        ExError::new(ExErrorKind::Persistence)
            .with_op(op.to_string())
            .with_message(format!("stored {} {} is negative", what, value))
    })
}

fn parse_snapshot_type(op: &str, value: &str) -> Result<SnapshotType> {
    match value {
        "INITIAL" => Ok(SnapshotType::Initial),
        "UPDATE" => Ok(SnapshotType::Update),
        "TERMINAL" => Ok(SnapshotType::Terminal),
        other => Err(serialization_error(op, format!("unknown snapshot type '{}'", other))),
    }
}

/// Rebuild a snapshot, sharing one metadata instance per commit
fn restore(
    op: &str,
    row: SnapshotRow,
    metadata_cache: &mut HashMap<CommitId, Arc<CommitMetadata>>,
) -> Result<CdoSnapshot> {
    let minor = u32::try_from(row.minor).map_err(|_| {
        ExError::new(ExErrorKind::Persistence)
            .with_op(op.to_string())
            .with_message(format!("stored commit minor {} is out of range", row.minor))
    })?;
    let commit_id = CommitId::new(from_sql_int(op, "commit major", row.major)?, minor);

    let metadata = match metadata_cache.get(&commit_id) {
        Some(metadata) => Arc::clone(metadata),
        None => {
            let properties: BTreeMap<String, String> =
                serde_json::from_str(&row.properties).map_err(|e| serialization_error(op, e))?;
            let commit_date = DateTime::parse_from_rfc3339(&row.commit_date)
                .map_err(|e| serialization_error(op, e))?
                .with_timezone(&Utc);
            let metadata = Arc::new(CommitMetadata::new(row.author, properties, commit_date, commit_id));
            metadata_cache.insert(commit_id, Arc::clone(&metadata));
            metadata
        }
    };

    let state: CdoState = serde_json::from_str(&row.state).map_err(|e| serialization_error(op, e))?;
    let changed_properties: Vec<String> =
        serde_json::from_str(&row.changed_properties).map_err(|e| serialization_error(op, e))?;

    Ok(CdoSnapshot::restore(
        GlobalId::new(row.entity_type, row.local_id),
        state,
        parse_snapshot_type(op, &row.snapshot_type)?,
        from_sql_int(op, "snapshot version", row.version)?,
        metadata,
        changed_properties,
    ))
}

fn query_history(
    conn: &Connection,
    op: &str,
    id: &GlobalId,
    limit: i64,
    metadata_cache: &mut HashMap<CommitId, Arc<CommitMetadata>>,
) -> Result<Vec<CdoSnapshot>> {
    let sql = format!(
        "SELECT {} FROM snapshots s
         JOIN commits c ON c.major = s.commit_major AND c.minor = s.commit_minor
         WHERE s.entity_type = ?1 AND s.local_id = ?2
         ORDER BY s.version DESC
         LIMIT ?3",
        SNAPSHOT_COLUMNS
    );
    let mut stmt = conn.prepare_cached(&sql).map_err(from_rusqlite)?;
    let rows = stmt
        .query_map(
            rusqlite::params![id.entity_type(), id.local_id(), limit],
            SnapshotRow::read,
        )
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    rows.into_iter()
        .map(|row| restore(op, row, metadata_cache))
        .collect()
}

fn stored_version(tx: &Transaction<'_>, id: &GlobalId) -> Result<u64> {
    let max: Option<i64> = tx
        .query_row(
            "SELECT MAX(version) FROM snapshots WHERE entity_type = ?1 AND local_id = ?2",
            [id.entity_type(), id.local_id()],
            |row| row.get(0),
        )
        .map_err(from_rusqlite)?;
    max.map_or(Ok(0), |v| from_sql_int("persist", "snapshot version", v))
}

fn insert_commit(tx: &Transaction<'_>, commit: &Commit) -> Result<()> {
    let id = commit.id();
    let properties =
        serde_json::to_string(commit.properties()).map_err(|e| serialization_error("persist", e))?;
    let changes =
        serde_json::to_string(commit.diff().changes()).map_err(|e| serialization_error("persist", e))?;
    tx.execute(
        "INSERT INTO commits (major, minor, author, properties, commit_date, changes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            to_sql_int("persist", "commit major", id.major())?,
            id.minor(),
            commit.author(),
            properties,
            commit.commit_date().to_rfc3339(),
            changes,
        ],
    )
    .map_err(from_rusqlite)?;
    Ok(())
}

fn insert_snapshot(tx: &Transaction<'_>, commit_id: CommitId, snapshot: &CdoSnapshot) -> Result<()> {
    let state =
        serde_json::to_string(snapshot.state()).map_err(|e| serialization_error("persist", e))?;
    let changed = serde_json::to_string(snapshot.changed_properties())
        .map_err(|e| serialization_error("persist", e))?;
    tx.execute(
        "INSERT INTO snapshots (entity_type, local_id, version, snapshot_type, state,
                                changed_properties, commit_major, commit_minor)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            snapshot.global_id().entity_type(),
            snapshot.global_id().local_id(),
            to_sql_int("persist", "snapshot version", snapshot.version())?,
            snapshot.snapshot_type().as_str(),
            state,
            changed,
            to_sql_int("persist", "commit major", commit_id.major())?,
            commit_id.minor(),
        ],
    )
    .map_err(from_rusqlite)?;
    Ok(())
}

impl Repository for SqliteRepository {
    fn get_latest(&self, id: &GlobalId) -> Result<Option<CdoSnapshot>> {
        let conn = self.lock("get_latest")?;
        let mut cache = HashMap::new();
        Ok(query_history(&conn, "get_latest", id, 1, &mut cache)?
            .into_iter()
            .next())
    }

    fn get_latest_graph(&self, ids: &BTreeSet<GlobalId>) -> Result<BTreeMap<GlobalId, CdoSnapshot>> {
        let conn = self.lock("get_latest_graph")?;
        let mut cache = HashMap::new();
        let mut latest = BTreeMap::new();
        for id in ids {
            if let Some(snapshot) = query_history(&conn, "get_latest_graph", id, 1, &mut cache)?
                .into_iter()
                .next()
            {
                latest.insert(id.clone(), snapshot);
            }
        }
        Ok(latest)
    }

    fn persist(&self, commit: &Commit) -> Result<()> {
        let mut conn = self.lock("persist")?;
        let tx = conn.transaction().map_err(from_rusqlite)?;

        let mut expected: BTreeMap<&GlobalId, u64> = BTreeMap::new();
        for snapshot in commit.snapshots() {
            let id = snapshot.global_id();
            let latest = match expected.get(id) {
                Some(v) => *v,
                None => stored_version(&tx, id)?,
            };
            if snapshot.version() <= latest {
                return Err(ExError::new(ExErrorKind::Persistence)
                    .with_op("persist")
                    .with_entity_id(id.value())
                    .with_message(format!(
                        "snapshot version {} does not follow stored version {}",
                        snapshot.version(),
                        latest
                    )));
            }
            expected.insert(id, snapshot.version());
        }

        insert_commit(&tx, commit)?;
        for snapshot in commit.snapshots() {
            insert_snapshot(&tx, commit.id(), snapshot)?;
        }
        tx.commit().map_err(from_rusqlite)?;

        tracing::debug!(
            commit_id = %commit.id(),
            snapshot_count = commit.snapshots().len(),
            "Persisted commit"
        );
        Ok(())
    }

    fn head_id(&self) -> Result<Option<CommitId>> {
        let conn = self.lock("head_id")?;
        let head: Option<(i64, i64)> = conn
            .query_row(
                "SELECT major, minor FROM commits ORDER BY major DESC, minor DESC LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(from_rusqlite)?;
        head.map(|(major, minor)| -> Result<CommitId> {
            let minor = u32::try_from(minor)
                .map_err(|_| serialization_error("head_id", format!("commit minor {} out of range", minor)))?;
            Ok(CommitId::new(from_sql_int("head_id", "commit major", major)?, minor))
        })
        .transpose()
    }

    fn get_state_history(&self, id: &GlobalId, limit: usize) -> Result<Vec<CdoSnapshot>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let conn = self.lock("get_state_history")?;
        let mut cache = HashMap::new();
        query_history(
            &conn,
            "get_state_history",
            id,
            i64::try_from(limit).unwrap_or(i64::MAX),
            &mut cache,
        )
    }
}
