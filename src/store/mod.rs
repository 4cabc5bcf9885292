//! Storage and query layer
//!
//! A single-file SQLite store (`.sem/sem.db` at the repository root) holding
//! entity snapshots and change records. Single writer; every batch mutation
//! runs in one transaction. Readers may run concurrently under WAL.

use std::fs;
use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{params, params_from_iter, Connection, OpenFlags};
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::error::{Result, SemError};
use crate::model::{ChangeType, SemanticChange, SemanticEntity};

/// Snapshot name used when none is given
pub const DEFAULT_SNAPSHOT: &str = "current";

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS entities (
    id TEXT NOT NULL,
    file_path TEXT NOT NULL,
    entity_type TEXT NOT NULL,
    name TEXT NOT NULL,
    parent_id TEXT,
    content TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    start_line INTEGER NOT NULL,
    end_line INTEGER NOT NULL,
    commit_sha TEXT,
    snapshot TEXT NOT NULL DEFAULT 'current',
    PRIMARY KEY (id, snapshot)
);

CREATE INDEX IF NOT EXISTS idx_entities_file ON entities(file_path);
CREATE INDEX IF NOT EXISTS idx_entities_type ON entities(entity_type);
CREATE INDEX IF NOT EXISTS idx_entities_snapshot ON entities(snapshot);
CREATE INDEX IF NOT EXISTS idx_entities_hash ON entities(content_hash);

CREATE TABLE IF NOT EXISTS changes (
    id TEXT PRIMARY KEY,
    entity_id TEXT NOT NULL,
    change_type TEXT NOT NULL,
    entity_type TEXT NOT NULL,
    entity_name TEXT NOT NULL,
    file_path TEXT NOT NULL,
    old_file_path TEXT,
    before_content TEXT,
    after_content TEXT,
    commit_sha TEXT,
    author TEXT,
    timestamp TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_changes_file ON changes(file_path);
CREATE INDEX IF NOT EXISTS idx_changes_type ON changes(change_type);
CREATE INDEX IF NOT EXISTS idx_changes_entity_type ON changes(entity_type);
CREATE INDEX IF NOT EXISTS idx_changes_commit ON changes(commit_sha);

CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Filter builder for [`SemDatabase::get_changes`]
#[derive(Debug, Clone, Default)]
pub struct ChangeFilter {
    pub file_path: Option<String>,
    pub change_type: Option<ChangeType>,
    pub entity_type: Option<String>,
    pub commit_sha: Option<String>,
    pub limit: Option<usize>,
}

/// Handle over the on-disk store
pub struct SemDatabase {
    conn: Connection,
}

impl SemDatabase {
    /// Open (and initialise) the store at the given path, creating parent
    /// directories as needed
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )?;
        Self::initialise(conn)
    }

    /// In-memory store, used by tests
    pub fn open_in_memory() -> Result<Self> {
        Self::initialise(Connection::open_in_memory()?)
    }

    fn initialise(conn: Connection) -> Result<Self> {
        // journal_mode echoes the resulting mode back as a row
        let _mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.execute_batch(SCHEMA_SQL)?;
        debug!("store initialised");
        Ok(Self { conn })
    }

    /// Upsert a batch of entities into a snapshot; all-or-nothing
    pub fn upsert_entities(
        &mut self,
        entities: &[SemanticEntity],
        snapshot: &str,
        commit_sha: Option<&str>,
    ) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR REPLACE INTO entities
                 (id, file_path, entity_type, name, parent_id, content, content_hash,
                  start_line, end_line, commit_sha, snapshot)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for entity in entities {
                stmt.execute(params![
                    entity.id,
                    entity.file_path,
                    entity.entity_type,
                    entity.name,
                    entity.parent_id,
                    entity.content,
                    entity.content_hash,
                    entity.start_line as i64,
                    entity.end_line as i64,
                    commit_sha,
                    snapshot,
                ])?;
            }
        }
        tx.commit()?;
        Ok(entities.len())
    }

    /// Append a batch of change records; all-or-nothing. Row ids are
    /// commit-qualified when a commit sha is present so per-commit records
    /// stay distinct.
    pub fn record_changes(&mut self, changes: &[SemanticChange]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR REPLACE INTO changes
                 (id, entity_id, change_type, entity_type, entity_name, file_path,
                  old_file_path, before_content, after_content, commit_sha, author)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for change in changes {
                let row_id = match change.commit_sha.as_deref() {
                    Some(sha) => format!("{sha}::{}", change.id),
                    None => change.id.clone(),
                };
                stmt.execute(params![
                    row_id,
                    change.entity_id,
                    change.change_type.as_str(),
                    change.entity_type,
                    change.entity_name,
                    change.file_path,
                    change.old_file_path,
                    change.before_content,
                    change.after_content,
                    change.commit_sha,
                    change.author,
                ])?;
            }
        }
        tx.commit()?;
        Ok(changes.len())
    }

    /// Entities of one snapshot, optionally restricted to one file, in stable
    /// (file, line) order
    pub fn get_entities(
        &self,
        snapshot: &str,
        file_path: Option<&str>,
    ) -> Result<Vec<SemanticEntity>> {
        let mut sql = String::from(
            "SELECT id, file_path, entity_type, name, parent_id, content, content_hash,
                    start_line, end_line
             FROM entities WHERE snapshot = ?1",
        );
        let mut bindings: Vec<String> = vec![snapshot.to_string()];
        if let Some(path) = file_path {
            sql.push_str(" AND file_path = ?2");
            bindings.push(path.to_string());
        }
        sql.push_str(" ORDER BY file_path, start_line, id");

        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params_from_iter(bindings.iter()), |row| {
            Ok(SemanticEntity {
                id: row.get(0)?,
                file_path: row.get(1)?,
                entity_type: row.get(2)?,
                name: row.get(3)?,
                parent_id: row.get(4)?,
                content: row.get(5)?,
                content_hash: row.get(6)?,
                start_line: row.get::<_, i64>(7)? as usize,
                end_line: row.get::<_, i64>(8)? as usize,
                metadata: None,
            })
        })?;

        let mut entities = Vec::new();
        for row in rows {
            entities.push(row?);
        }
        Ok(entities)
    }

    /// Change records matching the filter, newest first
    pub fn get_changes(&self, filter: &ChangeFilter) -> Result<Vec<SemanticChange>> {
        let mut sql = String::from(
            "SELECT id, entity_id, change_type, entity_type, entity_name, file_path,
                    old_file_path, before_content, after_content, commit_sha, author, timestamp
             FROM changes WHERE 1=1",
        );
        let mut bindings: Vec<String> = Vec::new();

        if let Some(ref path) = filter.file_path {
            bindings.push(path.clone());
            sql.push_str(&format!(" AND file_path = ?{}", bindings.len()));
        }
        if let Some(change_type) = filter.change_type {
            bindings.push(change_type.as_str().to_string());
            sql.push_str(&format!(" AND change_type = ?{}", bindings.len()));
        }
        if let Some(ref entity_type) = filter.entity_type {
            bindings.push(entity_type.clone());
            sql.push_str(&format!(" AND entity_type = ?{}", bindings.len()));
        }
        if let Some(ref sha) = filter.commit_sha {
            bindings.push(sha.clone());
            sql.push_str(&format!(" AND commit_sha = ?{}", bindings.len()));
        }
        sql.push_str(" ORDER BY timestamp DESC, id");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bindings.iter()), |row| {
            let change_type_str: String = row.get(2)?;
            Ok(SemanticChange {
                id: row.get(0)?,
                entity_id: row.get(1)?,
                change_type: ChangeType::parse(&change_type_str)
                    .unwrap_or(ChangeType::Modified),
                entity_type: row.get(3)?,
                entity_name: row.get(4)?,
                file_path: row.get(5)?,
                old_file_path: row.get(6)?,
                before_content: row.get(7)?,
                after_content: row.get(8)?,
                commit_sha: row.get(9)?,
                author: row.get(10)?,
                timestamp: row.get(11)?,
            })
        })?;

        let mut changes = Vec::new();
        for row in rows {
            changes.push(row?);
        }
        Ok(changes)
    }

    /// Drop every entity of one snapshot
    pub fn clear_snapshot(&mut self, snapshot: &str) -> Result<usize> {
        let deleted = self
            .conn
            .execute("DELETE FROM entities WHERE snapshot = ?1", params![snapshot])?;
        Ok(deleted)
    }

    /// Run caller-supplied SQL and return rows as ordered column→value maps.
    /// Documented read-only; store errors come back verbatim.
    pub fn query(&self, sql: &str) -> Result<Vec<Map<String, Value>>> {
        let mut stmt = self.conn.prepare(sql).map_err(|e| SemError::Query {
            message: e.to_string(),
        })?;
        let column_names: Vec<String> =
            stmt.column_names().iter().map(|c| c.to_string()).collect();

        let mut rows = stmt.query([]).map_err(|e| SemError::Query {
            message: e.to_string(),
        })?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().map_err(|e| SemError::Query {
            message: e.to_string(),
        })? {
            let mut map = Map::new();
            for (i, name) in column_names.iter().enumerate() {
                let value = match row.get_ref(i).map_err(|e| SemError::Query {
                    message: e.to_string(),
                })? {
                    ValueRef::Null => Value::Null,
                    ValueRef::Integer(n) => Value::Number(n.into()),
                    ValueRef::Real(f) => {
                        Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
                    }
                    ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
                    ValueRef::Blob(b) => Value::String(String::from_utf8_lossy(b).into_owned()),
                };
                map.insert(name.clone(), value);
            }
            results.push(map);
        }
        Ok(results)
    }

    /// Store a metadata key
    pub fn set_meta(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Read a metadata key
    pub fn get_meta(&self, key: &str) -> Result<Option<String>> {
        use rusqlite::OptionalExtension;
        let value = self
            .conn
            .query_row(
                "SELECT value FROM metadata WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }
}
