use chrono::{DateTime, Local, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::preset::Preset;
use crate::session::{NewSession, Session};
use crate::settings::TimerConfiguration;

const SETTINGS_DOCUMENT: &str = "timer";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// The persistence collaborator: timer settings plus an append-only session log
pub trait SessionStore: Send {
    fn read_settings(&self) -> StoreResult<Option<TimerConfiguration>>;

    fn write_settings(&self, config: &TimerConfiguration) -> StoreResult<()>;

    /// Store a session, assigning its id and timestamp
    fn write_session(&self, session: &NewSession) -> StoreResult<Session>;

    /// Every stored session, newest date first
    fn read_all_sessions(&self) -> StoreResult<Vec<Session>>;

    fn read_sessions_by_date(&self, date: NaiveDate) -> StoreResult<Vec<Session>>;

    /// Sessions with `start <= date <= end`, newest date first
    fn read_sessions_in_range(&self, start: NaiveDate, end: NaiveDate)
        -> StoreResult<Vec<Session>>;

    /// Returns whether a session with that id existed
    fn delete_session(&self, id: &str) -> StoreResult<bool>;
}

/// SQLite-backed store: the settings document as JSON, sessions as rows
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

type RawSession = (String, String, String, i64, bool, i64, bool, String);

const SESSION_COLUMNS: &str =
    "id, date, type, duration, completed, overtime, is_partial_completion, timestamp";

impl SqliteStore {
    /// Open (or create) the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                name TEXT PRIMARY KEY,
                document TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                type TEXT NOT NULL,
                duration INTEGER NOT NULL,
                completed BOOLEAN NOT NULL,
                overtime INTEGER NOT NULL DEFAULT 0,
                is_partial_completion BOOLEAN NOT NULL DEFAULT 0,
                timestamp TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_sessions_date ON sessions(date)",
            [],
        )?;

        Ok(SqliteStore { conn })
    }

    fn query_sessions<P: rusqlite::Params>(
        &self,
        filter: &str,
        params: P,
    ) -> StoreResult<Vec<Session>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM sessions {filter} ORDER BY date DESC, timestamp DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params, |row| -> rusqlite::Result<RawSession> {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
            ))
        })?;

        let mut sessions = Vec::new();
        for raw in rows {
            let raw = raw?;
            let id = raw.0.clone();
            match decode_session(raw) {
                Ok(session) => sessions.push(session),
                Err(e) => tracing::warn!(%id, error = %e, "skipping unreadable session row"),
            }
        }
        Ok(sessions)
    }
}

fn decode_session(raw: RawSession) -> StoreResult<Session> {
    let (id, date, kind, duration, completed, overtime, partial, timestamp) = raw;

    let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
        .map_err(|e| StoreError::InvalidRecord(format!("date '{date}': {e}")))?;
    let kind = kind
        .parse::<Preset>()
        .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;
    let duration = u64::try_from(duration)
        .map_err(|_| StoreError::InvalidRecord(format!("negative duration {duration}")))?;
    let overtime = u64::try_from(overtime)
        .map_err(|_| StoreError::InvalidRecord(format!("negative overtime {overtime}")))?;
    let timestamp = DateTime::parse_from_rfc3339(&timestamp)
        .map_err(|e| StoreError::InvalidRecord(format!("timestamp '{timestamp}': {e}")))?
        .with_timezone(&Local);

    Ok(Session {
        id,
        date,
        kind,
        duration,
        completed,
        overtime,
        is_partial_completion: partial,
        timestamp,
    })
}

impl SessionStore for SqliteStore {
    fn read_settings(&self) -> StoreResult<Option<TimerConfiguration>> {
        let document: Option<String> = self
            .conn
            .query_row(
                "SELECT document FROM settings WHERE name = ?1",
                [SETTINGS_DOCUMENT],
                |row| row.get(0),
            )
            .optional()?;

        match document {
            Some(json) => {
                let config: TimerConfiguration = serde_json::from_str(&json)?;
                if let Some(preset) = config.out_of_range() {
                    return Err(StoreError::InvalidRecord(format!(
                        "{preset} duration {} out of range",
                        config.duration(preset)
                    )));
                }
                Ok(Some(config))
            }
            None => Ok(None),
        }
    }

    fn write_settings(&self, config: &TimerConfiguration) -> StoreResult<()> {
        let document = serde_json::to_string(config)?;
        self.conn.execute(
            r#"
            INSERT INTO settings (name, document, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(name) DO UPDATE SET document = excluded.document, updated_at = excluded.updated_at
            "#,
            params![SETTINGS_DOCUMENT, document, Local::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn write_session(&self, session: &NewSession) -> StoreResult<Session> {
        let id = Uuid::new_v4().to_string();
        let timestamp = Local::now();
        let duration = i64::try_from(session.duration)
            .map_err(|_| StoreError::InvalidRecord("duration out of range".into()))?;
        let overtime = i64::try_from(session.overtime)
            .map_err(|_| StoreError::InvalidRecord("overtime out of range".into()))?;

        self.conn.execute(
            &format!(
                "INSERT INTO sessions ({SESSION_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
            ),
            params![
                id,
                session.date.format(DATE_FORMAT).to_string(),
                session.kind.to_string(),
                duration,
                session.completed,
                overtime,
                session.is_partial_completion,
                timestamp.to_rfc3339(),
            ],
        )?;

        Ok(Session::from_new(id, session.clone(), timestamp))
    }

    fn read_all_sessions(&self) -> StoreResult<Vec<Session>> {
        self.query_sessions("", [])
    }

    fn read_sessions_by_date(&self, date: NaiveDate) -> StoreResult<Vec<Session>> {
        self.query_sessions(
            "WHERE date = ?1",
            [date.format(DATE_FORMAT).to_string()],
        )
    }

    fn read_sessions_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<Session>> {
        self.query_sessions(
            "WHERE date >= ?1 AND date <= ?2",
            [
                start.format(DATE_FORMAT).to_string(),
                end.format(DATE_FORMAT).to_string(),
            ],
        )
    }

    fn delete_session(&self, id: &str) -> StoreResult<bool> {
        let removed = self.conn.execute("DELETE FROM sessions WHERE id = ?1", [id])?;
        Ok(removed > 0)
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    settings: Option<TimerConfiguration>,
    sessions: Vec<Session>,
    fail_writes: bool,
    fail_reads: bool,
    next_id: u64,
}

/// In-process store for tests and headless runs. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, to exercise degraded paths
    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_writes = fail;
        }
    }

    /// Make every subsequent read fail
    pub fn set_fail_reads(&self, fail: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_reads = fail;
        }
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, MemoryInner>> {
        self.inner.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn sorted(mut sessions: Vec<Session>) -> Vec<Session> {
        sessions.sort_by(|a, b| b.date.cmp(&a.date).then(b.timestamp.cmp(&a.timestamp)));
        sessions
    }
}

fn rejected(what: &str) -> StoreError {
    StoreError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("{what} disabled"),
    ))
}

impl MemoryInner {
    fn readable(&self) -> StoreResult<&Self> {
        if self.fail_reads {
            return Err(rejected("reads"));
        }
        Ok(self)
    }
}

impl SessionStore for MemoryStore {
    fn read_settings(&self) -> StoreResult<Option<TimerConfiguration>> {
        Ok(self.lock()?.readable()?.settings)
    }

    fn write_settings(&self, config: &TimerConfiguration) -> StoreResult<()> {
        let mut inner = self.lock()?;
        if inner.fail_writes {
            return Err(rejected("writes"));
        }
        inner.settings = Some(*config);
        Ok(())
    }

    fn write_session(&self, session: &NewSession) -> StoreResult<Session> {
        let mut inner = self.lock()?;
        if inner.fail_writes {
            return Err(rejected("writes"));
        }
        inner.next_id += 1;
        let stored = Session::from_new(
            format!("mem-{}", inner.next_id),
            session.clone(),
            Local::now(),
        );
        inner.sessions.push(stored.clone());
        Ok(stored)
    }

    fn read_all_sessions(&self) -> StoreResult<Vec<Session>> {
        Ok(Self::sorted(self.lock()?.readable()?.sessions.clone()))
    }

    fn read_sessions_by_date(&self, date: NaiveDate) -> StoreResult<Vec<Session>> {
        self.read_sessions_in_range(date, date)
    }

    fn read_sessions_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<Session>> {
        let guard = self.lock()?;
        let matching = guard
            .readable()?
            .sessions
            .iter()
            .filter(|s| s.date >= start && s.date <= end)
            .cloned()
            .collect();
        Ok(Self::sorted(matching))
    }

    fn delete_session(&self, id: &str) -> StoreResult<bool> {
        let mut inner = self.lock()?;
        let before = inner.sessions.len();
        inner.sessions.retain(|s| s.id != id);
        Ok(inner.sessions.len() != before)
    }
}
