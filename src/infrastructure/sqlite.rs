// src/infrastructure/sqlite.rs
use crate::application::{
    CounterStore, NoteRepository, SnapshotListener, Subscription, SubscriptionRegistry, UserStore,
};
use crate::constants::SEARCH_SCAN_LIMIT;
use crate::domain::filter::{check_backend_support, matches_text};
use crate::domain::{
    Author, Counter, CounterKind, CounterPatch, DomainError, FileRef, Note, NoteDraft, NoteFilter,
    NoteKind, NoteOrder, NotePatch, User,
};
use crate::infrastructure::ServerClock;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use uuid::Uuid;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS notes (
    id           TEXT PRIMARY KEY,
    title        TEXT NOT NULL,
    content      TEXT NOT NULL,
    type         TEXT NOT NULL,
    tags         TEXT NOT NULL DEFAULT '[]',
    subject      TEXT,
    is_public    INTEGER NOT NULL,
    author_id    TEXT NOT NULL,
    author_name  TEXT NOT NULL,
    author_email TEXT NOT NULL,
    file_url     TEXT,
    file_name    TEXT,
    file_size    INTEGER,
    view_count   INTEGER NOT NULL DEFAULT 0,
    like_count   INTEGER NOT NULL DEFAULT 0,
    created_at   INTEGER NOT NULL,
    updated_at   INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_notes_created ON notes (created_at);
CREATE INDEX IF NOT EXISTS idx_notes_author ON notes (author_id);

CREATE TABLE IF NOT EXISTS counters (
    kind  TEXT NOT NULL,
    name  TEXT NOT NULL,
    color TEXT NOT NULL,
    count INTEGER NOT NULL,
    PRIMARY KEY (kind, name)
);

CREATE TABLE IF NOT EXISTS users (
    id           TEXT PRIMARY KEY,
    email        TEXT NOT NULL,
    display_name TEXT NOT NULL,
    photo_url    TEXT,
    created_at   INTEGER NOT NULL,
    updated_at   INTEGER NOT NULL
);
"#;

const NOTE_COLUMNS: &str = "id, title, content, type, tags, subject, is_public, author_id, \
     author_name, author_email, file_url, file_name, file_size, view_count, like_count, \
     created_at, updated_at";

fn backend_err(e: rusqlite::Error) -> DomainError {
    DomainError::Backend(e.to_string())
}

fn to_micros(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_micros()
}

fn from_micros(micros: i64) -> Result<DateTime<Utc>, DomainError> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| DomainError::Backend(format!("timestamp out of range: {}", micros)))
}

/// Raw `notes` row before the invariants are checked.
struct NoteRow {
    id: String,
    title: String,
    content: String,
    kind: String,
    tags: String,
    subject: Option<String>,
    is_public: bool,
    author_id: String,
    author_name: String,
    author_email: String,
    file_url: Option<String>,
    file_name: Option<String>,
    file_size: Option<i64>,
    view_count: i64,
    like_count: i64,
    created_at: i64,
    updated_at: i64,
}

impl NoteRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            kind: row.get(3)?,
            tags: row.get(4)?,
            subject: row.get(5)?,
            is_public: row.get(6)?,
            author_id: row.get(7)?,
            author_name: row.get(8)?,
            author_email: row.get(9)?,
            file_url: row.get(10)?,
            file_name: row.get(11)?,
            file_size: row.get(12)?,
            view_count: row.get(13)?,
            like_count: row.get(14)?,
            created_at: row.get(15)?,
            updated_at: row.get(16)?,
        })
    }
}

impl TryFrom<NoteRow> for Note {
    type Error = DomainError;

    fn try_from(row: NoteRow) -> Result<Self, Self::Error> {
        let file = match (row.file_url, row.file_name, row.file_size) {
            (Some(url), Some(name), Some(size)) => Some(FileRef {
                url,
                name,
                size: size.max(0) as u64,
            }),
            (None, None, None) => None,
            _ => {
                return Err(DomainError::Backend(format!(
                    "note {} has a partial file reference",
                    row.id
                )))
            }
        };
        let tags: Vec<String> = serde_json::from_str(&row.tags)
            .map_err(|e| DomainError::Backend(format!("note {} has invalid tags: {}", row.id, e)))?;

        Ok(Note {
            kind: row.kind.parse::<NoteKind>()?,
            title: row.title,
            content: row.content,
            tags,
            subject: row.subject,
            is_public: row.is_public,
            author: Author {
                id: row.author_id,
                name: row.author_name,
                email: row.author_email,
            },
            file,
            view_count: row.view_count.max(0) as u64,
            like_count: row.like_count.max(0) as u64,
            created_at: from_micros(row.created_at)?,
            updated_at: from_micros(row.updated_at)?,
            id: row.id,
        })
    }
}

fn tags_json(tags: &[String]) -> Result<String, DomainError> {
    serde_json::to_string(tags).map_err(|e| DomainError::Backend(e.to_string()))
}

/// WHERE clause and parameters for the predicate part of a filter.
fn where_clause(filter: &NoteFilter) -> (String, Vec<Value>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(author_id) = filter.author_id() {
        clauses.push("author_id = ?".to_string());
        values.push(Value::Text(author_id.to_string()));
    }
    if let Some(is_public) = filter.is_public() {
        clauses.push("is_public = ?".to_string());
        values.push(Value::Integer(i64::from(is_public)));
    }
    if let Some(subject) = filter.subject() {
        clauses.push("subject = ?".to_string());
        values.push(Value::Text(subject.to_string()));
    }
    if !filter.tags().is_empty() {
        let placeholders = vec!["?"; filter.tags().len()].join(", ");
        clauses.push(format!(
            "EXISTS (SELECT 1 FROM json_each(notes.tags) WHERE json_each.value IN ({}))",
            placeholders
        ));
        values.extend(filter.tags().iter().cloned().map(Value::Text));
    }

    let sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    (sql, values)
}

/// Insertion order (`rowid`) breaks ties between equal keys.
fn order_clause(order: NoteOrder) -> &'static str {
    match order {
        NoteOrder::Recent => " ORDER BY created_at DESC, rowid ASC",
        NoteOrder::Popular => " ORDER BY like_count DESC, view_count DESC, rowid ASC",
    }
}

/// Document backend stored in a local SQLite file.
pub struct SqliteBackend {
    conn: Connection,
    path: Option<PathBuf>,
    clock: ServerClock,
    subscriptions: SubscriptionRegistry,
}

impl SqliteBackend {
    /// Open or create the database at `path`, creating parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = PathBuf::from(path.as_ref());
        debug!(?path, "Opening note database");

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory {}", parent.display())
                })?;
            }
        }
        if let Ok(metadata) = fs::metadata(&path) {
            if metadata.permissions().readonly() {
                return Err(DomainError::Backend(format!(
                    "No write permission for database: {}",
                    path.display()
                ))
                .into());
            }
        }

        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open note database {}", path.display()))?;
        let backend = Self::init(conn, Some(path.clone()))?;
        info!(?path, "Opened note database");
        Ok(backend)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::init(conn, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize note schema")?;
        let last: Option<i64> = conn
            .query_row("SELECT MAX(updated_at) FROM notes", [], |row| row.get(0))
            .context("Failed to read latest timestamp")?;
        let last = last.map(from_micros).transpose()?;
        Ok(Self {
            conn,
            path,
            clock: ServerClock::resume_after(last),
            subscriptions: SubscriptionRegistry::new(),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn query(&self, filter: &NoteFilter) -> Result<Vec<Note>, DomainError> {
        check_backend_support(filter)?;
        let (where_sql, mut values) = where_clause(filter);
        let mut sql = format!(
            "SELECT {} FROM notes{}{}",
            NOTE_COLUMNS,
            where_sql,
            order_clause(filter.order())
        );
        if let Some(limit) = filter.limit() {
            sql.push_str(" LIMIT ?");
            values.push(Value::Integer(limit as i64));
        }
        self.fetch(&sql, values)
    }

    fn fetch(&self, sql: &str, values: Vec<Value>) -> Result<Vec<Note>, DomainError> {
        let mut stmt = self.conn.prepare(sql).map_err(backend_err)?;
        let rows = stmt
            .query_map(params_from_iter(values), NoteRow::from_row)
            .map_err(backend_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(backend_err)?;
        rows.into_iter().map(Note::try_from).collect()
    }

    fn find(&self, id: &str) -> Result<Note, DomainError> {
        let sql = format!("SELECT {} FROM notes WHERE id = ?1", NOTE_COLUMNS);
        let row = self
            .conn
            .query_row(&sql, params![id], NoteRow::from_row)
            .optional()
            .map_err(backend_err)?
            .ok_or_else(|| DomainError::NoteNotFound(id.to_string()))?;
        Note::try_from(row)
    }

    fn find_owned(&self, caller: &str, id: &str) -> Result<Note, DomainError> {
        let note = self.find(id)?;
        if !note.is_authored_by(caller) {
            return Err(DomainError::Permission {
                user: caller.to_string(),
                note: id.to_string(),
            });
        }
        Ok(note)
    }

    fn changed(&self) {
        self.subscriptions.publish(|filter| self.query(filter));
    }
}

impl NoteRepository for SqliteBackend {
    #[instrument(level = "debug", skip(self, draft))]
    fn create_note(&mut self, draft: NoteDraft) -> Result<String, DomainError> {
        let draft = draft.validate()?;
        let id = Uuid::new_v4().to_string();
        let now = to_micros(self.clock.now());
        let file = draft.file.as_ref();

        self.conn
            .execute(
                &format!(
                    "INSERT INTO notes ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, \
                     ?11, ?12, ?13, 0, 0, ?14, ?14)",
                    NOTE_COLUMNS
                ),
                params![
                    id,
                    draft.title,
                    draft.content,
                    draft.kind.as_str(),
                    tags_json(&draft.tags)?,
                    draft.subject,
                    draft.is_public,
                    draft.author.id,
                    draft.author.name,
                    draft.author.email,
                    file.map(|f| f.url.as_str()),
                    file.map(|f| f.name.as_str()),
                    file.map(|f| f.size as i64),
                    now,
                ],
            )
            .map_err(backend_err)?;

        debug!(note_id = %id, "Inserted note");
        self.changed();
        Ok(id)
    }

    #[instrument(level = "debug", skip(self))]
    fn get_note(&mut self, id: &str) -> Result<Note, DomainError> {
        self.find(id)
    }

    #[instrument(level = "debug", skip(self, patch))]
    fn update_note(&mut self, caller: &str, id: &str, patch: NotePatch) -> Result<(), DomainError> {
        let mut note = self.find_owned(caller, id)?;
        let now = self.clock.now();
        note.apply(patch, now)?;

        self.conn
            .execute(
                "UPDATE notes SET title = ?2, content = ?3, tags = ?4, subject = ?5, \
                 is_public = ?6, updated_at = ?7 WHERE id = ?1",
                params![
                    id,
                    note.title,
                    note.content,
                    tags_json(&note.tags)?,
                    note.subject,
                    note.is_public,
                    to_micros(note.updated_at),
                ],
            )
            .map_err(backend_err)?;

        self.changed();
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    fn update_counters(&mut self, id: &str, patch: CounterPatch) -> Result<(), DomainError> {
        let now = to_micros(self.clock.now());
        let updated = self
            .conn
            .execute(
                "UPDATE notes SET view_count = COALESCE(?2, view_count), \
                 like_count = COALESCE(?3, like_count), updated_at = ?4 WHERE id = ?1",
                params![
                    id,
                    patch.view_count.map(|v| v as i64),
                    patch.like_count.map(|v| v as i64),
                    now,
                ],
            )
            .map_err(backend_err)?;
        if updated == 0 {
            return Err(DomainError::NoteNotFound(id.to_string()));
        }

        self.changed();
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    fn delete_note(&mut self, caller: &str, id: &str) -> Result<(), DomainError> {
        self.find_owned(caller, id)?;
        self.conn
            .execute("DELETE FROM notes WHERE id = ?1", params![id])
            .map_err(backend_err)?;

        info!(note_id = id, "Deleted note");
        self.changed();
        Ok(())
    }

    fn list_notes(&mut self, filter: &NoteFilter) -> Result<Vec<Note>, DomainError> {
        self.query(filter)
    }

    /// Scans the first `SEARCH_SCAN_LIMIT` notes of the scope in SQL and matches
    /// the text in Rust with Unicode case folding.
    #[instrument(level = "debug", skip(self, filter))]
    fn search_notes(&mut self, query: &str, filter: &NoteFilter) -> Result<Vec<Note>, DomainError> {
        check_backend_support(filter)?;
        let (where_sql, mut values) = where_clause(filter);
        let sql = format!(
            "SELECT {} FROM notes{}{} LIMIT ?",
            NOTE_COLUMNS,
            where_sql,
            order_clause(filter.order())
        );
        values.push(Value::Integer(SEARCH_SCAN_LIMIT as i64));

        let scanned = self.fetch(&sql, values)?;
        let mut hits: Vec<Note> = scanned.into_iter().filter(|n| matches_text(n, query)).collect();
        if let Some(limit) = filter.limit() {
            hits.truncate(limit);
        }
        debug!(hits = hits.len(), "Searched notes");
        Ok(hits)
    }

    fn subscribe(
        &mut self,
        filter: NoteFilter,
        listener: SnapshotListener,
    ) -> Result<Subscription, DomainError> {
        let initial = self.query(&filter)?;
        Ok(self.subscriptions.register(filter, listener, &initial))
    }
}

impl CounterStore for SqliteBackend {
    fn get_counter(&mut self, kind: CounterKind, name: &str) -> Result<Option<Counter>, DomainError> {
        self.conn
            .query_row(
                "SELECT name, color, count FROM counters WHERE kind = ?1 AND name = ?2",
                params![kind.collection(), name],
                |row| {
                    Ok(Counter {
                        name: row.get(0)?,
                        color: row.get(1)?,
                        count: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(backend_err)
    }

    fn put_counter(&mut self, kind: CounterKind, counter: Counter) -> Result<(), DomainError> {
        self.conn
            .execute(
                "INSERT INTO counters (kind, name, color, count) VALUES (?1, ?2, ?3, ?4) \
                 ON CONFLICT (kind, name) DO UPDATE SET color = excluded.color, count = excluded.count",
                params![kind.collection(), counter.name, counter.color, counter.count],
            )
            .map_err(backend_err)?;
        Ok(())
    }

    fn list_counters(&mut self, kind: CounterKind) -> Result<Vec<Counter>, DomainError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT name, color, count FROM counters WHERE kind = ?1 \
                 ORDER BY count DESC, name ASC",
            )
            .map_err(backend_err)?;
        let counters = stmt
            .query_map(params![kind.collection()], |row| {
                Ok(Counter {
                    name: row.get(0)?,
                    color: row.get(1)?,
                    count: row.get(2)?,
                })
            })
            .map_err(backend_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(backend_err)?;
        Ok(counters)
    }
}

impl UserStore for SqliteBackend {
    fn get_user(&mut self, id: &str) -> Result<Option<User>, DomainError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, email, display_name, photo_url, created_at, updated_at \
                 FROM users WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, i64>(5)?,
                    ))
                },
            )
            .optional()
            .map_err(backend_err)?;

        row.map(|(id, email, display_name, photo_url, created, updated)| {
            Ok(User {
                id,
                email,
                display_name,
                photo_url,
                created_at: from_micros(created)?,
                updated_at: from_micros(updated)?,
            })
        })
        .transpose()
    }

    fn put_user(&mut self, user: &User) -> Result<(), DomainError> {
        self.conn
            .execute(
                "INSERT INTO users (id, email, display_name, photo_url, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
                 ON CONFLICT (id) DO UPDATE SET email = excluded.email, \
                 display_name = excluded.display_name, photo_url = excluded.photo_url, \
                 updated_at = excluded.updated_at",
                params![
                    user.id,
                    user.email,
                    user.display_name,
                    user.photo_url,
                    to_micros(user.created_at),
                    to_micros(user.updated_at),
                ],
            )
            .map_err(backend_err)?;
        Ok(())
    }
}
