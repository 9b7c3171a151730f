//! SQLite storage backend for slipgraph

use super::traits::{CommitReport, GraphSink, OpenStore, StorageError, StorageResult, Table};
use crate::graph::{Graph, Link, Note, NoteId, Sequence, Warning};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Params, Statement};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Schema migrations, applied in order. `PRAGMA user_version` records how
/// many have run.
const MIGRATIONS: &[&str] = &[
    // 1: base tables
    r#"
    CREATE TABLE IF NOT EXISTS Files (
        filename TEXT PRIMARY KEY
    );

    CREATE TABLE IF NOT EXISTS Notes (
        id INTEGER PRIMARY KEY,
        title TEXT NOT NULL,
        filename TEXT NOT NULL,
        FOREIGN KEY (filename) REFERENCES Files(filename)
    );

    CREATE TABLE IF NOT EXISTS Aliases (
        alias TEXT PRIMARY KEY,
        id INTEGER NOT NULL,
        owner INTEGER NOT NULL,
        FOREIGN KEY (id) REFERENCES Notes(id),
        FOREIGN KEY (owner) REFERENCES Notes(id)
    );

    CREATE TABLE IF NOT EXISTS Sequences (
        prev TEXT NOT NULL,
        next TEXT NOT NULL,
        PRIMARY KEY (prev, next),
        FOREIGN KEY (prev) REFERENCES Aliases(alias),
        FOREIGN KEY (next) REFERENCES Aliases(alias)
    );

    CREATE TABLE IF NOT EXISTS Links (
        src INTEGER NOT NULL,
        dest INTEGER NOT NULL,
        annotation TEXT NOT NULL DEFAULT '',
        PRIMARY KEY (src, dest, annotation),
        FOREIGN KEY (src) REFERENCES Notes(id),
        FOREIGN KEY (dest) REFERENCES Notes(id)
    );

    CREATE TABLE IF NOT EXISTS Tags (
        id INTEGER NOT NULL,
        tag TEXT NOT NULL,
        PRIMARY KEY (id, tag),
        FOREIGN KEY (id) REFERENCES Notes(id)
    );

    CREATE TABLE IF NOT EXISTS Bibliography (
        key TEXT PRIMARY KEY,
        text TEXT NOT NULL DEFAULT ''
    );

    CREATE TABLE IF NOT EXISTS Citations (
        note INTEGER NOT NULL,
        reference TEXT NOT NULL,
        PRIMARY KEY (note, reference),
        FOREIGN KEY (note) REFERENCES Notes(id),
        FOREIGN KEY (reference) REFERENCES Bibliography(key)
    );
    "#,
    // 2: reverse lookups used by backlinks, alias ownership and tag pages
    r#"
    CREATE INDEX IF NOT EXISTS idx_links_dest ON Links(dest);
    CREATE INDEX IF NOT EXISTS idx_aliases_id ON Aliases(id);
    CREATE INDEX IF NOT EXISTS idx_tags_tag ON Tags(tag);
    "#,
];

/// SQLite-backed graph sink
///
/// Uses a single SQLite database file with one table per fact category.
/// Thread-safe via internal mutex on the connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Initialize the database schema
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            -- Enable foreign keys
            PRAGMA foreign_keys = ON;

            -- Readers can query the index while a build commits
            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Self::migrate(conn)
    }

    /// Run the migrations this database has not seen yet
    fn migrate(conn: &Connection) -> StorageResult<()> {
        let applied: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
        let applied = usize::try_from(applied).unwrap_or_default();
        for (index, sql) in MIGRATIONS.iter().enumerate().skip(applied) {
            let version = i64::try_from(index + 1).unwrap_or(i64::MAX);
            debug!(version, "applying schema migration");
            conn.execute_batch(sql)?;
            conn.pragma_update(None, "user_version", version)?;
        }
        Ok(())
    }

    /// Current schema version
    pub fn schema_version(&self) -> StorageResult<usize> {
        let conn = self.conn()?;
        let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
        Ok(usize::try_from(version).unwrap_or_default())
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Load a note by ID
    pub fn load_note(&self, id: NoteId) -> StorageResult<Option<Note>> {
        let conn = self.conn()?;
        let row: Option<(i64, String, String)> = conn
            .query_row(
                "SELECT id, title, filename FROM Notes WHERE id = ?1",
                params![sql_id(id)?],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        match row {
            Some((id, title, filename)) => Ok(Some(Note {
                id: note_id(Table::Notes, id)?,
                title,
                filename,
            })),
            None => Ok(None),
        }
    }

    /// Links leaving a note, in insertion order
    pub fn load_links_from(&self, src: NoteId) -> StorageResult<Vec<Link>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT src, dest, annotation FROM Links WHERE src = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![sql_id(src)?], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut links = Vec::new();
        for row in rows {
            let (src, dest, annotation) = row?;
            links.push(Link {
                src: note_id(Table::Links, src)?,
                dest: note_id(Table::Links, dest)?,
                description: annotation,
            });
        }
        Ok(links)
    }

    /// All stored sequences, ordered by `(prev, next)`
    pub fn load_sequences(&self) -> StorageResult<Vec<Sequence>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT prev, next FROM Sequences ORDER BY prev, next")?;
        let rows = stmt.query_map([], |row| {
            Ok(Sequence {
                prev: row.get(0)?,
                next: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Number of rows in a table
    pub fn count_rows(&self, table: Table) -> StorageResult<usize> {
        let conn = self.conn()?;
        let sql = format!("SELECT COUNT(*) FROM {}", table.as_str());
        let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

fn sql_id(id: NoteId) -> StorageResult<i64> {
    i64::try_from(id.get()).map_err(|_| StorageError::IdOutOfRange(id.get()))
}

fn note_id(table: Table, raw: i64) -> StorageResult<NoteId> {
    NoteId::try_from_raw(raw).map_err(|err| StorageError::InvalidRow {
        table: table.as_str(),
        detail: err.to_string(),
    })
}

/// Run a plain INSERT. Returns false when the row violated a constraint;
/// every other failure is an error.
fn try_insert<P: Params>(stmt: &mut Statement<'_>, params: P) -> StorageResult<bool> {
    match stmt.execute(params) {
        Ok(_) => Ok(true),
        Err(rusqlite::Error::SqliteFailure(err, _)) if err.code == ErrorCode::ConstraintViolation => {
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl GraphSink for SqliteStore {
    fn save_notes(&self, graph: &Graph, report: &mut CommitReport) -> StorageResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut file = tx.prepare("INSERT OR IGNORE INTO Files (filename) VALUES (?1)")?;
            let mut insert =
                tx.prepare("INSERT INTO Notes (id, title, filename) VALUES (?1, ?2, ?3)")?;
            let mut existing = tx.prepare("SELECT title, filename FROM Notes WHERE id = ?1")?;

            for note in graph.notes() {
                let id = sql_id(note.id)?;
                let files = file.execute(params![note.filename])?;
                report.record_insert(Table::Files, files);

                if try_insert(&mut insert, params![id, note.title, note.filename])? {
                    report.record_insert(Table::Notes, 1);
                    continue;
                }

                let row: Option<(String, String)> = existing
                    .query_row(params![id], |row| Ok((row.get(0)?, row.get(1)?)))
                    .optional()?;
                match row {
                    Some((title, filename)) if title == note.title && filename == note.filename => {
                        report.unchanged += 1;
                    }
                    Some((existing_title, existing_filename)) => {
                        report.warn(Warning::NoteConflict {
                            id: note.id,
                            title: note.title.to_string(),
                            filename: note.filename.to_string(),
                            existing_title,
                            existing_filename,
                        });
                    }
                    None => report.warn(Warning::RowSkipped {
                        table: Table::Notes.as_str(),
                        detail: format!("note {}", note.id),
                    }),
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn save_citations(&self, graph: &Graph, report: &mut CommitReport) -> StorageResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut key =
                tx.prepare("INSERT OR IGNORE INTO Bibliography (key, text) VALUES (?1, '')")?;
            let mut text = tx.prepare("UPDATE Bibliography SET text = ?1 WHERE key = ?2")?;
            let mut insert = tx.prepare("INSERT INTO Citations (note, reference) VALUES (?1, ?2)")?;
            let mut existing =
                tx.prepare("SELECT 1 FROM Citations WHERE note = ?1 AND reference = ?2")?;

            for (cited, body) in graph.bibliography() {
                let keys = key.execute(params![cited])?;
                report.record_insert(Table::Bibliography, keys);
                if !body.is_empty() {
                    text.execute(params![body, cited])?;
                }
            }

            for citation in graph.citations() {
                let id = sql_id(citation.id)?;
                if try_insert(&mut insert, params![id, citation.key])? {
                    report.record_insert(Table::Citations, 1);
                } else if existing.exists(params![id, citation.key])? {
                    report.unchanged += 1;
                } else {
                    report.warn(Warning::RowSkipped {
                        table: Table::Citations.as_str(),
                        detail: format!("note {} citing '{}'", citation.id, citation.key),
                    });
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn save_aliases(&self, graph: &Graph, report: &mut CommitReport) -> StorageResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut insert =
                tx.prepare("INSERT OR IGNORE INTO Aliases (alias, id, owner) VALUES (?1, ?2, ?3)")?;
            for alias in graph.aliases() {
                let rows = insert.execute(params![
                    alias.alias,
                    sql_id(alias.id)?,
                    sql_id(alias.owner)?
                ])?;
                report.record_insert(Table::Aliases, rows);
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn save_sequences(&self, graph: &Graph, report: &mut CommitReport) -> StorageResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut insert = tx.prepare("INSERT INTO Sequences (prev, next) VALUES (?1, ?2)")?;
            let mut existing =
                tx.prepare("SELECT 1 FROM Sequences WHERE prev = ?1 AND next = ?2")?;
            let mut owner = tx.prepare("SELECT id FROM Aliases WHERE alias = ?1")?;

            let sequences = graph.sequences().iter().chain(graph.dangling_sequences());
            for sequence in sequences {
                if try_insert(&mut insert, params![sequence.prev, sequence.next])? {
                    report.record_insert(Table::Sequences, 1);
                    continue;
                }
                if existing.exists(params![sequence.prev, sequence.next])? {
                    report.unchanged += 1;
                    continue;
                }

                // Assume `prev` is the alias that is missing
                let note = owner
                    .query_row(params![sequence.next], |row| row.get::<_, i64>(0))
                    .optional()?
                    .map(|raw| note_id(Table::Aliases, raw))
                    .transpose()?;
                report.warn(Warning::MissingAlias {
                    prev: sequence.prev.clone(),
                    next: sequence.next.clone(),
                    note,
                });
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn save_links(&self, graph: &Graph, report: &mut CommitReport) -> StorageResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut insert =
                tx.prepare("INSERT INTO Links (src, dest, annotation) VALUES (?1, ?2, ?3)")?;
            let mut existing = tx.prepare(
                "SELECT 1 FROM Links WHERE src = ?1 AND dest = ?2 AND annotation = ?3",
            )?;

            for link in graph.links() {
                let (src, dest) = (sql_id(link.src)?, sql_id(link.dest)?);
                if try_insert(&mut insert, params![src, dest, link.description])? {
                    report.record_insert(Table::Links, 1);
                } else if existing.exists(params![src, dest, link.description])? {
                    report.unchanged += 1;
                } else {
                    report.warn(Warning::RowSkipped {
                        table: Table::Links.as_str(),
                        detail: format!("link {} -> {}", link.src, link.dest),
                    });
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn save_tags(&self, graph: &Graph, report: &mut CommitReport) -> StorageResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut insert = tx.prepare("INSERT OR IGNORE INTO Tags (id, tag) VALUES (?1, ?2)")?;
            for tag in graph.tags() {
                let rows = insert.execute(params![sql_id(tag.id)?, tag.tag])?;
                report.record_insert(Table::Tags, rows);
            }
        }
        tx.commit()?;
        Ok(())
    }
}
