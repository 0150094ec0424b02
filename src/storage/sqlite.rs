//! SQLite event store over the planner's `events` table

use std::path::Path;

use rusqlite::{params, params_from_iter, Connection, OptionalExtension, ToSql};
use tracing::{debug, info};

use super::{EventId, EventRecord, EventUpdate, Storage};
use crate::error::StorageError;

const EVENT_COLUMNS: &str =
    "id, title, description, start_date, end_date, start_time, end_time, completed";

/// SQLite-backed event store
///
/// Reads and writes the same `events` table the planner keeps in `todo.db`.
/// Every update is a single `UPDATE` statement, so it either lands whole or
/// not at all.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open (or create) the database at `path`.
    ///
    /// Creates the `events` table if the database is new.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        apply_schema(&conn)?;
        info!("Opened event database {}", path.display());
        Ok(Self { conn })
    }

    /// Database that lives only as long as this value
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Insert an event and return its row id
    pub fn add_event(&self, event: &EventRecord) -> Result<EventId, StorageError> {
        self.conn.execute(
            "INSERT INTO events (id, title, description, start_date, end_date, start_time, end_time, completed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                event.id,
                event.title,
                event.description,
                event.start_date,
                event.end_date,
                event.start_time,
                event.end_time,
                event.completed,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }
}

impl Storage for SqliteStorage {
    fn get_event(&self, event_id: EventId) -> Result<Option<EventRecord>, StorageError> {
        let event = self
            .conn
            .query_row(
                &format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1"),
                params![event_id],
                row_to_event,
            )
            .optional()?;
        Ok(event)
    }

    fn update_event(&mut self, event_id: EventId, update: &EventUpdate) -> Result<usize, StorageError> {
        let mut columns = Vec::new();
        let mut values: Vec<&dyn ToSql> = Vec::new();
        if let Some(completed) = &update.completed {
            columns.push("completed = ?");
            values.push(completed);
        }
        if let Some(end_time) = &update.end_time {
            columns.push("end_time = ?");
            values.push(end_time);
        }
        if columns.is_empty() {
            return Ok(0);
        }
        values.push(&event_id);

        let sql = format!("UPDATE events SET {} WHERE id = ?", columns.join(", "));
        let affected = self.conn.execute(&sql, params_from_iter(values))?;
        debug!("Updated event {} ({} row(s))", event_id, affected);
        Ok(affected)
    }
}

fn apply_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT,
            start_date TEXT NOT NULL,
            end_date TEXT,
            start_time TEXT,
            end_time TEXT,
            completed INTEGER DEFAULT 0,
            is_recurring INTEGER DEFAULT 0,
            recurring_rule TEXT
        );
        "#,
    )
}

fn row_to_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<EventRecord> {
    let completed: Option<i64> = row.get(7)?;
    Ok(EventRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        start_date: row.get(3)?,
        end_date: row.get(4)?,
        start_time: row.get(5)?,
        end_time: row.get(6)?,
        completed: completed.unwrap_or(0) != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> SqliteStorage {
        let storage = SqliteStorage::open_in_memory().unwrap();
        storage
            .add_event(&EventRecord::new(1, "Write weekly report", "2026-02-18"))
            .unwrap();
        storage
    }

    #[test]
    fn missing_event_is_none() {
        let storage = seeded();

        assert!(storage.get_event(99).unwrap().is_none());
        assert!(storage.get_event(1).unwrap().is_some());
    }

    #[test]
    fn partial_update_touches_only_given_columns() {
        let mut storage = seeded();
        storage
            .conn
            .execute("UPDATE events SET end_time = '15:00' WHERE id = 1", [])
            .unwrap();

        assert_eq!(storage.update_event(1, &EventUpdate::completed()).unwrap(), 1);

        let event = storage.get_event(1).unwrap().unwrap();
        assert!(event.completed);
        assert_eq!(event.end_time.as_deref(), Some("15:00"));
        assert_eq!(event.title, "Write weekly report");
    }

    #[test]
    fn update_reports_affected_rows() {
        let mut storage = seeded();

        assert_eq!(storage.update_event(42, &EventUpdate::completed()).unwrap(), 0);
        assert_eq!(storage.update_event(1, &EventUpdate::default()).unwrap(), 0);
    }

    #[test]
    fn completed_flag_maps_any_nonzero_value() {
        let storage = seeded();
        storage
            .conn
            .execute(
                "INSERT INTO events (title, start_date, completed) VALUES ('Vocabulary', '2026-02-18', 2)",
                [],
            )
            .unwrap();
        storage
            .conn
            .execute(
                "INSERT INTO events (title, start_date, completed) VALUES ('Reading', '2026-02-18', NULL)",
                [],
            )
            .unwrap();

        assert!(storage.get_event(2).unwrap().unwrap().completed);
        assert!(!storage.get_event(3).unwrap().unwrap().completed);
    }

    #[test]
    fn rejected_update_leaves_row_unchanged() {
        let mut storage = seeded();
        storage
            .conn
            .execute_batch(
                "CREATE TRIGGER refuse_updates BEFORE UPDATE ON events
                 BEGIN SELECT RAISE(ABORT, 'database is locked'); END;",
            )
            .unwrap();

        let update = EventUpdate::completed().with_end_time("15:00");
        let err = storage.update_event(1, &update).unwrap_err();

        assert!(matches!(err, StorageError::Sqlite(_)));
        let event = storage.get_event(1).unwrap().unwrap();
        assert!(!event.completed);
        assert!(event.end_time.is_none());
    }

    #[test]
    fn updates_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("todo.db");

        let mut storage = SqliteStorage::open(&path).unwrap();
        storage
            .add_event(&EventRecord::new(1, "Write weekly report", "2026-02-18"))
            .unwrap();
        let update = EventUpdate::completed().with_end_time("15:00");
        assert_eq!(storage.update_event(1, &update).unwrap(), 1);
        drop(storage);

        let reopened = SqliteStorage::open(&path).unwrap();
        let event = reopened.get_event(1).unwrap().unwrap();
        assert!(event.completed);
        assert_eq!(event.end_time.as_deref(), Some("15:00"));
    }
}
