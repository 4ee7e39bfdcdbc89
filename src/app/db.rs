use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::models::*;
use crate::errors::TodoError;

/// Shared handle to the todo database.
///
/// Wraps `TodoDb` behind `Arc<Mutex>`. Every repository call made through the
/// handle takes the lock for the duration of one query, so callers on the
/// async side must run it on the blocking pool.
#[derive(Clone)]
pub struct DbHandle {
    inner: Arc<std::sync::Mutex<TodoDb>>,
}

impl DbHandle {
    pub fn new(db: TodoDb) -> Self {
        Self {
            inner: Arc::new(std::sync::Mutex::new(db)),
        }
    }

    /// Acquire the database mutex synchronously.
    pub fn lock_sync(&self) -> Result<std::sync::MutexGuard<'_, TodoDb>> {
        self.inner
            .lock()
            .map_err(|_| TodoError::LockPoisoned.into())
    }
}

#[derive(Debug)]
pub struct TodoDb {
    conn: Connection,
}

const GROUP_COLUMNS: &str = "id, title, email, created_at, updated_at";
const ITEM_COLUMNS: &str =
    "id, activity_group_id, title, is_active, priority, created_at, updated_at";

fn group_from_row(row: &Row<'_>) -> rusqlite::Result<ActivityGroup> {
    Ok(ActivityGroup {
        id: row.get(0)?,
        title: row.get(1)?,
        email: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
        todo_items: None,
    })
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<TodoItem> {
    Ok(TodoItem {
        id: row.get(0)?,
        activity_group_id: row.get(1)?,
        title: row.get(2)?,
        is_active: row.get(3)?,
        priority: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

impl TodoDb {
    /// Open (or create) a SQLite database at the given path and run migrations.
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).context("Failed to open SQLite database")?;
        let db = Self { conn };
        db.run_migrations().context("Failed to run migrations")?;
        Ok(db)
    }

    /// Create an in-memory SQLite database (for testing).
    pub fn new_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        let db = Self { conn };
        db.run_migrations().context("Failed to run migrations")?;
        Ok(db)
    }

    fn run_migrations(&self) -> Result<()> {
        // todos.activity_group_id has no foreign key; deleting a group leaves
        // its items in place.
        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS activities (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL,
                    email TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS todos (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    activity_group_id INTEGER NOT NULL,
                    title TEXT NOT NULL,
                    is_active INTEGER NOT NULL DEFAULT 1,
                    priority TEXT NOT NULL DEFAULT 'very-high',
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_activities_email ON activities(email);
                CREATE INDEX IF NOT EXISTS idx_activities_updated ON activities(updated_at);
                CREATE INDEX IF NOT EXISTS idx_todos_group ON todos(activity_group_id);
                ",
            )
            .context("Failed to create tables")?;
        Ok(())
    }

    // ── Activity group CRUD ───────────────────────────────────────────

    pub fn activity_group_exists(&self, id: i64) -> Result<bool> {
        self.conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM activities WHERE id = ?1)",
                params![id],
                |row| row.get(0),
            )
            .context("Failed to check activity group existence")
    }

    /// Fetch one group with its todo items loaded.
    pub fn get_activity_group(&self, id: i64) -> Result<Option<ActivityGroup>> {
        let group = self
            .conn
            .query_row(
                &format!("SELECT {GROUP_COLUMNS} FROM activities WHERE id = ?1"),
                params![id],
                group_from_row,
            )
            .optional()
            .context("Failed to query activity group")?;

        match group {
            Some(mut group) => {
                group.todo_items = Some(self.list_todo_items_by_group(id)?);
                Ok(Some(group))
            }
            None => Ok(None),
        }
    }

    pub fn list_activity_groups(&self) -> Result<Vec<ActivityGroup>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {GROUP_COLUMNS} FROM activities ORDER BY updated_at, id LIMIT ?1"
            ))
            .context("Failed to prepare list_activity_groups")?;
        let rows = stmt
            .query_map(params![LIST_CAP], group_from_row)
            .context("Failed to query activity groups")?;
        let mut groups = Vec::new();
        for row in rows {
            groups.push(row.context("Failed to read activity group row")?);
        }
        Ok(groups)
    }

    pub fn list_activity_groups_by_email(&self, email: &str) -> Result<Vec<ActivityGroup>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {GROUP_COLUMNS} FROM activities WHERE email = ?1
                 ORDER BY updated_at, id LIMIT ?2"
            ))
            .context("Failed to prepare list_activity_groups_by_email")?;
        let rows = stmt
            .query_map(params![email, LIST_CAP], group_from_row)
            .context("Failed to query activity groups by email")?;
        let mut groups = Vec::new();
        for row in rows {
            groups.push(row.context("Failed to read activity group row")?);
        }
        Ok(groups)
    }

    pub fn create_activity_group(&self, draft: &NewActivityGroup) -> Result<ActivityGroup> {
        self.conn
            .execute(
                "INSERT INTO activities (title, email, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
                params![draft.title, draft.email, draft.created_at, draft.updated_at],
            )
            .context("Failed to insert activity group")?;
        let id = self.conn.last_insert_rowid();
        self.conn
            .query_row(
                &format!("SELECT {GROUP_COLUMNS} FROM activities WHERE id = ?1"),
                params![id],
                group_from_row,
            )
            .context("Activity group not found after insert")
    }

    /// Write back title, email and updated_at. Children are not touched and
    /// are not loaded into the returned record.
    pub fn update_activity_group(&self, group: &ActivityGroup) -> Result<ActivityGroup> {
        self.conn
            .execute(
                "UPDATE activities SET title = ?1, email = ?2, updated_at = ?3 WHERE id = ?4",
                params![group.title, group.email, group.updated_at, group.id],
            )
            .context("Failed to update activity group")?;
        self.conn
            .query_row(
                &format!("SELECT {GROUP_COLUMNS} FROM activities WHERE id = ?1"),
                params![group.id],
                group_from_row,
            )
            .context("Activity group not found after update")
    }

    /// Returns whether a row was removed.
    pub fn delete_activity_group(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM activities WHERE id = ?1", params![id])
            .context("Failed to delete activity group")?;
        Ok(affected > 0)
    }

    // ── Todo item CRUD ────────────────────────────────────────────────

    pub fn todo_item_exists(&self, id: i64) -> Result<bool> {
        self.conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM todos WHERE id = ?1)",
                params![id],
                |row| row.get(0),
            )
            .context("Failed to check todo item existence")
    }

    pub fn get_todo_item(&self, id: i64) -> Result<Option<TodoItem>> {
        self.conn
            .query_row(
                &format!("SELECT {ITEM_COLUMNS} FROM todos WHERE id = ?1"),
                params![id],
                item_from_row,
            )
            .optional()
            .context("Failed to query todo item")
    }

    pub fn list_todo_items(&self) -> Result<Vec<TodoItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {ITEM_COLUMNS} FROM todos ORDER BY id"))
            .context("Failed to prepare list_todo_items")?;
        let rows = stmt
            .query_map([], item_from_row)
            .context("Failed to query todo items")?;
        let mut items = Vec::new();
        for row in rows {
            items.push(row.context("Failed to read todo item row")?);
        }
        Ok(items)
    }

    pub fn list_todo_items_by_group(&self, activity_group_id: i64) -> Result<Vec<TodoItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {ITEM_COLUMNS} FROM todos WHERE activity_group_id = ?1 ORDER BY id"
            ))
            .context("Failed to prepare list_todo_items_by_group")?;
        let rows = stmt
            .query_map(params![activity_group_id], item_from_row)
            .context("Failed to query todo items by group")?;
        let mut items = Vec::new();
        for row in rows {
            items.push(row.context("Failed to read todo item row")?);
        }
        Ok(items)
    }

    pub fn create_todo_item(&self, draft: &NewTodoItem) -> Result<TodoItem> {
        self.conn
            .execute(
                "INSERT INTO todos (activity_group_id, title, is_active, priority, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    draft.activity_group_id,
                    draft.title,
                    draft.is_active,
                    draft.priority,
                    draft.created_at,
                    draft.updated_at
                ],
            )
            .context("Failed to insert todo item")?;
        let id = self.conn.last_insert_rowid();
        self.get_todo_item(id)?
            .context("Todo item not found after insert")
    }

    pub fn update_todo_item(&self, item: &TodoItem) -> Result<TodoItem> {
        self.conn
            .execute(
                "UPDATE todos SET activity_group_id = ?1, title = ?2, is_active = ?3, priority = ?4, updated_at = ?5
                 WHERE id = ?6",
                params![
                    item.activity_group_id,
                    item.title,
                    item.is_active,
                    item.priority,
                    item.updated_at,
                    item.id
                ],
            )
            .context("Failed to update todo item")?;
        self.get_todo_item(item.id)?
            .context("Todo item not found after update")
    }

    pub fn delete_todo_item(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM todos WHERE id = ?1", params![id])
            .context("Failed to delete todo item")?;
        Ok(affected > 0)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
