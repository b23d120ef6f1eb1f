//! Persistence for todos.
//!
//! # Design
//! Handlers never see a monolithic store. Each operation is its own
//! capability trait (`GetAll`, `GetOneById`, `CreateOne`, `UpdateOneById`)
//! so a handler depends only on what it calls and tests can substitute a
//! stand-in that implements a single method.
//!
//! "No matching row" is reported as `Ok(None)`, which keeps it apart from
//! `Err(StoreError)`: handlers map the former to 404 and the latter to 500.
//!
//! `SqliteStore` owns one SQLite connection behind a mutex. Every query runs
//! on tokio's blocking pool so the async workers are never parked on disk
//! I/O; the mutex serialises access, which is the isolation level this
//! service relies on.

use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::model::{NewTodo, Todo, TodoPatch};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS todos (
    todo_id      TEXT    PRIMARY KEY NOT NULL,
    task         TEXT    NOT NULL CHECK (trim(task) <> ''),
    is_completed INTEGER NOT NULL DEFAULT 0,
    created_at   INTEGER NOT NULL,
    updated_at   INTEGER NOT NULL
);";

const TODO_COLUMNS: &str = "todo_id, task, is_completed, created_at, updated_at";

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored row could not be decoded into a `Todo`.
    #[error("invalid persisted todo: {0}")]
    InvalidData(String),

    /// The connection could not be reached (poisoned lock, blocking task
    /// failure).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Read every todo in storage order.
pub trait GetAll: Send + Sync + 'static {
    fn get_all(&self) -> impl Future<Output = StoreResult<Vec<Todo>>> + Send;
}

/// Read a single todo; `Ok(None)` when no row has this id.
pub trait GetOneById: Send + Sync + 'static {
    fn get_one_by_id(&self, id: Uuid) -> impl Future<Output = StoreResult<Option<Todo>>> + Send;
}

/// Insert a new todo, assigning its id and timestamps.
pub trait CreateOne: Send + Sync + 'static {
    fn create_one(&self, input: NewTodo) -> impl Future<Output = StoreResult<Todo>> + Send;
}

/// Apply a partial update; `Ok(None)` when no row has this id. Never inserts.
pub trait UpdateOneById: Send + Sync + 'static {
    fn update_one_by_id(
        &self,
        id: Uuid,
        patch: TodoPatch,
    ) -> impl Future<Output = StoreResult<Option<Todo>>> + Send;
}

/// SQLite-backed todo store. Cloning shares the underlying connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a database file and make sure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "opened sqlite database");
        Self::bootstrap(conn)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        debug!("opened in-memory sqlite database");
        Self::bootstrap(conn)
    }

    fn bootstrap(conn: Connection) -> StoreResult<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn call<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))?;
            f(&guard)
        })
        .await
        .map_err(|err| StoreError::Unavailable(err.to_string()))?
    }
}

impl GetAll for SqliteStore {
    async fn get_all(&self) -> StoreResult<Vec<Todo>> {
        self.call(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {TODO_COLUMNS} FROM todos ORDER BY rowid"))?;
            let rows = stmt
                .query_map([], TodoRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows.into_iter().map(Todo::try_from).collect()
        })
        .await
    }
}

impl GetOneById for SqliteStore {
    async fn get_one_by_id(&self, id: Uuid) -> StoreResult<Option<Todo>> {
        self.call(move |conn| {
            conn.query_row(
                &format!("SELECT {TODO_COLUMNS} FROM todos WHERE todo_id = ?1"),
                params![id.to_string()],
                TodoRow::from_row,
            )
            .optional()?
            .map(Todo::try_from)
            .transpose()
        })
        .await
    }
}

impl CreateOne for SqliteStore {
    async fn create_one(&self, input: NewTodo) -> StoreResult<Todo> {
        let id = Uuid::new_v4();
        let now = Utc::now().timestamp_micros();
        let todo = self
            .call(move |conn| {
                let row = conn.query_row(
                    &format!(
                        "INSERT INTO todos ({TODO_COLUMNS})
                         VALUES (?1, ?2, ?3, ?4, ?4)
                         RETURNING {TODO_COLUMNS}"
                    ),
                    params![id.to_string(), input.task, input.is_completed, now],
                    TodoRow::from_row,
                )?;
                Todo::try_from(row)
            })
            .await?;
        debug!(todo_id = %todo.todo_id, "created todo");
        Ok(todo)
    }
}

impl UpdateOneById for SqliteStore {
    async fn update_one_by_id(&self, id: Uuid, patch: TodoPatch) -> StoreResult<Option<Todo>> {
        let now = Utc::now().timestamp_micros();
        self.call(move |conn| {
            // MAX keeps updated_at monotonic even if the wall clock steps back.
            conn.query_row(
                &format!(
                    "UPDATE todos
                     SET task         = COALESCE(?1, task),
                         is_completed = COALESCE(?2, is_completed),
                         updated_at   = MAX(?3, updated_at)
                     WHERE todo_id = ?4
                     RETURNING {TODO_COLUMNS}"
                ),
                params![patch.task, patch.is_completed, now, id.to_string()],
                TodoRow::from_row,
            )
            .optional()?
            .map(Todo::try_from)
            .transpose()
        })
        .await
    }
}

/// Raw column values, decoded into a `Todo` outside the rusqlite closure so
/// bad ids and timestamps surface as `InvalidData`.
struct TodoRow {
    todo_id: String,
    task: String,
    is_completed: bool,
    created_at: i64,
    updated_at: i64,
}

impl TodoRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            todo_id: row.get(0)?,
            task: row.get(1)?,
            is_completed: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }
}

impl TryFrom<TodoRow> for Todo {
    type Error = StoreError;

    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        let todo_id = Uuid::parse_str(&row.todo_id)
            .map_err(|err| StoreError::InvalidData(format!("todo_id {:?}: {err}", row.todo_id)))?;
        Ok(Todo {
            todo_id,
            task: row.task,
            is_completed: row.is_completed,
            created_at: timestamp_from_micros(row.created_at)?,
            updated_at: timestamp_from_micros(row.updated_at)?,
        })
    }
}

fn timestamp_from_micros(micros: i64) -> StoreResult<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| StoreError::InvalidData(format!("timestamp out of range: {micros}")))
}
