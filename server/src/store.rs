//! SQLite persistence for todos.
//!
//! # Design
//! `TodoStore` is a cheap-to-clone handle around an `SqlitePool` and is
//! shared with every handler through axum state. Each operation is a single
//! statement, except `reorder`, which rewrites many rows inside one
//! transaction. Lookups by id return `Option` and leave the not-found
//! decision to the caller.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};

use crate::model::{CreateTodo, PatchTodo, Priority, Todo};

const COLUMNS: &str = "id, text, completed, created_at, due_date, priority, category, sort_order";

/// Columns added after the first release, which only had
/// `id, text, completed, created_at`.
const LATER_COLUMNS: [(&str, &str); 4] = [
    ("due_date", "due_date INTEGER"),
    ("priority", "priority TEXT NOT NULL DEFAULT 'medium'"),
    ("category", "category TEXT"),
    ("sort_order", "sort_order INTEGER NOT NULL DEFAULT 0"),
];

#[derive(Clone, Debug)]
pub struct TodoStore {
    pool: SqlitePool,
}

impl TodoStore {
    /// Open the database at `url`, creating the file if it does not exist.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    /// A private in-memory database. Pinned to one connection, since every
    /// SQLite `:memory:` connection is a separate database.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::with_pool(pool).await
    }

    pub async fn with_pool(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS todos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER)),
                due_date INTEGER,
                priority TEXT NOT NULL DEFAULT 'medium',
                category TEXT,
                sort_order INTEGER NOT NULL DEFAULT 0
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        let existing: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_table_info('todos')")
            .fetch_all(&self.pool)
            .await?;
        let missing: Vec<_> = LATER_COLUMNS
            .iter()
            .filter(|(name, _)| !existing.iter().any(|column| column == name))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for (_, definition) in &missing {
            sqlx::query(&format!("ALTER TABLE todos ADD COLUMN {definition}"))
                .execute(&mut *tx)
                .await?;
        }
        if missing.iter().any(|(name, _)| *name == "sort_order") {
            // Keep the creation order of rows written before manual ordering existed.
            sqlx::query("UPDATE todos SET sort_order = id").execute(&mut *tx).await?;
        }
        tx.commit().await?;

        let names: Vec<&str> = missing.iter().map(|(name, _)| *name).collect();
        log::info!("upgraded todos table, added columns: {}", names.join(", "));
        Ok(())
    }

    /// All todos in display order.
    pub async fn list(&self) -> Result<Vec<Todo>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM todos ORDER BY sort_order ASC, id ASC");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(todo_from_row).collect()
    }

    pub async fn get(&self, id: i64) -> Result<Option<Todo>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM todos WHERE id = ?");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(todo_from_row).transpose()
    }

    /// Insert a validated todo at the end of the list.
    pub async fn create(&self, input: &CreateTodo) -> Result<Todo, sqlx::Error> {
        let sql = format!(
            "INSERT INTO todos (text, completed, created_at, due_date, priority, category, sort_order) \
             VALUES (?, 0, ?, ?, ?, ?, (SELECT COALESCE(MAX(sort_order), 0) + 1 FROM todos)) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&input.text)
            .bind(Utc::now().timestamp())
            .bind(input.due_date.map(|d| d.timestamp()))
            .bind(input.priority.as_str())
            .bind(input.category.as_deref())
            .fetch_one(&self.pool)
            .await?;
        todo_from_row(&row)
    }

    /// Flip `completed`. `None` if no todo has this id.
    pub async fn toggle(&self, id: i64) -> Result<Option<Todo>, sqlx::Error> {
        let sql = format!("UPDATE todos SET completed = 1 - completed WHERE id = ? RETURNING {COLUMNS}");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(todo_from_row).transpose()
    }

    /// Apply the fields present in `patch`. `None` if no todo has this id.
    pub async fn patch(&self, id: i64, patch: &PatchTodo) -> Result<Option<Todo>, sqlx::Error> {
        if patch.is_empty() {
            return self.get(id).await;
        }

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE todos SET ");
        let mut fields = builder.separated(", ");
        if let Some(text) = &patch.text {
            fields.push("text = ").push_bind_unseparated(text.clone());
        }
        if let Some(due_date) = patch.due_date {
            fields.push("due_date = ").push_bind_unseparated(due_date.map(|d| d.timestamp()));
        }
        if let Some(priority) = patch.priority {
            fields.push("priority = ").push_bind_unseparated(priority.as_str());
        }
        if let Some(category) = &patch.category {
            fields.push("category = ").push_bind_unseparated(category.clone());
        }
        builder.push(" WHERE id = ").push_bind(id);
        builder.push(format!(" RETURNING {COLUMNS}"));

        let row = builder.build().fetch_optional(&self.pool).await?;
        row.as_ref().map(todo_from_row).transpose()
    }

    /// Move `ids` to the front in the given order and renumber every row
    /// `1..=n`. Todos left out of `ids` follow in their current order.
    /// All or nothing: returns `None`, with nothing written, if any id is
    /// unknown.
    pub async fn reorder(&self, ids: &[i64]) -> Result<Option<Vec<Todo>>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let current: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM todos ORDER BY sort_order ASC, id ASC")
                .fetch_all(&mut *tx)
                .await?;

        let stored: HashSet<i64> = current.iter().copied().collect();
        if let Some(unknown) = ids.iter().find(|id| !stored.contains(*id)) {
            tx.rollback().await?;
            log::debug!("reorder aborted, unknown id {unknown}");
            return Ok(None);
        }

        let listed: HashSet<i64> = ids.iter().copied().collect();
        let rest = current.iter().filter(|id| !listed.contains(*id));
        for (position, id) in ids.iter().chain(rest).enumerate() {
            sqlx::query("UPDATE todos SET sort_order = ? WHERE id = ?")
                .bind(position as i64 + 1)
                .bind(*id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        self.list().await.map(Some)
    }

    /// `true` if a row was removed.
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn todo_from_row(row: &SqliteRow) -> Result<Todo, sqlx::Error> {
    let priority: String = row.try_get("priority")?;
    let completed: i64 = row.try_get("completed")?;
    let due_date: Option<i64> = row.try_get("due_date")?;

    Ok(Todo {
        id: row.try_get("id")?,
        text: row.try_get("text")?,
        completed: completed != 0,
        created_at: timestamp(row.try_get("created_at")?)?,
        due_date: due_date.map(timestamp).transpose()?,
        priority: priority.parse::<Priority>().map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        category: row.try_get("category")?,
        sort_order: row.try_get("sort_order")?,
    })
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| sqlx::Error::Decode(format!("timestamp {secs} out of range").into()))
}
