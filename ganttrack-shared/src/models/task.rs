/// Task model and database operations
///
/// A task is a unit of work with a calendar date span, a progress
/// percentage, milestone/completed flags, and a list of assignees. The
/// assignee list is persisted as a single comma-joined text column; that
/// encoding is confined to this module — the public [`Task`] model
/// exposes `assignee_ids: Vec<i64>` and everything above the storage
/// layer only ever sees the decoded list. Order and duplicates are
/// preserved through the round-trip.
///
/// Dates are plain calendar dates (no time component). No ordering is
/// enforced between `start_date` and `end_date`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(200) NOT NULL,
///     description TEXT,
///     start_date DATE NOT NULL,
///     end_date DATE NOT NULL,
///     progress INTEGER NOT NULL DEFAULT 0,
///     is_milestone BOOLEAN NOT NULL DEFAULT FALSE,
///     is_completed BOOLEAN NOT NULL DEFAULT FALSE,
///     assignee_ids TEXT NOT NULL DEFAULT '',
///     memo TEXT,
///     project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Raw task row as stored, with the encoded assignee column
#[derive(Debug, Clone, sqlx::FromRow)]
struct TaskRow {
    id: i64,
    name: String,
    description: Option<String>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    progress: i32,
    is_milestone: bool,
    is_completed: bool,
    assignee_ids: String,
    memo: Option<String>,
    project_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Task model with the assignee list decoded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task id
    pub id: i64,

    /// Task name
    pub name: String,

    /// Optional free-text description
    pub description: Option<String>,

    /// First day of the task's span
    pub start_date: NaiveDate,

    /// Last day of the task's span (may precede start_date)
    pub end_date: NaiveDate,

    /// Progress percentage, 0-100
    pub progress: i32,

    /// Whether the task marks a point-in-time deliverable
    pub is_milestone: bool,

    /// Whether the task is done
    pub is_completed: bool,

    /// Assignee user ids in insertion order, duplicates preserved
    pub assignee_ids: Vec<i64>,

    /// Optional memo text
    pub memo: Option<String>,

    /// Owning project
    pub project_id: i64,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Task name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// First day of the span
    pub start_date: NaiveDate,

    /// Last day of the span
    pub end_date: NaiveDate,

    /// Progress percentage
    pub progress: i32,

    /// Milestone flag
    pub is_milestone: bool,

    /// Completed flag
    pub is_completed: bool,

    /// Assignee user ids
    pub assignee_ids: Vec<i64>,

    /// Optional memo
    pub memo: Option<String>,

    /// Owning project
    pub project_id: i64,
}

/// Input for updating a task
///
/// All fields optional; only non-None fields are written.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New start date
    pub start_date: Option<NaiveDate>,

    /// New end date
    pub end_date: Option<NaiveDate>,

    /// New progress percentage
    pub progress: Option<i32>,

    /// New milestone flag
    pub is_milestone: Option<bool>,

    /// New completed flag
    pub is_completed: Option<bool>,

    /// Replacement assignee list
    pub assignee_ids: Option<Vec<i64>>,

    /// New memo
    pub memo: Option<String>,
}

/// Encodes an assignee list into the stored comma-joined form
///
/// An empty list encodes to the empty string.
fn encode_assignee_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Decodes the stored comma-joined form back into an ordered list
///
/// The empty string decodes to an empty list; blank entries are
/// filtered out. Entries that fail to parse are skipped (the service
/// never writes them).
fn decode_assignee_ids(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| entry.parse().ok())
        .collect()
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            start_date: row.start_date,
            end_date: row.end_date,
            progress: row.progress,
            is_milestone: row.is_milestone,
            is_completed: row.is_completed,
            assignee_ids: decode_assignee_ids(&row.assignee_ids),
            memo: row.memo,
            project_id: row.project_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Task {
    /// Creates a new task
    ///
    /// # Errors
    ///
    /// Returns an error if the project does not exist (foreign key) or
    /// the database is unreachable
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            INSERT INTO tasks (name, description, start_date, end_date, progress,
                               is_milestone, is_completed, assignee_ids, memo, project_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, name, description, start_date, end_date, progress,
                      is_milestone, is_completed, assignee_ids, memo, project_id,
                      created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.progress)
        .bind(data.is_milestone)
        .bind(data.is_completed)
        .bind(encode_assignee_ids(&data.assignee_ids))
        .bind(data.memo)
        .bind(data.project_id)
        .fetch_one(pool)
        .await?;

        Ok(row.into())
    }

    /// Finds a task by id, None if absent
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, name, description, start_date, end_date, progress,
                   is_milestone, is_completed, assignee_ids, memo, project_id,
                   created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Lists all tasks of a project in id order
    pub async fn list_by_project(pool: &PgPool, project_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, name, description, start_date, end_date, progress,
                   is_milestone, is_completed, assignee_ids, memo, project_id,
                   created_at, updated_at
            FROM tasks
            WHERE project_id = $1
            ORDER BY id
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Updates a task
    ///
    /// Only non-None fields in `data` are written; the assignee list is
    /// re-encoded when present. `updated_at` is always bumped. Returns
    /// None if the id does not exist.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.start_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", start_date = ${}", bind_count));
        }
        if data.end_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", end_date = ${}", bind_count));
        }
        if data.progress.is_some() {
            bind_count += 1;
            query.push_str(&format!(", progress = ${}", bind_count));
        }
        if data.is_milestone.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_milestone = ${}", bind_count));
        }
        if data.is_completed.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_completed = ${}", bind_count));
        }
        if data.assignee_ids.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assignee_ids = ${}", bind_count));
        }
        if data.memo.is_some() {
            bind_count += 1;
            query.push_str(&format!(", memo = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, name, description, start_date, end_date, \
             progress, is_milestone, is_completed, assignee_ids, memo, project_id, \
             created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, TaskRow>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(start_date) = data.start_date {
            q = q.bind(start_date);
        }
        if let Some(end_date) = data.end_date {
            q = q.bind(end_date);
        }
        if let Some(progress) = data.progress {
            q = q.bind(progress);
        }
        if let Some(is_milestone) = data.is_milestone {
            q = q.bind(is_milestone);
        }
        if let Some(is_completed) = data.is_completed {
            q = q.bind(is_completed);
        }
        if let Some(ref assignee_ids) = data.assignee_ids {
            q = q.bind(encode_assignee_ids(assignee_ids));
        }
        if let Some(memo) = data.memo {
            q = q.bind(memo);
        }

        let row = q.fetch_optional(pool).await?;

        Ok(row.map(Into::into))
    }

    /// Deletes a task by id, true if a row was removed
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
