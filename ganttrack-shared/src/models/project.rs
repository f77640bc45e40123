/// Project model and database operations
///
/// A project is a container of tasks. Shared projects (the default) are
/// visible and editable by every authenticated user; a personal project
/// belongs to exactly one user, and only that user may modify or delete
/// it. Deleting a project removes all of its tasks.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(200) NOT NULL,
///     description TEXT,
///     owner_id BIGINT REFERENCES users(id) ON DELETE SET NULL,
///     is_personal BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::task::Task;

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project id
    pub id: i64,

    /// Project name
    pub name: String,

    /// Optional free-text description
    pub description: Option<String>,

    /// Owning user for personal projects; None for shared projects
    /// (and for personal projects whose owner account was deleted)
    pub owner_id: Option<i64>,

    /// Whether this is a personal project
    pub is_personal: bool,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone)]
pub struct CreateProject {
    /// Project name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Owner, set to the creating user iff the project is personal
    pub owner_id: Option<i64>,

    /// Personal flag
    pub is_personal: bool,
}

/// Input for updating a project
///
/// Only the name and description are mutable; the personal flag and
/// owner are fixed at creation.
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,
}

/// A project together with its full ordered task collection, the shape
/// every project API response uses
#[derive(Debug, Clone, Serialize)]
pub struct ProjectWithTasks {
    /// The project fields, flattened into the response object
    #[serde(flatten)]
    pub project: Project,

    /// All tasks of the project, in id order
    pub tasks: Vec<Task>,
}

impl Project {
    /// Creates a new project
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, owner_id, is_personal)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, owner_id, is_personal, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.owner_id)
        .bind(data.is_personal)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by id, None if absent
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, owner_id, is_personal, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists all shared projects (personal flag false), in id order
    pub async fn list_shared(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, owner_id, is_personal, created_at, updated_at
            FROM projects
            WHERE is_personal = FALSE
            ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Lists the personal projects owned by the given user, in id order
    pub async fn list_personal(pool: &PgPool, owner_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, owner_id, is_personal, created_at, updated_at
            FROM projects
            WHERE is_personal = TRUE AND owner_id = $1
            ORDER BY id
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Updates a project's name and/or description
    ///
    /// Only non-None fields are written; `updated_at` is always bumped.
    /// Returns None if the id does not exist.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE projects SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, name, description, owner_id, is_personal, \
             created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }

        let project = q.fetch_optional(pool).await?;

        Ok(project)
    }

    /// Deletes a project by id
    ///
    /// Returns true if a row was removed. The project's tasks go with
    /// it (ON DELETE CASCADE).
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether the given user may modify or delete this project
    ///
    /// Shared projects are open to every authenticated user; personal
    /// projects only to their owner.
    pub fn can_be_modified_by(&self, user_id: i64) -> bool {
        if self.is_personal {
            self.owner_id == Some(user_id)
        } else {
            true
        }
    }
}

impl ProjectWithTasks {
    /// Loads the project's tasks and builds the response shape
    pub async fn load(pool: &PgPool, project: Project) -> Result<Self, sqlx::Error> {
        let tasks = Task::list_by_project(pool, project.id).await?;
        Ok(Self { project, tasks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_project(is_personal: bool, owner_id: Option<i64>) -> Project {
        Project {
            id: 1,
            name: "Launch".to_string(),
            description: None,
            owner_id,
            is_personal,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_shared_project_modifiable_by_anyone() {
        let project = sample_project(false, None);
        assert!(project.can_be_modified_by(1));
        assert!(project.can_be_modified_by(99));
    }

    #[test]
    fn test_personal_project_only_owner() {
        let project = sample_project(true, Some(3));
        assert!(project.can_be_modified_by(3));
        assert!(!project.can_be_modified_by(4));
    }

    #[test]
    fn test_orphaned_personal_project_locked() {
        // Owner account deleted: owner_id was nulled, nobody may touch it
        let project = sample_project(true, None);
        assert!(!project.can_be_modified_by(3));
    }

    #[test]
    fn test_with_tasks_serializes_flat() {
        let detail = ProjectWithTasks {
            project: sample_project(false, None),
            tasks: vec![],
        };

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["name"], "Launch");
        assert!(json["tasks"].as_array().unwrap().is_empty());
        // Flattened: no nested "project" object
        assert!(json.get("project").is_none());
    }
}
