use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use super::{DaoLayerError, DaoResult};
use crate::db::entities::prelude::Todo;
use crate::db::entities::todo;

const ENTITY: &str = "todo";

/// Durable storage for todos. Every operation is a single statement, so no
/// transactions are involved.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All todos ordered by ascending id. Empty when the table is empty.
    async fn list_all(&self) -> DaoResult<Vec<todo::Model>>;

    async fn get_by_id(&self, id: i32) -> DaoResult<todo::Model>;

    /// Inserts with `is_done = false` and both timestamps set to now.
    async fn create(&self, title: &str, description: Option<&str>) -> DaoResult<todo::Model>;

    /// Overwrites title, description and done flag of `todo.id`, bumps
    /// `updated_at` and returns the stored row. Fails with `NotFound` when no
    /// row matched.
    async fn update(&self, todo: todo::Model) -> DaoResult<todo::Model>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: i32) -> DaoResult<bool>;
}

#[derive(Clone)]
pub struct TodoDao {
    db: DatabaseConnection,
}

impl TodoDao {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl TodoStore for TodoDao {
    async fn list_all(&self) -> DaoResult<Vec<todo::Model>> {
        let todos = Todo::find()
            .order_by_asc(todo::Column::Id)
            .all(self.db())
            .await?;
        debug!(count = todos.len(), "listed todos");
        Ok(todos)
    }

    async fn get_by_id(&self, id: i32) -> DaoResult<todo::Model> {
        Todo::find_by_id(id)
            .one(self.db())
            .await?
            .ok_or(DaoLayerError::NotFound { entity: ENTITY, id })
    }

    async fn create(&self, title: &str, description: Option<&str>) -> DaoResult<todo::Model> {
        let now = Utc::now().fixed_offset();
        let model = todo::ActiveModel {
            title: Set(title.to_string()),
            description: Set(description.map(str::to_string)),
            is_done: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let created = model.insert(self.db()).await?;
        debug!(id = created.id, "created todo");
        Ok(created)
    }

    async fn update(&self, todo: todo::Model) -> DaoResult<todo::Model> {
        let now = Utc::now().fixed_offset();
        let changes = todo::ActiveModel {
            title: Set(todo.title.clone()),
            description: Set(todo.description.clone()),
            is_done: Set(todo.is_done),
            updated_at: Set(now),
            ..Default::default()
        };

        // A zero-row UPDATE is not an error at the statement level, so an
        // empty RETURNING set is the not-found signal.
        let updated = Todo::update_many()
            .set(changes)
            .filter(todo::Column::Id.eq(todo.id))
            .exec_with_returning(self.db())
            .await?
            .into_iter()
            .next()
            .ok_or(DaoLayerError::NotFound {
                entity: ENTITY,
                id: todo.id,
            })?;

        debug!(id = updated.id, "updated todo");
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> DaoResult<bool> {
        let result = Todo::delete_by_id(id).exec(self.db()).await?;
        debug!(id, rows = result.rows_affected, "deleted todo");
        Ok(result.rows_affected > 0)
    }
}
