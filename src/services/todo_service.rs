use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::{
    db::{dao::TodoStore, entities::todo},
    error::AppError,
};

/// Business rules for todos, independent of HTTP.
#[async_trait]
pub trait TodoService: Send + Sync {
    async fn list_todos(&self) -> Result<Vec<todo::Model>, AppError>;

    async fn get_todo(&self, id: i32) -> Result<todo::Model, AppError>;

    async fn add_todo(
        &self,
        title: &str,
        description: Option<&str>,
    ) -> Result<todo::Model, AppError>;

    /// Partial update. A title or description that is absent *or empty*
    /// leaves the stored value alone. An absent `done` resolves to the stored
    /// flag; the resolved value is always written back.
    async fn update_todo(
        &self,
        id: i32,
        title: Option<String>,
        description: Option<String>,
        done: Option<bool>,
    ) -> Result<todo::Model, AppError>;

    /// Deleting an id that does not exist succeeds.
    async fn delete_todo(&self, id: i32) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct DefaultTodoService {
    store: Arc<dyn TodoStore>,
}

impl DefaultTodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TodoService for DefaultTodoService {
    async fn list_todos(&self) -> Result<Vec<todo::Model>, AppError> {
        Ok(self.store.list_all().await?)
    }

    async fn get_todo(&self, id: i32) -> Result<todo::Model, AppError> {
        Ok(self.store.get_by_id(id).await?)
    }

    async fn add_todo(
        &self,
        title: &str,
        description: Option<&str>,
    ) -> Result<todo::Model, AppError> {
        // Exact-empty check only; whitespace titles are accepted.
        if title.is_empty() {
            return Err(AppError::validation("title cannot be empty"));
        }
        Ok(self.store.create(title, description).await?)
    }

    async fn update_todo(
        &self,
        id: i32,
        title: Option<String>,
        description: Option<String>,
        done: Option<bool>,
    ) -> Result<todo::Model, AppError> {
        let mut current = self.store.get_by_id(id).await?;

        if let Some(title) = title.filter(|title| !title.is_empty()) {
            current.title = title;
        }
        if let Some(description) = description.filter(|description| !description.is_empty()) {
            current.description = Some(description);
        }
        current.is_done = done.unwrap_or(current.is_done);

        Ok(self.store.update(current).await?)
    }

    async fn delete_todo(&self, id: i32) -> Result<(), AppError> {
        if !self.store.delete(id).await? {
            debug!(id, "delete matched no todo");
        }
        Ok(())
    }
}
