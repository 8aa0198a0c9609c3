use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use axum::Router;
use chrono::Utc;
use sea_orm::DbErr;

use crate::{
    config::AppConfig,
    db::{
        dao::{DaoLayerError, DaoResult, TodoStore},
        entities::todo,
    },
    routes::app,
    services::DefaultTodoService,
    state::AppState,
};

/// A `TodoStore` kept in process memory. Ids are assigned from 1 upwards and
/// never reused, like a database sequence.
#[derive(Default)]
pub struct InMemoryTodoStore {
    inner: Mutex<Inner>,
    failing: bool,
}

#[derive(Default)]
struct Inner {
    next_id: i32,
    rows: BTreeMap<i32, todo::Model>,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails with a database error.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self) -> DaoResult<()> {
        if self.failing {
            return Err(DaoLayerError::Db(DbErr::Custom(
                "store unavailable".to_string(),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn list_all(&self) -> DaoResult<Vec<todo::Model>> {
        self.check()?;
        Ok(self.lock().rows.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i32) -> DaoResult<todo::Model> {
        self.check()?;
        self.lock()
            .rows
            .get(&id)
            .cloned()
            .ok_or(DaoLayerError::NotFound { entity: "todo", id })
    }

    async fn create(&self, title: &str, description: Option<&str>) -> DaoResult<todo::Model> {
        self.check()?;
        let now = Utc::now().fixed_offset();
        let mut inner = self.lock();
        inner.next_id += 1;
        let model = todo::Model {
            id: inner.next_id,
            title: title.to_string(),
            description: description.map(str::to_string),
            is_done: false,
            created_at: now,
            updated_at: now,
        };
        inner.rows.insert(model.id, model.clone());
        Ok(model)
    }

    async fn update(&self, todo: todo::Model) -> DaoResult<todo::Model> {
        self.check()?;
        let mut inner = self.lock();
        let Some(row) = inner.rows.get_mut(&todo.id) else {
            return Err(DaoLayerError::NotFound {
                entity: "todo",
                id: todo.id,
            });
        };
        row.title = todo.title;
        row.description = todo.description;
        row.is_done = todo.is_done;
        row.updated_at = Utc::now().fixed_offset();
        Ok(row.clone())
    }

    async fn delete(&self, id: i32) -> DaoResult<bool> {
        self.check()?;
        Ok(self.lock().rows.remove(&id).is_some())
    }
}

/// The full middleware stack over the default service and an in-memory store.
pub fn test_app() -> Router {
    test_app_with_store(Arc::new(InMemoryTodoStore::new()))
}

pub fn test_app_with_store(store: Arc<InMemoryTodoStore>) -> Router {
    let service = DefaultTodoService::new(store);
    let state = AppState::new(AppConfig::default(), Arc::new(service));
    app(state)
}
