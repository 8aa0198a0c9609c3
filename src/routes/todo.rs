use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{MethodRouter, get},
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};

use crate::{
    db::entities::todo,
    response::{ApiResult, JsonResponse},
    routes::extract::{JsonBody, TodoId},
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct CreateTodoRequest {
    // Missing title decodes to "" and is rejected by validation.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Every field is optional; only present fields reach the service.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_done: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub is_done: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl From<todo::Model> for TodoResponse {
    fn from(model: todo::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description.unwrap_or_default(),
            is_done: model.is_done,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", by_id())
        // A single trailing slash still addresses the todo; `/todos/` does not.
        .route("/todos/{id}/", by_id())
        .with_state(state)
}

fn by_id() -> MethodRouter<Arc<AppState>> {
    get(get_todo).put(update_todo).delete(delete_todo)
}

async fn list_todos(
    State(state): State<Arc<AppState>>,
) -> ApiResult<JsonResponse<Vec<TodoResponse>>> {
    let todos = state.todos.list_todos().await?;
    JsonResponse::ok(todos.into_iter().map(TodoResponse::from).collect())
}

async fn create_todo(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<CreateTodoRequest>,
) -> ApiResult<JsonResponse<TodoResponse>> {
    let todo = state
        .todos
        .add_todo(&body.title, body.description.as_deref())
        .await?;
    JsonResponse::created(todo.into())
}

async fn get_todo(
    State(state): State<Arc<AppState>>,
    TodoId(id): TodoId,
) -> ApiResult<JsonResponse<TodoResponse>> {
    let todo = state.todos.get_todo(id).await?;
    JsonResponse::ok(todo.into())
}

async fn update_todo(
    State(state): State<Arc<AppState>>,
    TodoId(id): TodoId,
    JsonBody(body): JsonBody<UpdateTodoRequest>,
) -> ApiResult<JsonResponse<TodoResponse>> {
    let UpdateTodoRequest {
        title,
        description,
        is_done,
    } = body;
    let todo = state
        .todos
        .update_todo(id, title, description, is_done)
        .await?;
    JsonResponse::ok(todo.into())
}

async fn delete_todo(
    State(state): State<Arc<AppState>>,
    TodoId(id): TodoId,
) -> ApiResult<StatusCode> {
    state.todos.delete_todo(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{
        Router,
        body::{self, Body},
        http::{Request, StatusCode, header},
    };
    use chrono::{FixedOffset, TimeZone};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::{
        config::AppConfig,
        db::entities::todo,
        error::AppError,
        routes::app,
        services::TodoService,
        state::AppState,
    };

    type UpdateCall = (i32, Option<String>, Option<String>, Option<bool>);

    /// Records what the handlers pass down and answers with canned results.
    #[derive(Default)]
    struct FakeTodoService {
        updates: Mutex<Vec<UpdateCall>>,
        deletes: Mutex<Vec<i32>>,
        fail_store: bool,
    }

    fn sample(id: i32) -> todo::Model {
        let ts = FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .single()
            .expect("timestamp should be valid");
        todo::Model {
            id,
            title: "Buy milk".to_string(),
            description: None,
            is_done: false,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[async_trait]
    impl TodoService for FakeTodoService {
        async fn list_todos(&self) -> Result<Vec<todo::Model>, AppError> {
            if self.fail_store {
                return Err(AppError::internal("Database error: connection refused"));
            }
            Ok(vec![sample(1), sample(2)])
        }

        async fn get_todo(&self, id: i32) -> Result<todo::Model, AppError> {
            if id == 1 {
                Ok(sample(1))
            } else {
                Err(AppError::not_found(format!("todo not found (id={id})")))
            }
        }

        async fn add_todo(
            &self,
            title: &str,
            description: Option<&str>,
        ) -> Result<todo::Model, AppError> {
            if title.is_empty() {
                return Err(AppError::validation("title cannot be empty"));
            }
            let mut model = sample(3);
            model.title = title.to_string();
            model.description = description.map(str::to_string);
            Ok(model)
        }

        async fn update_todo(
            &self,
            id: i32,
            title: Option<String>,
            description: Option<String>,
            done: Option<bool>,
        ) -> Result<todo::Model, AppError> {
            self.updates
                .lock()
                .unwrap()
                .push((id, title, description, done));
            self.get_todo(id).await
        }

        async fn delete_todo(&self, id: i32) -> Result<(), AppError> {
            self.deletes.lock().unwrap().push(id);
            Ok(())
        }
    }

    fn app_with(service: Arc<FakeTodoService>) -> Router {
        app(AppState::new(AppConfig::default(), service))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, String, String) {
        let response = app.oneshot(request).await.expect("request should succeed");
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should read");
        (status, content_type, String::from_utf8_lossy(&bytes).into_owned())
    }

    fn request(method: &str, uri: &str, body: Option<serde_json::Value>) -> Request<Body> {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    #[tokio::test]
    async fn list_renders_camel_case_entities() {
        let (status, content_type, body) = send(
            app_with(Arc::new(FakeTodoService::default())),
            request("GET", "/todos", None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "application/json");
        let json: serde_json::Value = serde_json::from_str(&body).expect("body should be json");
        assert_eq!(json[0]["id"], 1);
        assert_eq!(json[0]["isDone"], false);
        assert_eq!(json[0]["description"], "");
        let created_at = json[0]["createdAt"].as_str().expect("timestamp should be a string");
        assert!(created_at.starts_with("2024-05-01T12:00:00"));
        assert_eq!(json[1]["id"], 2);
    }

    #[tokio::test]
    async fn create_returns_created_entity() {
        let (status, _, body) = send(
            app_with(Arc::new(FakeTodoService::default())),
            request("POST", "/todos", Some(json!({ "title": "Buy milk", "description": "oat" }))),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        let json: serde_json::Value = serde_json::from_str(&body).expect("body should be json");
        assert_eq!(json["title"], "Buy milk");
        assert_eq!(json["description"], "oat");
    }

    #[tokio::test]
    async fn create_with_empty_title_is_bad_request() {
        let (status, content_type, body) = send(
            app_with(Arc::new(FakeTodoService::default())),
            request("POST", "/todos", Some(json!({ "title": "" }))),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(content_type.starts_with("text/plain"));
        assert_eq!(body, "title cannot be empty");
    }

    #[tokio::test]
    async fn create_with_malformed_json_is_bad_request() {
        let (status, _, body) = send(
            app_with(Arc::new(FakeTodoService::default())),
            Request::builder()
                .method("POST")
                .uri("/todos")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "invalid json");
    }

    #[tokio::test]
    async fn get_with_non_numeric_id_is_bad_request() {
        let (status, _, body) = send(
            app_with(Arc::new(FakeTodoService::default())),
            request("GET", "/todos/abc", None),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "invalid id");
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let (status, _, body) = send(
            app_with(Arc::new(FakeTodoService::default())),
            request("GET", "/todos/99", None),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "todo not found (id=99)");
    }

    #[tokio::test]
    async fn update_passes_only_present_fields() {
        let service = Arc::new(FakeTodoService::default());
        let (status, _, _) = send(
            app_with(service.clone()),
            request("PUT", "/todos/1", Some(json!({ "isDone": true }))),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let updates = service.updates.lock().unwrap();
        assert_eq!(updates.as_slice(), &[(1, None, None, Some(true))]);
    }

    #[tokio::test]
    async fn update_treats_null_as_absent() {
        let service = Arc::new(FakeTodoService::default());
        send(
            app_with(service.clone()),
            request(
                "PUT",
                "/todos/1",
                Some(json!({ "title": "New", "description": null })),
            ),
        )
        .await;

        let updates = service.updates.lock().unwrap();
        assert_eq!(
            updates.as_slice(),
            &[(1, Some("New".to_string()), None, None)]
        );
    }

    #[tokio::test]
    async fn update_checks_id_before_body() {
        let service = Arc::new(FakeTodoService::default());
        let (status, _, body) = send(
            app_with(service.clone()),
            Request::builder()
                .method("PUT")
                .uri("/todos/x")
                .body(Body::from("garbage"))
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "invalid id");
        assert!(service.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_returns_no_content() {
        let service = Arc::new(FakeTodoService::default());
        let (status, _, body) = send(
            app_with(service.clone()),
            request("DELETE", "/todos/12", None),
        )
        .await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());
        assert_eq!(service.deletes.lock().unwrap().as_slice(), &[12]);
    }

    #[tokio::test]
    async fn unsupported_method_is_method_not_allowed() {
        for (method, uri) in [("PATCH", "/todos/1"), ("DELETE", "/todos"), ("POST", "/todos/1")] {
            let (status, content_type, body) = send(
                app_with(Arc::new(FakeTodoService::default())),
                request(method, uri, None),
            )
            .await;

            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
            assert!(content_type.starts_with("text/plain"));
            assert_eq!(body, "Method Not Allowed");
        }
    }

    #[tokio::test]
    async fn wrong_path_shape_is_not_found() {
        for uri in ["/todos/", "/todos/1/extra", "/nope"] {
            let (status, _, _) = send(
                app_with(Arc::new(FakeTodoService::default())),
                request("GET", uri, None),
            )
            .await;

            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn store_failure_is_internal_server_error() {
        let service = Arc::new(FakeTodoService {
            fail_store: true,
            ..FakeTodoService::default()
        });
        let (status, _, body) = send(app_with(service), request("GET", "/todos", None)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Database error: connection refused");
    }
}
