pub mod context;
pub mod todo_service;

pub use context::ServiceContext;
pub use todo_service::{DefaultTodoService, TodoService};
