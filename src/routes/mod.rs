mod entry;
pub mod extract;
pub mod middleware;
pub mod todo;

pub use entry::{app, router};
pub use extract::{JsonBody, TodoId};
pub use middleware::{catch_panic_layer, plain_error_middleware};
