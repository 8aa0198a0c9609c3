mod panic;
mod plain_error;

pub use panic::catch_panic_layer;
pub use plain_error::plain_error_middleware;
