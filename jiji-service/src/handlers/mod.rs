pub mod ask;
pub mod health;

pub use ask::ask_jiji;
pub use health::{health_check, metrics_handler, readiness_check};
