pub mod app;
pub mod config;
pub mod errors;
pub mod habits;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod state;
pub mod stats;
pub mod storage;
pub mod streak;

pub use app::router;
pub use config::Config;
pub use habits::{default_habits, toggle};
pub use state::AppState;
pub use storage::{JsonFileStore, KvStore};
pub use streak::compute_streak;
