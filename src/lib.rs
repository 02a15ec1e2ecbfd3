pub mod app;
pub mod config;
pub mod controller;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod slot;
pub mod stats;
pub mod storage;
pub mod ui;
pub mod state;

pub use app::router;
pub use config::{AppConfig, InteractionMode};
pub use controller::{Action, Tracker, policy_for};
pub use state::AppState;
pub use storage::{KvStore, Persistence};
