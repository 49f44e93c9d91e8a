// Core modules
pub mod config;
pub mod embed;
pub mod services;
pub mod state;
pub mod types;
pub mod web;
pub mod widget;

// Re-exports
pub use config::Config;
pub use embed::Bridge;
pub use state::AppState;
pub use types::{AppError, AppResult};
