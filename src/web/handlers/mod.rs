pub mod api;
pub mod chat;
pub mod diagnostics;
pub mod fallback;
pub mod health;
