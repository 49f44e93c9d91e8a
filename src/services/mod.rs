pub mod adapter;
pub mod backend;
pub mod diagnostics;
pub mod env_file;
pub mod pipeline;
pub mod template;

pub use backend::{HttpBackend, OfflineBackend, QueryBackend};
pub use pipeline::QueryPipeline;
pub use template::TemplateEngine;
