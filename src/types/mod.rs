pub mod errors;
pub mod message;
pub mod request;

pub use errors::{AppError, AppResult, ErrorKind, ErrorPayload};
pub use message::{extract_reply, QueryRequest, QueryResponse};
pub use request::{Fields, NormalizedRequest, RequestSource, TransportInput};
