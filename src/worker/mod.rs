//! Background worker for parameter persistence.
//!
//! - `messages`: Request/response protocol types with trace context propagation
//! - `handler`: Worker implementation and message processing

pub mod handler;
pub mod messages;

pub use handler::BookSearchWorker;
pub use messages::{TraceContext, WorkerMessage, WorkerResponse};
