//! HTTP surface of the assistant

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::{ApiError, ErrorBody};
pub use handlers::{QueryResponse, WebhookPayload};
pub use routes::create_router;
pub use state::AppState;
