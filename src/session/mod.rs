pub mod store;
pub mod types;

pub use store::{SessionHandle, SessionStore};
pub use types::{Message, Role, Session};
