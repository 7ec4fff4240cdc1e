//! UsinaSoft core types: browser sessions, their storage and shared helpers

pub mod error;
pub mod session;
pub mod status;
pub mod store;

#[cfg(feature = "tracing")]
pub mod tracing;

pub use error::{CoreError, CoreResult};
pub use session::{Session, SessionHandle, SessionId, UserProfile};
pub use store::{InMemorySessionStore, SessionStore};
