//! Per-session matrix state.

pub mod matrix_session;
pub mod store;

pub use matrix_session::{MatrixSession, MatrixSource, Origin, SessionStatus};
pub use store::{SessionStore, DEFAULT_SESSION};
