//! depmatrix MCP server: discover, edit and diff process dependency
//! matrices from an LLM client.

pub mod config;
pub mod protocol;
pub mod resources;
pub mod session;
pub mod tools;
pub mod transport;
pub mod types;

pub use config::{resolve_export_dir, resolve_thresholds};
pub use protocol::ProtocolHandler;
pub use session::{MatrixSession, SessionStore};
pub use transport::StdioTransport;
