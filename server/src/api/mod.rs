//! HTTP and MCP API surface

pub mod mcp;
pub mod routes;
pub mod server;

pub use server::ApiServer;
