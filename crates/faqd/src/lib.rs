//! FAQ daemon library - exposes modules for testing.

pub mod answers;
pub mod routes;
pub mod server;
