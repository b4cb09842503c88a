//! Storage collaborator: a single-writer SQLite worker plus per-record
//! repositories. The engine never touches SQL directly; it calls the async
//! methods the repositories add to [`Database`].

mod connection;
mod helpers;
mod migrations;
mod repositories;

pub use connection::Database;
pub use repositories::sessions::SessionMutation;
