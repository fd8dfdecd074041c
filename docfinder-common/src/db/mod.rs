//! Database bootstrap for the SQLite-backed collaborators

pub mod init;

pub use init::init_database;
