//! # Doctor Finder Common Library
//!
//! Shared code for the Doctor Finder services:
//! - Domain model (doctors, specialties)
//! - Collaborator traits: record store, identity, blob storage
//! - SQLite and filesystem adapters for those traits
//! - Configuration loading and root folder layout
//! - Error types and small utilities

pub mod blob;
pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod models;
pub mod sse;
pub mod store;
pub mod time;

pub use error::{Error, Result};
