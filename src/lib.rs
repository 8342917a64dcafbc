//! Bookshelf application library
//!
//! The books module plus the bootstrap that wires settings, the database
//! pool, the module registry and the HTTP server together.

pub mod app;
pub mod modules;

pub use app::{bootstrap, migrate, serve, App};
