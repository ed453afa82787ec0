//! Bookstore application library
//!
//! Feature modules plus the bootstrap sequence shared by the
//! `bookstore-app` binary and the CLI.

pub mod app;
pub mod modules;

pub use app::{connect, migrate, prepare, registry, run};
