//! Core types for the Campus school-administration client.
//!
//! Record shapes, roles, the response envelope, date handling, and the
//! declarative form schemas every resource screen validates against. This
//! crate is free of HTTP and terminal dependencies; `campus-client` and
//! `campus-cli` both build on it.

pub mod date;
pub mod draft;
pub mod envelope;
pub mod error;
pub mod fee;
pub mod library;
pub mod payload;
pub mod resource;
pub mod role;
pub mod schema;
pub mod staff;
pub mod student;

pub use error::{Error, Result};
