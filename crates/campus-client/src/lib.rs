//! HTTP access to the school-administration backend.
//!
//! [`ApiClient`] is the single configured client every screen shares; the
//! [`ResourceBackend`] trait is the seam screens depend on, so they can be
//! driven by an in-memory backend in tests.

pub mod backend;
pub mod client;
pub mod error;

pub use backend::{Ack, ListSnapshot, ReferenceLookup, ResourceBackend};
pub use client::{ApiClient, ApiConfig};
pub use error::ApiError;
