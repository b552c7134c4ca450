//! `TaskDeck` backend stub library.
//!
//! An in-memory axum implementation of the `TaskDeck` REST contract,
//! exposed for use in tests and embedding. Tokens are opaque UUIDs held in
//! a map — this is test scaffolding, not an authentication system.

pub mod config;
pub mod server;
pub mod store;
