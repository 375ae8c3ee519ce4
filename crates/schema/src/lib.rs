//! Schema combinators and validation for Quire wire payloads.
//!
//! Every RPC procedure declares its input and output contract as a [`Schema`]
//! value. Schemas are data: they are built once with the combinator
//! constructors and walked by [`validate`] against incoming
//! `serde_json::Value` payloads. Object schemas are closed: keys not
//! declared in the schema are rejected, so a contract never silently grows.

mod error;
mod schema;
mod validate;

pub use error::ValidationError;
pub use schema::{ObjectField, Schema};
pub use validate::validate;
