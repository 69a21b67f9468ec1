//! GraphQL API for Meridian.
//!
//! Defines the schema served at `/graphql`: the request context, the error
//! taxonomy, the resource accessor that fronts every upstream service, the
//! object and input types, and the query and mutation resolvers.
//!
//! The gateway crate is responsible for the HTTP surface: decoding requests,
//! the auth-cookie handshake, deadlines, and the response envelope. This
//! crate only defines the schema and its resolvers.

pub mod context;
pub mod error;
pub mod mutations;
pub mod queries;
pub mod raccess;
pub mod schema;
pub mod transform;
pub mod types;

pub use schema::{MeridianSchema, build_schema};
