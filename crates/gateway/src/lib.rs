//! HTTP surface of the Meridian gateway.
//!
//! Owns everything between the wire and the schema: request decoding, the
//! auth-cookie handshake, the per-request deadline, the response envelope,
//! and the Set-Cookie side channel. Schema semantics live in
//! `meridian-graphql`.

pub mod config;
pub mod cookies;
pub mod graphql_routes;
pub mod routes;
pub mod state;
pub mod telemetry;
