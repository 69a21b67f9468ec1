//! Shared types, error definitions, and utilities used across all meridian crates.

pub mod error;
pub mod ids;
pub mod markup;
pub mod parallel;
pub mod request_id;

pub use error::{Error, FromMessage, Result};
