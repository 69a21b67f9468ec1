//! Schema construction.

use std::sync::Arc;

use async_graphql::{EmptySubscription, Schema};

use meridian_upstream::Services;

use crate::{context::StaticConfig, mutations::MutationRoot, queries::QueryRoot};

pub type MeridianSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema with its static data. The gateway attaches the
/// per-request pieces (`RequestContext`, `ResourceAccessor`) on each
/// `Request` before execution.
#[must_use]
pub fn build_schema(services: Services, config: StaticConfig) -> MeridianSchema {
    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        EmptySubscription,
    )
    .data(services)
    .data(Arc::new(config))
    .finish()
}
