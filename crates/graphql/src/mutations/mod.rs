//! Mutation resolvers, organized by domain.
//!
//! Every mutation returns a payload carrying the echoed `clientMutationId`,
//! a `success` flag, and nullable `errorCode`/`errorMessage`. User-surface
//! failures (a missing thread, a taken subdomain) populate the payload and
//! never the top-level errors array; infrastructure failures surface as
//! GraphQL errors through the taxonomy in `error`.

pub mod auth;
pub mod calls;
pub mod messages;
pub mod profile;
pub mod provisioning;
pub mod scheduled;
pub mod settings;
pub mod threads;
pub mod visits;

use async_graphql::MergedObject;

#[derive(Default, MergedObject)]
pub struct MutationRoot(
    auth::AuthMutations,
    threads::ThreadMutations,
    messages::MessageMutations,
    provisioning::ProvisioningMutations,
    calls::CallMutations,
    visits::VisitMutations,
    settings::SettingsMutations,
    profile::ProfileMutations,
    scheduled::ScheduledMessageMutations,
);
