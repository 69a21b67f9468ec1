//! The Relay-style `Node` interface. Concrete types are reached through
//! `node(id)`, which dispatches on the id prefix.

use async_graphql::{ID, Interface};

use crate::types::{
    Call, Entity, Organization, PatientAccount, ProviderAccount, SavedThreadQuery, Thread,
    ThreadItem, Visit,
};

#[derive(Clone, Interface)]
#[graphql(field(name = "id", ty = "&ID"))]
pub enum Node {
    Entity(Entity),
    Organization(Organization),
    ProviderAccount(ProviderAccount),
    PatientAccount(PatientAccount),
    Thread(Thread),
    ThreadItem(ThreadItem),
    SavedThreadQuery(SavedThreadQuery),
    Visit(Visit),
    Call(Call),
}
