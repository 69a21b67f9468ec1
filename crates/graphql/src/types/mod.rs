//! GraphQL object, enum, union, and interface types.
//!
//! These are response-model types built by `transform` from upstream records;
//! they carry no serde. Lazy fields (thread primary entity, item actor) fetch
//! through the per-request `ResourceAccessor` only when the caller selected
//! more than `id`.

pub mod account;
pub mod call;
pub mod connection;
pub mod entity;
pub mod message;
pub mod node;
pub mod saved;
pub mod settings;
pub mod thread;
pub mod visit;

pub use {
    account::{Account, AccountType, Invite, InviteType, Me, PatientAccount, ProviderAccount},
    call::{Call, CallParticipant, CallRole, CallState},
    connection::{Connection, ConnectionArgs, Edge, PageInfo},
    entity::{ContactInfo, ContactInfoType, Entity, EntityKind, Organization, Profile,
        ProfileSection, Subdomain},
    message::{Attachment, AttachmentData, AudioAttachment, BannerButtonAttachment, Endpoint,
        EndpointChannel, EntityRef, ImageAttachment, Message, VideoAttachment},
    node::Node,
    saved::{SavedMessage, SavedThreadQuery, ScheduledMessage, ScheduledMessageStatus},
    settings::{BooleanSetting, SelectSetting, Setting, SettingValue, StringListSetting},
    thread::{DeletedMessage, MessageDelete, MessageUpdate, Thread, ThreadItem, ThreadItemData,
        ThreadKind},
    visit::{Visit, VisitCategory},
};

/// True when the selection set on the current field is exactly `{ id }`.
/// Resolvers use this to return an id-only stub instead of fetching.
#[must_use]
pub fn selecting_only_id(ctx: &async_graphql::Context<'_>) -> bool {
    let field = ctx.field();
    let mut fields = field.selection_set();
    match (fields.next(), fields.next()) {
        (Some(field), None) => field.name() == "id",
        _ => false,
    }
}
