//! Upstream record → response model transforms.
//!
//! Pure functions used by resolvers and mutations. Anything format-dependent
//! (avatar URLs, deep links, banner icons) flows through [`StaticConfig`].

use {std::collections::HashMap, thiserror::Error, tracing::warn};

use {async_graphql::ID, meridian_common::markup};

use meridian_upstream::{care, directory, excomms, invite, settings, threading};

use crate::{
    context::StaticConfig,
    raccess::ResourceAccessor,
    types::{
        self, Attachment, AttachmentData, AudioAttachment, BannerButtonAttachment, Call,
        CallParticipant, CallRole, ContactInfo, ContactInfoType, Endpoint, Entity, EntityRef,
        ImageAttachment, Message, Thread, ThreadItem, ThreadItemData, VideoAttachment, Visit,
        VisitCategory,
    },
};

#[derive(Debug, Error)]
pub enum TransformError {
    /// A call record violated the two-party shape.
    #[error("malformed call {0}: {1}")]
    MalformedCall(String, &'static str),

    #[error("invalid markup: {0}")]
    Markup(#[from] markup::MarkupError),

    /// The viewing account is not a participant of the call.
    #[error("account {0} is not a participant of call {1}")]
    NotAParticipant(String, String),
}

// ── Entities ────────────────────────────────────────────────────────────────

#[must_use]
pub fn initials(first_name: &str, last_name: &str) -> String {
    let mut out = String::new();
    if let Some(c) = first_name.chars().next() {
        out.extend(c.to_uppercase());
    }
    if let Some(c) = last_name.chars().next() {
        out.extend(c.to_uppercase());
    }
    out
}

fn display_name(info: &directory::EntityInfo, contacts: &[directory::Contact]) -> String {
    if !info.display_name.is_empty() {
        return info.display_name.clone();
    }
    let full = format!("{} {}", info.first_name, info.last_name);
    let full = full.trim();
    if !full.is_empty() {
        return full.to_string();
    }
    if !info.group_name.is_empty() {
        return info.group_name.clone();
    }
    contacts
        .first()
        .map(|c| c.value.clone())
        .unwrap_or_default()
}

#[must_use]
pub fn contact(c: &directory::Contact) -> ContactInfo {
    ContactInfo {
        id: ID(c.id.clone()),
        contact_type: match c.contact_type {
            directory::ContactType::Phone => ContactInfoType::Phone,
            directory::ContactType::Email => ContactInfoType::Email,
            directory::ContactType::App => ContactInfoType::App,
        },
        value: c.value.clone(),
        display_value: c.value.clone(),
        provisioned: c.provisioned,
        verified: c.verified,
        label: c.label.clone(),
    }
}

#[must_use]
pub fn entity(e: &directory::Entity, config: &StaticConfig) -> Entity {
    Entity {
        id: ID(e.id.clone()),
        kind: e.entity_type.into(),
        first_name: e.info.first_name.clone(),
        middle_initial: e.info.middle_initial.clone(),
        last_name: e.info.last_name.clone(),
        group_name: e.info.group_name.clone(),
        display_name: display_name(&e.info, &e.contacts),
        short_title: e.info.short_title.clone(),
        long_title: e.info.long_title.clone(),
        gender: e.info.gender.clone(),
        note: e.info.note.clone(),
        initials: initials(&e.info.first_name, &e.info.last_name),
        contacts: e.contacts.iter().map(contact).collect(),
        is_internal: e.entity_type == directory::EntityType::Internal,
        has_account: e.has_account(),
        avatar_url: e.image_media_id.as_ref().map(|id| config.media_url(id)),
        last_modified_timestamp: e.last_modified_timestamp,
    }
}

#[must_use]
pub fn profile(p: &directory::Profile) -> types::Profile {
    types::Profile {
        id: ID(p.id.clone()),
        entity_id: ID(p.entity_id.clone()),
        title: p.title.clone(),
        sections: p
            .sections
            .iter()
            .map(|s| types::ProfileSection {
                title: s.title.clone(),
                body: s.body.clone(),
            })
            .collect(),
        image_url: None,
        last_modified_timestamp: p.last_modified_timestamp,
    }
}

#[must_use]
pub fn organization(e: &directory::Entity) -> types::Organization {
    types::Organization {
        id: ID(e.id.clone()),
        name: if e.info.display_name.is_empty() {
            e.info.group_name.clone()
        } else {
            e.info.display_name.clone()
        },
        contacts: e.contacts.iter().map(contact).collect(),
    }
}

pub fn invite(i: &invite::Invite) -> types::Invite {
    types::Invite {
        invite_type: match i.invite_type {
            invite::InviteType::Colleague => types::InviteType::Colleague,
            invite::InviteType::Patient => types::InviteType::Patient,
            invite::InviteType::Organization => types::InviteType::Organization,
        },
        organization_id: ID(i.organization_entity_id.clone()),
        email: i.email.clone(),
        phone_number: i.phone_number.clone(),
    }
}

// ── Threads & messages ──────────────────────────────────────────────────────

#[must_use]
pub fn endpoint(e: &threading::Endpoint) -> Endpoint {
    Endpoint {
        channel: e.channel.into(),
        id: e.id.clone(),
        display_value: e.id.clone(),
    }
}

/// Build a thread response. The title is resolved here only when it does not
/// require fetching the primary entity; otherwise the `title` field resolver
/// derives it lazily.
#[must_use]
pub fn thread(row: &threading::Thread) -> Thread {
    let title = if row.title.is_empty() {
        None
    } else {
        Some(plain_text_or_raw(&row.title))
    };
    let subtitle = if row.subtitle.is_empty() {
        row.last_primary_entity_endpoints
            .iter()
            .map(|e| e.id.clone())
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        row.subtitle.clone()
    };
    Thread::new(row.clone(), title, subtitle)
}

/// Markup-aware plain text; stored text that fails to parse is shown as-is.
#[must_use]
pub fn plain_text_or_raw(text: &str) -> String {
    match markup::parse(text) {
        Ok(m) => m.plain_text(),
        Err(err) => {
            warn!(%err, "stored markup failed to parse");
            text.to_string()
        }
    }
}

fn attachment(a: &threading::Attachment, config: &StaticConfig) -> Attachment {
    let data = match &a.data {
        threading::AttachmentPayload::Image { mimetype, media_id } => {
            AttachmentData::Image(ImageAttachment {
                mimetype: mimetype.clone(),
                url: config.media_url(media_id),
                thumbnail_url: config.media_url(media_id),
            })
        }
        threading::AttachmentPayload::Video { mimetype, media_id } => {
            AttachmentData::Video(VideoAttachment {
                mimetype: mimetype.clone(),
                url: config.media_url(media_id),
            })
        }
        threading::AttachmentPayload::Audio {
            mimetype,
            media_id,
            duration_seconds,
        } => AttachmentData::Audio(AudioAttachment {
            mimetype: mimetype.clone(),
            url: config.media_url(media_id),
            duration_seconds: *duration_seconds,
        }),
        threading::AttachmentPayload::Document { name, media_id, .. } => {
            AttachmentData::BannerButton(BannerButtonAttachment {
                title: if name.is_empty() {
                    "Document".to_string()
                } else {
                    name.clone()
                },
                cta_text: "View Document".to_string(),
                icon_url: config.static_asset_url("icon_document.png"),
                tap_url: config.media_url(media_id),
            })
        }
        threading::AttachmentPayload::Visit { visit_id, .. } => {
            AttachmentData::BannerButton(BannerButtonAttachment {
                title: attachment_title(a, "Visit"),
                cta_text: "View Visit".to_string(),
                icon_url: config.static_asset_url("icon_visit.png"),
                tap_url: format!("https://{}/visit/{visit_id}", config.web_domain),
            })
        }
        threading::AttachmentPayload::PaymentRequest { payment_id } => {
            AttachmentData::BannerButton(BannerButtonAttachment {
                title: attachment_title(a, "Payment Request"),
                cta_text: "View Payment".to_string(),
                icon_url: config.static_asset_url("icon_payment.png"),
                tap_url: format!("https://{}/payment/{payment_id}", config.web_domain),
            })
        }
        threading::AttachmentPayload::CarePlan { care_plan_id } => {
            AttachmentData::BannerButton(BannerButtonAttachment {
                title: attachment_title(a, "Care Plan"),
                cta_text: "View Care Plan".to_string(),
                icon_url: config.static_asset_url("icon_care_plan.png"),
                tap_url: format!("https://{}/care_plan/{care_plan_id}", config.web_domain),
            })
        }
    };
    Attachment {
        title: attachment_title(a, fallback_attachment_title(&a.data)),
        url: a.url.clone(),
        data,
    }
}

fn attachment_title(a: &threading::Attachment, fallback: &str) -> String {
    if a.title.is_empty() {
        fallback.to_string()
    } else {
        a.title.clone()
    }
}

fn fallback_attachment_title(data: &threading::AttachmentPayload) -> &'static str {
    match data {
        threading::AttachmentPayload::Image { .. } => "Photo",
        threading::AttachmentPayload::Video { .. } => "Video",
        threading::AttachmentPayload::Audio { .. } => "Audio",
        threading::AttachmentPayload::Document { .. } => "Document",
        threading::AttachmentPayload::Visit { .. } => "Visit",
        threading::AttachmentPayload::PaymentRequest { .. } => "Payment Request",
        threading::AttachmentPayload::CarePlan { .. } => "Care Plan",
    }
}

#[must_use]
pub fn message(m: &threading::MessageData, config: &StaticConfig) -> Message {
    Message {
        text_markup: m.text.clone(),
        text: plain_text_or_raw(&m.text),
        title: plain_text_or_raw(&m.title),
        summary: m.summary.clone(),
        source: endpoint(&m.source),
        destinations: m.destinations.iter().map(endpoint).collect(),
        attachments: m.attachments.iter().map(|a| attachment(a, config)).collect(),
        refs: m
            .refs
            .iter()
            .map(|r| EntityRef {
                id: ID(r.id.clone()),
                ref_type: r.ref_type.clone(),
            })
            .collect(),
    }
}

pub fn thread_item(
    item: &threading::ThreadItem,
    config: &StaticConfig,
) -> Result<ThreadItem, TransformError> {
    let data = match &item.data {
        threading::ThreadItemPayload::Message(m) => ThreadItemData::Message(message(m, config)),
        threading::ThreadItemPayload::DeletedMessage {} => {
            ThreadItemData::DeletedMessage(types::DeletedMessage { deleted: true })
        }
        threading::ThreadItemPayload::MessageUpdate { message: m } => {
            ThreadItemData::MessageUpdate(types::MessageUpdate {
                message: message(m, config),
            })
        }
        threading::ThreadItemPayload::MessageDelete { target_item_id } => {
            ThreadItemData::MessageDelete(types::MessageDelete {
                target_item_id: ID(target_item_id.clone()),
            })
        }
    };
    Ok(ThreadItem {
        id: ID(item.id.clone()),
        uuid: item.uuid.clone(),
        thread_id: item.thread_id.clone(),
        organization_id: item.organization_id.clone(),
        actor_entity_id: item.actor_entity_id.clone(),
        internal: item.internal,
        timestamp: item.timestamp,
        modified_timestamp: item.modified_timestamp,
        data,
    })
}

/// Batch pass over a page of threads: compute titles and seed primary-entity
/// slots with one bounded-parallel batch of entity fetches.
pub async fn hydrate_threads(
    threads: Vec<Thread>,
    ram: &ResourceAccessor,
    config: &StaticConfig,
) -> Result<Vec<Thread>, meridian_upstream::UpstreamError> {
    let want: Vec<String> = threads
        .iter()
        .filter(|t| t.title.is_none() && !t.data.primary_entity_id.is_empty())
        .map(|t| t.data.primary_entity_id.clone())
        .collect();
    if want.is_empty() {
        return Ok(threads);
    }
    let fetched = ram.entities(&want).await?;
    let fetched: HashMap<String, Entity> = fetched
        .into_iter()
        .map(|(id, e)| (id, entity(&e, config)))
        .collect();
    for t in &threads {
        if t.title.is_none() {
            t.seed_primary_entity(fetched.get(&t.data.primary_entity_id).cloned());
        }
    }
    Ok(threads)
}

// ── Calls ───────────────────────────────────────────────────────────────────

/// Project a two-party call onto the viewer. Fails if the record does not
/// have exactly two participants with exactly one CALLER, or if the viewer
/// is not one of them.
pub fn call(ip_call: &excomms::IpCall, viewer_account_id: &str) -> Result<Call, TransformError> {
    if ip_call.participants.len() != 2 {
        return Err(TransformError::MalformedCall(
            ip_call.id.clone(),
            "expected exactly two participants",
        ));
    }
    let callers = ip_call
        .participants
        .iter()
        .filter(|p| p.role == excomms::CallRole::Caller)
        .count();
    if callers != 1 {
        return Err(TransformError::MalformedCall(
            ip_call.id.clone(),
            "expected exactly one caller",
        ));
    }
    let viewer = ip_call
        .participant_for_account(viewer_account_id)
        .ok_or_else(|| {
            TransformError::NotAParticipant(viewer_account_id.to_string(), ip_call.id.clone())
        })?;
    Ok(Call {
        id: ID(ip_call.id.clone()),
        access_token: viewer.access_token.clone(),
        role: viewer.role.into(),
        state: viewer.state.into(),
        video_enabled: ip_call.video_enabled,
        participants: ip_call
            .participants
            .iter()
            .map(|p| CallParticipant {
                entity_id: ID(p.entity_id.clone()),
                role: p.role.into(),
                state: p.state.into(),
                identity: p.identity.clone(),
            })
            .collect(),
    })
}

// ── Visits & settings ───────────────────────────────────────────────────────

#[must_use]
pub fn visit(v: &care::Visit, config: &StaticConfig) -> Visit {
    Visit {
        id: ID(v.id.clone()),
        name: v.name.clone(),
        entity_id: ID(v.entity_id.clone()),
        organization_id: ID(v.organization_id.clone()),
        layout_version_id: ID(v.layout_version_id.clone()),
        submitted: v.submitted,
        submitted_timestamp: v.submitted_timestamp,
        triaged: v.triaged,
        deeplink: format!(
            "https://{}/org/{}/visit/{}",
            config.web_domain, v.organization_id, v.id
        ),
    }
}

#[must_use]
pub fn visit_category(c: &care::VisitCategory) -> VisitCategory {
    VisitCategory {
        id: ID(c.id.clone()),
        name: c.name.clone(),
        layout_ids: c.layout_ids.iter().cloned().map(ID).collect(),
    }
}

/// Combine a setting config with its current value into the response shape.
#[must_use]
pub fn setting(
    config: &settings::SettingConfig,
    value: Option<&settings::Setting>,
) -> types::Setting {
    use types::settings::{
        BooleanSettingValue, SelectableItemValue, SelectableSettingValue, StringListSettingValue,
    };

    let subkey = value.and_then(|v| v.subkey.clone());
    match config.setting_type {
        settings::SettingType::Boolean => {
            let set = matches!(
                value.map(|v| &v.value),
                Some(settings::SettingValue::Boolean { set: true })
            );
            types::Setting::BooleanSetting(types::BooleanSetting {
                key: config.key.clone(),
                subkey,
                title: config.title.clone(),
                description: config.description.clone(),
                value: types::SettingValue::Boolean(BooleanSettingValue { set }),
            })
        }
        settings::SettingType::StringList => {
            let values = match value.map(|v| &v.value) {
                Some(settings::SettingValue::StringList { values }) => values.clone(),
                _ => Vec::new(),
            };
            types::Setting::StringListSetting(types::StringListSetting {
                key: config.key.clone(),
                subkey,
                title: config.title.clone(),
                description: config.description.clone(),
                value: types::SettingValue::StringList(StringListSettingValue { values }),
            })
        }
        settings::SettingType::SingleSelect | settings::SettingType::MultiSelect => {
            let label_for = |id: &str| {
                config
                    .allowed_items
                    .iter()
                    .find(|item| item.id == id)
                    .map(|item| item.label.clone())
                    .unwrap_or_default()
            };
            let items = match value.map(|v| &v.value) {
                Some(settings::SettingValue::SingleSelect { item_id, free_text }) => {
                    vec![SelectableItemValue {
                        id: item_id.clone(),
                        label: label_for(item_id),
                        free_text: free_text.clone(),
                    }]
                }
                Some(settings::SettingValue::MultiSelect {
                    item_ids,
                    free_texts,
                }) => item_ids
                    .iter()
                    .enumerate()
                    .map(|(i, id)| SelectableItemValue {
                        id: id.clone(),
                        label: label_for(id),
                        free_text: free_texts.get(i).cloned(),
                    })
                    .collect(),
                _ => Vec::new(),
            };
            let multiple = config.setting_type == settings::SettingType::MultiSelect;
            types::Setting::SelectSetting(types::SelectSetting {
                key: config.key.clone(),
                subkey,
                title: config.title.clone(),
                description: config.description.clone(),
                value: types::SettingValue::Selectable(SelectableSettingValue {
                    items,
                    allows_multiple_selection: multiple,
                }),
                options: config
                    .allowed_items
                    .iter()
                    .map(|item| SelectableItemValue {
                        id: item.id.clone(),
                        label: item.label.clone(),
                        free_text: None,
                    })
                    .collect(),
                allows_multiple_selection: multiple,
            })
        }
    }
}

// ── Saved & scheduled ───────────────────────────────────────────────────────

#[must_use]
pub fn saved_query(q: &threading::SavedQuery) -> types::SavedThreadQuery {
    types::SavedThreadQuery {
        id: ID(q.id.clone()),
        organization_id: ID(q.organization_id.clone()),
        entity_id: ID(q.entity_id.clone()),
        query: q.query.clone(),
        title: q.title.clone(),
        unread: q.unread,
        total: q.total,
        hidden: q.hidden,
        notifications_enabled: q.notifications_enabled,
    }
}

#[must_use]
pub fn saved_message(m: &threading::SavedMessage, config: &StaticConfig) -> types::SavedMessage {
    types::SavedMessage {
        id: ID(m.id.clone()),
        title: m.title.clone(),
        organization_id: ID(m.organization_id.clone()),
        owner_entity_id: ID(m.owner_entity_id.clone()),
        internal: m.internal,
        created_timestamp: m.created_timestamp,
        modified_timestamp: m.modified_timestamp,
        message: message(&m.content, config),
    }
}

#[must_use]
pub fn scheduled_message(
    m: &threading::ScheduledMessage,
    config: &StaticConfig,
) -> types::ScheduledMessage {
    types::ScheduledMessage {
        id: ID(m.id.clone()),
        thread_id: ID(m.thread_id.clone()),
        scheduled_for: m.scheduled_for,
        status: m.status.into(),
        message: message(&m.content, config),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn participant(
        account_id: &str,
        role: excomms::CallRole,
        state: excomms::CallState,
    ) -> excomms::CallParticipant {
        excomms::CallParticipant {
            account_id: account_id.to_string(),
            entity_id: format!("entity_{account_id}"),
            role,
            state,
            network_type: None,
            access_token: format!("tok-{account_id}"),
            identity: account_id.to_string(),
        }
    }

    #[test]
    fn call_transform_requires_two_participants() {
        let record = excomms::IpCall {
            id: "ipc_1".into(),
            video_enabled: false,
            participants: vec![participant(
                "a",
                excomms::CallRole::Caller,
                excomms::CallState::Pending,
            )],
        };
        assert!(matches!(
            call(&record, "a"),
            Err(TransformError::MalformedCall(_, _))
        ));
    }

    #[test]
    fn call_transform_requires_one_caller() {
        let record = excomms::IpCall {
            id: "ipc_1".into(),
            video_enabled: false,
            participants: vec![
                participant("a", excomms::CallRole::Caller, excomms::CallState::Pending),
                participant("b", excomms::CallRole::Caller, excomms::CallState::Pending),
            ],
        };
        assert!(call(&record, "a").is_err());
    }

    #[test]
    fn call_transform_projects_the_viewer() {
        let record = excomms::IpCall {
            id: "ipc_1".into(),
            video_enabled: true,
            participants: vec![
                participant("a", excomms::CallRole::Caller, excomms::CallState::Accepted),
                participant(
                    "b",
                    excomms::CallRole::Recipient,
                    excomms::CallState::Pending,
                ),
            ],
        };
        let c = call(&record, "b").unwrap();
        assert_eq!(c.role, CallRole::Recipient);
        assert_eq!(c.access_token, "tok-b");
        assert_eq!(c.participants.len(), 2);
    }

    #[test]
    fn initials_take_first_letters_uppercased() {
        assert_eq!(initials("jane", "doe"), "JD");
        assert_eq!(initials("", "doe"), "D");
        assert_eq!(initials("", ""), "");
    }

    #[test]
    fn display_name_falls_back_to_contacts() {
        let info = directory::EntityInfo::default();
        let contacts = vec![directory::Contact {
            id: "c1".into(),
            contact_type: directory::ContactType::Phone,
            value: "+14155550001".into(),
            provisioned: false,
            verified: false,
            label: String::new(),
        }];
        assert_eq!(display_name(&info, &contacts), "+14155550001");
    }
}
