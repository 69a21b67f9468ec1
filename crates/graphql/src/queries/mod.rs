//! Query resolvers.

use std::sync::Arc;

use async_graphql::{Context, ID, Object, Result};

use {
    meridian_common::{ids::NodeKind, parallel},
    meridian_upstream::{directory, settings, threading},
};

use crate::{
    context::{RequestContext, StaticConfig},
    error,
    raccess::ResourceAccessor,
    transform,
    types::{
        Account, Call, Connection, ConnectionArgs, Edge, Entity, Invite, Me, Node, Organization,
        SavedThreadQuery, ScheduledMessage, Setting, Subdomain, Thread, Visit, VisitCategory,
    },
};

type CtxParts<'a> = (
    &'a Arc<RequestContext>,
    &'a Arc<ResourceAccessor>,
    &'a Arc<StaticConfig>,
);

pub(crate) fn parts<'a>(ctx: &Context<'a>) -> Result<CtxParts<'a>> {
    Ok((
        ctx.data::<Arc<RequestContext>>()?,
        ctx.data::<Arc<ResourceAccessor>>()?,
        ctx.data::<Arc<StaticConfig>>()?,
    ))
}

/// Fetch a thread with read status relative to the caller: resolve the
/// thread, find the caller's entity in its organization, then re-fetch with
/// that viewer so unread and permission bits are right.
pub(crate) async fn thread_with_viewer(
    rc: &RequestContext,
    ram: &ResourceAccessor,
    thread_id: &str,
) -> Result<Thread> {
    let account = rc.require_account()?;
    let bare = ram
        .thread(thread_id, "")
        .await
        .map_err(|e| rc.upstream(e))?;
    let viewer = ram
        .entity_in_org_for_account_id(&bare.organization_id, &account.id)
        .await
        .map_err(|e| {
            if e.is_not_found() {
                error::not_found(thread_id)
            } else {
                rc.upstream(e)
            }
        })?;
    let row = ram
        .thread(thread_id, &viewer.id)
        .await
        .map_err(|e| rc.upstream(e))?;
    Ok(transform::thread(&row))
}

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Polymorphic lookup by node id; dispatches on the id prefix.
    async fn node(&self, ctx: &Context<'_>, id: ID) -> Result<Node> {
        let (rc, ram, config) = parts(ctx)?;
        let account = rc.require_account()?;
        let kind = NodeKind::from_id(&id)
            .ok_or_else(|| error::not_supported(format!("unknown node id prefix: {}", *id)))?;
        match kind {
            NodeKind::Account => {
                if *id != account.id {
                    return Err(error::not_authorized());
                }
                Ok(match Account::from_upstream(&account) {
                    Account::ProviderAccount(a) => Node::ProviderAccount(a),
                    Account::PatientAccount(a) => Node::PatientAccount(a),
                })
            }
            NodeKind::Entity => {
                let entity = ram.entity(&id).await.map_err(|e| rc.upstream(e))?;
                if entity.entity_type == directory::EntityType::Organization {
                    Ok(Node::Organization(transform::organization(&entity)))
                } else {
                    Ok(Node::Entity(transform::entity(&entity, config)))
                }
            }
            NodeKind::Thread => Ok(Node::Thread(thread_with_viewer(rc, ram, &id).await?)),
            NodeKind::ThreadItem => {
                let item = ram.thread_item(&id).await.map_err(|e| rc.upstream(e))?;
                Ok(Node::ThreadItem(transform::thread_item(&item, config)?))
            }
            NodeKind::SavedThreadQuery => {
                let query = ram.saved_query(&id).await.map_err(|e| rc.upstream(e))?;
                Ok(Node::SavedThreadQuery(transform::saved_query(&query)))
            }
            NodeKind::Visit => {
                let visit = ram.visit(&id).await.map_err(|e| rc.upstream(e))?;
                Ok(Node::Visit(transform::visit(&visit, config)))
            }
            NodeKind::Call => {
                let call = ram.ip_call(&id).await.map_err(|e| rc.upstream(e))?;
                Ok(Node::Call(
                    transform::call(&call, &account.id).map_err(|e| rc.internal(e))?,
                ))
            }
            NodeKind::SavedMessage | NodeKind::ScheduledMessage => Err(error::not_supported(
                format!("{} is not addressable as a node", *id),
            )),
        }
    }

    /// The authenticated viewer.
    async fn me(&self, ctx: &Context<'_>) -> Result<Me> {
        let (rc, _ram, _config) = parts(ctx)?;
        let account = rc.require_account()?;
        Ok(Me {
            account: Account::from_upstream(&account),
            client_encryption_key: rc.client_encryption_key(),
        })
    }

    async fn entity(&self, ctx: &Context<'_>, id: ID) -> Result<Entity> {
        let (rc, ram, config) = parts(ctx)?;
        rc.require_account()?;
        let entity = ram.entity(&id).await.map_err(|e| rc.upstream(e))?;
        Ok(transform::entity(&entity, config))
    }

    async fn organization(&self, ctx: &Context<'_>, id: ID) -> Result<Organization> {
        let (rc, ram, _config) = parts(ctx)?;
        rc.require_account()?;
        let entity = ram.entity(&id).await.map_err(|e| rc.upstream(e))?;
        if entity.entity_type != directory::EntityType::Organization {
            return Err(error::not_found(&*id));
        }
        Ok(transform::organization(&entity))
    }

    async fn thread(&self, ctx: &Context<'_>, id: ID) -> Result<Thread> {
        let (rc, ram, _config) = parts(ctx)?;
        rc.require_provider()?;
        thread_with_viewer(rc, ram, &id).await
    }

    /// Threads visible to the caller in an organization.
    async fn threads(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "organizationID")] organization_id: ID,
        #[graphql(default)] args: ConnectionArgs,
    ) -> Result<Connection<Thread>> {
        let (rc, ram, config) = parts(ctx)?;
        let account = rc.require_provider()?;
        let viewer = ram
            .entity_in_org_for_account_id(&organization_id, &account.id)
            .await
            .map_err(|e| rc.upstream(e))?;
        let iterator = args.iterator();
        let direction = iterator.direction;
        let resp = ram
            .query_threads(threading::QueryThreadsRequest {
                organization_id: organization_id.to_string(),
                viewer_entity_id: viewer.id.clone(),
                query_type: None,
                iterator,
            })
            .await
            .map_err(|e| rc.upstream(e))?;
        let mut cursors = Vec::with_capacity(resp.edges.len());
        let mut threads = Vec::with_capacity(resp.edges.len());
        for edge in &resp.edges {
            cursors.push(edge.cursor.clone());
            threads.push(transform::thread(&edge.thread));
        }
        let threads = transform::hydrate_threads(threads, ram, config)
            .await
            .map_err(|e| rc.upstream(e))?;
        let edges = threads
            .into_iter()
            .zip(cursors)
            .map(|(node, cursor)| Edge { node, cursor })
            .collect();
        Ok(Connection::from_edges(
            edges,
            direction,
            resp.has_more,
            resp.total,
        ))
    }

    /// Resolve a signup invite by token. Deliberately unauthenticated:
    /// prospective users hold a token, not an account.
    async fn invite(&self, ctx: &Context<'_>, token: String) -> Result<Invite> {
        let (rc, ram, _config) = parts(ctx)?;
        let invite = ram.lookup_invite(&token).await.map_err(|e| rc.upstream(e))?;
        Ok(transform::invite(&invite))
    }

    /// Whether an organization subdomain is still unclaimed.
    async fn subdomain(&self, ctx: &Context<'_>, value: String) -> Result<Subdomain> {
        let (rc, ram, _config) = parts(ctx)?;
        rc.require_provider()?;
        match ram.entity_domain(None, Some(&value)).await {
            Ok(_) => Ok(Subdomain { available: false }),
            Err(e) if e.is_not_found() => Ok(Subdomain { available: true }),
            Err(e) => Err(rc.upstream(e)),
        }
    }

    async fn setting(
        &self,
        ctx: &Context<'_>,
        key: String,
        subkey: Option<String>,
        #[graphql(name = "nodeID")] node_id: ID,
    ) -> Result<Setting> {
        let (rc, ram, _config) = parts(ctx)?;
        rc.require_account()?;
        let configs = ram
            .setting_configs(std::slice::from_ref(&key))
            .await
            .map_err(|e| rc.upstream(e))?;
        let setting_config = configs
            .into_iter()
            .next()
            .ok_or_else(|| error::not_found(&key))?;
        let values = ram
            .setting_values(settings::GetValuesRequest {
                node_id: node_id.to_string(),
                keys: vec![settings::SettingKey {
                    key: key.clone(),
                    subkey: subkey.clone(),
                }],
            })
            .await
            .map_err(|e| rc.upstream(e))?;
        Ok(transform::setting(&setting_config, values.first()))
    }

    async fn visit(&self, ctx: &Context<'_>, id: ID) -> Result<Visit> {
        let (rc, ram, config) = parts(ctx)?;
        rc.require_account()?;
        let visit = ram.visit(&id).await.map_err(|e| rc.upstream(e))?;
        Ok(transform::visit(&visit, config))
    }

    /// Visit categories offered to patients of an organization, with layouts
    /// resolved per category in parallel.
    #[graphql(name = "visitCategories")]
    async fn visit_categories(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "organizationID")] organization_id: ID,
    ) -> Result<Vec<VisitCategory>> {
        let (rc, ram, _config) = parts(ctx)?;
        rc.require_account()?;
        let categories = ram
            .visit_categories(&organization_id)
            .await
            .map_err(|e| rc.upstream(e))?;
        let layout_fetches = categories
            .iter()
            .map(|c| {
                let ram = Arc::clone(ram);
                let category_id = c.id.clone();
                async move { ram.visit_layouts_by_category(&category_id).await }
            })
            .collect();
        let layouts = parallel::all(layout_fetches)
            .await
            .map_err(|e| rc.upstream(e))?;
        Ok(categories
            .iter()
            .zip(layouts)
            .map(|(c, ls)| {
                let mut out = transform::visit_category(c);
                if out.layout_ids.is_empty() {
                    out.layout_ids = ls.into_iter().map(|l| ID(l.id)).collect();
                }
                out
            })
            .collect())
    }

    /// IP calls awaiting this account's answer.
    #[graphql(name = "pendingCalls")]
    async fn pending_calls(&self, ctx: &Context<'_>) -> Result<Vec<Call>> {
        let (rc, ram, _config) = parts(ctx)?;
        let account = rc.require_account()?;
        let calls = ram
            .pending_ip_calls(&account.id)
            .await
            .map_err(|e| rc.upstream(e))?;
        calls
            .iter()
            .map(|c| transform::call(c, &account.id).map_err(|e| rc.internal(e)))
            .collect()
    }

    #[graphql(name = "savedThreadQueries")]
    async fn saved_thread_queries(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "organizationID")] organization_id: ID,
    ) -> Result<Vec<SavedThreadQuery>> {
        let (rc, ram, _config) = parts(ctx)?;
        let account = rc.require_provider()?;
        let viewer = ram
            .entity_in_org_for_account_id(&organization_id, &account.id)
            .await
            .map_err(|e| rc.upstream(e))?;
        let queries = ram
            .saved_queries(&viewer.id)
            .await
            .map_err(|e| rc.upstream(e))?;
        Ok(queries.iter().map(transform::saved_query).collect())
    }

    #[graphql(name = "scheduledMessages")]
    async fn scheduled_messages(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "threadID")] thread_id: ID,
    ) -> Result<Vec<ScheduledMessage>> {
        let (rc, ram, config) = parts(ctx)?;
        rc.require_provider()?;
        let messages = ram
            .scheduled_messages(threading::ScheduledMessagesKey::ThreadId(
                thread_id.to_string(),
            ))
            .await
            .map_err(|e| rc.upstream(e))?;
        Ok(messages
            .iter()
            .map(|m| transform::scheduled_message(m, config))
            .collect())
    }
}
