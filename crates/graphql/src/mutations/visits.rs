//! Visit mutations: createVisit, submitVisit, triageVisit.

use async_graphql::{Context, Enum, ID, InputObject, Object, Result, SimpleObject};

use {
    meridian_common::markup::Markup,
    meridian_upstream::{care, threading},
    tracing::warn,
};

use crate::{
    error,
    queries::parts,
    raccess::ResourceAccessor,
    transform,
    types::Visit,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum CreateVisitErrorCode {
    VisitLayoutNotFound,
}

#[derive(InputObject)]
pub struct CreateVisitInput {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    #[graphql(name = "organizationID")]
    pub organization_id: ID,
    /// Patient the visit is for; defaults to the caller's own entity.
    #[graphql(name = "entityID")]
    pub entity_id: Option<ID>,
    #[graphql(name = "layoutID")]
    pub layout_id: ID,
}

#[derive(SimpleObject)]
pub struct CreateVisitPayload {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    pub success: bool,
    #[graphql(name = "errorCode")]
    pub error_code: Option<CreateVisitErrorCode>,
    #[graphql(name = "errorMessage")]
    pub error_message: Option<String>,
    pub visit: Option<Visit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum SubmitVisitErrorCode {
    VisitNotFound,
    VisitAlreadySubmitted,
}

#[derive(InputObject)]
pub struct SubmitVisitInput {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    #[graphql(name = "visitID")]
    pub visit_id: ID,
    /// Patient answers keyed by question id, serialized.
    #[graphql(name = "answersJSON")]
    pub answers_json: Option<String>,
}

#[derive(SimpleObject)]
pub struct SubmitVisitPayload {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    pub success: bool,
    #[graphql(name = "errorCode")]
    pub error_code: Option<SubmitVisitErrorCode>,
    #[graphql(name = "errorMessage")]
    pub error_message: Option<String>,
    pub visit: Option<Visit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum TriageVisitErrorCode {
    VisitNotFound,
    CannotTriageVisit,
}

#[derive(InputObject)]
pub struct TriageVisitInput {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    #[graphql(name = "visitID")]
    pub visit_id: ID,
}

#[derive(SimpleObject)]
pub struct TriageVisitPayload {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    pub success: bool,
    #[graphql(name = "errorCode")]
    pub error_code: Option<TriageVisitErrorCode>,
    #[graphql(name = "errorMessage")]
    pub error_message: Option<String>,
}

/// Announce a state change on the patient's primary thread. Failures here
/// never fail the mutation; the visit update already happened.
async fn announce_on_primary_thread(
    ram: &ResourceAccessor,
    config: &crate::context::StaticConfig,
    visit: &care::Visit,
    summary: &str,
) {
    let threads = match ram.threads_for_member(&visit.entity_id, true).await {
        Ok(threads) => threads,
        Err(err) => {
            warn!(visit_id = %visit.id, %err, "primary thread lookup failed");
            return;
        }
    };
    let Some(thread) = threads
        .iter()
        .find(|t| t.organization_id == visit.organization_id)
    else {
        return;
    };
    let href = config.visit_url(&visit.organization_id, &thread.id, &visit.id);
    let title = Markup::anchor(href, visit.name.clone());
    let req = threading::PostMessageRequest {
        thread_id: thread.id.clone(),
        from_entity_id: config.system_org_id.clone(),
        uuid: String::new(),
        source: threading::Endpoint {
            channel: threading::EndpointChannel::App,
            id: config.system_org_id.clone(),
        },
        text: String::new(),
        summary: summary.to_string(),
        title: title.format(),
        destinations: Vec::new(),
        internal: true,
        attachments: Vec::new(),
    };
    if let Err(err) = ram.post_message(req).await {
        warn!(visit_id = %visit.id, thread_id = %thread.id, %err, "visit announcement failed");
    }
}

#[derive(Default)]
pub struct VisitMutations;

#[Object]
impl VisitMutations {
    #[graphql(name = "createVisit")]
    async fn create_visit(
        &self,
        ctx: &Context<'_>,
        input: CreateVisitInput,
    ) -> Result<CreateVisitPayload> {
        let (rc, ram, config) = parts(ctx)?;
        let account = rc.require_account()?;
        let org_id = input.organization_id.as_str();
        let caller = ram
            .entity_in_org_for_account_id(org_id, &account.id)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    error::not_authorized()
                } else {
                    rc.upstream(e)
                }
            })?;
        let layout = match ram.visit_layout(input.layout_id.as_str()).await {
            Ok(layout) => layout,
            Err(e) if e.is_not_found() => {
                return Ok(CreateVisitPayload {
                    client_mutation_id: input.client_mutation_id,
                    success: false,
                    error_code: Some(CreateVisitErrorCode::VisitLayoutNotFound),
                    error_message: Some("That visit type is no longer available.".to_string()),
                    visit: None,
                });
            }
            Err(e) => return Err(rc.upstream(e)),
        };
        let entity_id = input
            .entity_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| caller.id.clone());
        let visit = ram
            .create_visit(care::CreateVisitRequest {
                name: layout.name,
                layout_version_id: layout.current_version_id,
                entity_id,
                organization_id: org_id.to_string(),
                creator_entity_id: caller.id,
            })
            .await
            .map_err(|e| rc.upstream(e))?;
        Ok(CreateVisitPayload {
            client_mutation_id: input.client_mutation_id,
            success: true,
            error_code: None,
            error_message: None,
            visit: Some(transform::visit(&visit, config)),
        })
    }

    /// Submit a completed visit and announce it on the patient's primary
    /// thread with a tappable title linking to the visit.
    #[graphql(name = "submitVisit")]
    async fn submit_visit(
        &self,
        ctx: &Context<'_>,
        input: SubmitVisitInput,
    ) -> Result<SubmitVisitPayload> {
        let (rc, ram, config) = parts(ctx)?;
        rc.require_account()?;
        let visit_id = input.visit_id.as_str();
        let visit = match ram.visit(visit_id).await {
            Ok(visit) => visit,
            Err(e) if e.is_not_found() => {
                return Ok(SubmitVisitPayload {
                    client_mutation_id: input.client_mutation_id,
                    success: false,
                    error_code: Some(SubmitVisitErrorCode::VisitNotFound),
                    error_message: Some("The visit could not be found.".to_string()),
                    visit: None,
                });
            }
            Err(e) => return Err(rc.upstream(e)),
        };
        if visit.submitted {
            return Ok(SubmitVisitPayload {
                client_mutation_id: input.client_mutation_id,
                success: false,
                error_code: Some(SubmitVisitErrorCode::VisitAlreadySubmitted),
                error_message: Some("This visit has already been submitted.".to_string()),
                visit: Some(transform::visit(&visit, config)),
            });
        }
        match ram
            .submit_visit(visit_id, input.answers_json.as_deref().unwrap_or("{}"))
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_failed_precondition() => {
                return Ok(SubmitVisitPayload {
                    client_mutation_id: input.client_mutation_id,
                    success: false,
                    error_code: Some(SubmitVisitErrorCode::VisitAlreadySubmitted),
                    error_message: Some("This visit has already been submitted.".to_string()),
                    visit: Some(transform::visit(&visit, config)),
                });
            }
            Err(e) => return Err(rc.upstream(e)),
        }

        announce_on_primary_thread(ram, config, &visit, &format!("Completed: {}", visit.name))
            .await;

        let updated = ram.visit(visit_id).await.map_err(|e| rc.upstream(e))?;
        Ok(SubmitVisitPayload {
            client_mutation_id: input.client_mutation_id,
            success: true,
            error_code: None,
            error_message: None,
            visit: Some(transform::visit(&updated, config)),
        })
    }

    /// Resolve a draft visit without the patient completing it. Submitted
    /// visits cannot be triaged.
    #[graphql(name = "triageVisit")]
    async fn triage_visit(
        &self,
        ctx: &Context<'_>,
        input: TriageVisitInput,
    ) -> Result<TriageVisitPayload> {
        let (rc, ram, config) = parts(ctx)?;
        rc.require_provider()?;
        let visit_id = input.visit_id.as_str();
        let visit = match ram.visit(visit_id).await {
            Ok(visit) => visit,
            Err(e) if e.is_not_found() => {
                return Ok(TriageVisitPayload {
                    client_mutation_id: input.client_mutation_id,
                    success: false,
                    error_code: Some(TriageVisitErrorCode::VisitNotFound),
                    error_message: Some("The visit could not be found.".to_string()),
                });
            }
            Err(e) => return Err(rc.upstream(e)),
        };
        if visit.submitted || visit.triaged {
            return Ok(TriageVisitPayload {
                client_mutation_id: input.client_mutation_id,
                success: false,
                error_code: Some(TriageVisitErrorCode::CannotTriageVisit),
                error_message: Some("This visit can no longer be triaged.".to_string()),
            });
        }
        match ram.triage_visit(visit_id).await {
            Ok(()) => {}
            Err(e) if e.is_failed_precondition() => {
                return Ok(TriageVisitPayload {
                    client_mutation_id: input.client_mutation_id,
                    success: false,
                    error_code: Some(TriageVisitErrorCode::CannotTriageVisit),
                    error_message: Some("This visit can no longer be triaged.".to_string()),
                });
            }
            Err(e) => return Err(rc.upstream(e)),
        }

        announce_on_primary_thread(ram, config, &visit, &format!("Triaged: {}", visit.name))
            .await;

        Ok(TriageVisitPayload {
            client_mutation_id: input.client_mutation_id,
            success: true,
            error_code: None,
            error_message: None,
        })
    }
}
