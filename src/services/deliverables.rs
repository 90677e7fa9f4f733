//! Kanban pipeline of deliverables and the package usage it drives.

use chrono::Utc;

use crate::domain::deliverable::{
    Deliverable, DeliverableStatus, KanbanColumn, UpdateDeliverable, build_board,
};
use crate::domain::package::PackageAllocation;
use crate::domain::team_member::TeamMember;
use crate::domain::types::{CampaignId, ClientId, DeliverableId, TeamMemberId, WorkspaceId};
use crate::dto::deliverables::PackageUsage;
use crate::forms::deliverables::{
    AllocationForm, DeliverableForm, DeliverablePayload, DeliverablesQuery, MoveDeliverableForm,
    UpdateDeliverableForm,
};
use crate::models::auth::AuthenticatedUser;
use crate::realtime::{ChangeAction, ChangeEvent, EventHub};
use crate::repository::{
    CampaignReader, ClientReader, DeliverableListQuery, DeliverableReader, DeliverableWriter,
    TeamReader, TeamWriter,
};
use crate::services::wallet::billing_client;
use crate::services::{
    ServiceError, ServiceResult, accessible_client, ensure_role, is_restricted_manager,
    sync_current_member, workspace_of,
};
use crate::SERVICE_ADMIN_ROLE;

fn publish_deliverable(hub: &EventHub, deliverable: &Deliverable, action: ChangeAction) {
    hub.publish(ChangeEvent::new(
        deliverable.workspace_id,
        "deliverables",
        action,
        deliverable.id.get(),
        deliverable,
    ));
}

/// Checks that the referenced assignee and campaign belong to the workspace and client.
fn check_references<R>(
    repo: &R,
    workspace_id: WorkspaceId,
    client_id: ClientId,
    assignee_id: Option<TeamMemberId>,
    campaign_id: Option<CampaignId>,
) -> ServiceResult<()>
where
    R: TeamReader + CampaignReader + ?Sized,
{
    if let Some(assignee_id) = assignee_id {
        match repo.get_member_by_id(assignee_id, workspace_id)? {
            Some(member) if member.is_active => {}
            _ => {
                return Err(ServiceError::Form(format!(
                    "team member {assignee_id} cannot take work"
                )));
            }
        }
    }
    if let Some(campaign_id) = campaign_id {
        match repo.get_campaign_by_id(campaign_id, workspace_id)? {
            Some(campaign) if campaign.client_id == client_id => {}
            _ => {
                return Err(ServiceError::Form(format!(
                    "campaign {campaign_id} does not belong to this client"
                )));
            }
        }
    }
    Ok(())
}

/// Loads a deliverable whose client the caller may work with.
fn accessible_deliverable<R>(
    repo: &R,
    user: &AuthenticatedUser,
    member: &TeamMember,
    deliverable_id: i32,
) -> ServiceResult<Deliverable>
where
    R: DeliverableReader + ClientReader + ?Sized,
{
    let deliverable = repo
        .get_deliverable_by_id(DeliverableId::new(deliverable_id)?, member.workspace_id)?
        .ok_or(ServiceError::NotFound)?;
    accessible_client(repo, user, member, deliverable.client_id.get())?;
    Ok(deliverable)
}

fn list_query(
    user: &AuthenticatedUser,
    member: &TeamMember,
    query: DeliverablesQuery,
) -> ServiceResult<DeliverableListQuery> {
    let mut list_query = DeliverableListQuery::new(member.workspace_id);
    if let Some(client_id) = query.client_id {
        list_query = list_query.client(ClientId::new(client_id)?);
    }
    if let Some(assignee_id) = query.assignee_id {
        list_query = list_query.assignee(TeamMemberId::new(assignee_id)?);
    }
    if let Some(status) = query.status {
        list_query = list_query.status(status);
    }
    if is_restricted_manager(user) {
        list_query = list_query.visible_to(member.id);
    }
    Ok(list_query)
}

pub fn create_deliverable<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    form: DeliverableForm,
) -> ServiceResult<Deliverable>
where
    R: ClientReader + TeamReader + TeamWriter + CampaignReader + DeliverableWriter + ?Sized,
{
    let member = sync_current_member(repo, user)?;
    let payload = DeliverablePayload::try_from(form)?;

    accessible_client(repo, user, &member, payload.client_id.get())?;
    check_references(
        repo,
        member.workspace_id,
        payload.client_id,
        payload.assignee_id,
        payload.campaign_id,
    )?;

    let deliverable = repo
        .create_deliverable(&payload.into_domain(member.workspace_id))
        .map_err(|err| {
            log::error!("Failed to create deliverable: {err}");
            err
        })?;

    publish_deliverable(hub, &deliverable, ChangeAction::Insert);
    Ok(deliverable)
}

/// Edits title, kind, assignee, campaign or due date; the column is changed by [`move_deliverable`].
pub fn update_deliverable<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    deliverable_id: i32,
    form: UpdateDeliverableForm,
) -> ServiceResult<Deliverable>
where
    R: ClientReader
        + TeamReader
        + TeamWriter
        + CampaignReader
        + DeliverableReader
        + DeliverableWriter
        + ?Sized,
{
    let member = sync_current_member(repo, user)?;
    let current = accessible_deliverable(repo, user, &member, deliverable_id)?;
    let updates = UpdateDeliverable::try_from(form)?;
    if current.status == DeliverableStatus::Delivered && current.kind != updates.kind {
        return Err(ServiceError::Conflict(
            "reopen a delivered deliverable before changing its kind".to_string(),
        ));
    }

    check_references(
        repo,
        member.workspace_id,
        current.client_id,
        updates.assignee_id,
        updates.campaign_id,
    )?;

    let deliverable = repo
        .update_deliverable(current.id, member.workspace_id, &updates)
        .map_err(|err| {
            log::error!("Failed to update deliverable {}: {err}", current.id);
            err
        })?;

    publish_deliverable(hub, &deliverable, ChangeAction::Update);
    Ok(deliverable)
}

pub fn delete_deliverable<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    deliverable_id: i32,
) -> ServiceResult<()>
where
    R: ClientReader + TeamWriter + DeliverableReader + DeliverableWriter + ?Sized,
{
    let member = sync_current_member(repo, user)?;
    let deliverable = accessible_deliverable(repo, user, &member, deliverable_id)?;

    repo.delete_deliverable(deliverable.id, member.workspace_id)
        .map_err(|err| {
            log::error!("Failed to delete deliverable {}: {err}", deliverable.id);
            err
        })?;

    publish_deliverable(hub, &deliverable, ChangeAction::Delete);
    Ok(())
}

pub fn list_deliverables<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: DeliverablesQuery,
) -> ServiceResult<Vec<Deliverable>>
where
    R: DeliverableReader + TeamWriter + ?Sized,
{
    let member = sync_current_member(repo, user)?;
    let list_query = list_query(user, &member, query)?;

    repo.list_deliverables(list_query).map_err(|err| {
        log::error!("Failed to list deliverables: {err}");
        err.into()
    })
}

/// The five kanban columns, always present, with the filtered cards in each.
pub fn kanban_board<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: DeliverablesQuery,
) -> ServiceResult<Vec<KanbanColumn>>
where
    R: DeliverableReader + TeamWriter + ?Sized,
{
    list_deliverables(repo, user, query).map(build_board)
}

/// Moves a card to another column, consuming or restoring package usage.
pub fn move_deliverable<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    deliverable_id: i32,
    form: MoveDeliverableForm,
) -> ServiceResult<Deliverable>
where
    R: ClientReader + TeamWriter + DeliverableReader + DeliverableWriter + ?Sized,
{
    let member = sync_current_member(repo, user)?;
    let current = accessible_deliverable(repo, user, &member, deliverable_id)?;

    if current.status == form.status {
        return Ok(current);
    }

    let deliverable = repo
        .move_deliverable(
            current.id,
            member.workspace_id,
            form.status,
            Utc::now().naive_utc(),
        )
        .map_err(|err| {
            log::error!(
                "Failed to move deliverable {} to {}: {err}",
                current.id,
                form.status
            );
            err
        })?;

    publish_deliverable(hub, &deliverable, ChangeAction::Update);
    Ok(deliverable)
}

/// Sets how many units of a kind the client's package includes.
pub fn set_allocation<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    client_id: i32,
    form: AllocationForm,
) -> ServiceResult<PackageAllocation>
where
    R: ClientReader + DeliverableWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let workspace_id = workspace_of(user)?;
    let client = repo
        .get_client_by_id(ClientId::new(client_id)?, workspace_id)?
        .ok_or(ServiceError::NotFound)?;
    let allocation = form.into_domain(client.id)?;

    let stored = repo.set_package_allocation(&allocation).map_err(|err| {
        log::error!(
            "Failed to set {} allocation for client {}: {err}",
            allocation.kind,
            client.id
        );
        err
    })?;

    hub.publish(ChangeEvent::new(
        workspace_id,
        "package_allocations",
        ChangeAction::Update,
        client.id.get(),
        &stored,
    ));
    Ok(stored)
}

/// Allocated, used and remaining units per kind for one client.
///
/// Portal users can only ask about their own client.
pub fn package_usage<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
) -> ServiceResult<Vec<PackageUsage>>
where
    R: ClientReader + TeamWriter + DeliverableReader + ?Sized,
{
    let client = billing_client(repo, user, client_id)?;

    let allocations = repo.list_package_allocations(client.id)?;
    Ok(allocations.into_iter().map(PackageUsage::from).collect())
}
