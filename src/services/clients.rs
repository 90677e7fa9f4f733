//! Client relationship tracking.

use crate::domain::client::Client;
use crate::domain::types::ClientId;
use crate::dto::clients::ClientDetail;
use crate::forms::clients::{
    AssignTeamForm, AssignTeamPayload, BulkClientsForm, ClientForm, ClientPayload, ClientsQuery,
};
use crate::models::auth::AuthenticatedUser;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::realtime::{ChangeAction, ChangeEvent, EventHub};
use crate::repository::{ClientListQuery, ClientReader, ClientWriter, TeamReader, TeamWriter};
use crate::services::{
    ServiceError, ServiceResult, accessible_client, ensure_role, is_admin, is_restricted_manager,
    sync_current_member, workspace_of,
};
use crate::SERVICE_ADMIN_ROLE;

fn publish_client(hub: &EventHub, client: &Client, action: ChangeAction) {
    hub.publish(ChangeEvent::new(
        client.workspace_id,
        "clients",
        action,
        client.id.get(),
        client,
    ));
}

/// Lists clients visible to the caller, one page at a time.
pub fn list_clients<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: ClientsQuery,
) -> ServiceResult<Paginated<Client>>
where
    R: ClientReader + TeamWriter + ?Sized,
{
    let member = sync_current_member(repo, user)?;

    let page = query.page.unwrap_or(1).max(1);
    let mut list_query =
        ClientListQuery::new(member.workspace_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);

    if let Some(term) = query
        .search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
    {
        list_query = list_query.search(term);
    }
    if let Some(status) = query.status {
        list_query = list_query.status(status);
    }
    if is_restricted_manager(user) {
        list_query = list_query.member(member.id);
    }

    let (total, clients) = repo.list_clients(list_query).map_err(|err| {
        log::error!("Failed to list clients: {err}");
        err
    })?;

    Ok(Paginated::new(clients, total, page, DEFAULT_ITEMS_PER_PAGE))
}

pub fn get_client<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
) -> ServiceResult<ClientDetail>
where
    R: ClientReader + TeamWriter + ?Sized,
{
    let member = sync_current_member(repo, user)?;
    let client = accessible_client(repo, user, &member, client_id)?;
    let team = repo.list_client_team(client.id)?;

    Ok(ClientDetail { client, team })
}

pub fn create_client<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    form: ClientForm,
) -> ServiceResult<Client>
where
    R: ClientWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let workspace_id = workspace_of(user)?;
    let payload = ClientPayload::try_from(form)?;

    let client = repo
        .create_client(&payload.into_new(workspace_id))
        .map_err(|err| {
            log::error!("Failed to create client: {err}");
            err
        })?;

    publish_client(hub, &client, ChangeAction::Insert);
    Ok(client)
}

/// Creates several clients at once; the whole batch is rejected if any row is invalid.
pub fn create_clients<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: BulkClientsForm,
) -> ServiceResult<usize>
where
    R: ClientWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let workspace_id = workspace_of(user)?;
    if form.clients.is_empty() {
        return Err(ServiceError::Form("no clients to import".to_string()));
    }

    let new_clients = form
        .clients
        .into_iter()
        .enumerate()
        .map(|(row, client)| {
            ClientPayload::try_from(client)
                .map(|payload| payload.into_new(workspace_id))
                .map_err(|err| ServiceError::Form(format!("row {}: {err}", row + 1)))
        })
        .collect::<ServiceResult<Vec<_>>>()?;

    let created = repo.create_clients(&new_clients).map_err(|err| {
        log::error!("Failed to import clients: {err}");
        err
    })?;
    log::info!("Imported {created} clients into workspace {workspace_id}");

    Ok(created)
}

pub fn update_client<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    client_id: i32,
    form: ClientForm,
) -> ServiceResult<Client>
where
    R: ClientReader + ClientWriter + TeamWriter + ?Sized,
{
    let member = sync_current_member(repo, user)?;
    if !is_admin(user) && !is_restricted_manager(user) {
        return Err(ServiceError::Unauthorized);
    }

    let client = accessible_client(repo, user, &member, client_id)?;
    let payload = ClientPayload::try_from(form)?;

    let updated = repo
        .update_client(client.id, client.workspace_id, &payload.into_update())
        .map_err(|err| {
            log::error!("Failed to update client {}: {err}", client.id);
            err
        })?;

    publish_client(hub, &updated, ChangeAction::Update);
    Ok(updated)
}

/// Deletes the client and everything billed or delivered for it.
pub fn delete_client<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    client_id: i32,
) -> ServiceResult<()>
where
    R: ClientWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let workspace_id = workspace_of(user)?;
    let client_id = ClientId::new(client_id)?;

    repo.delete_client(client_id, workspace_id).map_err(|err| {
        log::error!("Failed to delete client {client_id}: {err}");
        err
    })?;

    hub.publish(ChangeEvent::new(
        workspace_id,
        "clients",
        ChangeAction::Delete,
        client_id.get(),
        &serde_json::json!({ "id": client_id }),
    ));
    Ok(())
}

/// Replaces the team members assigned to a client.
pub fn assign_team<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    client_id: i32,
    form: AssignTeamForm,
) -> ServiceResult<ClientDetail>
where
    R: ClientReader + ClientWriter + TeamReader + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let workspace_id = workspace_of(user)?;
    let client = repo
        .get_client_by_id(ClientId::new(client_id)?, workspace_id)?
        .ok_or(ServiceError::NotFound)?;
    let payload = AssignTeamPayload::try_from(form)?;

    for member_id in &payload.member_ids {
        if repo.get_member_by_id(*member_id, workspace_id)?.is_none() {
            return Err(ServiceError::Form(format!(
                "team member {member_id} does not exist"
            )));
        }
    }

    repo.assign_client_team(client.id, &payload.member_ids)
        .map_err(|err| {
            log::error!("Failed to assign team to client {}: {err}", client.id);
            err
        })?;
    let team = repo.list_client_team(client.id)?;

    hub.publish(ChangeEvent::new(
        workspace_id,
        "client_team",
        ChangeAction::Update,
        client.id.get(),
        &team,
    ));
    Ok(ClientDetail { client, team })
}
