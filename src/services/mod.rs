//! Business workflows behind the HTTP routes.
//!
//! Each service is a plain function generic over the repository traits it
//! needs, so it can run against [`crate::repository::DieselRepository`] in
//! production and against the `mockall` repository in tests.

use thiserror::Error;

use crate::domain::client::Client;
use crate::domain::team_member::{NewTeamMember, TeamMember, TeamRole};
use crate::domain::types::{ClientId, EmailAddress, MemberName, WorkspaceId};
use crate::models::auth::AuthenticatedUser;
use crate::repository::{ClientReader, TeamWriter};
use crate::{SERVICE_ACCESS_ROLE, SERVICE_ADMIN_ROLE, SERVICE_CLIENT_ROLE, SERVICE_MANAGER_ROLE};

pub mod campaigns;
pub mod clients;
pub mod dashboard;
pub mod deliverables;
pub mod invoices;
pub mod messaging;
pub mod presence;
pub mod team;
pub mod users;
pub mod wallet;
pub mod workspaces;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Form(String),

    #[error("{0}")]
    TypeConstraint(String),

    #[error("{0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

pub fn check_role(role: &str, roles: &[String]) -> bool {
    roles.iter().any(|r| r == role)
}

pub fn ensure_role(user: &AuthenticatedUser, role: &str) -> ServiceResult<()> {
    if check_role(role, &user.roles) {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

pub(crate) fn is_admin(user: &AuthenticatedUser) -> bool {
    check_role(SERVICE_ADMIN_ROLE, &user.roles)
}

/// Managers only see clients they are assigned to; admins see everything.
pub(crate) fn is_restricted_manager(user: &AuthenticatedUser) -> bool {
    check_role(SERVICE_MANAGER_ROLE, &user.roles) && !is_admin(user)
}

pub(crate) fn is_portal_user(user: &AuthenticatedUser) -> bool {
    check_role(SERVICE_CLIENT_ROLE, &user.roles) && !check_role(SERVICE_ACCESS_ROLE, &user.roles)
}

pub(crate) fn workspace_of(user: &AuthenticatedUser) -> ServiceResult<WorkspaceId> {
    Ok(WorkspaceId::new(user.hub_id)?)
}

fn role_of(user: &AuthenticatedUser) -> TeamRole {
    if is_admin(user) {
        TeamRole::Admin
    } else if check_role(SERVICE_MANAGER_ROLE, &user.roles) {
        TeamRole::Manager
    } else {
        TeamRole::Member
    }
}

/// Upserts the caller as a team member of their workspace and returns it.
pub fn sync_current_member<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<TeamMember>
where
    R: TeamWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let workspace_id = workspace_of(user)?;
    let email = EmailAddress::new(&user.email)?;
    let name = MemberName::new(&user.name).or_else(|_| MemberName::new(email.as_str()))?;

    let member = NewTeamMember::new(workspace_id, name, email, role_of(user));
    let member = repo.sync_member(&member).map_err(|err| {
        log::error!("Failed to sync team member: {err}");
        err
    })?;

    if !member.is_active {
        return Err(ServiceError::Unauthorized);
    }
    Ok(member)
}

/// Loads a client the caller is allowed to work with.
pub(crate) fn accessible_client<R>(
    repo: &R,
    user: &AuthenticatedUser,
    member: &TeamMember,
    client_id: i32,
) -> ServiceResult<Client>
where
    R: ClientReader + ?Sized,
{
    let client = repo
        .get_client_by_id(ClientId::new(client_id)?, member.workspace_id)?
        .ok_or(ServiceError::NotFound)?;

    if is_restricted_manager(user) && !repo.is_client_assigned(client.id, member.id)? {
        return Err(ServiceError::Unauthorized);
    }
    Ok(client)
}

/// Resolves the client record a portal user is linked to by email.
pub(crate) fn portal_client<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Client>
where
    R: ClientReader + ?Sized,
{
    ensure_role(user, SERVICE_CLIENT_ROLE)?;

    let workspace_id = workspace_of(user)?;
    let email = EmailAddress::new(&user.email)?;
    repo.get_client_by_email(&email, workspace_id)?
        .ok_or(ServiceError::Unauthorized)
}
