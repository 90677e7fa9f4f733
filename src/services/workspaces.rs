//! Workspace (tenant) lookup and naming.

use crate::domain::types::WorkspaceName;
use crate::domain::workspace::{DEFAULT_WORKSPACE_NAME, Workspace};
use crate::forms::workspace::RenameWorkspaceForm;
use crate::models::auth::AuthenticatedUser;
use crate::realtime::{ChangeAction, ChangeEvent, EventHub};
use crate::repository::{WorkspaceReader, WorkspaceWriter};
use crate::services::{ServiceError, ServiceResult, ensure_role, is_portal_user, workspace_of};
use crate::{SERVICE_ACCESS_ROLE, SERVICE_ADMIN_ROLE};

/// Returns the caller's workspace, creating it on first access.
pub fn get_workspace<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Workspace>
where
    R: WorkspaceReader + WorkspaceWriter + ?Sized,
{
    if !is_portal_user(user) {
        ensure_role(user, SERVICE_ACCESS_ROLE)?;
    }

    let workspace_id = workspace_of(user)?;
    if let Some(workspace) = repo.get_workspace(workspace_id)? {
        return Ok(workspace);
    }

    let default_name = WorkspaceName::new(DEFAULT_WORKSPACE_NAME)?;
    repo.ensure_workspace(workspace_id, &default_name)
        .map_err(|err| {
            log::error!("Failed to create workspace {workspace_id}: {err}");
            ServiceError::from(err)
        })
}

pub fn rename_workspace<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    form: RenameWorkspaceForm,
) -> ServiceResult<Workspace>
where
    R: WorkspaceReader + WorkspaceWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let name = WorkspaceName::try_from(form)?;
    let workspace_id = workspace_of(user)?;

    repo.ensure_workspace(workspace_id, &name)?;
    let workspace = repo.rename_workspace(workspace_id, &name).map_err(|err| {
        log::error!("Failed to rename workspace {workspace_id}: {err}");
        err
    })?;

    hub.publish(ChangeEvent::new(
        workspace_id,
        "workspaces",
        ChangeAction::Update,
        workspace_id.get(),
        &workspace,
    ));
    Ok(workspace)
}
