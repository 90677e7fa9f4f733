use chrono::Utc;

use crate::domain::dashboard::{MemberWorkload, compute_workload};
use crate::domain::team_member::{TeamMember, UpdateTeamMember};
use crate::domain::types::TeamMemberId;
use crate::forms::team::UpdateMemberForm;
use crate::models::auth::AuthenticatedUser;
use crate::realtime::{ChangeAction, ChangeEvent, EventHub};
use crate::repository::{DeliverableListQuery, DeliverableReader, TeamReader, TeamWriter};
use crate::services::{ServiceResult, ensure_role, sync_current_member, workspace_of};
use crate::SERVICE_ADMIN_ROLE;

pub fn list_members<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<TeamMember>>
where
    R: TeamReader + TeamWriter + ?Sized,
{
    let member = sync_current_member(repo, user)?;

    repo.list_members(member.workspace_id).map_err(|err| {
        log::error!("Failed to list team members: {err}");
        err.into()
    })
}

/// Changes a member's role, capacity or active flag.
pub fn update_member<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    member_id: i32,
    form: UpdateMemberForm,
) -> ServiceResult<TeamMember>
where
    R: TeamWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let workspace_id = workspace_of(user)?;
    let member_id = TeamMemberId::new(member_id)?;
    let updates = UpdateTeamMember::try_from(form)?;

    let member = repo
        .update_member(member_id, workspace_id, &updates)
        .map_err(|err| {
            log::error!("Failed to update team member {member_id}: {err}");
            err
        })?;

    hub.publish(ChangeEvent::new(
        workspace_id,
        "team_members",
        ChangeAction::Update,
        member.id.get(),
        &member,
    ));
    Ok(member)
}

/// Open, overdue and due-soon counts of every active member.
pub fn team_workload<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<MemberWorkload>>
where
    R: TeamReader + TeamWriter + DeliverableReader + ?Sized,
{
    let member = sync_current_member(repo, user)?;

    let members = repo.list_members(member.workspace_id)?;
    let deliverables = repo
        .list_deliverables(DeliverableListQuery::new(member.workspace_id))
        .map_err(|err| {
            log::error!("Failed to load deliverables for workload: {err}");
            err
        })?;

    Ok(compute_workload(
        &members,
        &deliverables,
        Utc::now().date_naive(),
    ))
}
