//! Member onboarding through invitations, and offboarding migration.

use chrono::{Duration, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;

use crate::domain::invitation::{Invitation, InvitationState, NewInvitation, TOKEN_LENGTH};
use crate::domain::team_member::{NewTeamMember, TeamMember};
use crate::domain::types::{EmailAddress, InvitationId, MemberName};
use crate::dto::users::IssuedInvitation;
use crate::forms::team::{
    AcceptInvitationForm, CreateMemberForm, CreateMemberPayload, InviteMemberForm,
    InviteMemberPayload, MigrateMemberForm, MigrateMemberPayload,
};
use crate::models::auth::AuthenticatedUser;
use crate::realtime::{ChangeAction, ChangeEvent, EventHub};
use crate::repository::{
    InvitationReader, InvitationWriter, MigrationReport, TeamReader, TeamWriter,
};
use crate::services::{ServiceError, ServiceResult, ensure_role, workspace_of};
use crate::SERVICE_ADMIN_ROLE;

fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

fn publish_member(hub: &EventHub, member: &TeamMember, action: ChangeAction) {
    hub.publish(ChangeEvent::new(
        member.workspace_id,
        "team_members",
        action,
        member.id.get(),
        member,
    ));
}

/// Adds an active member without going through an invitation.
pub fn create_member<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    form: CreateMemberForm,
) -> ServiceResult<TeamMember>
where
    R: TeamReader + TeamWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let workspace_id = workspace_of(user)?;
    let payload = CreateMemberPayload::try_from(form)?;

    if let Some(existing) = repo.get_member_by_email(&payload.email, workspace_id)?
        && existing.is_active
    {
        return Err(ServiceError::Conflict(format!(
            "{} is already a team member",
            existing.email
        )));
    }

    let member = repo
        .activate_member(&payload.into_domain(workspace_id))
        .map_err(|err| {
            log::error!("Failed to create team member: {err}");
            err
        })?;

    publish_member(hub, &member, ChangeAction::Insert);
    Ok(member)
}

/// Issues an invitation token valid for `ttl_hours`.
pub fn invite_member<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: InviteMemberForm,
    ttl_hours: i64,
) -> ServiceResult<IssuedInvitation>
where
    R: TeamReader + InvitationWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let workspace_id = workspace_of(user)?;
    let payload = InviteMemberPayload::try_from(form)?;

    if let Some(existing) = repo.get_member_by_email(&payload.email, workspace_id)?
        && existing.is_active
    {
        return Err(ServiceError::Conflict(format!(
            "{} is already a team member",
            existing.email
        )));
    }

    let token = generate_token();
    let new_invitation = NewInvitation {
        workspace_id,
        email: payload.email,
        role: payload.role,
        token: token.clone(),
        expires_at: Utc::now().naive_utc() + Duration::hours(ttl_hours.max(1)),
    };

    let invitation = repo.create_invitation(&new_invitation).map_err(|err| {
        log::error!("Failed to store invitation: {err}");
        err
    })?;
    log::info!(
        "Invited {} to workspace {workspace_id} as {}",
        invitation.email,
        invitation.role
    );

    Ok(IssuedInvitation { invitation, token })
}

/// Redeems an invitation for the signed-in caller.
pub fn accept_invitation<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    form: AcceptInvitationForm,
) -> ServiceResult<TeamMember>
where
    R: InvitationReader + InvitationWriter + ?Sized,
{
    let token = form.token.trim();
    if token.is_empty() {
        return Err(ServiceError::Form("token is required".to_string()));
    }

    let invitation = repo
        .get_invitation_by_token(token)?
        .ok_or(ServiceError::NotFound)?;

    let email = EmailAddress::new(&user.email)?;
    if email != invitation.email {
        log::warn!(
            "{} tried to accept an invitation addressed to {}",
            email,
            invitation.email
        );
        return Err(ServiceError::Unauthorized);
    }

    let now = Utc::now().naive_utc();
    match invitation.state(now) {
        InvitationState::Pending => {}
        InvitationState::Accepted => {
            return Err(ServiceError::Conflict(
                "invitation was already accepted".to_string(),
            ));
        }
        InvitationState::Expired => {
            return Err(ServiceError::Conflict("invitation has expired".to_string()));
        }
    }

    let name = MemberName::new(&user.name).or_else(|_| MemberName::new(email.as_str()))?;
    let member = NewTeamMember::new(invitation.workspace_id, name, email, invitation.role);

    let member = repo
        .accept_invitation(invitation.id, &member, now)
        .map_err(|err| {
            log::error!("Failed to accept invitation {}: {err}", invitation.id);
            err
        })?;

    publish_member(hub, &member, ChangeAction::Insert);
    Ok(member)
}

pub fn revoke_invitation<R>(
    repo: &R,
    user: &AuthenticatedUser,
    invitation_id: i32,
) -> ServiceResult<()>
where
    R: InvitationWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let workspace_id = workspace_of(user)?;
    let invitation_id = InvitationId::new(invitation_id)?;

    repo.delete_invitation(invitation_id, workspace_id)
        .map_err(|err| {
            log::error!("Failed to revoke invitation {invitation_id}: {err}");
            err.into()
        })
}

/// Pending, unexpired invitations of the caller's workspace.
pub fn list_invitations<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<Invitation>>
where
    R: InvitationReader + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let workspace_id = workspace_of(user)?;
    Ok(repo.list_pending_invitations(workspace_id, Utc::now().naive_utc())?)
}

/// Hands everything a departing member owns over to a colleague.
pub fn migrate_member<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    form: MigrateMemberForm,
) -> ServiceResult<MigrationReport>
where
    R: TeamReader + TeamWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let workspace_id = workspace_of(user)?;
    let payload = MigrateMemberPayload::try_from(form)?;

    repo.get_member_by_id(payload.from, workspace_id)?
        .ok_or(ServiceError::NotFound)?;
    let target = repo
        .get_member_by_id(payload.to, workspace_id)?
        .ok_or(ServiceError::NotFound)?;
    if !target.is_active {
        return Err(ServiceError::Conflict(
            "cannot migrate onto an inactive member".to_string(),
        ));
    }

    let report = repo
        .migrate_member(workspace_id, payload.from, payload.to)
        .map_err(|err| {
            log::error!(
                "Failed to migrate member {} to {}: {err}",
                payload.from,
                payload.to
            );
            err
        })?;
    log::info!(
        "Migrated {} deliverables and {} clients from member {} to {}",
        report.deliverables,
        report.clients,
        payload.from,
        payload.to
    );

    hub.publish(ChangeEvent::new(
        workspace_id,
        "team_members",
        ChangeAction::Update,
        payload.from.get(),
        &report,
    ));
    Ok(report)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::team_member::TeamRole;
    use crate::domain::types::WorkspaceId;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::*;

    fn invitation(email: &str, expires_in_hours: i64) -> Invitation {
        let now = Utc::now().naive_utc();
        Invitation {
            id: InvitationId::new(3).unwrap(),
            workspace_id: WorkspaceId::new(42).unwrap(),
            email: EmailAddress::new(email).unwrap(),
            role: TeamRole::Manager,
            token: "a".repeat(TOKEN_LENGTH),
            expires_at: now + Duration::hours(expires_in_hours),
            accepted_at: None,
            created_at: now,
        }
    }

    #[test]
    fn tokens_are_alphanumeric_and_fixed_length() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, generate_token());
    }

    #[test]
    fn invite_returns_token_once() {
        let mut repo = MockRepository::new();
        repo.expect_get_member_by_email().returning(|_, _| Ok(None));
        repo.expect_create_invitation()
            .withf(|new| new.token.len() == TOKEN_LENGTH && new.role == TeamRole::Manager)
            .times(1)
            .returning(|new| {
                let mut stored = invitation(new.email.as_str(), 168);
                stored.token = new.token.clone();
                Ok(stored)
            });

        let issued = invite_member(
            &repo,
            &admin_user(),
            InviteMemberForm {
                email: "New@Agency.io".to_string(),
                role: TeamRole::Manager,
            },
            168,
        )
        .unwrap();

        assert_eq!(issued.invitation.email.as_str(), "new@agency.io");
        assert_eq!(issued.token, issued.invitation.token);
    }

    #[test]
    fn invite_requires_admin() {
        let mut repo = MockRepository::new();
        repo.expect_create_invitation().times(0);

        let result = invite_member(
            &repo,
            &manager_user(),
            InviteMemberForm {
                email: "new@agency.io".to_string(),
                role: TeamRole::Member,
            },
            168,
        );

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn accept_rejects_other_email() {
        let mut repo = MockRepository::new();
        repo.expect_get_invitation_by_token()
            .returning(|_| Ok(Some(invitation("someone@agency.io", 1))));
        repo.expect_accept_invitation().times(0);

        let result = accept_invitation(
            &repo,
            &EventHub::new(4),
            &manager_user(),
            AcceptInvitationForm {
                token: "a".repeat(TOKEN_LENGTH),
            },
        );

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn accept_rejects_expired_invitation() {
        let mut repo = MockRepository::new();
        repo.expect_get_invitation_by_token()
            .returning(|_| Ok(Some(invitation("manager@agency.io", -1))));
        repo.expect_accept_invitation().times(0);

        let result = accept_invitation(
            &repo,
            &EventHub::new(4),
            &manager_user(),
            AcceptInvitationForm {
                token: "a".repeat(TOKEN_LENGTH),
            },
        );

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn accept_activates_member_with_invited_role() {
        let mut repo = MockRepository::new();
        let user = manager_user();
        let member = member_for(&user, 12);
        repo.expect_get_invitation_by_token()
            .returning(|_| Ok(Some(invitation("manager@agency.io", 24))));
        repo.expect_accept_invitation()
            .withf(|id, new, _| id.get() == 3 && new.role == TeamRole::Manager)
            .times(1)
            .returning(move |_, _, _| Ok(member.clone()));

        let result = accept_invitation(
            &repo,
            &EventHub::new(4),
            &user,
            AcceptInvitationForm {
                token: "a".repeat(TOKEN_LENGTH),
            },
        )
        .unwrap();

        assert_eq!(result.id.get(), 12);
    }

    #[test]
    fn migrate_refuses_inactive_target() {
        let mut repo = MockRepository::new();
        repo.expect_get_member_by_id().returning(|id, _| {
            let mut member = member_for(&manager_user(), id.get());
            member.is_active = id.get() != 8;
            Ok(Some(member))
        });
        repo.expect_migrate_member().times(0);

        let result = migrate_member(
            &repo,
            &EventHub::new(4),
            &admin_user(),
            MigrateMemberForm { from: 5, to: 8 },
        );

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn migrate_reports_moved_work() {
        let mut repo = MockRepository::new();
        repo.expect_get_member_by_id()
            .returning(|id, _| Ok(Some(member_for(&manager_user(), id.get()))));
        repo.expect_migrate_member()
            .times(1)
            .returning(|_, _, _| {
                Ok(MigrationReport {
                    deliverables: 4,
                    clients: 2,
                })
            });

        let report = migrate_member(
            &repo,
            &EventHub::new(4),
            &admin_user(),
            MigrateMemberForm { from: 5, to: 8 },
        )
        .unwrap();

        assert_eq!(report.deliverables, 4);
        assert_eq!(report.clients, 2);
    }
}
