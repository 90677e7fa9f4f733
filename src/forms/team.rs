use serde::Deserialize;
use validator::Validate;

use crate::domain::team_member::{NewTeamMember, TeamRole, UpdateTeamMember};
use crate::domain::types::{
    EmailAddress, MemberName, TeamMemberId, TypeConstraintError, WorkspaceId,
};
use crate::forms::FormError;

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMemberForm {
    pub role: TeamRole,
    #[validate(range(min = 0, max = 1000))]
    pub capacity: i32,
    pub is_active: bool,
}

impl TryFrom<UpdateMemberForm> for UpdateTeamMember {
    type Error = FormError;

    fn try_from(form: UpdateMemberForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            role: form.role,
            capacity: form.capacity,
            is_active: form.is_active,
        })
    }
}

/// Direct creation of an active member by an administrator.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMemberForm {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default = "default_role")]
    pub role: TeamRole,
}

pub struct CreateMemberPayload {
    pub name: MemberName,
    pub email: EmailAddress,
    pub role: TeamRole,
}

impl TryFrom<CreateMemberForm> for CreateMemberPayload {
    type Error = FormError;

    fn try_from(form: CreateMemberForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            name: MemberName::new(form.name).map_err(|_| FormError::InvalidName)?,
            email: EmailAddress::new(form.email).map_err(|_| FormError::InvalidEmail)?,
            role: form.role,
        })
    }
}

impl CreateMemberPayload {
    pub fn into_domain(self, workspace_id: WorkspaceId) -> NewTeamMember {
        NewTeamMember::new(workspace_id, self.name, self.email, self.role)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct InviteMemberForm {
    #[validate(email)]
    pub email: String,
    #[serde(default = "default_role")]
    pub role: TeamRole,
}

pub struct InviteMemberPayload {
    pub email: EmailAddress,
    pub role: TeamRole,
}

impl TryFrom<InviteMemberForm> for InviteMemberPayload {
    type Error = FormError;

    fn try_from(form: InviteMemberForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            email: EmailAddress::new(form.email).map_err(|_| FormError::InvalidEmail)?,
            role: form.role,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AcceptInvitationForm {
    #[validate(length(min = 1))]
    pub token: String,
}

/// Offboarding: everything owned by `from` moves to `to`.
#[derive(Debug, Deserialize)]
pub struct MigrateMemberForm {
    pub from: i32,
    pub to: i32,
}

pub struct MigrateMemberPayload {
    pub from: TeamMemberId,
    pub to: TeamMemberId,
}

impl TryFrom<MigrateMemberForm> for MigrateMemberPayload {
    type Error = FormError;

    fn try_from(form: MigrateMemberForm) -> Result<Self, Self::Error> {
        let from = TeamMemberId::new(form.from).map_err(|_| FormError::InvalidId)?;
        let to = TeamMemberId::new(form.to).map_err(|_| FormError::InvalidId)?;
        if from == to {
            return Err(FormError::Constraint(TypeConstraintError::InvalidValue(
                "cannot migrate a member onto themselves".to_string(),
            )));
        }
        Ok(Self { from, to })
    }
}

fn default_role() -> TeamRole {
    TeamRole::Member
}
