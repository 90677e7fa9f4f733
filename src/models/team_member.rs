//! Diesel models for team members and invitations.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::invitation::{Invitation as DomainInvitation, NewInvitation as DomainNewInvitation};
use crate::domain::team_member::{
    NewTeamMember as DomainNewTeamMember, TeamMember as DomainTeamMember, TeamRole,
    UpdateTeamMember as DomainUpdateTeamMember,
};
use crate::domain::types::{
    EmailAddress, InvitationId, MemberName, TeamMemberId, TypeConstraintError, WorkspaceId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::team_members)]
pub struct TeamMember {
    pub id: i32,
    pub workspace_id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
    pub capacity: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::team_members)]
pub struct NewTeamMember<'a> {
    pub workspace_id: i32,
    pub name: &'a str,
    pub email: &'a str,
    pub role: &'a str,
    pub capacity: i32,
    pub is_active: bool,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::team_members)]
pub struct UpdateTeamMember<'a> {
    pub role: &'a str,
    pub capacity: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::invitations)]
pub struct Invitation {
    pub id: i32,
    pub workspace_id: i32,
    pub email: String,
    pub role: String,
    pub token: String,
    pub expires_at: NaiveDateTime,
    pub accepted_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::invitations)]
pub struct NewInvitation<'a> {
    pub workspace_id: i32,
    pub email: &'a str,
    pub role: &'a str,
    pub token: &'a str,
    pub expires_at: NaiveDateTime,
}

impl TryFrom<TeamMember> for DomainTeamMember {
    type Error = TypeConstraintError;

    fn try_from(member: TeamMember) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TeamMemberId::new(member.id)?,
            workspace_id: WorkspaceId::new(member.workspace_id)?,
            name: MemberName::new(member.name)?,
            email: EmailAddress::new(member.email)?,
            role: TeamRole::try_from(member.role.as_str())?,
            capacity: member.capacity,
            is_active: member.is_active,
            created_at: member.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewTeamMember> for NewTeamMember<'a> {
    fn from(member: &'a DomainNewTeamMember) -> Self {
        Self {
            workspace_id: member.workspace_id.get(),
            name: member.name.as_str(),
            email: member.email.as_str(),
            role: member.role.as_str(),
            capacity: member.capacity,
            is_active: true,
        }
    }
}

impl<'a> From<&'a DomainUpdateTeamMember> for UpdateTeamMember<'a> {
    fn from(update: &'a DomainUpdateTeamMember) -> Self {
        Self {
            role: update.role.as_str(),
            capacity: update.capacity,
            is_active: update.is_active,
        }
    }
}

impl TryFrom<Invitation> for DomainInvitation {
    type Error = TypeConstraintError;

    fn try_from(invitation: Invitation) -> Result<Self, Self::Error> {
        Ok(Self {
            id: InvitationId::new(invitation.id)?,
            workspace_id: WorkspaceId::new(invitation.workspace_id)?,
            email: EmailAddress::new(invitation.email)?,
            role: TeamRole::try_from(invitation.role.as_str())?,
            token: invitation.token,
            expires_at: invitation.expires_at,
            accepted_at: invitation.accepted_at,
            created_at: invitation.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewInvitation> for NewInvitation<'a> {
    fn from(invitation: &'a DomainNewInvitation) -> Self {
        Self {
            workspace_id: invitation.workspace_id.get(),
            email: invitation.email.as_str(),
            role: invitation.role.as_str(),
            token: invitation.token.as_str(),
            expires_at: invitation.expires_at,
        }
    }
}
