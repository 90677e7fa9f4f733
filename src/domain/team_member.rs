use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::types::{EmailAddress, MemberName, TeamMemberId, WorkspaceId};

/// Number of concurrently open deliverables a member carries by default.
pub const DEFAULT_CAPACITY: i32 = 10;

text_enum!(
    /// Role of a person inside the agency.
    TeamRole {
        Admin => "admin",
        Manager => "manager",
        Member => "member",
    }
);

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TeamMember {
    pub id: TeamMemberId,
    pub workspace_id: WorkspaceId,
    pub name: MemberName,
    pub email: EmailAddress,
    pub role: TeamRole,
    pub capacity: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewTeamMember {
    pub workspace_id: WorkspaceId,
    pub name: MemberName,
    pub email: EmailAddress,
    pub role: TeamRole,
    pub capacity: i32,
}

impl NewTeamMember {
    #[must_use]
    pub fn new(
        workspace_id: WorkspaceId,
        name: MemberName,
        email: EmailAddress,
        role: TeamRole,
    ) -> Self {
        Self {
            workspace_id,
            name,
            email,
            role,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Administrative changes to a member record.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateTeamMember {
    pub role: TeamRole,
    pub capacity: i32,
    pub is_active: bool,
}
