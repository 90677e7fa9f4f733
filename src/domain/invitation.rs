use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::team_member::TeamRole;
use crate::domain::types::{EmailAddress, InvitationId, WorkspaceId};

/// Length of the random token handed to the invitee.
pub const TOKEN_LENGTH: usize = 32;

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvitationState {
    Pending,
    Accepted,
    Expired,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Invitation {
    pub id: InvitationId,
    pub workspace_id: WorkspaceId,
    pub email: EmailAddress,
    pub role: TeamRole,
    #[serde(skip_serializing)]
    pub token: String,
    pub expires_at: NaiveDateTime,
    pub accepted_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl Invitation {
    pub fn state(&self, now: NaiveDateTime) -> InvitationState {
        if self.accepted_at.is_some() {
            InvitationState::Accepted
        } else if self.expires_at <= now {
            InvitationState::Expired
        } else {
            InvitationState::Pending
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewInvitation {
    pub workspace_id: WorkspaceId,
    pub email: EmailAddress,
    pub role: TeamRole,
    pub token: String,
    pub expires_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    #[test]
    fn state_follows_acceptance_then_expiry() {
        let now = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let mut invitation = Invitation {
            id: InvitationId::new(1).unwrap(),
            workspace_id: WorkspaceId::new(1).unwrap(),
            email: EmailAddress::new("new@agency.io").unwrap(),
            role: TeamRole::Member,
            token: "t".repeat(TOKEN_LENGTH),
            expires_at: now + Duration::hours(1),
            accepted_at: None,
            created_at: now,
        };
        assert_eq!(invitation.state(now), InvitationState::Pending);
        assert_eq!(
            invitation.state(now + Duration::hours(2)),
            InvitationState::Expired
        );
        invitation.accepted_at = Some(now);
        assert_eq!(
            invitation.state(now + Duration::hours(2)),
            InvitationState::Accepted
        );
    }
}
