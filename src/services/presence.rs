//! Who is online and who is typing.

use chrono::Utc;

use crate::domain::types::{ChannelId, TeamMemberId, WorkspaceId};
use crate::dto::messaging::MemberList;
use crate::models::auth::AuthenticatedUser;
use crate::realtime::{ChangeAction, ChangeEvent, EventHub, PresenceTracker};
use crate::repository::{MessagingReader, TeamWriter};
use crate::services::{ServiceError, ServiceResult, sync_current_member};

/// Records that the caller is active and returns who else is online.
pub fn heartbeat<R>(
    repo: &R,
    presence: &PresenceTracker,
    user: &AuthenticatedUser,
) -> ServiceResult<MemberList>
where
    R: TeamWriter + ?Sized,
{
    let member = sync_current_member(repo, user)?;
    let now = Utc::now().naive_utc();

    presence.heartbeat(member.workspace_id, member.id, now);
    Ok(MemberList {
        members: presence.online_members(member.workspace_id, now),
    })
}

pub fn online_members<R>(
    repo: &R,
    presence: &PresenceTracker,
    user: &AuthenticatedUser,
) -> ServiceResult<MemberList>
where
    R: TeamWriter + ?Sized,
{
    let member = sync_current_member(repo, user)?;
    Ok(MemberList {
        members: presence.online_members(member.workspace_id, Utc::now().naive_utc()),
    })
}

fn channel_membership<R>(
    repo: &R,
    user: &AuthenticatedUser,
    channel_id: i32,
) -> ServiceResult<(ChannelId, TeamMemberId, WorkspaceId)>
where
    R: TeamWriter + MessagingReader + ?Sized,
{
    let member = sync_current_member(repo, user)?;
    let channel = repo
        .get_channel_by_id(ChannelId::new(channel_id)?, member.workspace_id)?
        .ok_or(ServiceError::NotFound)?;
    if repo.get_channel_member(channel.id, member.id)?.is_none() {
        return Err(ServiceError::Unauthorized);
    }
    Ok((channel.id, member.id, member.workspace_id))
}

/// Shows the caller as typing in the channel for a few seconds.
pub fn typing<R>(
    repo: &R,
    hub: &EventHub,
    presence: &PresenceTracker,
    user: &AuthenticatedUser,
    channel_id: i32,
) -> ServiceResult<()>
where
    R: TeamWriter + MessagingReader + ?Sized,
{
    let (channel_id, member_id, workspace_id) = channel_membership(repo, user, channel_id)?;

    presence.start_typing(channel_id, member_id, Utc::now().naive_utc());
    hub.publish(ChangeEvent::new(
        workspace_id,
        "typing",
        ChangeAction::Typing,
        channel_id.get(),
        &serde_json::json!({ "channel_id": channel_id, "member_id": member_id }),
    ));
    Ok(())
}

pub fn typing_members<R>(
    repo: &R,
    presence: &PresenceTracker,
    user: &AuthenticatedUser,
    channel_id: i32,
) -> ServiceResult<MemberList>
where
    R: TeamWriter + MessagingReader + ?Sized,
{
    let (channel_id, _, _) = channel_membership(repo, user, channel_id)?;
    Ok(MemberList {
        members: presence.typing_members(channel_id, Utc::now().naive_utc()),
    })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::messaging::{Channel, ChannelKind, ChannelMember};
    use crate::domain::types::ChannelName;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::*;

    #[test]
    fn heartbeat_reports_caller_online() {
        let user = manager_user();
        let mut repo = MockRepository::new();
        let member = member_for(&user, 5);
        repo.expect_sync_member()
            .returning(move |_| Ok(member.clone()));
        let presence = PresenceTracker::new();

        let online = heartbeat(&repo, &presence, &user).unwrap();

        let ids: Vec<i32> = online.members.iter().map(|id| id.get()).collect();
        assert_eq!(ids, vec![5]);
    }

    #[test]
    fn typing_is_announced_and_listed() {
        let user = manager_user();
        let mut repo = MockRepository::new();
        let member = member_for(&user, 5);
        repo.expect_sync_member()
            .returning(move |_| Ok(member.clone()));
        repo.expect_get_channel_by_id().returning(|id, workspace_id| {
            Ok(Some(Channel {
                id,
                workspace_id,
                name: ChannelName::new("general").unwrap(),
                kind: ChannelKind::Public,
                created_by: TeamMemberId::new(1).unwrap(),
                created_at: timestamp(),
            }))
        });
        repo.expect_get_channel_member().returning(|channel_id, member_id| {
            Ok(Some(ChannelMember {
                channel_id,
                member_id,
                joined_at: timestamp(),
                last_read_message_id: None,
            }))
        });
        let hub = EventHub::new(4);
        let mut rx = hub.subscribe();
        let presence = PresenceTracker::new();

        typing(&repo, &hub, &presence, &user, 3).unwrap();
        let typing = typing_members(&repo, &presence, &user, 3).unwrap();

        let event = rx.try_recv().unwrap();
        assert_eq!(event.action, ChangeAction::Typing);
        assert_eq!(event.workspace_id, WorkspaceId::new(42).unwrap().get());
        assert_eq!(typing.members, vec![TeamMemberId::new(5).unwrap()]);
    }
}
