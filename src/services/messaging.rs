//! Team chat: channels, messages, read receipts and drafts.

use chrono::Utc;

use crate::domain::messaging::{
    Channel, ChannelKind, ChannelSummary, Message, MessageDraft, NewMessage,
};
use crate::domain::team_member::TeamMember;
use crate::domain::types::{ChannelId, MessageBody, MessageId};
use crate::dto::messaging::{MessagePage, ReadReceipts};
use crate::forms::messaging::{ChannelForm, DraftForm, MarkReadForm, MessageForm, MessagesQuery};
use crate::models::auth::AuthenticatedUser;
use crate::realtime::{ChangeAction, ChangeEvent, EventHub, PresenceTracker};
use crate::repository::{MessageListQuery, MessagingReader, MessagingWriter, TeamReader, TeamWriter};
use crate::services::{ServiceError, ServiceResult, is_admin, sync_current_member};

/// Longest draft kept per channel and member.
const MAX_DRAFT_CHARS: usize = MessageBody::MAX_CHARS;

fn find_channel<R>(repo: &R, member: &TeamMember, channel_id: i32) -> ServiceResult<Channel>
where
    R: MessagingReader + ?Sized,
{
    repo.get_channel_by_id(ChannelId::new(channel_id)?, member.workspace_id)?
        .ok_or(ServiceError::NotFound)
}

/// Loads a channel the member belongs to.
fn joined_channel<R>(repo: &R, member: &TeamMember, channel_id: i32) -> ServiceResult<Channel>
where
    R: MessagingReader + ?Sized,
{
    let channel = find_channel(repo, member, channel_id)?;
    if repo.get_channel_member(channel.id, member.id)?.is_none() {
        return Err(ServiceError::Unauthorized);
    }
    Ok(channel)
}

fn load_message<R>(repo: &R, channel: &Channel, message_id: i32) -> ServiceResult<Message>
where
    R: MessagingReader + ?Sized,
{
    repo.get_message_by_id(MessageId::new(message_id)?, channel.id)?
        .ok_or(ServiceError::NotFound)
}

fn publish_message(hub: &EventHub, channel: &Channel, message: &Message, action: ChangeAction) {
    hub.publish(ChangeEvent::new(
        channel.workspace_id,
        "messages",
        action,
        message.id.get(),
        message,
    ));
}

/// Creates a channel; asking for an existing direct pair returns that channel.
pub fn create_channel<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    form: ChannelForm,
) -> ServiceResult<Channel>
where
    R: TeamReader + TeamWriter + MessagingReader + MessagingWriter + ?Sized,
{
    let member = sync_current_member(repo, user)?;
    let new_channel = form.into_domain(member.workspace_id, member.id)?;

    for member_id in &new_channel.members {
        match repo.get_member_by_id(*member_id, member.workspace_id)? {
            Some(found) if found.is_active => {}
            _ => {
                return Err(ServiceError::Form(format!(
                    "team member {member_id} cannot join channels"
                )));
            }
        }
    }

    if new_channel.kind == ChannelKind::Direct
        && let Some(existing) =
            repo.find_direct_channel(member.workspace_id, new_channel.name.as_str())?
    {
        return Ok(existing);
    }

    let channel = repo.create_channel(&new_channel).map_err(|err| {
        log::error!("Failed to create channel {}: {err}", new_channel.name);
        err
    })?;

    hub.publish(ChangeEvent::new(
        channel.workspace_id,
        "channels",
        ChangeAction::Insert,
        channel.id.get(),
        &channel,
    ));
    Ok(channel)
}

/// Joins a public channel.
pub fn join_channel<R>(repo: &R, user: &AuthenticatedUser, channel_id: i32) -> ServiceResult<Channel>
where
    R: TeamWriter + MessagingReader + MessagingWriter + ?Sized,
{
    let member = sync_current_member(repo, user)?;
    let channel = find_channel(repo, &member, channel_id)?;
    if channel.kind != ChannelKind::Public {
        return Err(ServiceError::Unauthorized);
    }

    repo.add_channel_member(channel.id, member.id)
        .map_err(|err| {
            log::error!("Failed to join channel {}: {err}", channel.id);
            err
        })?;
    Ok(channel)
}

pub fn leave_channel<R>(repo: &R, user: &AuthenticatedUser, channel_id: i32) -> ServiceResult<()>
where
    R: TeamWriter + MessagingReader + MessagingWriter + ?Sized,
{
    let member = sync_current_member(repo, user)?;
    let channel = joined_channel(repo, &member, channel_id)?;

    repo.remove_channel_member(channel.id, member.id)
        .map_err(|err| {
            log::error!("Failed to leave channel {}: {err}", channel.id);
            err.into()
        })
}

/// The caller's channels with unread counts.
pub fn list_channels<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<ChannelSummary>>
where
    R: TeamWriter + MessagingReader + ?Sized,
{
    let member = sync_current_member(repo, user)?;

    repo.list_member_channels(member.workspace_id, member.id)
        .map_err(|err| {
            log::error!("Failed to list channels: {err}");
            err.into()
        })
}

/// Posts a message, clearing the author's draft and typing indicator.
pub fn post_message<R>(
    repo: &R,
    hub: &EventHub,
    presence: &PresenceTracker,
    user: &AuthenticatedUser,
    channel_id: i32,
    form: MessageForm,
) -> ServiceResult<Message>
where
    R: TeamWriter + MessagingReader + MessagingWriter + ?Sized,
{
    let member = sync_current_member(repo, user)?;
    let channel = joined_channel(repo, &member, channel_id)?;
    let body = MessageBody::try_from(form)?;

    let message = repo
        .create_message(
            &NewMessage {
                channel_id: channel.id,
                author_id: member.id,
                body,
            },
            Utc::now().naive_utc(),
        )
        .map_err(|err| {
            log::error!("Failed to post message in channel {}: {err}", channel.id);
            err
        })?;

    presence.stop_typing(channel.id, member.id);
    publish_message(hub, &channel, &message, ChangeAction::Insert);
    Ok(message)
}

/// Rewrites the body of one of the caller's own messages.
pub fn edit_message<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    channel_id: i32,
    message_id: i32,
    form: MessageForm,
) -> ServiceResult<Message>
where
    R: TeamWriter + MessagingReader + MessagingWriter + ?Sized,
{
    let member = sync_current_member(repo, user)?;
    let channel = joined_channel(repo, &member, channel_id)?;
    let current = load_message(repo, &channel, message_id)?;

    if current.author_id != member.id {
        return Err(ServiceError::Unauthorized);
    }
    if current.is_deleted() {
        return Err(ServiceError::NotFound);
    }
    let body = MessageBody::try_from(form)?;

    let message = repo
        .edit_message(current.id, &body, Utc::now().naive_utc())
        .map_err(|err| {
            log::error!("Failed to edit message {}: {err}", current.id);
            err
        })?;

    publish_message(hub, &channel, &message, ChangeAction::Update);
    Ok(message)
}

/// Soft-deletes a message; allowed for its author and for admins.
pub fn delete_message<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    channel_id: i32,
    message_id: i32,
) -> ServiceResult<Message>
where
    R: TeamWriter + MessagingReader + MessagingWriter + ?Sized,
{
    let member = sync_current_member(repo, user)?;
    let channel = find_channel(repo, &member, channel_id)?;
    let current = load_message(repo, &channel, message_id)?;

    if current.author_id != member.id && !is_admin(user) {
        return Err(ServiceError::Unauthorized);
    }
    if current.is_deleted() {
        return Err(ServiceError::NotFound);
    }

    let message = repo
        .delete_message(current.id, Utc::now().naive_utc())
        .map_err(|err| {
            log::error!("Failed to delete message {}: {err}", current.id);
            err
        })?;

    publish_message(hub, &channel, &message, ChangeAction::Delete);
    Ok(message)
}

/// One page of messages, newest first.
pub fn list_messages<R>(
    repo: &R,
    user: &AuthenticatedUser,
    channel_id: i32,
    query: MessagesQuery,
) -> ServiceResult<MessagePage>
where
    R: TeamWriter + MessagingReader + ?Sized,
{
    let member = sync_current_member(repo, user)?;
    let channel = joined_channel(repo, &member, channel_id)?;

    let limit = query.limit();
    let mut list_query = MessageListQuery::new(channel.id, limit);
    if let Some(before) = query.before {
        list_query = list_query.before(MessageId::new(before)?);
    }

    let messages = repo.list_messages(list_query).map_err(|err| {
        log::error!("Failed to list messages of channel {}: {err}", channel.id);
        err
    })?;
    let next_before = if messages.len() == limit {
        messages.last().map(|message| message.id)
    } else {
        None
    };

    Ok(MessagePage {
        messages,
        next_before,
    })
}

/// Moves the caller's read cursor forward and announces the receipt.
pub fn mark_read<R>(
    repo: &R,
    hub: &EventHub,
    user: &AuthenticatedUser,
    channel_id: i32,
    form: MarkReadForm,
) -> ServiceResult<bool>
where
    R: TeamWriter + MessagingReader + MessagingWriter + ?Sized,
{
    let member = sync_current_member(repo, user)?;
    let channel = joined_channel(repo, &member, channel_id)?;
    let message_id = MessageId::try_from(form)?;
    load_message(repo, &channel, message_id.get())?;

    let advanced = repo.advance_read_cursor(channel.id, member.id, message_id)?;
    if advanced {
        hub.publish(ChangeEvent::new(
            channel.workspace_id,
            "channel_members",
            ChangeAction::Read,
            channel.id.get(),
            &serde_json::json!({
                "channel_id": channel.id,
                "member_id": member.id,
                "message_id": message_id,
            }),
        ));
    }
    Ok(advanced)
}

/// Members whose read cursor is at or past the message.
pub fn read_receipts<R>(
    repo: &R,
    user: &AuthenticatedUser,
    channel_id: i32,
    message_id: i32,
) -> ServiceResult<ReadReceipts>
where
    R: TeamWriter + MessagingReader + ?Sized,
{
    let member = sync_current_member(repo, user)?;
    let channel = joined_channel(repo, &member, channel_id)?;
    let message = load_message(repo, &channel, message_id)?;

    let read_by = repo
        .list_channel_members(channel.id)?
        .into_iter()
        .filter(|entry| entry.member_id != message.author_id && entry.has_read(message.id))
        .map(|entry| entry.member_id)
        .collect();

    Ok(ReadReceipts {
        message_id: message.id,
        read_by,
    })
}

pub fn save_draft<R>(
    repo: &R,
    user: &AuthenticatedUser,
    channel_id: i32,
    form: DraftForm,
) -> ServiceResult<Option<MessageDraft>>
where
    R: TeamWriter + MessagingReader + MessagingWriter + ?Sized,
{
    let member = sync_current_member(repo, user)?;
    let channel = joined_channel(repo, &member, channel_id)?;

    if form.body.trim().is_empty() {
        repo.delete_draft(channel.id, member.id)?;
        return Ok(None);
    }
    if form.body.chars().count() > MAX_DRAFT_CHARS {
        return Err(ServiceError::Form(format!(
            "draft is longer than {MAX_DRAFT_CHARS} characters"
        )));
    }

    let draft = repo
        .save_draft(channel.id, member.id, &form.body, Utc::now().naive_utc())
        .map_err(|err| {
            log::error!("Failed to save draft in channel {}: {err}", channel.id);
            err
        })?;
    Ok(Some(draft))
}

pub fn get_draft<R>(
    repo: &R,
    user: &AuthenticatedUser,
    channel_id: i32,
) -> ServiceResult<Option<MessageDraft>>
where
    R: TeamWriter + MessagingReader + ?Sized,
{
    let member = sync_current_member(repo, user)?;
    let channel = joined_channel(repo, &member, channel_id)?;
    Ok(repo.get_draft(channel.id, member.id)?)
}

pub fn clear_draft<R>(repo: &R, user: &AuthenticatedUser, channel_id: i32) -> ServiceResult<()>
where
    R: TeamWriter + MessagingReader + MessagingWriter + ?Sized,
{
    let member = sync_current_member(repo, user)?;
    let channel = joined_channel(repo, &member, channel_id)?;
    Ok(repo.delete_draft(channel.id, member.id)?)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::messaging::ChannelMember;
    use crate::domain::types::{ChannelName, TeamMemberId, WorkspaceId};
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::*;

    fn channel(id: i32, kind: ChannelKind) -> Channel {
        Channel {
            id: ChannelId::new(id).unwrap(),
            workspace_id: WorkspaceId::new(42).unwrap(),
            name: ChannelName::new("general").unwrap(),
            kind,
            created_by: TeamMemberId::new(1).unwrap(),
            created_at: timestamp(),
        }
    }

    fn message(id: i32, author: i32) -> Message {
        Message {
            id: MessageId::new(id).unwrap(),
            channel_id: ChannelId::new(3).unwrap(),
            author_id: TeamMemberId::new(author).unwrap(),
            body: Some(MessageBody::new("hello").unwrap()),
            created_at: timestamp(),
            edited_at: None,
            deleted_at: None,
        }
    }

    fn membership(member: i32, cursor: Option<i32>) -> ChannelMember {
        ChannelMember {
            channel_id: ChannelId::new(3).unwrap(),
            member_id: TeamMemberId::new(member).unwrap(),
            joined_at: timestamp(),
            last_read_message_id: cursor.map(|id| MessageId::new(id).unwrap()),
        }
    }

    /// Repository where the caller (member 5) belongs to channel 3.
    fn member_repo(user: &AuthenticatedUser, kind: ChannelKind) -> MockRepository {
        let mut repo = MockRepository::new();
        let member = member_for(user, 5);
        repo.expect_sync_member()
            .returning(move |_| Ok(member.clone()));
        repo.expect_get_channel_by_id()
            .returning(move |id, _| Ok(Some(channel(id.get(), kind))));
        repo.expect_get_channel_member()
            .returning(|_, member_id| Ok(Some(membership(member_id.get(), None))));
        repo
    }

    #[test]
    fn existing_direct_channel_is_reused() {
        let user = manager_user();
        let mut repo = MockRepository::new();
        let member = member_for(&user, 5);
        repo.expect_sync_member()
            .returning(move |_| Ok(member.clone()));
        repo.expect_get_member_by_id()
            .returning(|id, _| Ok(Some(member_for(&admin_user(), id.get()))));
        repo.expect_find_direct_channel()
            .withf(|_, name| name.to_string() == "dm-2-5")
            .returning(|_, _| Ok(Some(channel(9, ChannelKind::Direct))));
        repo.expect_create_channel().times(0);

        let result = create_channel(
            &repo,
            &EventHub::new(4),
            &user,
            ChannelForm {
                name: None,
                kind: ChannelKind::Direct,
                members: vec![2],
            },
        )
        .unwrap();

        assert_eq!(result.id.get(), 9);
    }

    #[test]
    fn private_channel_cannot_be_joined() {
        let user = manager_user();
        let mut repo = MockRepository::new();
        let member = member_for(&user, 5);
        repo.expect_sync_member()
            .returning(move |_| Ok(member.clone()));
        repo.expect_get_channel_by_id()
            .returning(|id, _| Ok(Some(channel(id.get(), ChannelKind::Private))));
        repo.expect_add_channel_member().times(0);

        let result = join_channel(&repo, &user, 3);

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn posting_requires_membership() {
        let user = manager_user();
        let mut repo = MockRepository::new();
        let member = member_for(&user, 5);
        repo.expect_sync_member()
            .returning(move |_| Ok(member.clone()));
        repo.expect_get_channel_by_id()
            .returning(|id, _| Ok(Some(channel(id.get(), ChannelKind::Public))));
        repo.expect_get_channel_member().returning(|_, _| Ok(None));
        repo.expect_create_message().times(0);

        let result = post_message(
            &repo,
            &EventHub::new(4),
            &PresenceTracker::new(),
            &user,
            3,
            MessageForm {
                body: "hi".to_string(),
            },
        );

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn posting_clears_typing_and_publishes() {
        let user = manager_user();
        let mut repo = member_repo(&user, ChannelKind::Public);
        repo.expect_create_message()
            .withf(|new, _| new.body.as_str() == "hello")
            .times(1)
            .returning(|new, _| Ok(message(11, new.author_id.get())));
        let hub = EventHub::new(4);
        let mut rx = hub.subscribe();
        let presence = PresenceTracker::new();
        let channel_id = ChannelId::new(3).unwrap();
        let member_id = TeamMemberId::new(5).unwrap();
        presence.start_typing(channel_id, member_id, Utc::now().naive_utc());

        post_message(
            &repo,
            &hub,
            &presence,
            &user,
            3,
            MessageForm {
                body: " hello ".to_string(),
            },
        )
        .unwrap();

        assert!(presence.typing_members(channel_id, Utc::now().naive_utc()).is_empty());
        assert_eq!(rx.try_recv().unwrap().table, "messages");
    }

    #[test]
    fn only_author_edits() {
        let user = manager_user();
        let mut repo = member_repo(&user, ChannelKind::Public);
        repo.expect_get_message_by_id()
            .returning(|id, _| Ok(Some(message(id.get(), 1))));
        repo.expect_edit_message().times(0);

        let result = edit_message(
            &repo,
            &EventHub::new(4),
            &user,
            3,
            11,
            MessageForm {
                body: "changed".to_string(),
            },
        );

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn admin_deletes_any_message() {
        let user = admin_user();
        let mut repo = member_repo(&user, ChannelKind::Public);
        repo.expect_get_message_by_id()
            .returning(|id, _| Ok(Some(message(id.get(), 1))));
        repo.expect_delete_message().times(1).returning(|id, now| {
            let mut deleted = message(id.get(), 1);
            deleted.body = None;
            deleted.deleted_at = Some(now);
            Ok(deleted)
        });

        let deleted = delete_message(&repo, &EventHub::new(4), &user, 3, 11).unwrap();

        assert!(deleted.is_deleted());
    }

    #[test]
    fn full_page_points_at_next_page() {
        let user = manager_user();
        let mut repo = member_repo(&user, ChannelKind::Public);
        repo.expect_list_messages()
            .withf(|query| query.limit == 2 && query.before.map(|id| id.get()) == Some(10))
            .returning(|_| Ok(vec![message(9, 1), message(8, 1)]));

        let page = list_messages(
            &repo,
            &user,
            3,
            MessagesQuery {
                before: Some(10),
                limit: Some(2),
            },
        )
        .unwrap();

        assert_eq!(page.next_before.map(|id| id.get()), Some(8));
    }

    #[test]
    fn stale_read_is_not_announced() {
        let user = manager_user();
        let mut repo = member_repo(&user, ChannelKind::Public);
        repo.expect_get_message_by_id()
            .returning(|id, _| Ok(Some(message(id.get(), 1))));
        repo.expect_advance_read_cursor().returning(|_, _, _| Ok(false));
        let hub = EventHub::new(4);
        let mut rx = hub.subscribe();

        let advanced =
            mark_read(&repo, &hub, &user, 3, MarkReadForm { message_id: 4 }).unwrap();

        assert!(!advanced);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn receipts_list_readers_other_than_author() {
        let user = manager_user();
        let mut repo = member_repo(&user, ChannelKind::Public);
        repo.expect_get_message_by_id()
            .returning(|id, _| Ok(Some(message(id.get(), 1))));
        repo.expect_list_channel_members().returning(|_| {
            Ok(vec![
                membership(1, Some(20)),
                membership(5, Some(11)),
                membership(6, Some(10)),
                membership(7, None),
            ])
        });

        let receipts = read_receipts(&repo, &user, 3, 11).unwrap();

        let readers: Vec<i32> = receipts.read_by.iter().map(|id| id.get()).collect();
        assert_eq!(readers, vec![5]);
    }

    #[test]
    fn blank_draft_is_cleared() {
        let user = manager_user();
        let mut repo = member_repo(&user, ChannelKind::Public);
        repo.expect_delete_draft().times(1).returning(|_, _| Ok(()));
        repo.expect_save_draft().times(0);

        let draft = save_draft(
            &repo,
            &user,
            3,
            DraftForm {
                body: "   ".to_string(),
            },
        )
        .unwrap();

        assert!(draft.is_none());
    }
}
