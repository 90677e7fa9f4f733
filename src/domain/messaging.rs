//! Channels, messages, read cursors and drafts.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::types::{
    ChannelId, ChannelName, MessageBody, MessageId, TeamMemberId, TypeConstraintError,
    WorkspaceId,
};

/// Largest page of messages returned by one listing.
pub const MAX_MESSAGE_PAGE: usize = 100;

text_enum!(
    ChannelKind {
        Public => "public",
        Private => "private",
        Direct => "direct",
    }
);

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Channel {
    pub id: ChannelId,
    pub workspace_id: WorkspaceId,
    pub name: ChannelName,
    pub kind: ChannelKind,
    pub created_by: TeamMemberId,
    pub created_at: NaiveDateTime,
}

/// Names starting with this prefix belong to direct channels only.
pub const DIRECT_CHANNEL_PREFIX: &str = "dm-";

/// Canonical name of the direct channel between two members, independent of
/// who opened it.
pub fn direct_channel_name(a: TeamMemberId, b: TeamMemberId) -> String {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    format!("{DIRECT_CHANNEL_PREFIX}{low}-{high}")
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewChannel {
    pub workspace_id: WorkspaceId,
    pub name: ChannelName,
    pub kind: ChannelKind,
    pub created_by: TeamMemberId,
    /// Initial members, always including the creator, without duplicates.
    pub members: Vec<TeamMemberId>,
}

impl NewChannel {
    pub fn try_new(
        workspace_id: WorkspaceId,
        name: Option<ChannelName>,
        kind: ChannelKind,
        created_by: TeamMemberId,
        members: &[TeamMemberId],
    ) -> Result<Self, TypeConstraintError> {
        let mut unique: BTreeSet<TeamMemberId> = members.iter().copied().collect();
        unique.insert(created_by);

        let name = match kind {
            ChannelKind::Direct => {
                if unique.len() != 2 {
                    return Err(TypeConstraintError::InvalidValue(
                        "direct channel needs exactly one other member".to_string(),
                    ));
                }
                let other = unique
                    .iter()
                    .copied()
                    .find(|member| *member != created_by)
                    .ok_or(TypeConstraintError::InvalidValue(
                        "direct channel needs exactly one other member".to_string(),
                    ))?;
                ChannelName::new(direct_channel_name(created_by, other))?
            }
            ChannelKind::Public | ChannelKind::Private => {
                let name = name.ok_or(TypeConstraintError::EmptyString)?;
                if name.as_str().starts_with(DIRECT_CHANNEL_PREFIX) {
                    return Err(TypeConstraintError::InvalidValue(format!(
                        "channel names starting with `{DIRECT_CHANNEL_PREFIX}` are reserved"
                    )));
                }
                name
            }
        };

        Ok(Self {
            workspace_id,
            name,
            kind,
            created_by,
            members: unique.into_iter().collect(),
        })
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ChannelMember {
    pub channel_id: ChannelId,
    pub member_id: TeamMemberId,
    pub joined_at: NaiveDateTime,
    pub last_read_message_id: Option<MessageId>,
}

impl ChannelMember {
    pub fn has_read(&self, message_id: MessageId) -> bool {
        self.last_read_message_id
            .is_some_and(|cursor| cursor >= message_id)
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub author_id: TeamMemberId,
    /// `None` once the message has been deleted.
    pub body: Option<MessageBody>,
    pub created_at: NaiveDateTime,
    pub edited_at: Option<NaiveDateTime>,
    pub deleted_at: Option<NaiveDateTime>,
}

impl Message {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewMessage {
    pub channel_id: ChannelId,
    pub author_id: TeamMemberId,
    pub body: MessageBody,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct MessageDraft {
    pub channel_id: ChannelId,
    pub member_id: TeamMemberId,
    pub body: String,
    pub updated_at: NaiveDateTime,
}

/// Channel as seen by one member.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ChannelSummary {
    pub channel: Channel,
    pub unread: usize,
    pub last_message_id: Option<MessageId>,
}

/// Counts messages after `cursor` written by someone other than `reader`.
pub fn count_unread(
    messages: &[(MessageId, TeamMemberId, bool)],
    reader: TeamMemberId,
    cursor: Option<MessageId>,
) -> usize {
    messages
        .iter()
        .filter(|(id, author, deleted)| {
            !*deleted && *author != reader && cursor.is_none_or(|c| *id > c)
        })
        .count()
}
