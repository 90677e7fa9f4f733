//! Diesel models for channels, memberships, messages and drafts.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::messaging::{
    Channel as DomainChannel, ChannelKind, ChannelMember as DomainChannelMember,
    Message as DomainMessage, MessageDraft as DomainMessageDraft,
};
use crate::domain::types::{
    ChannelId, ChannelName, MessageBody, MessageId, TeamMemberId, TypeConstraintError,
    WorkspaceId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::channels)]
pub struct Channel {
    pub id: i32,
    pub workspace_id: i32,
    pub name: String,
    pub kind: String,
    pub created_by: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::channels)]
pub struct NewChannel<'a> {
    pub workspace_id: i32,
    pub name: &'a str,
    pub kind: &'a str,
    pub created_by: i32,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::channel_members)]
pub struct ChannelMember {
    pub channel_id: i32,
    pub member_id: i32,
    pub joined_at: NaiveDateTime,
    pub last_read_message_id: Option<i32>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::channel_members)]
pub struct NewChannelMember {
    pub channel_id: i32,
    pub member_id: i32,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::messages)]
pub struct Message {
    pub id: i32,
    pub channel_id: i32,
    pub author_id: i32,
    pub body: String,
    pub created_at: NaiveDateTime,
    pub edited_at: Option<NaiveDateTime>,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::messages)]
pub struct NewMessage<'a> {
    pub channel_id: i32,
    pub author_id: i32,
    pub body: &'a str,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::message_drafts)]
pub struct MessageDraft {
    pub channel_id: i32,
    pub member_id: i32,
    pub body: String,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Channel> for DomainChannel {
    type Error = TypeConstraintError;

    fn try_from(row: Channel) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ChannelId::new(row.id)?,
            workspace_id: WorkspaceId::new(row.workspace_id)?,
            name: ChannelName::new(row.name)?,
            kind: ChannelKind::try_from(row.kind.as_str())?,
            created_by: TeamMemberId::new(row.created_by)?,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<ChannelMember> for DomainChannelMember {
    type Error = TypeConstraintError;

    fn try_from(row: ChannelMember) -> Result<Self, Self::Error> {
        Ok(Self {
            channel_id: ChannelId::new(row.channel_id)?,
            member_id: TeamMemberId::new(row.member_id)?,
            joined_at: row.joined_at,
            last_read_message_id: row.last_read_message_id.map(MessageId::new).transpose()?,
        })
    }
}

impl TryFrom<Message> for DomainMessage {
    type Error = TypeConstraintError;

    /// Deleted messages keep their row but lose their body.
    fn try_from(row: Message) -> Result<Self, Self::Error> {
        let body = match row.deleted_at {
            Some(_) => None,
            None => Some(MessageBody::new(row.body)?),
        };
        Ok(Self {
            id: MessageId::new(row.id)?,
            channel_id: ChannelId::new(row.channel_id)?,
            author_id: TeamMemberId::new(row.author_id)?,
            body,
            created_at: row.created_at,
            edited_at: row.edited_at,
            deleted_at: row.deleted_at,
        })
    }
}

impl TryFrom<MessageDraft> for DomainMessageDraft {
    type Error = TypeConstraintError;

    fn try_from(row: MessageDraft) -> Result<Self, Self::Error> {
        Ok(Self {
            channel_id: ChannelId::new(row.channel_id)?,
            member_id: TeamMemberId::new(row.member_id)?,
            body: row.body,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deleted_message_hides_body() {
        let row = Message {
            id: 1,
            channel_id: 1,
            author_id: 2,
            body: "secret plan".into(),
            created_at: NaiveDateTime::default(),
            edited_at: None,
            deleted_at: Some(NaiveDateTime::default()),
        };
        let message = DomainMessage::try_from(row).unwrap();
        assert!(message.is_deleted());
        assert_eq!(message.body, None);
    }
}
