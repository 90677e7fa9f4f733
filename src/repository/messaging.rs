use std::collections::HashMap;

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::messaging::{
    Channel, ChannelKind, ChannelMember, ChannelSummary, MAX_MESSAGE_PAGE, Message, MessageDraft,
    NewChannel, NewMessage, count_unread,
};
use crate::domain::types::{ChannelId, MessageBody, MessageId, TeamMemberId, WorkspaceId};
use crate::models::messaging::{
    Channel as DbChannel, ChannelMember as DbChannelMember, Message as DbMessage,
    MessageDraft as DbMessageDraft, NewChannel as DbNewChannel,
    NewChannelMember as DbNewChannelMember, NewMessage as DbNewMessage,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, MessageListQuery, MessagingReader, MessagingWriter};

impl MessagingReader for DieselRepository {
    fn get_channel_by_id(
        &self,
        id: ChannelId,
        workspace_id: WorkspaceId,
    ) -> RepositoryResult<Option<Channel>> {
        use crate::schema::channels;

        let mut conn = self.conn()?;
        let row = channels::table
            .filter(channels::id.eq(id.get()))
            .filter(channels::workspace_id.eq(workspace_id.get()))
            .first::<DbChannel>(&mut conn)
            .optional()?;

        row.map(Channel::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn find_direct_channel(
        &self,
        workspace_id: WorkspaceId,
        name: &str,
    ) -> RepositoryResult<Option<Channel>> {
        use crate::schema::channels;

        let mut conn = self.conn()?;
        let row = channels::table
            .filter(channels::workspace_id.eq(workspace_id.get()))
            .filter(channels::kind.eq(ChannelKind::Direct.as_str()))
            .filter(channels::name.eq(name))
            .order(channels::id.asc())
            .first::<DbChannel>(&mut conn)
            .optional()?;

        row.map(Channel::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_member_channels(
        &self,
        workspace_id: WorkspaceId,
        member_id: TeamMemberId,
    ) -> RepositoryResult<Vec<ChannelSummary>> {
        use crate::schema::{channel_members, channels, messages};

        let mut conn = self.conn()?;
        let rows = channels::table
            .inner_join(channel_members::table)
            .filter(channels::workspace_id.eq(workspace_id.get()))
            .filter(channel_members::member_id.eq(member_id.get()))
            .order(channels::name.asc())
            .select((DbChannel::as_select(), channel_members::last_read_message_id))
            .load::<(DbChannel, Option<i32>)>(&mut conn)?;

        let channel_ids: Vec<i32> = rows.iter().map(|(channel, _)| channel.id).collect();
        let activity = messages::table
            .filter(messages::channel_id.eq_any(channel_ids))
            .select((
                messages::channel_id,
                messages::id,
                messages::author_id,
                messages::deleted_at.is_not_null(),
            ))
            .load::<(i32, i32, i32, bool)>(&mut conn)?;

        let mut by_channel: HashMap<i32, Vec<(MessageId, TeamMemberId, bool)>> = HashMap::new();
        for (channel_id, id, author_id, deleted) in activity {
            by_channel.entry(channel_id).or_default().push((
                MessageId::new(id)?,
                TeamMemberId::new(author_id)?,
                deleted,
            ));
        }

        rows.into_iter()
            .map(|(channel, cursor)| -> RepositoryResult<ChannelSummary> {
                let messages = by_channel.remove(&channel.id).unwrap_or_default();
                let cursor = cursor.map(MessageId::new).transpose()?;
                Ok(ChannelSummary {
                    unread: count_unread(&messages, member_id, cursor),
                    last_message_id: messages.iter().map(|(id, _, _)| *id).max(),
                    channel: Channel::try_from(channel)?,
                })
            })
            .collect()
    }

    fn get_channel_member(
        &self,
        channel_id: ChannelId,
        member_id: TeamMemberId,
    ) -> RepositoryResult<Option<ChannelMember>> {
        use crate::schema::channel_members;

        let mut conn = self.conn()?;
        let row = channel_members::table
            .find((channel_id.get(), member_id.get()))
            .first::<DbChannelMember>(&mut conn)
            .optional()?;

        row.map(ChannelMember::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_channel_members(&self, channel_id: ChannelId) -> RepositoryResult<Vec<ChannelMember>> {
        use crate::schema::channel_members;

        let mut conn = self.conn()?;
        let rows = channel_members::table
            .filter(channel_members::channel_id.eq(channel_id.get()))
            .order(channel_members::member_id.asc())
            .load::<DbChannelMember>(&mut conn)?;

        rows.into_iter()
            .map(|row| ChannelMember::try_from(row).map_err(RepositoryError::from))
            .collect()
    }

    fn get_message_by_id(
        &self,
        id: MessageId,
        channel_id: ChannelId,
    ) -> RepositoryResult<Option<Message>> {
        use crate::schema::messages;

        let mut conn = self.conn()?;
        let row = messages::table
            .filter(messages::id.eq(id.get()))
            .filter(messages::channel_id.eq(channel_id.get()))
            .first::<DbMessage>(&mut conn)
            .optional()?;

        row.map(Message::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_messages(&self, query: MessageListQuery) -> RepositoryResult<Vec<Message>> {
        use crate::schema::messages;

        let mut conn = self.conn()?;
        let mut items = messages::table
            .filter(messages::channel_id.eq(query.channel_id.get()))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(before) = query.before {
            items = items.filter(messages::id.lt(before.get()));
        }

        let limit = i64::try_from(query.limit.clamp(1, MAX_MESSAGE_PAGE)).unwrap_or(1);
        let rows = items
            .order(messages::id.desc())
            .limit(limit)
            .load::<DbMessage>(&mut conn)?;

        rows.into_iter()
            .map(|row| Message::try_from(row).map_err(RepositoryError::from))
            .collect()
    }

    fn get_draft(
        &self,
        channel_id: ChannelId,
        member_id: TeamMemberId,
    ) -> RepositoryResult<Option<MessageDraft>> {
        use crate::schema::message_drafts;

        let mut conn = self.conn()?;
        let row = message_drafts::table
            .find((channel_id.get(), member_id.get()))
            .first::<DbMessageDraft>(&mut conn)
            .optional()?;

        row.map(MessageDraft::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }
}

impl MessagingWriter for DieselRepository {
    fn create_channel(&self, channel: &NewChannel) -> RepositoryResult<Channel> {
        use crate::schema::{channel_members, channels};

        let mut conn = self.conn()?;
        let created = conn.immediate_transaction::<Channel, RepositoryError, _>(|conn| {
            let row = diesel::insert_into(channels::table)
                .values(&DbNewChannel {
                    workspace_id: channel.workspace_id.get(),
                    name: channel.name.as_str(),
                    kind: channel.kind.as_str(),
                    created_by: channel.created_by.get(),
                })
                .get_result::<DbChannel>(conn)?;

            let members: Vec<DbNewChannelMember> = channel
                .members
                .iter()
                .map(|member_id| DbNewChannelMember {
                    channel_id: row.id,
                    member_id: member_id.get(),
                })
                .collect();
            diesel::insert_into(channel_members::table)
                .values(&members)
                .execute(conn)?;

            Ok(Channel::try_from(row)?)
        });

        // A concurrent opener of the same pair wins the unique index; hand back its channel.
        match created {
            Err(RepositoryError::ConstraintViolation(_)) if channel.kind == ChannelKind::Direct => {
                drop(conn);
                self.find_direct_channel(channel.workspace_id, channel.name.as_str())?
                    .ok_or(RepositoryError::Conflict(format!(
                        "direct channel {} could not be created",
                        channel.name
                    )))
            }
            other => other,
        }
    }

    fn add_channel_member(
        &self,
        channel_id: ChannelId,
        member_id: TeamMemberId,
    ) -> RepositoryResult<()> {
        use crate::schema::channel_members;

        let mut conn = self.conn()?;
        diesel::insert_into(channel_members::table)
            .values(&DbNewChannelMember {
                channel_id: channel_id.get(),
                member_id: member_id.get(),
            })
            .on_conflict_do_nothing()
            .execute(&mut conn)?;
        Ok(())
    }

    fn remove_channel_member(
        &self,
        channel_id: ChannelId,
        member_id: TeamMemberId,
    ) -> RepositoryResult<()> {
        use crate::schema::channel_members;

        let mut conn = self.conn()?;
        let deleted =
            diesel::delete(channel_members::table.find((channel_id.get(), member_id.get())))
                .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn create_message(
        &self,
        message: &NewMessage,
        now: NaiveDateTime,
    ) -> RepositoryResult<Message> {
        use crate::schema::{message_drafts, messages};

        let mut conn = self.conn()?;
        conn.immediate_transaction::<Message, RepositoryError, _>(|conn| {
            let row = diesel::insert_into(messages::table)
                .values(&DbNewMessage {
                    channel_id: message.channel_id.get(),
                    author_id: message.author_id.get(),
                    body: message.body.as_str(),
                    created_at: now,
                })
                .get_result::<DbMessage>(conn)?;

            diesel::delete(
                message_drafts::table
                    .find((message.channel_id.get(), message.author_id.get())),
            )
            .execute(conn)?;

            Ok(Message::try_from(row)?)
        })
    }

    fn edit_message(
        &self,
        id: MessageId,
        body: &MessageBody,
        now: NaiveDateTime,
    ) -> RepositoryResult<Message> {
        use crate::schema::messages;

        let mut conn = self.conn()?;
        let row = diesel::update(
            messages::table
                .filter(messages::id.eq(id.get()))
                .filter(messages::deleted_at.is_null()),
        )
        .set((
            messages::body.eq(body.as_str()),
            messages::edited_at.eq(Some(now)),
        ))
        .get_result::<DbMessage>(&mut conn)?;
        Ok(Message::try_from(row)?)
    }

    fn delete_message(&self, id: MessageId, now: NaiveDateTime) -> RepositoryResult<Message> {
        use crate::schema::messages;

        let mut conn = self.conn()?;
        let row = diesel::update(
            messages::table
                .filter(messages::id.eq(id.get()))
                .filter(messages::deleted_at.is_null()),
        )
        .set(messages::deleted_at.eq(Some(now)))
        .get_result::<DbMessage>(&mut conn)?;
        Ok(Message::try_from(row)?)
    }

    fn advance_read_cursor(
        &self,
        channel_id: ChannelId,
        member_id: TeamMemberId,
        message_id: MessageId,
    ) -> RepositoryResult<bool> {
        use crate::schema::channel_members;

        let mut conn = self.conn()?;
        let updated = diesel::update(
            channel_members::table
                .filter(channel_members::channel_id.eq(channel_id.get()))
                .filter(channel_members::member_id.eq(member_id.get()))
                .filter(
                    channel_members::last_read_message_id
                        .is_null()
                        .or(channel_members::last_read_message_id.lt(message_id.get())),
                ),
        )
        .set(channel_members::last_read_message_id.eq(Some(message_id.get())))
        .execute(&mut conn)?;

        Ok(updated > 0)
    }

    fn save_draft(
        &self,
        channel_id: ChannelId,
        member_id: TeamMemberId,
        body: &str,
        now: NaiveDateTime,
    ) -> RepositoryResult<MessageDraft> {
        use crate::schema::message_drafts;

        let mut conn = self.conn()?;
        let row = diesel::insert_into(message_drafts::table)
            .values(&DbMessageDraft {
                channel_id: channel_id.get(),
                member_id: member_id.get(),
                body: body.to_string(),
                updated_at: now,
            })
            .on_conflict((message_drafts::channel_id, message_drafts::member_id))
            .do_update()
            .set((
                message_drafts::body.eq(body),
                message_drafts::updated_at.eq(now),
            ))
            .get_result::<DbMessageDraft>(&mut conn)?;
        Ok(MessageDraft::try_from(row)?)
    }

    fn delete_draft(
        &self,
        channel_id: ChannelId,
        member_id: TeamMemberId,
    ) -> RepositoryResult<()> {
        use crate::schema::message_drafts;

        let mut conn = self.conn()?;
        diesel::delete(message_drafts::table.find((channel_id.get(), member_id.get())))
            .execute(&mut conn)?;
        Ok(())
    }
}
