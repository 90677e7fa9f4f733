use serde::Deserialize;

use crate::domain::messaging::{ChannelKind, MAX_MESSAGE_PAGE, NewChannel};
use crate::domain::types::{ChannelName, MessageBody, MessageId, TeamMemberId, WorkspaceId};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Deserialize)]
pub struct ChannelForm {
    #[serde(default)]
    pub name: Option<String>,
    pub kind: ChannelKind,
    #[serde(default)]
    pub members: Vec<i32>,
}

impl ChannelForm {
    pub fn into_domain(
        self,
        workspace_id: WorkspaceId,
        created_by: TeamMemberId,
    ) -> Result<NewChannel, FormError> {
        let name = non_blank(self.name)
            .map(ChannelName::new)
            .transpose()
            .map_err(|_| FormError::InvalidName)?;
        let members = self
            .members
            .into_iter()
            .map(|id| TeamMemberId::new(id).map_err(|_| FormError::InvalidId))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NewChannel::try_new(
            workspace_id,
            name,
            self.kind,
            created_by,
            &members,
        )?)
    }
}

#[derive(Debug, Deserialize)]
pub struct MessageForm {
    pub body: String,
}

impl TryFrom<MessageForm> for MessageBody {
    type Error = FormError;

    fn try_from(form: MessageForm) -> Result<Self, Self::Error> {
        Ok(MessageBody::new(form.body)?)
    }
}

/// Draft text is kept verbatim; it is only sanitized once posted.
#[derive(Debug, Deserialize)]
pub struct DraftForm {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct MarkReadForm {
    pub message_id: i32,
}

impl TryFrom<MarkReadForm> for MessageId {
    type Error = FormError;

    fn try_from(form: MarkReadForm) -> Result<Self, Self::Error> {
        MessageId::new(form.message_id).map_err(|_| FormError::InvalidId)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MessagesQuery {
    pub before: Option<i32>,
    pub limit: Option<usize>,
}

impl MessagesQuery {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(50).clamp(1, MAX_MESSAGE_PAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_channel_gets_canonical_name() {
        let form = ChannelForm {
            name: Some("ignored".to_string()),
            kind: ChannelKind::Direct,
            members: vec![7],
        };
        let channel = form
            .into_domain(WorkspaceId::new(1).unwrap(), TeamMemberId::new(3).unwrap())
            .unwrap();
        assert_eq!(channel.name.as_str(), "dm-3-7");
        assert_eq!(channel.members.len(), 2);
    }

    #[test]
    fn blank_message_is_rejected() {
        let form = MessageForm {
            body: "  <script></script> ".to_string(),
        };
        assert!(MessageBody::try_from(form).is_err());
    }

    #[test]
    fn page_size_is_capped() {
        let query = MessagesQuery {
            before: None,
            limit: Some(10_000),
        };
        assert_eq!(query.limit(), MAX_MESSAGE_PAGE);
        assert_eq!(MessagesQuery::default().limit(), 50);
    }
}
