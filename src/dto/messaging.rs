use serde::Serialize;

use crate::domain::messaging::Message;
use crate::domain::types::{MessageId, TeamMemberId};

#[derive(Debug, Serialize)]
pub struct MessagePage {
    pub messages: Vec<Message>,
    /// Pass as `before` to load the next, older page.
    pub next_before: Option<MessageId>,
}

#[derive(Debug, Serialize)]
pub struct ReadReceipts {
    pub message_id: MessageId,
    pub read_by: Vec<TeamMemberId>,
}

#[derive(Debug, Serialize)]
pub struct MemberList {
    pub members: Vec<TeamMemberId>,
}
