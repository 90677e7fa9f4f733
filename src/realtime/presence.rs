//! Online presence and typing indicators, kept in memory only.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{Duration, NaiveDateTime};

use crate::domain::types::{ChannelId, TeamMemberId, WorkspaceId};

/// A member is online while their last heartbeat is younger than this.
pub const ONLINE_WINDOW_SECS: i64 = 60;
/// Typing indicators expire after this many seconds without a refresh.
pub const TYPING_TTL_SECS: i64 = 5;

#[derive(Debug, Default)]
pub struct PresenceTracker {
    heartbeats: Mutex<HashMap<(WorkspaceId, TeamMemberId), NaiveDateTime>>,
    typing: Mutex<HashMap<(ChannelId, TeamMemberId), NaiveDateTime>>,
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heartbeat(&self, workspace_id: WorkspaceId, member_id: TeamMemberId, now: NaiveDateTime) {
        guard(&self.heartbeats).insert((workspace_id, member_id), now);
    }

    /// Members of the workspace seen within the online window, sorted by id.
    pub fn online_members(&self, workspace_id: WorkspaceId, now: NaiveDateTime) -> Vec<TeamMemberId> {
        let cutoff = now - Duration::seconds(ONLINE_WINDOW_SECS);
        let mut heartbeats = guard(&self.heartbeats);
        heartbeats.retain(|_, seen| *seen > cutoff);

        let mut online: Vec<TeamMemberId> = heartbeats
            .keys()
            .filter(|(workspace, _)| *workspace == workspace_id)
            .map(|(_, member)| *member)
            .collect();
        online.sort_unstable();
        online
    }

    pub fn start_typing(&self, channel_id: ChannelId, member_id: TeamMemberId, now: NaiveDateTime) {
        guard(&self.typing).insert((channel_id, member_id), now);
    }

    pub fn stop_typing(&self, channel_id: ChannelId, member_id: TeamMemberId) {
        guard(&self.typing).remove(&(channel_id, member_id));
    }

    /// Unexpired indicators for the channel, sorted by member id.
    pub fn typing_members(&self, channel_id: ChannelId, now: NaiveDateTime) -> Vec<TeamMemberId> {
        let cutoff = now - Duration::seconds(TYPING_TTL_SECS);
        let mut typing = guard(&self.typing);
        typing.retain(|_, since| *since > cutoff);

        let mut members: Vec<TeamMemberId> = typing
            .keys()
            .filter(|(channel, _)| *channel == channel_id)
            .map(|(_, member)| *member)
            .collect();
        members.sort_unstable();
        members
    }
}
