//! Server-sent-event encoding of the change feed.

use actix_web::web::Bytes;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::{Stream, StreamExt};

use crate::domain::types::WorkspaceId;
use crate::realtime::events::{ChangeEvent, EventHub};

/// Formats one event as an SSE frame named after its table.
pub fn encode_event(event: &ChangeEvent) -> Option<Bytes> {
    match serde_json::to_string(event) {
        Ok(data) => Some(Bytes::from(format!(
            "event: {}\ndata: {data}\n\n",
            event.table
        ))),
        Err(err) => {
            log::error!("Failed to encode change event: {err}");
            None
        }
    }
}

/// Stream of SSE frames carrying only `workspace_id`'s events.
///
/// Lagging subscribers skip what they missed instead of closing the stream.
pub fn workspace_stream(
    hub: &EventHub,
    workspace_id: WorkspaceId,
) -> impl Stream<Item = Result<Bytes, actix_web::Error>> + use<> {
    let workspace = workspace_id.get();
    BroadcastStream::new(hub.subscribe()).filter_map(move |item| match item {
        Ok(event) if event.workspace_id == workspace => encode_event(&event).map(Ok),
        Ok(_) => None,
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            log::warn!("Change feed subscriber lagged, skipped {skipped} events");
            None
        }
    })
}
