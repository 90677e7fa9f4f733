use actix_web::{HttpResponse, Responder, get, web};

use crate::SERVICE_ACCESS_ROLE;
use crate::models::auth::AuthenticatedUser;
use crate::realtime::EventHub;
use crate::realtime::sse::workspace_stream;
use crate::routes::error_response;
use crate::services::{ensure_role, workspace_of};

/// Server-sent events for every change in the caller's workspace.
#[get("/events")]
pub async fn change_feed(user: AuthenticatedUser, hub: web::Data<EventHub>) -> impl Responder {
    let workspace_id = match ensure_role(&user, SERVICE_ACCESS_ROLE)
        .and_then(|_| workspace_of(&user))
    {
        Ok(workspace_id) => workspace_id,
        Err(err) => return error_response(&err),
    };

    log::debug!("Opening change feed for workspace {workspace_id}");
    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(workspace_stream(hub.get_ref(), workspace_id))
}
