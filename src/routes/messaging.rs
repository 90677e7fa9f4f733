use actix_web::{Responder, delete, get, post, put, web};

use crate::forms::messaging::{ChannelForm, DraftForm, MarkReadForm, MessageForm, MessagesQuery};
use crate::models::auth::AuthenticatedUser;
use crate::realtime::{EventHub, PresenceTracker};
use crate::repository::DieselRepository;
use crate::routes::{respond, respond_created, respond_empty};
use crate::services::{messaging as messaging_service, presence as presence_service};

#[get("/channels")]
pub async fn list_channels(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        "list channels",
        messaging_service::list_channels(repo.get_ref(), &user),
    )
}

#[post("/channels")]
pub async fn create_channel(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
    web::Json(form): web::Json<ChannelForm>,
) -> impl Responder {
    respond_created(
        "create channel",
        messaging_service::create_channel(repo.get_ref(), hub.get_ref(), &user, form),
    )
}

#[post("/channels/{channel_id}/join")]
pub async fn join_channel(
    channel_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        "join channel",
        messaging_service::join_channel(repo.get_ref(), &user, channel_id.into_inner()),
    )
}

#[post("/channels/{channel_id}/leave")]
pub async fn leave_channel(
    channel_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond_empty(
        "leave channel",
        messaging_service::leave_channel(repo.get_ref(), &user, channel_id.into_inner()),
    )
}

#[get("/channels/{channel_id}/messages")]
pub async fn list_messages(
    channel_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Query(query): web::Query<MessagesQuery>,
) -> impl Responder {
    respond(
        "list messages",
        messaging_service::list_messages(repo.get_ref(), &user, channel_id.into_inner(), query),
    )
}

#[post("/channels/{channel_id}/messages")]
pub async fn post_message(
    channel_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
    presence: web::Data<PresenceTracker>,
    web::Json(form): web::Json<MessageForm>,
) -> impl Responder {
    respond_created(
        "post message",
        messaging_service::post_message(
            repo.get_ref(),
            hub.get_ref(),
            presence.get_ref(),
            &user,
            channel_id.into_inner(),
            form,
        ),
    )
}

#[put("/channels/{channel_id}/messages/{message_id}")]
pub async fn edit_message(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
    web::Json(form): web::Json<MessageForm>,
) -> impl Responder {
    let (channel_id, message_id) = path.into_inner();
    respond(
        "edit message",
        messaging_service::edit_message(
            repo.get_ref(),
            hub.get_ref(),
            &user,
            channel_id,
            message_id,
            form,
        ),
    )
}

#[delete("/channels/{channel_id}/messages/{message_id}")]
pub async fn delete_message(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
) -> impl Responder {
    let (channel_id, message_id) = path.into_inner();
    respond(
        "delete message",
        messaging_service::delete_message(
            repo.get_ref(),
            hub.get_ref(),
            &user,
            channel_id,
            message_id,
        ),
    )
}

#[get("/channels/{channel_id}/messages/{message_id}/receipts")]
pub async fn read_receipts(
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (channel_id, message_id) = path.into_inner();
    respond(
        "load read receipts",
        messaging_service::read_receipts(repo.get_ref(), &user, channel_id, message_id),
    )
}

#[post("/channels/{channel_id}/read")]
pub async fn mark_read(
    channel_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
    web::Json(form): web::Json<MarkReadForm>,
) -> impl Responder {
    respond(
        "mark channel read",
        messaging_service::mark_read(
            repo.get_ref(),
            hub.get_ref(),
            &user,
            channel_id.into_inner(),
            form,
        )
        .map(|advanced| serde_json::json!({ "advanced": advanced })),
    )
}

#[get("/channels/{channel_id}/draft")]
pub async fn show_draft(
    channel_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        "load draft",
        messaging_service::get_draft(repo.get_ref(), &user, channel_id.into_inner()),
    )
}

#[put("/channels/{channel_id}/draft")]
pub async fn save_draft(
    channel_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<DraftForm>,
) -> impl Responder {
    respond(
        "save draft",
        messaging_service::save_draft(repo.get_ref(), &user, channel_id.into_inner(), form),
    )
}

#[delete("/channels/{channel_id}/draft")]
pub async fn clear_draft(
    channel_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond_empty(
        "clear draft",
        messaging_service::clear_draft(repo.get_ref(), &user, channel_id.into_inner()),
    )
}

#[post("/channels/{channel_id}/typing")]
pub async fn start_typing(
    channel_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
    presence: web::Data<PresenceTracker>,
) -> impl Responder {
    respond_empty(
        "record typing",
        presence_service::typing(
            repo.get_ref(),
            hub.get_ref(),
            presence.get_ref(),
            &user,
            channel_id.into_inner(),
        ),
    )
}

#[get("/channels/{channel_id}/typing")]
pub async fn typing_members(
    channel_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    presence: web::Data<PresenceTracker>,
) -> impl Responder {
    respond(
        "list typing members",
        presence_service::typing_members(
            repo.get_ref(),
            presence.get_ref(),
            &user,
            channel_id.into_inner(),
        ),
    )
}

#[post("/presence/heartbeat")]
pub async fn heartbeat(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    presence: web::Data<PresenceTracker>,
) -> impl Responder {
    respond(
        "record heartbeat",
        presence_service::heartbeat(repo.get_ref(), presence.get_ref(), &user),
    )
}

#[get("/presence")]
pub async fn online_members(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    presence: web::Data<PresenceTracker>,
) -> impl Responder {
    respond(
        "list online members",
        presence_service::online_members(repo.get_ref(), presence.get_ref(), &user),
    )
}
