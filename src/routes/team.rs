use actix_web::{Responder, delete, get, post, put, web};

use crate::forms::team::{
    AcceptInvitationForm, CreateMemberForm, InviteMemberForm, MigrateMemberForm, UpdateMemberForm,
};
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::realtime::EventHub;
use crate::repository::DieselRepository;
use crate::routes::{respond, respond_created, respond_empty};
use crate::services::{team as team_service, users as users_service};

#[get("/team")]
pub async fn list_members(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        "list team members",
        team_service::list_members(repo.get_ref(), &user),
    )
}

#[post("/team")]
pub async fn create_member(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
    web::Json(form): web::Json<CreateMemberForm>,
) -> impl Responder {
    respond_created(
        "create team member",
        users_service::create_member(repo.get_ref(), hub.get_ref(), &user, form),
    )
}

#[get("/team/workload")]
pub async fn team_workload(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        "compute team workload",
        team_service::team_workload(repo.get_ref(), &user),
    )
}

#[post("/team/migrate")]
pub async fn migrate_member(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
    web::Json(form): web::Json<MigrateMemberForm>,
) -> impl Responder {
    respond(
        "migrate team member",
        users_service::migrate_member(repo.get_ref(), hub.get_ref(), &user, form),
    )
}

#[put("/team/{member_id}")]
pub async fn update_member(
    member_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
    web::Json(form): web::Json<UpdateMemberForm>,
) -> impl Responder {
    respond(
        "update team member",
        team_service::update_member(
            repo.get_ref(),
            hub.get_ref(),
            &user,
            member_id.into_inner(),
            form,
        ),
    )
}

#[get("/invitations")]
pub async fn list_invitations(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        "list invitations",
        users_service::list_invitations(repo.get_ref(), &user),
    )
}

#[post("/invitations")]
pub async fn invite_member(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    web::Json(form): web::Json<InviteMemberForm>,
) -> impl Responder {
    respond_created(
        "invite team member",
        users_service::invite_member(
            repo.get_ref(),
            &user,
            form,
            server_config.invitation_ttl_hours,
        ),
    )
}

#[post("/invitations/accept")]
pub async fn accept_invitation(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
    web::Json(form): web::Json<AcceptInvitationForm>,
) -> impl Responder {
    respond(
        "accept invitation",
        users_service::accept_invitation(repo.get_ref(), hub.get_ref(), &user, form),
    )
}

#[delete("/invitations/{invitation_id}")]
pub async fn revoke_invitation(
    invitation_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond_empty(
        "revoke invitation",
        users_service::revoke_invitation(repo.get_ref(), &user, invitation_id.into_inner()),
    )
}
