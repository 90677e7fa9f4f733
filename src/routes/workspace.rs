use actix_web::{Responder, get, put, web};

use crate::forms::workspace::RenameWorkspaceForm;
use crate::models::auth::AuthenticatedUser;
use crate::realtime::EventHub;
use crate::repository::DieselRepository;
use crate::routes::respond;
use crate::services::workspaces as workspaces_service;

#[get("/workspace")]
pub async fn show_workspace(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        "load workspace",
        workspaces_service::get_workspace(repo.get_ref(), &user),
    )
}

#[put("/workspace")]
pub async fn rename_workspace(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
    web::Json(form): web::Json<RenameWorkspaceForm>,
) -> impl Responder {
    respond(
        "rename workspace",
        workspaces_service::rename_workspace(repo.get_ref(), hub.get_ref(), &user, form),
    )
}
