use actix_web::{Responder, delete, get, post, put, web};

use crate::forms::clients::{AssignTeamForm, BulkClientsForm, ClientForm, ClientsQuery};
use crate::models::auth::AuthenticatedUser;
use crate::realtime::EventHub;
use crate::repository::DieselRepository;
use crate::routes::{respond, respond_created, respond_empty};
use crate::services::clients as clients_service;

#[get("/clients")]
pub async fn list_clients(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Query(query): web::Query<ClientsQuery>,
) -> impl Responder {
    respond(
        "list clients",
        clients_service::list_clients(repo.get_ref(), &user, query),
    )
}

#[post("/clients")]
pub async fn create_client(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
    web::Json(form): web::Json<ClientForm>,
) -> impl Responder {
    respond_created(
        "create client",
        clients_service::create_client(repo.get_ref(), hub.get_ref(), &user, form),
    )
}

#[post("/clients/bulk")]
pub async fn import_clients(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<BulkClientsForm>,
) -> impl Responder {
    respond_created(
        "import clients",
        clients_service::create_clients(repo.get_ref(), &user, form)
            .map(|created| serde_json::json!({ "created": created })),
    )
}

#[get("/clients/{client_id}")]
pub async fn show_client(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        "load client",
        clients_service::get_client(repo.get_ref(), &user, client_id.into_inner()),
    )
}

#[put("/clients/{client_id}")]
pub async fn update_client(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
    web::Json(form): web::Json<ClientForm>,
) -> impl Responder {
    respond(
        "update client",
        clients_service::update_client(
            repo.get_ref(),
            hub.get_ref(),
            &user,
            client_id.into_inner(),
            form,
        ),
    )
}

#[delete("/clients/{client_id}")]
pub async fn delete_client(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
) -> impl Responder {
    respond_empty(
        "delete client",
        clients_service::delete_client(repo.get_ref(), hub.get_ref(), &user, client_id.into_inner()),
    )
}

#[put("/clients/{client_id}/team")]
pub async fn assign_team(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
    web::Json(form): web::Json<AssignTeamForm>,
) -> impl Responder {
    respond(
        "assign client team",
        clients_service::assign_team(
            repo.get_ref(),
            hub.get_ref(),
            &user,
            client_id.into_inner(),
            form,
        ),
    )
}
