use actix_web::{Responder, delete, get, post, put, web};

use crate::forms::deliverables::{
    AllocationForm, DeliverableForm, DeliverablesQuery, MoveDeliverableForm,
    UpdateDeliverableForm,
};
use crate::models::auth::AuthenticatedUser;
use crate::realtime::EventHub;
use crate::repository::DieselRepository;
use crate::routes::{respond, respond_created, respond_empty};
use crate::services::deliverables as deliverables_service;

#[get("/deliverables")]
pub async fn list_deliverables(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Query(query): web::Query<DeliverablesQuery>,
) -> impl Responder {
    respond(
        "list deliverables",
        deliverables_service::list_deliverables(repo.get_ref(), &user, query),
    )
}

#[get("/deliverables/board")]
pub async fn kanban_board(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Query(query): web::Query<DeliverablesQuery>,
) -> impl Responder {
    respond(
        "build kanban board",
        deliverables_service::kanban_board(repo.get_ref(), &user, query),
    )
}

#[post("/deliverables")]
pub async fn create_deliverable(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
    web::Json(form): web::Json<DeliverableForm>,
) -> impl Responder {
    respond_created(
        "create deliverable",
        deliverables_service::create_deliverable(repo.get_ref(), hub.get_ref(), &user, form),
    )
}

#[put("/deliverables/{deliverable_id}")]
pub async fn update_deliverable(
    deliverable_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
    web::Json(form): web::Json<UpdateDeliverableForm>,
) -> impl Responder {
    respond(
        "update deliverable",
        deliverables_service::update_deliverable(
            repo.get_ref(),
            hub.get_ref(),
            &user,
            deliverable_id.into_inner(),
            form,
        ),
    )
}

#[delete("/deliverables/{deliverable_id}")]
pub async fn delete_deliverable(
    deliverable_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
) -> impl Responder {
    respond_empty(
        "delete deliverable",
        deliverables_service::delete_deliverable(
            repo.get_ref(),
            hub.get_ref(),
            &user,
            deliverable_id.into_inner(),
        ),
    )
}

#[post("/deliverables/{deliverable_id}/move")]
pub async fn move_deliverable(
    deliverable_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
    web::Json(form): web::Json<MoveDeliverableForm>,
) -> impl Responder {
    respond(
        "move deliverable",
        deliverables_service::move_deliverable(
            repo.get_ref(),
            hub.get_ref(),
            &user,
            deliverable_id.into_inner(),
            form,
        ),
    )
}

#[get("/clients/{client_id}/packages")]
pub async fn package_usage(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        "load package usage",
        deliverables_service::package_usage(repo.get_ref(), &user, client_id.into_inner()),
    )
}

#[put("/clients/{client_id}/packages")]
pub async fn set_allocation(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
    web::Json(form): web::Json<AllocationForm>,
) -> impl Responder {
    respond(
        "set package allocation",
        deliverables_service::set_allocation(
            repo.get_ref(),
            hub.get_ref(),
            &user,
            client_id.into_inner(),
            form,
        ),
    )
}
