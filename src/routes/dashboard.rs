use actix_web::{Responder, get, web};

use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::respond;
use crate::services::dashboard as dashboard_service;

#[get("/dashboard/admin")]
pub async fn admin_dashboard(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
) -> impl Responder {
    respond(
        "load admin dashboard",
        dashboard_service::admin_dashboard(repo.get_ref(), &user, config.low_balance_threshold),
    )
}

#[get("/dashboard/me")]
pub async fn member_dashboard(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        "load member dashboard",
        dashboard_service::member_dashboard(repo.get_ref(), &user),
    )
}

#[get("/dashboard/clients/{client_id}")]
pub async fn client_dashboard(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        "load client dashboard",
        dashboard_service::client_dashboard(repo.get_ref(), &user, client_id.into_inner()),
    )
}
