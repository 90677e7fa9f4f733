use actix_web::{Responder, get, post, put, web};

use crate::forms::campaigns::{CampaignForm, CampaignStatusForm, CampaignsQuery, SpendForm};
use crate::models::auth::AuthenticatedUser;
use crate::realtime::EventHub;
use crate::repository::DieselRepository;
use crate::routes::{respond, respond_created};
use crate::services::campaigns as campaigns_service;

#[get("/campaigns")]
pub async fn list_campaigns(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Query(query): web::Query<CampaignsQuery>,
) -> impl Responder {
    respond(
        "list campaigns",
        campaigns_service::list_campaigns(repo.get_ref(), &user, query),
    )
}

#[get("/campaigns/summary")]
pub async fn campaign_summary(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Query(query): web::Query<CampaignsQuery>,
) -> impl Responder {
    respond(
        "summarize campaigns",
        campaigns_service::campaign_summary(repo.get_ref(), &user, query),
    )
}

#[post("/campaigns")]
pub async fn create_campaign(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
    web::Json(form): web::Json<CampaignForm>,
) -> impl Responder {
    respond_created(
        "create campaign",
        campaigns_service::create_campaign(repo.get_ref(), hub.get_ref(), &user, form),
    )
}

#[put("/campaigns/{campaign_id}/status")]
pub async fn update_campaign_status(
    campaign_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
    web::Json(form): web::Json<CampaignStatusForm>,
) -> impl Responder {
    respond(
        "update campaign status",
        campaigns_service::update_campaign_status(
            repo.get_ref(),
            hub.get_ref(),
            &user,
            campaign_id.into_inner(),
            form,
        ),
    )
}

#[post("/campaigns/{campaign_id}/spend")]
pub async fn record_spend(
    campaign_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    hub: web::Data<EventHub>,
    web::Json(form): web::Json<SpendForm>,
) -> impl Responder {
    respond(
        "record campaign spend",
        campaigns_service::record_spend(
            repo.get_ref(),
            hub.get_ref(),
            &user,
            campaign_id.into_inner(),
            form,
        ),
    )
}
