use actix_identity::Identity;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, post, web};
use serde::Deserialize;

use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::routes::error_response;
use crate::services::ServiceError;

#[derive(Deserialize)]
pub struct SessionForm {
    pub token: String,
}

/// Stores a token issued by the auth service in the identity cookie.
#[post("/session")]
pub async fn open_session(
    req: HttpRequest,
    config: web::Data<ServerConfig>,
    web::Json(form): web::Json<SessionForm>,
) -> impl Responder {
    let user = match AuthenticatedUser::from_jwt(&form.token, &config.secret) {
        Ok(user) => user,
        Err(err) => {
            log::warn!("Rejected session token: {err}");
            return HttpResponse::Unauthorized()
                .json(serde_json::json!({ "error": "invalid token" }));
        }
    };

    match Identity::login(&req.extensions(), form.token) {
        Ok(_) => HttpResponse::Ok().json(user),
        Err(err) => {
            log::error!("Failed to open session for {}: {err}", user.email);
            error_response(&ServiceError::Internal(err.to_string()))
        }
    }
}

#[post("/logout")]
pub async fn logout(identity: Identity) -> impl Responder {
    identity.logout();
    HttpResponse::NoContent().finish()
}
