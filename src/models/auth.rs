//! Authenticated caller extracted from a signed session token.

use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::dev::Payload;
use actix_web::error::{ErrorInternalServerError, ErrorUnauthorized};
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, web};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::models::config::ServerConfig;

/// JWT claims identifying the caller and the workspace they act in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub sub: String,
    pub email: String,
    /// Workspace (tenant) the caller belongs to.
    pub hub_id: i32,
    pub name: String,
    pub roles: Vec<String>,
    pub exp: usize,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Moves the expiry `days` into the future.
    pub fn set_expiration(&mut self, days: i64) {
        let expires = Utc::now() + Duration::days(days);
        self.exp = usize::try_from(expires.timestamp()).unwrap_or(0);
    }

    pub fn to_jwt(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    pub fn from_jwt(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, actix_web::Error> {
    let config = req
        .app_data::<web::Data<ServerConfig>>()
        .ok_or_else(|| ErrorInternalServerError("server config is not registered"))?;

    let token = bearer_token(req)
        .or_else(|| {
            req.get_identity()
                .ok()
                .and_then(|identity| identity.id().ok())
        })
        .ok_or_else(|| ErrorUnauthorized("missing credentials"))?;

    AuthenticatedUser::from_jwt(&token, &config.secret).map_err(|err| {
        log::warn!("Rejected session token: {err}");
        ErrorUnauthorized("invalid or expired token")
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> AuthenticatedUser {
        let mut user = AuthenticatedUser {
            sub: "7".into(),
            email: "admin@agency.io".into(),
            hub_id: 1,
            name: "Admin".into(),
            roles: vec!["agency".into(), "agency_admin".into()],
            exp: 0,
        };
        user.set_expiration(1);
        user
    }

    #[test]
    fn token_round_trip_with_same_secret() {
        let token = user().to_jwt("secret").unwrap();
        let decoded = AuthenticatedUser::from_jwt(&token, "secret").unwrap();
        assert_eq!(decoded, user_with_exp(decoded.exp));
        assert!(AuthenticatedUser::from_jwt(&token, "other").is_err());
    }

    fn user_with_exp(exp: usize) -> AuthenticatedUser {
        AuthenticatedUser { exp, ..user() }
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut expired = user();
        expired.set_expiration(-2);
        let token = expired.to_jwt("secret").unwrap();
        assert!(AuthenticatedUser::from_jwt(&token, "secret").is_err());
    }
}
