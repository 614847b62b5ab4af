use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use uuid::Uuid;

use crate::auth::{decode_token, extract_token};
use crate::config::AuthConfig;
use crate::errors::AppError;

/// Extractor that validates the Bearer token and provides the authenticated user's ID.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let auth = req
        .app_data::<web::Data<AuthConfig>>()
        .ok_or_else(|| AppError::InternalError("Auth config not registered".to_string()))?;

    let token = extract_token(req)?;
    let claims = decode_token(&token, &auth.jwt_secret)?;

    Ok(AuthenticatedUser {
        user_id: claims.sub,
    })
}
