use std::future::Future;
use std::pin::Pin;

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use uuid::Uuid;

use crate::error::AppError;
use crate::services::IdentityResolver;

/// Caller identity resolved from the `Authorization: Bearer` header
///
/// Needs a `web::Data<IdentityResolver>` registered on the app.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let resolver = req.app_data::<web::Data<IdentityResolver>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let resolver = resolver
                .ok_or_else(|| AppError::Internal("Identity resolver not configured".to_string()))?;
            let token = token
                .ok_or_else(|| AppError::Unauthenticated("Authorization token required".to_string()))?;

            let id = resolver.resolve(&token).await?;
            Ok(AuthUser { id })
        })
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}
