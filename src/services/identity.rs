use std::time::Duration;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::AppError;

/// Claims carried by access tokens issued by the auth service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(alias = "user_id")]
    pub sub: Uuid,
    pub exp: i64,
}

/// Verifies HS256 access tokens locally with the shared secret
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Uuid, AppError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthenticated("Token has expired".to_string())
                }
                _ => AppError::Unauthenticated("Invalid or expired token".to_string()),
            }
        })?;

        Ok(data.claims.sub)
    }
}

/// Asks the auth service who a bearer token belongs to
///
/// Calls `GET {base_url}/me` and reads `user.id` from the response body.
#[derive(Clone)]
pub struct RemoteIdentityClient {
    base_url: String,
    client: Client,
}

impl RemoteIdentityClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { base_url, client })
    }

    pub async fn resolve(&self, token: &str) -> Result<Uuid, AppError> {
        let url = format!("{}/me", self.base_url.trim_end_matches('/'));

        tracing::debug!("Resolving identity via {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Auth service unreachable: {}", e)))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                return Err(AppError::Unauthenticated("Invalid or expired token".to_string()));
            }
            status => {
                return Err(AppError::Internal(format!("Auth service returned {}", status)));
            }
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Invalid auth service response: {}", e)))?;

        json.get("user")
            .and_then(|u| u.get("id"))
            .and_then(|id| id.as_str())
            .and_then(|id| Uuid::parse_str(id).ok())
            .ok_or_else(|| AppError::Internal("Auth service response missing user.id".to_string()))
    }
}

/// Resolves a bearer token to a user id
#[derive(Clone)]
pub enum IdentityResolver {
    Jwt(JwtVerifier),
    Remote(RemoteIdentityClient),
}

impl IdentityResolver {
    pub async fn resolve(&self, token: &str) -> Result<Uuid, AppError> {
        match self {
            IdentityResolver::Jwt(verifier) => verifier.verify(token),
            IdentityResolver::Remote(client) => client.resolve(token).await,
        }
    }
}
