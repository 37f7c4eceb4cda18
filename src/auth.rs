use std::time::Duration;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::AppError,
    models::user::UserSummary,
    repository::user as users,
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    uid: i64,
    exp: i64,
}

/// Issues and checks the bearer tokens handed out by `/api/login`.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, user_id: i64) -> Result<String, AppError> {
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            uid: user_id,
            exp: Utc::now().timestamp().saturating_add(ttl),
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| AppError::Other(err.into()))
    }

    /// Any decode, signature or expiry problem is `Unauthorized`.
    pub fn verify(&self, token: &str) -> Result<i64, AppError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims.uid)
            .map_err(|err| {
                debug!("rejected bearer token: {err}");
                AppError::Unauthorized
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i64,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Unauthorized)?;
        let app = AppState::from_ref(state);
        let id = app.tokens.verify(bearer.token())?;
        Ok(Self { id })
    }
}

pub async fn authenticate_user(
    state: &AppState,
    username: &str,
    password: &str,
) -> Result<UserSummary, AppError> {
    let user = users::find_by_username(&state.db, username.trim())
        .await?
        .ok_or(AppError::Unauthorized)?;
    if !verify_password(password, &user.password_hash) {
        return Err(AppError::Unauthorized);
    }
    Ok(user.into())
}

pub async fn register_user(
    state: &AppState,
    username: &str,
    password: &str,
) -> Result<UserSummary, AppError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest(
            "username and password are required".into(),
        ));
    }
    if users::find_by_username(&state.db, username).await?.is_some() {
        return Err(AppError::BadRequest("username already taken".into()));
    }

    let hash = hash_password(password)?;
    let id = users::insert(&state.db, username, &hash).await?;
    info!(user_id = id, username, "registered user");
    Ok(UserSummary {
        id,
        username: username.to_string(),
    })
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AppError::Other(anyhow::anyhow!("password hashing failed: {err}")))
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
