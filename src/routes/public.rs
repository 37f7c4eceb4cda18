use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    auth,
    error::AppError,
    models::{reservation::HourlyCount, spot::SpotWithReservations, user::UserSummary},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/login", post(login))
        .route("/spots", get(spots))
        .route("/stats", get(stats))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    success: bool,
    token: String,
    user: UserSummary,
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = auth::authenticate_user(&state, &body.username, &body.password).await?;
    let token = state.tokens.issue(user.id)?;
    Ok(Json(LoginResponse {
        success: true,
        token,
        user,
    }))
}

#[derive(Deserialize)]
struct SpotsQuery {
    date: Option<NaiveDate>,
}

async fn spots(
    State(state): State<AppState>,
    Query(query): Query<SpotsQuery>,
) -> Result<Json<Vec<SpotWithReservations>>, AppError> {
    let spots = state
        .availability
        .get_spots_with_reservations(query.date)
        .await?;
    Ok(Json(spots))
}

async fn stats(State(state): State<AppState>) -> Result<Json<Vec<HourlyCount>>, AppError> {
    Ok(Json(state.availability.get_stats().await?))
}
