use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{auth::AuthenticatedUser, error::AppError, state::AppState, time};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/:id/complete", put(complete))
}

#[derive(Deserialize)]
struct CreateReservationRequest {
    spot_id: i64,
    #[serde(deserialize_with = "time::deserialize_timestamp")]
    start_time: DateTime<Utc>,
    #[serde(deserialize_with = "time::deserialize_timestamp")]
    end_time: DateTime<Utc>,
}

async fn create(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let reservation = state
        .booking
        .create_reservation(user.id, body.spot_id, body.start_time, body.end_time)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Reservation created", "id": reservation.id })),
    ))
}

async fn complete(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(reservation_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    state
        .booking
        .complete_reservation(user.id, reservation_id)
        .await?;
    Ok(Json(json!({ "message": "Reservation completed" })))
}
