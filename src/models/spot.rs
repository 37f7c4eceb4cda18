use serde::Serialize;
use sqlx::FromRow;

use super::reservation::Reservation;

#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct Spot {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

/// A spot together with the active reservations touching the requested day.
#[derive(Debug, Clone, Serialize)]
pub struct SpotWithReservations {
    #[serde(flatten)]
    pub spot: Spot,
    pub reservations: Vec<Reservation>,
}
