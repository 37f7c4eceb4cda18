use std::collections::HashMap;

use chrono::NaiveDate;

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        reservation::{HourlyCount, Reservation},
        spot::SpotWithReservations,
    },
    repository::{reservation as reservations, spot as spots},
    time,
};

/// Read side: plain pool reads, no locks. May trail in-flight bookings.
#[derive(Clone)]
pub struct AvailabilityView {
    db: DbPool,
}

impl AvailabilityView {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Every spot in id order, each with its active reservations touching
    /// `date` (today, UTC, when `None`).
    pub async fn get_spots_with_reservations(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<Vec<SpotWithReservations>, AppError> {
        let (day_start, day_end) = time::day_window(date.unwrap_or_else(time::today));

        let all_spots = spots::list_all(&self.db).await?;
        let active = reservations::find_active_in_range(&self.db, day_start, day_end).await?;

        let mut by_spot: HashMap<i64, Vec<Reservation>> = HashMap::new();
        for reservation in active {
            by_spot
                .entry(reservation.spot_id)
                .or_default()
                .push(reservation);
        }

        Ok(all_spots
            .into_iter()
            .map(|spot| SpotWithReservations {
                reservations: by_spot.remove(&spot.id).unwrap_or_default(),
                spot,
            })
            .collect())
    }

    pub async fn get_stats(&self) -> Result<Vec<HourlyCount>, AppError> {
        reservations::hourly_counts(&self.db).await
    }
}
