use chrono::{DateTime, Duration, SubsecRound, Utc};
use tracing::info;

use crate::{
    db::DbPool,
    error::AppError,
    models::reservation::{NewReservation, Reservation, ReservationStatus},
    repository::{reservation as reservations, spot as spots},
    time,
};

use super::{locks::SpotLocks, notifier::Notifier};

/// How far in the past a booking may start, to absorb clock skew and latency.
pub const GRACE_WINDOW_SECS: i64 = 5 * 60;

/// Owns every write to reservations. Each operation runs in one transaction;
/// an early return drops the transaction and rolls it back.
#[derive(Clone)]
pub struct BookingEngine {
    db: DbPool,
    locks: SpotLocks,
    notifier: Notifier,
}

impl BookingEngine {
    pub fn new(db: DbPool, notifier: Notifier) -> Self {
        Self {
            db,
            locks: SpotLocks::new(),
            notifier,
        }
    }

    pub async fn create_reservation(
        &self,
        user_id: i64,
        spot_id: i64,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Reservation, AppError> {
        let start_time = start_time.trunc_subsecs(0);
        let end_time = end_time.trunc_subsecs(0);
        if start_time < time::now() - Duration::seconds(GRACE_WINDOW_SECS) {
            return Err(AppError::InvalidTimeRange);
        }
        if start_time >= end_time {
            return Err(AppError::BadRequest(
                "end_time must be after start_time".into(),
            ));
        }

        // Unknown ids never reach the lock table.
        if !spots::exists(&self.db, spot_id).await? {
            return Err(AppError::SpotNotFound);
        }

        let reservation = {
            let _spot_guard = self.locks.acquire(spot_id).await;
            let mut tx = self.db.begin().await?;

            if !spots::lock(&mut *tx, spot_id).await? {
                return Err(AppError::SpotNotFound);
            }

            let overlapping =
                reservations::count_active_overlaps(&mut *tx, spot_id, start_time, end_time)
                    .await?;
            if overlapping > 0 {
                return Err(AppError::SlotConflict);
            }

            let new = NewReservation {
                spot_id,
                user_id,
                start_time,
                end_time,
            };
            let id = reservations::insert(&mut *tx, &new).await?;
            tx.commit().await?;

            Reservation {
                id,
                spot_id,
                user_id,
                start_time,
                end_time,
                status: ReservationStatus::Active,
            }
        };

        info!(
            reservation_id = reservation.id,
            spot_id, user_id, "reservation created"
        );
        self.notifier.notify(spot_id);
        Ok(reservation)
    }

    pub async fn complete_reservation(
        &self,
        user_id: i64,
        reservation_id: i64,
    ) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;

        if !reservations::lock(&mut *tx, reservation_id).await? {
            return Err(AppError::NotFound);
        }
        let reservation = reservations::find_by_id(&mut *tx, reservation_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if reservation.user_id != user_id {
            return Err(AppError::Forbidden);
        }
        if !reservation.is_active() {
            return Err(AppError::AlreadyCompleted);
        }

        reservations::mark_completed(&mut *tx, reservation_id).await?;
        tx.commit().await?;

        info!(reservation_id, spot_id = reservation.spot_id, user_id, "reservation completed");
        self.notifier.notify(reservation.spot_id);
        Ok(())
    }

    /// Completes every active reservation whose window ended before `now` and
    /// returns what was released.
    pub async fn release_expired(&self, now: DateTime<Utc>) -> Result<Vec<Reservation>, AppError> {
        let mut expired = reservations::complete_expired(&self.db, now).await?;
        expired.sort_by_key(|reservation| reservation.id);

        for reservation in &expired {
            info!(
                reservation_id = reservation.id,
                spot_id = reservation.spot_id,
                "auto-released stale reservation"
            );
            self.notifier
                .notify_with_status(reservation.spot_id, "available");
        }
        Ok(expired)
    }
}
