use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::User;

/// Booking lifecycle. `Confirmed -> Cancelled` is the only legal
/// transition; there is no un-cancel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

/// A confirmed (or cancelled) seat purchase.
///
/// `passenger_name`/`passenger_email` are a snapshot of the owner's profile
/// at booking time and are never re-synced. `price_paid_cents` is the fare
/// computed at the instant of commit and is frozen for the lifetime of the
/// record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub pnr: String,
    pub user_id: Uuid,
    pub flight_id: Uuid,
    pub passenger_name: String,
    pub passenger_email: String,
    pub seat_number: String,
    pub price_paid_cents: i64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Flip to cancelled. Callers must have verified the current status;
    /// the ledger does so under the parent flight's exclusive lock.
    pub fn mark_cancelled(&mut self) {
        self.status = BookingStatus::Cancelled;
    }
}

/// Everything the lifecycle controller supplies for a commit. The ledger
/// assigns the PNR and stamps the record inside its exclusive scope.
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub user_id: Uuid,
    pub flight_id: Uuid,
    pub passenger_name: String,
    pub passenger_email: String,
    pub seat_number: String,
    pub price_paid_cents: i64,
}

impl BookingDraft {
    pub fn new(
        user: &User,
        flight_id: Uuid,
        seat_number: impl Into<String>,
        price_paid_cents: i64,
    ) -> Self {
        Self {
            user_id: user.id,
            flight_id,
            passenger_name: user.name.clone(),
            passenger_email: user.email.clone(),
            seat_number: seat_number.into(),
            price_paid_cents,
        }
    }

    /// Materialize the booking record once the ledger has reserved a PNR.
    pub fn into_booking(self, pnr: String) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            pnr,
            user_id: self.user_id,
            flight_id: self.flight_id,
            passenger_name: self.passenger_name,
            passenger_email: self.passenger_email,
            seat_number: self.seat_number,
            price_paid_cents: self.price_paid_cents,
            status: BookingStatus::Confirmed,
            created_at: Utc::now(),
        }
    }
}
