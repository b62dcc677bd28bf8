use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A scheduled flight together with its seat inventory counters.
///
/// `seats_available` is only ever mutated by the seat ledger while the
/// flight's exclusive lock is held; everything else is immutable after
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    pub id: Uuid,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    /// Base fare in minor currency units (cents).
    pub base_price_cents: i64,
    pub total_seats: u32,
    pub seats_available: u32,
}

impl Flight {
    /// Create a flight with a full cabin.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        flight_number: impl Into<String>,
        origin: impl Into<String>,
        destination: impl Into<String>,
        departure_time: DateTime<Utc>,
        arrival_time: DateTime<Utc>,
        base_price_cents: i64,
        total_seats: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            flight_number: flight_number.into(),
            origin: origin.into(),
            destination: destination.into(),
            departure_time,
            arrival_time,
            base_price_cents,
            total_seats,
            seats_available: total_seats,
        }
    }

    /// Fraction of capacity already booked, in `0.0..=1.0`.
    ///
    /// A zero-capacity flight counts as full rather than dividing by zero;
    /// capacity is positive by invariant, so this is a guard, not a case.
    pub fn occupancy(&self) -> f64 {
        if self.total_seats == 0 {
            return 1.0;
        }
        1.0 - (self.seats_available as f64 / self.total_seats as f64)
    }

    /// Scheduled time in the air.
    pub fn duration(&self) -> Duration {
        self.arrival_time - self.departure_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flight(total: u32, available: u32) -> Flight {
        let mut f = Flight::new(
            "SK100",
            "New York (JFK)",
            "Los Angeles (LAX)",
            Utc::now() + Duration::days(30),
            Utc::now() + Duration::days(30) + Duration::hours(5),
            35_000,
            total,
        );
        f.seats_available = available;
        f
    }

    #[test]
    fn test_occupancy_ratio() {
        assert_eq!(flight(100, 100).occupancy(), 0.0);
        assert_eq!(flight(100, 50).occupancy(), 0.5);
        assert_eq!(flight(100, 0).occupancy(), 1.0);
    }

    #[test]
    fn test_zero_capacity_counts_as_full() {
        assert_eq!(flight(0, 0).occupancy(), 1.0);
    }
}
