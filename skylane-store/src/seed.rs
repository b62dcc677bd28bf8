use chrono::{DateTime, Duration, Utc};

use skylane_core::{DomainResult, Flight};

use crate::ledger::SeatLedger;

/// Seed inventory for fresh processes: a small spread of US trunk routes
/// over the coming weeks so searches and demos have something to hit
/// before auto-provisioning kicks in.
pub async fn seed_flights(ledger: &SeatLedger, now: DateTime<Utc>) -> DomainResult<usize> {
    let day = |days: i64, hour: i64| now.date_naive().and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc() + Duration::days(days) + Duration::hours(hour));

    let schedule = [
        ("AA100", "New York (JFK)", "Los Angeles (LAX)", 14, 9, 6, 35_000_i64, 160_u32),
        ("UA200", "Chicago (ORD)", "Miami (MIA)", 15, 14, 3, 22_000, 140),
        ("DL300", "Los Angeles (LAX)", "New York (JFK)", 14, 14, 5, 36_000, 160),
        ("AA101", "New York (JFK)", "Los Angeles (LAX)", 16, 11, 6, 34_000, 160),
    ];

    let mut inserted = 0;
    for (number, origin, destination, days_out, hour, hours, price, seats) in schedule {
        let departure = day(days_out, hour).ok_or_else(|| {
            skylane_core::DomainError::Internal("invalid seed departure".to_string())
        })?;
        let flight = Flight::new(
            number,
            origin,
            destination,
            departure,
            departure + Duration::hours(hours),
            price,
            seats,
        );
        ledger.insert_flight(flight).await?;
        inserted += 1;
    }

    tracing::info!(flights = inserted, "seeded flight inventory");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_populates_future_inventory() {
        let ledger = SeatLedger::default();
        let count = seed_flights(&ledger, Utc::now()).await.unwrap();
        assert_eq!(count, 4);

        let flights = ledger.list_flights().await;
        assert_eq!(flights.len(), count);
        for flight in flights {
            assert!(flight.departure_time > Utc::now());
            assert!(flight.arrival_time > flight.departure_time);
            assert_eq!(flight.seats_available, flight.total_seats);
        }
    }
}
