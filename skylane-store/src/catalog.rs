use std::sync::Arc;

use chrono::{Days, Duration, NaiveDate, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use skylane_core::{DomainError, DomainResult, Flight};

use crate::ledger::SeatLedger;

/// Search ordering accepted by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Price,
    Duration,
}

/// Capacity assigned to every synthesized flight (a standard narrow-body).
const STANDARD_CAPACITY: u32 = 180;

/// Flight-number draws before provisioning gives up.
const FLIGHT_NUMBER_MAX_ATTEMPTS: usize = 8;

/// Search over flight inventory, synthesizing a bookable flight when a
/// route/date has none.
///
/// Synthesis is a product simulation feature, not a cache: the generated
/// flight is permanently inserted into the ledger and can be booked like
/// any seeded one.
pub struct FlightCatalog {
    ledger: Arc<SeatLedger>,
}

impl FlightCatalog {
    pub fn new(ledger: Arc<SeatLedger>) -> Self {
        Self { ledger }
    }

    /// Find flights by case-insensitive substring on origin/destination and
    /// exact calendar date of departure. An empty result provisions exactly
    /// one new flight for the route and returns it.
    pub async fn search(
        &self,
        origin: &str,
        destination: &str,
        date: NaiveDate,
        sort: SortKey,
    ) -> DomainResult<Vec<Flight>> {
        let origin_needle = origin.to_lowercase();
        let destination_needle = destination.to_lowercase();

        let mut matches: Vec<Flight> = self
            .ledger
            .list_flights()
            .await
            .into_iter()
            .filter(|f| {
                f.origin.to_lowercase().contains(&origin_needle)
                    && f.destination.to_lowercase().contains(&destination_needle)
                    && f.departure_time.date_naive() == date
            })
            .collect();

        if matches.is_empty() {
            let flight = self.provision(origin, destination, date).await?;
            return Ok(vec![flight]);
        }

        match sort {
            SortKey::Price => matches.sort_by_key(|f| f.base_price_cents),
            SortKey::Duration => matches.sort_by_key(|f| f.duration()),
        }
        Ok(matches)
    }

    /// Every flight in inventory, ordered by departure.
    pub async fn list_all(&self) -> Vec<Flight> {
        let mut flights = self.ledger.list_flights().await;
        flights.sort_by_key(|f| f.departure_time);
        flights
    }

    pub async fn get(&self, flight_id: Uuid) -> DomainResult<Flight> {
        self.ledger.get_flight(flight_id).await
    }

    /// Insert a plausible new flight for the route/date.
    ///
    /// Dates already in the past clamp forward to tomorrow. Flight-number
    /// collisions retry with a wider numeric suffix; the ledger's table
    /// lock makes the number check-and-insert atomic.
    async fn provision(
        &self,
        origin: &str,
        destination: &str,
        date: NaiveDate,
    ) -> DomainResult<Flight> {
        let today = Utc::now().date_naive();
        let date = if date < today {
            today + Days::new(1)
        } else {
            date
        };

        for attempt in 0..FLIGHT_NUMBER_MAX_ATTEMPTS {
            let flight = {
                let mut rng = rand::thread_rng();
                synthesize_flight(&mut rng, origin, destination, date, attempt)?
            };
            match self.ledger.insert_flight(flight).await {
                Ok(flight) => {
                    tracing::info!(
                        flight = %flight.flight_number,
                        origin = %flight.origin,
                        destination = %flight.destination,
                        departure = %flight.departure_time,
                        "auto-provisioned flight"
                    );
                    return Ok(flight);
                }
                Err(DomainError::DuplicateFlightNumber(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(DomainError::Transient(
            "could not allocate a unique flight number".to_string(),
        ))
    }
}

/// Draw a schedule and fare for a synthetic flight.
fn synthesize_flight<R: Rng + ?Sized>(
    rng: &mut R,
    origin: &str,
    destination: &str,
    date: NaiveDate,
    attempt: usize,
) -> DomainResult<Flight> {
    // Departures land in a business-hours window on quarter-hour marks.
    let hour = rng.gen_range(8..=20);
    let minute = [0u32, 15, 30, 45].choose(rng).copied().unwrap_or(0);
    let departure = date
        .and_hms_opt(hour, minute, 0)
        .ok_or_else(|| DomainError::Internal("invalid synthesized departure".to_string()))?
        .and_utc();

    let duration_minutes = rng.gen_range(180..=360);
    let arrival = departure + Duration::minutes(duration_minutes);

    // Longer flights price higher, with jitter so repeated routes differ.
    let base_price_cents = duration_minutes * 75 + rng.gen_range(0..8_000);

    Ok(Flight::new(
        draw_flight_number(rng, attempt),
        origin,
        destination,
        departure,
        arrival,
        base_price_cents,
        STANDARD_CAPACITY,
    ))
}

fn draw_flight_number<R: Rng + ?Sized>(rng: &mut R, attempt: usize) -> String {
    let letters: String = (0..2).map(|_| (b'A' + rng.gen_range(0..26)) as char).collect();
    // First draw uses the familiar 3-digit range; collisions widen it.
    let number = if attempt == 0 {
        rng.gen_range(100..1_000)
    } else {
        rng.gen_range(1_000..10_000)
    };
    format!("{letters}{number}")
}
