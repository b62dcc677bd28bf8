use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio::time::timeout;
use uuid::Uuid;

use skylane_core::pnr;
use skylane_core::{Booking, BookingDraft, BookingStatus, DomainError, DomainResult, Flight};

/// Default bound on waiting for a flight's exclusive lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Default)]
struct FlightTable {
    by_id: HashMap<Uuid, Arc<Mutex<Flight>>>,
    numbers: HashSet<String>,
}

#[derive(Default)]
struct BookingTable {
    by_id: HashMap<Uuid, Booking>,
    by_pnr: HashMap<String, Uuid>,
}

/// The authoritative, concurrency-safe record of seat inventory and
/// bookings.
///
/// Every seat-count mutation runs under the flight's exclusive lock, and a
/// booking insert + decrement (or cancel + increment) is committed as one
/// atomic unit. Lock acquisition is bounded: a request that cannot get the
/// lock in time is rejected as transient with no partial state.
pub struct SeatLedger {
    flights: RwLock<FlightTable>,
    bookings: RwLock<BookingTable>,
    lock_timeout: Duration,
}

/// An exclusively held flight, handed out by [`SeatLedger::reserve`].
///
/// The seat is not decremented yet; pricing reads the flight through the
/// reservation while it is held, so every previously committed decrement is
/// visible. Dropping the reservation without committing releases the flight
/// untouched.
#[derive(Debug)]
pub struct SeatReservation {
    guard: OwnedMutexGuard<Flight>,
}

impl SeatReservation {
    /// The flight's live state while exclusively held.
    pub fn flight(&self) -> &Flight {
        &self.guard
    }
}

impl SeatLedger {
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            flights: RwLock::new(FlightTable::default()),
            bookings: RwLock::new(BookingTable::default()),
            lock_timeout,
        }
    }

    /// Register a flight. Flight numbers are unique across the ledger;
    /// the check and the insert happen under one table lock, so two
    /// concurrent provisioners cannot both win the same number.
    pub async fn insert_flight(&self, flight: Flight) -> DomainResult<Flight> {
        if flight.arrival_time <= flight.departure_time {
            return Err(DomainError::Validation(
                "arrival must be after departure".to_string(),
            ));
        }
        if flight.total_seats == 0 {
            return Err(DomainError::Validation(
                "total_seats must be positive".to_string(),
            ));
        }
        if flight.seats_available > flight.total_seats {
            return Err(DomainError::Validation(
                "seats_available exceeds capacity".to_string(),
            ));
        }

        let mut table = self.flights.write().await;
        if !table.numbers.insert(flight.flight_number.clone()) {
            return Err(DomainError::DuplicateFlightNumber(
                flight.flight_number.clone(),
            ));
        }
        table
            .by_id
            .insert(flight.id, Arc::new(Mutex::new(flight.clone())));
        Ok(flight)
    }

    /// Current snapshot of one flight.
    pub async fn get_flight(&self, flight_id: Uuid) -> DomainResult<Flight> {
        let slot = self.flight_slot(flight_id).await.ok_or(DomainError::NotFound)?;
        let flight = slot.lock().await;
        Ok(flight.clone())
    }

    /// Snapshots of every flight. Advisory: counters may move as soon as
    /// the snapshot is taken.
    pub async fn list_flights(&self) -> Vec<Flight> {
        let slots: Vec<Arc<Mutex<Flight>>> = {
            let table = self.flights.read().await;
            table.by_id.values().cloned().collect()
        };

        let mut flights = Vec::with_capacity(slots.len());
        for slot in slots {
            flights.push(slot.lock().await.clone());
        }
        flights
    }

    /// Acquire the flight exclusively and verify a seat is still open.
    ///
    /// Does not decrement: the decrement and the booking insert happen
    /// together in [`commit`](Self::commit), so there is never a window
    /// where a seat is held without a booking record.
    pub async fn reserve(&self, flight_id: Uuid) -> DomainResult<SeatReservation> {
        let slot = self.flight_slot(flight_id).await.ok_or(DomainError::NotFound)?;
        let guard = self.lock_flight(slot).await?;

        if guard.seats_available == 0 {
            return Err(DomainError::SoldOut);
        }
        Ok(SeatReservation { guard })
    }

    /// Atomically assign a PNR, decrement the seat counter and insert the
    /// booking row. All-or-nothing: if no unused PNR can be drawn within
    /// the retry bound, counters and tables are left untouched.
    pub async fn commit(
        &self,
        reservation: SeatReservation,
        draft: BookingDraft,
    ) -> DomainResult<Booking> {
        let SeatReservation { mut guard } = reservation;

        if draft.flight_id != guard.id {
            return Err(DomainError::Internal(
                "reservation does not match the booking's flight".to_string(),
            ));
        }
        // Re-check under the exclusive scope before touching anything.
        if guard.seats_available == 0 {
            return Err(DomainError::SoldOut);
        }

        let mut bookings = self.bookings.write().await;
        let pnr = {
            let mut rng = rand::thread_rng();
            pnr::unique_pnr(&mut rng, |candidate| {
                bookings.by_pnr.contains_key(candidate)
            })?
        };
        let booking = draft.into_booking(pnr);

        // Decrement and insert are observed together or not at all: both
        // happen while the flight guard and the booking table lock are held.
        guard.seats_available -= 1;
        bookings.by_pnr.insert(booking.pnr.clone(), booking.id);
        bookings.by_id.insert(booking.id, booking.clone());

        tracing::info!(
            pnr = %booking.pnr,
            flight = %guard.flight_number,
            seats_left = guard.seats_available,
            "booking committed"
        );
        Ok(booking)
    }

    /// Atomically flip a booking to cancelled and return its seat.
    ///
    /// Lookup is owner-scoped: a PNR belonging to another user is
    /// indistinguishable from a missing one.
    pub async fn cancel(&self, pnr: &str, user_id: Uuid) -> DomainResult<Booking> {
        let (booking_id, flight_id) = {
            let bookings = self.bookings.read().await;
            let id = *bookings.by_pnr.get(pnr).ok_or(DomainError::NotFound)?;
            let booking = bookings.by_id.get(&id).ok_or(DomainError::NotFound)?;
            if booking.user_id != user_id {
                return Err(DomainError::NotFound);
            }
            (id, booking.flight_id)
        };

        let slot = self
            .flight_slot(flight_id)
            .await
            .ok_or_else(|| DomainError::Internal("booking references a missing flight".to_string()))?;
        let mut guard = self.lock_flight(slot).await?;

        // Status flips for a booking serialize on its flight's lock, so a
        // racing second cancel observes CANCELLED here.
        let mut bookings = self.bookings.write().await;
        let booking = bookings
            .by_id
            .get_mut(&booking_id)
            .ok_or(DomainError::NotFound)?;
        if booking.user_id != user_id {
            return Err(DomainError::NotFound);
        }
        if booking.status == BookingStatus::Cancelled {
            return Err(DomainError::AlreadyCancelled);
        }

        booking.mark_cancelled();
        guard.seats_available += 1;
        debug_assert!(guard.seats_available <= guard.total_seats);

        tracing::info!(
            pnr = %booking.pnr,
            flight = %guard.flight_number,
            seats_left = guard.seats_available,
            "booking cancelled"
        );
        Ok(booking.clone())
    }

    /// All bookings owned by `user_id`, most recent first.
    pub async fn bookings_for_user(&self, user_id: Uuid) -> Vec<Booking> {
        let bookings = self.bookings.read().await;
        let mut owned: Vec<Booking> = bookings
            .by_id
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        owned
    }

    /// Owner-scoped lookup by PNR.
    pub async fn booking_by_pnr(&self, pnr: &str, user_id: Uuid) -> DomainResult<Booking> {
        let bookings = self.bookings.read().await;
        let id = bookings.by_pnr.get(pnr).ok_or(DomainError::NotFound)?;
        let booking = bookings.by_id.get(id).ok_or(DomainError::NotFound)?;
        if booking.user_id != user_id {
            return Err(DomainError::NotFound);
        }
        Ok(booking.clone())
    }

    async fn flight_slot(&self, flight_id: Uuid) -> Option<Arc<Mutex<Flight>>> {
        let table = self.flights.read().await;
        table.by_id.get(&flight_id).cloned()
    }

    async fn lock_flight(&self, slot: Arc<Mutex<Flight>>) -> DomainResult<OwnedMutexGuard<Flight>> {
        timeout(self.lock_timeout, slot.lock_owned())
            .await
            .map_err(|_| {
                DomainError::Transient("timed out waiting for the flight lock".to_string())
            })
    }
}

impl Default for SeatLedger {
    fn default() -> Self {
        Self::new(DEFAULT_LOCK_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};
    use skylane_core::User;

    fn test_flight(seats: u32) -> Flight {
        let departure = Utc::now() + ChronoDuration::days(21);
        Flight::new(
            format!("SK{}", rand::random::<u16>()),
            "New York (JFK)",
            "Los Angeles (LAX)",
            departure,
            departure + ChronoDuration::hours(5),
            35_000,
            seats,
        )
    }

    fn test_user(email: &str) -> User {
        User::new("Test Passenger", email, "hash")
    }

    async fn book(
        ledger: &SeatLedger,
        user: &User,
        flight_id: Uuid,
    ) -> DomainResult<Booking> {
        let reservation = ledger.reserve(flight_id).await?;
        let draft = BookingDraft::new(user, flight_id, "14C", 40_000);
        ledger.commit(reservation, draft).await
    }

    #[tokio::test]
    async fn test_book_and_cancel_roundtrip() {
        let ledger = SeatLedger::default();
        let flight = ledger.insert_flight(test_flight(10)).await.unwrap();
        let user = test_user("round@example.com");

        let booking = book(&ledger, &user, flight.id).await.unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(ledger.get_flight(flight.id).await.unwrap().seats_available, 9);

        let cancelled = ledger.cancel(&booking.pnr, user.id).await.unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert_eq!(ledger.get_flight(flight.id).await.unwrap().seats_available, 10);
    }

    #[tokio::test]
    async fn test_double_cancel_conflicts_without_seat_change() {
        let ledger = SeatLedger::default();
        let flight = ledger.insert_flight(test_flight(5)).await.unwrap();
        let user = test_user("twice@example.com");

        let booking = book(&ledger, &user, flight.id).await.unwrap();
        ledger.cancel(&booking.pnr, user.id).await.unwrap();

        let err = ledger.cancel(&booking.pnr, user.id).await.unwrap_err();
        assert!(matches!(err, DomainError::AlreadyCancelled));
        assert_eq!(ledger.get_flight(flight.id).await.unwrap().seats_available, 5);
    }

    #[tokio::test]
    async fn test_ownership_isolation() {
        let ledger = SeatLedger::default();
        let flight = ledger.insert_flight(test_flight(5)).await.unwrap();
        let owner = test_user("owner@example.com");
        let stranger = test_user("stranger@example.com");

        let booking = book(&ledger, &owner, flight.id).await.unwrap();

        let err = ledger.booking_by_pnr(&booking.pnr, stranger.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound));
        let err = ledger.cancel(&booking.pnr, stranger.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound));

        // The foreign attempt must not have touched the booking.
        let booking = ledger.booking_by_pnr(&booking.pnr, owner.id).await.unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_no_oversell_under_contention() {
        let ledger = Arc::new(SeatLedger::default());
        let flight = ledger.insert_flight(test_flight(5)).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..32 {
            let ledger = ledger.clone();
            let flight_id = flight.id;
            handles.push(tokio::spawn(async move {
                let user = test_user(&format!("rush{i}@example.com"));
                book(&ledger, &user, flight_id).await
            }));
        }

        let mut confirmed = 0;
        let mut sold_out = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => confirmed += 1,
                Err(DomainError::SoldOut) => sold_out += 1,
                Err(other) => panic!("unexpected failure: {other}"),
            }
        }

        assert_eq!(confirmed, 5);
        assert_eq!(sold_out, 27);
        assert_eq!(ledger.get_flight(flight.id).await.unwrap().seats_available, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_conservation_under_mixed_traffic() {
        let ledger = Arc::new(SeatLedger::default());
        let flight = ledger.insert_flight(test_flight(20)).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let ledger = ledger.clone();
            let flight_id = flight.id;
            handles.push(tokio::spawn(async move {
                let user = test_user(&format!("mix{i}@example.com"));
                let booking = book(&ledger, &user, flight_id).await?;
                if i % 3 == 0 {
                    ledger.cancel(&booking.pnr, user.id).await?;
                }
                Ok::<_, DomainError>(user.id)
            }));
        }

        let mut user_ids = Vec::new();
        for handle in handles {
            user_ids.push(handle.await.unwrap().unwrap());
        }

        let mut confirmed = 0;
        for user_id in user_ids {
            confirmed += ledger
                .bookings_for_user(user_id)
                .await
                .iter()
                .filter(|b| b.status == BookingStatus::Confirmed)
                .count() as u32;
        }
        let flight = ledger.get_flight(flight.id).await.unwrap();
        assert_eq!(flight.seats_available + confirmed, flight.total_seats);
    }

    #[tokio::test]
    async fn test_reserve_unknown_flight_is_not_found() {
        let ledger = SeatLedger::default();
        let err = ledger.reserve(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound));
    }

    #[tokio::test]
    async fn test_lock_timeout_surfaces_transient() {
        let ledger = SeatLedger::new(Duration::from_millis(20));
        let flight = ledger.insert_flight(test_flight(3)).await.unwrap();

        let held = ledger.reserve(flight.id).await.unwrap();
        let err = ledger.reserve(flight.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Transient(_)));

        // Releasing the reservation without committing leaves the counter
        // untouched and unblocks the next caller.
        drop(held);
        assert!(ledger.reserve(flight.id).await.is_ok());
        assert_eq!(ledger.get_flight(flight.id).await.unwrap().seats_available, 3);
    }

    #[tokio::test]
    async fn test_duplicate_flight_number_rejected() {
        let ledger = SeatLedger::default();
        let mut first = test_flight(5);
        first.flight_number = "SK777".to_string();
        ledger.insert_flight(first).await.unwrap();

        let mut second = test_flight(5);
        second.flight_number = "SK777".to_string();
        let err = ledger.insert_flight(second).await.unwrap_err();
        assert!(matches!(err, DomainError::DuplicateFlightNumber(_)));
    }

    #[tokio::test]
    async fn test_bookings_for_user_most_recent_first() {
        let ledger = SeatLedger::default();
        let flight = ledger.insert_flight(test_flight(5)).await.unwrap();
        let user = test_user("order@example.com");

        let first = book(&ledger, &user, flight.id).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = book(&ledger, &user, flight.id).await.unwrap();

        let listed = ledger.bookings_for_user(user.id).await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].pnr, second.pnr);
        assert_eq!(listed[1].pnr, first.pnr);
    }
}
