use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use skylane_core::{
    Booking, BookingDraft, DomainError, DomainResult, FareBreakdown, FareEngine, Flight,
};
use skylane_store::{FlightCatalog, SeatLedger, SortKey, UserStore};

/// A searchable flight with its advisory quote.
///
/// Search-time fares are recomputed on every call and may differ from the
/// fare eventually committed: both `now` and the seat counters drift.
#[derive(Debug, Clone, Serialize)]
pub struct FlightOffer {
    pub flight: Flight,
    pub fare: FareBreakdown,
}

/// A booking joined with its parent flight, ready for presentation.
#[derive(Debug, Clone, Serialize)]
pub struct BookingDetails {
    pub booking: Booking,
    pub flight: Flight,
}

/// Orchestrates the booking lifecycle across catalog, fare engine and seat
/// ledger. Holds its dependencies explicitly; nothing here is ambient.
pub struct BookingService {
    ledger: Arc<SeatLedger>,
    catalog: Arc<FlightCatalog>,
    users: Arc<UserStore>,
    fares: FareEngine,
}

impl BookingService {
    pub fn new(
        ledger: Arc<SeatLedger>,
        catalog: Arc<FlightCatalog>,
        users: Arc<UserStore>,
        fares: FareEngine,
    ) -> Self {
        Self {
            ledger,
            catalog,
            users,
            fares,
        }
    }

    /// Search flights for a route/date, quoting each result fresh.
    pub async fn search_flights(
        &self,
        origin: &str,
        destination: &str,
        date: NaiveDate,
        sort: SortKey,
    ) -> DomainResult<Vec<FlightOffer>> {
        if origin.trim().is_empty() || destination.trim().is_empty() {
            return Err(DomainError::Validation(
                "origin and destination are required".to_string(),
            ));
        }

        let now = Utc::now();
        let flights = self.catalog.search(origin, destination, date, sort).await?;
        Ok(self.attach_quotes(flights, now))
    }

    /// Every flight in inventory with an advisory quote.
    pub async fn list_flights(&self) -> Vec<FlightOffer> {
        let now = Utc::now();
        self.attach_quotes(self.catalog.list_all().await, now)
    }

    /// Book one seat for `user_id` on `flight_id`.
    ///
    /// The fare is quoted between `reserve` and `commit`, while the flight
    /// is exclusively held: every prior committed decrement is visible, and
    /// the quoted total freezes into the booking record.
    pub async fn create_booking(
        &self,
        user_id: Uuid,
        flight_id: Uuid,
        seat_number: &str,
    ) -> DomainResult<BookingDetails> {
        let seat_number = seat_number.trim();
        if seat_number.is_empty() {
            return Err(DomainError::Validation(
                "seat_number is required".to_string(),
            ));
        }

        let user = self.users.get(user_id).await?;
        let reservation = self.ledger.reserve(flight_id).await?;
        let fare = self.fares.quote(reservation.flight(), Utc::now());
        let draft = BookingDraft::new(&user, flight_id, seat_number, fare.total_cents);
        let booking = self.ledger.commit(reservation, draft).await?;

        tracing::info!(
            pnr = %booking.pnr,
            user = %user_id,
            total_cents = booking.price_paid_cents,
            "booking created"
        );
        let flight = self.ledger.get_flight(flight_id).await?;
        Ok(BookingDetails { booking, flight })
    }

    /// All of the user's bookings, most recent first.
    pub async fn list_bookings(&self, user_id: Uuid) -> DomainResult<Vec<BookingDetails>> {
        let bookings = self.ledger.bookings_for_user(user_id).await;
        let mut details = Vec::with_capacity(bookings.len());
        for booking in bookings {
            let flight = self.ledger.get_flight(booking.flight_id).await?;
            details.push(BookingDetails { booking, flight });
        }
        Ok(details)
    }

    /// Owner-scoped lookup; a foreign PNR reads as absent.
    pub async fn get_booking(&self, user_id: Uuid, pnr: &str) -> DomainResult<BookingDetails> {
        let booking = self.ledger.booking_by_pnr(pnr, user_id).await?;
        let flight = self.ledger.get_flight(booking.flight_id).await?;
        Ok(BookingDetails { booking, flight })
    }

    /// Cancel the user's booking and return the seat to inventory.
    pub async fn cancel_booking(&self, user_id: Uuid, pnr: &str) -> DomainResult<BookingDetails> {
        let booking = self.ledger.cancel(pnr, user_id).await?;
        let flight = self.ledger.get_flight(booking.flight_id).await?;
        Ok(BookingDetails { booking, flight })
    }

    fn attach_quotes(
        &self,
        flights: Vec<Flight>,
        now: chrono::DateTime<Utc>,
    ) -> Vec<FlightOffer> {
        flights
            .into_iter()
            .map(|flight| {
                let fare = self.fares.quote(&flight, now);
                FlightOffer { flight, fare }
            })
            .collect()
    }
}
