use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use skylane_booking::FlightOffer;
use skylane_core::FareBreakdown;
use skylane_store::SortKey;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/flights", get(list_flights))
        .route("/flights/search", get(search_flights))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    origin: Option<String>,
    destination: Option<String>,
    date: Option<String>,
    sort_by: Option<String>,
}

#[derive(Debug, Serialize)]
struct FlightResponse {
    id: Uuid,
    flight_number: String,
    origin: String,
    destination: String,
    departure_time: DateTime<Utc>,
    arrival_time: DateTime<Utc>,
    base_price_cents: i64,
    /// Advisory quote as of this request; the booking fare is computed at
    /// commit time and may differ.
    fare: FareBreakdown,
    seats_available: u32,
}

impl From<FlightOffer> for FlightResponse {
    fn from(offer: FlightOffer) -> Self {
        Self {
            id: offer.flight.id,
            flight_number: offer.flight.flight_number,
            origin: offer.flight.origin,
            destination: offer.flight.destination,
            departure_time: offer.flight.departure_time,
            arrival_time: offer.flight.arrival_time,
            base_price_cents: offer.flight.base_price_cents,
            fare: offer.fare,
            seats_available: offer.flight.seats_available,
        }
    }
}

async fn list_flights(State(state): State<AppState>) -> Json<Vec<FlightResponse>> {
    let offers = state.service.list_flights().await;
    Json(offers.into_iter().map(FlightResponse::from).collect())
}

async fn search_flights(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<FlightResponse>>, AppError> {
    // 1. All three route parameters are required
    let (origin, destination, date_str) = match (&params.origin, &params.destination, &params.date)
    {
        (Some(o), Some(d), Some(dt)) => (o, d, dt),
        _ => {
            return Err(AppError::Validation(
                "Missing required parameters.".to_string(),
            ))
        }
    };

    // 2. Exact calendar date, ISO format
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("date must be formatted YYYY-MM-DD".to_string()))?;

    let sort = match params.sort_by.as_deref() {
        Some("duration") => SortKey::Duration,
        _ => SortKey::Price,
    };

    // 3. Search; an empty route auto-provisions, so a valid query always
    // returns at least one flight
    let offers = state.service.search_flights(origin, destination, date, sort).await?;
    Ok(Json(offers.into_iter().map(FlightResponse::from).collect()))
}
