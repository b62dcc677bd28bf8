use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use skylane_booking::BookingDetails;
use skylane_core::BookingStatus;

use crate::error::AppError;
use crate::extract::AuthUser;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", post(create_booking).get(list_bookings))
        .route("/bookings/{pnr}", get(get_booking))
        .route("/bookings/{pnr}/cancel", post(cancel_booking))
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub flight_id: Uuid,
    pub seat_number: String,
}

#[derive(Debug, Serialize)]
struct BookingResponse {
    pnr: String,
    status: BookingStatus,
    passenger_name: String,
    passenger_email: String,
    seat_number: String,
    price_paid_cents: i64,
    created_at: DateTime<Utc>,
    flight_number: String,
    origin: String,
    destination: String,
    departure_time: DateTime<Utc>,
}

impl From<BookingDetails> for BookingResponse {
    fn from(details: BookingDetails) -> Self {
        Self {
            pnr: details.booking.pnr,
            status: details.booking.status,
            passenger_name: details.booking.passenger_name,
            passenger_email: details.booking.passenger_email,
            seat_number: details.booking.seat_number,
            price_paid_cents: details.booking.price_paid_cents,
            created_at: details.booking.created_at,
            flight_number: details.flight.flight_number,
            origin: details.flight.origin,
            destination: details.flight.destination,
            departure_time: details.flight.departure_time,
        }
    }
}

async fn create_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let details = state
        .service
        .create_booking(user.user_id, req.flight_id, &req.seat_number)
        .await?;

    Ok((StatusCode::CREATED, Json(BookingResponse::from(details))))
}

async fn list_bookings(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let details = state.service.list_bookings(user.user_id).await?;
    Ok(Json(details.into_iter().map(BookingResponse::from).collect()))
}

async fn get_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pnr): Path<String>,
) -> Result<Json<BookingResponse>, AppError> {
    let details = state.service.get_booking(user.user_id, &pnr).await?;
    Ok(Json(BookingResponse::from(details)))
}

async fn cancel_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(pnr): Path<String>,
) -> Result<Json<BookingResponse>, AppError> {
    let details = state.service.cancel_booking(user.user_id, &pnr).await?;
    Ok(Json(BookingResponse::from(details)))
}
