pub mod service;

pub use service::{BookingDetails, BookingService, FlightOffer};
