pub mod app_config;
pub mod catalog;
pub mod ledger;
pub mod seed;
pub mod users;

pub use catalog::{FlightCatalog, SortKey};
pub use ledger::{SeatLedger, SeatReservation};
pub use users::UserStore;
