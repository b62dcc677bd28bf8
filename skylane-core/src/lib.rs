pub mod booking;
pub mod error;
pub mod flight;
pub mod pnr;
pub mod pricing;
pub mod user;

pub use booking::{Booking, BookingDraft, BookingStatus};
pub use error::{DomainError, DomainResult};
pub use flight::Flight;
pub use pricing::{FareBreakdown, FareEngine, PricingConfig, SurchargeReason};
pub use user::{User, UserProfile};
