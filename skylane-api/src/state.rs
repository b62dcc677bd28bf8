use std::sync::Arc;

use skylane_booking::BookingService;
use skylane_store::UserStore;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    /// Token lifetime in seconds.
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BookingService>,
    pub users: Arc<UserStore>,
    pub auth: AuthConfig,
}
