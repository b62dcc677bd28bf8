use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use skylane_core::{DomainError, DomainResult, User};

#[derive(Default)]
struct UserTable {
    by_id: HashMap<Uuid, User>,
    by_email: HashMap<String, Uuid>,
}

/// Registered accounts, unique by (case-insensitive) email.
#[derive(Default)]
pub struct UserStore {
    users: RwLock<UserTable>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new account. The email check and the insert share one
    /// table lock, so two concurrent signups cannot both claim an address.
    pub async fn create(&self, user: User) -> DomainResult<User> {
        let mut table = self.users.write().await;
        let key = user.email.to_lowercase();
        if table.by_email.contains_key(&key) {
            return Err(DomainError::EmailTaken(user.email.clone()));
        }
        table.by_email.insert(key, user.id);
        table.by_id.insert(user.id, user.clone());
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Option<User> {
        let table = self.users.read().await;
        let id = table.by_email.get(&email.to_lowercase())?;
        table.by_id.get(id).cloned()
    }

    pub async fn get(&self, user_id: Uuid) -> DomainResult<User> {
        let table = self.users.read().await;
        table.by_id.get(&user_id).cloned().ok_or(DomainError::NotFound)
    }
}
