use crate::identity::IdentityProvider;
use crate::storage::KvStore;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KvStore>,
    pub identity: Arc<dyn IdentityProvider>,
    /// Held across every read-modify-write so concurrent toggles from one
    /// process cannot drop each other's updates.
    pub writes: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(store: Arc<dyn KvStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            store,
            identity,
            writes: Arc::new(Mutex::new(())),
        }
    }
}
