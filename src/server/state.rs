use crate::server::database::store::Store;
use crate::server::model::cart::Cart;
use crate::server::service::session::SessionRegistry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type SharedCart = Arc<tokio::sync::Mutex<Cart>>;

/// Carts of ordering terminals that have something in them.
#[derive(Debug, Default)]
pub(crate) struct CartRegistry {
    carts: Mutex<HashMap<String, SharedCart>>,
}

impl CartRegistry {
    fn carts(&self) -> MutexGuard<'_, HashMap<String, SharedCart>> {
        self.carts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// the cart of `terminal`, created if absent; used by writes that add items
    pub fn cart(&self, terminal: &str) -> SharedCart {
        self.carts().entry(terminal.to_string()).or_default().clone()
    }

    /// the cart of `terminal` if it has one, never creates an entry
    pub fn existing(&self, terminal: &str) -> Option<SharedCart> {
        self.carts().get(terminal).cloned()
    }

    /// Forget the cart of `terminal` once it is empty and no request holds it.
    ///
    /// Handles are only handed out under the registry lock, so a count of one
    /// means nobody can be waiting on the cart.
    pub fn prune(&self, terminal: &str) -> bool {
        let mut carts = self.carts();
        let unused = carts.get(terminal).is_some_and(|cart| {
            Arc::strong_count(cart) == 1 && cart.try_lock().is_ok_and(|cart| cart.is_empty())
        });
        if unused {
            carts.remove(terminal);
        }
        unused
    }

    pub fn len(&self) -> usize {
        self.carts().len()
    }
}

pub(crate) struct AppState<S: Store> {
    store: S,
    carts: CartRegistry,
    sessions: Arc<SessionRegistry>,
}

impl<S: Store> AppState<S> {
    pub fn new(store: S, sessions: SessionRegistry) -> Self {
        Self {
            store,
            carts: CartRegistry::default(),
            sessions: Arc::new(sessions),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn carts(&self) -> &CartRegistry {
        &self.carts
    }

    pub fn sessions(&self) -> Arc<SessionRegistry> {
        self.sessions.clone()
    }
}
