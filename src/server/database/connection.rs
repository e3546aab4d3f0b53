use crate::server::database::pool::Pool;
use std::ops::{Deref, DerefMut};
use tokio::sync::OwnedSemaphorePermit;

/// A client checked out of a [`Pool`], handed back when dropped.
pub(crate) struct Connection<C: Send + 'static> {
    client: Option<C>,
    pool: Pool<C>,
    // released after the client is back in the pool
    _permit: OwnedSemaphorePermit,
}

impl<C: Send + 'static> Connection<C> {
    pub(crate) fn new(client: C, pool: Pool<C>, permit: OwnedSemaphorePermit) -> Self {
        Self {
            client: Some(client),
            pool,
            _permit: permit,
        }
    }
}

impl<C: Send + 'static> Deref for Connection<C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.client.as_ref().expect("client is present until drop")
    }
}

impl<C: Send + 'static> DerefMut for Connection<C> {
    fn deref_mut(&mut self) -> &mut C {
        self.client.as_mut().expect("client is present until drop")
    }
}

impl<C: Send + 'static> Drop for Connection<C> {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            self.pool.release(client);
        }
    }
}
