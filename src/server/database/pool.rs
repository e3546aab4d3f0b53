use crate::server::database::connection::Connection;
use anyhow::{Context, Error};
use log::{error, info, warn};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time;
use tokio_postgres::{Client, NoTls};

/// A pooled client that can notice its connection is gone and open a new one.
pub(crate) trait PooledClient: Sized + Send + 'static {
    fn is_closed(&self) -> bool;

    async fn reopen(target: &str) -> Result<Self, Error>;
}

impl PooledClient for Client {
    fn is_closed(&self) -> bool {
        Client::is_closed(self)
    }

    async fn reopen(target: &str) -> Result<Self, Error> {
        connect(target).await
    }
}

pub(crate) struct CommonPool<C> {
    /// pool name
    name: &'static str,
    /// where replacements for closed clients connect to
    target: String,
    /// idle clients, accessed in a FIFO manner
    connections: Mutex<VecDeque<C>>,
    /// one permit per idle client
    available: Arc<Semaphore>,
}

/// Fixed-size pool of database clients shared by every request.
pub(crate) struct Pool<C>(Arc<CommonPool<C>>);

impl<C> Clone for Pool<C> {
    fn clone(&self) -> Pool<C> {
        Pool(self.0.clone())
    }
}

impl<C: PooledClient> Pool<C> {
    pub fn from_clients(name: &'static str, target: &str, clients: Vec<C>) -> Self {
        let size = clients.len();
        Self(Arc::new(CommonPool {
            name,
            target: target.to_string(),
            connections: Mutex::new(clients.into()),
            available: Arc::new(Semaphore::new(size)),
        }))
    }

    pub fn name(&self) -> &'static str {
        self.0.name
    }

    /// number of clients currently idle
    pub fn idle(&self) -> usize {
        self.0.available.available_permits()
    }

    /// acquire a connection, bail out with `None` once `timeout` passes.
    ///
    /// A client whose connection has ended is replaced before it is handed out.
    pub async fn acquire(&self, timeout: Duration) -> Option<Connection<C>> {
        let permit = match time::timeout(timeout, self.0.available.clone().acquire_owned()).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(e)) => {
                error!("{} pool is closed, {}", self.0.name, e);
                return None;
            }
            Err(_) => {
                error!("timed out to acquire a connection from {} pool after {:?}", self.0.name, timeout);
                return None;
            }
        };
        let client = self
            .0
            .connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()?;
        if !client.is_closed() {
            return Some(Connection::new(client, self.clone(), permit));
        }
        warn!("closed client found in {} pool, reconnecting", self.0.name);
        match time::timeout(timeout, C::reopen(&self.0.target)).await {
            Ok(Ok(fresh)) => Some(Connection::new(fresh, self.clone(), permit)),
            Ok(Err(e)) => {
                error!("failed to reconnect {} pool client, {}", self.0.name, e);
                self.release(client);
                None
            }
            Err(_) => {
                error!("timed out reconnecting {} pool client after {:?}", self.0.name, timeout);
                self.release(client);
                None
            }
        }
    }
}

impl<C: Send + 'static> Pool<C> {
    pub(crate) fn release(&self, client: C) {
        self.0
            .connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(client);
    }
}

async fn connect(conn_str: &str) -> Result<Client, Error> {
    let (client, conn) = tokio_postgres::connect(conn_str, NoTls)
        .await
        .context("failed to create connection")?;
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            error!("connection returned error and aborted, {}", e);
        }
    });
    Ok(client)
}

/// Open `size` connections concurrently. Any failure aborts startup.
pub(crate) async fn init(name: &'static str, conn_str: &str, size: usize) -> Result<Pool<Client>, Error> {
    let mut set = JoinSet::new();
    for _ in 0..size {
        let conn_str = conn_str.to_string();
        set.spawn(async move { connect(&conn_str).await });
    }
    let mut clients = Vec::with_capacity(size);
    while let Some(res) = set.join_next().await {
        let client = res.context("connect task panicked")??;
        info!("connection created for {} pool", name);
        clients.push(client);
    }
    Ok(Pool::from_clients(name, conn_str, clients))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    const TIMEOUT: Duration = Duration::from_millis(50);

    #[derive(Debug, PartialEq)]
    struct MockClient {
        id: u8,
        closed: bool,
    }

    fn clients(ids: &[u8]) -> Vec<MockClient> {
        ids.iter().map(|&id| MockClient { id, closed: false }).collect()
    }

    impl PooledClient for MockClient {
        fn is_closed(&self) -> bool {
            self.closed
        }

        async fn reopen(target: &str) -> Result<Self, Error> {
            match target {
                "down" => Err(anyhow!("connection refused")),
                _ => Ok(MockClient { id: 99, closed: false }),
            }
        }
    }

    #[tokio::test]
    async fn empty_pool_times_out() {
        let pool = Pool::<MockClient>::from_clients("test", "", vec![]);
        assert!(pool.acquire(TIMEOUT).await.is_none());
    }

    #[tokio::test]
    async fn acquire_and_release() {
        let pool = Pool::from_clients("test", "", clients(&[1]));
        {
            let conn = match pool.acquire(TIMEOUT).await {
                Some(conn) => conn,
                None => panic!("should get some"),
            };
            assert_eq!(conn.id, 1);
            assert_eq!(pool.idle(), 0);
            assert!(pool.acquire(TIMEOUT).await.is_none());
        } // conn drops here, and is released automatically

        assert_eq!(pool.idle(), 1);
        assert!(pool.acquire(TIMEOUT).await.is_some());
        assert!(pool.acquire(TIMEOUT).await.is_some());
    }

    #[tokio::test]
    async fn fifo_order() {
        let pool = Pool::from_clients("test", "", clients(&[1, 2]));
        let first = pool.acquire(TIMEOUT).await.unwrap();
        assert_eq!(first.id, 1);
        drop(first);
        let second = pool.acquire(TIMEOUT).await.unwrap();
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn waiter_gets_released_client() {
        let pool = Pool::from_clients("test", "", clients(&[7]));
        let held = pool.acquire(TIMEOUT).await.unwrap();
        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.acquire(Duration::from_secs(1)).await.map(|c| c.id) })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(held);
        assert_eq!(waiter.await.unwrap(), Some(7));
    }

    #[tokio::test]
    async fn closed_client_is_replaced() {
        let pool = Pool::from_clients("test", "", vec![MockClient { id: 1, closed: true }]);
        let conn = pool.acquire(TIMEOUT).await.unwrap();
        assert_eq!(conn.id, 99);
        drop(conn);
        // the replacement is what goes back into the pool
        assert_eq!(pool.acquire(TIMEOUT).await.unwrap().id, 99);
    }

    #[tokio::test]
    async fn failed_reconnect_keeps_pool_size() {
        let pool = Pool::from_clients("test", "down", vec![MockClient { id: 1, closed: true }]);
        assert!(pool.acquire(TIMEOUT).await.is_none());
        assert_eq!(pool.idle(), 1);
        assert!(pool.acquire(TIMEOUT).await.is_none());
    }
}
