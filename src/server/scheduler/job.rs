use crate::server::service::session::SessionRegistry;
use log::info;
use std::sync::Arc;
use std::time::Duration;
use tokio::{pin, select, time};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

async fn worker(sessions: Arc<SessionRegistry>, every: Duration, cancel_token: CancellationToken) {
    let interval = time::interval(every);
    pin!(interval);
    loop {
        select! {
            _ = interval.tick() => {},
            _ = cancel_token.cancelled() => {
                info!("received cancel signal, returning gracefully");
                return;
            }
        }

        let purged = sessions.purge_expired();
        if purged > 0 {
            info!("purged {} expired admin sessions", purged);
        }
    }
}

/// Purge expired admin sessions every `every` until cancelled.
pub(crate) fn session_sweeper(sessions: Arc<SessionRegistry>, every: Duration, cancel_token: CancellationToken) -> TaskTracker {
    let tracker = TaskTracker::new();
    tracker.spawn(worker(sessions, every, cancel_token));
    tracker.close();
    tracker
}
