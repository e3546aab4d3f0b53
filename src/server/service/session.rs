use crate::server::util::time::helper::get_utc_now;
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

const TOKEN_LEN: usize = 32;

#[derive(Debug, Clone)]
struct Session {
    username: String,
    expires_at: DateTime<Utc>,
}

/// Bearer tokens of logged in admins.
#[derive(Debug)]
pub(crate) struct SessionRegistry {
    ttl: chrono::Duration,
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        let secs = ttl.as_secs().min(i64::MAX as u64 / 1_000) as i64;
        Self {
            ttl: chrono::Duration::seconds(secs),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn sessions(&self) -> std::sync::MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// start a session for `username`, returns its token
    pub fn issue(&self, username: &str) -> String {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        let expires_at = get_utc_now()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.sessions().insert(
            token.clone(),
            Session {
                username: username.to_string(),
                expires_at,
            },
        );
        token
    }

    /// username behind a live token
    pub fn validate(&self, token: &str) -> Option<String> {
        let mut sessions = self.sessions();
        match sessions.get(token) {
            Some(session) if session.expires_at > get_utc_now() => Some(session.username.clone()),
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.sessions().remove(token).is_some()
    }

    /// drop every expired session, returns how many went away
    pub fn purge_expired(&self) -> usize {
        let now = get_utc_now();
        let mut sessions = self.sessions();
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > now);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }
}
