//! In-memory session manager.
//!
//! Sessions are volatile: held in process memory only and lost on restart.
//! Expired entries are swept lazily at lookup time; there is no background
//! timer.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::{datetime, models::normalize_id};

#[derive(Debug, Clone)]
struct Session {
    token: String,
    expires: NaiveDateTime,
}

#[derive(Clone)]
pub struct SessionService {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    timeout_hours: i64,
}

impl SessionService {
    pub fn new(timeout_hours: i64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            timeout_hours,
        }
    }

    /// Issue a fresh token for the member, replacing any existing session.
    pub fn issue(&self, school_id: &str) -> String {
        let token = Uuid::new_v4().to_string();
        let session = Session {
            token: token.clone(),
            expires: datetime::now() + chrono::Duration::hours(self.timeout_hours),
        };
        self.sessions
            .write()
            .insert(normalize_id(school_id), session);
        token
    }

    /// Check that the member holds this exact token and it has not expired.
    /// An expired session is removed on the spot.
    pub fn validate(&self, school_id: &str, token: &str) -> bool {
        let key = normalize_id(school_id);
        let mut sessions = self.sessions.write();
        match sessions.get(&key) {
            Some(session) if session.token != token => false,
            Some(session) if session.expires <= datetime::now() => {
                sessions.remove(&key);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Resolve a bearer token to its member, sweeping any expired sessions
    /// encountered along the way.
    pub fn find_by_token(&self, token: &str) -> Option<String> {
        let now = datetime::now();
        let mut sessions = self.sessions.write();
        sessions.retain(|_, s| s.expires > now);
        sessions
            .iter()
            .find(|(_, s)| s.token == token)
            .map(|(sid, _)| sid.clone())
    }

    /// Revoke whichever session owns this token. Returns false when the
    /// token matched nothing.
    pub fn revoke_token(&self, token: &str) -> bool {
        let mut sessions = self.sessions.write();
        let owner = sessions
            .iter()
            .find(|(_, s)| s.token == token)
            .map(|(sid, _)| sid.clone());
        match owner {
            Some(sid) => {
                sessions.remove(&sid);
                true
            }
            None => false,
        }
    }
}
