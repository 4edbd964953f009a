use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use parking_lot::Mutex;

use crate::config::Config;
use crate::db::Database;

/// Sessions whose submission is currently being processed.
#[derive(Debug, Default)]
pub struct InFlightSubmissions {
    sessions: Mutex<HashSet<String>>,
}

impl InFlightSubmissions {
    /// Claim `session_id`; `None` if another request already holds it.
    pub fn try_claim(self: &Arc<Self>, session_id: &str) -> Option<SubmissionClaim> {
        let inserted = self.sessions.lock().insert(session_id.to_string());
        inserted.then(|| SubmissionClaim {
            owner: Arc::clone(self),
            session_id: session_id.to_string(),
        })
    }

    pub fn is_claimed(&self, session_id: &str) -> bool {
        self.sessions.lock().contains(session_id)
    }
}

/// Released on drop, whatever path the handler leaves through.
#[derive(Debug)]
pub struct SubmissionClaim {
    owner: Arc<InFlightSubmissions>,
    session_id: String,
}

impl Drop for SubmissionClaim {
    fn drop(&mut self) {
        self.owner.sessions.lock().remove(&self.session_id);
    }
}

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    db: Database,
    config: Arc<Config>,
    in_flight: Arc<InFlightSubmissions>,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            db,
            config: Arc::new(config),
            in_flight: Arc::new(InFlightSubmissions::default()),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn in_flight(&self) -> &Arc<InFlightSubmissions> {
        &self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_is_exclusive_and_released_on_drop() {
        let in_flight = Arc::new(InFlightSubmissions::default());
        let claim = in_flight.try_claim("s1").unwrap();
        assert!(in_flight.try_claim("s1").is_none());
        assert!(in_flight.try_claim("s2").is_some());
        assert!(in_flight.is_claimed("s1"));

        drop(claim);
        assert!(!in_flight.is_claimed("s1"));
        assert!(in_flight.try_claim("s1").is_some());
    }
}
