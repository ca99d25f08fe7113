//! Calendar-day grouping of play sessions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionData;

/// All sessions observed on one calendar date, in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyData {
    pub date: NaiveDate,
    sessions: Vec<SessionData>,
}

impl DailyData {
    /// Creates the day for a log file and opens its first session.
    pub fn new(log_time: DateTime<Utc>) -> Self {
        Self {
            date: log_time.date_naive(),
            sessions: vec![SessionData::new(log_time, 0)],
        }
    }

    /// Opens a new session after an inactivity gap and returns it.
    pub fn new_session(&mut self, log_time: DateTime<Utc>) -> &mut SessionData {
        let session_id = self.sessions.len();
        self.sessions.push(SessionData::new(log_time, session_id));
        self.current_session_mut()
    }

    pub fn current_session_mut(&mut self) -> &mut SessionData {
        // A day always holds at least the session it was created with.
        let last = self.sessions.len() - 1;
        &mut self.sessions[last]
    }

    pub fn sessions(&self) -> &[SessionData] {
        &self.sessions
    }
}
