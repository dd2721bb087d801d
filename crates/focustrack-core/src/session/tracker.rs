//! Lifecycle of the single active session.
//!
//! ## State Transitions
//!
//! ```text
//! (none) -> Running <-> Paused
//!              |           |
//!              +-----+-----+
//!                    v
//!          Completed | Cancelled -> (none)
//! ```
//!
//! Every command is a silent no-op when the transition does not apply; the
//! caller learns what happened from the return value.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::{Session, SessionKind};
use crate::clock::elapsed_ms;

/// Outcome of restoring a persisted session after a restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rehydrated {
    /// Put back into the active slot unchanged.
    Restored,
    /// Ran out while the process was gone; completed at its target end.
    Expired(Session),
    /// Already carried an end time; handed back for archiving.
    Finalized(Session),
}

/// Owns at most one active [`Session`].
#[derive(Debug, Clone, Default)]
pub struct SessionTracker {
    current: Option<Session>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.current.as_ref().is_some_and(Session::is_running)
    }

    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u64 {
        super::calculate_remaining_time(self.current.as_ref(), now)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Open a new session unless one is already active.
    pub fn start(
        &mut self,
        kind: SessionKind,
        duration_secs: u64,
        now: DateTime<Utc>,
    ) -> Option<&Session> {
        if let Some(existing) = &self.current {
            debug!(session_id = %existing.id, "start ignored: a session is already active");
            return None;
        }
        let Some(session) = Session::new(kind, duration_secs, now) else {
            debug!(duration_secs, "start ignored: duration out of range");
            return None;
        };
        self.current = Some(session);
        self.current.as_ref()
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Option<&Session> {
        match self.current.as_mut() {
            Some(session) if !session.is_paused() => {
                session.paused_at = Some(now);
                Some(&*session)
            }
            _ => {
                debug!("pause ignored: no running session");
                None
            }
        }
    }

    /// Close the open pause, pushing the target end forward by its length.
    /// Returns the session and the length of the pause in milliseconds.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Option<(&Session, u64)> {
        let session = match self.current.as_mut() {
            Some(session) => session,
            None => {
                debug!("resume ignored: no session");
                return None;
            }
        };
        let Some(paused_at) = session.paused_at.take() else {
            debug!(session_id = %session.id, "resume ignored: session is not paused");
            return None;
        };
        let pause_ms = elapsed_ms(paused_at, now);
        session.total_paused_ms += pause_ms;
        match i64::try_from(pause_ms)
            .ok()
            .and_then(Duration::try_milliseconds)
            .and_then(|pause| session.target_end_time.checked_add_signed(pause))
        {
            Some(target) => session.target_end_time = target,
            None => debug!(
                session_id = %session.id,
                pause_ms,
                "target end left unshifted: out of range"
            ),
        }
        Some((&*session, pause_ms))
    }

    /// Finalize as completed at `now` and clear the active slot.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Option<Session> {
        self.finish(true, now)
    }

    /// Finalize as cancelled at `now` and clear the active slot.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Option<Session> {
        self.finish(false, now)
    }

    /// Drop the active session without finalizing it.
    pub fn clear(&mut self) -> Option<Session> {
        self.current.take()
    }

    /// Take a session loaded from storage.
    ///
    /// A running session whose target end has already passed is completed
    /// at that target end rather than at `now`; the process was simply not
    /// around to see it finish.
    pub fn rehydrate(&mut self, mut session: Session, now: DateTime<Utc>) -> Rehydrated {
        if let Some(existing) = &self.current {
            debug!(session_id = %existing.id, "rehydrate over an active session replaces it");
        }

        if session.end_time.is_some() {
            self.current = None;
            return Rehydrated::Finalized(session);
        }

        if session.target_end_time < now && !session.completed && !session.is_paused() {
            let ended_at = session.target_end_time;
            session.finalize(true, ended_at);
            self.current = None;
            return Rehydrated::Expired(session);
        }

        self.current = Some(session);
        Rehydrated::Restored
    }

    fn finish(&mut self, completed: bool, now: DateTime<Utc>) -> Option<Session> {
        let Some(mut session) = self.current.take() else {
            debug!(completed, "finish ignored: no session");
            return None;
        };
        session.finalize(completed, now);
        Some(session)
    }
}
