//! Periodic driver for a live session.

use std::time::Duration;

use tokio::time::MissedTickBehavior;

use super::FocusEngine;
use crate::events::Event;
use crate::storage::KeyValueStore;

/// Tick `engine` every `period` while its session is running.
///
/// Every event is passed to `on_event`. Returns the event that ended the
/// loop (normally `SessionCompleted`), or `None` if there was nothing to
/// drive. A paused session stops the loop; call again after resuming.
pub async fn drive<S, F>(
    engine: &mut FocusEngine<S>,
    period: Duration,
    mut on_event: F,
) -> Option<Event>
where
    S: KeyValueStore,
    F: FnMut(&Event),
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    while engine.is_running() {
        interval.tick().await;
        let Some(event) = engine.tick() else {
            break;
        };
        on_event(&event);
        if !matches!(event, Event::Tick { .. }) {
            return Some(event);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::session::SessionKind;
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn completes_an_already_expired_session() {
        let clock = ManualClock::at(2024, 5, 1, 9, 0, 0);
        let mut engine = FocusEngine::open(MemoryStore::new(), clock.clone());
        engine.start_session(SessionKind::Focus, 60);
        clock.advance_secs(61);

        let last = drive(&mut engine, Duration::from_millis(1), |_| {}).await;
        assert!(matches!(last, Some(Event::SessionCompleted { .. })));
        assert_eq!(engine.stats().completed_sessions, 1);
    }

    #[tokio::test]
    async fn reports_countdown_then_completes() {
        let clock = ManualClock::at(2024, 5, 1, 9, 0, 0);
        let mut engine = FocusEngine::open(MemoryStore::new(), clock.clone());
        engine.start_session(SessionKind::Focus, 3);

        let mut countdown = Vec::new();
        let handle = clock.clone();
        let last = drive(&mut engine, Duration::from_millis(1), |event| {
            if let Event::Tick { remaining_secs, .. } = event {
                countdown.push(*remaining_secs);
                handle.advance_secs(1);
            }
        })
        .await;

        assert_eq!(countdown, vec![3, 2, 1]);
        assert!(matches!(last, Some(Event::SessionCompleted { .. })));
    }

    #[tokio::test]
    async fn idle_engine_returns_immediately() {
        let clock = ManualClock::at(2024, 5, 1, 9, 0, 0);
        let mut engine = FocusEngine::open(MemoryStore::new(), clock);
        assert!(drive(&mut engine, Duration::from_secs(60), |_| {}).await.is_none());
    }

    #[tokio::test]
    async fn paused_session_is_not_driven() {
        let clock = ManualClock::at(2024, 5, 1, 9, 0, 0);
        let mut engine = FocusEngine::open(MemoryStore::new(), clock);
        engine.start_session(SessionKind::Focus, 60);
        engine.pause_session();
        assert!(drive(&mut engine, Duration::from_secs(60), |_| {}).await.is_none());
        assert!(engine.current_session().is_some());
    }
}
