//! The engine facade.
//!
//! [`FocusEngine`] owns the session tracker, the user statistics, the
//! settings and a [`KeyValueStore`]. Every command reads the time from the
//! injected [`Clock`], mutates in memory, persists, and then hands the
//! resulting [`Event`] to subscribers and back to the caller.
//!
//! Commands never fail. A transition that does not apply returns `None`;
//! storage failures are logged and the in-memory state stays authoritative.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = FocusEngine::open(MemoryStore::new(), SystemClock);
//! engine.start_session(SessionKind::Focus, 25 * 60);
//! // In a loop:
//! engine.tick(); // Returns Some(Event::SessionCompleted) at zero
//! ```

pub mod ticker;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, info};

use crate::achievements::{self, Achievement, MetricValues, Tier};
use crate::clock::{Clock, SystemClock};
use crate::error::ConfigError;
use crate::events::Event;
use crate::session::{Rehydrated, Session, SessionKind, SessionTracker};
use crate::settings::{Settings, SettingsPatch, Theme};
use crate::stats::{self, StatsSummary, UserStats};
use crate::storage::{keys, load_json, remove_key, save_json, KeyValueStore};

/// Spacing between synthesized sessions in [`FocusEngine::fast_forward_sessions`].
const FAST_FORWARD_SPACING_MINS: i64 = 30;

type Listener = Box<dyn FnMut(&Event)>;

pub struct FocusEngine<S: KeyValueStore> {
    store: S,
    clock: Box<dyn Clock>,
    tracker: SessionTracker,
    stats: UserStats,
    settings: Settings,
    listeners: Vec<Listener>,
    recovered: Option<Event>,
}

impl<S: KeyValueStore> FocusEngine<S> {
    /// Open on `store` with the system clock.
    pub fn new(store: S) -> Self {
        Self::open(store, SystemClock)
    }

    /// Load persisted state from `store` and bring it up to date.
    ///
    /// Missing or undecodable documents fall back to defaults. A persisted
    /// session that ran out while nobody was watching is completed at its
    /// target end; see [`FocusEngine::recovered`].
    pub fn open(store: S, clock: impl Clock + 'static) -> Self {
        let settings: Settings = load_json(&store, keys::SETTINGS).unwrap_or_default();
        let stats: UserStats = load_json(&store, keys::STATS).unwrap_or_default();
        let persisted: Option<Session> = load_json(&store, keys::CURRENT_SESSION);

        let mut engine = Self {
            store,
            clock: Box::new(clock),
            tracker: SessionTracker::new(),
            stats,
            settings,
            listeners: Vec::new(),
            recovered: None,
        };

        let now = engine.clock.now();
        if let Some(session) = persisted {
            engine.rehydrate(session, now);
        }
        engine.refresh_streak();
        engine.persist();
        engine
    }

    fn rehydrate(&mut self, session: Session, now: DateTime<Utc>) {
        match self.tracker.rehydrate(session, now) {
            Rehydrated::Restored => {
                if let Some(session) = self.tracker.current() {
                    info!(session_id = %session.id, "restored active session");
                }
            }
            Rehydrated::Expired(session) => {
                info!(
                    session_id = %session.id,
                    ended_at = %session.target_end_time,
                    "completing session that expired while offline"
                );
                let unlocked = self.record_completed(session.clone(), now);
                self.recovered = Some(Event::SessionRecovered {
                    session,
                    unlocked,
                    at: now,
                });
            }
            Rehydrated::Finalized(session) => {
                if self.stats.session_history.iter().any(|s| s.id == session.id) {
                    debug!(session_id = %session.id, "dropping already archived session");
                } else if session.completed {
                    self.record_completed(session, now);
                } else {
                    self.stats.session_history.push(session);
                }
            }
        }
    }

    /// Subscribe to every event the engine emits from now on.
    pub fn subscribe(&mut self, listener: impl FnMut(&Event) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// The session completed on open because it expired while the process
    /// was not running, if any.
    pub fn recovered(&self) -> Option<&Event> {
        self.recovered.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.tracker.current()
    }

    /// Active and unpaused.
    pub fn is_running(&self) -> bool {
        self.tracker.is_running()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.tracker.remaining_secs(self.clock.now())
    }

    pub fn stats(&self) -> &UserStats {
        &self.stats
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Metric values as of now, with the streak counted against today.
    pub fn metrics(&self) -> MetricValues {
        let now = self.clock.now();
        let offset = self.clock.offset();
        let mut values = MetricValues::collect(&self.stats, now, offset);
        values.current_streak =
            stats::streak_as_of(&self.stats, self.clock.today(), offset) as u64;
        values
    }

    pub fn achievements(&self) -> &[Achievement] {
        &self.stats.achievements
    }

    pub fn unlocked_achievements(&self) -> Vec<&Achievement> {
        achievements::unlocked(&self.stats)
    }

    /// Percent progress towards the next tier of `id`; `None` for an
    /// unknown achievement.
    pub fn achievement_progress(&self, id: &str) -> Option<u32> {
        let achievement = self.stats.achievement(id)?;
        let value = self.metrics().get(achievement.metric);
        Some(achievements::progress_pct(achievement, value))
    }

    /// First locked tier of `id`; `None` when it is unknown or complete.
    pub fn next_achievement(&self, id: &str) -> Option<&Tier> {
        achievements::next_tier(self.stats.achievement(id)?)
    }

    pub fn summary(&self, from: NaiveDate, to: NaiveDate) -> StatsSummary {
        stats::summarize(&self.stats, from, to)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a session unless one is already active.
    pub fn start_session(&mut self, kind: SessionKind, duration_secs: u64) -> Option<Event> {
        let now = self.clock.now();
        let session = self.tracker.start(kind, duration_secs, now)?;
        let event = Event::SessionStarted {
            session_id: session.id.clone(),
            kind,
            duration_secs,
            at: now,
        };
        info!(session_id = %session.id, %kind, duration_secs, "session started");

        self.stats.total_sessions += 1;
        self.persist();
        self.emit(event)
    }

    /// Start a session of `kind` using its configured preset length.
    pub fn start_preset_session(&mut self, kind: SessionKind) -> Option<Event> {
        let duration_secs = self.settings.preset_secs(kind);
        self.start_session(kind, duration_secs)
    }

    pub fn pause_session(&mut self) -> Option<Event> {
        let now = self.clock.now();
        let session = self.tracker.pause(now)?;
        let event = Event::SessionPaused {
            session_id: session.id.clone(),
            remaining_secs: session.remaining_secs(now),
            at: now,
        };
        self.persist();
        self.emit(event)
    }

    pub fn resume_session(&mut self) -> Option<Event> {
        let now = self.clock.now();
        let (session, pause_ms) = self.tracker.resume(now)?;
        let event = Event::SessionResumed {
            session_id: session.id.clone(),
            pause_ms,
            remaining_secs: session.remaining_secs(now),
            at: now,
        };
        self.persist();
        self.emit(event)
    }

    /// Complete the active session now, whether or not its time is up.
    pub fn complete_session(&mut self) -> Option<Event> {
        let now = self.clock.now();
        let session = self.tracker.complete(now)?;
        info!(
            session_id = %session.id,
            paused_ms = session.total_paused_ms,
            "session completed"
        );

        let unlocked = self.record_completed(session.clone(), now);
        self.persist();

        let unlock_events = Event::unlocks(&unlocked, now);
        let event = Event::SessionCompleted {
            session,
            unlocked,
            at: now,
        };
        let event = self.emit(event);
        for unlock in unlock_events {
            self.emit(unlock);
        }
        event
    }

    /// Cancel the active session. It is archived but not aggregated.
    pub fn cancel_session(&mut self) -> Option<Event> {
        let now = self.clock.now();
        let session = self.tracker.cancel(now)?;
        info!(session_id = %session.id, "session cancelled");

        self.stats.session_history.push(session.clone());
        self.refresh_streak();
        self.persist();
        self.emit(Event::SessionCancelled { session, at: now })
    }

    /// Advance the live session.
    ///
    /// Completes it once its remaining time reaches zero, otherwise reports
    /// the remaining seconds. Does nothing while paused or idle.
    pub fn tick(&mut self) -> Option<Event> {
        let now = self.clock.now();
        let session = self.tracker.current().filter(|s| s.is_running())?;
        let remaining_secs = session.remaining_secs(now);
        if remaining_secs == 0 {
            return self.complete_session();
        }
        let event = Event::Tick {
            session_id: session.id.clone(),
            remaining_secs,
            at: now,
        };
        self.emit(event)
    }

    /// Wipe statistics, history and achievements, and drop any active
    /// session. Settings are kept.
    pub fn reset_stats(&mut self) -> Option<Event> {
        let now = self.clock.now();
        if let Some(dropped) = self.tracker.clear() {
            debug!(session_id = %dropped.id, "reset dropped the active session");
        }
        self.stats = UserStats::default();
        info!("statistics reset");
        self.persist();
        self.emit(Event::StatsReset { at: now })
    }

    /// Evaluate achievements against live metrics. Returns the ones that
    /// gained a tier.
    pub fn check_achievements(&mut self) -> Vec<Achievement> {
        let now = self.clock.now();
        self.refresh_streak();
        let offset = self.clock.offset();
        let unlocked = achievements::check_achievements(&mut self.stats, now, offset);
        self.persist();
        for unlock in Event::unlocks(&unlocked, now) {
            self.emit(unlock);
        }
        unlocked
    }

    /// Record `count` completed sessions of `duration_secs` each, started
    /// 30, 60, 90… minutes ago. A duration whose end cannot be represented
    /// records nothing. Returns achievements that gained a tier.
    pub fn fast_forward_sessions(&mut self, count: u32, duration_secs: u64) -> Vec<Achievement> {
        let now = self.clock.now();
        let offset = self.clock.offset();

        let mut recorded = 0u64;
        for i in 0..count {
            let start = now - Duration::minutes(FAST_FORWARD_SPACING_MINS * (i as i64 + 1));
            let Some(mut session) = Session::new(SessionKind::Focus, duration_secs, start) else {
                debug!(duration_secs, "fast-forward skipped: duration out of range");
                continue;
            };
            let ended_at = session.target_end_time;
            session.finalize(true, ended_at);

            stats::update_daily_stats(&mut self.stats, &session, offset);
            self.stats.session_history.push(session);
            recorded += 1;
        }
        self.stats.total_sessions += recorded;
        self.stats.completed_sessions += recorded;
        info!(count, recorded, duration_secs, "fast-forwarded sessions");

        self.check_achievements()
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) -> &Settings {
        self.settings.apply(patch);
        self.save_settings();
        &self.settings
    }

    /// Change one preset length, in minutes.
    pub fn set_preset(&mut self, kind: SessionKind, minutes: u32) {
        self.settings.set_preset(kind, minutes);
        self.save_settings();
    }

    pub fn set_active_preset(&mut self, kind: SessionKind) {
        self.settings.set_active_preset(kind);
        self.save_settings();
    }

    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.settings.toggle_theme();
        self.save_settings();
        theme
    }

    pub fn toggle_sound(&mut self) -> bool {
        let enabled = self.settings.toggle_sound();
        self.save_settings();
        enabled
    }

    pub fn toggle_notifications(&mut self) -> bool {
        let enabled = self.settings.toggle_notifications();
        self.save_settings();
        enabled
    }

    /// Set one setting by dot-separated key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not parse.
    pub fn set_setting(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.settings.set(key, value)?;
        self.save_settings();
        Ok(())
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Fold a finalized, completed session into the statistics and
    /// evaluate achievements.
    fn record_completed(&mut self, session: Session, now: DateTime<Utc>) -> Vec<Achievement> {
        let offset = self.clock.offset();
        stats::update_daily_stats(&mut self.stats, &session, offset);
        self.stats.completed_sessions += 1;
        self.stats.session_history.push(session);
        self.refresh_streak();
        achievements::check_achievements(&mut self.stats, now, offset)
    }

    fn refresh_streak(&mut self) {
        let offset = self.clock.offset();
        stats::recompute_streak(&mut self.stats, self.clock.today(), offset);
    }

    fn save_settings(&mut self) {
        save_json(&mut self.store, keys::SETTINGS, &self.settings);
    }

    fn persist(&mut self) {
        self.save_settings();
        save_json(&mut self.store, keys::STATS, &self.stats);
        match self.tracker.current() {
            Some(session) => save_json(&mut self.store, keys::CURRENT_SESSION, session),
            None => remove_key(&mut self.store, keys::CURRENT_SESSION),
        }
    }

    fn emit(&mut self, event: Event) -> Option<Event> {
        for listener in &mut self.listeners {
            listener(&event);
        }
        Some(event)
    }
}
