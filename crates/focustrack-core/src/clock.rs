//! Wall-clock sources and calendar helpers.
//!
//! The engine never reads the system time directly. It asks a [`Clock`] for
//! the current instant and for the UTC offset that defines "today", so tests
//! can move time forward without sleeping.

use std::sync::atomic::{AtomicI32, AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, Offset, TimeZone, Utc};

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Offset used to map instants onto local calendar days.
    ///
    /// One offset, taken now, is applied to every instant, including past
    /// sessions. Across a DST change a session recorded within an hour of
    /// local midnight can therefore move to the neighbouring day when
    /// history is re-read (for example when the streak is recomputed).
    /// Daily rollups are written once at completion and keep the day they
    /// were filed under.
    fn offset(&self) -> FixedOffset {
        *Local::now().offset()
    }

    /// Local calendar date of the current instant.
    fn today(&self) -> NaiveDate {
        local_date(self.now(), self.offset())
    }
}

/// Reads the operating system clock and timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying instant, so a test can keep one handle
/// and give another to the engine.
#[derive(Debug, Clone)]
pub struct ManualClock {
    epoch_ms: Arc<AtomicI64>,
    offset_secs: Arc<AtomicI32>,
}

impl ManualClock {
    /// Start at `now` with a UTC offset of zero.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            epoch_ms: Arc::new(AtomicI64::new(now.timestamp_millis())),
            offset_secs: Arc::new(AtomicI32::new(0)),
        }
    }

    /// Start at the given UTC date and time.
    pub fn at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Self {
        let now = Utc
            .with_ymd_and_hms(year, month, day, hour, min, sec)
            .single()
            .unwrap_or_default();
        Self::new(now)
    }

    pub fn with_offset(self, offset: FixedOffset) -> Self {
        self.offset_secs
            .store(offset.local_minus_utc(), Ordering::SeqCst);
        self
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.epoch_ms.store(now.timestamp_millis(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.epoch_ms
            .fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance(Duration::seconds(secs));
    }

    pub fn advance_days(&self, days: i64) {
        self.advance(Duration::days(days));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.epoch_ms.load(Ordering::SeqCst))
            .single()
            .unwrap_or_default()
    }

    fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.offset_secs.load(Ordering::SeqCst))
            .unwrap_or_else(|| Utc.fix())
    }
}

/// Calendar date of `instant` as seen at `offset`.
pub fn local_date(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

/// Midnight (local) of the Sunday that starts the week containing `today`.
pub fn start_of_week(today: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let days_since_sunday = today.weekday().num_days_from_sunday() as i64;
    let sunday = today - Duration::days(days_since_sunday);
    let midnight = sunday.and_hms_opt(0, 0, 0).unwrap_or_default();
    match offset.from_local_datetime(&midnight).single() {
        Some(local) => local.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&midnight),
    }
}

/// Milliseconds from `from` to `to`, floored at zero.
pub(crate) fn elapsed_ms(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    (to - from).num_milliseconds().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::at(2024, 3, 10, 9, 0, 0);
        let handle = clock.clone();
        handle.advance_secs(90);
        assert_eq!(clock.now(), handle.now());
        assert_eq!(
            clock.now(),
            Utc.with_ymd_and_hms(2024, 3, 10, 9, 1, 30).unwrap()
        );
    }

    #[test]
    fn offset_moves_the_local_day() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let clock = ManualClock::at(2024, 3, 10, 20, 0, 0).with_offset(tokyo);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
    }

    #[test]
    fn past_instants_use_the_current_offset() {
        // 23:30 UTC on the 9th is 00:30 on the 10th once the clock reads +1.
        let plus_one = FixedOffset::east_opt(3600).unwrap();
        let clock = ManualClock::at(2024, 6, 1, 12, 0, 0).with_offset(plus_one);
        let earlier = Utc.with_ymd_and_hms(2024, 3, 9, 23, 30, 0).unwrap();
        assert_eq!(
            local_date(earlier, clock.offset()),
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
        );
    }

    #[test]
    fn week_starts_on_sunday_midnight() {
        let utc = FixedOffset::east_opt(0).unwrap();
        // 2024-03-13 is a Wednesday.
        let wednesday = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        assert_eq!(
            start_of_week(wednesday, utc),
            Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap()
        );
        let sunday = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_eq!(
            start_of_week(sunday, utc),
            Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn week_start_respects_offset() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let wednesday = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        assert_eq!(
            start_of_week(wednesday, plus_two),
            Utc.with_ymd_and_hms(2024, 3, 9, 22, 0, 0).unwrap()
        );
    }

    #[test]
    fn elapsed_never_negative() {
        let a = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 10).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(elapsed_ms(a, b), 0);
        assert_eq!(elapsed_ms(b, a), 10_000);
    }
}
