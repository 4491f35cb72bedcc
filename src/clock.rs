use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};

/// Source of "now" for every time-dependent rule (temporal scoring, default
/// year windows, coverage periods).
///
/// Selection is deterministic for a fixed clock; only the clock varies
/// between otherwise identical calls.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn current_year(&self) -> i32 {
        self.now().year()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A frozen instant, used for reproducible selections and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn at(instant: DateTime<Utc>) -> Self {
        FixedClock(instant)
    }

    /// Mid-year instant (30 June, 00:00 UTC) of `year`.
    pub fn in_year(year: i32) -> Option<Self> {
        Self::on(year, 6, 30)
    }

    pub fn on(year: i32, month: u32, day: u32) -> Option<Self> {
        let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)?;
        Some(FixedClock(Utc.from_utc_datetime(&naive)))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
