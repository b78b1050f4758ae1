// ── Timeframes and sampling windows ──
//
// Every chart and total is computed over exactly `BUCKETS` buckets, so the
// bucket width follows from the timeframe: `interval = duration / BUCKETS`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::warn;

/// Number of buckets requested per window.
pub const BUCKETS: usize = 20;

/// Finest bucket width the insights API accepts, in seconds.
pub const MIN_INTERVAL_SECS: u64 = 10;

/// Timeframes selectable in the dashboard.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum Timeframe {
    #[strum(serialize = "15m")]
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[strum(serialize = "1h")]
    #[serde(rename = "1h")]
    OneHour,
    #[strum(to_string = "1d", serialize = "24h")]
    #[serde(rename = "1d", alias = "24h")]
    OneDay,
    #[strum(serialize = "7d")]
    #[serde(rename = "7d")]
    SevenDays,
}

impl Timeframe {
    /// Timeframe used when the request names none.
    pub const DEFAULT: Self = Self::SevenDays;

    /// Timeframe used when the request names one we don't know.
    pub const FALLBACK: Self = Self::OneDay;

    pub fn seconds(self) -> u64 {
        match self {
            Self::FifteenMinutes => 15 * 60,
            Self::OneHour => 60 * 60,
            Self::OneDay => 24 * 60 * 60,
            Self::SevenDays => 7 * 24 * 60 * 60,
        }
    }

    /// Bucket width for this timeframe.
    pub fn interval(self) -> u64 {
        (self.seconds() / BUCKETS as u64).max(MIN_INTERVAL_SECS)
    }

    /// Lenient parse of a `duration` query parameter.
    ///
    /// Missing → [`DEFAULT`](Self::DEFAULT); unrecognised →
    /// [`FALLBACK`](Self::FALLBACK) with a warning.
    pub fn from_query(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::DEFAULT;
        };
        raw.parse().unwrap_or_else(|_| {
            warn!(duration = raw, fallback = %Self::FALLBACK, "unknown duration");
            Self::FALLBACK
        })
    }
}

/// A concrete time range split into `BUCKETS` equal buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub timeframe: Timeframe,
    /// Epoch seconds, inclusive.
    pub start: i64,
    /// Epoch seconds, exclusive.
    pub end: i64,
    /// Bucket width in seconds.
    pub interval: u64,
}

impl Window {
    /// The window of `timeframe` ending at the last bucket boundary at or
    /// before `now`.
    ///
    /// Aligning to the boundary keeps two requests inside the same bucket
    /// period identical, and matches how the insights API buckets data.
    pub fn ending_at(now: i64, timeframe: Timeframe) -> Self {
        let interval = timeframe.interval();
        let step = i64::try_from(interval).unwrap_or(i64::MAX);
        let end = now - now.rem_euclid(step);
        let span = i64::try_from(interval * BUCKETS as u64).unwrap_or(i64::MAX);
        Self {
            timeframe,
            start: end - span,
            end,
            interval,
        }
    }

    /// Always `BUCKETS`.
    pub fn buckets(&self) -> usize {
        BUCKETS
    }

    /// Start time of every bucket, oldest first.
    pub fn bucket_starts(&self) -> Vec<i64> {
        let step = i64::try_from(self.interval).unwrap_or(i64::MAX);
        (0..BUCKETS)
            .scan(self.start, |t, _| {
                let current = *t;
                *t = t.saturating_add(step);
                Some(current)
            })
            .collect()
    }
}
