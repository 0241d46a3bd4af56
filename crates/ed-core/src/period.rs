use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use ed_api_types::PeriodParams;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PeriodSelection
// ---------------------------------------------------------------------------

/// Reporting window offered by the period selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodSelection {
    #[default]
    #[serde(rename = "last7", alias = "last 7 days")]
    Last7,
    #[serde(rename = "last30", alias = "last 30 days")]
    Last30,
    #[serde(rename = "last90", alias = "last 90 days")]
    Last90,
}

impl PeriodSelection {
    /// Selector order.
    pub const ALL: [PeriodSelection; 3] = [
        PeriodSelection::Last7,
        PeriodSelection::Last30,
        PeriodSelection::Last90,
    ];

    pub fn id(self) -> &'static str {
        match self {
            PeriodSelection::Last7 => "last7",
            PeriodSelection::Last30 => "last30",
            PeriodSelection::Last90 => "last90",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PeriodSelection::Last7 => "Last 7 days",
            PeriodSelection::Last30 => "Last 30 days",
            PeriodSelection::Last90 => "Last 90 days",
        }
    }

    pub fn days(self) -> u32 {
        match self {
            PeriodSelection::Last7 => 7,
            PeriodSelection::Last30 => 30,
            PeriodSelection::Last90 => 90,
        }
    }

    /// Position in [`PeriodSelection::ALL`].
    pub fn index(self) -> usize {
        match self {
            PeriodSelection::Last7 => 0,
            PeriodSelection::Last30 => 1,
            PeriodSelection::Last90 => 2,
        }
    }

    /// Next option, wrapping around.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous option, wrapping around.
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Resolve against the current local time.
    pub fn resolve(self) -> DateRange {
        self.resolve_at(&Local::now())
    }

    /// Resolve against an arbitrary "now".
    ///
    /// `start` is local midnight `days()` calendar days before today and
    /// `end` is one millisecond before local midnight today, so the range
    /// never includes the current (partial) day.
    pub fn resolve_at<Tz: TimeZone>(self, now: &DateTime<Tz>) -> DateRange {
        let tz = now.timezone();
        let today = now.date_naive();
        let start_day = today - Duration::days(i64::from(self.days()));

        DateRange {
            start: local_midnight(&tz, start_day),
            end: local_midnight(&tz, today) - Duration::milliseconds(1),
        }
    }
}

impl fmt::Display for PeriodSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Returned when a period identifier from config, CLI or a command pipe is
/// not one of the three known options.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown period {0:?} (expected last7, last30 or last90)")]
pub struct UnknownPeriod(pub String);

impl FromStr for PeriodSelection {
    type Err = UnknownPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "last7" | "7" | "7d" | "last 7 days" => Ok(PeriodSelection::Last7),
            "last30" | "30" | "30d" | "last 30 days" => Ok(PeriodSelection::Last30),
            "last90" | "90" | "90d" | "last 90 days" => Ok(PeriodSelection::Last90),
            _ => Err(UnknownPeriod(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// DateRange
// ---------------------------------------------------------------------------

/// Concrete reporting window. `start < end` always holds for resolved ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Query parameters for the reporting endpoints.
    pub fn params(&self) -> PeriodParams {
        PeriodParams {
            start: self.start,
            end: self.end,
        }
    }

    /// Length of the window counting `end` as exclusive of the next
    /// millisecond, i.e. a whole number of days for resolved ranges.
    pub fn span(&self) -> Duration {
        self.end + Duration::milliseconds(1) - self.start
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self.params();
        write!(f, "{} .. {}", params.start_iso(), params.end_iso())
    }
}

/// Midnight of `date` in `tz`, as a UTC instant.
///
/// An ambiguous midnight resolves to the earlier instant. When a DST jump
/// skips midnight, the first wall time that exists that day is used
/// (01:00 for the usual one-hour gap), tried in quarter-hour steps.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..GAP_STEPS)
        .map(|step| midnight + Duration::minutes(15 * step))
        .find_map(|wall| tz.from_local_datetime(&wall).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Quarter hours tried past a skipped midnight (one day's worth).
const GAP_STEPS: i64 = 24 * 4;
