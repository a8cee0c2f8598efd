//! Report window resolution.
//!
//! Pure functions over local wall-clock time; callers convert to UTC with
//! [`DateRange::to_utc`].

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::error::ReportError;

/// Earliest accepted year.
pub const MIN_YEAR: i32 = 1900;
/// Latest accepted year.
pub const MAX_YEAR: i32 = 9999;

/// Report granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    /// One calendar day.
    Day,
    /// One ISO week, or an explicit range.
    Week,
    /// One calendar month.
    Month,
    /// One calendar year.
    Year,
}

impl ReportPeriod {
    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl std::str::FromStr for ReportPeriod {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(ReportError::InvalidPeriod(s.to_string())),
        }
    }
}

/// Raw query parameters. All optional; which ones matter depends on the period.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeParams {
    /// `YYYY-MM-DD`, for `day`.
    pub date: Option<String>,
    /// Range start, for `week`.
    #[serde(alias = "date_from")]
    pub date_from: Option<String>,
    /// Range end, for `week`.
    #[serde(alias = "date_to")]
    pub date_to: Option<String>,
    /// Calendar year.
    pub year: Option<String>,
    /// Month 1-12.
    pub month: Option<String>,
    /// ISO week number.
    pub week: Option<String>,
}

/// Inclusive local window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    /// First instant.
    pub start: NaiveDateTime,
    /// Last instant.
    pub end: NaiveDateTime,
}

impl DateRange {
    /// Whole local days from `first` through `last`.
    #[must_use]
    pub fn days(first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            start: start_of_day(first),
            end: end_of_day(last),
        }
    }

    /// The window as UTC instants.
    ///
    /// Ambiguous local times take the widest reading; skipped ones move forward.
    #[must_use]
    pub fn to_utc(&self, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
        (localize(tz, self.start, false), localize(tz, self.end, true))
    }
}

fn localize(tz: Tz, local: NaiveDateTime, latest: bool) -> DateTime<Utc> {
    let mut candidate = local;
    for _ in 0..3 {
        let resolved = tz.from_local_datetime(&candidate);
        let picked = if latest {
            resolved.latest()
        } else {
            resolved.earliest()
        };
        if let Some(at) = picked {
            return at.with_timezone(&Utc);
        }
        candidate += Duration::hours(1);
    }
    Utc.from_utc_datetime(&local)
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::default())
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    start_of_day(date) + Duration::days(1) - Duration::milliseconds(1)
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Parses `YYYY-MM-DD`, or the date part of an RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ReportError> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|d| d.date_naive()))
        .map_err(|_| ReportError::InvalidDate(raw.to_string()))
}

fn parse_year(raw: Option<&str>, now: NaiveDateTime) -> Result<i32, ReportError> {
    let Some(raw) = raw else {
        return Ok(now.year());
    };
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|y| (MIN_YEAR..=MAX_YEAR).contains(y))
        .ok_or_else(|| ReportError::InvalidYear(raw.to_string()))
}

fn parse_month(raw: Option<&str>, now: NaiveDateTime) -> Result<u32, ReportError> {
    let Some(raw) = raw else {
        return Ok(now.month());
    };
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|m| (1..=12).contains(m))
        .ok_or_else(|| ReportError::InvalidMonth(raw.to_string()))
}

/// Resolves report windows against a fixed "now".
pub struct RangeResolver;

impl RangeResolver {
    /// Resolves `period` and `params` into an inclusive local window.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - a required parameter is missing or unparseable
    /// - the window starts after `now`
    /// - the window starts after it ends
    pub fn resolve(
        period: ReportPeriod,
        params: &RangeParams,
        now: NaiveDateTime,
    ) -> Result<DateRange, ReportError> {
        match period {
            ReportPeriod::Day => Self::day(params),
            ReportPeriod::Week => Self::clamp(Self::week(params, now)?, now),
            ReportPeriod::Month => Self::clamp(Self::month(params, now)?, now),
            ReportPeriod::Year => Self::clamp(Self::year(params, now)?, now),
        }
    }

    fn day(params: &RangeParams) -> Result<DateRange, ReportError> {
        let raw = params
            .date
            .as_deref()
            .ok_or(ReportError::MissingParameter("date"))?;
        let date = parse_date(raw)?;
        Ok(DateRange {
            start: start_of_day(date),
            end: end_of_day(date),
        })
    }

    fn week(params: &RangeParams, now: NaiveDateTime) -> Result<DateRange, ReportError> {
        if let Some(raw) = params.week.as_deref() {
            let year = parse_year(params.year.as_deref(), now)?;
            let monday = raw
                .trim()
                .parse::<u32>()
                .ok()
                .and_then(|w| NaiveDate::from_isoywd_opt(year, w, Weekday::Mon))
                .ok_or_else(|| ReportError::InvalidWeek(raw.to_string()))?;
            return Ok(Self::iso_week(monday));
        }

        let from = params.date_from.as_deref().map(parse_date).transpose()?;
        let to = params.date_to.as_deref().map(parse_date).transpose()?;

        Ok(match (from, to) {
            (Some(from), Some(to)) => DateRange {
                start: start_of_day(from),
                end: end_of_day(to),
            },
            (Some(anchor), None) | (None, Some(anchor)) => Self::iso_week(anchor),
            (None, None) => Self::iso_week(now.date()),
        })
    }

    fn iso_week(anchor: NaiveDate) -> DateRange {
        let monday = monday_of(anchor);
        DateRange {
            start: start_of_day(monday),
            end: end_of_day(monday + Duration::days(6)),
        }
    }

    fn month(params: &RangeParams, now: NaiveDateTime) -> Result<DateRange, ReportError> {
        let year = parse_year(params.year.as_deref(), now)?;
        let month = parse_month(params.month.as_deref(), now)?;

        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| ReportError::InvalidMonth(month.to_string()))?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(|| ReportError::InvalidYear(year.to_string()))?;

        Ok(DateRange {
            start: start_of_day(first),
            end: start_of_day(next) - Duration::milliseconds(1),
        })
    }

    fn year(params: &RangeParams, now: NaiveDateTime) -> Result<DateRange, ReportError> {
        let year = parse_year(params.year.as_deref(), now)?;
        let first = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| ReportError::InvalidYear(year.to_string()))?;
        let last = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or_else(|| ReportError::InvalidYear(year.to_string()))?;
        Ok(DateRange {
            start: start_of_day(first),
            end: end_of_day(last),
        })
    }

    fn clamp(range: DateRange, now: NaiveDateTime) -> Result<DateRange, ReportError> {
        if range.start > now {
            return Err(ReportError::FutureRange(range.start));
        }
        let end = range.end.min(now);
        if range.start > end {
            return Err(ReportError::InvalidDateRange {
                start: range.start,
                end,
            });
        }
        Ok(DateRange {
            start: range.start,
            end,
        })
    }
}
