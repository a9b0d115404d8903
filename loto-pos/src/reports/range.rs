//! 报表日期范围：业务时区转换
//!
//! Ranges are computed in the business timezone and sent to the backend as
//! UTC ISO-8601 strings with millisecond precision (`2026-10-19T05:00:00.000Z`).

use chrono::{
    DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeDelta, Timelike,
    Utc,
};
use chrono_tz::Tz;
use loto_client::InvoiceQuery;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportMode {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl ReportMode {
    /// Name used in exported file names
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportMode::Daily => "diario",
            ReportMode::Weekly => "semanal",
            ReportMode::Monthly => "mensual",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportMode::Daily => "Diario",
            ReportMode::Weekly => "Semanal",
            ReportMode::Monthly => "Mensual",
        }
    }
}

impl std::fmt::Display for ReportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "diario" | "daily" => Ok(ReportMode::Daily),
            "semanal" | "weekly" => Ok(ReportMode::Weekly),
            "mensual" | "monthly" => Ok(ReportMode::Monthly),
            other => Err(format!("unknown report mode: {other}")),
        }
    }
}

/// Inclusive UTC range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn to_query(&self) -> InvoiceQuery {
        InvoiceQuery {
            start: iso_millis(&self.start),
            end: iso_millis(&self.end),
        }
    }
}

/// `toISOString` format: UTC, milliseconds, `Z`
pub fn iso_millis(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Today in the business timezone
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Longest skipped stretch of wall time (Samoa dropped a whole day in 2011)
const MAX_GAP_MINUTES: u32 = 24 * 60;

/// 本地时间 → UTC
///
/// Ambiguous local times pick the earlier instant for a range start and the
/// later one for a range end. A wall time skipped by a DST jump resolves to
/// the first instant after the jump, e.g. 00:00 on a day whose clocks go
/// straight to 01:00 becomes 01:00.
fn local_to_utc(naive: NaiveDateTime, tz: Tz, prefer_latest: bool) -> DateTime<Utc> {
    let resolve = |candidate: NaiveDateTime| {
        let local = candidate.and_local_timezone(tz);
        if prefer_latest {
            local.latest()
        } else {
            local.earliest()
        }
    };
    if let Some(dt) = resolve(naive) {
        return dt.with_timezone(&Utc);
    }

    // jumps happen on whole minutes: walk from the minute boundary
    let mut candidate = naive
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(naive);
    for _ in 0..MAX_GAP_MINUTES {
        candidate += TimeDelta::minutes(1);
        if let Some(dt) = resolve(candidate) {
            return dt.with_timezone(&Utc);
        }
    }
    tracing::warn!(%naive, %tz, "Local time never resolved, reading it as UTC");
    naive.and_utc()
}

fn day_start(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    local_to_utc(date.and_time(NaiveTime::MIN), tz, false)
}

fn at(date: NaiveDate, h: u32, m: u32, s: u32, milli: u32, tz: Tz) -> Option<DateTime<Utc>> {
    let time = NaiveTime::from_hms_milli_opt(h, m, s, milli)?;
    Some(local_to_utc(date.and_time(time), tz, true))
}

fn last_day_of_month(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()
}

/// Range for `mode`.
///
/// - daily: today 00:00:00.000 → 23:59:59.999
/// - monthly: first day 00:00:00.000 → last day 23:59:59
/// - weekly: `start` 00:00:00.000 → `end` 23:59:59.999, both inclusive
///
/// Weekly returns `None` (nothing to fetch) while either date is unset or
/// when `start` is after `end`.
pub fn compute_range(
    mode: ReportMode,
    today: NaiveDate,
    tz: Tz,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Option<DateRange> {
    match mode {
        ReportMode::Daily => Some(DateRange {
            start: day_start(today, tz),
            end: at(today, 23, 59, 59, 999, tz)?,
        }),
        ReportMode::Monthly => {
            let first = today.with_day(1)?;
            Some(DateRange {
                start: day_start(first, tz),
                end: at(last_day_of_month(today)?, 23, 59, 59, 0, tz)?,
            })
        }
        ReportMode::Weekly => {
            let (start, end) = (start?, end?);
            if start > end {
                tracing::debug!(%start, %end, "Weekly range start after end, nothing to fetch");
                return None;
            }
            Some(DateRange {
                start: day_start(start, tz),
                end: at(end, 23, 59, 59, 999, tz)?,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::{Bogota, Santiago};
    use chrono_tz::Europe::Madrid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_range_in_business_timezone() {
        let range = compute_range(ReportMode::Daily, date(2026, 10, 19), Bogota, None, None).unwrap();
        let q = range.to_query();
        // Bogota is UTC-5 all year
        assert_eq!(q.start, "2026-10-19T05:00:00.000Z");
        assert_eq!(q.end, "2026-10-20T04:59:59.999Z");
    }

    #[test]
    fn test_monthly_range_ends_on_last_second() {
        let range =
            compute_range(ReportMode::Monthly, date(2026, 2, 14), Bogota, None, None).unwrap();
        let q = range.to_query();
        assert_eq!(q.start, "2026-02-01T05:00:00.000Z");
        assert_eq!(q.end, "2026-03-01T04:59:59.000Z");

        let december =
            compute_range(ReportMode::Monthly, date(2026, 12, 3), Bogota, None, None).unwrap();
        assert_eq!(december.to_query().end, "2027-01-01T04:59:59.000Z");
    }

    #[test]
    fn test_weekly_range_includes_both_dates() {
        let range = compute_range(
            ReportMode::Weekly,
            date(2026, 10, 19),
            Bogota,
            Some(date(2026, 10, 12)),
            Some(date(2026, 10, 18)),
        )
        .unwrap();
        let q = range.to_query();
        assert_eq!(q.start, "2026-10-12T05:00:00.000Z");
        assert_eq!(q.end, "2026-10-19T04:59:59.999Z");

        let single = compute_range(
            ReportMode::Weekly,
            date(2026, 10, 19),
            Bogota,
            Some(date(2026, 10, 12)),
            Some(date(2026, 10, 12)),
        )
        .unwrap();
        assert!(single.start < single.end);
    }

    #[test]
    fn test_weekly_without_dates_fetches_nothing() {
        let today = date(2026, 10, 19);
        assert!(compute_range(ReportMode::Weekly, today, Bogota, None, Some(today)).is_none());
        assert!(compute_range(ReportMode::Weekly, today, Bogota, Some(today), None).is_none());
        assert!(
            compute_range(
                ReportMode::Weekly,
                today,
                Bogota,
                Some(date(2026, 10, 20)),
                Some(today)
            )
            .is_none()
        );
    }

    #[test]
    fn test_daily_range_across_dst_change() {
        // Madrid leaves summer time on 2026-10-25: the day lasts 25 hours
        let range = compute_range(ReportMode::Daily, date(2026, 10, 25), Madrid, None, None).unwrap();
        assert_eq!(range.to_query().start, "2026-10-24T22:00:00.000Z");
        assert_eq!(range.to_query().end, "2026-10-25T22:59:59.999Z");
    }

    #[test]
    fn test_midnight_skipped_by_dst_starts_after_the_jump() {
        // Santiago jumps from 00:00 (-04) to 01:00 (-03) on 2024-09-08
        let day = date(2024, 9, 8);
        let daily = compute_range(ReportMode::Daily, day, Santiago, None, None).unwrap();
        assert_eq!(daily.to_query().start, "2024-09-08T04:00:00.000Z");
        assert_eq!(daily.to_query().end, "2024-09-09T02:59:59.999Z");

        let weekly = compute_range(
            ReportMode::Weekly,
            date(2024, 9, 10),
            Santiago,
            Some(day),
            Some(date(2024, 9, 9)),
        )
        .unwrap();
        assert_eq!(weekly.start, daily.start);

        // the day before still ends at its own midnight
        let before = compute_range(ReportMode::Daily, date(2024, 9, 7), Santiago, None, None).unwrap();
        assert!(before.end < daily.start);
    }

    #[test]
    fn test_mode_names() {
        assert_eq!("semanal".parse::<ReportMode>().unwrap(), ReportMode::Weekly);
        assert_eq!("Monthly".parse::<ReportMode>().unwrap(), ReportMode::Monthly);
        assert!("anual".parse::<ReportMode>().is_err());
        assert_eq!(ReportMode::Daily.to_string(), "diario");
    }
}
