//! Resolution of predefined date ranges against a reference date.

use adreport_report_models::DateRangeType;
use chrono::{Datelike as _, Days, Months, NaiveDate};

/// Concrete dates covered by a predefined range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// First day of the month the range reports on, for month ranges.
    pub month: Option<NaiveDate>,
}

impl ResolvedRange {
    const fn days(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            month: None,
        }
    }
}

/// Resolves `range` relative to `today`.
///
/// Returns `None` for ranges without fixed bounds (`ALL_TIME`,
/// `CUSTOM_DATE`) and on calendar overflow.
#[must_use]
pub fn resolve(range: DateRangeType, today: NaiveDate) -> Option<ResolvedRange> {
    let days_ago = |n: u64| today.checked_sub_days(Days::new(n));

    match range {
        DateRangeType::Today => Some(ResolvedRange::days(today, today)),
        DateRangeType::Yesterday => {
            let yesterday = days_ago(1)?;
            Some(ResolvedRange::days(yesterday, yesterday))
        }
        DateRangeType::Last7Days => Some(ResolvedRange::days(days_ago(7)?, today)),
        DateRangeType::Last14Days => Some(ResolvedRange::days(days_ago(14)?, today)),
        DateRangeType::Last30Days => Some(ResolvedRange::days(days_ago(30)?, today)),
        DateRangeType::LastWeek => {
            let since_monday = u64::from(today.weekday().num_days_from_monday());
            let monday = days_ago(since_monday + 7)?;
            let sunday = monday.checked_add_days(Days::new(6))?;
            Some(ResolvedRange::days(monday, sunday))
        }
        DateRangeType::ThisMonth => month_of(today.with_day(1)?),
        DateRangeType::LastMonth => {
            month_of(today.with_day(1)?.checked_sub_months(Months::new(1))?)
        }
        DateRangeType::AllTime | DateRangeType::CustomDate => None,
    }
}

fn month_of(first: NaiveDate) -> Option<ResolvedRange> {
    let last = first
        .checked_add_months(Months::new(1))?
        .checked_sub_days(Days::new(1))?;

    Some(ResolvedRange {
        start: first,
        end: last,
        month: Some(first),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // A Wednesday.
    fn today() -> NaiveDate {
        date(2013, 5, 15)
    }

    #[test]
    fn single_day_ranges() {
        let r = resolve(DateRangeType::Today, today()).unwrap();
        assert_eq!((r.start, r.end), (today(), today()));

        let r = resolve(DateRangeType::Yesterday, today()).unwrap();
        assert_eq!((r.start, r.end), (date(2013, 5, 14), date(2013, 5, 14)));
        assert_eq!(r.month, None);
    }

    #[test]
    fn trailing_ranges_end_today() {
        let r = resolve(DateRangeType::Last7Days, today()).unwrap();
        assert_eq!((r.start, r.end), (date(2013, 5, 8), today()));

        let r = resolve(DateRangeType::Last14Days, today()).unwrap();
        assert_eq!(r.start, date(2013, 5, 1));

        let r = resolve(DateRangeType::Last30Days, today()).unwrap();
        assert_eq!(r.start, date(2013, 4, 15));
    }

    #[test]
    fn last_week_is_previous_monday_to_sunday() {
        let r = resolve(DateRangeType::LastWeek, today()).unwrap();
        assert_eq!((r.start, r.end), (date(2013, 5, 6), date(2013, 5, 12)));

        // From a Monday the previous week still ends the day before.
        let r = resolve(DateRangeType::LastWeek, date(2013, 5, 13)).unwrap();
        assert_eq!((r.start, r.end), (date(2013, 5, 6), date(2013, 5, 12)));
    }

    #[test]
    fn month_ranges_cover_whole_months() {
        let r = resolve(DateRangeType::ThisMonth, today()).unwrap();
        assert_eq!((r.start, r.end), (date(2013, 5, 1), date(2013, 5, 31)));
        assert_eq!(r.month, Some(date(2013, 5, 1)));

        let r = resolve(DateRangeType::LastMonth, date(2013, 3, 31)).unwrap();
        assert_eq!((r.start, r.end), (date(2013, 2, 1), date(2013, 2, 28)));
        assert_eq!(r.month, Some(date(2013, 2, 1)));

        let r = resolve(DateRangeType::LastMonth, date(2013, 1, 10)).unwrap();
        assert_eq!((r.start, r.end), (date(2012, 12, 1), date(2012, 12, 31)));
    }

    #[test]
    fn open_ranges_do_not_resolve() {
        assert!(resolve(DateRangeType::AllTime, today()).is_none());
        assert!(resolve(DateRangeType::CustomDate, today()).is_none());
    }
}
