//! Deriving the bounds of the current spending period.
//!
//! Periods are inclusive date ranges. Where a period starts is controlled by
//! the user's anchor day: a day-of-month (1-28) for monthly periods, a
//! day-of-week (0=Sunday..6=Saturday) for weekly and biweekly periods. The
//! user's stored reference date fixes which week starts a biweekly period.

use time::{Date, Duration, Month};

use crate::user::ViewPeriod;

/// An inclusive range of dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

/// Compute the spending period that contains `today`.
///
/// `anchor_day` is interpreted per the view period (day-of-month or
/// day-of-week); when absent, monthly periods follow the calendar month and
/// weekly/biweekly periods align to the weekday of `reference_date`.
pub fn current_period(
    view_period: ViewPeriod,
    anchor_day: Option<u8>,
    reference_date: Date,
    today: Date,
) -> DateRange {
    match view_period {
        ViewPeriod::Monthly => monthly_bounds(anchor_day.unwrap_or(1), today),
        ViewPeriod::Weekly => weekly_bounds(resolve_weekday(anchor_day, reference_date), today),
        ViewPeriod::Biweekly => biweekly_bounds(
            resolve_weekday(anchor_day, reference_date),
            reference_date,
            today,
        ),
    }
}

/// Whole days from `today` until the end of the period's last day.
///
/// The end date is inclusive, so the remaining time is the ceiling of the
/// distance to the end of that day. Never negative: past dates return 0.
pub fn days_remaining_in_period(end: Date, today: Date) -> i64 {
    let remaining = (end - today).whole_days() + 1;

    remaining.max(0)
}

fn resolve_weekday(anchor_day: Option<u8>, reference_date: Date) -> u8 {
    anchor_day
        .filter(|day| *day <= 6)
        .unwrap_or_else(|| reference_date.weekday().number_days_from_sunday())
}

fn monthly_bounds(anchor_day: u8, today: Date) -> DateRange {
    // Clamped to 28 so the anchor exists in every month.
    let anchor_day = anchor_day.clamp(1, 28);

    let start = if today.day() >= anchor_day {
        Date::from_calendar_date(today.year(), today.month(), anchor_day)
            .expect("anchor day fits every month")
    } else {
        let (year, month) = previous_month(today.year(), today.month());
        Date::from_calendar_date(year, month, anchor_day).expect("anchor day fits every month")
    };

    let (next_year, next_month) = next_month(start.year(), start.month());
    let end = Date::from_calendar_date(next_year, next_month, anchor_day)
        .expect("anchor day fits every month")
        - Duration::days(1);

    DateRange { start, end }
}

fn weekly_bounds(anchor_weekday: u8, today: Date) -> DateRange {
    let days_since_anchor =
        (today.weekday().number_days_from_sunday() + 7 - anchor_weekday) % 7;
    let start = today - Duration::days(days_since_anchor as i64);
    let end = start + Duration::days(6);

    DateRange { start, end }
}

fn biweekly_bounds(anchor_weekday: u8, reference_date: Date, today: Date) -> DateRange {
    let candidate = weekly_bounds(anchor_weekday, today).start;
    let reference_start = weekly_bounds(anchor_weekday, reference_date).start;

    // Both dates sit on the anchor weekday, so the gap is whole weeks. An
    // odd gap means the candidate week is mid-period.
    let weeks_since_reference = (candidate - reference_start).whole_days() / 7;
    let start = if weeks_since_reference.rem_euclid(2) == 1 {
        candidate - Duration::weeks(1)
    } else {
        candidate
    };
    let end = start + Duration::days(13);

    DateRange { start, end }
}

fn previous_month(year: i32, month: Month) -> (i32, Month) {
    match month {
        Month::January => (year - 1, Month::December),
        other => (year, other.previous()),
    }
}

fn next_month(year: i32, month: Month) -> (i32, Month) {
    match month {
        Month::December => (year + 1, Month::January),
        other => (year, other.next()),
    }
}

#[cfg(test)]
mod days_remaining_tests {
    use time::macros::date;

    use super::days_remaining_in_period;

    #[test]
    fn counts_the_end_date_itself() {
        // The period ends at the end of its last day, so on that day one
        // day still remains.
        assert_eq!(
            days_remaining_in_period(date!(2024 - 08 - 07), date!(2024 - 08 - 07)),
            1
        );
        assert_eq!(
            days_remaining_in_period(date!(2024 - 08 - 10), date!(2024 - 08 - 07)),
            4
        );
    }

    #[test]
    fn never_negative() {
        assert_eq!(
            days_remaining_in_period(date!(2024 - 08 - 01), date!(2024 - 08 - 07)),
            0
        );
        assert_eq!(
            days_remaining_in_period(date!(2020 - 01 - 01), date!(2024 - 08 - 07)),
            0
        );
    }
}


#[cfg(test)]
mod weekly_period_tests {
    use time::macros::date;

    use crate::user::ViewPeriod;

    use super::current_period;

    #[test]
    fn starts_on_the_anchor_weekday() {
        // 2024-08-07 is a Wednesday; anchor 1 = Monday.
        let period = current_period(
            ViewPeriod::Weekly,
            Some(1),
            date!(2024 - 01 - 01),
            date!(2024 - 08 - 07),
        );

        assert_eq!(period.start, date!(2024 - 08 - 05));
        assert_eq!(period.end, date!(2024 - 08 - 11));
    }

    #[test]
    fn anchor_day_on_today_starts_today() {
        // Anchor 3 = Wednesday, and today is a Wednesday.
        let period = current_period(
            ViewPeriod::Weekly,
            Some(3),
            date!(2024 - 01 - 01),
            date!(2024 - 08 - 07),
        );

        assert_eq!(period.start, date!(2024 - 08 - 07));
        assert_eq!(period.end, date!(2024 - 08 - 13));
    }

    #[test]
    fn missing_anchor_falls_back_to_the_reference_weekday() {
        // 2024-01-01 is a Monday, so periods run Monday to Sunday.
        let period = current_period(
            ViewPeriod::Weekly,
            None,
            date!(2024 - 01 - 01),
            date!(2024 - 08 - 07),
        );

        assert_eq!(period.start, date!(2024 - 08 - 05));
        assert_eq!(period.end, date!(2024 - 08 - 11));
    }

    #[test]
    fn period_always_contains_today() {
        let reference = date!(2024 - 01 - 01);
        let mut today = date!(2024 - 08 - 01);

        for _ in 0..21 {
            for anchor in 0..=6u8 {
                let period =
                    current_period(ViewPeriod::Weekly, Some(anchor), reference, today);
                assert!(
                    period.start <= today && today <= period.end,
                    "{today} outside {period:?} for anchor {anchor}"
                );
                assert_eq!((period.end - period.start).whole_days(), 6);
            }
            today = today.next_day().unwrap();
        }
    }
}

#[cfg(test)]
mod biweekly_period_tests {
    use time::{Duration, macros::date};

    use crate::user::ViewPeriod;

    use super::current_period;

    #[test]
    fn spans_fourteen_days_from_the_reference_parity() {
        // Reference 2024-01-01 is a Monday; periods run in 14-day strides
        // from it: Jan 1, Jan 15, ..., Jul 29. Aug 7 falls in the stride
        // starting Jul 29, not in the week of Aug 5.
        let period = current_period(
            ViewPeriod::Biweekly,
            Some(1),
            date!(2024 - 01 - 01),
            date!(2024 - 08 - 07),
        );

        assert_eq!(period.start, date!(2024 - 07 - 29));
        assert_eq!(period.end, date!(2024 - 08 - 11));
    }

    #[test]
    fn second_week_of_a_period_does_not_start_a_new_one() {
        let first_week = current_period(
            ViewPeriod::Biweekly,
            Some(1),
            date!(2024 - 01 - 01),
            date!(2024 - 08 - 01),
        );
        let second_week = current_period(
            ViewPeriod::Biweekly,
            Some(1),
            date!(2024 - 01 - 01),
            date!(2024 - 08 - 07),
        );

        assert_eq!(first_week, second_week);
    }

    #[test]
    fn consecutive_periods_tile_without_gaps() {
        let reference = date!(2024 - 01 - 01);
        let current = current_period(
            ViewPeriod::Biweekly,
            Some(1),
            reference,
            date!(2024 - 08 - 07),
        );
        let next = current_period(
            ViewPeriod::Biweekly,
            Some(1),
            reference,
            current.end + Duration::days(1),
        );

        assert_eq!(next.start, current.end + Duration::days(1));
        assert_eq!((next.end - next.start).whole_days(), 13);
    }

    #[test]
    fn period_always_contains_today() {
        let reference = date!(2024 - 03 - 06);
        let mut today = date!(2024 - 08 - 01);

        for _ in 0..30 {
            let period = current_period(ViewPeriod::Biweekly, None, reference, today);
            assert!(
                period.start <= today && today <= period.end,
                "{today} outside {period:?}"
            );
            assert_eq!((period.end - period.start).whole_days(), 13);
            today = today.next_day().unwrap();
        }
    }

    #[test]
    fn works_when_today_is_before_the_reference() {
        let reference = date!(2024 - 08 - 05);
        let today = date!(2024 - 07 - 01);

        let period = current_period(ViewPeriod::Biweekly, Some(1), reference, today);

        assert!(period.start <= today && today <= period.end);
        assert_eq!((period.end - period.start).whole_days(), 13);
    }
}
