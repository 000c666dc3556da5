//! Converting canonical monthly budget amounts to the user's view period.

use crate::user::ViewPeriod;

/// The average length of a month in days, used as the proration anchor.
pub const AVERAGE_DAYS_PER_MONTH: f64 = 30.44;

/// Convert a monthly budget amount to the amount for one view period.
///
/// Weekly amounts are `monthly * 7 / 30.44` and biweekly amounts
/// `monthly * 14 / 30.44`, rounded to the nearest cent with halves rounding
/// away from zero (`f64::round`). Monthly amounts pass through unchanged so
/// the monthly view never accumulates rounding drift.
pub fn prorate_monthly_amount(monthly_cents: i64, view_period: ViewPeriod) -> i64 {
    match view_period {
        ViewPeriod::Weekly => prorate(monthly_cents, 7.0),
        ViewPeriod::Biweekly => prorate(monthly_cents, 14.0),
        ViewPeriod::Monthly => monthly_cents,
    }
}

fn prorate(monthly_cents: i64, days_per_period: f64) -> i64 {
    ((monthly_cents as f64) * (days_per_period / AVERAGE_DAYS_PER_MONTH)).round() as i64
}
