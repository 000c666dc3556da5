use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Get today's date in the timezone `canonical_timezone`, falling back to UTC
/// when the timezone name is not recognized.
pub fn local_date_today(canonical_timezone: &str) -> time::Date {
    let offset = get_local_offset(canonical_timezone).unwrap_or(UtcOffset::UTC);

    OffsetDateTime::now_utc().to_offset(offset).date()
}
