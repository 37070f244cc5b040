use crate::error::{time_range_error, OotoResult};
use chrono::{DateTime, Datelike, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Parse time string in HH:MM format
pub fn parse_time(time_str: &str) -> Option<(u32, u32)> {
    let parts: Vec<&str> = time_str.trim().split(':').collect();
    if parts.len() != 2 {
        return None;
    }
    let hour = parts[0].parse::<u32>().ok()?;
    let minute = parts[1].parse::<u32>().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

/// Parse a date in YYYY-MM-DD format
pub fn parse_date(date_str: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").ok()
}

/// Parse an HH:MM string into a time of day
pub fn parse_time_of_day(time_str: &str) -> Option<NaiveTime> {
    let (hour, minute) = parse_time(time_str)?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Calendar date as `M/D/YYYY`, no zero padding
pub fn format_calendar_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

/// Look up a canonical zone id
pub fn parse_timezone(zone_id: &str) -> OotoResult<Tz> {
    zone_id
        .trim()
        .parse::<Tz>()
        .map_err(|_| time_range_error(&format!("Unknown timezone '{}'", zone_id)))
}

/// Wall-clock span the user is away, in their own zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub all_day: bool,
}

impl TimeRange {
    /// Span between two wall-clock instants; `start` must come first
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, all_day: bool) -> OotoResult<Self> {
        if start >= end {
            return Err(time_range_error(&format!(
                "start {} is not before end {}",
                start, end
            )));
        }
        Ok(Self {
            start,
            end,
            all_day,
        })
    }

    /// Build a range from form-style inputs.
    ///
    /// All-day ranges run from 00:00:00 on the start date to 23:59:59 on the end date and
    /// ignore the times. Otherwise both times are required.
    pub fn from_inputs(
        start_date: NaiveDate,
        start_time: Option<NaiveTime>,
        end_date: NaiveDate,
        end_time: Option<NaiveTime>,
        all_day: bool,
    ) -> OotoResult<Self> {
        let (start_time, end_time) = if all_day {
            let midnight = NaiveTime::from_hms_opt(0, 0, 0)
                .ok_or_else(|| time_range_error("Failed to create start of day"))?;
            let last_second = NaiveTime::from_hms_opt(23, 59, 59)
                .ok_or_else(|| time_range_error("Failed to create end of day"))?;
            (midnight, last_second)
        } else {
            match (start_time, end_time) {
                (Some(start), Some(end)) => (start, end),
                _ => {
                    return Err(time_range_error(
                        "start and end times are required unless the range is all-day",
                    ))
                }
            }
        };

        Self::new(
            start_date.and_time(start_time),
            end_date.and_time(end_time),
            all_day,
        )
    }

    /// Build a range from raw command-line text. Times are not read for all-day ranges.
    pub fn parse(
        start_date: &str,
        start_time: Option<&str>,
        end_date: &str,
        end_time: Option<&str>,
        all_day: bool,
    ) -> OotoResult<Self> {
        let start = parse_date(start_date)
            .ok_or_else(|| time_range_error(&format!("Invalid start date '{}'", start_date)))?;
        let end = parse_date(end_date)
            .ok_or_else(|| time_range_error(&format!("Invalid end date '{}'", end_date)))?;

        if all_day {
            return Self::from_inputs(start, None, end, None, true);
        }

        let start_time = start_time
            .map(|s| {
                parse_time_of_day(s)
                    .ok_or_else(|| time_range_error(&format!("Invalid start time '{}'", s)))
            })
            .transpose()?;
        let end_time = end_time
            .map(|s| {
                parse_time_of_day(s)
                    .ok_or_else(|| time_range_error(&format!("Invalid end time '{}'", s)))
            })
            .transpose()?;

        Self::from_inputs(start, start_time, end, end_time, false)
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end.date()
    }

    /// The range as UTC instants, reading the wall-clock times in `tz`
    pub fn to_utc(&self, tz: Tz) -> OotoResult<(DateTime<Utc>, DateTime<Utc>)> {
        Ok((to_utc(&self.start, tz)?, to_utc(&self.end, tz)?))
    }
}

fn to_utc(local: &NaiveDateTime, tz: Tz) -> OotoResult<DateTime<Utc>> {
    let resolved = match tz.from_local_datetime(local) {
        LocalResult::Single(dt) => dt,
        // Repeated hour at the end of DST; take the first occurrence
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            return Err(time_range_error(&format!(
                "{} does not exist in {}",
                local, tz
            )));
        }
    };
    Ok(resolved.with_timezone(&Utc))
}
