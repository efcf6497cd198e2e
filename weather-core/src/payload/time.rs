use chrono::{DateTime, FixedOffset, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Clock-only formats seen in astronomy payloads: `6:55PM` and `18:55:00`.
const CLOCK_FORMATS: &[&str] = &["%I:%M%p", "%H:%M:%S"];

/// Parse the timestamp HERE attaches to every period.
///
/// The offset written by the provider is kept so that clock-only fields of the
/// same record can be anchored to the right calendar day. Timestamps without
/// an offset are taken as UTC.
pub fn parse_provider_time(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();

    DateTime::parse_from_rfc3339(value).ok().or_else(|| {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc().fixed_offset())
    })
}

pub fn parse_clock(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    CLOCK_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(value, format).ok())
}

/// Combine a wall-clock time like `6:55PM` with the record's timestamp.
///
/// The date is taken from `reference` in its own offset and the clock is read
/// as a local time in that same offset. Returns `None` if the clock cannot be
/// parsed.
pub fn combine_utc_and_local(
    local_time: &str,
    reference: &DateTime<FixedOffset>,
) -> Option<DateTime<Utc>> {
    let clock = parse_clock(local_time)?;
    let naive = reference.date_naive().and_time(clock);

    reference
        .offset()
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
}
