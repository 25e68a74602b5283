//! Timestamp parsing for API payloads and display formatting for the UI.

use time::{
    OffsetDateTime, PrimitiveDateTime, UtcOffset,
    format_description::{FormatItem, well_known::Rfc3339},
    macros::format_description,
};

/// Display value for threads touched during the current session.
pub const JUST_NOW: &str = "now";

const MESSAGE_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour repr:12 padding:zero]:[minute padding:zero] [period case:upper]");

const THREAD_DATE_FORMAT: &[FormatItem<'static>] = format_description!(
    "[month padding:none]/[day padding:none]/[year], [hour repr:12 padding:none]:[minute]:[second] [period]"
);

const NAIVE_ISO_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// Accepts RFC 3339 and the offset-less ISO form the API emits for naive
/// datetimes, which are taken as UTC. Fractional seconds are ignored.
pub fn parse_api_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let trimmed = raw.trim();
    if let Ok(datetime) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Some(datetime);
    }
    let normalized = trimmed.replacen(' ', "T", 1);
    let whole_seconds = normalized.split('.').next().unwrap_or(&normalized);
    PrimitiveDateTime::parse(whole_seconds, NAIVE_ISO_FORMAT)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

pub fn format_thread_date(datetime: OffsetDateTime, offset: UtcOffset) -> String {
    datetime
        .to_offset(offset)
        .format(THREAD_DATE_FORMAT)
        .unwrap_or_default()
}

pub fn format_message_time(datetime: OffsetDateTime, offset: UtcOffset) -> String {
    datetime
        .to_offset(offset)
        .format(MESSAGE_TIME_FORMAT)
        .unwrap_or_default()
}

/// Thread list timestamp. Unparseable values are shown verbatim.
pub fn thread_timestamp(raw: Option<&str>) -> String {
    match raw {
        Some(raw) => match parse_api_timestamp(raw) {
            Some(datetime) => format_thread_date(datetime, local_offset()),
            None => raw.to_string(),
        },
        None => String::new(),
    }
}

pub fn message_timestamp(raw: Option<&str>) -> String {
    raw.and_then(parse_api_timestamp)
        .map(|datetime| format_message_time(datetime, local_offset()))
        .unwrap_or_default()
}

pub fn current_message_time() -> String {
    format_message_time(OffsetDateTime::now_utc(), local_offset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn parses_rfc3339_and_naive_iso() {
        assert_eq!(
            parse_api_timestamp("2024-01-01T00:00:00Z"),
            Some(datetime!(2024-01-01 0:00 UTC))
        );
        assert_eq!(
            parse_api_timestamp("2024-03-05T14:07:09.123456"),
            Some(datetime!(2024-03-05 14:07:09 UTC))
        );
        assert_eq!(
            parse_api_timestamp("2024-03-05 14:07:09"),
            Some(datetime!(2024-03-05 14:07:09 UTC))
        );
        assert!(parse_api_timestamp("yesterday").is_none());
    }

    #[test]
    fn formats_thread_dates_like_a_locale_string() {
        let value = format_thread_date(datetime!(2024-01-01 0:00 UTC), UtcOffset::UTC);
        assert_eq!(value, "1/1/2024, 12:00:00 AM");

        let afternoon = format_thread_date(datetime!(2024-11-23 15:04:05 UTC), UtcOffset::UTC);
        assert_eq!(afternoon, "11/23/2024, 3:04:05 PM");
    }

    #[test]
    fn formats_message_times_with_two_digit_hours() {
        let value = format_message_time(datetime!(2024-01-01 9:05 UTC), UtcOffset::UTC);
        assert_eq!(value, "09:05 AM");
    }

    #[test]
    fn unparseable_thread_timestamp_is_kept() {
        assert_eq!(thread_timestamp(Some("soon")), "soon");
        assert_eq!(thread_timestamp(None), "");
        assert_eq!(message_timestamp(Some("soon")), "");
    }
}
