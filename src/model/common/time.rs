use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Wall-clock timestamp format used on the wire.
pub const WIRE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a timestamp from the wire.
///
/// Accepts RFC 3339 (explicit offset) or `YYYY-MM-DD HH:MM:SS[.fff]`, which
/// is read as wall-clock time at the server's configured offset.
pub fn parse_timestamp(raw: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").ok()?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Render a timestamp as wall-clock time at the given offset.
pub fn format_timestamp(dt: DateTime<Utc>, offset: FixedOffset) -> String {
    dt.with_timezone(&offset).format(WIRE_FORMAT).to_string()
}

/// The calendar day a timestamp falls on at the given offset.
pub fn local_day(dt: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    dt.with_timezone(&offset).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkt() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600).unwrap()
    }

    #[test]
    fn wall_clock_uses_offset() {
        let dt = parse_timestamp("2025-02-08 09:00:00", pkt()).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 2, 8, 4, 0, 0).unwrap());
        assert_eq!(format_timestamp(dt, pkt()), "2025-02-08 09:00:00");
    }

    #[test]
    fn fractional_seconds() {
        let dt = parse_timestamp(" 2025-02-08 09:00:00.5 ", pkt()).unwrap();
        assert_eq!(dt.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn rfc3339_keeps_its_offset() {
        let dt = parse_timestamp("2025-02-08T09:00:00+00:00", pkt()).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 2, 8, 9, 0, 0).unwrap());
    }

    #[test]
    fn garbage() {
        assert!(parse_timestamp("", pkt()).is_none());
        assert!(parse_timestamp("tomorrow at nine", pkt()).is_none());
        assert!(parse_timestamp("2025-02-30 09:00:00", pkt()).is_none());
    }

    #[test]
    fn day_boundary() {
        // 20:30 UTC is already the next day in Pakistan.
        let dt = Utc.with_ymd_and_hms(2025, 2, 8, 20, 30, 0).unwrap();
        assert_eq!(local_day(dt, pkt()), NaiveDate::from_ymd_opt(2025, 2, 9).unwrap());
        assert_eq!(
            local_day(dt, FixedOffset::east_opt(0).unwrap()),
            NaiveDate::from_ymd_opt(2025, 2, 8).unwrap()
        );
    }
}
