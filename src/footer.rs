// src/footer.rs
//! "更新：…" footer line: feed timestamp shown in Japan Standard Time.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike};

const JST_OFFSET_SECS: i32 = 9 * 3600;

fn jst() -> FixedOffset {
    FixedOffset::east_opt(JST_OFFSET_SECS).expect("+09:00 is a valid offset")
}

/// Parse the feed's `generated_at`.
///
/// Accepts RFC 3339 (what the feed builder writes), a naive date-time which is
/// taken as JST, or a bare date which is taken as UTC midnight.
pub fn parse_generated_at(raw: &str) -> Option<DateTime<FixedOffset>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return jst().from_local_datetime(&naive).single();
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// `ja-JP` style rendering in Asia/Tokyo, e.g. `2024/1/1 9:00:00`.
pub fn format_jst<Tz: TimeZone>(dt: &DateTime<Tz>) -> String {
    let t = dt.with_timezone(&jst());
    format!(
        "{}/{}/{} {}:{:02}:{:02}",
        t.year(),
        t.month(),
        t.day(),
        t.hour(),
        t.minute(),
        t.second()
    )
}

/// Full footer text, or `None` when the timestamp cannot be read.
pub fn footer_text(generated_at: &str) -> Option<String> {
    let dt = parse_generated_at(generated_at)?;
    Some(format!("更新：{} JST", format_jst(&dt)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_midnight_is_nine_am_in_tokyo() {
        assert_eq!(
            footer_text("2024-01-01T00:00:00Z").as_deref(),
            Some("更新：2024/1/1 9:00:00 JST")
        );
    }

    #[test]
    fn offset_timestamps_are_converted() {
        assert_eq!(
            footer_text("2024-03-15T23:30:05-05:00").as_deref(),
            Some("更新：2024/3/16 13:30:05 JST")
        );
        assert_eq!(
            footer_text("2025-12-31T08:07:06.123+09:00").as_deref(),
            Some("更新：2025/12/31 8:07:06 JST")
        );
    }

    #[test]
    fn naive_and_date_only_forms() {
        assert_eq!(
            footer_text("2024-07-01T18:00:00").as_deref(),
            Some("更新：2024/7/1 18:00:00 JST")
        );
        assert_eq!(
            footer_text("2024-07-01").as_deref(),
            Some("更新：2024/7/1 9:00:00 JST")
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(footer_text("").is_none());
        assert!(footer_text("yesterday").is_none());
    }
}
