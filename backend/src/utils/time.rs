use chrono::{DateTime, Utc};
use chrono_tz::Tz;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Formats a stored UTC timestamp in the portal's configured timezone.
pub fn format_local(value: &DateTime<Utc>, tz: &Tz) -> String {
    value.with_timezone(tz).format(DISPLAY_FORMAT).to_string()
}

/// Like [`format_local`], rendering `"-"` for missing values.
pub fn format_optional_local(value: Option<&DateTime<Utc>>, tz: &Tz) -> String {
    value
        .map(|value| format_local(value, tz))
        .unwrap_or_else(|| "-".to_string())
}

/// Formats an hour average with one decimal, `"-"` when there is no data.
pub fn format_hours(hours: Option<f64>) -> String {
    match hours {
        Some(value) if value.is_finite() => format!("{:.1} h", value),
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn format_local_converts_to_bogota() {
        let utc = Utc.with_ymd_and_hms(2026, 3, 1, 15, 30, 0).unwrap();
        let tz: Tz = "America/Bogota".parse().unwrap();
        assert_eq!(format_local(&utc, &tz), "2026-03-01 10:30");
    }

    #[test]
    fn format_optional_local_renders_dash_for_none() {
        assert_eq!(format_optional_local(None, &chrono_tz::UTC), "-");
    }

    #[test]
    fn format_hours_rounds_to_one_decimal() {
        assert_eq!(format_hours(Some(12.345)), "12.3 h");
        assert_eq!(format_hours(None), "-");
        assert_eq!(format_hours(Some(f64::NAN)), "-");
    }
}
