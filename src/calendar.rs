use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

// Two digit years first, %Y would read "26" as the year 26.
const DAY_FIRST: [&str; 6] = [
    "%d/%m/%y", "%d.%m.%y", "%d-%m-%y", "%d/%m/%Y", "%d.%m.%Y", "%d-%m-%Y",
];

const YEAR_FIRST: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Day zero of the 1900 date system, shifted to absorb the 1900 leap year bug.
fn excel_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .expect("valid epoch")
        .and_time(NaiveTime::MIN)
}

pub trait ExcelSerial {
    fn from_serial(serial: f64) -> Option<Self>
    where
        Self: Sized;

    fn to_serial(&self) -> f64;
}

impl ExcelSerial for NaiveDateTime {
    fn from_serial(serial: f64) -> Option<Self> {
        if !serial.is_finite() || serial < 0.0 {
            return None;
        }
        let seconds = (serial * SECONDS_PER_DAY).round() as i64;
        excel_epoch().checked_add_signed(Duration::try_seconds(seconds)?)
    }

    fn to_serial(&self) -> f64 {
        let elapsed = *self - excel_epoch();
        elapsed.num_seconds() as f64 / SECONDS_PER_DAY
    }
}

/// Reads a date written day first, as in 05/03/2025 for the fifth of March.
/// ISO dates are accepted too, and a trailing time of day is ignored.
pub fn parse_day_first(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.trim().split([' ', 'T']).next()?;
    DAY_FIRST
        .iter()
        .chain(YEAR_FIRST.iter())
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

#[cfg(test)]
pub mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn day_comes_first() {
        assert_eq!(parse_day_first("05/03/2025"), Some(ymd(2025, 3, 5)));
        assert_eq!(parse_day_first("31.12.2024"), Some(ymd(2024, 12, 31)));
        assert_eq!(parse_day_first("01-02-2026"), Some(ymd(2026, 2, 1)));
        assert_eq!(parse_day_first("7/1/26"), Some(ymd(2026, 1, 7)));
    }

    #[test]
    fn iso_and_time_suffix() {
        assert_eq!(parse_day_first("2025-03-05"), Some(ymd(2025, 3, 5)));
        assert_eq!(
            parse_day_first("2025-03-05 00:00:00"),
            Some(ymd(2025, 3, 5))
        );
        assert_eq!(
            parse_day_first(" 05/03/2025 14:30 "),
            Some(ymd(2025, 3, 5))
        );
    }

    #[test]
    fn rejects_nonsense() {
        assert_eq!(parse_day_first(""), None);
        assert_eq!(parse_day_first("yesterday"), None);
        assert_eq!(parse_day_first("32/01/2025"), None);
        assert_eq!(parse_day_first("05/13/2025"), None);
    }

    #[test]
    fn serial_dates() {
        let date = NaiveDateTime::from_serial(45721.0).unwrap();
        assert_eq!(date.date(), ymd(2025, 3, 5));
        assert_eq!(date.to_serial(), 45721.0);

        let noon = NaiveDateTime::from_serial(45721.5).unwrap();
        assert_eq!(noon.time(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        assert_eq!(NaiveDateTime::from_serial(-1.0), None);
        assert_eq!(NaiveDateTime::from_serial(f64::NAN), None);
    }
}
