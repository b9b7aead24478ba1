// Request-date computation for meal and timetable queries.
use chrono::{Datelike, Days, NaiveDate, Weekday};

/// The date both queries are issued for. With `skip_weekend`, Saturday moves
/// forward two days and Sunday one, landing on Monday.
pub fn request_date(today: NaiveDate, skip_weekend: bool) -> NaiveDate {
    if !skip_weekend {
        return today;
    }
    let shift = match today.weekday() {
        Weekday::Sat => 2,
        Weekday::Sun => 1,
        _ => 0,
    };
    today.checked_add_days(Days::new(shift)).unwrap_or(today)
}

/// `YYYYMMDD`, as the API expects for `*_FROM_YMD`/`*_TO_YMD`.
pub fn format_ymd(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn saturday_moves_to_monday() {
        // 2024-06-01 is a Saturday
        assert_eq!(request_date(d(2024, 6, 1), true), d(2024, 6, 3));
    }

    #[test]
    fn sunday_moves_to_monday() {
        assert_eq!(request_date(d(2024, 6, 2), true), d(2024, 6, 3));
    }

    #[test]
    fn weekdays_are_unchanged() {
        for day in 3..=7 {
            assert_eq!(request_date(d(2024, 6, day), true), d(2024, 6, day));
        }
    }

    #[test]
    fn weekend_kept_when_flag_off() {
        assert_eq!(request_date(d(2024, 6, 1), false), d(2024, 6, 1));
    }

    #[test]
    fn shift_crosses_month_boundary() {
        // 2024-08-31 is a Saturday
        assert_eq!(request_date(d(2024, 8, 31), true), d(2024, 9, 2));
    }

    #[test]
    fn ymd_is_zero_padded() {
        assert_eq!(format_ymd(d(2024, 3, 5)), "20240305");
    }
}
