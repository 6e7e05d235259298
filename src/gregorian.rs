//! The proleptic Gregorian calendar.
//!
//! Conversions use the closed-form Julian Day formulas from Jean Meeus,
//! *Astronomical Algorithms*, applied to every date regardless of the
//! historical Julian/Gregorian switch. There is no year zero: 1 BCE is
//! year -1.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::{
    calendar::{CalendarSystem, Ymd, whole_days},
    consts::{
        CENTURY_CYCLE, DAYS_IN_MONTH, FEBRUARY, FEBRUARY_DAYS_LEAP, GREGORIAN_CYCLE, LEAP_YEAR_CYCLE, MARCH,
        MONTHS_IN_YEAR, SATURDAY, SECONDS_PER_DAY, SUNDAY, THURSDAY, UNIX_EPOCH_JD,
    },
    digits::substitute_chinese_digits,
    locale::Locale,
};

/// Registry name of the Gregorian calendar
pub const NAME: &str = "gregorian";

/// The proleptic Gregorian calendar system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gregorian;

impl CalendarSystem for Gregorian {
    fn name(&self) -> &'static str {
        NAME
    }

    fn has_year_zero(&self) -> bool {
        false
    }

    fn locales(&self) -> &'static [(&'static str, Locale)] {
        LOCALES
    }

    fn days_in_month(&self, year: i32, month: i32) -> i32 {
        if month == FEBRUARY && self.leap_year(year) {
            return FEBRUARY_DAYS_LEAP;
        }
        usize::try_from(month)
            .ok()
            .and_then(|index| DAYS_IN_MONTH.get(index))
            .copied()
            .unwrap_or_default()
    }

    fn leap_year(&self, year: i32) -> bool {
        let year = if year < 0 { year + 1 } else { year };
        year % LEAP_YEAR_CYCLE == 0 && (year % CENTURY_CYCLE != 0 || year % GREGORIAN_CYCLE == 0)
    }

    fn to_jd(&self, year: i32, month: i32, day: i32) -> Option<f64> {
        let mut year = f64::from(if year < 0 { year + 1 } else { year });
        let mut month = f64::from(month);
        if month < f64::from(MARCH) {
            month += f64::from(MONTHS_IN_YEAR);
            year -= 1.0;
        }

        let a = (year / 100.0).floor();
        let b = 2.0 - a + (a / 4.0).floor();
        let jd = (365.25 * (year + 4716.0)).floor() + (30.6001 * (month + 1.0)).floor() + f64::from(day) + b - 1524.5;
        jd.is_finite().then_some(jd)
    }

    fn from_jd(&self, jd: f64) -> Option<Ymd> {
        let z = (jd + 0.5).floor();
        let alpha = ((z - 1_867_216.25) / 36_524.25).floor();
        let a = z + 1.0 + alpha - (alpha / 4.0).floor();
        let b = a + 1524.0;
        let c = ((b - 122.1) / 365.25).floor();
        let d = (365.25 * c).floor();
        let e = ((b - d) / 30.6001).floor();

        let day = whole_days(b - d - (e * 30.6001).floor())?;
        let month = whole_days(e - if e > 13.5 { 13.0 } else { 1.0 })?;
        let year = whole_days(c - if month > 2 { 4716.0 } else { 4715.0 })?;
        Some((if year <= 0 { year - 1 } else { year }, month, day))
    }

    /// ISO 8601: a week belongs to the year of its Thursday.
    fn week_anchor(&self, day_of_week: i32) -> i32 {
        let iso_day = if day_of_week == SUNDAY { 7 } else { day_of_week };
        THURSDAY - iso_day
    }

    fn is_week_day(&self, day_of_week: i32) -> bool {
        (SUNDAY + 1..SATURDAY).contains(&day_of_week)
    }
}

/// Converts a Gregorian date to the [`SystemTime`] at its UTC midnight.
pub(crate) fn to_system_time((year, month, day): Ymd) -> Option<SystemTime> {
    let jd = Gregorian.to_jd(year, month, day)?;
    let days = i64::from(whole_days(jd - UNIX_EPOCH_JD)?);
    let seconds = days.checked_mul(i64::try_from(SECONDS_PER_DAY).ok()?)?;
    let offset = Duration::from_secs(seconds.unsigned_abs());
    if seconds < 0 {
        UNIX_EPOCH.checked_sub(offset)
    } else {
        UNIX_EPOCH.checked_add(offset)
    }
}

/// Gregorian date (UTC) containing `time`.
pub(crate) fn from_system_time(time: SystemTime) -> Option<Ymd> {
    let days = match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_secs() / SECONDS_PER_DAY).ok()?,
        Err(before) => {
            // Round towards the earlier day for instants before the epoch
            let seconds = before.duration().as_secs();
            let days = i64::try_from(seconds.div_ceil(SECONDS_PER_DAY)).ok()?;
            -days
        },
    };
    #[allow(clippy::cast_precision_loss)]
    let jd = UNIX_EPOCH_JD + days as f64;
    Gregorian.from_jd(jd)
}

const CHINESE_DIGITS: [&str; 10] = ["〇", "一", "二", "三", "四", "五", "六", "七", "八", "九"];
const CHINESE_POWERS: [&str; 4] = ["", "十", "百", "千"];

/// Gregorian localisations keyed by language code.
pub(crate) static LOCALES: &[(&str, Locale)] = &[
    ("", Locale {
        name:              "Gregorian",
        epochs:            ["BCE", "CE"],
        month_names:       [
            "January",
            "February",
            "March",
            "April",
            "May",
            "June",
            "July",
            "August",
            "September",
            "October",
            "November",
            "December",
        ],
        month_names_short: ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"],
        day_names:         ["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"],
        day_names_short:   ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
        day_names_min:     ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"],
        digits:            None,
        date_format:       "mm/dd/yyyy",
        first_day:         0,
        is_rtl:            false,
    }),
    ("zh-CN", Locale {
        name:              "公历",
        epochs:            ["公元前", "公元"],
        month_names:       [
            "一月", "二月", "三月", "四月", "五月", "六月", "七月", "八月", "九月", "十月", "十一月", "十二月",
        ],
        month_names_short: ["一", "二", "三", "四", "五", "六", "七", "八", "九", "十", "十一", "十二"],
        day_names:         ["星期日", "星期一", "星期二", "星期三", "星期四", "星期五", "星期六"],
        day_names_short:   ["周日", "周一", "周二", "周三", "周四", "周五", "周六"],
        day_names_min:     ["日", "一", "二", "三", "四", "五", "六"],
        digits:            Some(substitute_chinese_digits(CHINESE_DIGITS, CHINESE_POWERS)),
        date_format:       "yyyy-mm-dd",
        first_day:         1,
        is_rtl:            false,
    }),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{consts::GREGORIAN_EPOCH_JD, test_utils::gregorian};

    #[test]
    fn test_leap_years() {
        struct TestCase {
            year:     i32,
            expected: bool,
        }

        let cases = [
            TestCase { year: 2000, expected: true },
            TestCase { year: 1900, expected: false },
            TestCase { year: 2024, expected: true },
            TestCase { year: 2023, expected: false },
            TestCase { year: 2100, expected: false },
            // 1 BCE is astronomical year 0, a leap year
            TestCase { year: -1, expected: true },
            TestCase { year: -5, expected: true },
            TestCase { year: -4, expected: false },
        ];

        for case in &cases {
            assert_eq!(Gregorian.leap_year(case.year), case.expected, "year {}", case.year);
        }
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(Gregorian.days_in_month(2024, 2), 29);
        assert_eq!(Gregorian.days_in_month(2023, 2), 28);
        assert_eq!(Gregorian.days_in_month(2023, 4), 30);
        assert_eq!(Gregorian.days_in_month(2023, 12), 31);
        assert_eq!(Gregorian.days_in_month(2023, 13), 0);
        assert_eq!(Gregorian.days_in_month(2023, -1), 0);
    }

    #[test]
    fn test_known_julian_days() {
        struct TestCase {
            ymd: Ymd,
            jd:  f64,
        }

        let cases = [
            TestCase { ymd: (1, 1, 1), jd: GREGORIAN_EPOCH_JD },
            TestCase { ymd: (1970, 1, 1), jd: UNIX_EPOCH_JD },
            TestCase { ymd: (2000, 1, 1), jd: 2_451_544.5 },
            TestCase { ymd: (2019, 5, 15), jd: 2_458_618.5 },
            TestCase { ymd: (-1, 12, 31), jd: GREGORIAN_EPOCH_JD - 1.0 },
        ];

        for case in &cases {
            let (y, m, d) = case.ymd;
            assert_eq!(Gregorian.to_jd(y, m, d), Some(case.jd), "{:?}", case.ymd);
            assert_eq!(Gregorian.from_jd(case.jd), Some(case.ymd), "jd {}", case.jd);
        }
    }

    #[test]
    fn test_from_jd_ignores_time_of_day() {
        assert_eq!(Gregorian.from_jd(2_451_544.5 + 0.75), Some((2000, 1, 1)));
        assert_eq!(Gregorian.from_jd(f64::NAN), None);
    }

    #[test]
    fn test_round_trip_across_eras() {
        let calendar = gregorian();
        for (y, m, d) in [(-4713, 11, 24), (-44, 3, 15), (1582, 10, 10), (1600, 2, 29), (2024, 12, 31), (9999, 6, 1)] {
            let jd = calendar.to_jd(y, m, d).unwrap();
            assert_eq!(calendar.from_jd(jd).unwrap().ymd(), (y, m, d));
        }
    }

    #[test]
    fn test_iso_week_of_year() {
        struct TestCase {
            ymd:      Ymd,
            expected: i32,
        }

        let cases = [
            // Friday, belongs to the last week of 2020
            TestCase { ymd: (2021, 1, 1), expected: 53 },
            TestCase { ymd: (2021, 1, 4), expected: 1 },
            TestCase { ymd: (2024, 1, 1), expected: 1 },
            TestCase { ymd: (2024, 12, 30), expected: 1 },
            TestCase { ymd: (2026, 10, 19), expected: 43 },
        ];

        let calendar = gregorian();
        for case in &cases {
            let (y, m, d) = case.ymd;
            assert_eq!(calendar.week_of_year(y, m, d).unwrap(), case.expected, "{:?}", case.ymd);
        }
    }

    #[test]
    fn test_week_days_are_monday_to_friday() {
        let calendar = gregorian();
        // 2024-01-01 was a Monday
        let expected = [true, true, true, true, true, false, false];
        for (offset, week_day) in (1..=7).zip(expected) {
            assert_eq!(calendar.week_day(2024, 1, offset).unwrap(), week_day, "2024-01-{offset}");
        }
    }

    #[test]
    fn test_system_time_bridge() {
        assert_eq!(to_system_time((1970, 1, 1)), Some(UNIX_EPOCH));
        assert_eq!(
            to_system_time((1970, 1, 2)),
            UNIX_EPOCH.checked_add(Duration::from_secs(SECONDS_PER_DAY))
        );
        assert_eq!(
            to_system_time((1969, 12, 31)),
            UNIX_EPOCH.checked_sub(Duration::from_secs(SECONDS_PER_DAY))
        );

        let noon = UNIX_EPOCH + Duration::from_secs(SECONDS_PER_DAY * 19_737 + 43_200);
        assert_eq!(from_system_time(noon), Some((2024, 1, 15)));
        let before = UNIX_EPOCH - Duration::from_secs(1);
        assert_eq!(from_system_time(before), Some((1969, 12, 31)));
    }

    #[test]
    fn test_chinese_locale() {
        let calendar = crate::Calendar::gregorian("zh-CN");
        assert_eq!(calendar.language(), "zh-CN");
        assert_eq!(calendar.format_number(2024), "二千二十四");
        assert_eq!(calendar.epoch(2024).unwrap(), "公元");
    }
}
