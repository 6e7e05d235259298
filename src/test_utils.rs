//! Shared test helpers.

use crate::{
    calendar::{Calendar, CalendarSystem, Ymd},
    gregorian::Gregorian,
    locale::Locale,
    ummalqura::UmmAlQura,
};

pub fn gregorian() -> Calendar {
    Calendar::new(Box::new(Gregorian), "")
}

pub fn ummalqura() -> Calendar {
    Calendar::new(Box::new(UmmAlQura), "")
}

pub fn shifted() -> Calendar {
    Calendar::new(Box::new(ShiftedYear), "")
}

pub fn leap_month() -> Calendar {
    Calendar::new(Box::new(LeapMonth), "")
}

/// Gregorian months and days, but every year starts in July.
///
/// Ordinal month 1 is July, ordinal month 12 is June.
#[derive(Debug)]
pub struct ShiftedYear;

impl CalendarSystem for ShiftedYear {
    fn name(&self) -> &'static str {
        "fiscal"
    }

    fn has_year_zero(&self) -> bool {
        true
    }

    fn first_month(&self) -> i32 {
        7
    }

    fn locales(&self) -> &'static [(&'static str, Locale)] {
        &[]
    }

    fn days_in_month(&self, year: i32, month: i32) -> i32 {
        Gregorian.days_in_month(year, month)
    }

    fn leap_year(&self, year: i32) -> bool {
        Gregorian.leap_year(year)
    }

    fn to_jd(&self, year: i32, month: i32, day: i32) -> Option<f64> {
        Gregorian.to_jd(year, month, day)
    }

    fn from_jd(&self, jd: f64) -> Option<Ymd> {
        Gregorian.from_jd(jd)
    }

    fn week_anchor(&self, day_of_week: i32) -> i32 {
        -day_of_week
    }

    fn is_week_day(&self, day_of_week: i32) -> bool {
        Gregorian.is_week_day(day_of_week)
    }
}

/// Years start in month 7 and every third year gains a thirteenth month.
///
/// Month 13 sits between 12 and 1, so in leap years month 1 is ordinal 8
/// and in common years ordinal 7. All months have 30 days.
#[derive(Debug)]
pub struct LeapMonth;

impl LeapMonth {
    const MONTH_DAYS: i32 = 30;
    const EPOCH_JD: f64 = 1_721_425.5;

    fn months_before(year: i32) -> i32 {
        12 * (year - 1) + (year - 1) / 3
    }
}

impl CalendarSystem for LeapMonth {
    fn name(&self) -> &'static str {
        "leapmonth"
    }

    fn has_year_zero(&self) -> bool {
        true
    }

    fn first_month(&self) -> i32 {
        7
    }

    fn locales(&self) -> &'static [(&'static str, Locale)] {
        &[]
    }

    fn months_in_year(&self, year: i32) -> i32 {
        if self.leap_year(year) { 13 } else { 12 }
    }

    fn days_in_month(&self, _year: i32, _month: i32) -> i32 {
        Self::MONTH_DAYS
    }

    fn leap_year(&self, year: i32) -> bool {
        year % 3 == 0
    }

    fn days_in_year(&self, year: i32) -> i32 {
        self.months_in_year(year) * Self::MONTH_DAYS
    }

    /// Only defined from year 1 on
    fn to_jd(&self, year: i32, month: i32, day: i32) -> Option<f64> {
        if year < 1 {
            return None;
        }
        let months = self.months_in_year(year);
        let ordinal = (month + months - self.first_month()).rem_euclid(months);
        let days = (Self::months_before(year) + ordinal) * Self::MONTH_DAYS + day - 1;
        Some(Self::EPOCH_JD + f64::from(days))
    }

    fn from_jd(&self, jd: f64) -> Option<Ymd> {
        let days = crate::calendar::whole_days(jd - Self::EPOCH_JD)?;
        if days < 0 {
            return None;
        }
        let mut months = days / Self::MONTH_DAYS;
        let mut year = 1;
        while months >= self.months_in_year(year) {
            months -= self.months_in_year(year);
            year += 1;
        }
        let month = (months + self.first_month() - 1).rem_euclid(self.months_in_year(year)) + 1;
        Some((year, month, days % Self::MONTH_DAYS + 1))
    }

    fn week_anchor(&self, day_of_week: i32) -> i32 {
        -day_of_week
    }

    fn is_week_day(&self, day_of_week: i32) -> bool {
        day_of_week != 6
    }
}
