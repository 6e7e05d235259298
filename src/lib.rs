//! Pluggable world calendars that interchange through Julian Day numbers.
//!
//! A [`Registry`] hands out [`Calendar`] engines by name and language. Each
//! engine wraps one [`CalendarSystem`] (the proleptic [`Gregorian`] calendar
//! and the tabulated [`UmmAlQura`] lunar calendar ship with the crate) and
//! creates [`CalendarDate`] values that delegate all arithmetic back to it.
//!
//! ```
//! use world_calendars::{Period, calendars};
//!
//! let hijri = calendars().instance("ummalqura", "").unwrap();
//! let gregorian = calendars().instance("gregorian", "").unwrap();
//!
//! let mut date = hijri.new_date(1440, 9, 10).unwrap();
//! let western = gregorian.from_jd(date.to_jd().unwrap()).unwrap();
//! assert_eq!(western.to_string(), "2019-05-15");
//!
//! date.add(1, Period::Month).unwrap();
//! assert_eq!(date.to_string(), "1440-10-10");
//! ```

#[macro_use]
mod logging;

mod calendar;
mod consts;
mod digits;
mod error;
mod gregorian;
mod locale;
mod prelude;
mod registry;
#[cfg(test)]
mod test_utils;
mod ummalqura;
mod ummalqura_table;

use std::{cmp::Ordering, fmt, time::SystemTime};

pub use calendar::{Calendar, CalendarSystem, Field, Period, Ymd};
pub use consts::*;
pub use digits::Digits;
pub use error::CalendarError;
pub use gregorian::Gregorian;
pub use locale::{Locale, NameForm};
pub use registry::{
    Constructor, DateSource, Registry, RegistryConfig, calendars, substitute_chinese_digits, substitute_digits,
};
pub use ummalqura::UmmAlQura;

/// A date of a specific calendar.
///
/// Dates are created by a [`Calendar`] and borrow it; every computed
/// property and all arithmetic is delegated to that engine. Fields only
/// change through the validating setters and [`CalendarDate::add`], which
/// leave the date untouched when they fail.
#[derive(Clone, Copy)]
pub struct CalendarDate<'a> {
    calendar: &'a Calendar,
    year:     i32,
    month:    i32,
    day:      i32,
}

impl<'a> CalendarDate<'a> {
    pub(crate) const fn from_parts(calendar: &'a Calendar, year: i32, month: i32, day: i32) -> Self {
        Self {
            calendar,
            year,
            month,
            day,
        }
    }

    pub(crate) const fn overwrite(&mut self, (year, month, day): Ymd) {
        self.year = year;
        self.month = month;
        self.day = day;
    }

    /// The engine this date belongs to
    pub const fn calendar(&self) -> &'a Calendar {
        self.calendar
    }

    pub const fn year(&self) -> i32 {
        self.year
    }

    pub const fn month(&self) -> i32 {
        self.month
    }

    pub const fn day(&self) -> i32 {
        self.day
    }

    pub const fn ymd(&self) -> Ymd {
        (self.year, self.month, self.day)
    }

    /// Sets the year, clamping the day to the length of the resulting month.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidMonth` or `CalendarError::InvalidDate`
    /// if the result is not a date of the calendar.
    pub fn set_year(&mut self, year: i32) -> Result<&mut Self, CalendarError> {
        self.set(year, Field::Year)
    }

    /// Sets the month, clamping the day to the length of the new month.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidMonth` if the month does not exist in the date's year.
    pub fn set_month(&mut self, month: i32) -> Result<&mut Self, CalendarError> {
        self.set(month, Field::Month)
    }

    /// # Errors
    /// Returns `CalendarError::InvalidDate` if the day does not exist in the date's month.
    pub fn set_day(&mut self, day: i32) -> Result<&mut Self, CalendarError> {
        self.set(day, Field::Day)
    }

    /// Overwrites one field.
    ///
    /// # Errors
    /// See [`Calendar::set`].
    pub fn set(&mut self, value: i32, field: Field) -> Result<&mut Self, CalendarError> {
        let calendar = self.calendar;
        calendar.set(self, value, field)?;
        Ok(self)
    }

    /// Sets all three fields, validating them together.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidDate` if the fields are not a date of the calendar.
    pub fn set_ymd(&mut self, year: i32, month: i32, day: i32) -> Result<&mut Self, CalendarError> {
        let calendar = self.calendar;
        calendar.replace(self, (year, month, day))?;
        Ok(self)
    }

    /// Adds `offset` periods.
    ///
    /// # Errors
    /// See [`Calendar::add`].
    pub fn add(&mut self, offset: i32, period: Period) -> Result<&mut Self, CalendarError> {
        let calendar = self.calendar;
        calendar.add(self, offset, period)?;
        Ok(self)
    }

    /// Orders two dates of the same calendar by year, ordinal month and day.
    ///
    /// # Errors
    /// Returns `CalendarError::DifferentCalendars` if the dates belong to different calendars.
    pub fn compare(&self, other: &CalendarDate<'_>) -> Result<Ordering, CalendarError> {
        if self.calendar.name() != other.calendar.name() {
            return Err(CalendarError::DifferentCalendars {
                first:  self.calendar.locale().name,
                second: other.calendar.locale().name,
            });
        }

        let ours = (self.year, self.month_of_year()?, self.day);
        let theirs = (other.year, other.month_of_year()?, other.day);
        Ok(ours.cmp(&theirs))
    }

    /// # Errors
    /// Returns `CalendarError::InvalidYear` if the year is outside the calendar.
    pub fn leap_year(&self) -> Result<bool, CalendarError> {
        self.calendar.leap_year(self.year)
    }

    /// # Errors
    /// Returns `CalendarError::InvalidYear` if the year is outside the calendar.
    pub fn epoch(&self) -> Result<&'static str, CalendarError> {
        self.calendar.epoch(self.year)
    }

    /// # Errors
    /// Returns `CalendarError::InvalidYear` if the year is outside the calendar.
    pub fn format_year(&self) -> Result<String, CalendarError> {
        self.calendar.format_year(self.year)
    }

    /// # Errors
    /// Returns `CalendarError::InvalidMonth` if the month is outside the calendar.
    pub fn month_of_year(&self) -> Result<i32, CalendarError> {
        self.calendar.month_of_year(self.year, self.month)
    }

    /// # Errors
    /// Returns `CalendarError::InvalidDate` if the date is outside the calendar.
    pub fn week_of_year(&self) -> Result<i32, CalendarError> {
        self.calendar.week_of_year(self.year, self.month, self.day)
    }

    /// # Errors
    /// Returns `CalendarError::InvalidYear` if the year is outside the calendar.
    pub fn days_in_year(&self) -> Result<i32, CalendarError> {
        self.calendar.days_in_year(self.year)
    }

    /// # Errors
    /// Returns `CalendarError::InvalidDate` if the date is outside the calendar.
    pub fn day_of_year(&self) -> Result<i32, CalendarError> {
        self.calendar.day_of_year(self.year, self.month, self.day)
    }

    /// # Errors
    /// Returns `CalendarError::InvalidMonth` if the month is outside the calendar.
    pub fn days_in_month(&self) -> Result<i32, CalendarError> {
        self.calendar.days_in_month(self.year, self.month)
    }

    /// Day of the week, 0 being Sunday.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidDate` if the date is outside the calendar.
    pub fn day_of_week(&self) -> Result<i32, CalendarError> {
        self.calendar.day_of_week(self.year, self.month, self.day)
    }

    /// # Errors
    /// Returns `CalendarError::InvalidDate` if the date is outside the calendar.
    pub fn week_day(&self) -> Result<bool, CalendarError> {
        self.calendar.week_day(self.year, self.month, self.day)
    }

    /// # Errors
    /// Returns `CalendarError::InvalidDate` if the date is outside the calendar.
    pub fn to_jd(&self) -> Result<f64, CalendarError> {
        self.calendar.to_jd(self.year, self.month, self.day)
    }

    /// # Errors
    /// Returns `CalendarError::InvalidDate` if the date cannot be represented as a `SystemTime`.
    pub fn to_system_date(&self) -> Result<SystemTime, CalendarError> {
        self.calendar.to_system_date(self.year, self.month, self.day)
    }

    pub fn month_name(&self, form: NameForm) -> Option<&'static str> {
        self.calendar.month_name(self.month, form)
    }

    pub fn day_name(&self, form: NameForm) -> Option<&'static str> {
        self.day_of_week()
            .ok()
            .and_then(|day_of_week| self.calendar.day_name(day_of_week, form))
    }
}

/// Renders `[-]YYYY-MM-DD`, the form [`Calendar::parse_date`] reads.
impl fmt::Display for CalendarDate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}-{:02}", calendar::format_year(self.year), self.month, self.day)
    }
}

impl fmt::Debug for CalendarDate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarDate")
            .field("calendar", &self.calendar.name())
            .field("language", &self.calendar.language())
            .field("year", &self.year)
            .field("month", &self.month)
            .field("day", &self.day)
            .finish()
    }
}

impl PartialEq for CalendarDate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.calendar.name() == other.calendar.name() && self.ymd() == other.ymd()
    }
}

impl Eq for CalendarDate<'_> {}

impl PartialOrd for CalendarDate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other).ok()
    }
}

impl serde::Serialize for CalendarDate<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("CalendarDate", 4)?;
        state.serialize_field("calendar", self.calendar.name())?;
        state.serialize_field("year", &self.year)?;
        state.serialize_field("month", &self.month)?;
        state.serialize_field("day", &self.day)?;
        state.end()
    }
}
