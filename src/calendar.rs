//! The engine contract and the algorithms every calendar shares.
//!
//! A calendar variant implements [`CalendarSystem`]: a handful of primitives
//! that work on raw `(year, month, day)` fields and never validate. The
//! [`Calendar`] engine wraps a system together with its locale and provides
//! everything else once: validation, ordinal months, day of year/week, week
//! of year, date arithmetic and conversions.
//!
//! Every public method of [`Calendar`] validates its input exactly once.
//! Internal composition (probe dates built while adding months, the first
//! day of the year looked up by `day_of_year`, ...) runs one [`Depth`] deeper,
//! where validation is skipped.

use std::{fmt, str::FromStr, time::SystemTime};

use serde::{Deserialize, Serialize};

use crate::{
    CalendarDate, CalendarError,
    consts::{DATE_SEPARATOR, DAYS_IN_COMMON_YEAR, DAYS_IN_LEAP_YEAR, DAYS_IN_WEEK, MONTHS_IN_YEAR, WEEKDAY_JD_OFFSET},
    error::Invalid,
    gregorian::{self, Gregorian},
    locale::{self, Locale, NameForm},
    prelude::*,
};

/// A `(year, month, day)` triple in a calendar's native numbering.
pub type Ymd = (i32, i32, i32);

/// The primitives a calendar variant has to provide.
///
/// Fields passed in are not validated; callers go through [`Calendar`],
/// which checks them first. Implementations must be cheap to construct and
/// free of interior state.
pub trait CalendarSystem: fmt::Debug + Send + Sync {
    /// Unique, locale-independent name of the calendar
    fn name(&self) -> &'static str;

    /// Whether the year preceding 1 is 0 (`true`) or -1 (`false`)
    fn has_year_zero(&self) -> bool;

    /// Lowest month number
    fn min_month(&self) -> i32 {
        1
    }

    /// Month number that starts a year
    fn first_month(&self) -> i32 {
        1
    }

    /// Lowest day number
    fn min_day(&self) -> i32 {
        1
    }

    /// Locale table keyed by language code; should contain a `""` entry
    fn locales(&self) -> &'static [(&'static str, Locale)];

    /// Number of months in `year`; at least 1
    fn months_in_year(&self, _year: i32) -> i32 {
        MONTHS_IN_YEAR
    }

    fn days_in_month(&self, year: i32, month: i32) -> i32;

    fn leap_year(&self, year: i32) -> bool;

    fn days_in_year(&self, year: i32) -> i32 {
        if self.leap_year(year) {
            DAYS_IN_LEAP_YEAR
        } else {
            DAYS_IN_COMMON_YEAR
        }
    }

    fn days_in_week(&self) -> i32 {
        DAYS_IN_WEEK
    }

    /// Whether dates in `year` can be represented at all
    fn supports_year(&self, _year: i32) -> bool {
        true
    }

    /// Julian Day at the start of the given day, or `None` if the system
    /// cannot place it
    fn to_jd(&self, year: i32, month: i32, day: i32) -> Option<f64>;

    /// Fields of the day containing `jd`, or `None` if the system cannot
    /// place it
    fn from_jd(&self, jd: f64) -> Option<Ymd>;

    /// Days to move from a date with the given day of week (0 = Sunday) to
    /// the day that decides which year its week belongs to
    fn week_anchor(&self, day_of_week: i32) -> i32;

    /// Whether the given day of week (0 = Sunday) is a working day
    fn is_week_day(&self, day_of_week: i32) -> bool;
}

/// Unit of a date offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[display(fmt = "year")]
    Year,
    #[display(fmt = "month")]
    Month,
    #[display(fmt = "week")]
    Week,
    #[display(fmt = "day")]
    Day,
}

impl FromStr for Period {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "y" | "year" | "years" => Ok(Self::Year),
            "m" | "month" | "months" => Ok(Self::Month),
            "w" | "week" | "weeks" => Ok(Self::Week),
            "d" | "day" | "days" => Ok(Self::Day),
            _ => Err(CalendarError::InvalidPeriod(s.to_owned())),
        }
    }
}

/// A single date field that can be overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    #[display(fmt = "year")]
    Year,
    #[display(fmt = "month")]
    Month,
    #[display(fmt = "day")]
    Day,
}

impl FromStr for Field {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "y" | "year" => Ok(Self::Year),
            "m" | "month" => Ok(Self::Month),
            "d" | "day" => Ok(Self::Day),
            _ => Err(CalendarError::InvalidPeriod(s.to_owned())),
        }
    }
}

/// Nesting level of an engine call. Only the outermost level validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Depth(u8);

impl Depth {
    const OUTER: Self = Self(0);

    const fn nested(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    const fn validates(self) -> bool {
        self.0 == 0
    }
}

/// A calendar engine: one [`CalendarSystem`] in one language.
#[derive(Debug)]
pub struct Calendar {
    system:   Box<dyn CalendarSystem>,
    language: &'static str,
    locale:   &'static Locale,
}

impl Calendar {
    /// Builds an engine for `system`, localised for `language`.
    ///
    /// Languages the system has no locale for get its default entry.
    pub fn new(system: Box<dyn CalendarSystem>, language: &str) -> Self {
        let (language, locale) = locale::select(system.locales(), language);
        Self {
            system,
            language,
            locale,
        }
    }

    /// Shorthand for the proleptic Gregorian engine in `language`
    pub fn gregorian(language: &str) -> Self {
        Self::new(Box::new(Gregorian), language)
    }

    pub fn name(&self) -> &'static str {
        self.system.name()
    }

    /// Language key of the selected locale entry
    pub const fn language(&self) -> &'static str {
        self.language
    }

    pub const fn locale(&self) -> &'static Locale {
        self.locale
    }

    pub fn system(&self) -> &dyn CalendarSystem {
        &*self.system
    }

    pub fn has_year_zero(&self) -> bool {
        self.system.has_year_zero()
    }

    pub fn min_month(&self) -> i32 {
        self.system.min_month()
    }

    pub fn first_month(&self) -> i32 {
        self.system.first_month()
    }

    pub fn min_day(&self) -> i32 {
        self.system.min_day()
    }

    pub fn days_in_week(&self) -> i32 {
        self.system.days_in_week()
    }

    // --- validation ---

    /// Determines whether the fields form a date of this calendar.
    pub fn is_valid(&self, year: i32, month: i32, day: i32) -> bool {
        let system = &*self.system;
        if !system.has_year_zero() && year == 0 {
            return false;
        }
        if !system.supports_year(year) {
            return false;
        }

        let min_month = system.min_month();
        if month < min_month || month - min_month >= system.months_in_year(year) {
            return false;
        }
        let min_day = system.min_day();
        day >= min_day && day - min_day < system.days_in_month(year, month)
    }

    fn check(&self, depth: Depth, (year, month, day): Ymd, kind: Invalid) -> Result<(), CalendarError> {
        if depth.validates() && !self.is_valid(year, month, day) {
            trace!("rejected {} {year}/{month}/{day} as invalid {kind:?}", self.name());
            return Err(self.invalid(kind));
        }
        Ok(())
    }

    fn check_year(&self, depth: Depth, year: i32) -> Result<(), CalendarError> {
        self.check(depth, (year, self.min_month(), self.min_day()), Invalid::Year)
    }

    fn check_month(&self, depth: Depth, year: i32, month: i32) -> Result<(), CalendarError> {
        self.check(depth, (year, month, self.min_day()), Invalid::Month)
    }

    const fn invalid(&self, kind: Invalid) -> CalendarError {
        kind.error(self.locale.name)
    }

    fn same_calendar(&self, date: &CalendarDate<'_>) -> Result<(), CalendarError> {
        let other = date.calendar();
        if other.name() != self.name() {
            return Err(CalendarError::DifferentCalendars {
                first:  self.locale.name,
                second: other.locale.name,
            });
        }
        Ok(())
    }

    // --- construction ---

    /// Creates a validated date of this calendar.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidDate` if the fields are not a date of this calendar.
    pub fn new_date(&self, year: i32, month: i32, day: i32) -> Result<CalendarDate<'_>, CalendarError> {
        self.new_date_at(Depth::OUTER, year, month, day)
    }

    fn new_date_at(&self, depth: Depth, year: i32, month: i32, day: i32) -> Result<CalendarDate<'_>, CalendarError> {
        self.check(depth, (year, month, day), Invalid::Date)?;
        Ok(CalendarDate::from_parts(self, year, month, day))
    }

    /// Copies `date` into this engine, e.g. to switch its localisation.
    ///
    /// # Errors
    /// Returns `CalendarError::DifferentCalendars` if `date` belongs to another calendar.
    pub fn copy_date(&self, date: &CalendarDate<'_>) -> Result<CalendarDate<'_>, CalendarError> {
        self.same_calendar(date)?;
        let (year, month, day) = date.ymd();
        self.new_date(year, month, day)
    }

    /// Today's date (UTC) in this calendar.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidDate` if today is outside the calendar's range.
    pub fn today(&self) -> Result<CalendarDate<'_>, CalendarError> {
        self.from_system_date(SystemTime::now())
    }

    /// Creates the date containing Julian Day `jd`.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidDate` if `jd` is outside the calendar's range.
    pub fn from_jd(&self, jd: f64) -> Result<CalendarDate<'_>, CalendarError> {
        let (year, month, day) = self
            .system
            .from_jd(jd)
            .ok_or_else(|| self.invalid(Invalid::Date))?;
        self.new_date(year, month, day)
    }

    /// Parses a date written as `[-]YYYY-MM-DD`.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidFormat` for malformed input and
    /// `CalendarError::InvalidDate` if the fields are not a date of this calendar.
    pub fn parse_date(&self, s: &str) -> Result<CalendarDate<'_>, CalendarError> {
        let trimmed = s.trim();
        let (negative, body) = trimmed
            .strip_prefix(DATE_SEPARATOR)
            .map_or((false, trimmed), |rest| (true, rest));

        let parts: Vec<&str> = body.split(DATE_SEPARATOR).map(str::trim).collect();
        let [year, month, day] = parts.as_slice() else {
            return Err(CalendarError::InvalidFormat(s.to_owned()));
        };

        let year = parse_component(year, s)?;
        let month = parse_component(month, s)?;
        let day = parse_component(day, s)?;
        self.new_date(if negative { -year } else { year }, month, day)
    }

    // --- years ---

    /// Epoch designator (e.g. BCE/CE) for `year`.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidYear` if `year` is outside the calendar.
    pub fn epoch(&self, year: i32) -> Result<&'static str, CalendarError> {
        self.check_year(Depth::OUTER, year)?;
        let [before, after] = self.locale.epochs;
        Ok(if year < 0 { before } else { after })
    }

    /// Formats `year` sign-prefixed and zero-padded to four digits.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidYear` if `year` is outside the calendar.
    pub fn format_year(&self, year: i32) -> Result<String, CalendarError> {
        self.check_year(Depth::OUTER, year)?;
        Ok(format_year(year))
    }

    /// # Errors
    /// Returns `CalendarError::InvalidYear` if `year` is outside the calendar.
    pub fn months_in_year(&self, year: i32) -> Result<i32, CalendarError> {
        self.months_in_year_at(Depth::OUTER, year)
    }

    fn months_in_year_at(&self, depth: Depth, year: i32) -> Result<i32, CalendarError> {
        self.check_year(depth, year)?;
        Ok(self.system.months_in_year(year))
    }

    /// # Errors
    /// Returns `CalendarError::InvalidYear` if `year` is outside the calendar.
    pub fn days_in_year(&self, year: i32) -> Result<i32, CalendarError> {
        self.check_year(Depth::OUTER, year)?;
        Ok(self.system.days_in_year(year))
    }

    /// # Errors
    /// Returns `CalendarError::InvalidYear` if `year` is outside the calendar.
    pub fn leap_year(&self, year: i32) -> Result<bool, CalendarError> {
        self.check_year(Depth::OUTER, year)?;
        Ok(self.system.leap_year(year))
    }

    // --- months ---

    /// Position of `month` within `year`, counted from the minimum month.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidMonth` if `(year, month)` is not a month of the calendar.
    pub fn month_of_year(&self, year: i32, month: i32) -> Result<i32, CalendarError> {
        self.month_of_year_at(Depth::OUTER, year, month)
    }

    fn month_of_year_at(&self, depth: Depth, year: i32, month: i32) -> Result<i32, CalendarError> {
        self.check_month(depth, year, month)?;
        let months = self.system.months_in_year(year);
        Ok((month + months - self.first_month()).rem_euclid(months) + self.min_month())
    }

    /// Month number at ordinal position `ordinal` within `year`.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidYear` or `CalendarError::InvalidMonth`
    /// if the year or the resulting month is outside the calendar.
    pub fn from_month_of_year(&self, year: i32, ordinal: i32) -> Result<i32, CalendarError> {
        self.from_month_of_year_at(Depth::OUTER, year, ordinal)
    }

    fn from_month_of_year_at(&self, depth: Depth, year: i32, ordinal: i32) -> Result<i32, CalendarError> {
        let months = self.months_in_year_at(depth, year)?;
        let min_month = self.min_month();
        let shifted = ordinal
            .checked_add(self.first_month() - 2 * min_month)
            .ok_or_else(|| self.invalid(Invalid::Month))?;
        let month = shifted.rem_euclid(months) + min_month;
        self.check_month(depth, year, month)?;
        Ok(month)
    }

    /// # Errors
    /// Returns `CalendarError::InvalidMonth` if `(year, month)` is not a month of the calendar.
    pub fn days_in_month(&self, year: i32, month: i32) -> Result<i32, CalendarError> {
        self.days_in_month_at(Depth::OUTER, year, month)
    }

    fn days_in_month_at(&self, depth: Depth, year: i32, month: i32) -> Result<i32, CalendarError> {
        self.check_month(depth, year, month)?;
        Ok(self.system.days_in_month(year, month))
    }

    /// Long or short name of `month`, if the locale has one.
    pub fn month_name(&self, month: i32, form: NameForm) -> Option<&'static str> {
        let index = usize::try_from(month - self.min_month()).ok()?;
        self.locale.month_name(index, form)
    }

    // --- days ---

    /// Julian Day at the start of the given date.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidDate` if the fields are not a date of this calendar.
    pub fn to_jd(&self, year: i32, month: i32, day: i32) -> Result<f64, CalendarError> {
        self.to_jd_at(Depth::OUTER, year, month, day)
    }

    fn to_jd_at(&self, depth: Depth, year: i32, month: i32, day: i32) -> Result<f64, CalendarError> {
        self.check(depth, (year, month, day), Invalid::Date)?;
        self.system
            .to_jd(year, month, day)
            .ok_or_else(|| self.invalid(Invalid::Date))
    }

    /// Day of the year, starting from 1.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidDate` if the fields are not a date of this calendar.
    pub fn day_of_year(&self, year: i32, month: i32, day: i32) -> Result<i32, CalendarError> {
        self.day_of_year_at(Depth::OUTER, year, month, day)
    }

    fn day_of_year_at(&self, depth: Depth, year: i32, month: i32, day: i32) -> Result<i32, CalendarError> {
        let jd = self.to_jd_at(depth, year, month, day)?;
        let inner = depth.nested();
        let first = self.from_month_of_year_at(inner, year, self.min_month())?;
        let start = self.to_jd_at(inner, year, first, self.min_day())?;
        whole_days(jd - start)
            .map(|days| days + 1)
            .ok_or_else(|| self.invalid(Invalid::Date))
    }

    /// Day of the week, 0 being Sunday.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidDate` if the fields are not a date of this calendar.
    pub fn day_of_week(&self, year: i32, month: i32, day: i32) -> Result<i32, CalendarError> {
        let jd = self.to_jd_at(Depth::OUTER, year, month, day)?;
        Ok(self.weekday_of(jd))
    }

    fn weekday_of(&self, jd: f64) -> i32 {
        let day = whole_days(jd).map_or(0, i64::from);
        let weekday = (day + WEEKDAY_JD_OFFSET).rem_euclid(i64::from(self.days_in_week()));
        i32::try_from(weekday).unwrap_or_default()
    }

    /// Whether the date falls on a working day of the calendar's region.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidDate` if the fields are not a date of this calendar.
    pub fn week_day(&self, year: i32, month: i32, day: i32) -> Result<bool, CalendarError> {
        let day_of_week = self.day_of_week(year, month, day)?;
        Ok(self.system.is_week_day(day_of_week))
    }

    /// Week of the year, starting from 1, by the variant's week rule.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidDate` if the fields are not a date of
    /// this calendar, or its anchor day cannot be placed. The anchor may fall
    /// outside the calendar even for a valid date: on Umm al-Qura, 1276/1/1 is
    /// a Saturday whose week starts in 1275, before the month table.
    pub fn week_of_year(&self, year: i32, month: i32, day: i32) -> Result<i32, CalendarError> {
        let jd = self.to_jd_at(Depth::OUTER, year, month, day)?;
        let anchor = jd + f64::from(self.system.week_anchor(self.weekday_of(jd)));
        let (year, month, day) = self
            .system
            .from_jd(anchor)
            .ok_or_else(|| self.invalid(Invalid::Date))?;
        let day_of_year = self.day_of_year_at(Depth::OUTER.nested(), year, month, day)?;
        Ok((day_of_year - 1).div_euclid(self.days_in_week()) + 1)
    }

    /// Name of the day of week `day_of_week` (0 = Sunday), if the locale has one.
    pub fn day_name(&self, day_of_week: i32, form: NameForm) -> Option<&'static str> {
        let index = usize::try_from(day_of_week).ok()?;
        self.locale.day_name(index, form)
    }

    /// Renders `value` with the locale's digits.
    pub fn format_number(&self, value: u32) -> String {
        self.locale.format_number(value)
    }

    // --- arithmetic ---

    /// Adds `offset` periods to `date` in place.
    ///
    /// Month and year offsets keep the day where possible and clamp it to
    /// the length of the resulting month. On calendars without a year zero
    /// the result skips it.
    ///
    /// # Errors
    /// Returns `CalendarError::DifferentCalendars` if `date` belongs to
    /// another calendar and `CalendarError::InvalidDate` if the result is
    /// outside the calendar. `date` is unchanged on error.
    pub fn add(&self, date: &mut CalendarDate<'_>, offset: i32, period: Period) -> Result<(), CalendarError> {
        self.same_calendar(date)?;
        let start = date.ymd();
        let ymd = self.add_at(Depth::OUTER.nested(), start, offset, period)?;
        let ymd = self.correct_add(start, ymd, offset, period)?;
        self.replace(date, ymd)
    }

    fn add_at(&self, depth: Depth, (year, month, day): Ymd, offset: i32, period: Period) -> Result<Ymd, CalendarError> {
        let overflow = || self.invalid(Invalid::Date);

        let (mut y, mut m) = match period {
            Period::Day | Period::Week => {
                let step = if period == Period::Week { self.days_in_week() } else { 1 };
                let jd = self.to_jd_at(depth, year, month, day)? + f64::from(offset) * f64::from(step);
                return self.system.from_jd(jd).ok_or_else(overflow);
            },
            Period::Year => (year.checked_add(offset).ok_or_else(overflow)?, self.month_of_year_at(depth, year, month)?),
            Period::Month => (
                year,
                self.month_of_year_at(depth, year, month)?
                    .checked_add(offset)
                    .ok_or_else(overflow)?,
            ),
        };

        if period == Period::Year {
            // Raw month numbers may sit at another position in the target year
            if month != self.from_month_of_year_at(depth, y, m)? {
                let probe = self.new_date_at(depth, y, month, self.min_day())?;
                m = self.month_of_year_at(depth, probe.year(), probe.month())?;
            }
            m = m.min(self.months_in_year_at(depth, y)?);
        } else {
            let min_month = self.min_month();
            while m < min_month {
                y = y.checked_sub(1).ok_or_else(overflow)?;
                m += self.months_in_year_at(depth, y)?;
            }
            let mut months = self.months_in_year_at(depth, y)?;
            while m > months - 1 + min_month {
                y = y.checked_add(1).ok_or_else(overflow)?;
                m -= months;
                months = self.months_in_year_at(depth, y)?;
            }
        }

        let month = self.from_month_of_year_at(depth, y, m)?;
        let day = day.min(self.days_in_month_at(depth, y, month)?);
        Ok((y, month, day))
    }

    /// Re-runs an addition that landed in, or jumped over, a missing year zero.
    fn correct_add(&self, start: Ymd, ymd: Ymd, offset: i32, period: Period) -> Result<Ymd, CalendarError> {
        if self.has_year_zero() || offset == 0 {
            return Ok(ymd);
        }

        let in_year_zero = ymd.0 == 0;
        let crossed_zero = (start.0 > 0) != (ymd.0 > 0);
        let direction = offset.signum();
        let days_in_missing_year = self.system.days_in_year(-1);
        let (units, extra, unit) = match period {
            Period::Year if in_year_zero || crossed_zero => (offset, direction, Period::Year),
            Period::Month if in_year_zero || crossed_zero => {
                (offset, direction * self.system.months_in_year(-1), Period::Month)
            },
            Period::Week if in_year_zero => (
                offset
                    .checked_mul(self.days_in_week())
                    .ok_or_else(|| self.invalid(Invalid::Date))?,
                direction * days_in_missing_year,
                Period::Day,
            ),
            Period::Day if in_year_zero => (offset, direction * days_in_missing_year, Period::Day),
            _ => return Ok(ymd),
        };

        let adjusted = units
            .checked_add(extra)
            .ok_or_else(|| self.invalid(Invalid::Date))?;
        debug!("{} has no year zero, re-adding {adjusted} {unit}s instead of {offset} {period}s", self.name());
        self.add_at(Depth::OUTER.nested(), start, adjusted, unit)
    }

    /// Overwrites one field of `date`.
    ///
    /// Changing the year or month clamps the day to the new month's length.
    ///
    /// # Errors
    /// Returns `CalendarError::DifferentCalendars` if `date` belongs to
    /// another calendar, `CalendarError::InvalidMonth` if a new year or month
    /// does not name a month of the calendar, and `CalendarError::InvalidDate`
    /// if the result is not a date. `date` is unchanged on error.
    pub fn set(&self, date: &mut CalendarDate<'_>, value: i32, field: Field) -> Result<(), CalendarError> {
        self.same_calendar(date)?;
        let (mut year, mut month, mut day) = date.ymd();
        match field {
            Field::Year => year = value,
            Field::Month => month = value,
            Field::Day => day = value,
        }
        if field != Field::Day {
            day = day.min(self.days_in_month(year, month)?);
        }
        self.replace(date, (year, month, day))
    }

    /// Replaces all fields of `date` after validating them together.
    pub(crate) fn replace(&self, date: &mut CalendarDate<'_>, ymd: Ymd) -> Result<(), CalendarError> {
        self.check(Depth::OUTER, ymd, Invalid::Date)?;
        date.overwrite(ymd);
        Ok(())
    }

    // --- platform dates ---

    /// The start (UTC midnight) of the given date as a [`SystemTime`].
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidDate` if the fields are not a date of
    /// this calendar or the instant is not representable.
    pub fn to_system_date(&self, year: i32, month: i32, day: i32) -> Result<SystemTime, CalendarError> {
        let jd = self.to_jd(year, month, day)?;
        Gregorian
            .from_jd(jd)
            .and_then(gregorian::to_system_time)
            .ok_or_else(|| self.invalid(Invalid::Date))
    }

    /// The date (UTC) containing `time`.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidDate` if the day is outside the calendar's range.
    pub fn from_system_date(&self, time: SystemTime) -> Result<CalendarDate<'_>, CalendarError> {
        let (year, month, day) = gregorian::from_system_time(time).ok_or_else(|| self.invalid(Invalid::Date))?;
        let jd = Gregorian
            .to_jd(year, month, day)
            .ok_or_else(|| self.invalid(Invalid::Date))?;
        self.from_jd(jd)
    }
}

/// Formats a year sign-prefixed and zero-padded to four digits.
pub(crate) fn format_year(year: i32) -> String {
    let sign = if year < 0 { "-" } else { "" };
    format!("{sign}{:04}", year.unsigned_abs())
}

/// Whole days in `value`, rounded down; `None` if it does not fit an `i32`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn whole_days(value: f64) -> Option<i32> {
    let days = value.floor();
    (days.is_finite() && days >= f64::from(i32::MIN) && days <= f64::from(i32::MAX)).then(|| days as i32)
}

fn parse_component(part: &str, input: &str) -> Result<i32, CalendarError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CalendarError::InvalidFormat(input.to_owned()));
    }
    part.parse::<i32>()
        .map_err(|_| CalendarError::InvalidFormat(input.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_utils::{gregorian, leap_month, shifted, ummalqura},
        ummalqura::UmmAlQura,
    };

    #[test]
    fn test_period_from_str() {
        struct TestCase {
            input:    &'static str,
            expected: Option<Period>,
        }

        let cases = [
            TestCase { input: "y", expected: Some(Period::Year) },
            TestCase { input: "Months", expected: Some(Period::Month) },
            TestCase { input: " w ", expected: Some(Period::Week) },
            TestCase { input: "day", expected: Some(Period::Day) },
            TestCase { input: "fortnight", expected: None },
        ];

        for case in &cases {
            assert_eq!(case.input.parse::<Period>().ok(), case.expected, "input {:?}", case.input);
        }
        assert!(matches!("q".parse::<Period>(), Err(CalendarError::InvalidPeriod(_))));
    }

    #[test]
    fn test_field_from_str_and_serde() {
        assert_eq!("m".parse::<Field>().unwrap(), Field::Month);
        assert!("w".parse::<Field>().is_err());
        assert_eq!(serde_json::to_string(&Field::Day).unwrap(), "\"day\"");
        assert_eq!(serde_json::from_str::<Period>("\"week\"").unwrap(), Period::Week);
        assert_eq!(Period::Month.to_string(), "month");
    }

    #[test]
    fn test_depth() {
        assert!(Depth::OUTER.validates());
        assert!(!Depth::OUTER.nested().validates());
        assert!(!Depth::OUTER.nested().nested().validates());
    }

    #[test]
    fn test_is_valid_cases() {
        struct TestCase {
            ymd:         Ymd,
            valid:       bool,
            description: &'static str,
        }

        let cases = [
            TestCase { ymd: (2024, 2, 29), valid: true, description: "leap day" },
            TestCase { ymd: (2023, 2, 29), valid: false, description: "leap day in common year" },
            TestCase { ymd: (2024, 0, 1), valid: false, description: "month below minimum" },
            TestCase { ymd: (2024, 13, 1), valid: false, description: "month above maximum" },
            TestCase { ymd: (2024, 4, 31), valid: false, description: "day past month end" },
            TestCase { ymd: (2024, 4, 0), valid: false, description: "day below minimum" },
            TestCase { ymd: (0, 1, 1), valid: false, description: "year zero" },
            TestCase { ymd: (-1, 12, 31), valid: true, description: "last day of 1 BCE" },
        ];

        let calendar = gregorian();
        for case in &cases {
            let (y, m, d) = case.ymd;
            assert_eq!(calendar.is_valid(y, m, d), case.valid, "{}", case.description);
        }
    }

    #[test]
    fn test_validation_error_kinds() {
        let calendar = gregorian();
        assert_eq!(
            calendar.new_date(2023, 2, 29),
            Err(CalendarError::InvalidDate { calendar: "Gregorian" })
        );
        assert_eq!(
            calendar.days_in_month(2023, 13),
            Err(CalendarError::InvalidMonth { calendar: "Gregorian" })
        );
        assert_eq!(
            calendar.leap_year(0),
            Err(CalendarError::InvalidYear { calendar: "Gregorian" })
        );
        assert_eq!(
            calendar.months_in_year(0),
            Err(CalendarError::InvalidYear { calendar: "Gregorian" })
        );
    }

    #[test]
    fn test_month_of_year_identity_when_year_starts_at_min_month() {
        let calendar = gregorian();
        for month in 1..=12 {
            assert_eq!(calendar.month_of_year(2024, month).unwrap(), month);
            assert_eq!(calendar.from_month_of_year(2024, month).unwrap(), month);
        }
    }

    #[test]
    fn test_month_of_year_remaps_shifted_year() {
        let calendar = shifted();
        assert_eq!(calendar.month_of_year(2024, 7).unwrap(), 1);
        assert_eq!(calendar.month_of_year(2024, 12).unwrap(), 6);
        assert_eq!(calendar.month_of_year(2024, 1).unwrap(), 7);
        assert_eq!(calendar.month_of_year(2024, 6).unwrap(), 12);
        for ordinal in 1..=12 {
            let month = calendar.from_month_of_year(2024, ordinal).unwrap();
            assert_eq!(calendar.month_of_year(2024, month).unwrap(), ordinal);
        }
    }

    #[test]
    fn test_days_in_year_and_day_of_year() {
        let calendar = gregorian();
        assert_eq!(calendar.days_in_year(2024).unwrap(), 366);
        assert_eq!(calendar.days_in_year(2023).unwrap(), 365);
        assert_eq!(calendar.day_of_year(2024, 1, 1).unwrap(), 1);
        assert_eq!(calendar.day_of_year(2024, 3, 1).unwrap(), 61);
        assert_eq!(calendar.day_of_year(2023, 12, 31).unwrap(), 365);
        assert_eq!(calendar.day_of_year(2024, 12, 31).unwrap(), 366);
    }

    #[test]
    fn test_day_of_week_is_sunday_based() {
        let calendar = gregorian();
        // 2000-01-01 was a Saturday, 2024-01-01 a Monday
        assert_eq!(calendar.day_of_week(2000, 1, 1).unwrap(), 6);
        assert_eq!(calendar.day_of_week(2024, 1, 1).unwrap(), 1);
        assert_eq!(calendar.day_of_week(2024, 1, 7).unwrap(), 0);
    }

    #[test]
    fn test_add_days_and_weeks_through_jd() {
        let calendar = gregorian();
        let mut date = calendar.new_date(2024, 2, 28).unwrap();
        date.add(2, Period::Day).unwrap();
        assert_eq!(date.ymd(), (2024, 3, 1));
        date.add(-1, Period::Week).unwrap();
        assert_eq!(date.ymd(), (2024, 2, 23));
        date.add(0, Period::Day).unwrap();
        assert_eq!(date.ymd(), (2024, 2, 23));
    }

    #[test]
    fn test_add_month_clamps_to_month_end() {
        let calendar = gregorian();
        let mut date = calendar.new_date(2024, 1, 31).unwrap();
        date.add(1, Period::Month).unwrap();
        assert_eq!(date.ymd(), (2024, 2, 29));

        let mut date = calendar.new_date(2023, 1, 31).unwrap();
        date.add(1, Period::Month).unwrap();
        assert_eq!(date.ymd(), (2023, 2, 28));

        let mut date = calendar.new_date(2024, 3, 31).unwrap();
        date.add(-1, Period::Month).unwrap();
        assert_eq!(date.ymd(), (2024, 2, 29));
    }

    #[test]
    fn test_add_months_carries_across_years() {
        let calendar = gregorian();
        let mut date = calendar.new_date(2023, 11, 15).unwrap();
        date.add(3, Period::Month).unwrap();
        assert_eq!(date.ymd(), (2024, 2, 15));
        date.add(-14, Period::Month).unwrap();
        assert_eq!(date.ymd(), (2022, 12, 15));
        date.add(25, Period::Month).unwrap();
        assert_eq!(date.ymd(), (2025, 1, 15));
    }

    #[test]
    fn test_add_year_clamps_leap_day() {
        let calendar = gregorian();
        let mut date = calendar.new_date(2024, 2, 29).unwrap();
        date.add(1, Period::Year).unwrap();
        assert_eq!(date.ymd(), (2025, 2, 28));
    }

    #[test]
    fn test_add_never_lands_in_year_zero() {
        struct TestCase {
            start:    Ymd,
            offset:   i32,
            period:   Period,
            expected: Ymd,
        }

        let cases = [
            TestCase { start: (1, 1, 1), offset: -1, period: Period::Year, expected: (-1, 1, 1) },
            TestCase { start: (-1, 6, 1), offset: 1, period: Period::Year, expected: (1, 6, 1) },
            TestCase { start: (-1, 6, 1), offset: 5, period: Period::Year, expected: (5, 6, 1) },
            TestCase { start: (3, 6, 1), offset: -5, period: Period::Year, expected: (-3, 6, 1) },
            TestCase { start: (1, 1, 1), offset: -1, period: Period::Month, expected: (-1, 12, 1) },
            TestCase { start: (1, 2, 1), offset: -13, period: Period::Month, expected: (-1, 1, 1) },
            TestCase { start: (-1, 12, 15), offset: 1, period: Period::Month, expected: (1, 1, 15) },
            TestCase { start: (1, 1, 1), offset: -1, period: Period::Day, expected: (-1, 12, 31) },
            TestCase { start: (-1, 12, 31), offset: 1, period: Period::Day, expected: (1, 1, 1) },
            TestCase { start: (1, 1, 3), offset: -1, period: Period::Week, expected: (-1, 12, 27) },
        ];

        let calendar = gregorian();
        for case in &cases {
            let (y, m, d) = case.start;
            let mut date = calendar.new_date(y, m, d).unwrap();
            date.add(case.offset, case.period).unwrap();
            assert_eq!(
                date.ymd(),
                case.expected,
                "{:?} + {} {}",
                case.start,
                case.offset,
                case.period
            );
            assert_ne!(date.year(), 0);
        }
    }

    #[test]
    fn test_add_months_in_shifted_year() {
        let calendar = shifted();
        // December is the sixth month of a year that starts in July
        let mut date = calendar.new_date(2024, 12, 15).unwrap();
        date.add(1, Period::Month).unwrap();
        assert_eq!(date.ymd(), (2024, 1, 15));

        // June closes the year, so the next month opens the following one
        let mut date = calendar.new_date(2024, 6, 10).unwrap();
        date.add(1, Period::Month).unwrap();
        assert_eq!(date.ymd(), (2025, 7, 10));
    }

    #[test]
    fn test_month_of_year_in_thirteen_month_year() {
        let calendar = leap_month();
        assert_eq!(calendar.months_in_year(3).unwrap(), 13);
        assert_eq!(calendar.month_of_year(3, 13).unwrap(), 7);
        assert_eq!(calendar.month_of_year(3, 1).unwrap(), 8);
        assert_eq!(calendar.month_of_year(4, 1).unwrap(), 7);
        assert_eq!(calendar.from_month_of_year(3, 13).unwrap(), 6);
        assert!(calendar.month_of_year(4, 13).is_err());
    }

    #[test]
    fn test_add_across_leap_month_years() {
        struct TestCase {
            start:    Ymd,
            offset:   i32,
            period:   Period,
            expected: Ymd,
        }

        let cases = [
            // Month 1 is ordinal 8 in leap year 3 but ordinal 7 in year 4
            TestCase { start: (3, 1, 10), offset: 1, period: Period::Year, expected: (4, 1, 10) },
            TestCase { start: (2, 1, 10), offset: 1, period: Period::Year, expected: (3, 1, 10) },
            // Month 13 does not exist in year 4
            TestCase { start: (3, 13, 1), offset: 1, period: Period::Year, expected: (4, 1, 1) },
            TestCase { start: (3, 7, 5), offset: 1, period: Period::Year, expected: (4, 7, 5) },
            TestCase { start: (2, 6, 1), offset: 13, period: Period::Month, expected: (3, 6, 1) },
            TestCase { start: (3, 12, 1), offset: 1, period: Period::Month, expected: (3, 13, 1) },
            TestCase { start: (3, 6, 1), offset: 1, period: Period::Month, expected: (4, 7, 1) },
            TestCase { start: (4, 7, 5), offset: -13, period: Period::Month, expected: (3, 7, 5) },
            TestCase { start: (1, 7, 1), offset: 25, period: Period::Month, expected: (3, 8, 1) },
            TestCase { start: (3, 6, 30), offset: 1, period: Period::Day, expected: (4, 7, 1) },
        ];

        let calendar = leap_month();
        for case in &cases {
            let (y, m, d) = case.start;
            let mut date = calendar.new_date(y, m, d).unwrap();
            date.add(case.offset, case.period).unwrap();
            assert_eq!(
                date.ymd(),
                case.expected,
                "{:?} + {} {}",
                case.start,
                case.offset,
                case.period
            );
        }
    }

    #[test]
    fn test_add_outside_table_fails_without_spurious_errors() {
        let calendar = ummalqura();
        let mut date = calendar.new_date(1500, 12, 1).unwrap();
        // Intermediate lookups in 1501 are not validated; only the result is
        assert_eq!(
            date.add(1, Period::Month),
            Err(CalendarError::InvalidDate { calendar: "Umm al-Qura" })
        );
        assert_eq!(
            date.add(1, Period::Year),
            Err(CalendarError::InvalidDate { calendar: "Umm al-Qura" })
        );
        assert_eq!(date.ymd(), (1500, 12, 1));
    }

    #[test]
    fn test_set_fields() {
        let calendar = gregorian();
        let mut date = calendar.new_date(2024, 3, 31).unwrap();
        calendar.set(&mut date, 2, Field::Month).unwrap();
        assert_eq!(date.ymd(), (2024, 2, 29));
        calendar.set(&mut date, 2023, Field::Year).unwrap();
        assert_eq!(date.ymd(), (2023, 2, 28));
        calendar.set(&mut date, 14, Field::Day).unwrap();
        assert_eq!(date.ymd(), (2023, 2, 14));
    }

    #[test]
    fn test_set_rejects_and_keeps_date() {
        let calendar = gregorian();
        let mut date = calendar.new_date(2024, 3, 31).unwrap();
        assert_eq!(
            calendar.set(&mut date, 13, Field::Month),
            Err(CalendarError::InvalidMonth { calendar: "Gregorian" })
        );
        assert_eq!(
            calendar.set(&mut date, 32, Field::Day),
            Err(CalendarError::InvalidDate { calendar: "Gregorian" })
        );
        assert_eq!(
            calendar.set(&mut date, 0, Field::Year),
            Err(CalendarError::InvalidMonth { calendar: "Gregorian" })
        );
        assert_eq!(date.ymd(), (2024, 3, 31));
    }

    #[test]
    fn test_operations_reject_foreign_dates() {
        let gregorian = gregorian();
        let lunar = ummalqura();
        let mut date = lunar.new_date(1440, 9, 10).unwrap();
        let err = CalendarError::DifferentCalendars {
            first:  "Gregorian",
            second: "Umm al-Qura",
        };
        assert_eq!(gregorian.add(&mut date, 1, Period::Day), Err(err.clone()));
        assert_eq!(gregorian.set(&mut date, 1, Field::Day), Err(err.clone()));
        assert_eq!(gregorian.copy_date(&date), Err(err));
    }

    #[test]
    fn test_copy_date_across_languages() {
        let english = ummalqura();
        let arabic = Calendar::new(Box::new(UmmAlQura), "ar");
        let date = english.new_date(1440, 9, 10).unwrap();
        let copy = arabic.copy_date(&date).unwrap();
        assert_eq!(copy.ymd(), (1440, 9, 10));
        assert_eq!(copy.calendar().language(), "ar");
    }

    #[test]
    fn test_epoch_and_format_year() {
        let calendar = gregorian();
        assert_eq!(calendar.epoch(2024).unwrap(), "CE");
        assert_eq!(calendar.epoch(-44).unwrap(), "BCE");
        assert_eq!(calendar.format_year(2024).unwrap(), "2024");
        assert_eq!(calendar.format_year(33).unwrap(), "0033");
        assert_eq!(calendar.format_year(-44).unwrap(), "-0044");
        assert!(calendar.format_year(0).is_err());
    }

    #[test]
    fn test_parse_date() {
        let calendar = gregorian();
        assert_eq!(calendar.parse_date("2024-02-29").unwrap().ymd(), (2024, 2, 29));
        assert_eq!(calendar.parse_date(" -0044-03-15 ").unwrap().ymd(), (-44, 3, 15));
        assert!(matches!(calendar.parse_date("2024/02/29"), Err(CalendarError::InvalidFormat(_))));
        assert!(matches!(calendar.parse_date("2024-02"), Err(CalendarError::InvalidFormat(_))));
        assert!(matches!(calendar.parse_date("2024-+2-01"), Err(CalendarError::InvalidFormat(_))));
        assert!(matches!(calendar.parse_date("2023-02-29"), Err(CalendarError::InvalidDate { .. })));
    }

    #[test]
    fn test_month_and_day_names() {
        let calendar = gregorian();
        assert_eq!(calendar.month_name(1, NameForm::Long), Some("January"));
        assert_eq!(calendar.month_name(12, NameForm::Short), Some("Dec"));
        assert_eq!(calendar.month_name(0, NameForm::Long), None);
        assert_eq!(calendar.day_name(5, NameForm::Long), Some("Friday"));
        assert_eq!(calendar.day_name(-1, NameForm::Long), None);
    }

    #[test]
    fn test_whole_days() {
        assert_eq!(whole_days(2.5), Some(2));
        assert_eq!(whole_days(-0.5), Some(-1));
        assert_eq!(whole_days(f64::NAN), None);
        assert_eq!(whole_days(1e12), None);
    }
}
