//! Per-language names and conventions of a calendar.
//!
//! Calendar systems ship static [`Locale`] tables keyed by language code;
//! `select` picks the entry for a language, falling back to the default one.

use serde::{Deserialize, Serialize};

use crate::{consts::DEFAULT_LANGUAGE, digits::Digits, prelude::*};

/// Localised names and conventions of one calendar in one language.
///
/// Each calendar system carries a static table of these, keyed by language
/// code. The `""` entry is the default (English) one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale {
    /// Display name of the calendar
    pub name: &'static str,
    /// Epoch designators before and after year 1
    pub epochs: [&'static str; 2],
    /// Long month names, starting at the calendar's minimum month
    pub month_names: [&'static str; 12],
    /// Short month names
    pub month_names_short: [&'static str; 12],
    /// Long day names, starting at Sunday
    pub day_names: [&'static str; 7],
    /// Short day names
    pub day_names_short: [&'static str; 7],
    /// Minimal day names
    pub day_names_min: [&'static str; 7],
    /// Native numerals, if the language does not use ASCII digits
    pub digits: Option<Digits>,
    /// Date format pattern for this calendar
    pub date_format: &'static str,
    /// First day of the week, 0 being Sunday
    pub first_day: u8,
    /// Whether text in this language reads right to left
    pub is_rtl: bool,
}

/// Which variant of a month or day name to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameForm {
    #[default]
    #[display(fmt = "long")]
    Long,
    #[display(fmt = "short")]
    Short,
    /// Only defined for day names; months fall back to the short form
    #[display(fmt = "min")]
    Min,
}

impl Locale {
    /// Name of the month at zero-based `index`, if it exists.
    pub fn month_name(&self, index: usize, form: NameForm) -> Option<&'static str> {
        match form {
            NameForm::Long => self.month_names.get(index).copied(),
            NameForm::Short | NameForm::Min => self.month_names_short.get(index).copied(),
        }
    }

    /// Name of the day of week `day_of_week` (0 = Sunday), if it exists.
    pub fn day_name(&self, day_of_week: usize, form: NameForm) -> Option<&'static str> {
        let names = match form {
            NameForm::Long => &self.day_names,
            NameForm::Short => &self.day_names_short,
            NameForm::Min => &self.day_names_min,
        };
        names.get(day_of_week).copied()
    }

    /// Renders `value` with this locale's digits.
    pub fn format_number(&self, value: u32) -> String {
        self.digits
            .map_or_else(|| value.to_string(), |digits| digits.localize(value))
    }
}

/// Locale used by calendar systems that ship no default entry.
pub(crate) static ROOT: Locale = Locale {
    name:              "Calendar",
    epochs:            ["BCE", "CE"],
    month_names:       ["1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12"],
    month_names_short: ["1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12"],
    day_names:         ["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"],
    day_names_short:   ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
    day_names_min:     ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"],
    digits:            None,
    date_format:       "yyyy-mm-dd",
    first_day:         0,
    is_rtl:            false,
};

/// Picks the entry for `language`, falling back to the default entry.
///
/// Returns the language key actually selected alongside the locale.
pub(crate) fn select(table: &'static [(&'static str, Locale)], language: &str) -> (&'static str, &'static Locale) {
    table
        .iter()
        .find(|(key, _)| *key == language)
        .or_else(|| table.iter().find(|(key, _)| *key == DEFAULT_LANGUAGE))
        .map_or((DEFAULT_LANGUAGE, &ROOT), |(key, locale)| (*key, locale))
}
