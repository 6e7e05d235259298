//! Name-based lookup of calendar engines.
//!
//! A [`Registry`] maps calendar names to constructors and memoizes one
//! [`Calendar`] per (name, language) pair. Languages without their own locale
//! entry resolve to the calendar's default entry and share its instance.

use std::{collections::HashMap, sync::OnceLock};

use serde::{Deserialize, Serialize};

use crate::{
    CalendarDate, CalendarError,
    calendar::{Calendar, CalendarSystem},
    consts::{DEFAULT_CALENDAR, DEFAULT_LANGUAGE},
    gregorian::{self, Gregorian},
    locale::{self, Locale},
    prelude::*,
    ummalqura::{self, UmmAlQura},
};
pub use crate::digits::{substitute_chinese_digits, substitute_digits};

/// Builds a fresh calendar system
pub type Constructor = fn() -> Box<dyn CalendarSystem>;

/// Defaults applied to lookups that leave the calendar or language empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub default_calendar: String,
    pub default_language: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_calendar: DEFAULT_CALENDAR.to_owned(),
            default_language: DEFAULT_LANGUAGE.to_owned(),
        }
    }
}

/// Where a date handed to [`Registry::new_date`] comes from.
#[derive(Debug, Clone, Copy, From)]
pub enum DateSource<'a> {
    /// An existing date, copied within its own calendar
    Date(CalendarDate<'a>),
    /// Raw `(year, month, day)` fields for the named calendar
    Fields(i32, i32, i32),
}

#[derive(Debug)]
struct Entry {
    constructor: Constructor,
    locales:     &'static [(&'static str, Locale)],
    /// One lazily built engine per language the calendar has a locale for
    slots:       Vec<(&'static str, OnceLock<Calendar>)>,
}

impl Entry {
    fn new(constructor: Constructor) -> Self {
        let locales = constructor().locales();
        let mut slots: Vec<_> = locales
            .iter()
            .map(|(language, _)| (*language, OnceLock::new()))
            .collect();
        if !slots.iter().any(|(language, _)| *language == DEFAULT_LANGUAGE) {
            slots.push((DEFAULT_LANGUAGE, OnceLock::new()));
        }
        Self {
            constructor,
            locales,
            slots,
        }
    }

    fn slot(&self, language: &str) -> Option<&OnceLock<Calendar>> {
        self.slots
            .iter()
            .find(|(slot_language, _)| *slot_language == language)
            .map(|(_, slot)| slot)
    }
}

/// A set of named calendars and their cached engines.
#[derive(Debug)]
pub struct Registry {
    entries: HashMap<String, Entry>,
    config:  RegistryConfig,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// A registry with the built-in calendars and default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// A registry with the built-in calendars.
    pub fn with_config(config: RegistryConfig) -> Self {
        let mut registry = Self::empty(config);
        registry.register(gregorian::NAME, || Box::new(Gregorian));
        registry.register(ummalqura::NAME, || Box::new(UmmAlQura));
        registry
    }

    /// A registry without any calendars.
    pub fn empty(config: RegistryConfig) -> Self {
        Self {
            entries: HashMap::new(),
            config,
        }
    }

    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Registers `constructor` under `name`, matched case-insensitively.
    ///
    /// Registering a name again replaces the earlier constructor and drops
    /// its cached engines.
    pub fn register(&mut self, name: &str, constructor: Constructor) -> &mut Self {
        let key = name.to_lowercase();
        debug!("registering calendar {key}");
        self.entries.insert(key, Entry::new(constructor));
        self
    }

    /// Names of the registered calendars, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The engine for calendar `name` in `language`.
    ///
    /// Empty arguments select the configured defaults. Repeated lookups of
    /// the same pair return the same instance.
    ///
    /// # Errors
    /// Returns `CalendarError::UnknownCalendar` if no calendar is registered under `name`.
    pub fn instance(&self, name: &str, language: &str) -> Result<&Calendar, CalendarError> {
        let name = if name.is_empty() { self.config.default_calendar.as_str() } else { name };
        let language = if language.is_empty() { self.config.default_language.as_str() } else { language };

        let key = name.to_lowercase();
        let unknown = || CalendarError::UnknownCalendar { name: name.to_owned() };
        let Some(entry) = self.entries.get(&key) else {
            warn!("calendar {name} is not registered");
            return Err(unknown());
        };

        // Entry::new leaves a slot for every language select can return
        let (language, _) = locale::select(entry.locales, language);
        let slot = entry.slot(language).ok_or_else(unknown)?;
        Ok(slot.get_or_init(|| {
            debug!("creating {key} calendar for language {language:?}");
            Calendar::new((entry.constructor)(), language)
        }))
    }

    /// The engine for the configured default calendar and language.
    ///
    /// # Errors
    /// Returns `CalendarError::UnknownCalendar` if the default calendar is not registered.
    pub fn default_calendar(&self) -> Result<&Calendar, CalendarError> {
        self.instance("", "")
    }

    /// Creates a date from an existing date or from raw fields.
    ///
    /// An existing date is copied within its own calendar and `calendar` and
    /// `language` are ignored. Raw fields are resolved against the named
    /// calendar (empty for the default).
    ///
    /// # Errors
    /// Returns `CalendarError::UnknownCalendar` for unregistered calendars and
    /// `CalendarError::InvalidDate` if the fields are not a date of the calendar.
    pub fn new_date<'a>(
        &'a self,
        source: impl Into<DateSource<'a>>,
        calendar: &str,
        language: &str,
    ) -> Result<CalendarDate<'a>, CalendarError> {
        match source.into() {
            DateSource::Date(date) => date.calendar().copy_date(&date),
            DateSource::Fields(year, month, day) => self.instance(calendar, language)?.new_date(year, month, day),
        }
    }
}

/// The process-wide registry with the built-in calendars.
pub fn calendars() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(Registry::new)
}

#[cfg(test)]
mod tests {
    use std::{ptr, thread};

    use super::*;
    use crate::test_utils::ShiftedYear;

    #[test]
    fn test_instance_is_cached() {
        let registry = Registry::new();
        let first = registry.instance("gregorian", "").unwrap();
        let second = registry.instance("Gregorian", "").unwrap();
        assert!(ptr::eq(first, second));

        let chinese = registry.instance("gregorian", "zh-CN").unwrap();
        assert!(!ptr::eq(first, chinese));
        assert!(ptr::eq(chinese, registry.instance("GREGORIAN", "zh-CN").unwrap()));
    }

    #[test]
    fn test_unknown_language_shares_default_instance() {
        let registry = Registry::new();
        let default = registry.instance("ummalqura", "").unwrap();
        let fallback = registry.instance("ummalqura", "fr").unwrap();
        assert!(ptr::eq(default, fallback));
        assert_eq!(fallback.language(), "");
    }

    #[test]
    fn test_unknown_calendar() {
        let registry = Registry::new();
        let err = registry.instance("mayan", "").unwrap_err();
        assert_eq!(err, CalendarError::UnknownCalendar { name: "mayan".to_owned() });
        assert_eq!(err.to_string(), "Calendar mayan not found");

        let empty = Registry::empty(RegistryConfig::default());
        assert!(matches!(empty.default_calendar(), Err(CalendarError::UnknownCalendar { .. })));
    }

    #[test]
    fn test_concurrent_first_access_is_idempotent() {
        let registry = Registry::new();
        let addresses: Vec<usize> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| ptr::from_ref(registry.instance("ummalqura", "ar").unwrap()) as usize))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });
        assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn test_config_defaults() {
        let registry = Registry::with_config(RegistryConfig {
            default_calendar: "UmmAlQura".to_owned(),
            default_language: "ar".to_owned(),
        });
        let calendar = registry.default_calendar().unwrap();
        assert_eq!(calendar.name(), "ummalqura");
        assert_eq!(calendar.language(), "ar");
        assert_eq!(registry.instance("gregorian", "").unwrap().language(), "");
    }

    #[test]
    fn test_config_from_json() {
        let config: RegistryConfig = serde_json::from_str(r#"{"default_language": "zh-CN"}"#).unwrap();
        assert_eq!(config.default_calendar, "gregorian");
        assert_eq!(config.default_language, "zh-CN");

        let json = serde_json::to_value(RegistryConfig::default()).unwrap();
        assert_eq!(json, serde_json::json!({"default_calendar": "gregorian", "default_language": ""}));
    }

    #[test]
    fn test_register_custom_calendar() {
        let mut registry = Registry::new();
        registry.register("Fiscal", || Box::new(ShiftedYear));
        assert_eq!(registry.names(), ["fiscal", "gregorian", "ummalqura"]);

        let calendar = registry.instance("fiscal", "").unwrap();
        assert_eq!(calendar.month_of_year(2024, 7).unwrap(), 1);
        // The test system has no locale table of its own
        assert_eq!(calendar.locale().name, "Calendar");
    }

    #[test]
    fn test_new_date_from_fields_and_dates() {
        let registry = Registry::new();
        let date = registry.new_date((2024, 2, 29), "", "").unwrap();
        assert_eq!(date.calendar().name(), "gregorian");
        assert_eq!(date.ymd(), (2024, 2, 29));

        let lunar = registry.new_date((1440, 9, 10), "ummalqura", "ar").unwrap();
        assert_eq!(lunar.calendar().language(), "ar");

        // A date source keeps its own calendar
        let copy = registry.new_date(lunar, "gregorian", "").unwrap();
        assert_eq!(copy, lunar);

        assert!(matches!(
            registry.new_date((2023, 2, 29), "", ""),
            Err(CalendarError::InvalidDate { .. })
        ));
        assert!(matches!(
            registry.new_date((1, 1, 1), "aztec", ""),
            Err(CalendarError::UnknownCalendar { .. })
        ));
    }

    #[test]
    fn test_global_registry() {
        assert!(ptr::eq(calendars(), calendars()));
        assert!(calendars().instance("ummalqura", "").is_ok());
    }
}
