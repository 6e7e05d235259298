/// Error type for calendar lookups, date construction and date arithmetic.
///
/// Calendar names carried by the variants are the locale display names of
/// the engines involved (e.g. `"Umm al-Qura"`), except for
/// [`CalendarError::UnknownCalendar`] which carries the name that was looked up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    /// No calendar is registered under the requested name.
    #[error("Calendar {name} not found")]
    UnknownCalendar { name: String },

    /// The year/month/day triple is not a date of the calendar.
    #[error("Invalid {calendar} date")]
    InvalidDate { calendar: &'static str },

    /// The year/month pair is not a month of the calendar.
    #[error("Invalid {calendar} month")]
    InvalidMonth { calendar: &'static str },

    /// The year is outside the calendar's domain.
    #[error("Invalid {calendar} year")]
    InvalidYear { calendar: &'static str },

    /// An operation mixed dates from two distinct calendars.
    #[error("Cannot mix {first} and {second} dates")]
    DifferentCalendars {
        first:  &'static str,
        second: &'static str,
    },

    /// A date string did not have the `[-]YYYY-MM-DD` shape.
    #[error("Invalid date format: {0}")]
    InvalidFormat(String),

    /// A period or field name was not recognised.
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
}

/// Which kind of validation failure a check reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Invalid {
    Date,
    Month,
    Year,
}

impl Invalid {
    pub(crate) const fn error(self, calendar: &'static str) -> CalendarError {
        match self {
            Self::Date => CalendarError::InvalidDate { calendar },
            Self::Month => CalendarError::InvalidMonth { calendar },
            Self::Year => CalendarError::InvalidYear { calendar },
        }
    }
}
