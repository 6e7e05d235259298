/// Calendar used when a registry lookup names no calendar
pub const DEFAULT_CALENDAR: &str = "gregorian";

/// Language key of the default (English) locale entry
pub const DEFAULT_LANGUAGE: &str = "";

/// Days in every supported week
pub const DAYS_IN_WEEK: i32 = 7;

/// Day of week numbering starts at Sunday
pub const SUNDAY: i32 = 0;
/// Friday, the weekly rest day of the Umm al-Qura work week
pub const FRIDAY: i32 = 5;
/// Saturday, first non-working day of the ISO work week
pub const SATURDAY: i32 = 6;
/// Thursday decides which year an ISO week belongs to
pub const THURSDAY: i32 = 4;

/// Offset that turns `floor(jd)` into a Sunday-based day of week
pub(crate) const WEEKDAY_JD_OFFSET: i64 = 2;

/// Julian Day of 1 January 0001 CE (proleptic Gregorian)
pub const GREGORIAN_EPOCH_JD: f64 = 1_721_425.5;

/// Julian Day of the Unix epoch, 1970-01-01T00:00:00Z
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Seconds in a civil day
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Month number for February
pub const FEBRUARY: i32 = 2;
/// Month number for March, the first month of the Meeus computational year
pub(crate) const MARCH: i32 = 3;

/// Days in February for leap years
pub const FEBRUARY_DAYS_LEAP: i32 = 29;

/// Days in each Gregorian month (index 0 is unused, months are 1-indexed)
/// February shows 28 days (non-leap year default)
pub const DAYS_IN_MONTH: [i32; 13] = [
    0,  // index 0 unused (months are 1-indexed)
    31, // January
    28, // February (non-leap, adjusted by leap year check)
    31, // March
    30, // April
    31, // May
    30, // June
    31, // July
    31, // August
    30, // September
    31, // October
    30, // November
    31, // December
];

/// Leap year occurs every 4 years
pub(crate) const LEAP_YEAR_CYCLE: i32 = 4;
/// Century years are not leap years unless...
pub(crate) const CENTURY_CYCLE: i32 = 100;
/// ...they are divisible by 400 (Gregorian calendar correction)
pub(crate) const GREGORIAN_CYCLE: i32 = 400;

/// Days in a common solar year
pub const DAYS_IN_COMMON_YEAR: i32 = 365;
/// Days in a leap solar year
pub const DAYS_IN_LEAP_YEAR: i32 = 366;

/// Subtracted from a Julian Day to obtain a Modified Chronological JDN
pub(crate) const MCJDN_OFFSET: f64 = 2_400_000.0 - 0.5;

/// Lunation number preceding the first Umm al-Qura table entry
pub(crate) const UMMALQURA_LUNATION_OFFSET: i32 = 15_292;

/// First year covered by the Umm al-Qura month table
pub const UMMALQURA_MIN_YEAR: i32 = 1276;
/// Last year covered by the Umm al-Qura month table
pub const UMMALQURA_MAX_YEAR: i32 = 1500;

/// Month length reported for months outside the Umm al-Qura table
pub(crate) const UMMALQURA_FALLBACK_MONTH_DAYS: i32 = 30;

/// A tabulated lunar year of this length is a leap year
pub(crate) const UMMALQURA_LEAP_YEAR_DAYS: i32 = 355;

/// Months in every supported year
pub const MONTHS_IN_YEAR: i32 = 12;

/// Date component separator (ISO 8601 style)
pub const DATE_SEPARATOR: char = '-';
