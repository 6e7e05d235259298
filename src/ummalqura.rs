//! The Umm al-Qura calendar of Saudi Arabia.
//!
//! A tabulated lunar calendar: month lengths are not computed but read from
//! the published month starts in [`MONTH_STARTS`](crate::ummalqura_table).
//! Dates are only defined for the years the table covers.

use crate::{
    calendar::{CalendarSystem, Ymd, whole_days},
    consts::{
        FRIDAY, MCJDN_OFFSET, MONTHS_IN_YEAR, UMMALQURA_FALLBACK_MONTH_DAYS, UMMALQURA_LEAP_YEAR_DAYS,
        UMMALQURA_LUNATION_OFFSET, UMMALQURA_MAX_YEAR, UMMALQURA_MIN_YEAR,
    },
    digits::substitute_digits,
    locale::Locale,
    ummalqura_table::MONTH_STARTS,
};

/// Registry name of the Umm al-Qura calendar
pub const NAME: &str = "ummalqura";

/// The tabulated Umm al-Qura lunar calendar system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UmmAlQura;

impl UmmAlQura {
    /// Table index of the start of `(year, month)`.
    fn index(year: i32, month: i32) -> Option<usize> {
        let lunation = year
            .checked_sub(1)?
            .checked_mul(MONTHS_IN_YEAR)?
            .checked_add(month)?;
        usize::try_from(lunation - UMMALQURA_LUNATION_OFFSET - 1).ok()
    }

    fn month_start(year: i32, month: i32) -> Option<i32> {
        MONTH_STARTS.get(Self::index(year, month)?).copied()
    }
}

impl CalendarSystem for UmmAlQura {
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
        Self::index(year, month)
            .and_then(|index| Some(MONTH_STARTS.get(index + 1)? - MONTH_STARTS.get(index)?))
            .unwrap_or(UMMALQURA_FALLBACK_MONTH_DAYS)
    }

    fn days_in_year(&self, year: i32) -> i32 {
        (1..=MONTHS_IN_YEAR)
            .map(|month| self.days_in_month(year, month))
            .sum()
    }

    fn leap_year(&self, year: i32) -> bool {
        self.days_in_year(year) == UMMALQURA_LEAP_YEAR_DAYS
    }

    fn supports_year(&self, year: i32) -> bool {
        (UMMALQURA_MIN_YEAR..=UMMALQURA_MAX_YEAR).contains(&year)
    }

    fn to_jd(&self, year: i32, month: i32, day: i32) -> Option<f64> {
        let start = Self::month_start(year, month)?;
        Some(f64::from(start) + f64::from(day) - 1.0 + MCJDN_OFFSET)
    }

    fn from_jd(&self, jd: f64) -> Option<Ymd> {
        let mcjdn = whole_days(jd - MCJDN_OFFSET)?;
        let count = MONTH_STARTS.partition_point(|&start| start <= mcjdn);
        let start = *MONTH_STARTS.get(count.checked_sub(1)?)?;

        let lunation = i32::try_from(count).ok()? + UMMALQURA_LUNATION_OFFSET;
        let elapsed = (lunation - 1).div_euclid(MONTHS_IN_YEAR);
        Some((elapsed + 1, lunation - MONTHS_IN_YEAR * elapsed, mcjdn - start + 1))
    }

    /// Weeks start on Sunday and belong to the year of that Sunday.
    fn week_anchor(&self, day_of_week: i32) -> i32 {
        -day_of_week
    }

    fn is_week_day(&self, day_of_week: i32) -> bool {
        day_of_week != FRIDAY
    }
}

const ARABIC_INDIC_DIGITS: [&str; 10] = ["٠", "١", "٢", "٣", "٤", "٥", "٦", "٧", "٨", "٩"];

/// Umm al-Qura localisations keyed by language code.
pub(crate) static LOCALES: &[(&str, Locale)] = &[
    ("", Locale {
        name:              "Umm al-Qura",
        epochs:            ["BH", "AH"],
        month_names:       [
            "Al-Muharram",
            "Safar",
            "Rabi' al-awwal",
            "Rabi' Al-Thani",
            "Jumada Al-Awwal",
            "Jumada Al-Thani",
            "Rajab",
            "Sha'aban",
            "Ramadan",
            "Shawwal",
            "Dhu al-Qi'dah",
            "Dhu al-Hijjah",
        ],
        month_names_short: [
            "Muh", "Saf", "Rab1", "Rab2", "Jum1", "Jum2", "Raj", "Sha'", "Ram", "Shaw", "DhuQ", "DhuH",
        ],
        day_names:         [
            "Yawm al-Ahad",
            "Yawm al-Ithnain",
            "Yawm al-Thalāthā’",
            "Yawm al-Arba‘ā’",
            "Yawm al-Khamīs",
            "Yawm al-Jum‘a",
            "Yawm al-Sabt",
        ],
        day_names_short:   ["Ahd", "Ith", "Thu", "Arb", "Khm", "Jum", "Sbt"],
        day_names_min:     ["Ah", "Ith", "Th", "Ar", "Kh", "Ju", "Sa"],
        digits:            None,
        date_format:       "yyyy/mm/dd",
        first_day:         6,
        is_rtl:            true,
    }),
    ("ar", Locale {
        name:              "أم القرى",
        epochs:            ["ق.هـ", "هـ"],
        month_names:       [
            "محرم",
            "صفر",
            "ربيع الأول",
            "ربيع الآخر",
            "جمادى الأولى",
            "جمادى الآخرة",
            "رجب",
            "شعبان",
            "رمضان",
            "شوال",
            "ذو القعدة",
            "ذو الحجة",
        ],
        month_names_short: [
            "محرم",
            "صفر",
            "ربيع الأول",
            "ربيع الآخر",
            "جمادى الأولى",
            "جمادى الآخرة",
            "رجب",
            "شعبان",
            "رمضان",
            "شوال",
            "ذو القعدة",
            "ذو الحجة",
        ],
        day_names:         ["الأحد", "الإثنين", "الثلاثاء", "الأربعاء", "الخميس", "الجمعة", "السبت"],
        day_names_short:   ["أحد", "إثنين", "ثلاثاء", "أربعاء", "خميس", "جمعة", "سبت"],
        day_names_min:     ["ح", "ن", "ث", "ر", "خ", "ج", "س"],
        digits:            Some(substitute_digits(ARABIC_INDIC_DIGITS)),
        date_format:       "yyyy/mm/dd",
        first_day:         6,
        is_rtl:            true,
    }),
];
