//! Localised numerals.
//!
//! A [`Digits`] value turns a number into the digit string of a locale. Two
//! styles exist: positional systems that swap each ASCII digit for a native
//! glyph, and additive (Chinese-style) systems that spell each non-zero digit
//! followed by its power-of-ten marker.

/// Number of powers of ten an additive numeral system can spell out
pub const ADDITIVE_POWERS: usize = 4;

/// A digit substitution rule for one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Digits {
    /// Replace every ASCII digit `n` with `digits[n]`.
    Positional([&'static str; 10]),
    /// Spell each non-zero digit followed by `powers[position]`.
    Additive {
        digits: [&'static str; 10],
        powers: [&'static str; ADDITIVE_POWERS],
    },
}

/// Builds a positional substitution, e.g. Arabic-Indic digits.
pub const fn substitute_digits(digits: [&'static str; 10]) -> Digits {
    Digits::Positional(digits)
}

/// Builds an additive substitution, e.g. Chinese numerals.
///
/// `powers` holds the markers for 1, 10, 100 and 1000.
pub const fn substitute_chinese_digits(digits: [&'static str; 10], powers: [&'static str; ADDITIVE_POWERS]) -> Digits {
    Digits::Additive { digits, powers }
}

impl Digits {
    /// Renders `value` in this numeral system.
    ///
    /// Additive systems only have markers up to the thousands, so values of
    /// ten thousand or more are rendered positionally with the same glyphs.
    pub fn localize(&self, value: u32) -> String {
        match self {
            Self::Positional(digits) => positional(digits, value),
            Self::Additive { digits, powers } => {
                if value >= 10u32.pow(ADDITIVE_POWERS as u32) {
                    return positional(digits, value);
                }
                additive(digits, powers, value)
            },
        }
    }
}

fn positional(digits: &[&'static str; 10], value: u32) -> String {
    value
        .to_string()
        .chars()
        .map(|c| c.to_digit(10).map_or("", |d| digits[d as usize]))
        .collect()
}

fn additive(digits: &[&'static str; 10], powers: &[&'static str; ADDITIVE_POWERS], value: u32) -> String {
    let mut parts = Vec::with_capacity(ADDITIVE_POWERS);
    let mut rest = value;
    let mut power = 0;
    while rest > 0 {
        let units = (rest % 10) as usize;
        if units != 0 {
            parts.push(format!("{}{}", digits[units], powers[power]));
        }
        power += 1;
        rest /= 10;
    }

    let mut local: String = parts.into_iter().rev().collect();
    // "one ten" is written as plain "ten"
    let one_ten = format!("{}{}", digits[1], powers[1]);
    if local.starts_with(&one_ten) {
        local.replace_range(..digits[1].len(), "");
    }

    if local.is_empty() {
        digits[0].to_owned()
    } else {
        local
    }
}
