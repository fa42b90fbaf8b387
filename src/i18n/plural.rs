use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::i18n::locale::primary_subtag;

/// CLDR plural category names used as the last key segment of plural entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl PluralCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PluralCategory::Zero => "zero",
            PluralCategory::One => "one",
            PluralCategory::Two => "two",
            PluralCategory::Few => "few",
            PluralCategory::Many => "many",
            PluralCategory::Other => "other",
        }
    }
}

impl Display for PluralCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Picks the plural category for `count` in `locale`.
///
/// A count of zero always maps to [`PluralCategory::Zero`], ahead of every
/// locale family rule. This shadows the French rule's "0 is singular" branch.
pub fn plural_category(count: i64, locale: &str) -> PluralCategory {
    if count == 0 {
        return PluralCategory::Zero;
    }

    let mod10 = count.rem_euclid(10);
    let mod100 = count.rem_euclid(100);

    match primary_subtag(locale).as_str() {
        "fr" => {
            if count == 0 || count == 1 {
                PluralCategory::One
            } else {
                PluralCategory::Other
            }
        }
        "ru" => {
            if mod10 == 1 && mod100 != 11 {
                PluralCategory::One
            } else if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
                PluralCategory::Few
            } else {
                PluralCategory::Many
            }
        }
        "ar" => match count {
            1 => PluralCategory::One,
            2 => PluralCategory::Two,
            _ if (3..=10).contains(&mod100) => PluralCategory::Few,
            _ if mod100 >= 11 => PluralCategory::Many,
            _ => PluralCategory::Other,
        },
        _ => {
            if count == 1 {
                PluralCategory::One
            } else {
                PluralCategory::Other
            }
        }
    }
}
