//! Region normalization.
//!
//! Chart exports spell the same country several ways ("United States", "US",
//! "us"). Every view classifies records through `normalize` so a record lands in
//! the same country regardless of which view is computed.

use crate::domain::Country;

/// Accepted spellings per country: full name, upper code, lower code.
const ALIASES: [(&str, Country); 9] = [
    ("United States", Country::UnitedStates),
    ("US", Country::UnitedStates),
    ("us", Country::UnitedStates),
    ("Mexico", Country::Mexico),
    ("MX", Country::Mexico),
    ("mx", Country::Mexico),
    ("Canada", Country::Canada),
    ("CA", Country::Canada),
    ("ca", Country::Canada),
];

/// Map a raw region string to its canonical country.
///
/// Exact, case-sensitive match; `None` means unrecognized.
pub fn normalize(raw: &str) -> Option<Country> {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == raw)
        .map(|&(_, country)| country)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_nine_aliases_map_to_their_country() {
        for (alias, country) in ALIASES {
            assert_eq!(normalize(alias), Some(country), "alias {alias}");
        }
        for country in Country::ALL {
            assert_eq!(normalize(country.display_name()), Some(country));
            assert_eq!(normalize(country.code()), Some(country));
            assert_eq!(normalize(&country.code().to_ascii_lowercase()), Some(country));
        }
    }

    #[test]
    fn near_misses_are_unrecognized() {
        for raw in ["", "Us", "uS", "usa", "USA", "united states", " US", "US ", "Global", "mexico", "CAN"] {
            assert_eq!(normalize(raw), None, "raw {raw:?}");
        }
    }
}
