//! Cardinal plural rules used to pick a `<numerusform>`.
//!
//! The families and their form order follow what Qt Linguist expects when it
//! creates numerus messages for a language, so a catalog written by Linguist
//! for e.g. Croatian always carries three forms in the order below.

use super::language;

/// Plural rule family of a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralRule {
    /// No plural distinction (ja, zh, ko, vi, tr, hu, ...).
    Single,
    /// `one`, `other` (en, de, nl, sv, ...).
    English,
    /// 0 and 1 are singular (fr, pt-BR, hy, ...).
    French,
    /// 1, 21, 31, ... are singular, the rest plural (is).
    Icelandic,
    /// 1/21/31.., non-zero, zero.
    Latvian,
    /// 1, 2, other.
    Irish,
    /// 1, 0 or ending in 01-19, other.
    Romanian,
    /// 1/21/31.., 2-9/22-29.., 10-20/30...
    Lithuanian,
    /// 1/21/31.., 2-4/22-24.., other (hr, sr, bs, ru, uk, be).
    Slavic,
    /// 1, 2-4, other (cs, sk).
    Czech,
    /// 1, 2-4/22-24.., other.
    Polish,
    /// ending in 01, 02, 03-04, other.
    Slovenian,
    /// ending in 1, ending in 2, other.
    Macedonian,
    /// 1, 0 or ending in 01-10, ending in 11-19, other.
    Maltese,
    /// 1, 2, 8 or 11, other.
    Welsh,
    /// 0, 1, 2, ending in 03-10, ending in 11-99, other.
    Arabic,
}

impl PluralRule {
    /// Returns the rule for a language code such as `hr`, `hr_HR` or `pt-BR`.
    ///
    /// Unknown languages use [`PluralRule::English`].
    #[must_use]
    pub fn for_language(code: &str) -> Self {
        let normalized = language::normalize_language_code(code);
        if normalized == "pt_br" {
            return Self::French;
        }

        match language::primary_subtag(&normalized) {
            "bi" | "bo" | "dz" | "fa" | "fj" | "gn" | "hu" | "id" | "ja" | "jv" | "ko" | "ms"
            | "my" | "na" | "om" | "su" | "th" | "tr" | "tt" | "vi" | "yo" | "za" | "zh" => {
                Self::Single
            }
            "br" | "fil" | "fr" | "hy" | "ln" | "oc" | "tl" | "ti" | "wa" => Self::French,
            "is" => Self::Icelandic,
            "lv" => Self::Latvian,
            "ga" | "gd" => Self::Irish,
            "ro" | "mo" => Self::Romanian,
            "lt" => Self::Lithuanian,
            "be" | "bs" | "hr" | "ru" | "sh" | "sr" | "uk" => Self::Slavic,
            "cs" | "sk" => Self::Czech,
            "pl" => Self::Polish,
            "sl" => Self::Slovenian,
            "mk" => Self::Macedonian,
            "mt" => Self::Maltese,
            "cy" => Self::Welsh,
            "ar" => Self::Arabic,
            _ => Self::English,
        }
    }

    /// Number of `<numerusform>` entries a numerus message needs.
    #[must_use]
    pub const fn form_count(self) -> usize {
        match self {
            Self::Single => 1,
            Self::English | Self::French | Self::Icelandic => 2,
            Self::Latvian
            | Self::Irish
            | Self::Romanian
            | Self::Lithuanian
            | Self::Slavic
            | Self::Czech
            | Self::Polish
            | Self::Macedonian => 3,
            Self::Slovenian | Self::Maltese | Self::Welsh => 4,
            Self::Arabic => 6,
        }
    }

    /// Index of the form to use for count `n`. Negative counts use their
    /// absolute value.
    #[must_use]
    pub fn form_index(self, n: i64) -> usize {
        let n = n.unsigned_abs();
        let mod10 = n % 10;
        let mod100 = n % 100;

        match self {
            Self::Single => 0,
            Self::English => {
                if n == 1 {
                    0
                } else {
                    1
                }
            }
            Self::French => {
                if n <= 1 {
                    0
                } else {
                    1
                }
            }
            Self::Icelandic => {
                if mod10 == 1 && mod100 != 11 {
                    0
                } else {
                    1
                }
            }
            Self::Latvian => {
                if mod10 == 1 && mod100 != 11 {
                    0
                } else if n != 0 {
                    1
                } else {
                    2
                }
            }
            Self::Irish => match n {
                1 => 0,
                2 => 1,
                _ => 2,
            },
            Self::Romanian => {
                if n == 1 {
                    0
                } else if n == 0 || (1..=19).contains(&mod100) {
                    1
                } else {
                    2
                }
            }
            Self::Lithuanian => {
                if mod10 == 1 && mod100 != 11 {
                    0
                } else if mod10 >= 2 && (mod100 < 10 || mod100 >= 20) {
                    1
                } else {
                    2
                }
            }
            Self::Slavic => {
                if mod10 == 1 && mod100 != 11 {
                    0
                } else if (2..=4).contains(&mod10) && (mod100 < 10 || mod100 >= 20) {
                    1
                } else {
                    2
                }
            }
            Self::Czech => match n {
                1 => 0,
                2..=4 => 1,
                _ => 2,
            },
            Self::Polish => {
                if n == 1 {
                    0
                } else if (2..=4).contains(&mod10) && (mod100 < 10 || mod100 >= 20) {
                    1
                } else {
                    2
                }
            }
            Self::Slovenian => match mod100 {
                1 => 0,
                2 => 1,
                3 | 4 => 2,
                _ => 3,
            },
            Self::Macedonian => match mod10 {
                1 => 0,
                2 => 1,
                _ => 2,
            },
            Self::Maltese => {
                if n == 1 {
                    0
                } else if n == 0 || (1..=10).contains(&mod100) {
                    1
                } else if (11..=19).contains(&mod100) {
                    2
                } else {
                    3
                }
            }
            Self::Welsh => match n {
                1 => 0,
                2 => 1,
                8 | 11 => 2,
                _ => 3,
            },
            Self::Arabic => match n {
                0 => 0,
                1 => 1,
                2 => 2,
                _ if (3..=10).contains(&mod100) => 3,
                _ if mod100 >= 11 => 4,
                _ => 5,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("hr", PluralRule::Slavic)]
    #[case("hr_HR", PluralRule::Slavic)]
    #[case("sr-Latn-RS", PluralRule::Slavic)]
    #[case("en_US", PluralRule::English)]
    #[case("de", PluralRule::English)]
    #[case("fr_FR", PluralRule::French)]
    #[case("pt_BR", PluralRule::French)]
    #[case("pt_PT", PluralRule::English)]
    #[case("ja", PluralRule::Single)]
    #[case("zh_CN", PluralRule::Single)]
    #[case("cs", PluralRule::Czech)]
    #[case("pl_PL", PluralRule::Polish)]
    #[case("sl", PluralRule::Slovenian)]
    #[case("ar", PluralRule::Arabic)]
    #[case("xx", PluralRule::English)]
    #[case("", PluralRule::English)]
    fn test_for_language(#[case] code: &str, #[case] expected: PluralRule) {
        assert_eq!(PluralRule::for_language(code), expected);
    }

    #[rstest]
    #[case(PluralRule::Single, 1)]
    #[case(PluralRule::English, 2)]
    #[case(PluralRule::Slavic, 3)]
    #[case(PluralRule::Slovenian, 4)]
    #[case(PluralRule::Arabic, 6)]
    fn test_form_count(#[case] rule: PluralRule, #[case] expected: usize) {
        assert_eq!(rule.form_count(), expected);
    }

    #[rstest]
    #[case(1, 0)]
    #[case(21, 0)]
    #[case(101, 0)]
    #[case(2, 1)]
    #[case(3, 1)]
    #[case(4, 1)]
    #[case(22, 1)]
    #[case(0, 2)]
    #[case(5, 2)]
    #[case(11, 2)]
    #[case(12, 2)]
    #[case(14, 2)]
    #[case(111, 2)]
    #[case(-1, 0)]
    #[case(-3, 1)]
    fn test_croatian_form_index(#[case] n: i64, #[case] expected: usize) {
        assert_eq!(PluralRule::for_language("hr").form_index(n), expected);
    }

    #[rstest]
    #[case(PluralRule::English, 0, 1)]
    #[case(PluralRule::English, 1, 0)]
    #[case(PluralRule::French, 0, 0)]
    #[case(PluralRule::French, 2, 1)]
    #[case(PluralRule::Czech, 3, 1)]
    #[case(PluralRule::Czech, 22, 2)]
    #[case(PluralRule::Polish, 1, 0)]
    #[case(PluralRule::Polish, 21, 2)]
    #[case(PluralRule::Polish, 24, 1)]
    #[case(PluralRule::Slovenian, 102, 1)]
    #[case(PluralRule::Slovenian, 203, 2)]
    #[case(PluralRule::Latvian, 0, 2)]
    #[case(PluralRule::Latvian, 7, 1)]
    #[case(PluralRule::Romanian, 0, 1)]
    #[case(PluralRule::Romanian, 119, 1)]
    #[case(PluralRule::Romanian, 20, 2)]
    #[case(PluralRule::Arabic, 2, 2)]
    #[case(PluralRule::Arabic, 105, 3)]
    #[case(PluralRule::Arabic, 111, 4)]
    #[case(PluralRule::Arabic, 100, 5)]
    #[case(PluralRule::Welsh, 8, 2)]
    #[case(PluralRule::Single, 42, 0)]
    fn test_form_index(#[case] rule: PluralRule, #[case] n: i64, #[case] expected: usize) {
        assert_eq!(rule.form_index(n), expected);
    }

    #[rstest]
    fn test_form_index_stays_within_form_count() {
        let rules = [
            PluralRule::Single,
            PluralRule::English,
            PluralRule::French,
            PluralRule::Icelandic,
            PluralRule::Latvian,
            PluralRule::Irish,
            PluralRule::Romanian,
            PluralRule::Lithuanian,
            PluralRule::Slavic,
            PluralRule::Czech,
            PluralRule::Polish,
            PluralRule::Slovenian,
            PluralRule::Macedonian,
            PluralRule::Maltese,
            PluralRule::Welsh,
            PluralRule::Arabic,
        ];
        for rule in rules {
            for n in 0..1000 {
                assert!(rule.form_index(n) < rule.form_count(), "{rule:?} n={n}");
            }
        }
    }
}
