use crate::utils::error::{EtlError, Result};
use crate::utils::text::{cased_words, words};
use std::fmt;
use std::str::FromStr;

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// A calendar month, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month(u32);

impl Month {
    pub fn new(number: u32) -> Result<Self> {
        if (1..=12).contains(&number) {
            Ok(Self(number))
        } else {
            Err(EtlError::InvalidConfigValueError {
                field: "month".to_string(),
                value: number.to_string(),
                reason: "Month number must be between 1 and 12".to_string(),
            })
        }
    }

    pub fn number(self) -> u32 {
        self.0
    }

    /// Lowercase full name, e.g. `"january"`.
    pub fn name(self) -> &'static str {
        MONTH_NAMES[(self.0 - 1) as usize]
    }

    /// Lowercase three letter abbreviation, e.g. `"jan"`.
    pub fn abbreviation(self) -> &'static str {
        &self.name()[..3]
    }

    /// Days in the month, year-agnostic: February always allows the 29th.
    pub fn max_days(self) -> u32 {
        match self.0 {
            2 => 29,
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    /// Matches a single word against full names, abbreviations and "sept".
    pub fn from_word(word: &str) -> Option<Self> {
        let word = word.trim().to_ascii_lowercase();
        if word == "sept" {
            return Some(Self(9));
        }
        MONTH_NAMES
            .iter()
            .position(|name| *name == word || (word.len() == 3 && name.starts_with(&word)))
            .map(|idx| Self(idx as u32 + 1))
    }

    /// First month named anywhere in `text`, matching whole words only.
    /// Meant for slugs and file names, where no prose can appear.
    pub fn find_in_text(text: &str) -> Option<Self> {
        words(text).iter().find_map(|w| Self::from_word(w))
    }

    /// First month named the way titles name it: next to a four digit
    /// year, written in capitals, or as a capitalized full name other than
    /// "May". A lowercase "may" or "mar" inside a sentence is not a month.
    pub fn find_in_title(text: &str) -> Option<Self> {
        let words = cased_words(text);
        words.iter().enumerate().find_map(|(i, word)| {
            let month = Self::from_word(word)?;
            let near_year = i
                .checked_sub(1)
                .and_then(|prev| words.get(prev))
                .into_iter()
                .chain(words.get(i + 1))
                .any(|w| is_year(w));
            let capitals = word.chars().all(|c| c.is_ascii_uppercase());
            let titled = word.starts_with(|c: char| c.is_ascii_uppercase())
                && word.eq_ignore_ascii_case(month.name())
                && month.number() != 5;
            (near_year || capitals || titled).then_some(month)
        })
    }

    /// Month a heading line stands for. The whole line must be a month
    /// name, optionally with a year (`"JANUARY"`, `"March 2025"`).
    pub fn from_heading(line: &str) -> Option<Self> {
        match words(line).as_slice() {
            [word] => Self::from_word(word),
            [word, year] if is_year(year) => Self::from_word(word),
            [year, word] if is_year(year) => Self::from_word(word),
            _ => None,
        }
    }

    /// Whether `text` names this month as a whole word.
    pub fn is_named_in(self, text: &str) -> bool {
        words(text)
            .iter()
            .any(|word| Self::from_word(word) == Some(self))
    }
}

impl FromStr for Month {
    type Err = EtlError;

    /// Accepts `january`, `jan` or `1`/`01`.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            let number: u32 = trimmed
                .parse()
                .map_err(|_| EtlError::InvalidConfigValueError {
                    field: "month".to_string(),
                    value: s.to_string(),
                    reason: "Month number out of range".to_string(),
                })?;
            return Month::new(number);
        }

        Month::from_word(trimmed).ok_or_else(|| EtlError::InvalidConfigValueError {
            field: "month".to_string(),
            value: s.to_string(),
            reason: "Expected a month name, abbreviation or number 1-12".to_string(),
        })
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        let mut chars = name.chars();
        if let Some(first) = chars.next() {
            write!(f, "{}{}", first.to_ascii_uppercase(), chars.as_str())?;
        }
        Ok(())
    }
}

fn is_year(word: &str) -> bool {
    word.len() == 4 && word.chars().all(|c| c.is_ascii_digit())
}

/// Year-agnostic `MM-DD` key.
pub fn date_key(month: Month, day: u32) -> String {
    format!("{:02}-{:02}", month.number(), day)
}

/// Validates `day` against the month and builds its date-key.
pub fn checked_date_key(month: Month, day: u32) -> Option<String> {
    (1..=month.max_days())
        .contains(&day)
        .then(|| date_key(month, day))
}
