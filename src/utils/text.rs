use regex::Regex;
use std::sync::LazyLock;

/// `H:MM`/`H.MM` followed by AM/PM; the trailing `M` and dots are optional
/// as some published PDFs print `5.15a` or `5:15 p.m.`. A match running
/// into a letter (`7.30 after`) is rejected in [`time_tokens`].
static TIME_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2})\s*[:.]\s*(\d{2})\s*([ap])(?:\.?\s*m)?\.?").expect("valid regex")
});

/// Collapse every whitespace run into a single space and trim.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip characters PDF text extraction leaves behind (NBSP, zero width
/// spaces, BOM) and normalize whitespace.
pub fn clean_text(s: &str) -> String {
    let replaced: String = s
        .chars()
        .map(|c| match c {
            '\u{00a0}' | '\u{2007}' | '\u{202f}' => ' ',
            _ => c,
        })
        .filter(|c| !matches!(c, '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{feff}'))
        .collect();
    normalize_ws(&replaced)
}

/// Lookup key for labels: lowercase, punctuation folded to spaces.
///
/// `"Nuwara-Eliya"`, `" nuwara  eliya "` and `"NUWARA ELIYA."` all become
/// `"nuwara eliya"`.
pub fn normalize_label(s: &str) -> String {
    let folded: String = s
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();
    normalize_ws(&folded)
}

/// Words of `s` with their original case, split on punctuation and on
/// letter/digit boundaries (`"Jan2025"` gives `["Jan", "2025"]`).
pub fn cased_words(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for c in s.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            continue;
        }
        if let Some(prev) = current.chars().last() {
            if prev.is_ascii_digit() != c.is_ascii_digit() {
                out.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Lowercase [`cased_words`].
pub fn words(s: &str) -> Vec<String> {
    cased_words(s)
        .into_iter()
        .map(|w| w.to_ascii_lowercase())
        .collect()
}

/// A time token found in a line of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeToken {
    pub normalized: String,
    pub start: usize,
    pub end: usize,
}

/// Normalize a single time string to `H:MM AM/PM`.
///
/// Returns `None` when the input is not a 12-hour time with a meridiem.
pub fn normalize_time(s: &str) -> Option<String> {
    time_tokens(s.trim()).next().map(|t| t.normalized)
}

/// All valid time tokens in `line`, in order of appearance.
pub fn find_times(line: &str) -> Vec<TimeToken> {
    time_tokens(line).collect()
}

fn time_tokens(line: &str) -> impl Iterator<Item = TimeToken> + '_ {
    TIME_TOKEN.captures_iter(line).filter_map(move |caps| {
        let whole = caps.get(0)?;
        if line[whole.end()..].starts_with(|c: char| c.is_alphabetic()) {
            return None;
        }
        Some(TimeToken {
            normalized: to_normalized(&caps)?,
            start: whole.start(),
            end: whole.end(),
        })
    })
}

fn to_normalized(caps: &regex::Captures<'_>) -> Option<String> {
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    if !(1..=12).contains(&hour) || minute > 59 {
        return None;
    }
    let meridiem = if caps[3].eq_ignore_ascii_case("a") {
        "AM"
    } else {
        "PM"
    };
    Some(format!("{}:{:02} {}", hour, minute, meridiem))
}
