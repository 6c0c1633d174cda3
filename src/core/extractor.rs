//! Prayer-time extraction from parsed documents.
//!
//! A dated row is a date token (day of month, optionally with a month
//! name) followed by the six daily times in published order: Fajr,
//! Sunrise, Dhuhr, Asr, Maghrib, Isha. Documents printing both Asr
//! conventions carry a seventh time.
//!
//! Tables are tried first, starting after their `DATE`/`FAJR` + `MAGHRIB`
//! header row. Documents without a recognisable header fall back to
//! scanning every text line.

use crate::domain::model::{AsrTime, DailyTimes, ParsedDocument, PdfLink, PrayerTimeRecord};
use crate::utils::date::{checked_date_key, Month};
use crate::utils::error::{EtlError, Result};
use crate::utils::text::{find_times, words};

/// How many lines of a document are searched for its month.
const MONTH_HEADER_LINES: usize = 10;

/// Which month(s) rows of a document belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthScope {
    /// A monthly timetable. Day-only rows belong to this month and rows
    /// naming another month are dropped.
    Fixed(Month),
    /// A yearly calendar. Rows name their month or sit under a month
    /// heading; `only` drops every other month.
    Calendar { only: Option<Month> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsrLayout {
    /// One Asr column, used for both conventions.
    Single,
    /// Separate Shafi and Hanafi columns.
    Dual { hanafi_first: bool },
}

impl AsrLayout {
    fn required_times(self) -> usize {
        match self {
            AsrLayout::Single => 6,
            AsrLayout::Dual { .. } => 7,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TimeExtractor {
    scope: MonthScope,
}

impl TimeExtractor {
    pub fn new(scope: MonthScope) -> Self {
        Self { scope }
    }

    /// Date-key to record for every valid row of `doc`.
    ///
    /// Invalid rows are skipped; a later row for the same date replaces an
    /// earlier one. Fails when nothing valid is found.
    pub fn extract(&self, document: &str, doc: &ParsedDocument) -> Result<DailyTimes> {
        let layout = detect_layout(doc);
        tracing::debug!("{}: Asr layout {:?}", document, layout);

        let mut times = self.extract_table(doc, layout);
        if times.is_empty() {
            tracing::debug!("{}: no table rows matched, scanning text lines", document);
            times = self.extract_lines(doc, layout);
        }

        if times.is_empty() {
            return Err(EtlError::ExtractionError {
                document: document.to_string(),
                message: format!(
                    "no row with a valid date and {} times",
                    layout.required_times()
                ),
            });
        }

        tracing::debug!("{}: extracted {} day(s)", document, times.len());
        Ok(times)
    }

    fn extract_table(&self, doc: &ParsedDocument, layout: AsrLayout) -> DailyTimes {
        let mut out = DailyTimes::new();
        let Some(header) = doc.rows.iter().position(|row| is_header_row(row)) else {
            return out;
        };

        for row in &doc.rows[header + 1..] {
            let Some((date_cell, rest)) = row.split_first() else {
                continue;
            };
            let times: Vec<String> = find_times(&rest.join("  "))
                .into_iter()
                .map(|t| t.normalized)
                .collect();
            self.push_row(&mut out, date_cell, &times, layout, None);
        }
        out
    }

    fn extract_lines(&self, doc: &ParsedDocument, layout: AsrLayout) -> DailyTimes {
        let mut out = DailyTimes::new();
        let mut section: Option<Month> = None;

        for line in &doc.lines {
            let tokens = find_times(line);
            let Some(first) = tokens.first() else {
                if let Some(month) = Month::from_heading(line) {
                    section = Some(month);
                }
                continue;
            };

            let prefix = &line[..first.start];
            let times: Vec<String> = tokens.into_iter().map(|t| t.normalized).collect();
            self.push_row(&mut out, prefix, &times, layout, section);
        }
        out
    }

    fn push_row(
        &self,
        out: &mut DailyTimes,
        date_text: &str,
        times: &[String],
        layout: AsrLayout,
        section: Option<Month>,
    ) {
        let Some(key) = self.date_key(date_text, section) else {
            return;
        };
        let Some(record) = build_record(times, layout) else {
            tracing::warn!(
                "Skipping {}: {} of {} times resolved",
                key,
                times.len(),
                layout.required_times()
            );
            return;
        };
        if out.insert(key.clone(), record).is_some() {
            tracing::debug!("Duplicate entry for {}, keeping the later row", key);
        }
    }

    fn date_key(&self, date_text: &str, section: Option<Month>) -> Option<String> {
        let (day, named) = parse_date_token(date_text)?;
        let month = match self.scope {
            MonthScope::Fixed(month) => {
                if named.is_some_and(|m| m != month) {
                    return None;
                }
                month
            }
            MonthScope::Calendar { only } => {
                let month = named.or(section)?;
                if only.is_some_and(|m| m != month) {
                    return None;
                }
                month
            }
        };
        checked_date_key(month, day)
    }
}

/// Day of month and, when present, the month named next to it.
///
/// `"1"`, `"01 Wed"`, `"1-Jan"`, `"Jan-01"` and `"1st January"` all
/// parse. The first one- or two-digit number is the day.
pub fn parse_date_token(text: &str) -> Option<(u32, Option<Month>)> {
    let words = words(text);
    let day = words
        .iter()
        .find(|w| w.len() <= 2 && w.chars().all(|c| c.is_ascii_digit()))?
        .parse()
        .ok()?;
    let month = words.iter().find_map(|w| Month::from_word(w));
    Some((day, month))
}

fn is_header_row(row: &[String]) -> bool {
    if row.len() < 6 {
        return false;
    }
    let text = row.join(" ").to_ascii_uppercase();
    (text.contains("FAJR") || text.contains("DATE")) && text.contains("MAGHRIB")
}

/// Dual when a heading names both conventions, or when any dated line
/// carries seven times.
pub fn detect_layout(doc: &ParsedDocument) -> AsrLayout {
    for line in &doc.lines {
        let upper = line.to_ascii_uppercase();
        if let (Some(shafi), Some(hanafi)) = (upper.find("SHAFI"), upper.find("HANAFI")) {
            return AsrLayout::Dual {
                hanafi_first: hanafi < shafi,
            };
        }
    }

    let seven_columns = doc.lines.iter().any(|line| {
        let tokens = find_times(line);
        tokens.len() >= 7
            && tokens
                .first()
                .is_some_and(|first| parse_date_token(&line[..first.start]).is_some())
    });
    if seven_columns {
        AsrLayout::Dual {
            hanafi_first: false,
        }
    } else {
        AsrLayout::Single
    }
}

fn build_record(times: &[String], layout: AsrLayout) -> Option<PrayerTimeRecord> {
    if times.len() < layout.required_times() {
        return None;
    }
    let (asr, rest) = match layout {
        AsrLayout::Single => (
            AsrTime {
                shafi: times[3].clone(),
                hanafi: times[3].clone(),
            },
            &times[4..],
        ),
        AsrLayout::Dual { hanafi_first } => {
            let (shafi, hanafi) = if hanafi_first {
                (&times[4], &times[3])
            } else {
                (&times[3], &times[4])
            };
            (
                AsrTime {
                    shafi: shafi.clone(),
                    hanafi: hanafi.clone(),
                },
                &times[5..],
            )
        }
    };

    Some(PrayerTimeRecord {
        fajr: times[0].clone(),
        sunrise: times[1].clone(),
        dhuhr: times[2].clone(),
        asr,
        maghrib: rest[0].clone(),
        isha: rest[1].clone(),
    })
}

/// Month of a monthly timetable: from its link, else from the first lines
/// of the document.
pub fn detect_month(link: &PdfLink, doc: &ParsedDocument) -> Option<Month> {
    Month::find_in_title(&link.label)
        .or_else(|| Month::find_in_text(&link.url))
        .or_else(|| {
            doc.lines
                .iter()
                .take(MONTH_HEADER_LINES)
                .find_map(|line| Month::find_in_title(line))
        })
}
