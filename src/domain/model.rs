use crate::utils::date::Month;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DATASET_VERSION: &str = "1.0";

/// Which published document family a run processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Monthly prayer-time tables, one document per zone and month.
    Prayer,
    /// Yearly calendars whose rows carry their own month.
    Calendar,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Prayer => f.write_str("prayer"),
            Mode::Calendar => f.write_str("calendar"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prayer" => Ok(Mode::Prayer),
            "calendar" => Ok(Mode::Calendar),
            other => Err(format!("unknown mode '{}'", other)),
        }
    }
}

/// What a single run was asked to do, already validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunRequest {
    pub mode: Mode,
    pub month: Option<Month>,
}

pub const DEFAULT_COUNTRY: &str = "Sri Lanka";
pub const DEFAULT_TIMEZONE: &str = "Asia/Colombo";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: String,
    pub name: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsrTime {
    pub shafi: String,
    pub hanafi: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerTimeRecord {
    pub fajr: String,
    pub sunrise: String,
    pub dhuhr: String,
    pub asr: AsrTime,
    pub maghrib: String,
    pub isha: String,
}

/// Date-key (`MM-DD`) to record. Keys sort chronologically.
pub type DailyTimes = BTreeMap<String, PrayerTimeRecord>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityTimes {
    pub timezone: String,
    pub dates: DailyTimes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub version: String,
    pub last_updated: String,
    pub source: String,
    pub cities: Vec<City>,
    pub prayer_times: BTreeMap<String, CityTimes>,
}

impl Dataset {
    pub fn record_count(&self) -> usize {
        self.prayer_times.values().map(|c| c.dates.len()).sum()
    }
}

/// An anchor on the index page pointing at a PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfLink {
    pub url: String,
    pub label: String,
}

/// A PDF sitting in the run's temporary directory.
#[derive(Debug, Clone)]
pub struct DownloadedPdf {
    pub link: PdfLink,
    pub path: PathBuf,
    pub size: usize,
}

/// Structural view of a document: its text lines and whitespace-aligned
/// table rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    pub lines: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ParsedDocument {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A parsed document plus where it came from.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub link: PdfLink,
    pub parsed: ParsedDocument,
}

/// Prayer times one zone contributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneTimes {
    pub zone: String,
    pub times: DailyTimes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str() {
        assert_eq!("prayer".parse::<Mode>().unwrap(), Mode::Prayer);
        assert_eq!("Calendar".parse::<Mode>().unwrap(), Mode::Calendar);
        assert!("weekly".parse::<Mode>().is_err());
        assert_eq!(Mode::Calendar.to_string(), "calendar");
    }

    #[test]
    fn test_record_serializes_asr_pair() {
        let record = PrayerTimeRecord {
            fajr: "4:50 AM".to_string(),
            sunrise: "6:10 AM".to_string(),
            dhuhr: "12:10 PM".to_string(),
            asr: AsrTime {
                shafi: "3:30 PM".to_string(),
                hanafi: "4:25 PM".to_string(),
            },
            maghrib: "6:12 PM".to_string(),
            isha: "7:25 PM".to_string(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["asr"]["shafi"], "3:30 PM");
        assert_eq!(json["asr"]["hanafi"], "4:25 PM");
        assert_eq!(json["isha"], "7:25 PM");
    }
}
