use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Failed to fetch index page {url}: {message}")]
    FetchError { url: String, message: String },

    #[error("No {mode} PDF link found{}", month_suffix(.month))]
    NotFoundError { mode: String, month: Option<String> },

    #[error("Failed to download PDF {url}: {message}")]
    DownloadError { url: String, message: String },

    #[error("Failed to parse PDF {document}: {message}")]
    ParseError { document: String, message: String },

    #[error("No prayer times extracted from {document}: {message}")]
    ExtractionError { document: String, message: String },

    #[error("Unknown zone: '{label}'")]
    UnknownZoneError { label: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, EtlError>;

fn month_suffix(month: &Option<String>) -> String {
    month
        .as_ref()
        .map(|m| format!(" for {}", m))
        .unwrap_or_default()
}

/// Pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Configuration,
    Scrape,
    Download,
    Parse,
    Extract,
    ZoneMapping,
    Output,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Configuration => "configuration",
            Stage::Scrape => "web scraper",
            Stage::Download => "PDF download",
            Stage::Parse => "PDF parsing",
            Stage::Extract => "time extraction",
            Stage::ZoneMapping => "zone mapping",
            Stage::Output => "dataset output",
        };
        f.write_str(name)
    }
}

impl EtlError {
    pub fn stage(&self) -> Stage {
        match self {
            EtlError::FetchError { .. } | EtlError::NotFoundError { .. } => Stage::Scrape,
            EtlError::DownloadError { .. } => Stage::Download,
            EtlError::ParseError { .. } => Stage::Parse,
            EtlError::ExtractionError { .. } => Stage::Extract,
            EtlError::UnknownZoneError { .. } => Stage::ZoneMapping,
            EtlError::IoError(_) | EtlError::SerializationError(_) => Stage::Output,
            EtlError::ConfigError { .. } | EtlError::InvalidConfigValueError { .. } => {
                Stage::Configuration
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        format!("{} failed: {}", self.stage(), self)
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::FetchError { .. } => "Check network access and source.index_url",
            EtlError::NotFoundError { .. } => {
                "The month may not be published yet; try another --month or --mode"
            }
            EtlError::DownloadError { .. } => "The PDF link may be broken; rerun later",
            EtlError::ParseError { .. } => "The published file is not a readable PDF",
            EtlError::ExtractionError { .. } => {
                "The document layout changed; inspect the PDF text with --verbose"
            }
            EtlError::UnknownZoneError { .. } => "Add the label to the [zones] table",
            EtlError::IoError(_) => "Check permissions on the output and data directories",
            EtlError::SerializationError(_) => "Report this as a bug",
            EtlError::ConfigError { .. } | EtlError::InvalidConfigValueError { .. } => {
                "Fix the configuration or command line arguments"
            }
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.stage() {
            Stage::Configuration => 2,
            Stage::Scrape | Stage::Download => 3,
            Stage::Parse | Stage::Extract | Stage::ZoneMapping => 4,
            Stage::Output => 5,
        }
    }
}
