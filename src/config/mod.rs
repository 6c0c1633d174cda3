pub mod toml_config;

pub use toml_config::Settings;

#[cfg(feature = "cli")]
use crate::domain::model::{Mode, RunRequest};
#[cfg(feature = "cli")]
use crate::utils::date::Month;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "lk-prayer-etl")]
#[command(about = "Builds a JSON prayer-time dataset from published Sri Lankan PDFs")]
pub struct CliConfig {
    /// Document family to process
    #[arg(long, value_enum, default_value_t = Mode::Prayer)]
    pub mode: Mode,

    /// Restrict to one month: name, abbreviation or number (january, jan, 1)
    #[arg(long)]
    pub month: Option<String>,

    /// TOML configuration file; the built-in configuration is used when omitted
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 解析並驗證月份，任何網路請求之前執行
    pub fn run_request(&self) -> Result<RunRequest> {
        let month = self
            .month
            .as_deref()
            .map(str::parse::<Month>)
            .transpose()?;
        Ok(RunRequest {
            mode: self.mode,
            month,
        })
    }

    pub fn load_settings(&self) -> Result<Settings> {
        let settings = match &self.config {
            Some(path) => Settings::from_file(path)?,
            None => Settings::builtin()?,
        };
        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        self.run_request().map(|_| ())
    }
}
