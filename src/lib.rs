pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{LocalStorage, ReqwestFetcher};
#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::Settings;

pub use core::{
    etl::{EtlEngine, RunSummary},
    pipeline::PrayerPipeline,
};
pub use domain::model::{Dataset, Mode, RunRequest};
pub use utils::error::{EtlError, Result};
