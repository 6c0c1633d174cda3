//! Zone label to city resolution.
//!
//! Labels are compared on their [`normalize_label`] form, so case,
//! punctuation and spacing differences between documents do not matter.

use crate::domain::model::City;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::text::normalize_label;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct ZoneMapper {
    cities: Vec<City>,
    /// normalized label -> index into `cities`
    labels: BTreeMap<String, usize>,
}

impl ZoneMapper {
    pub fn new(cities: &[City], zones: &BTreeMap<String, String>) -> Result<Self> {
        let mut labels = BTreeMap::new();
        for (label, city_id) in zones {
            let idx = cities
                .iter()
                .position(|c| &c.id == city_id)
                .ok_or_else(|| EtlError::ConfigError {
                    message: format!("zone '{}' maps to unknown city '{}'", label, city_id),
                })?;
            labels.insert(normalize_label(label), idx);
        }

        Ok(Self {
            cities: cities.to_vec(),
            labels,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(config.cities(), config.zones())
    }

    /// City a zone label belongs to.
    pub fn resolve(&self, label: &str) -> Result<&City> {
        self.labels
            .get(&normalize_label(label))
            .map(|&idx| &self.cities[idx])
            .ok_or_else(|| EtlError::UnknownZoneError {
                label: label.trim().to_string(),
            })
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    /// Configured zone labels named in `text`, in order of first
    /// appearance. Labels are matched as whole words.
    pub fn detect(&self, text: &str) -> Vec<String> {
        let haystack = format!(" {} ", normalize_label(text));
        let mut found: Vec<(usize, &String)> = self
            .labels
            .keys()
            .filter_map(|label| {
                haystack
                    .find(&format!(" {} ", label))
                    .map(|pos| (pos, label))
            })
            .collect();
        found.sort();
        found.into_iter().map(|(_, label)| label.clone()).collect()
    }
}
