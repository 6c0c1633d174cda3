use crate::core::zones::ZoneMapper;
use crate::domain::model::{CityTimes, Dataset, ZoneTimes, DATASET_VERSION};
use crate::utils::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;

pub struct DatasetAssembler<'a> {
    mapper: &'a ZoneMapper,
    source: &'a str,
}

impl<'a> DatasetAssembler<'a> {
    pub fn new(mapper: &'a ZoneMapper, source: &'a str) -> Self {
        Self { mapper, source }
    }

    pub fn assemble(&self, zones: &[ZoneTimes]) -> Result<Dataset> {
        self.assemble_at(zones, Utc::now())
    }

    /// Merges zone times per city. Zones are applied in order, so when two
    /// zones of one city disagree on a date the later zone wins.
    pub fn assemble_at(&self, zones: &[ZoneTimes], now: DateTime<Utc>) -> Result<Dataset> {
        let mut prayer_times: BTreeMap<String, CityTimes> = BTreeMap::new();

        for zone in zones {
            let city = self.mapper.resolve(&zone.zone)?;
            let entry = prayer_times
                .entry(city.id.clone())
                .or_insert_with(|| CityTimes {
                    timezone: city.timezone.clone(),
                    dates: BTreeMap::new(),
                });

            for (date, record) in &zone.times {
                if let Some(previous) = entry.dates.insert(date.clone(), record.clone()) {
                    if &previous != record {
                        tracing::warn!(
                            "{} {}: zone '{}' overrides times from an earlier zone",
                            city.id,
                            date,
                            zone.zone
                        );
                    }
                }
            }
        }

        let cities = self
            .mapper
            .cities()
            .iter()
            .filter(|c| prayer_times.contains_key(&c.id))
            .cloned()
            .collect();

        Ok(Dataset {
            version: DATASET_VERSION.to_string(),
            last_updated: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            source: self.source.to_string(),
            cities,
            prayer_times,
        })
    }
}
