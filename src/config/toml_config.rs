use crate::domain::model::{City, Mode};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::text::normalize_label;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

const BUILTIN_CONFIG: &str = include_str!("../../config/default.toml");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub source: SourceConfig,
    pub paths: PathsConfig,
    pub cities: Vec<City>,
    /// Zone label -> city id.
    pub zones: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub index_url: String,
    pub label: String,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub data_dir: String,
    pub output_dir: String,
    pub prayer_file: String,
    pub calendar_file: String,
}

impl Settings {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 內建預設配置
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_CONFIG)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ACJU_INDEX_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::index_url("source.index_url", &self.source.index_url)?;
        validation::required("source.label", &self.source.label)?;

        validation::directory("paths.data_dir", &self.paths.data_dir)?;
        validation::directory("paths.output_dir", &self.paths.output_dir)?;
        validation::json_file_name("paths.prayer_file", &self.paths.prayer_file)?;
        validation::json_file_name("paths.calendar_file", &self.paths.calendar_file)?;
        if self.paths.prayer_file == self.paths.calendar_file {
            return Err(EtlError::InvalidConfigValueError {
                field: "paths.calendar_file".to_string(),
                value: self.paths.calendar_file.clone(),
                reason: "Prayer and calendar datasets need different files".to_string(),
            });
        }

        if self.cities.is_empty() {
            return Err(EtlError::ConfigError {
                message: "at least one [[cities]] entry is required".to_string(),
            });
        }

        let mut ids = HashSet::new();
        for city in &self.cities {
            validation::city_id("cities.id", &city.id)?;
            validation::required("cities.timezone", &city.timezone)?;
            if !ids.insert(city.id.as_str()) {
                return Err(EtlError::InvalidConfigValueError {
                    field: "cities.id".to_string(),
                    value: city.id.clone(),
                    reason: "Duplicate city id".to_string(),
                });
            }
        }

        let mut labels = HashSet::new();
        for (label, city_id) in &self.zones {
            if !ids.contains(city_id.as_str()) {
                return Err(EtlError::InvalidConfigValueError {
                    field: format!("zones.{}", label),
                    value: city_id.clone(),
                    reason: "Zone points at a city id that is not configured".to_string(),
                });
            }
            let key = normalize_label(label);
            if key.is_empty() || !labels.insert(key) {
                return Err(EtlError::InvalidConfigValueError {
                    field: "zones".to_string(),
                    value: label.clone(),
                    reason: "Zone label is empty or collides with another label".to_string(),
                });
            }
        }

        Ok(())
    }
}

impl ConfigProvider for Settings {
    fn index_url(&self) -> &str {
        &self.source.index_url
    }

    fn source_label(&self) -> &str {
        &self.source.label
    }

    fn user_agent(&self) -> Option<&str> {
        self.source.user_agent.as_deref()
    }

    fn data_dir(&self) -> &str {
        &self.paths.data_dir
    }

    fn output_dir(&self) -> &str {
        &self.paths.output_dir
    }

    fn output_file(&self, mode: Mode) -> &str {
        match mode {
            Mode::Prayer => &self.paths.prayer_file,
            Mode::Calendar => &self.paths.calendar_file,
        }
    }

    fn cities(&self) -> &[City] {
        &self.cities
    }

    fn zones(&self) -> &BTreeMap<String, String> {
        &self.zones
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[source]
index_url = "https://example.com/prayer-times/"
label = "Example"

[paths]
data_dir = "./data"
output_dir = "./output"
prayer_file = "prayer_times.json"
calendar_file = "calendar.json"

[[cities]]
id = "colombo"
name = "Colombo"

[zones]
colombo = "colombo"
"#;

    #[test]
    fn test_builtin_config_is_valid() {
        let settings = Settings::builtin().unwrap();
        settings.validate().unwrap();
        assert_eq!(settings.cities.len(), 25);
        assert!(settings.cities.iter().all(|c| c.country == "Sri Lanka"));
        assert!(settings.cities.iter().all(|c| c.timezone == "Asia/Colombo"));
        assert_eq!(
            settings.zones.get("nuwara eliya").map(String::as_str),
            Some("nuwara-eliya")
        );
    }

    #[test]
    fn test_parse_minimal_config() {
        let settings = Settings::from_toml_str(MINIMAL).unwrap();
        assert_eq!(settings.index_url(), "https://example.com/prayer-times/");
        assert_eq!(settings.output_file(Mode::Calendar), "calendar.json");
        assert_eq!(settings.source.user_agent, None);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("LK_PRAYER_TEST_INDEX", "https://mirror.example.org/times/");
        let content = MINIMAL.replace(
            "https://example.com/prayer-times/",
            "${LK_PRAYER_TEST_INDEX}",
        );

        let settings = Settings::from_toml_str(&content).unwrap();
        assert_eq!(settings.source.index_url, "https://mirror.example.org/times/");

        std::env::remove_var("LK_PRAYER_TEST_INDEX");
    }

    #[test]
    fn test_zone_pointing_at_unknown_city_is_rejected() {
        let content = MINIMAL.replace("colombo = \"colombo\"", "colombo = \"atlantis\"");
        let settings = Settings::from_toml_str(&content).unwrap();
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, EtlError::InvalidConfigValueError { .. }));
    }

    #[test]
    fn test_colliding_zone_labels_are_rejected() {
        let content = MINIMAL.replace(
            "colombo = \"colombo\"",
            "colombo = \"colombo\"\n\"COLOMBO.\" = \"colombo\"",
        );
        let settings = Settings::from_toml_str(&content).unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_invalid_index_url_is_rejected() {
        let content = MINIMAL.replace("https://example.com/prayer-times/", "not-a-url");
        let settings = Settings::from_toml_str(&content).unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_output_files_must_be_distinct_json_names() {
        let shared = MINIMAL.replace("calendar.json", "prayer_times.json");
        let err = Settings::from_toml_str(&shared).unwrap().validate().unwrap_err();
        assert!(matches!(err, EtlError::InvalidConfigValueError { ref field, .. } if field == "paths.calendar_file"));

        let nested = MINIMAL.replace("\"calendar.json\"", "\"../calendar.json\"");
        assert!(Settings::from_toml_str(&nested).unwrap().validate().is_err());

        let bad_id = MINIMAL.replace("id = \"colombo\"", "id = \"Colombo City\"");
        assert!(Settings::from_toml_str(&bad_id).unwrap().validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();

        let settings = Settings::from_file(temp_file.path()).unwrap();
        assert_eq!(settings.source.label, "Example");
        assert_eq!(settings.cities[0].name, "Colombo");
    }
}
