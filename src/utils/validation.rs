//! Field checks for [`Settings`](crate::config::Settings) and the command
//! line. Each check names the offending field in its error.

use crate::utils::error::{EtlError, Result};
use std::path::{Component, Path};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: &str, reason: impl Into<String>) -> EtlError {
    EtlError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// The index page: an absolute http(s) URL with a host.
pub fn index_url(field: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value.trim())
        .map_err(|e| invalid(field, value, format!("Invalid URL: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field,
            value,
            format!("Index page must be served over http(s), not {}", url.scheme()),
        ));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid(field, value, "URL has no host"));
    }
    Ok(url)
}

/// A directory setting (`paths.data_dir`, `paths.output_dir`).
pub fn directory(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "Directory cannot be empty"));
    }
    if value.contains('\0') {
        return Err(invalid(field, value, "Directory contains a NUL byte"));
    }
    Ok(())
}

/// An output file name, written directly inside `paths.output_dir`.
pub fn json_file_name(field: &str, value: &str) -> Result<()> {
    let path = Path::new(value);
    let plain = matches!(
        path.components().collect::<Vec<_>>().as_slice(),
        [Component::Normal(_)]
    );
    if !plain {
        return Err(invalid(
            field,
            value,
            "Expected a bare file name inside the output directory",
        ));
    }
    if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
        return Err(invalid(field, value, "Dataset files must end in .json"));
    }
    Ok(())
}

/// A city id: lowercase ASCII slug, e.g. `nuwara-eliya`.
pub fn city_id(field: &str, value: &str) -> Result<()> {
    let slug = !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if slug {
        Ok(())
    } else {
        Err(invalid(field, value, "City id must be a lowercase slug"))
    }
}

pub fn required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "Value cannot be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_url() {
        let url = index_url("source.index_url", "https://www.acju.lk/prayer-times/").unwrap();
        assert_eq!(url.host_str(), Some("www.acju.lk"));
        assert!(index_url("source.index_url", "http://127.0.0.1:8080/").is_ok());
        assert!(index_url("source.index_url", "").is_err());
        assert!(index_url("source.index_url", "acju.lk/prayer-times").is_err());
        assert!(index_url("source.index_url", "ftp://acju.lk/").is_err());
        assert!(index_url("source.index_url", "file:///tmp/index.html").is_err());
    }

    #[test]
    fn test_directory() {
        assert!(directory("paths.output_dir", "./output").is_ok());
        assert!(directory("paths.output_dir", "  ").is_err());
        assert!(directory("paths.output_dir", "out\0put").is_err());
    }

    #[test]
    fn test_json_file_name() {
        assert!(json_file_name("paths.prayer_file", "prayer_times.json").is_ok());
        for bad in ["prayer_times.csv", "prayer_times", "../prayer_times.json", "out/x.json", ""] {
            let err = json_file_name("paths.prayer_file", bad).unwrap_err();
            assert!(
                matches!(err, EtlError::InvalidConfigValueError { ref field, .. } if field == "paths.prayer_file"),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_city_id() {
        assert!(city_id("cities.id", "nuwara-eliya").is_ok());
        assert!(city_id("cities.id", "colombo").is_ok());
        assert!(city_id("cities.id", "Colombo").is_err());
        assert!(city_id("cities.id", "nuwara eliya").is_err());
        assert!(city_id("cities.id", "-galle").is_err());
        assert!(city_id("cities.id", "").is_err());
    }

    #[test]
    fn test_required() {
        assert!(required("source.label", "ACJU").is_ok());
        assert!(required("source.label", "   ").is_err());
    }
}
