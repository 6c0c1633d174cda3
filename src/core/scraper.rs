//! Index page scraping.
//!
//! Fetches the HTML page that lists the published PDFs and picks the links
//! matching the requested [`Mode`] and month.

use crate::domain::model::{Mode, PdfLink, RunRequest};
use crate::domain::ports::HttpFetch;
use crate::utils::error::{EtlError, Result};
use crate::utils::text::{clean_text, words};
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

pub struct WebScraper<'a, H: HttpFetch> {
    fetcher: &'a H,
    index_url: &'a str,
}

impl<'a, H: HttpFetch> WebScraper<'a, H> {
    pub fn new(fetcher: &'a H, index_url: &'a str) -> Self {
        Self { fetcher, index_url }
    }

    /// Candidate PDF links for the request, in page order.
    pub async fn find_pdf_links(&self, request: &RunRequest) -> Result<Vec<PdfLink>> {
        let fetch_error = |message: String| EtlError::FetchError {
            url: self.index_url.to_string(),
            message,
        };

        let base = Url::parse(self.index_url).map_err(|e| fetch_error(e.to_string()))?;

        tracing::info!("Fetching index page {}", self.index_url);
        let response = self
            .fetcher
            .fetch(self.index_url)
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        if !response.is_success() {
            return Err(fetch_error(format!("HTTP status {}", response.status)));
        }

        let html = String::from_utf8_lossy(&response.body);
        let links = collect_pdf_links(&html, &base)?;
        tracing::debug!("Index page lists {} PDF links", links.len());

        let selected = select_links(links, request);
        if selected.is_empty() {
            return Err(EtlError::NotFoundError {
                mode: request.mode.to_string(),
                month: match request.mode {
                    Mode::Prayer => request.month.map(|m| m.to_string()),
                    Mode::Calendar => None,
                },
            });
        }

        for link in &selected {
            tracing::debug!("Selected {} ({})", link.url, link.label);
        }
        tracing::info!("Found {} {} document(s)", selected.len(), request.mode);
        Ok(selected)
    }
}

/// Every anchor whose resolved path ends in `.pdf`, de-duplicated by URL.
pub fn collect_pdf_links(html: &str, base: &Url) -> Result<Vec<PdfLink>> {
    let anchor_sel = Selector::parse("a[href]").map_err(|e| EtlError::ConfigError {
        message: format!("invalid link CSS selector: {e}"),
    })?;

    let document = Html::parse_document(html);
    let mut seen = BTreeSet::new();
    let mut links = Vec::new();

    for anchor in document.select(&anchor_sel) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(url) = base.join(href.trim()) else {
            tracing::warn!("Skipping unparseable link '{}'", href);
            continue;
        };
        if !url.path().to_ascii_lowercase().ends_with(".pdf") {
            continue;
        }

        let mut label = clean_text(&anchor.text().collect::<Vec<_>>().join(" "));
        if label.is_empty() {
            label = anchor
                .value()
                .attr("title")
                .map(clean_text)
                .unwrap_or_default();
        }

        let url = url.to_string();
        if seen.insert(url.clone()) {
            links.push(PdfLink { url, label });
        }
    }

    Ok(links)
}

/// Whether a link points at a calendar rather than a monthly timetable.
pub fn is_calendar_link(link: &PdfLink) -> bool {
    words(&link.label)
        .iter()
        .chain(words(&link.url).iter())
        .any(|w| w.starts_with("calendar"))
}

/// Applies the mode and (prayer mode only) month filters.
///
/// Calendars cover the whole year, so their month filter is applied when
/// rows are extracted.
pub fn select_links(links: Vec<PdfLink>, request: &RunRequest) -> Vec<PdfLink> {
    links
        .into_iter()
        .filter(|link| match request.mode {
            Mode::Calendar => is_calendar_link(link),
            Mode::Prayer => !is_calendar_link(link),
        })
        .filter(|link| match (request.mode, request.month) {
            (Mode::Prayer, Some(month)) => {
                month.is_named_in(&link.label) || month.is_named_in(&link.url)
            }
            _ => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::date::Month;

    const INDEX: &str = r#"
<html><body>
  <h1>Prayer Times</h1>
  <ul>
    <li><a href="/uploads/colombo-january-2025.pdf">Colombo, Gampaha, Kalutara - January</a></li>
    <li><a href="/uploads/kandy-january-2025.pdf">Kandy - January</a></li>
    <li><a href="https://cdn.example.org/files/Colombo_Feb2025.PDF">  Colombo&nbsp;February </a></li>
    <li><a href="/uploads/colombo-january-2025.pdf">duplicate</a></li>
    <li><a href="/uploads/prayer-calendar-2025.pdf" title="Calendar 2025"></a></li>
    <li><a href="/about">About us</a></li>
    <li><a href="mailto:info@example.org">Mail</a></li>
  </ul>
</body></html>"#;

    fn base() -> Url {
        Url::parse("https://example.org/prayer-times/").unwrap()
    }

    #[test]
    fn test_collect_pdf_links_resolves_and_dedupes() {
        let links = collect_pdf_links(INDEX, &base()).unwrap();
        let urls: Vec<&str> = links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.org/uploads/colombo-january-2025.pdf",
                "https://example.org/uploads/kandy-january-2025.pdf",
                "https://cdn.example.org/files/Colombo_Feb2025.PDF",
                "https://example.org/uploads/prayer-calendar-2025.pdf",
            ]
        );
        assert_eq!(links[0].label, "Colombo, Gampaha, Kalutara - January");
        assert_eq!(links[2].label, "Colombo February");
        assert_eq!(links[3].label, "Calendar 2025");
    }

    #[test]
    fn test_select_prayer_links_for_month() {
        let links = collect_pdf_links(INDEX, &base()).unwrap();
        let request = RunRequest {
            mode: Mode::Prayer,
            month: Some(Month::new(2).unwrap()),
        };
        let selected = select_links(links, &request);
        assert_eq!(selected.len(), 1);
        assert!(selected[0].url.ends_with("Colombo_Feb2025.PDF"));
    }

    #[test]
    fn test_select_prayer_links_without_month_excludes_calendar() {
        let links = collect_pdf_links(INDEX, &base()).unwrap();
        let request = RunRequest {
            mode: Mode::Prayer,
            month: None,
        };
        let selected = select_links(links, &request);
        assert_eq!(selected.len(), 3);
        assert!(selected.iter().all(|l| !is_calendar_link(l)));
    }

    #[test]
    fn test_select_calendar_ignores_month_filter() {
        let links = collect_pdf_links(INDEX, &base()).unwrap();
        let request = RunRequest {
            mode: Mode::Calendar,
            month: Some(Month::new(3).unwrap()),
        };
        let selected = select_links(links, &request);
        assert_eq!(selected.len(), 1);
        assert!(selected[0].url.ends_with("prayer-calendar-2025.pdf"));
    }
}
