use crate::domain::model::{DownloadedPdf, PdfLink};
use crate::domain::ports::HttpFetch;
use crate::utils::error::{EtlError, Result};
use std::path::Path;
use url::Url;

pub struct PdfDownloader<'a, H: HttpFetch> {
    fetcher: &'a H,
}

impl<'a, H: HttpFetch> PdfDownloader<'a, H> {
    pub fn new(fetcher: &'a H) -> Self {
        Self { fetcher }
    }

    /// Fetches `link` into `dir`. The file name is prefixed with `index`
    /// so documents sharing a name on different hosts do not collide.
    pub async fn download(&self, index: usize, link: &PdfLink, dir: &Path) -> Result<DownloadedPdf> {
        let download_error = |message: String| EtlError::DownloadError {
            url: link.url.clone(),
            message,
        };

        let response = self
            .fetcher
            .fetch(&link.url)
            .await
            .map_err(|e| download_error(e.to_string()))?;

        if !response.is_success() {
            return Err(download_error(format!("HTTP status {}", response.status)));
        }
        if response.body.is_empty() {
            return Err(download_error("empty response body".to_string()));
        }

        let path = dir.join(format!("{:02}-{}", index, file_name_for(&link.url)));
        std::fs::write(&path, &response.body)?;

        let pdf = DownloadedPdf {
            link: link.clone(),
            path,
            size: response.body.len(),
        };
        tracing::debug!(
            "Downloaded {} bytes from {} to {}",
            pdf.size,
            pdf.link.url,
            pdf.path.display()
        );
        Ok(pdf)
    }
}

/// Last path segment of `url`, restricted to filename-safe characters.
fn file_name_for(url: &str) -> String {
    let segment = Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .unwrap_or_default();

    let safe: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if safe.trim_matches(|c| c == '_' || c == '.').is_empty() {
        "document.pdf".to_string()
    } else {
        safe
    }
}
