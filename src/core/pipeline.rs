use crate::adapters::ReqwestFetcher;
use crate::core::assembler::DatasetAssembler;
use crate::core::downloader::PdfDownloader;
use crate::core::extractor::{detect_month, MonthScope, TimeExtractor};
use crate::core::pdf_parser::PdfTextParser;
use crate::core::scraper::WebScraper;
use crate::core::zones::ZoneMapper;
use crate::core::{
    ConfigProvider, DocumentParser, ExtractedBatch, HttpFetch, Pipeline, Storage, TransformResult,
};
use crate::domain::model::{Mode, RunRequest, SourceDocument, ZoneTimes};
use crate::utils::error::{EtlError, Result};
use crate::utils::text::find_times;
use std::path::Path;

pub struct PrayerPipeline<S, C, H = ReqwestFetcher, P = PdfTextParser>
where
    S: Storage,
    C: ConfigProvider,
    H: HttpFetch,
    P: DocumentParser,
{
    storage: S,
    config: C,
    fetcher: H,
    parser: P,
    mapper: ZoneMapper,
    request: RunRequest,
}

impl<S: Storage, C: ConfigProvider> PrayerPipeline<S, C> {
    pub fn new(storage: S, config: C, request: RunRequest) -> Result<Self> {
        let fetcher = ReqwestFetcher::new(config.user_agent())?;
        Self::with_components(storage, config, fetcher, PdfTextParser, request)
    }
}

impl<S, C, H, P> PrayerPipeline<S, C, H, P>
where
    S: Storage,
    C: ConfigProvider,
    H: HttpFetch,
    P: DocumentParser,
{
    pub fn with_components(
        storage: S,
        config: C,
        fetcher: H,
        parser: P,
        request: RunRequest,
    ) -> Result<Self> {
        let mapper = ZoneMapper::from_config(&config)?;
        Ok(Self {
            storage,
            config,
            fetcher,
            parser,
            mapper,
            request,
        })
    }

    fn month_scope(&self, doc: &SourceDocument) -> Result<MonthScope> {
        match self.request.mode {
            Mode::Calendar => Ok(MonthScope::Calendar {
                only: self.request.month,
            }),
            Mode::Prayer => self
                .request
                .month
                .or_else(|| detect_month(&doc.link, &doc.parsed))
                .map(MonthScope::Fixed)
                .ok_or_else(|| EtlError::ExtractionError {
                    document: doc.link.url.clone(),
                    message: "could not determine which month the document covers".to_string(),
                }),
        }
    }

    /// Zone labels a document covers: from its link text, else from the
    /// title block above the first timetable row.
    fn zones_for(&self, doc: &SourceDocument) -> Result<Vec<String>> {
        let from_link = self.mapper.detect(&doc.link.label);
        if !from_link.is_empty() {
            return Ok(from_link);
        }

        let header: Vec<&str> = doc
            .parsed
            .lines
            .iter()
            .take_while(|line| find_times(line).is_empty())
            .map(String::as_str)
            .collect();
        let from_header = self.mapper.detect(&header.join("\n"));
        if !from_header.is_empty() {
            return Ok(from_header);
        }

        let label = if doc.link.label.is_empty() {
            header.first().copied().unwrap_or(doc.link.url.as_str())
        } else {
            doc.link.label.as_str()
        };
        Err(EtlError::UnknownZoneError {
            label: label.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl<S, C, H, P> Pipeline for PrayerPipeline<S, C, H, P>
where
    S: Storage,
    C: ConfigProvider,
    H: HttpFetch,
    P: DocumentParser,
{
    async fn extract(&self) -> Result<ExtractedBatch> {
        // 暫存目錄：run 結束 (成功或失敗) 時自動刪除
        std::fs::create_dir_all(self.config.data_dir())?;
        let workspace = tempfile::Builder::new()
            .prefix("pdf-")
            .tempdir_in(self.config.data_dir())?;
        tracing::debug!("Temporary PDF directory: {}", workspace.path().display());

        let links = WebScraper::new(&self.fetcher, self.config.index_url())
            .find_pdf_links(&self.request)
            .await?;

        let downloader = PdfDownloader::new(&self.fetcher);
        let mut documents = Vec::with_capacity(links.len());
        for (index, link) in links.iter().enumerate() {
            tracing::info!("Downloading {}", link.url);
            let pdf = downloader.download(index, link, workspace.path()).await?;

            let bytes = std::fs::read(&pdf.path)?;
            let parsed = self.parser.parse(&pdf.link.url, &bytes)?;
            tracing::debug!(
                "{}: {} lines, {} table rows",
                pdf.link.url,
                parsed.lines.len(),
                parsed.rows.len()
            );

            documents.push(SourceDocument {
                link: pdf.link,
                parsed,
            });
        }

        Ok(ExtractedBatch {
            documents,
            workspace,
        })
    }

    async fn transform(&self, batch: ExtractedBatch) -> Result<TransformResult> {
        let mut zone_times = Vec::new();

        for doc in &batch.documents {
            let scope = self.month_scope(doc)?;
            let times = TimeExtractor::new(scope).extract(&doc.link.url, &doc.parsed)?;
            let zones = self.zones_for(doc)?;
            tracing::info!(
                "{}: {} day(s) for zone(s) {}",
                doc.link.url,
                times.len(),
                zones.join(", ")
            );

            for zone in zones {
                zone_times.push(ZoneTimes {
                    zone,
                    times: times.clone(),
                });
            }
        }

        let dataset =
            DatasetAssembler::new(&self.mapper, self.config.source_label()).assemble(&zone_times)?;

        Ok(TransformResult {
            dataset,
            workspace: batch.workspace,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let file_name = self.config.output_file(self.request.mode);
        let output_path = Path::new(self.config.output_dir())
            .join(file_name)
            .display()
            .to_string();

        let json = serde_json::to_vec_pretty(&result.dataset)?;
        tracing::debug!("Writing {} bytes to {}", json.len(), output_path);
        self.storage.write_file(file_name, &json).await?;

        // 寫入成功後刪除暫存 PDF
        let workspace = result.workspace.path().display().to_string();
        if let Err(e) = result.workspace.close() {
            tracing::warn!("Failed to remove temporary directory {}: {}", workspace, e);
        }

        Ok(output_path)
    }
}
