use crate::domain::model::{City, Dataset, Mode, ParsedDocument, SourceDocument};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tempfile::TempDir;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Status and body of a single GET.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport failure (DNS, TLS, connection reset...). Stage specific errors
/// are built from it by the caller.
#[derive(Debug, Clone)]
pub struct TransportError(pub String);

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait HttpFetch: Send + Sync {
    fn fetch(
        &self,
        url: &str,
    ) -> impl std::future::Future<Output = std::result::Result<FetchResponse, TransportError>> + Send;
}

pub trait DocumentParser: Send + Sync {
    fn parse(&self, name: &str, bytes: &[u8]) -> Result<ParsedDocument>;
}

pub trait ConfigProvider: Send + Sync {
    fn index_url(&self) -> &str;
    fn source_label(&self) -> &str;
    fn user_agent(&self) -> Option<&str>;
    fn data_dir(&self) -> &str;
    fn output_dir(&self) -> &str;
    fn output_file(&self, mode: Mode) -> &str;
    fn cities(&self) -> &[City];
    fn zones(&self) -> &BTreeMap<String, String>;
}

/// Documents pulled from the source, plus the scratch directory holding
/// the downloaded PDFs. Dropping it deletes the directory.
#[derive(Debug)]
pub struct ExtractedBatch {
    pub documents: Vec<SourceDocument>,
    pub workspace: TempDir,
}

#[derive(Debug)]
pub struct TransformResult {
    pub dataset: Dataset,
    pub workspace: TempDir,
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ExtractedBatch>;
    async fn transform(&self, batch: ExtractedBatch) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
