pub mod assembler;
pub mod downloader;
pub mod etl;
pub mod extractor;
pub mod pdf_parser;
pub mod pipeline;
pub mod scraper;
pub mod zones;

pub use crate::domain::ports::{
    ConfigProvider, DocumentParser, ExtractedBatch, HttpFetch, Pipeline, Storage, TransformResult,
};
pub use crate::utils::error::Result;
