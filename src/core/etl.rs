use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output_path: String,
    pub documents: usize,
    pub cities: usize,
    pub records: usize,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();
        tracing::info!("Starting ETL process...");

        // Extract
        tracing::info!("Extracting documents...");
        let batch = self.pipeline.extract().await?;
        let documents = batch.documents.len();
        tracing::info!("Extracted {} document(s)", documents);

        // Transform
        tracing::info!("Transforming documents...");
        let result = self.pipeline.transform(batch).await?;
        let cities = result.dataset.cities.len();
        let records = result.dataset.record_count();
        tracing::info!("Assembled {} day record(s) for {} city(ies)", records, cities);

        // Load
        tracing::info!("Loading dataset...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!(
            "Output saved to: {} ({:.1}s)",
            output_path,
            started.elapsed().as_secs_f64()
        );

        Ok(RunSummary {
            output_path,
            documents,
            cities,
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ExtractedBatch, TransformResult};
    use crate::domain::model::{Dataset, DATASET_VERSION};
    use crate::utils::error::EtlError;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct StubPipeline {
        fail_transform: bool,
        loaded: AtomicBool,
    }

    fn empty_dataset() -> Dataset {
        Dataset {
            version: DATASET_VERSION.to_string(),
            last_updated: "2025-01-01T00:00:00Z".to_string(),
            source: "stub".to_string(),
            cities: Vec::new(),
            prayer_times: BTreeMap::new(),
        }
    }

    #[async_trait::async_trait]
    impl Pipeline for StubPipeline {
        async fn extract(&self) -> Result<ExtractedBatch> {
            Ok(ExtractedBatch {
                documents: Vec::new(),
                workspace: tempfile::TempDir::new()?,
            })
        }

        async fn transform(&self, batch: ExtractedBatch) -> Result<TransformResult> {
            if self.fail_transform {
                return Err(EtlError::ExtractionError {
                    document: "stub.pdf".to_string(),
                    message: "no rows".to_string(),
                });
            }
            Ok(TransformResult {
                dataset: empty_dataset(),
                workspace: batch.workspace,
            })
        }

        async fn load(&self, _result: TransformResult) -> Result<String> {
            self.loaded.store(true, Ordering::SeqCst);
            Ok("out/prayer_times.json".to_string())
        }
    }

    #[tokio::test]
    async fn test_run_reports_summary() {
        let engine = EtlEngine::new(StubPipeline {
            fail_transform: false,
            loaded: AtomicBool::new(false),
        });
        let summary = engine.run().await.unwrap();
        assert_eq!(summary.output_path, "out/prayer_times.json");
        assert_eq!(summary.documents, 0);
        assert_eq!(summary.records, 0);
    }

    #[tokio::test]
    async fn test_failed_stage_skips_load() {
        let engine = EtlEngine::new(StubPipeline {
            fail_transform: true,
            loaded: AtomicBool::new(false),
        });
        let err = engine.run().await.unwrap_err();
        assert!(matches!(err, EtlError::ExtractionError { .. }));
        assert!(!engine.pipeline.loaded.load(Ordering::SeqCst));
    }
}
