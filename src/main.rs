use clap::Parser;
use lk_prayer_etl::domain::ports::ConfigProvider;
use lk_prayer_etl::utils::{logger, validation::Validate};
use lk_prayer_etl::{CliConfig, EtlEngine, EtlError, LocalStorage, PrayerPipeline};

fn fail(e: EtlError) -> ! {
    tracing::error!("❌ {} (stage: {})", e, e.stage());
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose, cli.json_logs);

    tracing::info!("Starting lk-prayer-etl");
    tracing::debug!("CLI config: {:?}", cli);

    // 驗證參數 (在任何網路請求之前)
    if let Err(e) = cli.validate() {
        fail(e);
    }
    let request = cli.run_request().unwrap_or_else(|e| fail(e));
    let settings = cli.load_settings().unwrap_or_else(|e| fail(e));

    tracing::info!(
        "Mode: {}, month: {}",
        request.mode,
        request
            .month
            .map(|m| m.to_string())
            .unwrap_or_else(|| "all".to_string())
    );

    let storage = LocalStorage::new(settings.output_dir().to_string());
    let pipeline = PrayerPipeline::new(storage, settings, request).unwrap_or_else(|e| fail(e));
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!("✅ ETL process completed successfully!");
            println!(
                "✅ Wrote {} day record(s) for {} city(ies) from {} document(s)",
                summary.records, summary.cities, summary.documents
            );
            println!("📁 Output saved to: {}", summary.output_path);
        }
        Err(e) => fail(e),
    }
}
