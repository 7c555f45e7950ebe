use clap::Parser;
use tmdb_ingest::core::Storage;
use tmdb_ingest::utils::{logger, validation::Validate};
use tmdb_ingest::{CliConfig, EtlEngine, EtlError, LocalStorage, MovieIngestPipeline, RunOutcome};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 可選
    dotenvy::dotenv().ok();
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting tmdb-ingest CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 沒有 API key 就在任何網路請求前結束
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e);
        std::process::exit(e.exit_code());
    }

    let result = match config.output_path.clone() {
        Some(dir) => {
            tracing::info!("📁 Writing to local directory {} instead of S3", dir);
            run(LocalStorage::new(dir), &config).await
        }
        None => run_s3(&config).await,
    };

    match result {
        Ok(RunOutcome::Uploaded { key, records }) => {
            println!("✅ Uploaded {} movies to {}", records, key);
        }
        Ok(RunOutcome::Empty) => {
            println!("⚠️ No movies with financial data, nothing uploaded");
        }
        Err(e) => {
            tracing::error!(
                "❌ Ingestion failed: {} (Severity: {:?})",
                e,
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e);
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}

async fn run<S: Storage>(storage: S, config: &CliConfig) -> Result<RunOutcome, EtlError> {
    let pipeline = MovieIngestPipeline::new(storage, config)?;
    EtlEngine::new(pipeline).run().await
}

#[cfg(feature = "s3")]
async fn run_s3(config: &CliConfig) -> Result<RunOutcome, EtlError> {
    let storage =
        tmdb_ingest::S3Storage::connect(&config.bucket, config.s3_region.as_deref()).await;
    run(storage, config).await
}

#[cfg(not(feature = "s3"))]
async fn run_s3(_config: &CliConfig) -> Result<RunOutcome, EtlError> {
    Err(EtlError::ConfigError {
        message: "built without S3 support, pass --output-path".to_string(),
    })
}
