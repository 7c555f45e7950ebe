#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "lambda")]
use tmdb_ingest::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use tmdb_ingest::{EtlEngine, LambdaConfig, MovieIngestPipeline, RunOutcome, S3Storage};

#[cfg(feature = "lambda")]
#[derive(Deserialize)]
pub struct Request {
    pub pages: Option<u32>,
    #[serde(alias = "bucket")]
    pub s3_bucket: Option<String>,
}

#[cfg(feature = "lambda")]
#[derive(Serialize)]
pub struct Response {
    pub message: String,
    pub object_key: Option<String>,
    pub records_uploaded: usize,
}

#[cfg(feature = "lambda")]
async fn function_handler(event: LambdaEvent<Request>) -> Result<Response, Error> {
    tracing::info!("Starting TMDB ingestion Lambda function");

    let mut config = LambdaConfig::from_env()?;

    // 事件內的值優先於環境變數
    if let Some(pages) = event.payload.pages {
        config.pages = pages;
    }
    if let Some(bucket) = event.payload.s3_bucket {
        config.s3_bucket = bucket;
    }

    config.validate()?;

    let storage = S3Storage::connect(&config.s3_bucket, config.s3_region.as_deref()).await;
    let pipeline = MovieIngestPipeline::new(storage, &config)?;

    let response = match EtlEngine::new(pipeline).run().await? {
        RunOutcome::Uploaded { key, records } => Response {
            message: "Ingestion completed successfully".to_string(),
            object_key: Some(key),
            records_uploaded: records,
        },
        RunOutcome::Empty => Response {
            message: "No movies with financial data, nothing uploaded".to_string(),
            object_key: None,
            records_uploaded: 0,
        },
    };

    tracing::info!("TMDB ingestion Lambda function completed");
    Ok(response)
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();
    run(service_fn(function_handler)).await
}
