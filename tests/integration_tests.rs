use anyhow::Result;
use clap::Parser;
use httpmock::prelude::*;
use tempfile::TempDir;
use tmdb_ingest::utils::validation::Validate;
use tmdb_ingest::{CliConfig, EtlEngine, EtlError, LocalStorage, MovieIngestPipeline, RunOutcome};

fn cli_config(server: &MockServer, output: &str, extra: &[&str]) -> CliConfig {
    let base_url = server.base_url();
    let mut argv = vec![
        "tmdb-ingest",
        "--base-url",
        &base_url,
        "--output-path",
        output,
        "--rate-limit-ms",
        "0",
        "--pages",
        "2",
    ];
    argv.extend_from_slice(extra);
    CliConfig::try_parse_from(argv).unwrap()
}

fn mock_page(server: &MockServer, page: u32, results: serde_json::Value) {
    server.mock(|when, then| {
        when.method(GET)
            .path("/movie/popular")
            .query_param("page", page.to_string())
            .query_param("api_key", "it-key");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"page": page, "results": results, "total_pages": 2}));
    });
}

fn mock_detail(server: &MockServer, body: serde_json::Value) {
    let id = body["id"].as_i64().unwrap();
    server.mock(|when, then| {
        when.method(GET).path(format!("/movie/{}", id));
        then.status(200).json_body(body);
    });
}

#[tokio::test]
async fn test_end_to_end_ingestion_to_local_storage() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    mock_page(
        &server,
        1,
        serde_json::json!([{"id": 550}, {"id": 13}, {"title": "no id"}]),
    );
    mock_page(&server, 2, serde_json::json!([{"id": 680}, {"id": 999}]));

    mock_detail(
        &server,
        serde_json::json!({
            "id": 550,
            "title": "Fight Club",
            "release_date": "1999-10-15",
            "budget": 63000000,
            "revenue": 100853753,
            "popularity": 61.4,
            "vote_average": 8.4,
            "vote_count": 26280,
            "runtime": 139,
            "genres": [{"id": 18, "name": "Drama"}],
            "original_language": "en",
            "status": "Released"
        }),
    );
    mock_detail(
        &server,
        serde_json::json!({"id": 13, "title": "Forrest Gump", "budget": 0, "revenue": 0}),
    );
    mock_detail(
        &server,
        serde_json::json!({"id": 680, "title": "Pulp Fiction", "budget": 8000000}),
    );
    server.mock(|when, then| {
        when.method(GET).path("/movie/999");
        then.status(404);
    });

    let config = cli_config(&server, &output, &["--api-key", "it-key"]);
    config.validate()?;

    let pipeline = MovieIngestPipeline::new(LocalStorage::new(&output), &config)?;
    let outcome = EtlEngine::new(pipeline).run().await?;

    let (key, records) = match outcome {
        RunOutcome::Uploaded { key, records } => (key, records),
        other => panic!("expected an upload, got {:?}", other),
    };
    assert_eq!(records, 2);
    assert!(key.starts_with("raw/movies/"));
    assert!(key.ends_with(".json"));

    let body = std::fs::read_to_string(temp_dir.path().join(&key))?;
    let lines: Vec<serde_json::Value> = body
        .lines()
        .map(serde_json::from_str)
        .collect::<std::result::Result<_, _>>()?;

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["movie_id"], 550);
    assert_eq!(lines[0]["genres"], serde_json::json!(["Drama"]));
    assert_eq!(lines[0]["genre_ids"], serde_json::json!([18]));
    assert_eq!(lines[1]["movie_id"], 680);
    assert_eq!(lines[1]["revenue"], 0);
    assert!(lines[1]["runtime"].is_null());

    for line in &lines {
        let stamp = line["_ingested_at"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
    }

    Ok(())
}

#[tokio::test]
async fn test_empty_result_writes_nothing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    mock_page(&server, 1, serde_json::json!([{"id": 1}]));
    mock_page(&server, 2, serde_json::json!([]));
    mock_detail(&server, serde_json::json!({"id": 1, "title": "Indie"}));

    let config = cli_config(&server, &output, &["--api-key", "it-key"]);
    let pipeline = MovieIngestPipeline::new(LocalStorage::new(&output), &config)?;
    let outcome = EtlEngine::new(pipeline).run().await?;

    assert_eq!(outcome, RunOutcome::Empty);
    assert!(!temp_dir.path().join("raw").exists());

    Ok(())
}

#[tokio::test]
async fn test_listing_client_error_fails_run() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let list_mock = server.mock(|when, then| {
        when.method(GET).path("/movie/popular");
        then.status(401)
            .json_body(serde_json::json!({"status_message": "Invalid API key"}));
    });

    let config = cli_config(&server, &output, &["--api-key", "it-key"]);
    let pipeline = MovieIngestPipeline::new(LocalStorage::new(&output), &config)?;
    let result = EtlEngine::new(pipeline).run().await;

    list_mock.assert_hits(1);
    match result {
        Err(e @ EtlError::ClientError { status: 401, .. }) => {
            assert_eq!(e.recovery_suggestion(), "Verify the TMDB API key is valid");
        }
        other => panic!("expected a 401 client error, got {:?}", other),
    }

    Ok(())
}
