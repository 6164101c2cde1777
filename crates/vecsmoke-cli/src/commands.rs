//! Command implementations.
//!
//! Handles:
//! - run: smoke test against the configured endpoint (or in memory)
//! - check: list collections and inspect the configured one
//! - config: effective settings

use anyhow::{Context, Result};
use tracing::info;

use vecsmoke_client::{Connector, MemoryStore, QdrantConfig, QdrantConnector};
use vecsmoke_runner::{ProbeReport, RunConfig, RunError, RunReport, SmokeTestRunner};
use vecsmoke_types::{Payload, SampleSet, Settings, SmokeError};

use crate::cli::{EndpointArgs, RunArgs};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `level`. Logs go to stderr so stdout carries only
/// results.
pub fn init_logging(level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Load layered settings and apply the global log level flag.
pub fn load_settings(
    config_path: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Settings, RunError> {
    let mut settings = Settings::load(config_path)?;
    if let Some(level) = log_level_override {
        settings.log_level = level.to_string();
    }
    Ok(settings)
}

/// Sample data named by the settings, or the built-in set.
pub fn load_sample(settings: &Settings) -> Result<SampleSet, SmokeError> {
    match &settings.points_file {
        Some(path) => {
            info!(path = %path, "Loading sample points");
            SampleSet::from_file(path)
        }
        None => Ok(SampleSet::builtin()),
    }
}

/// Execute a smoke test.
///
/// With `in_memory` no host is required and nothing leaves the process.
pub async fn run_smoke_test(settings: &Settings, in_memory: bool) -> Result<RunReport, RunError> {
    let config = RunConfig::from_settings(settings, load_sample(settings)?)?;

    if in_memory {
        return run_with(MemoryStore::new(), &config).await;
    }
    let connector = QdrantConnector::new(QdrantConfig::from_settings(settings)?);
    run_with(connector, &config).await
}

async fn run_with<C: Connector>(connector: C, config: &RunConfig) -> Result<RunReport, RunError> {
    SmokeTestRunner::new(connector).run(config).await
}

/// Probe the configured endpoint for the configured collection.
pub async fn check_collection(settings: &Settings) -> Result<ProbeReport, RunError> {
    settings.validate()?;
    let connector = QdrantConnector::new(QdrantConfig::from_settings(settings)?);
    SmokeTestRunner::new(connector)
        .probe(&settings.collection)
        .await
}

fn format_payload(payload: &Payload) -> String {
    let fields: Vec<String> = payload
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    format!("{{{}}}", fields.join(", "))
}

/// Human-readable report, one result per line.
pub fn render_report(report: &RunReport) -> String {
    let mut out = Vec::new();
    out.push(format!("Run {}", report.run_id));
    out.push(format!(
        "Collection '{}' ({}): {}",
        report.collection, report.distance, report.collection_outcome
    ));
    out.push(format!("Upserted {} point(s)", report.upserted));
    out.push(format!("Search results ({}):", report.results.len()));
    for (rank, hit) in report.results.iter().enumerate() {
        let payload = hit
            .payload
            .as_ref()
            .map(format_payload)
            .unwrap_or_else(|| "-".to_string());
        out.push(format!(
            "  {}. id={} score={:.4} payload={}",
            rank + 1,
            hit.id,
            hit.score,
            payload
        ));
    }
    if report.cleaned_up {
        out.push(format!("Deleted collection '{}'", report.collection));
    }
    out.push(report.summary());
    out.join("\n")
}

/// Human-readable probe result.
pub fn render_probe(probe: &ProbeReport) -> String {
    let status = match &probe.info {
        Some(info) => format!(
            "{}: collection '{}' exists ({})",
            probe.endpoint, probe.collection, info
        ),
        None => format!(
            "{}: collection '{}' does not exist",
            probe.endpoint, probe.collection
        ),
    };

    let mut out = vec![
        status,
        format!("{} collection(s) on server", probe.collections.len()),
    ];
    for name in &probe.collections {
        out.push(format!("  - {}", name));
    }
    out.join("\n")
}

/// Handle `run`.
pub async fn handle_run(settings: Settings, args: &RunArgs) -> Result<()> {
    let mut settings = settings;
    args.apply(&mut settings);

    let report = run_smoke_test(&settings, args.in_memory).await?;
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        println!("{}", render_report(&report));
    }
    Ok(())
}

/// Handle `check`.
pub async fn handle_check(settings: Settings, args: &EndpointArgs) -> Result<()> {
    let mut settings = settings;
    args.apply(&mut settings);

    let probe = check_collection(&settings).await?;
    println!("{}", render_probe(&probe));
    Ok(())
}

/// Effective settings as TOML with the credential masked.
pub fn show_config(settings: &Settings) -> Result<String> {
    toml::to_string_pretty(&settings.redacted()).context("Failed to serialize settings")
}

/// `kind: message` line for stderr.
pub fn describe_error(err: &anyhow::Error) -> String {
    match err.chain().find_map(|e| e.downcast_ref::<RunError>()) {
        Some(run_error) => format!("{}: {}", run_error.kind(), run_error),
        None => format!("Error: {:#}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use vecsmoke_client::{ClientError, ConnectionError};
    use vecsmoke_types::PointId;

    #[tokio::test]
    async fn test_in_memory_run_needs_no_host() {
        let settings = Settings::default();
        let report = run_smoke_test(&settings, true).await.unwrap();

        assert_eq!(report.collection, "vecsmoke_test_collection");
        let ids: Vec<PointId> = report.results.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![PointId::Num(2), PointId::Num(1)]);
    }

    #[tokio::test]
    async fn test_missing_host_is_config_error() {
        let settings = Settings::default();
        let err = run_smoke_test(&settings, false).await.unwrap_err();

        assert_eq!(err.kind(), "ConfigError");
        assert!(err.to_string().contains("host is not set"));
    }

    #[tokio::test]
    async fn test_missing_points_file_is_config_error() {
        let settings = Settings {
            points_file: Some("/nonexistent/points.json".to_string()),
            ..Default::default()
        };
        let err = run_smoke_test(&settings, true).await.unwrap_err();
        assert_eq!(err.kind(), "ConfigError");
    }

    #[tokio::test]
    async fn test_points_file_replaces_builtin_sample() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"query": [1.0, 0.0], "points": [{{"id": 7, "vector": [1.0, 0.0]}}]}}"#
        )
        .unwrap();

        let settings = Settings {
            vector_size: 2,
            points_file: Some(file.path().to_string_lossy().to_string()),
            ..Default::default()
        };
        let report = run_smoke_test(&settings, true).await.unwrap();

        assert_eq!(report.upserted, 1);
        assert_eq!(report.results[0].id, PointId::Num(7));
    }

    #[tokio::test]
    async fn test_render_report() {
        let report = run_smoke_test(&Settings::default(), true).await.unwrap();
        let text = render_report(&report);

        assert!(text.contains("Collection 'vecsmoke_test_collection' (cosine): created"));
        assert!(text.contains("Upserted 2 point(s)"));
        assert!(text.contains("1. id=2 score=0.93"));
        assert!(text.contains("payload={color=\"black\", extra_field=true, rand_number=53}"));
        assert!(text.contains("2. id=1"));
    }

    #[test]
    fn test_render_probe() {
        let probe = ProbeReport {
            endpoint: "http://localhost:6333".to_string(),
            collections: vec!["archive".to_string(), "notes".to_string()],
            collection: "smoke".to_string(),
            exists: false,
            info: None,
        };
        assert_eq!(
            render_probe(&probe),
            [
                "http://localhost:6333: collection 'smoke' does not exist",
                "2 collection(s) on server",
                "  - archive",
                "  - notes",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_show_config_redacts_credential() {
        let settings = Settings {
            host: Some("localhost".to_string()),
            api_key: Some("secret-key".to_string()),
            ..Default::default()
        };
        let text = show_config(&settings).unwrap();

        assert!(text.contains("host = \"localhost\""));
        assert!(text.contains("********"));
        assert!(!text.contains("secret-key"));
    }

    #[test]
    fn test_load_settings_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "collection = \"from_file\"").unwrap();
        writeln!(file, "search_limit = 2").unwrap();

        let path = file.path().to_string_lossy().to_string();
        let settings = load_settings(Some(&path), Some("debug")).unwrap();

        assert_eq!(settings.collection, "from_file");
        assert_eq!(settings.search_limit, 2);
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_describe_error() {
        let err: anyhow::Error = RunError::from(ClientError::from(ConnectionError::Timeout(
            "after 30s".to_string(),
        )))
        .into();
        assert!(describe_error(&err).starts_with("ConnectionError: "));

        let err = anyhow::anyhow!("something else");
        assert_eq!(describe_error(&err), "Error: something else");
    }
}
