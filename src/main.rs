use anyhow::Context;
use posting_dedup::{config::AppConfig, DuplicateDetector, JsonFileStore, Posting};
use std::{fs, path::Path, sync::OnceLock};
use tracing_appender::rolling;
use tracing_subscriber::{
    filter::filter_fn, fmt::layer as fmt_layer, prelude::*, EnvFilter, Registry,
};

const LOG_TARGET: &str = "posting_dedup";

fn main() -> anyhow::Result<()> {
    let mut config = AppConfig::from_env().context("failed to load configuration")?;
    if let Some(batch_file) = std::env::args().nth(1) {
        config.input.batch_file = batch_file;
    }
    setup_tracing(&config)?;

    let detector = DuplicateDetector::from_config(&config.dedup)
        .context("invalid dedup thresholds")?;
    let store = JsonFileStore::new(&config.store.file);

    let raw = fs::read(&config.input.batch_file)
        .with_context(|| format!("failed to read batch file {:?}", config.input.batch_file))?;
    let batch: Vec<Posting> = serde_json::from_slice(&raw)
        .with_context(|| format!("batch file {:?} is not a JSON array", config.input.batch_file))?;

    tracing::info!(
        batch_file = %config.input.batch_file,
        store = %store.path().display(),
        count = batch.len(),
        "deduplicating batch"
    );

    let plan = detector
        .plan_ingest(batch, &store)
        .context("failed to check postings against store")?;
    let appended = store.append(&plan.fresh).context("failed to persist postings")?;
    tracing::info!(appended, "store updated");

    let stdout = std::io::stdout();
    serde_json::to_writer_pretty(stdout.lock(), &plan).context("failed to write plan")?;
    println!();

    Ok(())
}

fn setup_tracing(config: &AppConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = config
            .logging
            .level
            .clone()
            .unwrap_or_else(|| "info".to_string());
        EnvFilter::new(level)
    });

    let log_path = Path::new(&config.logging.file);
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file_name = log_path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow::anyhow!("invalid log file path"))?;
    let directory = log_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| Path::new(".").to_path_buf());

    let file_appender = rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
    let _ = FILE_GUARD.set(guard);

    let crate_filter = filter_fn(|meta| meta.target().starts_with(LOG_TARGET));

    // stdout carries the plan JSON, so console logs go to stderr
    let console = fmt_layer().with_writer(std::io::stderr);

    let file_layer = fmt_layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(crate_filter);

    Registry::default()
        .with(env_filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .context("failed to init tracing subscriber")?;

    Ok(())
}
