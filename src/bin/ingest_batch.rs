//! Runs submission ingestion against `PostgreSQL`.
//!
//! Usage:
//!
//! ```text
//! ingest_batch receive <batch-path>
//! ingest_batch pending
//! ingest_batch resync
//! ```
//!
//! `receive` stores every submission in the JSON array at `batch-path` and
//! then ingests them. `pending` ingests every stored submission without a
//! job link, and `resync` re-extracts content for linked submissions. The
//! ingestion summary is written to standard output as JSON:
//!
//! ```json
//! { "linked": 4, "unmatched": 1, "errors": [] }
//! ```
//!
//! Configuration comes from `DATABASE_URL`, `JOBFLOW_MAX_WRITE_ATTEMPTS` and
//! `JOBFLOW_LOG`.

use camino::{Utf8Path, Utf8PathBuf};
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use jobflow::config::{ConfigError, JobflowConfig};
use jobflow::intake::{
    adapters::postgres::{PostgresMaterialRepository, PostgresSubmissionRepository},
    domain::{IncomingSubmission, SubmissionTransformer},
    services::{IngestionSummary, IntakeServiceError, SubmissionIngestionService},
};
use jobflow::job::{adapters::postgres::PostgresJobRepository, ports::RandomNoteIds};
use mockable::DefaultClock;
use std::env;
use std::io::{self, Write};
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Builder;
use tracing::warn;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

type PgIngestionService = SubmissionIngestionService<
    PostgresJobRepository,
    PostgresSubmissionRepository,
    PostgresMaterialRepository,
    DefaultClock,
>;

#[derive(Debug, Error)]
enum BatchError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to read batch file {path}: {source}")]
    BatchRead {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse batch file: {0}")]
    BatchParse(#[source] serde_json::Error),
    #[error("failed to build connection pool: {0}")]
    Pool(#[source] diesel::r2d2::PoolError),
    #[error("runtime init failed: {0}")]
    RuntimeInit(#[source] io::Error),
    #[error(transparent)]
    Intake(#[from] IntakeServiceError),
    #[error("failed to render summary: {0}")]
    Render(#[source] serde_json::Error),
    #[error("failed to write summary: {0}")]
    Output(#[source] io::Error),
}

#[derive(Debug)]
enum Command {
    Receive(Utf8PathBuf),
    Pending,
    Resync,
}

fn main() -> Result<(), BoxError> {
    let config = JobflowConfig::from_env()?;
    jobflow::telemetry::init(&config.log_filter)?;
    let command = parse_args(env::args().skip(1))?;
    run(&config, command).map_err(Into::into)
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Command, BatchError> {
    let command = match args.next().as_deref() {
        Some("receive") => {
            let path = args
                .next()
                .ok_or_else(|| BatchError::InvalidArgs("missing batch path argument".into()))?;
            Command::Receive(Utf8PathBuf::from(path))
        }
        Some("pending") => Command::Pending,
        Some("resync") => Command::Resync,
        Some(other) => {
            return Err(BatchError::InvalidArgs(format!(
                "unknown command '{other}'; expected receive, pending, or resync"
            )));
        }
        None => return Err(BatchError::InvalidArgs("missing command argument".into())),
    };
    if let Some(extra) = args.next() {
        return Err(BatchError::InvalidArgs(format!(
            "unexpected extra argument: {extra}"
        )));
    }
    Ok(command)
}

fn run(config: &JobflowConfig, command: Command) -> Result<(), BatchError> {
    let database_url = config.require_database_url()?;
    let pool = Pool::builder()
        .build(ConnectionManager::<PgConnection>::new(database_url))
        .map_err(BatchError::Pool)?;
    let service = PgIngestionService::new(
        Arc::new(PostgresJobRepository::new(pool.clone())),
        Arc::new(PostgresSubmissionRepository::new(pool.clone())),
        Arc::new(PostgresMaterialRepository::new(pool)),
        Arc::new(DefaultClock),
        Arc::new(RandomNoteIds),
    )
    .with_transformer(SubmissionTransformer::new(config.questions.clone()))
    .with_retry_config(config.write_retry);

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(BatchError::RuntimeInit)?;
    let summary = runtime.block_on(async {
        match command {
            Command::Receive(path) => receive_and_ingest(&service, &path).await,
            Command::Pending => Ok(service.ingest_pending().await?),
            Command::Resync => Ok(service.resync_linked().await?),
        }
    })?;
    write_summary(&summary)
}

async fn receive_and_ingest(
    service: &PgIngestionService,
    path: &Utf8Path,
) -> Result<IngestionSummary, BatchError> {
    let batch = load_batch(path)?;
    let mut received = Vec::with_capacity(batch.len());
    for incoming in batch {
        let submission_id = incoming.submission_id.clone();
        match service.receive(incoming).await {
            Ok(submission) => received.push(submission),
            Err(err) => {
                warn!(submission_id = %submission_id, error = %err, "submission not stored");
            }
        }
    }
    Ok(service.ingest(&received).await)
}

fn load_batch(path: &Utf8Path) -> Result<Vec<IncomingSubmission>, BatchError> {
    let bytes = std::fs::read(path.as_std_path()).map_err(|source| BatchError::BatchRead {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(BatchError::BatchParse)
}

fn write_summary(summary: &IngestionSummary) -> Result<(), BatchError> {
    let rendered = serde_json::to_string_pretty(summary).map_err(BatchError::Render)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}").map_err(BatchError::Output)
}
