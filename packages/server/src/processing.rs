use std::time::Duration;

use chrono::Utc;
use common::TryOnStatus;
use common::retry::Backoff;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::TryOnConfig;
use crate::entity::try_on;

/// How a scheduled completion job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The record moved to `completed`.
    Completed,
    /// The record was re-processed or deleted after this job was scheduled.
    Superseded,
    /// Shutdown was requested before the job could finish.
    Cancelled,
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("completing try-on {try_on_id} failed after {attempts} attempts: {source}")]
    Exhausted {
        try_on_id: Uuid,
        attempts: u8,
        #[source]
        source: DbErr,
    },
}

/// Reported on the failure channel once a job gives up.
#[derive(Debug, Clone)]
pub struct ProcessingFailure {
    pub try_on_id: Uuid,
    pub attempts: u8,
    pub error: String,
}

/// Runs the simulated try-on processing step in the background.
///
/// Every job is tied to a single `(try_on_id, version)` pair; it only
/// completes the record while that version is still the current one.
#[derive(Clone)]
pub struct TryOnProcessor {
    db: DatabaseConnection,
    config: TryOnConfig,
    cancel: CancellationToken,
    failures: mpsc::UnboundedSender<ProcessingFailure>,
}

impl TryOnProcessor {
    /// Create a processor and the receiving end of its failure channel.
    pub fn new(
        db: DatabaseConnection,
        config: TryOnConfig,
    ) -> (Self, mpsc::UnboundedReceiver<ProcessingFailure>) {
        let (failures, rx) = mpsc::unbounded_channel();
        let processor = Self {
            db,
            config,
            cancel: CancellationToken::new(),
            failures,
        };
        (processor, rx)
    }

    /// Spawn the completion job for `try_on_id` at `version`.
    pub fn schedule(
        &self,
        try_on_id: Uuid,
        version: i32,
    ) -> JoinHandle<Result<Outcome, ProcessingError>> {
        let processor = self.clone();
        tokio::spawn(async move { processor.run(try_on_id, version).await })
    }

    /// Cancel all pending and future jobs.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    fn backoff(&self) -> Backoff {
        Backoff::new(self.config.retry_base_ms, self.config.retry_max_ms)
    }

    async fn run(&self, try_on_id: Uuid, version: i32) -> Result<Outcome, ProcessingError> {
        info!(%try_on_id, version, "Try-on processing started");

        let delay = Duration::from_secs(self.config.processing_delay_secs);
        tokio::select! {
            _ = self.cancel.cancelled() => {
                info!(%try_on_id, "Try-on processing cancelled");
                return Ok(Outcome::Cancelled);
            }
            _ = tokio::time::sleep(delay) => {}
        }

        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt: u8 = 0;

        loop {
            attempt += 1;

            match complete(&self.db, try_on_id, version).await {
                Ok(true) => {
                    info!(%try_on_id, attempt, "Try-on completed");
                    return Ok(Outcome::Completed);
                }
                Ok(false) => {
                    info!(%try_on_id, version, "Try-on superseded, skipping completion");
                    return Ok(Outcome::Superseded);
                }
                Err(e) if attempt < max_attempts => {
                    let backoff = self.backoff().delay(attempt);
                    warn!(
                        %try_on_id,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Try-on completion failed, retrying"
                    );
                    tokio::select! {
                        _ = self.cancel.cancelled() => {
                            info!(%try_on_id, attempt, "Try-on processing cancelled");
                            return Ok(Outcome::Cancelled);
                        }
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
                Err(e) => {
                    let failure = ProcessingFailure {
                        try_on_id,
                        attempts: attempt,
                        error: e.to_string(),
                    };
                    if self.failures.send(failure).is_err() {
                        warn!(%try_on_id, "Failure channel closed, dropping report");
                    }
                    return Err(ProcessingError::Exhausted {
                        try_on_id,
                        attempts: attempt,
                        source: e,
                    });
                }
            }
        }
    }
}

/// Mark the try-on completed if it is still processing at `version`.
/// Returns whether a row was updated.
async fn complete(db: &DatabaseConnection, try_on_id: Uuid, version: i32) -> Result<bool, DbErr> {
    let result = try_on::Entity::update_many()
        .col_expr(try_on::Column::Status, Expr::value(TryOnStatus::Completed))
        .col_expr(
            try_on::Column::ResultImage,
            Expr::col(try_on::Column::OriginalImage).into(),
        )
        .col_expr(try_on::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(try_on::Column::Id.eq(try_on_id))
        .filter(try_on::Column::Version.eq(version))
        .filter(try_on::Column::Status.eq(TryOnStatus::Processing))
        .filter(try_on::Column::Deleted.eq(false))
        .exec(db)
        .await?;

    Ok(result.rows_affected > 0)
}

/// Log every failure reported by the processor until all senders are gone.
pub async fn consume_failures(mut rx: mpsc::UnboundedReceiver<ProcessingFailure>) {
    while let Some(failure) = rx.recv().await {
        error!(
            try_on_id = %failure.try_on_id,
            attempts = failure.attempts,
            error = %failure.error,
            "Try-on processing failed"
        );
    }
}
