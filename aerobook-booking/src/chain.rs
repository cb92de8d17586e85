use aerobook_core::{BookingStatus, StatusUpdateStrategy, StrategyKind};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "result", content = "error")]
pub enum AttemptOutcome {
    Succeeded,
    Failed(String),
}

/// One strategy invocation within a single chain run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusUpdateAttempt {
    pub strategy: StrategyKind,
    pub outcome: AttemptOutcome,
}

/// Every strategy failed. Carries the attempts in the order they ran.
#[derive(Debug, Clone)]
pub struct ChainExhausted {
    pub attempts: Vec<StatusUpdateAttempt>,
    pub last_error: String,
}

/// Ordered list of status-write strategies, tried one after another until one succeeds.
///
/// Each strategy runs at most once per [`run`](Self::run) and never concurrently with
/// another; a later strategy only starts once the previous one has reported failure.
#[derive(Clone)]
pub struct StatusUpdateChain {
    strategies: Vec<Arc<dyn StatusUpdateStrategy>>,
}

impl StatusUpdateChain {
    pub fn new(strategies: Vec<Arc<dyn StatusUpdateStrategy>>) -> Self {
        Self { strategies }
    }

    pub async fn run(
        &self,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> Result<Vec<StatusUpdateAttempt>, ChainExhausted> {
        let mut attempts = Vec::with_capacity(self.strategies.len());
        let mut last_error = String::from("no status update strategies configured");

        for strategy in &self.strategies {
            let kind = strategy.kind();
            match strategy.attempt(booking_id, status).await {
                Ok(()) => {
                    info!("Booking {} set to {} via {} strategy", booking_id, status, kind);
                    attempts.push(StatusUpdateAttempt {
                        strategy: kind,
                        outcome: AttemptOutcome::Succeeded,
                    });
                    return Ok(attempts);
                }
                Err(e) => {
                    warn!("{} status update for booking {} failed: {}", kind, booking_id, e);
                    last_error = e.to_string();
                    attempts.push(StatusUpdateAttempt {
                        strategy: kind,
                        outcome: AttemptOutcome::Failed(last_error.clone()),
                    });
                }
            }
        }

        Err(ChainExhausted { attempts, last_error })
    }
}
