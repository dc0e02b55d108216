use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::interval;
use tracing::{error, info, warn};

use crate::core::Result;
use crate::modules::loans::repositories::InstallmentRepository;
use crate::modules::notifications::services::messages;
use crate::modules::notifications::NotificationSink;

/// Outcome of a single sweep run
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SweepSummary {
    /// Past-due pending installments the scan found
    pub scanned: usize,
    /// Installments this run actually moved to overdue
    pub marked_overdue: usize,
}

/// Daily batch job flagging past-due installments
///
/// Idempotent: only a winning pending -> overdue transition fires a
/// notification, so re-running on the same day changes nothing. A single
/// installment's failure is logged and skipped rather than aborting the
/// sweep.
pub struct OverdueSweeper {
    installments: Arc<dyn InstallmentRepository>,
    notifications: Arc<dyn NotificationSink>,
}

impl OverdueSweeper {
    pub fn new(
        installments: Arc<dyn InstallmentRepository>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            installments,
            notifications,
        }
    }

    /// Run one sweep: anything pending with a due date strictly before today
    /// becomes overdue and the loan's owner is notified
    pub async fn run_overdue_sweep(&self) -> Result<SweepSummary> {
        let today = chrono::Utc::now().date_naive();

        info!(%today, "overdue sweep started");

        let due = self.installments.pending_due_before(today).await?;
        let scanned = due.len();
        let mut marked_overdue = 0;

        for candidate in due {
            match self
                .installments
                .mark_overdue_if_pending(&candidate.installment_id)
                .await
            {
                Ok(true) => {
                    marked_overdue += 1;

                    warn!(
                        loan_id = %candidate.loan_id,
                        installment = candidate.installment_number,
                        due_date = %candidate.due_date,
                        "installment marked overdue"
                    );

                    if let Err(e) = self
                        .notifications
                        .notify(
                            &candidate.user_id,
                            &messages::loan_overdue(),
                            messages::LOAN_CATEGORY,
                        )
                        .await
                    {
                        warn!(
                            user_id = %candidate.user_id,
                            error = %e,
                            "failed to record overdue notification"
                        );
                    }
                }
                // Lost the race to a repayment or an earlier sweep; nothing to do
                Ok(false) => {}
                // One bad record must not block the rest of the sweep
                Err(e) => {
                    error!(
                        installment_id = %candidate.installment_id,
                        error = %e,
                        "failed to process installment, continuing sweep"
                    );
                }
            }
        }

        info!(scanned, marked_overdue, "overdue sweep completed");

        Ok(SweepSummary {
            scanned,
            marked_overdue,
        })
    }

    /// Run the sweep on a fixed period until shutdown is signalled
    ///
    /// Spawned as a tokio task from the composition root; the first sweep
    /// fires immediately on startup.
    pub async fn start(
        self: Arc<Self>,
        period: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!(?period, "overdue sweeper started");

        let mut ticker = interval(period);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_overdue_sweep().await {
                        error!(error = %e, "overdue sweep failed");
                    }
                }
                _ = shutdown.changed() => {
                    info!("overdue sweeper stopping");
                    break;
                }
            }
        }
    }
}
