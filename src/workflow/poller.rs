use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::PollError;
use super::state::WorkflowState;
use crate::gateway::PaymentGateway;
use crate::model::{PaymentStatus, Pid};

/// Why a polling loop ended.
#[derive(Debug)]
pub enum PollExit {
    /// The processor reported a status other than `processing`.
    Settled(PaymentStatus),
    /// The workflow status left `processing` through another path.
    Superseded(PaymentStatus),
    /// The loop's token was cancelled.
    Cancelled,
    /// A status check failed; the workflow status is now `failed`.
    Failed(PollError),
}

/// Starts status polling loops for submitted payments.
#[derive(Clone)]
pub struct Poller {
    gateway: Arc<dyn PaymentGateway>,
    state: WorkflowState,
    interval: Duration,
}

/// A running polling loop for one payment.
#[derive(Debug)]
pub struct PollHandle {
    pid: Pid,
    cancel: CancellationToken,
    task: JoinHandle<PollExit>,
}

impl PollHandle {
    pub fn pid(&self) -> &Pid {
        &self.pid
    }

    /// Stop the loop at its next suspension point. A check already
    /// answered when the token fires is discarded rather than written.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the loop to end.
    pub async fn join(self) -> PollExit {
        match self.task.await {
            Ok(exit) => exit,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => PollExit::Cancelled,
        }
    }
}

/// Shortest interval between two status checks.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

impl Poller {
    /// An `interval` shorter than [`MIN_POLL_INTERVAL`] is raised to it.
    pub fn new(gateway: Arc<dyn PaymentGateway>, state: WorkflowState, interval: Duration) -> Self {
        if interval < MIN_POLL_INTERVAL {
            warn!(
                interval_ms = interval.as_millis() as u64,
                min_ms = MIN_POLL_INTERVAL.as_millis() as u64,
                "poll interval too short, raising to minimum"
            );
        }
        Self {
            gateway,
            state,
            interval: interval.max(MIN_POLL_INTERVAL),
        }
    }

    /// Spawn the polling loop for `pid`. The first check happens one
    /// interval from now.
    pub fn start(&self, pid: Pid) -> PollHandle {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(self.clone().run(pid.clone(), cancel.clone()));
        debug!(pid = %pid, interval_ms = self.interval.as_millis() as u64, "polling started");
        PollHandle { pid, cancel, task }
    }

    async fn run(self, pid: Pid, cancel: CancellationToken) -> PollExit {
        let mut ticks = interval_at(Instant::now() + self.interval, self.interval);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.exit(&pid, PollExit::Cancelled),
                _ = ticks.tick() => {}
            }

            // the status may have moved while we slept
            let current = self.state.status();
            if current != PaymentStatus::Processing {
                return self.exit(&pid, PollExit::Superseded(current));
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.exit(&pid, PollExit::Cancelled),
                result = self.gateway.check(&pid) => result,
            };
            if cancel.is_cancelled() {
                return self.exit(&pid, PollExit::Cancelled);
            }

            match result {
                Ok(PaymentStatus::Processing) => {
                    debug!(pid = %pid, "payment still processing");
                }
                Ok(status) => {
                    self.state.set(status);
                    return self.exit(&pid, PollExit::Settled(status));
                }
                Err(e) => {
                    self.state.set(PaymentStatus::Failed);
                    return self.exit(&pid, PollExit::Failed(PollError(e)));
                }
            }
        }
    }

    fn exit(&self, pid: &Pid, exit: PollExit) -> PollExit {
        match &exit {
            PollExit::Settled(status) => info!(pid = %pid, status = %status, "payment settled"),
            PollExit::Superseded(status) => {
                info!(pid = %pid, status = %status, "polling stopped, status changed elsewhere")
            }
            PollExit::Cancelled => debug!(pid = %pid, "polling cancelled"),
            PollExit::Failed(e) => warn!(pid = %pid, reason = %e, "polling failed"),
        }
        exit
    }
}
