use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// How a single delivery attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The endpoint answered with a 2xx status.
    Delivered { status: u16 },
    /// The endpoint answered with a non-2xx status.
    Rejected { status: u16 },
    /// No response was obtained (connection failure, timeout, ...).
    Failed { reason: String, timed_out: bool },
    /// The delivery was aborted, or the dispatcher shut down first.
    Cancelled,
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }
}

impl std::fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryOutcome::Delivered { status } => write!(f, "delivered ({status})"),
            DeliveryOutcome::Rejected { status } => write!(f, "rejected ({status})"),
            DeliveryOutcome::Failed { reason, timed_out: true } => write!(f, "timed out: {reason}"),
            DeliveryOutcome::Failed { reason, .. } => write!(f, "failed: {reason}"),
            DeliveryOutcome::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A submitted delivery.
///
/// Dropping the handle detaches it; the delivery still runs to completion.
#[derive(Debug)]
pub struct DispatchHandle {
    task: JoinHandle<DeliveryOutcome>,
    runtime: Handle,
}

impl DispatchHandle {
    pub(crate) fn new(task: JoinHandle<DeliveryOutcome>, runtime: Handle) -> Self {
        Self { task, runtime }
    }

    /// Cancels the delivery if it has not completed yet.
    pub fn abort(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Resolves once the delivery has ended.
    pub async fn outcome(self) -> DeliveryOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => DeliveryOutcome::Cancelled,
            Err(e) => DeliveryOutcome::Failed {
                reason: format!("delivery task panicked: {e}"),
                timed_out: false,
            },
        }
    }

    /// Blocks the calling thread until the delivery has ended.
    ///
    /// This is an explicit opt-in for callers that want to observe the
    /// outcome synchronously. It must not be used on the host's packet
    /// pipeline, and panics if called from inside an async context.
    pub fn wait(self) -> DeliveryOutcome {
        let runtime = self.runtime.clone();
        runtime.block_on(self.outcome())
    }
}
