//! Ordered forward/compensate step transaction with best-effort rollback.
//!
//! Every volume creator builds one of these instead of issuing resource-API
//! calls directly: each provisioning step is registered with its
//! compensator up front, so a failure partway through a multi-call create
//! path (filesystem, then share, then quota, then QoS, ...) can be unwound
//! without hand-written cleanup code at each call site.

use std::{future::Future, pin::Pin, sync::Arc};

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

type AsyncStep = Arc<dyn Fn() -> Pin<Box<dyn Future<Output = Result<()>> + Send>> + Send + Sync>;

struct Step {
    label: String,
    forward: AsyncStep,
    compensate: AsyncStep,
}

/// Transaction lifecycle state. [`State::Committed`], [`State::RolledBack`],
/// and [`State::Poisoned`] are terminal: no further `Then`, `Commit`, or
/// `Rollback` call is valid once reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Building,
    Committed,
    Failed,
    RolledBack,
    Poisoned,
}

/// An ordered sequence of `(forward, compensate)` steps.
pub struct Transaction {
    steps: Vec<Step>,
    completed: Vec<usize>,
    state: State,
    cancel: CancellationToken,
}

impl Transaction {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            steps: Vec::new(),
            completed: Vec::new(),
            state: State::Building,
            cancel,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Registers a step. Panics if called after [`Transaction::commit`] has
    /// run — building a transaction step list after it started executing is
    /// always a caller bug, not a recoverable condition.
    pub fn then<F, C, Ff, Cf>(&mut self, label: impl Into<String>, forward: F, compensate: C)
    where
        F: Fn() -> Ff + Send + Sync + 'static,
        Ff: Future<Output = Result<()>> + Send + 'static,
        C: Fn() -> Cf + Send + Sync + 'static,
        Cf: Future<Output = Result<()>> + Send + 'static,
    {
        assert_eq!(
            self.state,
            State::Building,
            "cannot add a step to a transaction that has already started"
        );
        self.steps.push(Step {
            label: label.into(),
            forward: Arc::new(move || Box::pin(forward())),
            compensate: Arc::new(move || Box::pin(compensate())),
        });
    }

    /// Runs every registered forward step in order. Stops at the first
    /// failure (or cancellation) without running that step's compensator —
    /// only completed steps are eligible for rollback.
    pub async fn commit(&mut self) -> Result<()> {
        assert_eq!(self.state, State::Building, "transaction already executed");

        for (idx, step) in self.steps.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!(step = %step.label, "transaction cancelled before step ran");
                self.state = State::Failed;
                return Err(anyhow::anyhow!("transaction cancelled at step {}", step.label));
            }
            match (step.forward)().await {
                Ok(()) => self.completed.push(idx),
                Err(e) => {
                    warn!(step = %step.label, error = %e, "transaction step failed");
                    self.state = State::Failed;
                    return Err(e.context(format!("transaction step {} failed", step.label)));
                }
            }
        }
        self.state = State::Committed;
        Ok(())
    }

    /// Runs the compensators of every completed step, in reverse order. A
    /// compensator failure does not stop the sweep — every remaining
    /// compensator still gets a chance to run — but it does poison the
    /// transaction, signalling that manual cleanup may be required.
    pub async fn rollback(&mut self) -> Result<()> {
        assert_eq!(
            self.state,
            State::Failed,
            "rollback is only valid after a failed commit"
        );

        let mut poisoned = false;
        for &idx in self.completed.iter().rev() {
            let step = &self.steps[idx];
            if let Err(e) = (step.compensate)().await {
                error!(step = %step.label, error = %e, "compensator failed, transaction poisoned");
                poisoned = true;
            }
        }

        self.state = if poisoned {
            State::Poisoned
        } else {
            State::RolledBack
        };

        if poisoned {
            Err(anyhow::anyhow!(
                "one or more compensators failed; backend state may be inconsistent"
            ))
        } else {
            Ok(())
        }
    }

    /// Runs [`Transaction::commit`] and, on failure, immediately
    /// [`Transaction::rollback`]s. Returns the original commit error even
    /// when rollback succeeds, since the caller's operation still failed.
    pub async fn commit_or_rollback(&mut self) -> Result<()> {
        if let Err(commit_err) = self.commit().await {
            if let Err(rollback_err) = self.rollback().await {
                error!(
                    commit_error = %commit_err,
                    rollback_error = %rollback_err,
                    "commit failed and rollback also failed"
                );
            }
            return Err(commit_err);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn commit_runs_all_steps_in_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut txn = Transaction::new(CancellationToken::new());

        for i in 0..3 {
            let order = order.clone();
            txn.then(
                format!("step-{i}"),
                move || {
                    let order = order.clone();
                    async move {
                        order.lock().unwrap().push(i);
                        Ok(())
                    }
                },
                || async { Ok(()) },
            );
        }

        txn.commit().await.unwrap();
        assert_eq!(txn.state(), State::Committed);
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn failed_commit_rolls_back_completed_steps_in_reverse() {
        let undone = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut txn = Transaction::new(CancellationToken::new());

        for i in 0..2 {
            let undone = undone.clone();
            txn.then(
                format!("ok-{i}"),
                || async { Ok(()) },
                move || {
                    let undone = undone.clone();
                    async move {
                        undone.lock().unwrap().push(i);
                        Ok(())
                    }
                },
            );
        }
        txn.then(
            "boom",
            || async { Err(anyhow::anyhow!("network error")) },
            || async { Ok(()) },
        );

        let err = txn.commit_or_rollback().await.unwrap_err();
        assert!(err.to_string().contains("boom"));
        assert_eq!(txn.state(), State::RolledBack);
        assert_eq!(*undone.lock().unwrap(), vec![1, 0]);
    }

    #[tokio::test]
    async fn poisoned_when_a_compensator_fails() {
        let mut txn = Transaction::new(CancellationToken::new());
        txn.then(
            "ok",
            || async { Ok(()) },
            || async { Err(anyhow::anyhow!("cleanup failed")) },
        );
        txn.then(
            "boom",
            || async { Err(anyhow::anyhow!("network error")) },
            || async { Ok(()) },
        );

        txn.commit_or_rollback().await.unwrap_err();
        assert_eq!(txn.state(), State::Poisoned);
    }

    #[tokio::test]
    async fn cancellation_stops_commit_before_next_step() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        let mut txn = Transaction::new(cancel.clone());

        let calls2 = calls.clone();
        txn.then(
            "first",
            move || {
                let calls2 = calls2.clone();
                async move {
                    calls2.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            },
            || async { Ok(()) },
        );
        cancel.cancel();
        let calls3 = calls.clone();
        txn.then(
            "second",
            move || {
                let calls3 = calls3.clone();
                async move {
                    calls3.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            },
            || async { Ok(()) },
        );

        txn.commit().await.unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
