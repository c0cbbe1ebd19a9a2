//! Background polling task with scoped lifetime.

use std::sync::Arc;

use log::error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{CheckAllPoller, PollOutcome};

/// Owns a spawned polling loop. Dropping the guard stops the loop.
pub struct PollerGuard {
    token: CancellationToken,
    handle: Option<JoinHandle<PollOutcome>>,
}

/// Runs `poller.run` on the tokio runtime.
pub fn spawn(poller: Arc<CheckAllPoller>) -> PollerGuard {
    spawn_with_token(poller, CancellationToken::new())
}

/// Like `spawn`, but the loop also stops when `parent` is cancelled.
pub fn spawn_scoped(poller: Arc<CheckAllPoller>, parent: &CancellationToken) -> PollerGuard {
    spawn_with_token(poller, parent.child_token())
}

fn spawn_with_token(poller: Arc<CheckAllPoller>, token: CancellationToken) -> PollerGuard {
    let loop_token = token.clone();
    let handle = tokio::spawn(async move { poller.run(&loop_token).await });
    PollerGuard {
        token,
        handle: Some(handle),
    }
}

impl PollerGuard {
    /// Token that stops the loop when cancelled.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Waits for the loop to end and returns how it ended.
    pub async fn join(mut self) -> PollOutcome {
        let Some(handle) = self.handle.take() else {
            return PollOutcome::Stopped;
        };
        match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Check-all polling task failed: {}", e);
                PollOutcome::Stopped
            }
        }
    }
}

impl Drop for PollerGuard {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
