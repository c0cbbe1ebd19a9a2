//! Graceful shutdown handling.

use log::warn;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancels `token` on the first Ctrl-C.
///
/// A running import stops before its next batch; a job poll detaches while
/// the job keeps running on the server.
pub fn spawn_ctrl_c_handler(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; finishing the current request and stopping");
            token.cancel();
        }
    })
}

/// Shuts down background tasks gracefully.
///
/// Stops the progress logger and waits for it, then aborts the status server
/// if one was started.
pub async fn shutdown_gracefully(
    logger_cancel: CancellationToken,
    logging_task: Option<JoinHandle<()>>,
    status_server: Option<JoinHandle<()>>,
) {
    logger_cancel.cancel();
    if let Some(logging_task) = logging_task {
        let _ = logging_task.await;
    }

    if let Some(server) = status_server {
        server.abort();
    }
}
