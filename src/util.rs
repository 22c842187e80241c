use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::error::{JigError, JigResult};

/// Run `call` on a helper thread and wait at most `timeout` for it. A call
/// that overruns is left to finish on its own; its result is discarded.
pub(crate) fn with_timeout<T, F>(timeout: Duration, call: F) -> JigResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> JigResult<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("robot-call".to_string())
        .spawn(move || {
            let _ = tx.send(call());
        })
        .map_err(|e| JigError::Communication(format!("Failed to start robot call: {}", e)))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(JigError::Timeout(timeout)),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(JigError::Communication(
            "Robot call ended without a result".to_string(),
        )),
    }
}
