use std::future::Future;

use tokio::task::JoinHandle;

/// Schedule work to run after the current synchronous work completes.
///
/// The equivalent of a zero-delay deferred callback: the future is handed
/// to the runtime and cannot run before the spawning turn yields control
/// on a current-thread scheduler. No other timing guarantee is made; on a
/// multi-threaded runtime the work may begin on another worker as soon as
/// it is queued.
pub fn defer<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(future)
}
