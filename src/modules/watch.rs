//! Scoped background tasks
//!
//! A `WatchHandle` owns a spawned task. Dropping it stops the task and
//! guarantees that no further results are emitted, even from a fetch that was
//! already in flight.

use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

/// Given to the task body; gates every result it emits
#[derive(Clone)]
pub struct Scope {
    live: Arc<Mutex<bool>>,
}

impl Scope {
    pub fn is_live(&self) -> bool {
        self.live.lock().map(|live| *live).unwrap_or(false)
    }

    /// Run `f` only if the handle is still alive. The check and the call are
    /// atomic with respect to dropping the handle.
    pub fn emit(&self, f: impl FnOnce()) -> bool {
        match self.live.lock() {
            Ok(live) if *live => {
                f();
                true
            }
            _ => false,
        }
    }
}

pub struct WatchHandle {
    live: Arc<Mutex<bool>>,
    task: JoinHandle<()>,
}

impl WatchHandle {
    /// Spawn `body` on the current Tokio runtime
    pub fn spawn<F, Fut>(body: F) -> Self
    where
        F: FnOnce(Scope) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let live = Arc::new(Mutex::new(true));
        let scope = Scope { live: live.clone() };
        let task = tokio::spawn(body(scope));
        Self { live, task }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        if let Ok(mut live) = self.live.lock() {
            *live = false;
        }
        self.task.abort();
    }
}
