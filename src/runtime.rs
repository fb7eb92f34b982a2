//! Runtime abstraction layer for async operations
//!
//! Tile fetches are the only asynchronous work in the crate. They are spawned
//! fire-and-forget through an [`AsyncSpawner`] so hosts can plug in their own
//! executor; the default spawns onto the ambient tokio runtime.

use crate::{MapError, Result};
use futures::future::BoxFuture;
use std::sync::OnceLock;

/// A trait for spawning async tasks (object-safe version)
pub trait AsyncSpawner: Send + Sync + 'static {
    /// Spawn a future and return a handle to it
    fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Result<Box<dyn AsyncHandle>>;
}

/// Handle to a spawned async task
pub trait AsyncHandle: Send + Sync {
    /// Check if the task is finished
    fn is_finished(&self) -> bool;

    /// Cancel the task
    fn cancel(&self);
}

/// Convenience function for spawning with type safety
pub fn spawn<F>(future: F) -> Result<Box<dyn AsyncHandle>>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    runtime().spawn_boxed(Box::pin(future))
}

/// Default spawner implementations
pub mod spawners {
    use super::*;
    use tokio::runtime::Handle;
    use tokio::task::JoinHandle;

    /// Tokio-based async spawner.
    ///
    /// Without a pinned handle it spawns onto whichever runtime is current on
    /// the calling thread, and reports an error when there is none.
    #[derive(Debug, Clone, Default)]
    pub struct TokioSpawner {
        handle: Option<Handle>,
    }

    impl TokioSpawner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Always spawn onto `handle`, e.g. a runtime owned by the host
        pub fn with_handle(handle: Handle) -> Self {
            Self {
                handle: Some(handle),
            }
        }
    }

    impl AsyncSpawner for TokioSpawner {
        fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Result<Box<dyn AsyncHandle>> {
            let handle = match &self.handle {
                Some(handle) => handle.clone(),
                None => Handle::try_current().map_err(|e| MapError::Runtime(e.to_string()))?,
            };
            Ok(Box::new(TokioHandle(handle.spawn(future))))
        }
    }

    struct TokioHandle(JoinHandle<()>);

    impl AsyncHandle for TokioHandle {
        fn is_finished(&self) -> bool {
            self.0.is_finished()
        }

        fn cancel(&self) {
            self.0.abort();
        }
    }
}

/// Global runtime instance
static RUNTIME: OnceLock<Box<dyn AsyncSpawner>> = OnceLock::new();

/// Initialize the runtime with a specific spawner.
///
/// Only the first call takes effect; returns false if a spawner was already set.
pub fn init_runtime(spawner: Box<dyn AsyncSpawner>) -> bool {
    RUNTIME.set(spawner).is_ok()
}

/// Get the global runtime spawner
pub fn runtime() -> &'static dyn AsyncSpawner {
    RUNTIME
        .get_or_init(|| Box::new(spawners::TokioSpawner::new()))
        .as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_tokio_spawner() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let handle = spawn(async move {
            flag.store(true, Ordering::SeqCst);
        })
        .unwrap();

        for _ in 0..100 {
            if handle.is_finished() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert!(handle.is_finished());
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_spawn_outside_runtime_is_an_error() {
        let spawner = spawners::TokioSpawner::new();
        let result = spawner.spawn_boxed(Box::pin(async {}));
        assert!(matches!(result, Err(MapError::Runtime(_))));
    }

    #[test]
    fn test_pinned_handle_spawns_from_any_thread() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let spawner = spawners::TokioSpawner::with_handle(rt.handle().clone());
        let (tx, rx) = std::sync::mpsc::channel();
        spawner
            .spawn_boxed(Box::pin(async move {
                let _ = tx.send(7);
            }))
            .unwrap();
        assert_eq!(rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap(), 7);
    }
}
