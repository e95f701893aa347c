//! Task spawners backed by a tokio runtime.

use crate::ports::TaskSpawner;
use futures::future::BoxFuture;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

impl TaskSpawner for Handle {
    fn spawn_long_lived(&self, name: &str, task: BoxFuture<'static, ()>) -> JoinHandle<()> {
        debug!("[bl-02] Spawning long-lived task '{}'", name);
        self.spawn(task)
    }
}

/// Spawner over an explicit runtime handle.
#[derive(Clone, Debug)]
pub struct TokioSpawner {
    handle: Handle,
}

impl TokioSpawner {
    /// Spawner on the given runtime.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Spawner on the runtime the caller is running in.
    ///
    /// Panics outside a tokio runtime, like [`Handle::current`].
    pub fn current() -> Self {
        Self::new(Handle::current())
    }
}

impl TaskSpawner for TokioSpawner {
    fn spawn_long_lived(&self, name: &str, task: BoxFuture<'static, ()>) -> JoinHandle<()> {
        self.handle.spawn_long_lived(name, task)
    }
}
