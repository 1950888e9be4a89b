//! # Dedicated home thread.
//!
//! [`spawn_home`] starts a named OS thread, binds it as the dispatcher's home,
//! and keeps the home state on it until shutdown. The state never leaves that
//! thread while the loop runs; it is handed back through [`HomeThread::join`].

use std::fmt;
use std::thread;

use tokio_util::sync::CancellationToken;
use tracing::info;

use super::dispatcher::{channel, Dispatcher};
use crate::error::RuntimeError;

/// Owner handle of a running home thread.
pub struct HomeThread<S> {
    name: String,
    handle: thread::JoinHandle<S>,
}

impl<S> fmt::Debug for HomeThread<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HomeThread")
            .field("name", &self.name)
            .field("finished", &self.handle.is_finished())
            .finish()
    }
}

impl<S> HomeThread<S> {
    /// Name given to the OS thread.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True once the home loop has returned.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Blocks until the home loop returns and yields the final state.
    ///
    /// Only returns after the dispatcher was shut down (or every dispatcher
    /// handle was dropped).
    pub fn join(self) -> Result<S, RuntimeError> {
        let name = self.name;
        self.handle
            .join()
            .map_err(|_| RuntimeError::HomePanicked { name })
    }
}

/// Spawns a home thread that owns `state` and returns the dispatcher feeding it.
///
/// The single-threaded runtime is built before the thread starts, so setup
/// failures surface here as [`RuntimeError::HomeThread`].
pub fn spawn_home<S>(
    name: impl Into<String>,
    token: CancellationToken,
    state: S,
) -> Result<(Dispatcher<S>, HomeThread<S>), RuntimeError>
where
    S: Send + 'static,
{
    let name = name.into();
    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    let (dispatcher, home) = channel(token);

    let handle = thread::Builder::new()
        .name(name.clone())
        .spawn(move || runtime.block_on(home.run(state)))?;

    info!(thread = %name, "home thread started");
    Ok((dispatcher, HomeThread { name, handle }))
}
