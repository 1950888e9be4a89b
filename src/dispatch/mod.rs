//! Thread-affine dispatch: types and the home thread.
//!
//! ## Contents
//! - [`Dispatcher`], [`HomeLoop`], [`channel`]: the producer/consumer pair
//! - [`HomeThread`], [`spawn_home`]: a dedicated OS thread driving the loop
//!
//! ## Quick reference
//! - **Producers**: signal handlers on worker threads, the orchestrator, and
//!   the home thread itself (re-entrant posts are queued).
//! - **Consumer**: exactly one [`HomeLoop`], which owns the home state.

mod dispatcher;
mod home;

pub(crate) use dispatcher::panic_message;
pub use dispatcher::{channel, Dispatcher, HomeLoop};
pub use home::{spawn_home, HomeThread};
