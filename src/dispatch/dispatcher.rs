//! # Dispatcher: serialized delivery onto one home thread.
//!
//! [`Dispatcher`] accepts callbacks from any thread and [`HomeLoop`] runs them,
//! one at a time, on the single thread that owns the home state `S`.
//!
//! ## Architecture
//! ```text
//! Producers (any thread):                       Home thread (one):
//!   worker thread 1 ──┐
//!   worker thread 2 ──┼── post(cb) ──► [unbounded mpsc] ──► HomeLoop::run(state)
//!   orchestrator    ──┤                 (global FIFO)          └─► cb(&mut state)
//!   home thread     ──┘
//! ```
//!
//! ## Rules
//! - **Fire-and-forget**: `post()` never blocks and never fails loudly.
//! - **Global FIFO**: callbacks run in the order `post()` calls were accepted,
//!   across all producer threads (one queue, one consumer).
//! - **Serialized**: callbacks never overlap; each runs to completion.
//! - **No inline fast path**: a post from the home thread is queued behind
//!   callbacks that were accepted before it.
//! - **Ownership**: `S` is only reachable as `&mut S` inside a callback, so it
//!   needs no lock.
//!
//! ## Shutdown
//! Cancelling the token passed to [`channel`] (or calling
//! [`Dispatcher::shutdown`]):
//! - rejects subsequent posts (silently for `post`, as
//!   [`DeliveryError::PostAfterShutdown`] for `try_post`);
//! - discards queued callbacks that have not started;
//! - lets the running callback finish; [`HomeLoop::run`] then returns the state.
//!
//! ## Panic handling
//! A panicking callback is caught with `catch_unwind` and logged; the loop moves
//! on to the next callback.
//!
//! **Warning**: `AssertUnwindSafe` is used, so a callback that panics halfway
//! through a mutation can leave `S` partially updated.

use std::any::Any;
use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};
use std::thread::{self, ThreadId};

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::DeliveryError;

type Callback<S> = Box<dyn FnOnce(&mut S) + Send + 'static>;

/// State shared by every dispatcher handle and the home loop.
struct Shared {
    /// Home thread identity, set once when the loop starts.
    home: OnceLock<ThreadId>,
    /// Shutdown signal.
    token: CancellationToken,
}

/// Creates a connected dispatcher/home-loop pair.
///
/// The [`Dispatcher`] half is cheap to clone and can be sent to any thread.
/// The [`HomeLoop`] half must be driven on the thread that is meant to own `S`.
pub fn channel<S>(token: CancellationToken) -> (Dispatcher<S>, HomeLoop<S>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let shared = Arc::new(Shared {
        home: OnceLock::new(),
        token,
    });
    (
        Dispatcher {
            tx,
            shared: Arc::clone(&shared),
        },
        HomeLoop { rx, shared },
    )
}

/// Handle used by producers to marshal work onto the home thread.
pub struct Dispatcher<S> {
    tx: mpsc::UnboundedSender<Callback<S>>,
    shared: Arc<Shared>,
}

impl<S> Clone for Dispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S> fmt::Debug for Dispatcher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("home", &self.shared.home.get())
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

impl<S> Dispatcher<S> {
    /// Queues `f` for execution on the home thread and returns immediately.
    ///
    /// After shutdown the callback is dropped without notice.
    pub fn post<F>(&self, f: F)
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        if let Err(e) = self.try_post(f) {
            trace!(reason = e.as_label(), "post dropped");
        }
    }

    /// Queues `f` for execution on the home thread.
    ///
    /// Returns [`DeliveryError::PostAfterShutdown`] if the dispatcher no longer
    /// accepts work.
    pub fn try_post<F>(&self, f: F) -> Result<(), DeliveryError>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        if self.shared.token.is_cancelled() {
            return Err(DeliveryError::PostAfterShutdown);
        }
        self.tx
            .send(Box::new(f))
            .map_err(|_| DeliveryError::PostAfterShutdown)
    }

    /// Runs `f` on the home thread and awaits its result.
    ///
    /// Because the queue is FIFO, the result also proves that every callback
    /// posted before this call has finished.
    ///
    /// ### Errors
    /// [`DeliveryError::PostAfterShutdown`] if the dispatcher is shut down, if
    /// shutdown discards the callback before it starts, or if it panics.
    ///
    /// ### Deadlock
    /// Never await this from inside a callback: the home thread would wait on
    /// itself.
    pub async fn invoke<F, R>(&self, f: F) -> Result<R, DeliveryError>
    where
        F: FnOnce(&mut S) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.try_post(move |state| {
            let _ = tx.send(f(state));
        })?;
        rx.await.map_err(|_| DeliveryError::PostAfterShutdown)
    }

    /// True when the caller must marshal through the dispatcher, i.e. it is
    /// not running on the home thread (or no home thread is bound yet).
    pub fn invoke_required(&self) -> bool {
        self.shared.home.get() != Some(&thread::current().id())
    }

    /// Identity of the bound home thread, if the loop has started.
    pub fn home_thread(&self) -> Option<ThreadId> {
        self.shared.home.get().copied()
    }

    /// Stops accepting posts and discards queued callbacks.
    pub fn shutdown(&self) {
        self.shared.token.cancel();
    }

    /// True once shutdown has been requested.
    pub fn is_shut_down(&self) -> bool {
        self.shared.token.is_cancelled()
    }
}

/// Consumer half of [`channel`]; owns the queue receiver.
pub struct HomeLoop<S> {
    rx: mpsc::UnboundedReceiver<Callback<S>>,
    shared: Arc<Shared>,
}

impl<S> HomeLoop<S> {
    /// Binds the current thread as home and drains the queue until shutdown.
    ///
    /// Returns the state once the loop stops, so the owner can inspect it.
    ///
    /// ### Notes
    /// The future must stay on one OS thread: drive it with `block_on` or a
    /// current-thread runtime. A work-stealing runtime could move it and break
    /// the home-thread binding.
    pub async fn run(mut self, mut state: S) -> S {
        let home = thread::current().id();
        let _ = self.shared.home.set(home);
        debug!(thread = ?home, "home loop bound");

        let token = self.shared.token.clone();
        let mut delivered: u64 = 0;
        loop {
            let callback = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                next = self.rx.recv() => match next {
                    Some(cb) => cb,
                    None => break,
                },
            };

            if let Err(panic_err) = panic::catch_unwind(AssertUnwindSafe(|| callback(&mut state)))
            {
                warn!(
                    info = %panic_message(panic_err.as_ref()),
                    "dispatched callback panicked"
                );
            }
            delivered += 1;
        }

        self.rx.close();
        let mut discarded: u64 = 0;
        while self.rx.try_recv().is_ok() {
            discarded += 1;
        }
        debug!(delivered, discarded, "home loop stopped");
        state
    }

    /// Runs the loop to completion on the current thread.
    ///
    /// Builds a single-threaded tokio runtime, so it must not be called from
    /// inside another runtime.
    pub fn run_blocking(self, state: S) -> io::Result<S> {
        let runtime = tokio::runtime::Builder::new_current_thread().build()?;
        Ok(runtime.block_on(self.run(state)))
    }
}

/// Best-effort extraction of a panic payload message.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    fn start<S: Send + 'static>(state: S) -> (Dispatcher<S>, thread::JoinHandle<S>) {
        let (dispatcher, home) = channel(CancellationToken::new());
        let handle = thread::spawn(move || home.run_blocking(state).expect("runtime"));
        (dispatcher, handle)
    }

    #[tokio::test]
    async fn callbacks_run_in_post_order_on_home_thread() {
        let (dispatcher, handle) = start(Vec::<u32>::new());

        for i in 0..100 {
            dispatcher.post(move |log: &mut Vec<u32>| log.push(i));
        }
        let home = dispatcher
            .invoke(|_: &mut Vec<u32>| thread::current().id())
            .await
            .expect("invoke");

        assert_eq!(dispatcher.home_thread(), Some(home));
        assert_ne!(home, thread::current().id());
        assert!(dispatcher.invoke_required());

        dispatcher.shutdown();
        let log = handle.join().expect("home thread");
        assert_eq!(log, (0..100).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn concurrent_producers_never_overlap() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (dispatcher, handle) = start(0usize);

        let producers: Vec<_> = (0..8)
            .map(|_| {
                let dispatcher = dispatcher.clone();
                let in_flight = Arc::clone(&in_flight);
                let peak = Arc::clone(&peak);
                thread::spawn(move || {
                    for _ in 0..50 {
                        let in_flight = Arc::clone(&in_flight);
                        let peak = Arc::clone(&peak);
                        dispatcher.post(move |count: &mut usize| {
                            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                            peak.fetch_max(now, Ordering::SeqCst);
                            *count += 1;
                            in_flight.fetch_sub(1, Ordering::SeqCst);
                        });
                    }
                })
            })
            .collect();
        for p in producers {
            p.join().expect("producer");
        }

        let total = dispatcher.invoke(|count: &mut usize| *count).await;
        assert_eq!(total, Ok(400));
        assert_eq!(peak.load(Ordering::SeqCst), 1);

        dispatcher.shutdown();
        handle.join().expect("home thread");
    }

    #[tokio::test]
    async fn per_thread_order_is_preserved() {
        let (dispatcher, handle) = start(Vec::<(usize, usize)>::new());

        let producers: Vec<_> = (0..4)
            .map(|t| {
                let dispatcher = dispatcher.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        dispatcher.post(move |log: &mut Vec<(usize, usize)>| log.push((t, i)));
                    }
                })
            })
            .collect();
        for p in producers {
            p.join().expect("producer");
        }
        let log = dispatcher
            .invoke(|log: &mut Vec<(usize, usize)>| log.clone())
            .await
            .expect("invoke");

        assert_eq!(log.len(), 100);
        for t in 0..4 {
            let seen: Vec<usize> = log.iter().filter(|(p, _)| *p == t).map(|(_, i)| *i).collect();
            assert_eq!(seen, (0..25).collect::<Vec<_>>(), "producer {t} reordered");
        }

        dispatcher.shutdown();
        handle.join().expect("home thread");
    }

    #[tokio::test]
    async fn post_after_shutdown_is_dropped() {
        let (dispatcher, handle) = start(0u32);
        dispatcher.shutdown();

        dispatcher.post(|n: &mut u32| *n += 1);
        assert_eq!(
            dispatcher.try_post(|n: &mut u32| *n += 1),
            Err(DeliveryError::PostAfterShutdown)
        );
        assert_eq!(
            dispatcher.invoke(|n: &mut u32| *n).await,
            Err(DeliveryError::PostAfterShutdown)
        );
        assert_eq!(handle.join().expect("home thread"), 0);
    }

    #[tokio::test]
    async fn panicking_callback_does_not_stop_the_loop() {
        let (dispatcher, handle) = start(0u32);

        dispatcher.post(|_: &mut u32| panic!("boom"));
        dispatcher.post(|n: &mut u32| *n += 1);
        assert_eq!(dispatcher.invoke(|n: &mut u32| *n).await, Ok(1));

        dispatcher.shutdown();
        assert_eq!(handle.join().expect("home thread"), 1);
    }

    #[test]
    fn queued_callbacks_are_discarded_on_shutdown() {
        let token = CancellationToken::new();
        let (dispatcher, home) = channel::<u32>(token.clone());

        dispatcher.post(|n| *n += 1);
        dispatcher.post(|n| *n += 1);
        token.cancel();

        // The loop starts after cancellation: nothing queued may run.
        let state = home.run_blocking(0).expect("runtime");
        assert_eq!(state, 0);
    }

    #[test]
    fn post_from_home_thread_is_queued_behind_earlier_posts() {
        let (dispatcher, home) = channel::<Vec<&'static str>>(CancellationToken::new());
        let inner = dispatcher.clone();

        dispatcher.post(move |log| {
            log.push(if inner.invoke_required() { "remote" } else { "first" });
            let stopper = inner.clone();
            inner.post(move |log| {
                log.push("nested");
                stopper.shutdown();
            });
        });
        dispatcher.post(|log| log.push("second"));

        let log = home.run_blocking(Vec::new()).expect("runtime");
        assert_eq!(log, vec!["first", "second", "nested"]);
    }

    #[test]
    fn running_callback_completes_when_shutdown_lands_mid_flight() {
        let (dispatcher, handle) = start(Vec::<&'static str>::new());
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();

        dispatcher.post(move |log: &mut Vec<&'static str>| {
            log.push("started");
            let _ = entered_tx.send(());
            let _ = release_rx.recv();
            log.push("finished");
        });
        dispatcher.post(|log: &mut Vec<&'static str>| log.push("queued"));

        entered_rx.recv().expect("callback entered");
        dispatcher.shutdown();
        release_tx.send(()).expect("release");

        assert_eq!(
            handle.join().expect("home thread"),
            vec!["started", "finished"]
        );
    }

    #[test]
    fn callback_that_shuts_down_still_runs_to_completion() {
        let (dispatcher, home) = channel::<Vec<&'static str>>(CancellationToken::new());
        let inner = dispatcher.clone();

        dispatcher.post(move |log| {
            inner.shutdown();
            log.push("after shutdown");
        });
        dispatcher.post(|log| log.push("queued"));

        let log = home.run_blocking(Vec::new()).expect("runtime");
        assert_eq!(log, vec!["after shutdown"]);
        assert!(dispatcher.is_shut_down());
    }

    #[test]
    fn panic_message_extracts_strings() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let borrowed: Box<dyn Any + Send> = Box::new("borrowed");
        let other: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(borrowed.as_ref()), "borrowed");
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
