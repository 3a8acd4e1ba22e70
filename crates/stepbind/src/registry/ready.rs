//! One-shot readiness signal raised when discovery completes.

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

type ReadyCallback = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct ReadyState {
    ready: bool,
    callbacks: Vec<ReadyCallback>,
}

#[derive(Default)]
struct Shared {
    state: Mutex<ReadyState>,
    condvar: Condvar,
}

/// Cloneable handle observing a registry's readiness.
///
/// The signal fires exactly once. Waiters block until it fires; callbacks
/// registered after it fired run immediately.
///
/// # Examples
///
/// ```
/// use stepbind::BindingRegistry;
///
/// let mut registry = BindingRegistry::new();
/// let signal = registry.ready_signal();
/// let waiter = std::thread::spawn(move || signal.wait());
/// registry.mark_ready()?;
/// waiter.join().expect("waiter thread");
/// # Ok::<(), stepbind::RegistryError>(())
/// ```
#[derive(Clone, Default)]
pub struct ReadySignal {
    shared: Arc<Shared>,
}

impl ReadySignal {
    fn lock(&self) -> MutexGuard<'_, ReadyState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` once the signal has fired.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.lock().ready
    }

    /// Block until the signal fires.
    pub fn wait(&self) {
        let mut state = self.lock();
        while !state.ready {
            state = self
                .shared
                .condvar
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Block until the signal fires or `timeout` elapses, returning whether
    /// it fired.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let state = self.lock();
        let (state, _) = self
            .shared
            .condvar
            .wait_timeout_while(state, timeout, |state| !state.ready)
            .unwrap_or_else(PoisonError::into_inner);
        state.ready
    }

    /// Run `callback` when the signal fires, or now if it already has.
    pub fn on_ready<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.lock();
        if state.ready {
            drop(state);
            callback();
        } else {
            state.callbacks.push(Box::new(callback));
        }
    }

    /// Fire the signal. Returns `false` when it had already fired.
    pub(crate) fn fire(&self) -> bool {
        let callbacks = {
            let mut state = self.lock();
            if state.ready {
                return false;
            }
            state.ready = true;
            std::mem::take(&mut state.callbacks)
        };
        self.shared.condvar.notify_all();
        for callback in callbacks {
            callback();
        }
        true
    }
}

impl fmt::Debug for ReadySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadySignal")
            .field("ready", &self.is_ready())
            .finish()
    }
}
