//! Explicit "shared chrome is ready" hook for page-specific setup.

use std::fmt;

type ReadyCallback<C> = Box<dyn FnOnce(&mut C)>;

/// Runs page-specific setup exactly once, after the shared chrome is ready.
///
/// Callbacks registered before [`notify_ready`](Self::notify_ready) are
/// queued and run in registration order; callbacks registered afterwards run
/// immediately.
pub struct PageSetup<C> {
    ready: bool,
    pending: Vec<ReadyCallback<C>>,
}

impl<C> Default for PageSetup<C> {
    fn default() -> Self {
        Self {
            ready: false,
            pending: Vec::new(),
        }
    }
}

impl<C> fmt::Debug for PageSetup<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageSetup")
            .field("ready", &self.ready)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl<C> PageSetup<C> {
    /// Creates a setup hook that is not ready yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the chrome has reported ready.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    /// Registers a callback; runs it right away if already ready.
    pub fn on_ready<F>(&mut self, ctx: &mut C, callback: F)
    where
        F: FnOnce(&mut C) + 'static,
    {
        if self.ready {
            callback(ctx);
        } else {
            self.pending.push(Box::new(callback));
        }
    }

    /// Marks the chrome ready and runs queued callbacks.
    ///
    /// Returns how many callbacks ran; later calls return 0.
    pub fn notify_ready(&mut self, ctx: &mut C) -> usize {
        if self.ready {
            return 0;
        }
        self.ready = true;
        let pending = std::mem::take(&mut self.pending);
        let count = pending.len();
        for callback in pending {
            callback(ctx);
        }
        count
    }
}
