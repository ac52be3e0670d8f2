// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Counted completion signal for one pipeline tier.

use std::sync::Arc;

use tokio::sync::watch;

/// Producers register before they start and finish through a [`WaitGuard`];
/// consumers block in [`WaitGroup::wait`] until the count drops to zero.
///
/// A child must be registered before its parent's guard is dropped,
/// otherwise a waiter can observe zero in between.
#[derive(Debug, Clone)]
pub struct WaitGroup {
    count: Arc<watch::Sender<usize>>,
}

impl Default for WaitGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl WaitGroup {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            count: Arc::new(tx),
        }
    }

    /// Registers one producer. Dropping the guard marks it done.
    pub fn enter(&self) -> WaitGuard {
        self.count.send_modify(|c| *c += 1);
        WaitGuard {
            group: self.clone(),
        }
    }

    /// Producers still running.
    pub fn pending(&self) -> usize {
        *self.count.borrow()
    }

    /// Resolves once every registered producer is done.
    pub async fn wait(&self) {
        let mut rx = self.count.subscribe();
        // The sender lives in `self`, so this cannot observe a closed channel.
        let _ = rx.wait_for(|c| *c == 0).await;
    }

    fn done(&self) {
        self.count.send_modify(|c| *c = c.saturating_sub(1));
    }
}

/// Marks one producer done when dropped, including on panic or cancellation.
#[derive(Debug)]
pub struct WaitGuard {
    group: WaitGroup,
}

impl Drop for WaitGuard {
    fn drop(&mut self) {
        self.group.done();
    }
}
