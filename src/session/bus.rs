use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::{broadcast, watch};

use super::SessionRefreshRequester;
use crate::warning;

/// A single "forceSessionRefresh" request. Carries no payload besides the
/// sequence number used for acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSignal {
    pub seq: u64,
}

/// Process-wide channel through which any part of the application can ask the
/// session owner for a refresh.
///
/// Every publish is delivered to every subscriber, duplicates included. The
/// owner acknowledges a signal once its refresh is done; acknowledging a
/// sequence number also covers every earlier one.
#[derive(Debug)]
pub struct SessionRefreshBus {
    signals: broadcast::Sender<RefreshSignal>,
    completed: watch::Sender<u64>,
    last_seq: AtomicU64,
    wait: Duration,
}

impl SessionRefreshBus {
    /// `wait` bounds how long [`SessionRefreshRequester::request_refresh`] waits
    /// for an acknowledgement.
    pub fn new(wait: Duration) -> Self {
        let (signals, _) = broadcast::channel(64);
        let (completed, _) = watch::channel(0);
        Self {
            signals,
            completed,
            last_seq: AtomicU64::new(0),
            wait,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RefreshSignal> {
        self.signals.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.signals.receiver_count()
    }

    /// Broadcasts a refresh request without waiting for anyone.
    pub fn publish(&self) -> RefreshSignal {
        let signal = RefreshSignal {
            seq: self.last_seq.fetch_add(1, Ordering::SeqCst) + 1,
        };
        // no subscribers is not an error
        let _ = self.signals.send(signal);
        signal
    }

    /// Sequence number of the most recent publish.
    pub fn last_published(&self) -> u64 {
        self.last_seq.load(Ordering::SeqCst)
    }

    pub fn acknowledge(&self, seq: u64) {
        self.completed.send_if_modified(|done| {
            if seq > *done {
                *done = seq;
                true
            } else {
                false
            }
        });
    }

    pub fn is_acknowledged(&self, signal: RefreshSignal) -> bool {
        *self.completed.borrow() >= signal.seq
    }

    /// Waits until `signal` is acknowledged. Returns `false` on timeout.
    pub async fn wait_for(&self, signal: RefreshSignal, limit: Duration) -> bool {
        let mut done = self.completed.subscribe();
        matches!(
            tokio::time::timeout(limit, done.wait_for(|seq| *seq >= signal.seq)).await,
            Ok(Ok(_))
        )
    }
}

impl Default for SessionRefreshBus {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait]
impl SessionRefreshRequester for SessionRefreshBus {
    async fn request_refresh(&self) {
        let has_listener = self.listener_count() > 0;
        let signal = self.publish();

        if !has_listener {
            warning!("Session refresh requested but nobody is listening");
            return;
        }

        if !self.wait_for(signal, self.wait).await {
            warning!(
                "Session refresh not confirmed within {} ms, continuing",
                self.wait.as_millis()
            );
        }
    }
}
