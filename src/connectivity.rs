//! Connectivity monitoring.
//!
//! The monitor tracks a single boolean reachability flag and re-emits
//! transitions as events any component can subscribe to, decoupling
//! detection from action: it never calls the sync manager itself. Going
//! online is the "sync requested" signal; going offline only flips the flag
//! (offline is exactly when writes are queued, not drained).

use tokio::sync::{broadcast, watch};

use crate::remote::check_remote;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    Online,
    Offline,
}

pub struct ConnectivityMonitor {
    state: watch::Sender<bool>,
    events: broadcast::Sender<ConnectivityEvent>,
}

impl ConnectivityMonitor {
    pub fn new(initially_online: bool) -> Self {
        let (state, _) = watch::channel(initially_online);
        let (events, _) = broadcast::channel(16);
        Self { state, events }
    }

    /// Current reachability flag.
    pub fn is_online(&self) -> bool {
        *self.state.borrow()
    }

    /// A receiver over the reachability flag (for UI indicators).
    pub fn watch(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }

    /// Subscribes to transition events.
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent> {
        self.events.subscribe()
    }

    /// Records the observed reachability. Emits an event only on an actual
    /// transition; repeated observations of the same state are silent.
    pub fn set_online(&self, online: bool) {
        let changed = self.state.send_if_modified(|current| {
            if *current != online {
                *current = online;
                true
            } else {
                false
            }
        });
        if !changed {
            return;
        }

        let event = if online {
            tracing::info!("connectivity restored, requesting sync");
            ConnectivityEvent::Online
        } else {
            tracing::info!("connectivity lost, queueing writes locally");
            ConnectivityEvent::Offline
        };
        // No subscribers is fine; the flag is still authoritative.
        let _ = self.events.send(event);
    }

    /// Probes the remote server and feeds the result into the monitor.
    /// Returns the observed state.
    pub async fn refresh_from_probe(&self, server_url: &str) -> bool {
        let online = check_remote(server_url).await;
        self.set_online(online);
        online
    }
}
