//! Event notification for casting state.
//!
//! Observers register a callback per event kind and get back a handle;
//! delivery is synchronous, in registration order, on whatever thread the
//! underlying transport event originates. A panicking observer is logged
//! and skipped so it cannot starve later observers.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::DeviceId;
use crate::model::CastDevice;

/// État de connexion vers l'appareil cible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connected,
    Disconnected,
    Connecting,
    Error,
}

/// État de lecture côté récepteur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaState {
    Playing,
    Paused,
    Buffering,
    Idle,
    Error,
}

/// Progression de lecture, en secondes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaProgress {
    pub current_time: f64,
    pub duration: f64,
    pub position: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    DeviceDiscovered,
    DeviceLost,
    ConnectionStateChanged,
    MediaStateChanged,
    MediaProgress,
}

/// Un événement du routeur, livré aux observateurs du kind correspondant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum CastEvent {
    DeviceDiscovered(CastDevice),
    DeviceLost(DeviceId),
    ConnectionStateChanged(ConnectionState),
    MediaStateChanged(MediaState),
    MediaProgress(MediaProgress),
}

impl CastEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            CastEvent::DeviceDiscovered(_) => EventKind::DeviceDiscovered,
            CastEvent::DeviceLost(_) => EventKind::DeviceLost,
            CastEvent::ConnectionStateChanged(_) => EventKind::ConnectionStateChanged,
            CastEvent::MediaStateChanged(_) => EventKind::MediaStateChanged,
            CastEvent::MediaProgress(_) => EventKind::MediaProgress,
        }
    }
}

type Callback = Arc<dyn Fn(&CastEvent) + Send + Sync>;

struct ListenerEntry {
    id: u64,
    callback: Callback,
}

#[derive(Default)]
struct ListenerTable {
    listeners: HashMap<EventKind, Vec<ListenerEntry>>,
}

/// Handle rendu par `add_event_listener`; `remove()` désinscrit le
/// callback. Sans effet si le notifier a déjà disparu.
pub struct ListenerHandle {
    kind: EventKind,
    id: u64,
    table: Weak<Mutex<ListenerTable>>,
}

impl ListenerHandle {
    pub fn remove(&self) {
        if let Some(table) = self.table.upgrade() {
            let mut table = table.lock().expect("listener table poisoned");
            if let Some(entries) = table.listeners.get_mut(&self.kind) {
                entries.retain(|entry| entry.id != self.id);
            }
        }
    }
}

/// Distributeur d'événements du routeur. Clonable; tous les clones
/// partagent la même table d'observateurs.
#[derive(Clone, Default)]
pub struct EventNotifier {
    table: Arc<Mutex<ListenerTable>>,
    next_id: Arc<AtomicU64>,
}

impl EventNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener<F>(&self, kind: EventKind, callback: F) -> ListenerHandle
    where
        F: Fn(&CastEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        {
            let mut table = self.table.lock().expect("listener table poisoned");
            table
                .listeners
                .entry(kind)
                .or_default()
                .push(ListenerEntry {
                    id,
                    callback: Arc::new(callback),
                });
        }
        ListenerHandle {
            kind,
            id,
            table: Arc::downgrade(&self.table),
        }
    }

    pub fn remove_all_listeners(&self) {
        let mut table = self.table.lock().expect("listener table poisoned");
        table.listeners.clear();
    }

    /// Livre l'événement à chaque observateur inscrit pour son kind.
    ///
    /// La liste est figée avant livraison : une désinscription pendant la
    /// livraison est sûre et prend effet à la notification suivante.
    pub fn emit(&self, event: &CastEvent) {
        let callbacks: Vec<Callback> = {
            let table = self.table.lock().expect("listener table poisoned");
            table
                .listeners
                .get(&event.kind())
                .map(|entries| entries.iter().map(|e| Arc::clone(&e.callback)).collect())
                .unwrap_or_default()
        };

        for callback in callbacks {
            if catch_unwind(AssertUnwindSafe(|| callback(event))).is_err() {
                warn!(kind = ?event.kind(), "un observateur a paniqué pendant la livraison");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CastDeviceType;
    use std::sync::atomic::AtomicUsize;

    fn discovered(id: &str) -> CastEvent {
        CastEvent::DeviceDiscovered(CastDevice::new(id, id, CastDeviceType::Chromecast))
    }

    #[test]
    fn test_delivery_in_registration_order() {
        let notifier = EventNotifier::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let seen = Arc::clone(&seen);
            notifier.add_listener(EventKind::DeviceDiscovered, move |_| {
                seen.lock().unwrap().push(tag);
            });
        }

        notifier.emit(&discovered("cc1"));
        assert_eq!(*seen.lock().unwrap(), ["first", "second", "third"]);
    }

    #[test]
    fn test_panicking_observer_does_not_block_later_ones() {
        let notifier = EventNotifier::new();
        let reached = Arc::new(AtomicUsize::new(0));

        notifier.add_listener(EventKind::DeviceDiscovered, |_| {
            panic!("observer failure");
        });
        let reached_clone = Arc::clone(&reached);
        notifier.add_listener(EventKind::DeviceDiscovered, move |_| {
            reached_clone.fetch_add(1, Ordering::SeqCst);
        });

        notifier.emit(&discovered("cc1"));
        assert_eq!(reached.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handle_remove_stops_delivery() {
        let notifier = EventNotifier::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        let handle = notifier.add_listener(EventKind::DeviceDiscovered, move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        notifier.emit(&discovered("cc1"));
        handle.remove();
        notifier.emit(&discovered("cc2"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unregister_mid_delivery_takes_effect_next_time() {
        let notifier = EventNotifier::new();
        let count = Arc::new(AtomicUsize::new(0));
        let handle_slot: Arc<Mutex<Option<ListenerHandle>>> = Arc::new(Mutex::new(None));

        let count_clone = Arc::clone(&count);
        let slot_clone = Arc::clone(&handle_slot);
        let handle = notifier.add_listener(EventKind::DeviceDiscovered, move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
            // Se désinscrit pendant sa propre livraison.
            if let Some(handle) = slot_clone.lock().unwrap().take() {
                handle.remove();
            }
        });
        *handle_slot.lock().unwrap() = Some(handle);

        notifier.emit(&discovered("cc1"));
        notifier.emit(&discovered("cc2"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_all_listeners_clears_every_kind() {
        let notifier = EventNotifier::new();
        let count = Arc::new(AtomicUsize::new(0));
        for kind in [EventKind::DeviceDiscovered, EventKind::MediaStateChanged] {
            let count = Arc::clone(&count);
            notifier.add_listener(kind, move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }

        notifier.remove_all_listeners();
        notifier.emit(&discovered("cc1"));
        notifier.emit(&CastEvent::MediaStateChanged(MediaState::Playing));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_event_kind_dispatch_is_selective() {
        let notifier = EventNotifier::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        notifier.add_listener(EventKind::MediaProgress, move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        notifier.emit(&discovered("cc1"));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        notifier.emit(&CastEvent::MediaProgress(MediaProgress {
            current_time: 1.0,
            duration: 10.0,
            position: 0.1,
        }));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
