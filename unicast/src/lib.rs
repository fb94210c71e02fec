//! unicast — routage universel de casting.
//!
//! Découvre les appareils de lecture à travers plusieurs transports
//! (Chromecast, Android TV, AirPlay, DLNA), sélectionne une cible par
//! préférence puis par priorité, dispatche la requête à l'adaptateur du
//! transport retenu et exécute au plus une action de fallback en cas
//! d'échec. Les SDK de plateforme restent derrière les traits
//! `CastTransport`, `ChromecastSender` et `FallbackLauncher`.

pub mod config;
pub mod discovery;
pub mod errors;
pub mod events;
pub mod fallback;
pub mod media;
pub mod model;
pub mod registry;
pub mod router;
pub mod transport;
pub mod transports;

use serde::{Deserialize, Serialize};

pub use config::RouterConfig;
pub use errors::CastControlError;
pub use events::{
    CastEvent, ConnectionState, EventKind, EventNotifier, ListenerHandle, MediaProgress,
    MediaState,
};
pub use fallback::{FallbackLauncher, web_player_url};
pub use media::{MediaLoadRequest, StreamType};
pub use model::{
    CastDevice, CastDeviceType, CastOutcome, DeliveryMethod, FallbackStrategy, NetworkInfo,
    Platform, StreamMetadata, StreamRequest,
};
pub use registry::{DeviceRegistry, UpsertOutcome};
pub use router::UniversalCastRouter;
pub use transport::CastTransport;
pub use transports::{ChromecastSender, ChromecastTransport, ReceiverAnnouncement};

/// Identifiant unique d'un appareil dans le registre.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub String);

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(value: &str) -> Self {
        DeviceId(value.to_string())
    }
}
