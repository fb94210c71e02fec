//! Contrat d'adaptateur de transport.
//!
//! Chaque transport (Chromecast, Android TV, AirPlay, DLNA, ...) expose la
//! même capacité : découvrir ses appareils et livrer une requête à l'un
//! d'eux. Le routeur ne connaît jamais les internals d'un adaptateur; il
//! les indexe par `CastDeviceType` et ajoute un transport en ajoutant une
//! entrée de table, pas en modifiant le dispatch.

use async_trait::async_trait;

use crate::errors::CastControlError;
use crate::model::{CastDevice, CastDeviceType, CastOutcome, StreamRequest};

#[async_trait]
pub trait CastTransport: Send + Sync {
    /// Type d'appareil que ce transport sait joindre.
    fn transport_type(&self) -> CastDeviceType;

    /// Sonde de découverte.
    ///
    /// "Aucun appareil trouvé" est un succès avec une liste vide; une
    /// erreur signale une vraie panne du transport (SDK indisponible,
    /// socket en échec, ...).
    async fn discover(&self) -> Result<Vec<CastDevice>, CastControlError>;

    /// Livre la requête à l'appareil sélectionné.
    async fn deliver(
        &self,
        request: &StreamRequest,
        device: &CastDevice,
    ) -> Result<CastOutcome, CastControlError>;
}
