//! Adaptateur Chromecast.
//!
//! Le Google Cast SDK reste une capacité externe, derrière le trait
//! `ChromecastSender` : lister les récepteurs annoncés, charger un payload
//! média sur l'un d'eux. L'adaptateur assemble les descripteurs et choisit
//! entre le chargement standard et le chemin sécurisé par token.

use async_trait::async_trait;
use tracing::debug;

use crate::errors::CastControlError;
use crate::media::MediaLoadRequest;
use crate::model::{CastDevice, CastDeviceType, CastOutcome, DeliveryMethod, StreamRequest};
use crate::transport::CastTransport;

/// Port de contrôle par défaut d'un Chromecast.
const DEFAULT_CAST_PORT: u16 = 8009;

/// Capacités annoncées par défaut quand le récepteur n'en publie pas.
const DEFAULT_CAPABILITIES: [&str; 3] = ["hls", "mp4", "auth"];

/// Un récepteur tel qu'annoncé par le SDK, avant assemblage en
/// `CastDevice`.
#[derive(Debug, Clone)]
pub struct ReceiverAnnouncement {
    pub id: String,
    pub name: String,
    pub ip_address: Option<String>,
    pub port: Option<u16>,
    pub capabilities: Vec<String>,
}

/// Le siège du Cast SDK côté émetteur.
#[async_trait]
pub trait ChromecastSender: Send + Sync {
    /// Récepteurs actuellement annoncés. Liste vide = aucun trouvé,
    /// erreur = SDK en panne.
    async fn receivers(&self) -> Result<Vec<ReceiverAnnouncement>, CastControlError>;

    /// Charge le payload sur le récepteur visé.
    async fn load_media(
        &self,
        device: &CastDevice,
        payload: MediaLoadRequest,
    ) -> Result<(), CastControlError>;
}

pub struct ChromecastTransport<S: ChromecastSender> {
    sender: S,
}

impl<S: ChromecastSender> ChromecastTransport<S> {
    pub fn new(sender: S) -> Self {
        Self { sender }
    }

    fn device_from_announcement(announcement: ReceiverAnnouncement) -> CastDevice {
        let capabilities: Vec<String> = if announcement.capabilities.is_empty() {
            DEFAULT_CAPABILITIES.iter().map(|c| c.to_string()).collect()
        } else {
            announcement.capabilities
        };

        let mut device = CastDevice::new(
            announcement.id,
            announcement.name,
            CastDeviceType::Chromecast,
        )
        .with_capabilities(capabilities);

        if let Some(ip) = announcement.ip_address {
            device = device.with_network_info(ip, announcement.port.unwrap_or(DEFAULT_CAST_PORT));
        }
        device
    }
}

#[async_trait]
impl<S: ChromecastSender> CastTransport for ChromecastTransport<S> {
    fn transport_type(&self) -> CastDeviceType {
        CastDeviceType::Chromecast
    }

    async fn discover(&self) -> Result<Vec<CastDevice>, CastControlError> {
        let announcements = self.sender.receivers().await?;
        debug!("{} récepteur(s) Chromecast annoncé(s)", announcements.len());
        Ok(announcements
            .into_iter()
            .map(Self::device_from_announcement)
            .collect())
    }

    async fn deliver(
        &self,
        request: &StreamRequest,
        device: &CastDevice,
    ) -> Result<CastOutcome, CastControlError> {
        let payload = MediaLoadRequest::from_stream_request(request);
        debug!(
            device = %device.id.0,
            secure = request.auth_token.is_some(),
            content_type = %payload.content_type,
            "chargement média Chromecast"
        );
        self.sender.load_media(device, payload).await?;

        Ok(CastOutcome::success(
            CastDeviceType::Chromecast,
            device.id.clone(),
            DeliveryMethod::Chromecast,
            "Stream casté vers Chromecast avec succès",
        ))
    }
}
