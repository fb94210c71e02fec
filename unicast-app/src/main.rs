//! Démonstrateur du routeur unicast.
//!
//! Branche des transports en mémoire à la place des SDK de plateforme,
//! lance une passe de découverte puis un cast avec fallback web. Sert de
//! référence d'intégration pour une application hôte réelle.

use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use unicast::{
    CastControlError, CastDevice, CastDeviceType, CastOutcome, CastTransport, ChromecastSender,
    ChromecastTransport, DeliveryMethod, EventKind, FallbackLauncher, FallbackStrategy,
    MediaLoadRequest, Platform, ReceiverAnnouncement, RouterConfig, StreamMetadata,
    StreamRequest, UniversalCastRouter,
};

/// Sender Chromecast de démonstration : un récepteur fictif, les
/// chargements sont seulement journalisés.
struct DemoSender;

#[async_trait]
impl ChromecastSender for DemoSender {
    async fn receivers(&self) -> Result<Vec<ReceiverAnnouncement>, CastControlError> {
        Ok(vec![ReceiverAnnouncement {
            id: "demo-cast".to_string(),
            name: "Chromecast Salon".to_string(),
            ip_address: Some("192.168.1.50".to_string()),
            port: None,
            capabilities: Vec::new(),
        }])
    }

    async fn load_media(
        &self,
        device: &CastDevice,
        payload: MediaLoadRequest,
    ) -> Result<(), CastControlError> {
        info!(
            device = %device.id,
            content_type = %payload.content_type,
            stream_type = payload.stream_type.as_str(),
            "chargement média (démo)"
        );
        Ok(())
    }
}

/// Transport DLNA de démonstration : découverte vide, comme un réseau
/// sans renderer.
struct DemoDlnaTransport;

#[async_trait]
impl CastTransport for DemoDlnaTransport {
    fn transport_type(&self) -> CastDeviceType {
        CastDeviceType::Dlna
    }

    async fn discover(&self) -> Result<Vec<CastDevice>, CastControlError> {
        Ok(Vec::new())
    }

    async fn deliver(
        &self,
        _request: &StreamRequest,
        device: &CastDevice,
    ) -> Result<CastOutcome, CastControlError> {
        Ok(CastOutcome::success(
            CastDeviceType::Dlna,
            device.id.clone(),
            DeliveryMethod::Dlna,
            "livré (démo)",
        ))
    }
}

/// Launcher de démonstration : chaque action est journalisée.
struct DemoLauncher;

#[async_trait]
impl FallbackLauncher for DemoLauncher {
    async fn open_url(&self, url: &str) -> Result<(), CastControlError> {
        info!("ouverture du player web: {url}");
        Ok(())
    }

    async fn launch_intent(&self, uri: &str) -> Result<bool, CastControlError> {
        info!("résolution d'intent pour: {uri}");
        Ok(false)
    }

    async fn play_native(&self, request: &StreamRequest) -> Result<(), CastControlError> {
        info!("lecture native: {}", request.content_id);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ========== PHASE 1 : Configuration ==========

    let config = match env::var("UNICAST_CONFIG") {
        Ok(path) => {
            info!("chargement de la configuration: {path}");
            RouterConfig::from_yaml_file(&path)?
        }
        Err(_) => RouterConfig::default(),
    };

    let mut router = UniversalCastRouter::new(config, Platform::Android);
    router.register_transport(Arc::new(ChromecastTransport::new(DemoSender)));
    router.register_transport(Arc::new(DemoDlnaTransport));
    router.set_fallback_launcher(Arc::new(DemoLauncher));

    router.add_event_listener(EventKind::DeviceDiscovered, |event| {
        info!("événement: {}", serde_json::to_string(event).unwrap_or_default());
    });

    // ========== PHASE 2 : Découverte ==========

    match router.discover_devices().await {
        Ok(devices) => {
            info!("✅ {} appareil(s) de casting découvert(s)", devices.len());
            for device in &devices {
                info!("  - {} ({})", device.name, device.device_type);
            }
        }
        Err(e) => warn!("⚠️ découverte en échec: {e}"),
    }

    // ========== PHASE 3 : Cast ==========

    let request = StreamRequest::new("https://demo.example.com/live/master.m3u8")
        .with_metadata(StreamMetadata {
            title: Some("Flux de démonstration".to_string()),
            ..Default::default()
        })
        .with_fallback_strategy(FallbackStrategy::Web);

    let outcome = router.cast_stream(&request).await?;
    info!(
        success = outcome.success,
        device = %outcome.device_id,
        method = ?outcome.method,
        "résultat: {}",
        outcome.message.as_deref().unwrap_or("")
    );

    Ok(())
}
