//! Orchestration de la découverte.
//!
//! Toutes les sondes de transport partent en parallèle, chacune bornée par
//! le budget configuré. Une sonde en échec est isolée et journalisée; la
//! découverte ne remonte `Discovery` que si tous les transports échouent
//! alors que le registre est vide.

use futures::future::join_all;
use tracing::{info, warn};

use crate::errors::CastControlError;
use crate::events::CastEvent;
use crate::model::{CastDevice, CastDeviceType};
use crate::registry::UpsertOutcome;
use crate::router::UniversalCastRouter;

impl UniversalCastRouter {
    /// Sonde tous les transports configurés et fusionne le résultat dans
    /// le registre. Retourne les descripteurs produits par cette passe.
    pub async fn discover_devices(&self) -> Result<Vec<CastDevice>, CastControlError> {
        // AirPlay est une capacité de plateforme, pas une condition
        // réseau : la sonde n'est tentée que sur iOS.
        let probes: Vec<_> = self
            .probe_order
            .iter()
            .filter(|transport| {
                transport.transport_type() != CastDeviceType::Airplay || self.platform.is_ios()
            })
            .cloned()
            .collect();

        let probe_timeout = self.config.probe_timeout();
        let results = join_all(probes.iter().map(|transport| async move {
            match tokio::time::timeout(probe_timeout, transport.discover()).await {
                Ok(result) => result,
                Err(_) => Err(CastControlError::transport(format!(
                    "sonde {} hors délai ({} ms)",
                    transport.transport_type(),
                    probe_timeout.as_millis()
                ))),
            }
        }))
        .await;

        let mut merged = Vec::new();
        let mut failed = 0usize;
        for (transport, result) in probes.iter().zip(results) {
            match result {
                Ok(devices) => merged.extend(devices),
                Err(err) => {
                    warn!(
                        transport = %transport.transport_type(),
                        "sonde de découverte en échec: {err}"
                    );
                    failed += 1;
                }
            }
        }

        // Le registre est mis à jour avant toute notification, pour que
        // les observateurs relisent un état qui reflète l'événement.
        let mut to_notify = Vec::new();
        {
            let mut registry = self.registry.write().expect("device registry poisoned");
            for device in &merged {
                match registry.upsert(device.clone()) {
                    UpsertOutcome::Inserted | UpsertOutcome::Updated => {
                        to_notify.push(device.clone());
                    }
                    UpsertOutcome::Unchanged => {}
                }
            }
        }
        for device in to_notify {
            self.events.emit(&CastEvent::DeviceDiscovered(device));
        }

        let registry_empty = {
            let registry = self.registry.read().expect("device registry poisoned");
            registry.is_empty()
        };
        if !probes.is_empty() && failed == probes.len() && registry_empty {
            return Err(CastControlError::discovery(format!(
                "{failed} transport(s) en échec, aucun appareil connu"
            )));
        }

        info!("{} appareil(s) de casting découvert(s)", merged.len());
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouterConfig;
    use crate::events::EventKind;
    use crate::model::{CastOutcome, Platform, StreamRequest};
    use crate::transport::CastTransport;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct ProbeTransport {
        transport_type: CastDeviceType,
        devices: Vec<CastDevice>,
        fail: bool,
        delay: Option<Duration>,
    }

    impl ProbeTransport {
        fn ok(transport_type: CastDeviceType, ids: &[&str]) -> Self {
            Self {
                transport_type,
                devices: ids
                    .iter()
                    .map(|id| CastDevice::new(*id, *id, transport_type))
                    .collect(),
                fail: false,
                delay: None,
            }
        }

        fn failing(transport_type: CastDeviceType) -> Self {
            Self {
                transport_type,
                devices: Vec::new(),
                fail: true,
                delay: None,
            }
        }

        fn stalled(transport_type: CastDeviceType) -> Self {
            Self {
                transport_type,
                devices: Vec::new(),
                fail: false,
                delay: Some(Duration::from_secs(3600)),
            }
        }
    }

    #[async_trait]
    impl CastTransport for ProbeTransport {
        fn transport_type(&self) -> CastDeviceType {
            self.transport_type
        }

        async fn discover(&self) -> Result<Vec<CastDevice>, CastControlError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(CastControlError::transport("SDK indisponible"));
            }
            Ok(self.devices.clone())
        }

        async fn deliver(
            &self,
            _request: &StreamRequest,
            _device: &CastDevice,
        ) -> Result<CastOutcome, CastControlError> {
            Err(CastControlError::transport("pas de livraison dans ce test"))
        }
    }

    fn short_timeout_config() -> RouterConfig {
        RouterConfig {
            probe_timeout_ms: 50,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_failing_probe_does_not_abort_others() {
        let mut router = UniversalCastRouter::new(RouterConfig::default(), Platform::Android);
        router.register_transport(Arc::new(ProbeTransport::failing(CastDeviceType::Chromecast)));
        router.register_transport(Arc::new(ProbeTransport::ok(
            CastDeviceType::Dlna,
            &["dlna1"],
        )));

        let devices = router.discover_devices().await.unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].id.0, "dlna1");
    }

    #[tokio::test]
    async fn test_all_probes_failing_on_empty_registry_is_discovery_error() {
        let mut router = UniversalCastRouter::new(RouterConfig::default(), Platform::Android);
        router.register_transport(Arc::new(ProbeTransport::failing(CastDeviceType::Chromecast)));
        router.register_transport(Arc::new(ProbeTransport::failing(CastDeviceType::Dlna)));

        let err = router.discover_devices().await.unwrap_err();
        assert!(matches!(err, CastControlError::Discovery(_)));
    }

    #[tokio::test]
    async fn test_all_probes_failing_with_known_devices_is_best_effort() {
        let mut router = UniversalCastRouter::new(RouterConfig::default(), Platform::Android);
        router.register_transport(Arc::new(ProbeTransport::ok(
            CastDeviceType::Chromecast,
            &["cc1"],
        )));
        router.discover_devices().await.unwrap();

        // Le même transport tombe en panne; le registre connaît déjà cc1.
        router.register_transport(Arc::new(ProbeTransport::failing(CastDeviceType::Chromecast)));
        let devices = router.discover_devices().await.unwrap();
        assert!(devices.is_empty());
        assert_eq!(router.devices().len(), 1);
    }

    #[tokio::test]
    async fn test_stalled_probe_is_bounded_by_timeout() {
        let mut router = UniversalCastRouter::new(short_timeout_config(), Platform::Android);
        router.register_transport(Arc::new(ProbeTransport::stalled(CastDeviceType::Chromecast)));
        router.register_transport(Arc::new(ProbeTransport::ok(
            CastDeviceType::AndroidTv,
            &["tv1"],
        )));

        let devices = router.discover_devices().await.unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].id.0, "tv1");
    }

    #[tokio::test]
    async fn test_airplay_probe_skipped_off_ios() {
        let mut android = UniversalCastRouter::new(RouterConfig::default(), Platform::Android);
        android.register_transport(Arc::new(ProbeTransport::ok(
            CastDeviceType::Airplay,
            &["ap1"],
        )));
        assert!(android.discover_devices().await.unwrap().is_empty());

        let mut ios = UniversalCastRouter::new(RouterConfig::default(), Platform::Ios);
        ios.register_transport(Arc::new(ProbeTransport::ok(
            CastDeviceType::Airplay,
            &["ap1"],
        )));
        assert_eq!(ios.discover_devices().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rediscovery_of_identical_device_emits_no_event() {
        let mut router = UniversalCastRouter::new(RouterConfig::default(), Platform::Android);
        router.register_transport(Arc::new(ProbeTransport::ok(
            CastDeviceType::Chromecast,
            &["cc1"],
        )));

        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = Arc::clone(&seen);
        router.add_event_listener(EventKind::DeviceDiscovered, move |_| {
            seen_clone.fetch_add(1, Ordering::SeqCst);
        });

        router.discover_devices().await.unwrap();
        router.discover_devices().await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
