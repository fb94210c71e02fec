//! Le routeur de casting universel.
//!
//! Sélectionne un appareil cible par préférence puis par priorité, dispatch
//! la requête à l'adaptateur du transport correspondant, et exécute au plus
//! une action de fallback quand la livraison directe échoue. Chaque appel
//! `cast_stream` se termine par exactement un `CastOutcome`.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{info, warn};
use url::{ParseError, Url};

use crate::config::RouterConfig;
use crate::errors::CastControlError;
use crate::events::{
    CastEvent, ConnectionState, EventKind, EventNotifier, ListenerHandle, MediaProgress,
    MediaState,
};
use crate::fallback::{FallbackLauncher, web_player_url};
use crate::model::{
    CastDevice, CastDeviceType, CastOutcome, DeliveryMethod, FallbackStrategy, Platform,
    StreamRequest,
};
use crate::registry::DeviceRegistry;
use crate::transport::CastTransport;
use crate::DeviceId;

pub struct UniversalCastRouter {
    pub(crate) registry: Arc<RwLock<DeviceRegistry>>,
    // Ordre fixe de sondage = ordre d'enregistrement des transports.
    pub(crate) probe_order: Vec<Arc<dyn CastTransport>>,
    table: HashMap<CastDeviceType, Arc<dyn CastTransport>>,
    launcher: Option<Arc<dyn FallbackLauncher>>,
    pub(crate) events: EventNotifier,
    pub(crate) config: RouterConfig,
    pub(crate) platform: Platform,
}

impl UniversalCastRouter {
    /// Routeur sans transport ni launcher; chaque instance possède son
    /// propre registre, il n'y a pas de singleton caché.
    pub fn new(config: RouterConfig, platform: Platform) -> Self {
        Self {
            registry: Arc::new(RwLock::new(DeviceRegistry::new())),
            probe_order: Vec::new(),
            table: HashMap::new(),
            launcher: None,
            events: EventNotifier::new(),
            config,
            platform,
        }
    }

    /// Enregistre un adaptateur dans la table de capacités. Un second
    /// enregistrement pour le même type remplace le premier sans changer
    /// sa place dans l'ordre de sondage.
    pub fn register_transport(&mut self, transport: Arc<dyn CastTransport>) {
        let transport_type = transport.transport_type();
        if self.table.insert(transport_type, Arc::clone(&transport)).is_some() {
            if let Some(slot) = self
                .probe_order
                .iter_mut()
                .find(|t| t.transport_type() == transport_type)
            {
                *slot = transport;
            }
        } else {
            self.probe_order.push(transport);
        }
    }

    pub fn set_fallback_launcher(&mut self, launcher: Arc<dyn FallbackLauncher>) {
        self.launcher = Some(launcher);
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Copie de l'état courant du registre, ordre d'insertion.
    pub fn devices(&self) -> Vec<CastDevice> {
        let registry = self.registry.read().expect("device registry poisoned");
        registry.list_all().cloned().collect()
    }

    /// Choisit exactement un appareil cible.
    ///
    /// Registre vide ⇒ une découverte paresseuse d'abord; puis préférence
    /// explicite, ordre de priorité fixe, premier disponible, et enfin
    /// `NoDeviceAvailable`. Tous les départages se font dans l'ordre
    /// d'insertion du registre.
    pub async fn select_target_device(
        &self,
        preferred: Option<CastDeviceType>,
    ) -> Result<CastDevice, CastControlError> {
        let needs_discovery = {
            let registry = self.registry.read().expect("device registry poisoned");
            registry.is_empty()
        };
        if needs_discovery {
            // L'échec de la découverte se traduit plus bas en
            // NoDeviceAvailable : la sélection répond toujours.
            if let Err(e) = self.discover_devices().await {
                warn!("découverte paresseuse en échec: {e}");
            }
        }

        let registry = self.registry.read().expect("device registry poisoned");
        let available: Vec<&CastDevice> = registry.list_available().collect();

        if let Some(preferred) = preferred {
            if let Some(device) = available.iter().find(|d| d.device_type == preferred) {
                return Ok((*device).clone());
            }
        }

        for device_type in CastDeviceType::PRIORITY_ORDER {
            if let Some(device) = available.iter().find(|d| d.device_type == device_type) {
                return Ok((*device).clone());
            }
        }

        available
            .first()
            .map(|d| (*d).clone())
            .ok_or(CastControlError::NoDeviceAvailable)
    }

    /// Caste un stream vers le meilleur appareil joignable.
    ///
    /// Ne retourne `Err` que pour une requête invalide; toute autre issue,
    /// fallback compris, se termine en `CastOutcome`.
    pub async fn cast_stream(
        &self,
        request: &StreamRequest,
    ) -> Result<CastOutcome, CastControlError> {
        validate_request(request)?;

        let device = match self.select_target_device(request.preferred_device_type).await {
            Ok(device) => device,
            Err(CastControlError::NoDeviceAvailable) => {
                return Ok(match request.fallback_strategy {
                    Some(strategy) => self.run_fallback(strategy, request).await,
                    None => CastOutcome::failure(
                        CastDeviceType::Unknown,
                        DeviceId(String::new()),
                        DeliveryMethod::Web,
                        "Aucun appareil de casting trouvé",
                    ),
                });
            }
            Err(other) => return Err(other),
        };

        info!(
            device = %device.id.0,
            device_type = %device.device_type,
            "appareil cible sélectionné"
        );

        match self.dispatch(request, &device).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                warn!(
                    device_type = %device.device_type,
                    "livraison en échec: {err}"
                );
                match request.fallback_strategy {
                    Some(strategy) => Ok(self.run_fallback(strategy, request).await),
                    None => Ok(CastOutcome::failure(
                        device.device_type,
                        device.id.clone(),
                        DeliveryMethod::for_device_type(device.device_type),
                        format!("Échec casting {}: {err}", device.device_type),
                    )),
                }
            }
        }
    }

    /// Invoque l'adaptateur du type de l'appareil, borné par le budget de
    /// livraison configuré.
    async fn dispatch(
        &self,
        request: &StreamRequest,
        device: &CastDevice,
    ) -> Result<CastOutcome, CastControlError> {
        let transport = self.table.get(&device.device_type).ok_or_else(|| {
            CastControlError::transport(format!(
                "aucun adaptateur enregistré pour {}",
                device.device_type
            ))
        })?;

        match tokio::time::timeout(
            self.config.dispatch_timeout(),
            transport.deliver(request, device),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(CastControlError::transport(format!(
                "délai de livraison dépassé ({} ms)",
                self.config.dispatch_timeout_ms
            ))),
        }
    }

    /// Exécute exactement une action de fallback; jamais de fallback en
    /// cascade.
    async fn run_fallback(
        &self,
        strategy: FallbackStrategy,
        request: &StreamRequest,
    ) -> CastOutcome {
        // Sans launcher, toute action de repli est épuisée d'office.
        let Some(launcher) = self.launcher.as_ref() else {
            let err =
                CastControlError::fallback_exhausted("aucun launcher de fallback configuré");
            return CastOutcome::failure(
                CastDeviceType::Unknown,
                DeviceId(String::new()),
                DeliveryMethod::Web,
                err.to_string(),
            );
        };

        match strategy {
            FallbackStrategy::Web => {
                let url = match web_player_url(&self.config.web_player_base_url, request) {
                    Ok(url) => url,
                    Err(err) => {
                        return CastOutcome::failure(
                            CastDeviceType::Unknown,
                            DeviceId("web-fallback".into()),
                            DeliveryMethod::Web,
                            err.to_string(),
                        );
                    }
                };
                match launcher.open_url(&url).await {
                    // L'ouverture est émise; on n'attend pas la lecture.
                    Ok(()) => CastOutcome::success(
                        CastDeviceType::Unknown,
                        DeviceId("web-fallback".into()),
                        DeliveryMethod::Web,
                        "Stream ouvert dans le navigateur web",
                    ),
                    Err(err) => {
                        let err = CastControlError::fallback_exhausted(format!(
                            "ouverture du player web en échec: {err}"
                        ));
                        CastOutcome::failure(
                            CastDeviceType::Unknown,
                            DeviceId("web-fallback".into()),
                            DeliveryMethod::Web,
                            err.to_string(),
                        )
                    }
                }
            }
            FallbackStrategy::Intent => {
                // Hors famille Android, aucun intent n'est tenté : même
                // issue générique que lorsqu'aucune stratégie ne
                // s'applique.
                if !self.platform.is_android_family() {
                    return CastOutcome::failure(
                        CastDeviceType::Unknown,
                        DeviceId(String::new()),
                        DeliveryMethod::Web,
                        "Aucune stratégie de fallback disponible",
                    );
                }
                match launcher.launch_intent(&request.content_id).await {
                    Ok(true) => CastOutcome::success(
                        CastDeviceType::Unknown,
                        DeviceId("intent-fallback".into()),
                        DeliveryMethod::Intent,
                        "Stream ouvert avec l'application par défaut",
                    ),
                    Ok(false) => CastOutcome::failure(
                        CastDeviceType::Unknown,
                        DeviceId("intent-fallback".into()),
                        DeliveryMethod::Intent,
                        "Aucune application compatible trouvée",
                    ),
                    Err(err) => {
                        let err = CastControlError::fallback_exhausted(format!(
                            "lancement d'intent en échec: {err}"
                        ));
                        CastOutcome::failure(
                            CastDeviceType::Unknown,
                            DeviceId("intent-fallback".into()),
                            DeliveryMethod::Intent,
                            err.to_string(),
                        )
                    }
                }
            }
            FallbackStrategy::Native => match launcher.play_native(request).await {
                Ok(()) => CastOutcome::success(
                    CastDeviceType::Unknown,
                    DeviceId("native-fallback".into()),
                    DeliveryMethod::Native,
                    "Lecture dans le player natif de l'application",
                ),
                Err(err) => {
                    let err = CastControlError::fallback_exhausted(format!(
                        "lecture native en échec: {err}"
                    ));
                    CastOutcome::failure(
                        CastDeviceType::Unknown,
                        DeviceId("native-fallback".into()),
                        DeliveryMethod::Native,
                        err.to_string(),
                    )
                }
            },
        }
    }

    // ---- Événements --------------------------------------------------

    pub fn add_event_listener<F>(&self, kind: EventKind, callback: F) -> ListenerHandle
    where
        F: Fn(&CastEvent) + Send + Sync + 'static,
    {
        self.events.add_listener(kind, callback)
    }

    pub fn remove_all_listeners(&self) {
        self.events.remove_all_listeners();
    }

    /// Retire l'appareil du registre puis émet `deviceLost`. À appeler
    /// par les adaptateurs quand leur transport signale la perte.
    pub fn mark_device_lost(&self, id: &DeviceId) {
        let removed = {
            let mut registry = self.registry.write().expect("device registry poisoned");
            registry.remove(id)
        };
        if removed.is_some() {
            self.events.emit(&CastEvent::DeviceLost(id.clone()));
        }
    }

    /// Points d'entrée pour relayer les événements des SDK de transport.
    pub fn notify_connection_state(&self, state: ConnectionState) {
        self.events.emit(&CastEvent::ConnectionStateChanged(state));
    }

    pub fn notify_media_state(&self, state: MediaState) {
        self.events.emit(&CastEvent::MediaStateChanged(state));
    }

    pub fn notify_media_progress(&self, progress: MediaProgress) {
        self.events.emit(&CastEvent::MediaProgress(progress));
    }
}

/// `content_id` doit être une URI non vide. Les URI relatives sont
/// acceptées (le récepteur peut les résoudre), seul un contenu
/// syntaxiquement impossible est rejeté.
fn validate_request(request: &StreamRequest) -> Result<(), CastControlError> {
    let content_id = request.content_id.trim();
    if content_id.is_empty() {
        return Err(CastControlError::invalid_request("contentId vide"));
    }
    match Url::parse(content_id) {
        Ok(_) | Err(ParseError::RelativeUrlWithoutBase) => Ok(()),
        Err(e) => Err(CastControlError::invalid_request(format!(
            "contentId n'est pas une URI: {e}"
        ))),
    }
}
