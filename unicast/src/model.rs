//! Data model for universal casting.
//!
//! Everything here crosses the host-application bridge unchanged, so the
//! serde spellings match the historical wire format of the plugin
//! (`"chromecast"`, `"android-tv"`, ...).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::DeviceId;

/// Types d'appareils de casting supportés.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CastDeviceType {
    Chromecast,
    AndroidTv,
    Airplay,
    Dlna,
    SmartTv,
    Unknown,
}

impl CastDeviceType {
    /// Wire spelling, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CastDeviceType::Chromecast => "chromecast",
            CastDeviceType::AndroidTv => "android-tv",
            CastDeviceType::Airplay => "airplay",
            CastDeviceType::Dlna => "dlna",
            CastDeviceType::SmartTv => "smart-tv",
            CastDeviceType::Unknown => "unknown",
        }
    }

    /// Default selection priority: Chromecast > Android TV > AirPlay > DLNA.
    /// Smart TVs and unknown devices are only reached by the
    /// first-available fallthrough.
    pub const PRIORITY_ORDER: [CastDeviceType; 4] = [
        CastDeviceType::Chromecast,
        CastDeviceType::AndroidTv,
        CastDeviceType::Airplay,
        CastDeviceType::Dlna,
    ];
}

impl std::fmt::Display for CastDeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adresse réseau d'un appareil découvert, quand le transport la connaît.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    pub ip_address: String,
    pub port: u16,
}

/// Un appareil de lecture découvert par un transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastDevice {
    pub id: DeviceId,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: CastDeviceType,
    /// Feature tags the device advertises ("hls", "mp4", "auth", ...).
    pub capabilities: Vec<String>,
    pub is_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_info: Option<NetworkInfo>,
}

impl CastDevice {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        device_type: CastDeviceType,
    ) -> Self {
        Self {
            id: DeviceId(id.into()),
            name: name.into(),
            device_type,
            capabilities: Vec::new(),
            is_available: true,
            network_info: None,
        }
    }

    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_network_info(mut self, ip_address: impl Into<String>, port: u16) -> Self {
        self.network_info = Some(NetworkInfo {
            ip_address: ip_address.into(),
            port,
        });
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.is_available = false;
        self
    }
}

/// Métadonnées optionnelles attachées à un stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Poster / artwork URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Duration in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

/// Stratégie de repli quand le casting direct échoue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackStrategy {
    Web,
    Native,
    Intent,
}

/// Une intention de cast : quoi lire, avec quoi s'authentifier, où de
/// préférence, et quoi faire si ça échoue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamRequest {
    pub content_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<StreamMetadata>,
    /// Opaque passthrough, forwarded to the receiver untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_device_type: Option<CastDeviceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_strategy: Option<FallbackStrategy>,
}

impl StreamRequest {
    pub fn new(content_id: impl Into<String>) -> Self {
        Self {
            content_id: content_id.into(),
            auth_token: None,
            metadata: None,
            custom_data: None,
            headers: None,
            preferred_device_type: None,
            fallback_strategy: None,
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_metadata(mut self, metadata: StreamMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_preferred_device_type(mut self, device_type: CastDeviceType) -> Self {
        self.preferred_device_type = Some(device_type);
        self
    }

    pub fn with_fallback_strategy(mut self, strategy: FallbackStrategy) -> Self {
        self.fallback_strategy = Some(strategy);
        self
    }

    /// Titre à afficher, chaîne vide si aucune métadonnée.
    pub fn display_title(&self) -> &str {
        self.metadata
            .as_ref()
            .and_then(|m| m.title.as_deref())
            .unwrap_or("")
    }
}

/// Par quel chemin le contenu a finalement été livré.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryMethod {
    Chromecast,
    AndroidTv,
    Airplay,
    Dlna,
    Intent,
    Web,
    Native,
}

impl DeliveryMethod {
    /// Direct delivery method matching a device type.
    pub fn for_device_type(device_type: CastDeviceType) -> Self {
        match device_type {
            CastDeviceType::Chromecast => DeliveryMethod::Chromecast,
            CastDeviceType::AndroidTv => DeliveryMethod::AndroidTv,
            CastDeviceType::Airplay => DeliveryMethod::Airplay,
            CastDeviceType::Dlna => DeliveryMethod::Dlna,
            // Smart TVs et inconnus passent par le navigateur.
            CastDeviceType::SmartTv | CastDeviceType::Unknown => DeliveryMethod::Web,
        }
    }
}

/// Résultat d'un `cast_stream` : exactement un par appel, fallback compris.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastOutcome {
    pub success: bool,
    pub device_type: CastDeviceType,
    pub device_id: DeviceId,
    pub method: DeliveryMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CastOutcome {
    pub fn success(
        device_type: CastDeviceType,
        device_id: DeviceId,
        method: DeliveryMethod,
        message: impl Into<String>,
    ) -> Self {
        Self {
            success: true,
            device_type,
            device_id,
            method,
            message: Some(message.into()),
        }
    }

    pub fn failure(
        device_type: CastDeviceType,
        device_id: DeviceId,
        method: DeliveryMethod,
        message: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            device_type,
            device_id,
            method,
            message: Some(message.into()),
        }
    }
}

/// Plateforme hôte. Conditionne la découverte AirPlay (iOS uniquement)
/// et le fallback `intent` (famille Android uniquement).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    Web,
    Other,
}

impl Platform {
    pub fn is_android_family(&self) -> bool {
        matches!(self, Platform::Android)
    }

    pub fn is_ios(&self) -> bool {
        matches!(self, Platform::Ios)
    }
}
