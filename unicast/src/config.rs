//! Configuration du routeur.
//!
//! Chargée depuis un fichier YAML par-dessus les valeurs par défaut;
//! toutes les clés sont optionnelles et un routeur sans fichier de
//! configuration est pleinement fonctionnel.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::CastControlError;

const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_DISPATCH_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_WEB_PLAYER_BASE_URL: &str = "https://example.invalid/universal-receiver/web/";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RouterConfig {
    /// Budget d'une sonde de découverte, par transport.
    pub probe_timeout_ms: u64,
    /// Budget d'une tentative de livraison.
    pub dispatch_timeout_ms: u64,
    /// Base de l'URL du player web utilisé par le fallback `web`.
    pub web_player_base_url: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            dispatch_timeout_ms: DEFAULT_DISPATCH_TIMEOUT_MS,
            web_player_base_url: DEFAULT_WEB_PLAYER_BASE_URL.to_string(),
        }
    }
}

impl RouterConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_millis(self.dispatch_timeout_ms)
    }

    /// Charge une configuration YAML; les clés absentes gardent leur
    /// valeur par défaut.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CastControlError> {
        serde_yaml::from_str(yaml)
            .map_err(|e| CastControlError::invalid_request(format!("configuration invalide: {e}")))
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, CastControlError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            CastControlError::invalid_request(format!(
                "lecture de {} impossible: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_yaml_str(&content)
    }
}
