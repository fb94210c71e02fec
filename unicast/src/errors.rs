use thiserror::Error;

#[derive(Error, Debug)]
pub enum CastControlError {
    /// Tous les transports ont échoué pendant une découverte à registre vide.
    #[error("Discovery failed on every transport: {0}")]
    Discovery(String),

    /// La sélection n'a trouvé aucun candidat disponible.
    #[error("No casting device available")]
    NoDeviceAvailable,

    /// Échec de livraison au niveau d'un adaptateur de transport.
    #[error("Transport error: {0}")]
    Transport(String),

    /// L'action de fallback elle-même a échoué.
    #[error("Fallback exhausted: {0}")]
    FallbackExhausted(String),

    /// Requête invalide avant toute sélection (contentId vide ou non-URI).
    #[error("Invalid stream request: {0}")]
    InvalidRequest(String),
}

impl CastControlError {
    pub fn transport(reason: impl Into<String>) -> Self {
        CastControlError::Transport(reason.into())
    }

    pub fn discovery(reason: impl Into<String>) -> Self {
        CastControlError::Discovery(reason.into())
    }

    pub fn fallback_exhausted(reason: impl Into<String>) -> Self {
        CastControlError::FallbackExhausted(reason.into())
    }

    pub fn invalid_request(reason: impl Into<String>) -> Self {
        CastControlError::InvalidRequest(reason.into())
    }
}
