//! Capacités de repli quand aucun transport ne peut livrer le stream.
//!
//! L'ouverture d'URL, le lancement d'intents et le player embarqué sont
//! des mécanismes de la plateforme hôte; le routeur ne voit que ce trait.

use async_trait::async_trait;
use url::Url;

use crate::errors::CastControlError;
use crate::model::StreamRequest;

#[async_trait]
pub trait FallbackLauncher: Send + Sync {
    /// Ouvre l'URL dans un contexte de lecture web (navigateur, webview).
    /// Le routeur n'attend pas le démarrage de la lecture.
    async fn open_url(&self, url: &str) -> Result<(), CastControlError>;

    /// Résolution d'un handler externe pour l'URI (intents Android).
    /// `Ok(true)` si une application a accepté l'URI.
    async fn launch_intent(&self, uri: &str) -> Result<bool, CastControlError>;

    /// Remet le stream au player embarqué de l'application hôte.
    async fn play_native(&self, request: &StreamRequest) -> Result<(), CastControlError>;
}

/// Construit l'URL du player web à partir de la base configurée, avec les
/// paramètres `url`, `token`, `title` et `autoplay`.
pub fn web_player_url(base_url: &str, request: &StreamRequest) -> Result<String, CastControlError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| CastControlError::fallback_exhausted(format!("base player web invalide: {e}")))?;
    url.query_pairs_mut()
        .append_pair("url", &request.content_id)
        .append_pair("token", request.auth_token.as_deref().unwrap_or(""))
        .append_pair("title", request.display_title())
        .append_pair("autoplay", "true");
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StreamMetadata;

    #[test]
    fn test_web_player_url_carries_all_params() {
        let request = StreamRequest::new("https://cdn/a.m3u8")
            .with_auth_token("jwt")
            .with_metadata(StreamMetadata {
                title: Some("Le Film".to_string()),
                ..Default::default()
            });

        let url = web_player_url("https://example.com/receiver/web/", &request).unwrap();
        let parsed = Url::parse(&url).unwrap();
        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert!(pairs.contains(&("url".into(), "https://cdn/a.m3u8".into())));
        assert!(pairs.contains(&("token".into(), "jwt".into())));
        assert!(pairs.contains(&("title".into(), "Le Film".into())));
        assert!(pairs.contains(&("autoplay".into(), "true".into())));
    }

    #[test]
    fn test_web_player_url_empty_token_and_title() {
        let request = StreamRequest::new("https://cdn/a.mp4");
        let url = web_player_url("https://example.com/web/", &request).unwrap();
        assert!(url.contains("token=&"));
    }

    #[test]
    fn test_web_player_url_rejects_bad_base() {
        let request = StreamRequest::new("https://cdn/a.mp4");
        let err = web_player_url("pas une url", &request).unwrap_err();
        assert!(matches!(err, CastControlError::FallbackExhausted(_)));
    }
}
