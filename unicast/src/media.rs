//! Construction des payloads média pour Chromecast.
//!
//! Deux chemins : le chargement standard (type de contenu et type de
//! stream inférés de l'extension du contentId) et le chemin sécurisé
//! quand un token est présent (le token est fusionné dans le customData
//! avec un marqueur `secureDelivery`).

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;

use crate::model::{StreamMetadata, StreamRequest};

pub const CONTENT_TYPE_HLS: &str = "application/x-mpegURL";
pub const CONTENT_TYPE_MP4: &str = "video/mp4";
pub const CONTENT_TYPE_WEBM: &str = "video/webm";

/// Marqueur inséré dans le customData pour signaler au récepteur une
/// livraison sécurisée par token.
pub const SECURE_DELIVERY_FLAG: &str = "secureDelivery";

/// Type de stream au sens du Cast SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StreamType {
    Live,
    Buffered,
    None,
}

impl StreamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamType::Live => "LIVE",
            StreamType::Buffered => "BUFFERED",
            StreamType::None => "NONE",
        }
    }
}

/// Type MIME inféré de l'extension. `.m3u8` ⇒ HLS, défaut `video/mp4`
/// quand l'extension est inconnue.
pub fn content_type_for(content_id: &str) -> &'static str {
    if content_id.contains(".m3u8") {
        CONTENT_TYPE_HLS
    } else if content_id.contains(".mp4") {
        CONTENT_TYPE_MP4
    } else if content_id.contains(".webm") {
        CONTENT_TYPE_WEBM
    } else {
        CONTENT_TYPE_MP4
    }
}

/// HLS est traité comme un direct, tout le reste comme bufferisé.
pub fn stream_type_for(content_id: &str) -> StreamType {
    if content_id.contains(".m3u8") {
        StreamType::Live
    } else {
        StreamType::Buffered
    }
}

/// Payload prêt à être passé au Cast SDK via `ChromecastSender`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaLoadRequest {
    pub content_id: String,
    pub content_type: String,
    pub stream_type: StreamType,
    pub auto_play: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<StreamMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_headers: Option<HashMap<String, String>>,
}

impl MediaLoadRequest {
    /// Chemin standard : types inférés, customData passé tel quel.
    pub fn standard(request: &StreamRequest) -> Self {
        Self {
            content_id: request.content_id.clone(),
            content_type: content_type_for(&request.content_id).to_string(),
            stream_type: stream_type_for(&request.content_id),
            auto_play: true,
            metadata: request.metadata.clone(),
            custom_data: request.custom_data.clone(),
            auth_headers: request.headers.clone(),
        }
    }

    /// Chemin sécurisé : le token rejoint le customData avec le marqueur
    /// `secureDelivery`, et le contenu est traité comme un HLS direct.
    pub fn secure(request: &StreamRequest, auth_token: &str) -> Self {
        let mut custom_data = match request.custom_data.clone() {
            Some(Value::Object(map)) => Value::Object(map),
            // Un customData non-objet est conservé sous la clé "payload".
            Some(other) => json!({ "payload": other }),
            None => json!({}),
        };
        if let Value::Object(map) = &mut custom_data {
            map.insert("authToken".to_string(), Value::String(auth_token.to_string()));
            map.insert(SECURE_DELIVERY_FLAG.to_string(), Value::Bool(true));
        }

        Self {
            content_id: request.content_id.clone(),
            content_type: CONTENT_TYPE_HLS.to_string(),
            stream_type: StreamType::Live,
            auto_play: true,
            metadata: request.metadata.clone(),
            custom_data: Some(custom_data),
            auth_headers: request.headers.clone(),
        }
    }

    /// Sélectionne le chemin en fonction de la présence d'un token.
    pub fn from_stream_request(request: &StreamRequest) -> Self {
        match request.auth_token.as_deref() {
            Some(token) => Self::secure(request, token),
            None => Self::standard(request),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StreamRequest;

    #[test]
    fn test_content_type_inference() {
        assert_eq!(content_type_for("https://a/b/live.m3u8"), CONTENT_TYPE_HLS);
        assert_eq!(content_type_for("https://a/b/movie.mp4"), CONTENT_TYPE_MP4);
        assert_eq!(content_type_for("https://a/b/clip.webm"), CONTENT_TYPE_WEBM);
        assert_eq!(content_type_for("https://a/b/stream"), CONTENT_TYPE_MP4);
    }

    #[test]
    fn test_stream_type_inference() {
        assert_eq!(stream_type_for("https://a/live.m3u8"), StreamType::Live);
        assert_eq!(stream_type_for("https://a/movie.mp4"), StreamType::Buffered);
        assert_eq!(stream_type_for("https://a/unknown"), StreamType::Buffered);
    }

    #[test]
    fn test_standard_payload_keeps_custom_data_untouched() {
        let request = StreamRequest::new("https://a/movie.mp4");
        let payload = MediaLoadRequest::from_stream_request(&request);
        assert_eq!(payload.content_type, CONTENT_TYPE_MP4);
        assert_eq!(payload.stream_type, StreamType::Buffered);
        assert!(payload.custom_data.is_none());
    }

    #[test]
    fn test_secure_payload_merges_token_and_marker() {
        let request = StreamRequest::new("https://a/live.m3u8")
            .with_auth_token("jwt-abc");
        let payload = MediaLoadRequest::from_stream_request(&request);

        assert_eq!(payload.content_type, CONTENT_TYPE_HLS);
        assert_eq!(payload.stream_type, StreamType::Live);
        let data = payload.custom_data.unwrap();
        assert_eq!(data["authToken"], "jwt-abc");
        assert_eq!(data[SECURE_DELIVERY_FLAG], true);
    }

    #[test]
    fn test_secure_payload_preserves_existing_custom_data() {
        let mut request = StreamRequest::new("https://a/live.m3u8")
            .with_auth_token("jwt-abc");
        request.custom_data = Some(json!({ "session": "s1" }));
        let payload = MediaLoadRequest::from_stream_request(&request);

        let data = payload.custom_data.unwrap();
        assert_eq!(data["session"], "s1");
        assert_eq!(data["authToken"], "jwt-abc");
    }

    #[test]
    fn test_stream_type_wire_spelling() {
        assert_eq!(serde_json::to_string(&StreamType::Live).unwrap(), "\"LIVE\"");
        assert_eq!(StreamType::Buffered.as_str(), "BUFFERED");
    }
}
