//! Provider API request and response types.

use serde::{Deserialize, Serialize};

/// The remote session description offered by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdpOffer {
    /// Always "offer".
    #[serde(rename = "type")]
    pub kind: String,
    /// The SDP payload.
    pub sdp: String,
}

/// The local session description answering the provider's offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdpAnswer {
    /// Always "answer".
    #[serde(rename = "type")]
    pub kind: String,
    /// The SDP payload.
    pub sdp: String,
}

/// ICE server URL list: single string or array on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IceUrls {
    One(String),
    Many(Vec<String>),
}

/// One ICE server endpoint handed to the caller for candidate gathering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceServer {
    pub urls: IceUrls,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

/// One gathered ICE candidate, forwarded verbatim to the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(rename = "sdpMid", skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(rename = "sdpMLineIndex", skip_serializing_if = "Option::is_none")]
    pub sdp_m_line_index: Option<u32>,
}

/// Body for stream creation.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateStreamRequest {
    pub stream_warmup: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_url: Option<String>,
}

/// Handshake result: everything the caller needs to answer locally.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStreamResponse {
    /// Provider stream ID.
    pub id: String,
    /// Session token for server affinity on all subsequent calls.
    pub session_id: String,
    /// The offer the caller must answer.
    pub offer: SdpOffer,
    /// ICE servers for the caller's own candidate gathering.
    pub ice_servers: Vec<IceServer>,
}

/// Body for answering the offer.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SubmitAnswerRequest {
    pub answer: SdpAnswer,
    pub session_id: String,
}

/// Body for one ICE candidate submission.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SubmitIceRequest {
    #[serde(flatten)]
    pub candidate: IceCandidate,
    pub session_id: String,
}

/// Body for driving audio through the presenter.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SpeakRequest {
    pub script: SpeakScript,
    pub driver_url: String,
    pub config: SpeakConfig,
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SpeakScript {
    #[serde(rename = "type")]
    pub kind: String,
    pub audio_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SpeakConfig {
    pub stitch: bool,
}

/// Body for teardown.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CloseStreamRequest {
    pub session_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_carries_exactly_one_source() {
        let request = CreateStreamRequest {
            stream_warmup: true,
            source_url: None,
            driver_url: Some("bank://lively/".to_string()),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("source_url").is_none());
        assert_eq!(json["driver_url"], "bank://lively/");
        assert_eq!(json["stream_warmup"], true);
    }

    #[test]
    fn test_create_response_parses_provider_payload() {
        let payload = r#"{
            "id": "strm_1",
            "session_id": "AQEA...session",
            "offer": {"type": "offer", "sdp": "v=0..."},
            "ice_servers": [
                {"urls": "stun:stun.example:3478"},
                {"urls": ["turn:turn.example:3478"], "username": "u", "credential": "c"}
            ]
        }"#;

        let response: CreateStreamResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(response.id, "strm_1");
        assert_eq!(response.offer.kind, "offer");
        assert_eq!(response.ice_servers.len(), 2);
        assert!(matches!(response.ice_servers[0].urls, IceUrls::One(_)));
        assert!(matches!(response.ice_servers[1].urls, IceUrls::Many(_)));
    }

    #[test]
    fn test_ice_request_flattens_candidate_fields() {
        let request = SubmitIceRequest {
            candidate: IceCandidate {
                candidate: "candidate:1 1 UDP 123 10.0.0.1 50000 typ host".to_string(),
                sdp_mid: Some("0".to_string()),
                sdp_m_line_index: Some(0),
            },
            session_id: "tok".to_string(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert!(json["candidate"].as_str().unwrap().starts_with("candidate:1"));
        assert_eq!(json["sdpMid"], "0");
        assert_eq!(json["sdpMLineIndex"], 0);
        assert_eq!(json["session_id"], "tok");
    }

    #[test]
    fn test_speak_request_wire_shape() {
        let request = SpeakRequest {
            script: SpeakScript {
                kind: "audio".to_string(),
                audio_url: "https://cdn.example/reply.mp3".to_string(),
            },
            driver_url: "bank://lively/".to_string(),
            config: SpeakConfig { stitch: true },
            session_id: "tok".to_string(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["script"]["type"], "audio");
        assert_eq!(json["script"]["audio_url"], "https://cdn.example/reply.mp3");
        assert_eq!(json["config"]["stitch"], true);
        assert_eq!(json["session_id"], "tok");
    }
}
