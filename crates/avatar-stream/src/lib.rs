//! Signaling client for the live talking-avatar provider.
//!
//! Establishing one avatar stream is a strict sequence: create the stream
//! (which hands back an SDP offer and a session token), answer the offer,
//! trickle ICE candidates, then push audio. The provider routes every call
//! after creation by the session token, sent as a `Cookie` header - server
//! affinity, not a general protocol feature, but omitting it breaks the
//! stream in ways that only show up under load.
//!
//! - [`StreamClient`] - stateless HTTPS wrapper over the provider API
//! - [`StreamSession`] - per-stream state machine enforcing call order
//! - [`StreamRegistry`] - owns live sessions, enforces one-token-one-stream,
//!   and evicts idle streams

mod api_types;
mod client;
mod config;
mod error;
mod registry;
mod session;

pub use api_types::{
    CreateStreamResponse, IceCandidate, IceServer, IceUrls, SdpAnswer, SdpOffer,
};
pub use client::StreamClient;
pub use config::{AvatarConfig, AvatarConfigBuilder};
pub use error::StreamError;
pub use registry::{StreamOpened, StreamRegistry};
pub use session::{StreamSession, StreamSource, StreamState};
