//! Message protocol between the panel and its host process.
//!
//! Every message on the shared channel is a JSON object with a `type` tag.
//! The panel produces [`OutboundMessage`]s and understands exactly one
//! inbound shape, the `claudeCodeRateLimits` response. The channel is shared
//! with unrelated features, so inbound traffic is kept as raw JSON
//! ([`InboundMessage`]) and only decoded once the tag matches.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::usage::RateLimitSnapshot;

/// Tag of the panel → host rate-limit request
pub const REQUEST_RATE_LIMITS: &str = "requestClaudeCodeRateLimits";
/// Tag of the host → panel rate-limit response
pub const RATE_LIMITS_RESPONSE: &str = "claudeCodeRateLimits";
/// Tag of the panel → host "open this URL" request
pub const OPEN_EXTERNAL: &str = "openExternal";

/// Errors raised while encoding or decoding channel messages
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A message carried a known tag but its body did not match the schema
    #[error("malformed `{tag}` message: {source}")]
    Decode {
        tag: String,
        #[source]
        source: serde_json::Error,
    },

    /// A host-side payload could not be turned into JSON
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Message from panel to host (upstream)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutboundMessage {
    /// Ask the host to compute a fresh rate-limit snapshot
    #[serde(rename = "requestClaudeCodeRateLimits")]
    RequestRateLimits,
    /// Ask the host to open a URL outside the sandbox
    #[serde(rename = "openExternal")]
    OpenExternal { url: String },
}

impl OutboundMessage {
    /// Wire tag of this message
    pub fn type_tag(&self) -> &'static str {
        match self {
            OutboundMessage::RequestRateLimits => REQUEST_RATE_LIMITS,
            OutboundMessage::OpenExternal { .. } => OPEN_EXTERNAL,
        }
    }
}

/// Body of a `claudeCodeRateLimits` message.
///
/// Both fields are optional on the wire. An empty `error` string counts as
/// absent, the same way the host's own front-end treats it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateLimitsResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<RateLimitSnapshot>,
}

impl RateLimitsResponse {
    /// Host error text, if one was reported
    pub fn error_text(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}

/// Raw message delivered on the shared channel (host → panel)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InboundMessage(Value);

impl InboundMessage {
    /// Wrap an already-parsed JSON value
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Parse a message from its JSON text
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text)
            .map(Self)
            .map_err(|source| ProtocolError::Decode {
                tag: "<unknown>".to_string(),
                source,
            })
    }

    /// Build a successful rate-limit response (host side)
    pub fn rate_limits(values: &RateLimitSnapshot) -> Result<Self, ProtocolError> {
        let response = RateLimitsResponse {
            error: None,
            values: Some(values.clone()),
        };
        Self::tagged(RATE_LIMITS_RESPONSE, &response)
    }

    /// Build a failed rate-limit response (host side)
    pub fn rate_limits_error(message: impl Into<String>) -> Self {
        Self(serde_json::json!({
            "type": RATE_LIMITS_RESPONSE,
            "error": message.into(),
        }))
    }

    /// Build a rate-limit response carrying neither `error` nor `values`
    pub fn rate_limits_empty() -> Self {
        Self(serde_json::json!({ "type": RATE_LIMITS_RESPONSE }))
    }

    /// Build a message with the given tag and a serializable object body
    pub fn tagged<T: Serialize>(tag: &str, body: &T) -> Result<Self, ProtocolError> {
        let mut value = serde_json::to_value(body).map_err(ProtocolError::Encode)?;
        match value {
            Value::Object(ref mut map) => {
                map.insert("type".to_string(), Value::String(tag.to_string()));
            }
            _ => {
                value = serde_json::json!({ "type": tag });
            }
        }
        Ok(Self(value))
    }

    /// The `type` tag, if the message has a string one
    pub fn type_tag(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    /// Underlying JSON value
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Decode the rate-limit response carried by this message.
    ///
    /// Returns `Ok(None)` for any other message type (including untagged
    /// messages), and an error only when the tag matches but the body does
    /// not.
    pub fn decode_rate_limits(&self) -> Result<Option<RateLimitsResponse>, ProtocolError> {
        if self.type_tag() != Some(RATE_LIMITS_RESPONSE) {
            return Ok(None);
        }
        RateLimitsResponse::deserialize(&self.0)
            .map(Some)
            .map_err(|source| ProtocolError::Decode {
                tag: RATE_LIMITS_RESPONSE.to_string(),
                source,
            })
    }
}

impl From<Value> for InboundMessage {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
