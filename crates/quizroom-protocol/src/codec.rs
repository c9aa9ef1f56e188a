//! Codec trait and implementations for serializing/deserializing records.
//!
//! The gateway doesn't care HOW channel frames and backend rows are
//! encoded; it only needs something that implements [`Codec`].
//! [`JsonCodec`] is the only implementation today, matching what the
//! hosted backend speaks.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Turns records into frame bytes and frame bytes into records.
///
/// Held by the realtime channel's reader task for the life of a
/// subscription, hence `Send + Sync + 'static`.
pub trait Codec: Send + Sync + 'static {
    /// Encodes an outgoing frame.
    ///
    /// # Errors
    /// [`ProtocolError::Encode`] if `value` can't be represented.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Decodes an incoming frame or backend row.
    ///
    /// # Errors
    /// [`ProtocolError::Decode`] if `data` isn't a valid `T`.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// JSON frames via `serde_json`, as the hosted backend sends them.
///
/// ## Example
///
/// ```rust
/// use quizroom_protocol::{ChannelEvent, Codec, JsonCodec, StudentId};
///
/// let codec = JsonCodec;
///
/// let frame = br#"{"event":"student_kicked","payload":{"student_id":"s-1"}}"#;
/// let event: ChannelEvent = codec.decode(frame).unwrap();
/// assert_eq!(
///     event,
///     ChannelEvent::StudentKicked { student_id: StudentId::new("s-1") }
/// );
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
