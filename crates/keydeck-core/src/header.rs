//! Routing header extraction.

use std::fmt;

use keydeck_types::EnvelopeHeader;
use serde::de::value::MapAccessDeserializer;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::error::DecodeError;

/// Parse only the routing fields (`event`, `action`, `context`) of a raw message.
///
/// The payload is skipped; it is decoded later, and only if some handler
/// declares interest in the event.
///
/// # Errors
///
/// Returns `DecodeError::Envelope` if `raw` is not a JSON object with a string
/// `event` field.
pub fn decode_header(raw: &str) -> Result<EnvelopeHeader, DecodeError> {
    serde_json::from_str::<ObjectHeader>(raw)
        .map(|header| header.0)
        .map_err(DecodeError::Envelope)
}

/// Header that only decodes from a JSON object. The derived struct decoding
/// also takes positional arrays.
struct ObjectHeader(EnvelopeHeader);

impl<'de> Deserialize<'de> for ObjectHeader {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HeaderVisitor;

        impl<'de> Visitor<'de> for HeaderVisitor {
            type Value = EnvelopeHeader;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an envelope object")
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                EnvelopeHeader::deserialize(MapAccessDeserializer::new(map))
            }
        }

        deserializer.deserialize_map(HeaderVisitor).map(ObjectHeader)
    }
}
