// SPDX-License-Identifier: MIT

//! Tag identifiers.
//!
//! A tag-id is either an opaque non-empty string or a 16-byte RFC 4122
//! UUID. The distinction matters only on the binary format, where a UUID
//! travels as a 16-byte string instead of text; the text formats always
//! carry the canonical hyphenated rendering and re-detect UUIDs on parse.

use std::fmt;
use std::str::FromStr;

use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::core::Text;
use crate::error::Error;
use crate::result::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagId {
    Text(Text),
    Uuid(Uuid),
}

impl TagId {
    /// A URI naming the tag: opaque identifiers are assumed to already be
    /// URIs, UUIDs get the `swid:` scheme prefix.
    pub fn uri(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Uuid(u) => format!("swid:{u}"),
        }
    }
}

impl TryFrom<&str> for TagId {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::EmptyTagId);
        }
        match Uuid::try_parse(s) {
            Ok(u) => Ok(Self::Uuid(u)),
            Err(_) => Ok(Self::Text(s.to_owned())),
        }
    }
}

impl FromStr for TagId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::try_from(s)
    }
}

impl From<Uuid> for TagId {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

impl From<[u8; 16]> for TagId {
    fn from(bytes: [u8; 16]) -> Self {
        Self::Uuid(Uuid::from_bytes(bytes))
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Uuid(u) => write!(f, "{u}"),
        }
    }
}

impl Serialize for TagId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            match self {
                Self::Text(s) => serializer.serialize_str(s),
                Self::Uuid(u) => serializer.serialize_bytes(u.as_bytes()),
            }
        }
    }
}

impl<'de> Deserialize<'de> for TagId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::try_from(s.as_str()).map_err(serde::de::Error::custom)
        } else {
            deserializer.deserialize_any(BinaryVisitor)
        }
    }
}

/// On the binary format the text/UUID distinction is carried by the wire
/// type itself, so a text tag-id is kept opaque even when it happens to
/// look like a UUID.
struct BinaryVisitor;

impl<'de> Visitor<'de> for BinaryVisitor {
    type Value = TagId;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a tag-id string or 16-byte UUID")
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
        if v.is_empty() {
            return Err(E::custom(Error::EmptyTagId));
        }
        Ok(TagId::Text(v.to_owned()))
    }

    fn visit_string<E: serde::de::Error>(self, v: String) -> std::result::Result<Self::Value, E> {
        if v.is_empty() {
            return Err(E::custom(Error::EmptyTagId));
        }
        Ok(TagId::Text(v))
    }

    fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> std::result::Result<Self::Value, E> {
        Uuid::from_slice(v)
            .map(TagId::Uuid)
            .map_err(|_| E::custom(Error::BinaryTagIdLength))
    }

    fn visit_byte_buf<E: serde::de::Error>(
        self,
        v: Vec<u8>,
    ) -> std::result::Result<Self::Value, E> {
        self.visit_bytes(&v)
    }
}
