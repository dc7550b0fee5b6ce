// SPDX-License-Identifier: MIT

//! Cryptographic digests against the IANA "Named Information Hash Algorithm"
//! registry.
//!
//! A [`HashEntry`] pairs an algorithm identifier with its digest bytes. The
//! wire forms differ completely by format: CBOR uses a two-element array
//! `[alg-id, bytes]`, while JSON and XML use the composite string
//! `"<alg-name>;<base64-digest>"`. The legacy `:` separator is accepted on
//! decode for compatibility with older producers, but never emitted.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::{Bytes, ByteBuf, RawBytes};
use crate::error::Error;
use crate::result::Result;

/// id, canonical name, digest length in bytes
const ALGORITHMS: &[(u64, &str, usize)] = &[
    (1, "sha-256", 32),
    (2, "sha-256-128", 16),
    (3, "sha-256-120", 15),
    (4, "sha-256-96", 12),
    (5, "sha-256-64", 8),
    (6, "sha-256-32", 4),
    (7, "sha-384", 48),
    (8, "sha-512", 64),
    (9, "sha3-224", 28),
    (10, "sha3-256", 32),
    (11, "sha3-384", 48),
    (12, "sha3-512", 64),
];

fn alg_by_id(id: u64) -> Option<(&'static str, usize)> {
    ALGORITHMS
        .iter()
        .find(|(i, _, _)| *i == id)
        .map(|(_, name, len)| (*name, *len))
}

fn alg_by_name(name: &str) -> Option<(u64, usize)> {
    ALGORITHMS
        .iter()
        .find(|(_, n, _)| n.eq_ignore_ascii_case(name))
        .map(|(id, _, len)| (*id, *len))
}

/// A digest and the algorithm that produced it.
///
/// The fields are public for direct construction when validation is not
/// wanted (e.g. carrying an algorithm this registry snapshot does not know);
/// [`HashEntry::set`] is the checked path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HashEntry {
    pub alg_id: u64,
    pub value: Bytes,
}

impl HashEntry {
    pub const ALG_SHA_256: u64 = 1;
    pub const ALG_SHA_256_128: u64 = 2;
    pub const ALG_SHA_256_120: u64 = 3;
    pub const ALG_SHA_256_96: u64 = 4;
    pub const ALG_SHA_256_64: u64 = 5;
    pub const ALG_SHA_256_32: u64 = 6;
    pub const ALG_SHA_384: u64 = 7;
    pub const ALG_SHA_512: u64 = 8;
    pub const ALG_SHA3_224: u64 = 9;
    pub const ALG_SHA3_256: u64 = 10;
    pub const ALG_SHA3_384: u64 = 11;
    pub const ALG_SHA3_512: u64 = 12;

    /// Validate the pair against the registry and store it. The entry is
    /// left untouched on failure.
    pub fn set(&mut self, alg_id: u64, value: Bytes) -> Result<()> {
        Self::valid(alg_id, &value)?;
        self.alg_id = alg_id;
        self.value = value;
        Ok(())
    }

    /// Check that the algorithm is registered and the digest has the length
    /// it mandates.
    pub fn valid(alg_id: u64, value: &[u8]) -> Result<()> {
        let (name, want) = alg_by_id(alg_id).ok_or(Error::UnknownHashAlgorithm(alg_id))?;
        if value.len() != want {
            return Err(Error::HashLengthMismatch {
                alg: name,
                want,
                got: value.len(),
            });
        }
        Ok(())
    }

    /// The composite `"<alg-name>;<base64-digest>"` string form.
    pub fn to_text(&self) -> Result<String> {
        let (name, _) = alg_by_id(self.alg_id).ok_or(Error::UnknownHashAlgorithmId(self.alg_id))?;
        if self.value.is_empty() {
            return Err(Error::EmptyHashValue);
        }
        Ok(format!("{};{}", name, STANDARD.encode(&self.value)))
    }

    /// Parse the composite string form. The algorithm name is matched
    /// case-insensitively; digest length is not checked here, matching the
    /// wire decoders which accept what the producer sent.
    pub fn from_text(s: &str) -> Result<Self> {
        let (name, b64) = split_composite(s)?;
        let (alg_id, _) = alg_by_name(name)
            .ok_or_else(|| Error::UnknownHashAlgorithmName(name.to_owned()))?;
        let value = STANDARD.decode(b64)?;
        Ok(Self { alg_id, value })
    }
}

fn split_composite(s: &str) -> Result<(&str, &str)> {
    for sep in [';', ':'] {
        let mut parts = s.split(sep);
        if let (Some(name), Some(value), None) = (parts.next(), parts.next(), parts.next()) {
            let (name, value) = (name.trim(), value.trim());
            if !name.is_empty() && !value.is_empty() {
                return Ok((name, value));
            }
        }
    }
    Err(Error::BadHashFormat)
}

impl fmt::Display for HashEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{};{}", self.alg_id, STANDARD.encode(&self.value)),
        }
    }
}

impl Serialize for HashEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            let text = self.to_text().map_err(serde::ser::Error::custom)?;
            serializer.serialize_str(&text)
        } else {
            let mut seq = serializer.serialize_seq(Some(2))?;
            seq.serialize_element(&self.alg_id)?;
            seq.serialize_element(&RawBytes(&self.value))?;
            seq.end()
        }
    }
}

impl<'de> Deserialize<'de> for HashEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_text(&s).map_err(serde::de::Error::custom)
        } else {
            deserializer.deserialize_seq(PairVisitor)
        }
    }
}

struct PairVisitor;

impl<'de> Visitor<'de> for PairVisitor {
    type Value = HashEntry;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a [alg-id, digest] pair")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error> {
        let alg_id = seq
            .next_element::<u64>()?
            .ok_or_else(|| serde::de::Error::invalid_length(0, &self))?;
        let value = seq
            .next_element::<ByteBuf>()?
            .ok_or_else(|| serde::de::Error::invalid_length(1, &self))?;
        Ok(HashEntry {
            alg_id,
            value: value.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_valid_pair() {
        let mut h = HashEntry::default();
        h.set(HashEntry::ALG_SHA_256, vec![0u8; 32]).unwrap();
        assert_eq!(h.alg_id, 1);
    }

    #[test]
    fn set_rejects_length_mismatch_and_leaves_entry_untouched() {
        let mut h = HashEntry::default();
        let err = h.set(HashEntry::ALG_SHA_256, vec![0u8; 4]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "length mismatch for hash algorithm sha-256: want 32 bytes, got 4"
        );
        assert_eq!(h, HashEntry::default());
    }

    #[test]
    fn set_rejects_unknown_algorithm() {
        let mut h = HashEntry::default();
        let err = h.set(99, vec![0u8; 32]).unwrap_err();
        assert_eq!(err.to_string(), "unknown hash algorithm 99");
    }

    #[test]
    fn text_form_round_trip() {
        let h = HashEntry {
            alg_id: HashEntry::ALG_SHA_256,
            value: vec![0xde, 0xad, 0xbe, 0xef],
        };
        assert_eq!(h.to_text().unwrap(), "sha-256;3q2+7w==");
        assert_eq!(HashEntry::from_text("sha-256;3q2+7w==").unwrap(), h);
    }

    #[test]
    fn from_text_accepts_legacy_colon_separator() {
        let h = HashEntry::from_text("sha-256:3q2+7w==").unwrap();
        assert_eq!(h.alg_id, 1);
        assert_eq!(h.value, vec![0xde, 0xad, 0xbe, 0xef]);
        // and encode always emits the semicolon form
        assert_eq!(h.to_text().unwrap(), "sha-256;3q2+7w==");
    }

    #[test]
    fn from_text_is_case_insensitive_on_the_algorithm() {
        let h = HashEntry::from_text("SHA-256;3q2+7w==").unwrap();
        assert_eq!(h.alg_id, 1);
    }

    #[test]
    fn from_text_rejects_malformed_strings() {
        for s in ["", "sha-256", ";3q2+7w==", "sha-256;", "a;b;c"] {
            let err = HashEntry::from_text(s).unwrap_err();
            assert_eq!(
                err.to_string(),
                "bad format: expecting <hash-alg-string>;<hash-value>",
                "input {s:?}"
            );
        }
    }

    #[test]
    fn from_text_propagates_base64_decode_errors() {
        let err = HashEntry::from_text("sha-256;not//valid=base64!").unwrap_err();
        assert!(matches!(err, Error::Base64(_)));
    }

    #[test]
    fn from_text_rejects_unknown_algorithm_name() {
        let err = HashEntry::from_text("sha-257;3q2+7w==").unwrap_err();
        assert_eq!(err.to_string(), "unknown hash algorithm sha-257");
    }

    #[test]
    fn to_text_needs_a_registered_algorithm_and_a_value() {
        let unknown = HashEntry {
            alg_id: 99,
            value: vec![1],
        };
        assert_eq!(
            unknown.to_text().unwrap_err().to_string(),
            "unknown hash algorithm ID 99"
        );

        let empty = HashEntry {
            alg_id: 1,
            value: vec![],
        };
        assert_eq!(empty.to_text().unwrap_err().to_string(), "empty hash value");
    }

    #[test]
    fn cbor_form_is_a_two_tuple_with_a_byte_string() {
        let h = HashEntry {
            alg_id: HashEntry::ALG_SHA_256,
            value: vec![0xde, 0xad, 0xbe, 0xef],
        };
        let mut buf = Vec::new();
        ciborium::into_writer(&h, &mut buf).unwrap();
        assert_eq!(buf, vec![0x82, 0x01, 0x44, 0xde, 0xad, 0xbe, 0xef]);

        let back: HashEntry = ciborium::from_reader(buf.as_slice()).unwrap();
        assert_eq!(back, h);
    }

    #[test]
    fn json_form_is_the_composite_string() {
        let h = HashEntry {
            alg_id: HashEntry::ALG_SHA_256,
            value: vec![0xde, 0xad, 0xbe, 0xef],
        };
        assert_eq!(serde_json::to_string(&h).unwrap(), r#""sha-256;3q2+7w==""#);
        let back: HashEntry = serde_json::from_str(r#""sha-256;3q2+7w==""#).unwrap();
        assert_eq!(back, h);
    }
}
