// SPDX-License-Identifier: MIT

//! Error types shared by every codec in the crate.
//!
//! The taxonomy mirrors the ways a SWID document can go wrong on the wire:
//! type errors (a field held something the schema does not allow), format
//! errors (a composite string did not match its expected shape), lookup
//! errors (a code-point or name missing from its registry where synthesis is
//! not permitted), cardinality errors (zero-length collection encodes), and
//! errors propagated verbatim from the byte-level engines.
//!
//! All failures are returned to the caller; nothing panics and nothing is
//! retried internally.

#[derive(Debug)]
pub enum Error {
    /// CBOR engine failure, carried as text since the engine errors are
    /// generic over the underlying reader/writer.
    Cbor(String),
    /// JSON engine failure, propagated verbatim.
    Json(serde_json::Error),
    /// XML syntax or structural failure.
    Xml(String),
    /// A required XML attribute was absent.
    MissingXmlAttribute(&'static str),
    /// A code-point with no registry entry where a bare synthesized label is
    /// not acceptable (XML attribute encoding).
    UnknownCodePoint {
        kind: &'static str,
        code: u64,
    },
    /// A role code-point above the signed 64-bit ceiling.
    RoleCodeRange,
    /// `set` was handed an algorithm absent from the named-information
    /// registry.
    UnknownHashAlgorithm(u64),
    /// String-form hash entry named an algorithm absent from the registry.
    UnknownHashAlgorithmName(String),
    /// String-form encode of a hash entry whose algorithm id is not
    /// registered.
    UnknownHashAlgorithmId(u64),
    /// Digest length does not match what the algorithm mandates.
    HashLengthMismatch {
        alg: &'static str,
        want: usize,
        got: usize,
    },
    EmptyHashValue,
    /// String-form hash entry did not split into `<alg>;<value>`.
    BadHashFormat,
    Base64(base64::DecodeError),
    /// Binary tag identifiers are exactly 16 bytes.
    BinaryTagIdLength,
    EmptyTagId,
    /// Zero-length collection handed to an encoder.
    EmptyCollection(&'static str),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cbor(msg) => write!(f, "{msg}"),
            Self::Json(err) => write!(f, "{err}"),
            Self::Xml(msg) => write!(f, "{msg}"),
            Self::MissingXmlAttribute(name) => write!(f, "missing {name} attribute"),
            Self::UnknownCodePoint { kind, code } => {
                write!(f, "unknown {kind} code-point {code}")
            }
            Self::RoleCodeRange => write!(f, "role should never be above max of int64"),
            Self::UnknownHashAlgorithm(id) => write!(f, "unknown hash algorithm {id}"),
            Self::UnknownHashAlgorithmName(name) => write!(f, "unknown hash algorithm {name}"),
            Self::UnknownHashAlgorithmId(id) => write!(f, "unknown hash algorithm ID {id}"),
            Self::HashLengthMismatch { alg, want, got } => write!(
                f,
                "length mismatch for hash algorithm {alg}: want {want} bytes, got {got}"
            ),
            Self::EmptyHashValue => write!(f, "empty hash value"),
            Self::BadHashFormat => {
                write!(f, "bad format: expecting <hash-alg-string>;<hash-value>")
            }
            Self::Base64(err) => write!(f, "{err}"),
            Self::BinaryTagIdLength => write!(f, "binary tag-id MUST be 16 bytes"),
            Self::EmptyTagId => write!(f, "empty tag-id"),
            Self::EmptyCollection(kind) => {
                write!(f, "array of {kind} MUST NOT be 0-length")
            }
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Self::Base64(err)
    }
}
