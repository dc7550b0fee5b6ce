// SPDX-License-Identifier: MIT

//! Core value types used throughout the schema.
//!
//! This module carries the two mechanisms that recur across every CoSWID
//! entity:
//!
//! - [`CodeOrText`] and [`Registry`]: the code/string dual representation
//!   behind every registry-backed enumerated field. A value is either a
//!   small integer code-point or an extensible text label; CBOR prefers the
//!   code, JSON and XML prefer the canonical name.
//! - [`OneOrMore`]: the `entry / [2* entry]` collection rule. A one-element
//!   collection travels as the bare entry on CBOR (no array wrapper), two or
//!   more travel as an array, and zero is a hard encode error.
//!
//! Plus the small serde plumbing both need: a map key that deserializes from
//! either an integer (CBOR `keyasint`) or a member name (JSON), a byte-string
//! wrapper (serde would otherwise encode `Vec<u8>` as an integer array), and
//! the RFC 8949 tag-1 integer timestamp.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use derive_more::From;
use serde::de::value::{MapAccessDeserializer, SeqAccessDeserializer};
use serde::de::{MapAccess, SeqAccess, Unexpected, Visitor};
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Text represents a UTF-8 string value
pub type Text = String;
/// Bytes represents an un-tagged array of bytes
pub type Bytes = Vec<u8>;

/// Strip the module path off a type name for use in error messages.
pub(crate) fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// A registry-backed enumerated value: either a code-point or a text label.
///
/// After any successful decode the stored representation is the most
/// specific one derivable: a string matching a registry entry is codified to
/// its integer, and stays numeric internally until asked to stringify.
#[derive(Debug, Clone, PartialEq, Eq, From)]
pub enum CodeOrText {
    /// A registered (or private-use) integer code-point
    Code(u64),
    /// An extensible text label
    Text(Text),
}

impl CodeOrText {
    /// Map a text label to its code-point when the registry knows it,
    /// keeping unknown labels verbatim.
    pub(crate) fn codified(s: Text, registry: &Registry) -> Self {
        match registry.code_of(&s) {
            Some(code) => Self::Code(code),
            None => Self::Text(s),
        }
    }

    /// Text form, synthesizing `"<label>(<code>)"` for unregistered codes.
    pub(crate) fn to_text(&self, registry: &Registry) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Code(code) => match registry.name_of(*code) {
                Some(name) => name.to_owned(),
                None => format!("{}({})", registry.label, code),
            },
        }
    }
}

/// An immutable code-point to canonical-name mapping for one enumerated
/// field kind, plus the label used when synthesizing names for codes the
/// registry does not know.
///
/// Registries are built at compile time and never mutated, so they are safe
/// for unrestricted concurrent reads.
pub struct Registry {
    pub(crate) label: &'static str,
    entries: &'static [(u64, &'static str)],
    /// Largest code-point representable in this field's numeric domain.
    ceiling: u64,
}

impl Registry {
    pub(crate) const fn new(
        label: &'static str,
        entries: &'static [(u64, &'static str)],
        ceiling: u64,
    ) -> Self {
        Self {
            label,
            entries,
            ceiling,
        }
    }

    pub(crate) fn name_of(&self, code: u64) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, name)| *name)
    }

    pub(crate) fn code_of(&self, name: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(c, _)| *c)
    }
}

/// Encode a [`CodeOrText`] the way the target format prefers it.
///
/// CBOR minimizes bandwidth: known names are codified and emitted as
/// integers, unknown labels stay text. Human-readable formats maximize
/// expressiveness: codes render as canonical names, unregistered codes as
/// the synthesized `"<label>(<code>)"` form. A bare integer is never emitted
/// into a human-readable format.
pub(crate) fn serialize_code<S>(
    value: &CodeOrText,
    registry: &'static Registry,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if serializer.is_human_readable() {
        serializer.serialize_str(&value.to_text(registry))
    } else {
        match value {
            CodeOrText::Code(code) => serializer.serialize_u64(*code),
            CodeOrText::Text(s) => match registry.code_of(s) {
                Some(code) => serializer.serialize_u64(code),
                None => serializer.serialize_str(s),
            },
        }
    }
}

/// Visitor canonicalizing a decoded scalar into a [`CodeOrText`].
///
/// Accepts unsigned integers within the registry's numeric domain, strings
/// (codified when registered), and JSON numbers that happen to arrive as
/// floats provided they are exactly integral.
pub(crate) struct CodeVisitor(pub(crate) &'static Registry);

impl CodeVisitor {
    fn out_of_range<E: serde::de::Error>(&self) -> E {
        E::custom(format!(
            "{} should never be above max of int64",
            self.0.label
        ))
    }
}

impl<'de> Visitor<'de> for CodeVisitor {
    type Value = CodeOrText;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "{} code-point or text", self.0.label)
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
        if v > self.0.ceiling {
            return Err(self.out_of_range());
        }
        Ok(CodeOrText::Code(v))
    }

    fn visit_u128<E: serde::de::Error>(self, v: u128) -> Result<Self::Value, E> {
        if v > self.0.ceiling as u128 {
            return Err(self.out_of_range());
        }
        Ok(CodeOrText::Code(v as u64))
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
        if v < 0 {
            return Err(E::invalid_type(Unexpected::Signed(v), &self));
        }
        self.visit_u64(v as u64)
    }

    fn visit_i128<E: serde::de::Error>(self, v: i128) -> Result<Self::Value, E> {
        if v < 0 {
            return Err(E::custom(format!("unhandled {} code-point {v}", self.0.label)));
        }
        self.visit_u128(v as u128)
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Self::Value, E> {
        // JSON numbers may surface as floats; only exact integers qualify.
        if v.fract() == 0.0 && v >= 0.0 && v <= self.0.ceiling as f64 {
            return Ok(CodeOrText::Code(v as u64));
        }
        Err(E::custom(format!("number {v} is not int64")))
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(CodeOrText::codified(v.to_owned(), self.0))
    }

    fn visit_string<E: serde::de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(CodeOrText::codified(v, self.0))
    }
}

pub(crate) fn deserialize_code<'de, D>(
    registry: &'static Registry,
    deserializer: D,
) -> Result<CodeOrText, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(CodeVisitor(registry))
}

/// A map key decoded from either wire convention: integer (`keyasint` CBOR
/// maps) or member name (JSON objects). Unknown keys simply never match and
/// their values are dropped by the caller.
#[doc(hidden)]
#[derive(Debug)]
pub enum MapKey {
    Code(u64),
    Name(String),
}

impl MapKey {
    pub fn is(&self, code: u64, name: &str) -> bool {
        match self {
            Self::Code(c) => *c == code,
            Self::Name(n) => n == name,
        }
    }
}

impl<'de> Deserialize<'de> for MapKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyVisitor;

        impl<'de> Visitor<'de> for KeyVisitor {
            type Value = MapKey;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an integer or text map key")
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(MapKey::Code(v))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
                // Negative keys are private-use space; they never match a
                // modeled field and fall through to the ignored branch.
                if v >= 0 {
                    Ok(MapKey::Code(v as u64))
                } else {
                    Ok(MapKey::Name(v.to_string()))
                }
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(MapKey::Name(v.to_owned()))
            }

            fn visit_string<E: serde::de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(MapKey::Name(v))
            }
        }

        deserializer.deserialize_any(KeyVisitor)
    }
}

/// Serializes a byte slice as a proper byte string (CBOR major type 2)
/// rather than the integer array serde derives would produce.
pub(crate) struct RawBytes<'a>(pub(crate) &'a [u8]);

impl Serialize for RawBytes<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(self.0)
    }
}

/// Owned counterpart of [`RawBytes`] for the decode direction.
#[derive(Debug, Clone, PartialEq, Eq, From)]
pub(crate) struct ByteBuf(pub(crate) Bytes);

impl<'de> Deserialize<'de> for ByteBuf {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BytesVisitor;

        impl<'de> Visitor<'de> for BytesVisitor {
            type Value = ByteBuf;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a byte string")
            }

            fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
                Ok(ByteBuf(v.to_vec()))
            }

            fn visit_borrowed_bytes<E: serde::de::Error>(
                self,
                v: &'de [u8],
            ) -> Result<Self::Value, E> {
                Ok(ByteBuf(v.to_vec()))
            }

            fn visit_byte_buf<E: serde::de::Error>(self, v: Vec<u8>) -> Result<Self::Value, E> {
                Ok(ByteBuf(v))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut buf = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(byte) = seq.next_element::<u8>()? {
                    buf.push(byte);
                }
                Ok(ByteBuf(buf))
            }
        }

        deserializer.deserialize_bytes(BytesVisitor)
    }
}

/// A representation of time as epoch seconds, carried with CBOR tag 1 on the
/// binary format (RFC 8949) and as a bare integer on the text formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, From)]
pub struct IntegerTime(pub i64);

impl Serialize for IntegerTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_i64(self.0)
        } else {
            ciborium::tag::Accepted::<i64, 1>(self.0).serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for IntegerTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            Ok(Self(i64::deserialize(deserializer)?))
        } else {
            Ok(Self(
                ciborium::tag::Accepted::<i64, 1>::deserialize(deserializer)?.0,
            ))
        }
    }
}

/// An ordered collection implementing the `entry / [2* entry]` wire rule.
///
/// In memory this is a uniform `Vec<T>`; the singleton/array distinction
/// exists only on the wire. Encoding collapses a one-element collection to
/// the bare entry on CBOR (text formats keep ordinary array semantics) and
/// rejects zero-length collections outright. Decoding accepts either a bare
/// entry or an array on every format, keyed off the outer framing of `T`
/// (map vs array), never off content heuristics.
#[derive(Debug, Clone, PartialEq, Eq, From)]
pub struct OneOrMore<T>(pub Vec<T>);

// Manual impl: the derive would add a T: Default bound.
impl<T> Default for OneOrMore<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> OneOrMore<T> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, value: T) {
        self.0.push(value)
    }
}

impl<T> From<T> for OneOrMore<T> {
    fn from(value: T) -> Self {
        Self(vec![value])
    }
}

impl<T> Deref for OneOrMore<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for OneOrMore<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T: Serialize> Serialize for OneOrMore<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_empty() {
            return Err(S::Error::custom(format!(
                "array of {} MUST NOT be 0-length",
                short_type_name::<T>()
            )));
        }
        if self.0.len() == 1 && !serializer.is_human_readable() {
            self.0[0].serialize(serializer)
        } else {
            serializer.collect_seq(self.0.iter())
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OneOrMore<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OneOrMoreVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for OneOrMoreVisitor<T> {
            type Value = OneOrMore<T>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(
                    formatter,
                    "a {} entry or a sequence of entries",
                    short_type_name::<T>()
                )
            }

            fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Self::Value, A::Error> {
                Vec::<T>::deserialize(SeqAccessDeserializer::new(seq)).map(OneOrMore)
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                let entry = T::deserialize(MapAccessDeserializer::new(map))?;
                Ok(OneOrMore(vec![entry]))
            }
        }

        deserializer.deserialize_any(OneOrMoreVisitor(PhantomData))
    }
}
