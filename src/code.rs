// SPDX-License-Identifier: MIT

//! Registry-backed enumerated values.
//!
//! Five field kinds in the schema draw their values from IANA-style
//! registries: entity roles, link relations, link ownership, resource use
//! and version schemes. Each is a newtype over [`CodeOrText`] bound to its
//! own [`Registry`], giving every one of them the same behavior:
//!
//! - constructing from a string codifies it (registered names become their
//!   integer code-point, anything else is kept as an extensible label)
//! - CBOR encodes the integer form whenever one is derivable
//! - JSON encodes the canonical name, synthesizing `"<kind>(<code>)"` for
//!   codes outside the registry
//! - XML attribute values require a registered name; an unregistered code
//!   has no faithful single-string rendering there and fails the encode
//!
//! [`Role`] additionally caps its numeric domain at the signed 64-bit
//! ceiling, and [`Roles`] carries the set-of-roles attribute with its
//! single-element collapse on the wire.

use std::fmt;

use serde::de::{SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::{deserialize_code, serialize_code, CodeOrText, CodeVisitor, Registry};
use crate::error::Error;
use crate::result::Result;

/// Entity roles, capped at the signed 64-bit ceiling.
pub(crate) static ROLE: Registry = Registry::new(
    "role",
    &[
        (1, "tagCreator"),
        (2, "softwareCreator"),
        (3, "aggregator"),
        (4, "distributor"),
        (5, "licensor"),
        (6, "maintainer"),
    ],
    i64::MAX as u64,
);

/// Link relations.
pub(crate) static REL: Registry = Registry::new(
    "rel",
    &[
        (1, "ancestor"),
        (2, "component"),
        (3, "feature"),
        (4, "installation media"),
        (5, "package installer"),
        (6, "parent"),
        (7, "patches"),
        (8, "requires"),
        (9, "see also"),
        (10, "supersedes"),
        (11, "supplemental"),
    ],
    u64::MAX,
);

/// Link ownership.
pub(crate) static OWNERSHIP: Registry = Registry::new(
    "ownership",
    &[(1, "shared"), (2, "private"), (3, "abandon")],
    u64::MAX,
);

/// Resource use.
pub(crate) static USE: Registry = Registry::new(
    "use",
    &[(1, "optional"), (2, "required"), (3, "recommended")],
    u64::MAX,
);

/// Version schemes.
pub(crate) static VERSION_SCHEME: Registry = Registry::new(
    "version-scheme",
    &[
        (1, "multipartnumeric"),
        (2, "multipartnumeric+suffix"),
        (3, "alphanumeric"),
        (4, "decimal"),
        (16384, "semver"),
    ],
    u64::MAX,
);

macro_rules! registry_code_type {
    ($(#[$meta:meta])* $name:ident, $registry:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name(pub(crate) CodeOrText);

        impl $name {
            /// Canonical text form, synthesizing a label for codes outside
            /// the registry.
            pub fn as_text(&self) -> String {
                self.0.to_text(&$registry)
            }

            pub(crate) fn xml_value(&self) -> Result<String> {
                match &self.0 {
                    CodeOrText::Text(s) => Ok(s.clone()),
                    CodeOrText::Code(code) => $registry
                        .name_of(*code)
                        .map(str::to_owned)
                        .ok_or(Error::UnknownCodePoint {
                            kind: $kind,
                            code: *code,
                        }),
                }
            }

            pub(crate) fn from_xml_value(s: &str) -> Self {
                Self(CodeOrText::codified(s.to_owned(), &$registry))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.as_text())
            }
        }

        impl From<u64> for $name {
            fn from(code: u64) -> Self {
                Self(CodeOrText::Code(code))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(CodeOrText::codified(s.to_owned(), &$registry))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(CodeOrText::codified(s, &$registry))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serialize_code(&self.0, &$registry, serializer)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<Self, D::Error> {
                deserialize_code(&$registry, deserializer).map(Self)
            }
        }
    };
}

registry_code_type! {
    /// The relationship between a link and the tag that carries it.
    Rel, REL, "rel"
}

registry_code_type! {
    /// Responsibility for the artifact a link points at.
    Ownership, OWNERSHIP, "ownership"
}

registry_code_type! {
    /// How necessary a linked resource is for installation.
    Use, USE, "use"
}

registry_code_type! {
    /// The convention a `software-version` string follows.
    VersionScheme, VERSION_SCHEME, "version-scheme"
}

impl Rel {
    pub const ANCESTOR: Self = Self(CodeOrText::Code(1));
    pub const COMPONENT: Self = Self(CodeOrText::Code(2));
    pub const FEATURE: Self = Self(CodeOrText::Code(3));
    pub const INSTALLATION_MEDIA: Self = Self(CodeOrText::Code(4));
    pub const PACKAGE_INSTALLER: Self = Self(CodeOrText::Code(5));
    pub const PARENT: Self = Self(CodeOrText::Code(6));
    pub const PATCHES: Self = Self(CodeOrText::Code(7));
    pub const REQUIRES: Self = Self(CodeOrText::Code(8));
    pub const SEE_ALSO: Self = Self(CodeOrText::Code(9));
    pub const SUPERSEDES: Self = Self(CodeOrText::Code(10));
    pub const SUPPLEMENTAL: Self = Self(CodeOrText::Code(11));
}

impl Ownership {
    pub const SHARED: Self = Self(CodeOrText::Code(1));
    pub const PRIVATE: Self = Self(CodeOrText::Code(2));
    pub const ABANDON: Self = Self(CodeOrText::Code(3));
}

impl Use {
    pub const OPTIONAL: Self = Self(CodeOrText::Code(1));
    pub const REQUIRED: Self = Self(CodeOrText::Code(2));
    pub const RECOMMENDED: Self = Self(CodeOrText::Code(3));
}

impl VersionScheme {
    pub const MULTIPART_NUMERIC: Self = Self(CodeOrText::Code(1));
    pub const MULTIPART_NUMERIC_SUFFIX: Self = Self(CodeOrText::Code(2));
    pub const ALPHANUMERIC: Self = Self(CodeOrText::Code(3));
    pub const DECIMAL: Self = Self(CodeOrText::Code(4));
    pub const SEMVER: Self = Self(CodeOrText::Code(16384));
}

/// A single entity role.
///
/// Unlike the other enumerated kinds, numeric construction is fallible: the
/// role domain is capped at `i64::MAX`, so building one from an arbitrary
/// `u64` goes through `TryFrom`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role(pub(crate) CodeOrText);

impl Role {
    pub const TAG_CREATOR: Self = Self(CodeOrText::Code(1));
    pub const SOFTWARE_CREATOR: Self = Self(CodeOrText::Code(2));
    pub const AGGREGATOR: Self = Self(CodeOrText::Code(3));
    pub const DISTRIBUTOR: Self = Self(CodeOrText::Code(4));
    pub const LICENSOR: Self = Self(CodeOrText::Code(5));
    pub const MAINTAINER: Self = Self(CodeOrText::Code(6));

    /// Canonical text form, synthesizing `"role(<code>)"` for codes outside
    /// the registry.
    pub fn as_text(&self) -> String {
        self.0.to_text(&ROLE)
    }
}

impl TryFrom<u64> for Role {
    type Error = Error;

    fn try_from(code: u64) -> Result<Self> {
        if code > i64::MAX as u64 {
            return Err(Error::RoleCodeRange);
        }
        Ok(Self(CodeOrText::Code(code)))
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Self(CodeOrText::codified(s.to_owned(), &ROLE))
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Self(CodeOrText::codified(s, &ROLE))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serialize_code(&self.0, &ROLE, serializer)
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserialize_code(&ROLE, deserializer).map(Self)
    }
}

/// The roles an [`Entity`](crate::coswid::Entity) plays with respect to its
/// tag.
///
/// On the wire a single role travels as the bare scalar and two or more as
/// an array, on both the binary and JSON formats. Decoding accepts either
/// shape.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Roles(pub(crate) Vec<Role>);

impl Roles {
    pub fn set(&mut self, roles: Vec<Role>) {
        self.0 = roles;
    }

    pub fn push(&mut self, role: Role) {
        self.0.push(role);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Role> {
        self.0.iter()
    }

    /// Space-separated registered names for the XML `role` attribute.
    /// Extensible labels are kept verbatim; codes without a registry entry
    /// have no attribute rendering and are skipped.
    pub(crate) fn xml_value(&self) -> String {
        let mut names = Vec::with_capacity(self.0.len());
        for role in &self.0 {
            match &role.0 {
                CodeOrText::Text(s) => names.push(s.clone()),
                CodeOrText::Code(code) => {
                    if let Some(name) = ROLE.name_of(*code) {
                        names.push(name.to_owned());
                    }
                }
            }
        }
        names.join(" ")
    }

    pub(crate) fn from_xml_value(s: &str) -> Self {
        Self(s.split_whitespace().map(Role::from).collect())
    }
}

impl From<Role> for Roles {
    fn from(role: Role) -> Self {
        Self(vec![role])
    }
}

impl From<Vec<Role>> for Roles {
    fn from(roles: Vec<Role>) -> Self {
        Self(roles)
    }
}

impl fmt::Display for Roles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text: Vec<String> = self.0.iter().map(Role::as_text).collect();
        f.write_str(&text.join(" "))
    }
}

impl Serialize for Roles {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0.as_slice() {
            [one] => one.serialize(serializer),
            many => serializer.collect_seq(many.iter()),
        }
    }
}

impl<'de> Deserialize<'de> for Roles {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RolesVisitor;

        impl<'de> Visitor<'de> for RolesVisitor {
            type Value = Roles;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a role or an array of roles")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error> {
                let mut roles = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(role) = seq.next_element::<Role>()? {
                    roles.push(role);
                }
                Ok(Roles(roles))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
                CodeVisitor(&ROLE).visit_u64(v).map(|c| Roles(vec![Role(c)]))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
                CodeVisitor(&ROLE).visit_i64(v).map(|c| Roles(vec![Role(c)]))
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> std::result::Result<Self::Value, E> {
                CodeVisitor(&ROLE).visit_f64(v).map(|c| Roles(vec![Role(c)]))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
                CodeVisitor(&ROLE).visit_str(v).map(|c| Roles(vec![Role(c)]))
            }

            fn visit_string<E: serde::de::Error>(
                self,
                v: String,
            ) -> std::result::Result<Self::Value, E> {
                CodeVisitor(&ROLE)
                    .visit_string(v)
                    .map(|c| Roles(vec![Role(c)]))
            }
        }

        deserializer.deserialize_any(RolesVisitor)
    }
}
