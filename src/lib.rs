// SPDX-License-Identifier: MIT

//! # swid-rs
//!
//! A Rust implementation of Software Identification tags (SWID / CoSWID, per
//! ISO/IEC 19770-2 and the IETF SACM CoSWID specification).
//!
//! This library provides a typed object graph for software identity documents
//! and bidirectional codecs for the three wire formats the tag family is
//! published in:
//!
//! - **CBOR** (CoSWID): integer map keys, code-points preferred over strings,
//!   singleton collections collapsed to bare entries
//! - **JSON** (CoSWID JSON mapping): kebab-case member names, canonical
//!   registry names preferred over code-points
//! - **XML** (ISO SWID): CamelCase attributes and elements under the
//!   `SoftwareIdentity` root
//!
//! The interesting machinery is the code/string duality used by every
//! registry-backed enumerated field (entity roles, link relations, ownership,
//! use, version schemes, hash algorithms): each such value may travel as a
//! compact integer code-point or as an extensible text label, and each format
//! has its own preference on output. See [`code`] for the details.
//!
//! ## Example
//!
//! ```rust
//! use swid_rs::{Entity, Role, Roles, SoftwareIdentity, TagId};
//!
//! let tag = SoftwareIdentity {
//!     lang: None,
//!     tag_id: TagId::try_from("example.acme.roadrunner-sw-v1-0-0").unwrap(),
//!     tag_version: 0,
//!     corpus: None,
//!     patch: None,
//!     supplemental: None,
//!     software_name: "Roadrunner software bundle".to_string(),
//!     software_version: Some("1.0.0".to_string()),
//!     version_scheme: None,
//!     media: None,
//!     software_metas: None,
//!     entities: Entity {
//!         lang: None,
//!         entity_name: "ACME Ltd".to_string(),
//!         reg_id: Some("acme.example".to_string()),
//!         roles: Roles::from(Role::TAG_CREATOR),
//!         thumbprint: None,
//!     }
//!     .into(),
//!     links: None,
//!     payload: None,
//!     evidence: None,
//! };
//!
//! let cbor = tag.to_cbor().unwrap();
//! let decoded = SoftwareIdentity::from_cbor(&cbor).unwrap();
//! assert_eq!(tag, decoded);
//! ```

/// Registry-backed enumerated values (roles, link relations, ownership, ...)
pub mod code;

/// Core value types and serde plumbing shared across the schema
pub mod core;

/// CoSWID schema entities and the per-format entry points
pub mod coswid;

/// Errors for easily handling problems
pub mod error;

/// Hash entries against the IANA named-information algorithm registry
pub mod hash;

/// Custom SWID Results
pub mod result;

/// Tag identifiers (opaque strings or 16-byte UUIDs)
pub mod tag_id;

/// ISO SWID XML codec
pub(crate) mod xml;

/// Macros for easier implementation definitions
pub(crate) mod macros;


pub use code::{Ownership, Rel, Role, Roles, Use, VersionScheme};
pub use core::{Bytes, IntegerTime, OneOrMore, Text};
pub use coswid::{
    Directories, Directory, Entities, Entity, Evidence, File, Files, Link, Links, PathElements,
    Payload, Process, Processes, Resource, Resources, SoftwareIdentity, SoftwareMeta,
    SoftwareMetas,
};
pub use error::Error;
pub use hash::HashEntry;
pub use result::Result;
pub use tag_id::TagId;
