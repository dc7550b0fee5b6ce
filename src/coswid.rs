// SPDX-License-Identifier: MIT

//! The CoSWID schema entities.
//!
//! Every map-shaped entity here is declared once through [`coswid_map!`],
//! which derives both wire conventions from the same field table: integer
//! keys on CBOR, kebab-case member names on JSON. The `*s` aliases are
//! [`OneOrMore`] collections and follow the `entry / [2* entry]` rule.
//!
//! [`SoftwareIdentity`] is the document root and carries the per-format
//! entry points ([`to_cbor`](SoftwareIdentity::to_cbor),
//! [`to_json`](SoftwareIdentity::to_json),
//! [`to_xml`](SoftwareIdentity::to_xml) and their decode counterparts).

use crate::code::{Ownership, Rel, Roles, Use, VersionScheme};
use crate::core::{IntegerTime, OneOrMore, Text};
use crate::coswid_map;
use crate::error::Error;
use crate::hash::HashEntry;
use crate::result::Result;
use crate::tag_id::TagId;

pub type Entities = OneOrMore<Entity>;
pub type Links = OneOrMore<Link>;
pub type SoftwareMetas = OneOrMore<SoftwareMeta>;
pub type Directories = OneOrMore<Directory>;
pub type Files = OneOrMore<File>;
pub type Processes = OneOrMore<Process>;
pub type Resources = OneOrMore<Resource>;

coswid_map! {
    /// The root of a software identity document.
    ///
    /// `tag_version` starts at 0 for the first tag describing a given
    /// product release and increments when the tag itself (not the product)
    /// is corrected. It is always emitted, zero included, because omitting
    /// it is indistinguishable from a producer that forgot it.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SoftwareIdentity {
        [15, "lang", optional] pub lang: Option<Text>,
        [0, "tag-id", required] pub tag_id: TagId,
        [12, "tag-version", required] pub tag_version: i64,
        [8, "corpus", optional] pub corpus: Option<bool>,
        [9, "patch", optional] pub patch: Option<bool>,
        [11, "supplemental", optional] pub supplemental: Option<bool>,
        [1, "software-name", required] pub software_name: Text,
        [13, "software-version", optional] pub software_version: Option<Text>,
        [14, "version-scheme", optional] pub version_scheme: Option<VersionScheme>,
        [10, "media", optional] pub media: Option<Text>,
        [5, "software-meta", optional] pub software_metas: Option<SoftwareMetas>,
        [2, "entity", required] pub entities: Entities,
        [4, "link", optional] pub links: Option<Links>,
        [6, "payload", optional] pub payload: Option<Payload>,
        [3, "evidence", optional] pub evidence: Option<Evidence>,
    }
}

coswid_map! {
    /// An organization or individual and the roles it plays for this tag.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Entity {
        [15, "lang", optional] pub lang: Option<Text>,
        [31, "entity-name", required] pub entity_name: Text,
        [32, "reg-id", optional] pub reg_id: Option<Text>,
        [33, "role", required] pub roles: Roles,
        [34, "thumbprint", optional] pub thumbprint: Option<HashEntry>,
    }
}

coswid_map! {
    /// A typed reference from this tag to another item (another tag, an
    /// installation medium, a license, ...).
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Link {
        [15, "lang", optional] pub lang: Option<Text>,
        [37, "artifact", optional] pub artifact: Option<Text>,
        [38, "href", required] pub href: Text,
        [10, "media", optional] pub media: Option<Text>,
        [39, "ownership", optional] pub ownership: Option<Ownership>,
        [40, "rel", required] pub rel: Rel,
        [41, "media-type", optional] pub media_type: Option<Text>,
        [42, "use", optional] pub r#use: Option<Use>,
    }
}

coswid_map! {
    /// Optional descriptive attributes of the software component.
    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    pub struct SoftwareMeta {
        [15, "lang", optional] pub lang: Option<Text>,
        [43, "activation-status", optional] pub activation_status: Option<Text>,
        [44, "channel-type", optional] pub channel_type: Option<Text>,
        [45, "colloquial-version", optional] pub colloquial_version: Option<Text>,
        [46, "description", optional] pub description: Option<Text>,
        [47, "edition", optional] pub edition: Option<Text>,
        [48, "entitlement-data-required", optional] pub entitlement_data_required: Option<bool>,
        [49, "entitlement-key", optional] pub entitlement_key: Option<Text>,
        [50, "generator", optional] pub generator: Option<Text>,
        [51, "persistent-id", optional] pub persistent_id: Option<Text>,
        [52, "product", optional] pub product: Option<Text>,
        [53, "product-family", optional] pub product_family: Option<Text>,
        [54, "revision", optional] pub revision: Option<Text>,
        [55, "summary", optional] pub summary: Option<Text>,
        [56, "unspsc-code", optional] pub unspsc_code: Option<Text>,
        [57, "unspsc-version", optional] pub unspsc_version: Option<Text>,
    }
}

coswid_map! {
    /// A file installed (payload) or observed (evidence) on a system.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct File {
        [15, "lang", optional] pub lang: Option<Text>,
        [22, "key", optional] pub key: Option<bool>,
        [23, "location", optional] pub location: Option<Text>,
        [24, "fs-name", required] pub fs_name: Text,
        [25, "root", optional] pub root: Option<Text>,
        [20, "size", optional] pub size: Option<i64>,
        [21, "file-version", optional] pub file_version: Option<Text>,
        [7, "hash", optional] pub hash: Option<HashEntry>,
    }
}

coswid_map! {
    /// A directory and the path elements below it.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Directory {
        [15, "lang", optional] pub lang: Option<Text>,
        [22, "key", optional] pub key: Option<bool>,
        [23, "location", optional] pub location: Option<Text>,
        [24, "fs-name", required] pub fs_name: Text,
        [25, "root", optional] pub root: Option<Text>,
        [26, "path-elements", required] pub path_elements: PathElements,
    }
}

coswid_map! {
    /// The filesystem content below a [`Directory`].
    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    pub struct PathElements {
        [16, "directory", optional] pub directories: Option<Directories>,
        [17, "file", optional] pub files: Option<Files>,
    }
}

coswid_map! {
    /// A running or installable process.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Process {
        [15, "lang", optional] pub lang: Option<Text>,
        [27, "process-name", required] pub process_name: Text,
        [28, "pid", optional] pub pid: Option<i64>,
    }
}

coswid_map! {
    /// A catch-all typed resource.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Resource {
        [15, "lang", optional] pub lang: Option<Text>,
        [29, "type", required] pub r#type: Text,
    }
}

coswid_map! {
    /// What the software is expected to put on a system when installed.
    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    pub struct Payload {
        [15, "lang", optional] pub lang: Option<Text>,
        [16, "directory", optional] pub directories: Option<Directories>,
        [17, "file", optional] pub files: Option<Files>,
        [18, "process", optional] pub processes: Option<Processes>,
        [19, "resource", optional] pub resources: Option<Resources>,
    }
}

coswid_map! {
    /// What was actually observed on a system, and when and where.
    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    pub struct Evidence {
        [15, "lang", optional] pub lang: Option<Text>,
        [16, "directory", optional] pub directories: Option<Directories>,
        [17, "file", optional] pub files: Option<Files>,
        [18, "process", optional] pub processes: Option<Processes>,
        [19, "resource", optional] pub resources: Option<Resources>,
        [35, "date", optional] pub date: Option<IntegerTime>,
        [36, "device-id", optional] pub device_id: Option<Text>,
    }
}

impl SoftwareIdentity {
    /// Encode to CoSWID CBOR.
    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).map_err(|e| Error::Cbor(e.to_string()))?;
        Ok(buf)
    }

    /// Decode from CoSWID CBOR.
    pub fn from_cbor(data: &[u8]) -> Result<Self> {
        ciborium::from_reader(data).map_err(|e| Error::Cbor(e.to_string()))
    }

    /// Encode to the CoSWID JSON mapping.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from the CoSWID JSON mapping.
    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    /// Encode to ISO SWID XML.
    pub fn to_xml(&self) -> Result<String> {
        crate::xml::to_xml(self)
    }

    /// Decode from ISO SWID XML.
    pub fn from_xml(data: &str) -> Result<Self> {
        crate::xml::from_xml(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Role;
    use crate::test::SerdeTestCase;

    const TAG_UUID: &str = "f432dc99-2e06-434d-b9ad-2b22e35b6fa4";

    fn reference_identity() -> SoftwareIdentity {
        SoftwareIdentity {
            lang: None,
            tag_id: TagId::try_from(TAG_UUID).unwrap(),
            tag_version: 0,
            corpus: None,
            patch: None,
            supplemental: None,
            software_name: "Roadrunner software bundle".to_string(),
            software_version: Some("1.0.0".to_string()),
            version_scheme: None,
            media: None,
            software_metas: None,
            entities: Entity {
                lang: None,
                entity_name: "ACME Ltd".to_string(),
                reg_id: Some("acme.example".to_string()),
                roles: Roles::from(vec![Role::TAG_CREATOR, Role::SOFTWARE_CREATOR]),
                thumbprint: None,
            }
            .into(),
            links: Some(
                Link {
                    lang: None,
                    artifact: None,
                    href: "d84fb5e2-d198-49b4-9d65-3a82421bf180".to_string(),
                    media: None,
                    ownership: None,
                    rel: Rel::PARENT,
                    media_type: None,
                    r#use: None,
                }
                .into(),
            ),
            payload: None,
            evidence: None,
        }
    }

    #[test]
    fn software_identity_reference_vectors() {
        SerdeTestCase {
            value: reference_identity(),
            expected_json: concat!(
                r#"{"tag-id":"f432dc99-2e06-434d-b9ad-2b22e35b6fa4","#,
                r#""tag-version":0,"#,
                r#""software-name":"Roadrunner software bundle","#,
                r#""software-version":"1.0.0","#,
                r#""entity":[{"entity-name":"ACME Ltd","reg-id":"acme.example","#,
                r#""role":["tagCreator","softwareCreator"]}],"#,
                r#""link":[{"href":"d84fb5e2-d198-49b4-9d65-3a82421bf180","rel":"parent"}]}"#,
            ),
            expected_cbor: concat!(
                "a6",
                // 0: tag-id as a 16-byte UUID string
                "0050f432dc992e06434db9ad2b22e35b6fa4",
                // 12: tag-version 0
                "0c00",
                // 1: software-name
                "01781a526f616472756e6e657220736f6674776172652062756e646c65",
                // 13: software-version
                "0d65312e302e30",
                // 2: single entity collapsed to a bare map
                "02a3181f6841434d45204c746418206c61636d652e6578616d706c651821820102",
                // 4: single link collapsed to a bare map
                "04a2182678246438346662356532",
                "2d643139382d343962342d396436352d336138323432316266313830",
                "182806",
            ),
        }
        .run();
    }

    #[test]
    fn cbor_decode_accepts_the_array_form_for_singletons() {
        // Same document with entity and link wrapped in one-element arrays.
        let cbor = crate::test::from_hex(concat!(
            "a6",
            "0050f432dc992e06434db9ad2b22e35b6fa4",
            "0c00",
            "01781a526f616472756e6e657220736f6674776172652062756e646c65",
            "0d65312e302e30",
            "0281a3181f6841434d45204c746418206c61636d652e6578616d706c651821820102",
            "0481a2182678246438346662356532",
            "2d643139382d343962342d396436352d336138323432316266313830",
            "182806",
        ));
        let decoded = SoftwareIdentity::from_cbor(&cbor).unwrap();
        assert_eq!(decoded, reference_identity());
    }

    #[test]
    fn entity_single_role_reference_vectors() {
        SerdeTestCase {
            value: Entity {
                lang: None,
                entity_name: "ACME Ltd".to_string(),
                reg_id: Some("acme.example".to_string()),
                roles: Roles::from(Role::TAG_CREATOR),
                thumbprint: Some(HashEntry {
                    alg_id: HashEntry::ALG_SHA_256_32,
                    value: vec![0x00, 0x01, 0x02, 0x03],
                }),
            },
            expected_json: concat!(
                r#"{"entity-name":"ACME Ltd","reg-id":"acme.example","#,
                r#""role":"tagCreator","thumbprint":"sha-256-32;AAECAw=="}"#,
            ),
            expected_cbor: concat!(
                "a4",
                "181f6841434d45204c7464",
                "18206c61636d652e6578616d706c65",
                // single role collapses to the bare code-point
                "182101",
                "182282064400010203",
            ),
        }
        .run();
    }

    #[test]
    fn entity_mixed_roles_reference_vectors() {
        let entity = Entity {
            lang: None,
            entity_name: "ACME Ltd".to_string(),
            reg_id: None,
            roles: Roles::from(vec![
                Role::TAG_CREATOR,
                Role::AGGREGATOR,
                Role::from("weird-new-role"),
                Role::try_from(20).unwrap(),
            ]),
            thumbprint: None,
        };

        // CBOR keeps the unregistered code-point and round-trips losslessly.
        let mut cbor = Vec::new();
        ciborium::into_writer(&entity, &mut cbor).unwrap();
        assert_eq!(
            crate::test::to_hex(&cbor),
            concat!(
                "a2",
                "181f6841434d45204c7464",
                "18218401036e77656972642d6e65772d726f6c6514",
            )
        );
        let decoded: Entity = ciborium::from_reader(cbor.as_slice()).unwrap();
        assert_eq!(decoded, entity);

        // JSON synthesizes a label for code 20; decoding that label keeps it
        // as an extensible name, so this direction is deliberately lossy.
        let json = serde_json::to_string(&entity).unwrap();
        assert_eq!(
            json,
            concat!(
                r#"{"entity-name":"ACME Ltd","#,
                r#""role":["tagCreator","aggregator","weird-new-role","role(20)"]}"#,
            )
        );
        let decoded: Entity = serde_json::from_str(&json).unwrap();
        assert_eq!(
            decoded.roles,
            Roles::from(vec![
                Role::TAG_CREATOR,
                Role::AGGREGATOR,
                Role::from("weird-new-role"),
                Role::from("role(20)"),
            ])
        );
    }

    #[test]
    fn software_meta_reference_vectors() {
        SerdeTestCase {
            value: SoftwareMeta {
                colloquial_version: Some("2013".to_string()),
                edition: Some("cloud".to_string()),
                product: Some("Roadrunner Detector".to_string()),
                revision: Some("sp1".to_string()),
                ..Default::default()
            },
            expected_json: concat!(
                r#"{"colloquial-version":"2013","edition":"cloud","#,
                r#""product":"Roadrunner Detector","revision":"sp1"}"#,
            ),
            expected_cbor: concat!(
                "a4",
                "182d6432303133",
                "182f65636c6f7564",
                "183473526f616472756e6e6572204465746563746f72",
                "183663737031",
            ),
        }
        .run();
    }

    #[test]
    fn evidence_date_travels_as_tag_1_on_cbor() {
        SerdeTestCase {
            value: Evidence {
                date: Some(IntegerTime(1601424000)),
                device_id: Some("acme-rr-trap".to_string()),
                ..Default::default()
            },
            expected_json: r#"{"date":1601424000,"device-id":"acme-rr-trap"}"#,
            expected_cbor: concat!(
                "a2",
                "1823c11a5f73ca80",
                "18246c61636d652d72722d74726170",
            ),
        }
        .run();
    }

    #[test]
    fn payload_with_nested_directory_reference_vectors() {
        SerdeTestCase {
            value: Payload {
                directories: Some(
                    Directory {
                        lang: None,
                        key: None,
                        location: None,
                        fs_name: "bin".to_string(),
                        root: Some("/usr/local".to_string()),
                        path_elements: PathElements {
                            directories: None,
                            files: Some(
                                File {
                                    lang: None,
                                    key: None,
                                    location: None,
                                    fs_name: "rrdetector".to_string(),
                                    root: None,
                                    size: Some(532712),
                                    file_version: None,
                                    hash: Some(HashEntry {
                                        alg_id: HashEntry::ALG_SHA_256_32,
                                        value: vec![0x00, 0x01, 0x02, 0x03],
                                    }),
                                }
                                .into(),
                            ),
                        },
                    }
                    .into(),
                ),
                ..Default::default()
            },
            expected_json: concat!(
                r#"{"directory":[{"fs-name":"bin","root":"/usr/local","#,
                r#""path-elements":{"file":[{"fs-name":"rrdetector","#,
                r#""size":532712,"hash":"sha-256-32;AAECAw=="}]}}]}"#,
            ),
            expected_cbor: concat!(
                // payload with a single directory, collapsed to a bare map
                "a110a3",
                "18186362696e",
                "18196a2f7573722f6c6f63616c",
                // path-elements with a single file, collapsed to a bare map
                "181aa111a3",
                "18186a72726465746563746f72",
                "141a000820e8",
                "0782064400010203",
            ),
        }
        .run();
    }

    #[test]
    fn json_decode_requires_the_required_fields() {
        let err = SoftwareIdentity::from_json(r#"{"tag-id":"a.b.c","tag-version":0}"#).unwrap_err();
        assert!(err.to_string().contains("missing field `software-name`"));

        let err = SoftwareIdentity::from_json(
            r#"{"tag-id":"a.b.c","tag-version":0,"software-name":"x"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing field `entity`"));
    }

    #[test]
    fn decode_drops_unmodeled_members() {
        let json = concat!(
            r#"{"tag-id":"a.b.c","tag-version":1,"software-name":"x","#,
            r#""mystery-member":{"deep":[1,2,3]},"#,
            r#""entity":{"entity-name":"e","role":"licensor"}}"#,
        );
        let decoded = SoftwareIdentity::from_json(json).unwrap();
        assert_eq!(decoded.tag_version, 1);
        assert_eq!(decoded.entities.len(), 1);
        assert_eq!(decoded.entities[0].roles, Roles::from(Role::LICENSOR));
    }

    #[test]
    fn decode_rejects_duplicate_members() {
        let json = concat!(
            r#"{"tag-id":"a.b.c","tag-id":"d.e.f","tag-version":0,"software-name":"x","#,
            r#""entity":{"entity-name":"e","role":1}}"#,
        );
        let err = SoftwareIdentity::from_json(json).unwrap_err();
        assert!(err.to_string().contains("duplicate field `tag-id`"));
    }

    #[test]
    fn empty_entity_collection_refuses_to_encode() {
        let mut tag = reference_identity();
        tag.entities = Entities::default();
        let err = tag.to_cbor().unwrap_err();
        assert!(err
            .to_string()
            .contains("array of Entity MUST NOT be 0-length"));
    }
}
