// SPDX-License-Identifier: MIT

//! The ISO 19770-2 XML codec.
//!
//! XML is attribute-oriented: every scalar field becomes a CamelCase
//! attribute and only the composite entities (Meta, Entity, Link, Payload,
//! Evidence, Directory and its path elements) become child elements. The
//! single-string attribute model also changes how enumerated values travel:
//! a code-point with no registered name cannot be rendered faithfully, so
//! single-valued attributes fail the encode and the multi-valued `role`
//! attribute drops such codes.
//!
//! Decoding is lenient the way XML consumers traditionally are: unknown
//! attributes and child elements are skipped, a missing `tagVersion` reads
//! as 0, and enumerated attribute values are codified exactly like the
//! other decoders do.

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::code::{Ownership, Rel, Roles, Use, VersionScheme};
use crate::coswid::{
    Directory, Entity, Evidence, File, Link, PathElements, Payload, Process, Resource,
    SoftwareIdentity, SoftwareMeta,
};
use crate::core::{short_type_name, IntegerTime, OneOrMore};
use crate::error::Error;
use crate::hash::HashEntry;
use crate::result::Result;
use crate::tag_id::TagId;

pub(crate) fn to_xml(tag: &SoftwareIdentity) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    write_software_identity(&mut writer, tag)?;
    String::from_utf8(writer.into_inner()).map_err(|e| Error::Xml(e.to_string()))
}

pub(crate) fn from_xml(data: &str) -> Result<SoftwareIdentity> {
    let mut reader = Reader::from_str(data);
    loop {
        match reader.read_event().map_err(|e| Error::Xml(e.to_string()))? {
            Event::Start(e) if e.local_name().as_ref() == b"SoftwareIdentity" => {
                return read_software_identity(&mut reader, &e, false);
            }
            Event::Empty(e) if e.local_name().as_ref() == b"SoftwareIdentity" => {
                return read_software_identity(&mut reader, &e, true);
            }
            Event::Eof => {
                return Err(Error::Xml("missing SoftwareIdentity root element".to_string()))
            }
            _ => {}
        }
    }
}

type XmlWriter = Writer<Vec<u8>>;
type XmlReader<'a> = Reader<&'a [u8]>;

fn emit(writer: &mut XmlWriter, event: Event) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::Xml(e.to_string()))
}

fn bool_attr(v: bool) -> &'static str {
    if v {
        "true"
    } else {
        "false"
    }
}

fn require_nonempty<T>(items: &OneOrMore<T>) -> Result<()> {
    if items.is_empty() {
        return Err(Error::EmptyCollection(short_type_name::<T>()));
    }
    Ok(())
}

fn write_software_identity(w: &mut XmlWriter, tag: &SoftwareIdentity) -> Result<()> {
    let mut start = BytesStart::new("SoftwareIdentity");
    if let Some(lang) = &tag.lang {
        start.push_attribute(("xml:lang", lang.as_str()));
    }
    let tag_id = tag.tag_id.to_string();
    start.push_attribute(("tagId", tag_id.as_str()));
    if tag.tag_version != 0 {
        start.push_attribute(("tagVersion", tag.tag_version.to_string().as_str()));
    }
    if let Some(v) = tag.corpus {
        start.push_attribute(("corpus", bool_attr(v)));
    }
    if let Some(v) = tag.patch {
        start.push_attribute(("patch", bool_attr(v)));
    }
    if let Some(v) = tag.supplemental {
        start.push_attribute(("supplemental", bool_attr(v)));
    }
    start.push_attribute(("name", tag.software_name.as_str()));
    if let Some(v) = &tag.software_version {
        start.push_attribute(("version", v.as_str()));
    }
    if let Some(v) = &tag.version_scheme {
        start.push_attribute(("versionScheme", v.xml_value()?.as_str()));
    }
    if let Some(v) = &tag.media {
        start.push_attribute(("media", v.as_str()));
    }
    emit(w, Event::Start(start))?;

    if let Some(metas) = &tag.software_metas {
        require_nonempty(metas)?;
        for meta in metas.iter() {
            write_meta(w, meta)?;
        }
    }
    require_nonempty(&tag.entities)?;
    for entity in tag.entities.iter() {
        write_entity(w, entity)?;
    }
    if let Some(links) = &tag.links {
        require_nonempty(links)?;
        for link in links.iter() {
            write_link(w, link)?;
        }
    }
    if let Some(payload) = &tag.payload {
        write_payload(w, payload)?;
    }
    if let Some(evidence) = &tag.evidence {
        write_evidence(w, evidence)?;
    }

    emit(w, Event::End(BytesEnd::new("SoftwareIdentity")))
}

fn write_meta(w: &mut XmlWriter, meta: &SoftwareMeta) -> Result<()> {
    let mut start = BytesStart::new("Meta");
    if let Some(lang) = &meta.lang {
        start.push_attribute(("xml:lang", lang.as_str()));
    }
    let text_attrs = [
        ("activationStatus", &meta.activation_status),
        ("channelType", &meta.channel_type),
        ("colloquialVersion", &meta.colloquial_version),
        ("description", &meta.description),
        ("edition", &meta.edition),
    ];
    for (name, value) in text_attrs {
        if let Some(v) = value {
            start.push_attribute((name, v.as_str()));
        }
    }
    if let Some(v) = meta.entitlement_data_required {
        start.push_attribute(("entitlementDataRequired", bool_attr(v)));
    }
    let text_attrs = [
        ("entitlementKey", &meta.entitlement_key),
        ("generator", &meta.generator),
        ("persistentId", &meta.persistent_id),
        ("product", &meta.product),
        ("productFamily", &meta.product_family),
        ("revision", &meta.revision),
        ("summary", &meta.summary),
        ("unspscCode", &meta.unspsc_code),
        ("unspscVersion", &meta.unspsc_version),
    ];
    for (name, value) in text_attrs {
        if let Some(v) = value {
            start.push_attribute((name, v.as_str()));
        }
    }
    emit(w, Event::Start(start))?;
    emit(w, Event::End(BytesEnd::new("Meta")))
}

fn write_entity(w: &mut XmlWriter, entity: &Entity) -> Result<()> {
    let mut start = BytesStart::new("Entity");
    if let Some(lang) = &entity.lang {
        start.push_attribute(("xml:lang", lang.as_str()));
    }
    start.push_attribute(("name", entity.entity_name.as_str()));
    if let Some(v) = &entity.reg_id {
        start.push_attribute(("regid", v.as_str()));
    }
    start.push_attribute(("role", entity.roles.xml_value().as_str()));
    if let Some(v) = &entity.thumbprint {
        start.push_attribute(("thumbprint", v.to_text()?.as_str()));
    }
    emit(w, Event::Start(start))?;
    emit(w, Event::End(BytesEnd::new("Entity")))
}

fn write_link(w: &mut XmlWriter, link: &Link) -> Result<()> {
    let mut start = BytesStart::new("Link");
    if let Some(lang) = &link.lang {
        start.push_attribute(("xml:lang", lang.as_str()));
    }
    if let Some(v) = &link.artifact {
        start.push_attribute(("artifact", v.as_str()));
    }
    start.push_attribute(("href", link.href.as_str()));
    if let Some(v) = &link.media {
        start.push_attribute(("media", v.as_str()));
    }
    if let Some(v) = &link.ownership {
        start.push_attribute(("ownership", v.xml_value()?.as_str()));
    }
    start.push_attribute(("rel", link.rel.xml_value()?.as_str()));
    if let Some(v) = &link.media_type {
        start.push_attribute(("type", v.as_str()));
    }
    if let Some(v) = &link.r#use {
        start.push_attribute(("use", v.xml_value()?.as_str()));
    }
    emit(w, Event::Start(start))?;
    emit(w, Event::End(BytesEnd::new("Link")))
}

fn write_file(w: &mut XmlWriter, file: &File) -> Result<()> {
    let mut start = BytesStart::new("File");
    if let Some(lang) = &file.lang {
        start.push_attribute(("xml:lang", lang.as_str()));
    }
    if let Some(v) = file.key {
        start.push_attribute(("key", bool_attr(v)));
    }
    if let Some(v) = &file.location {
        start.push_attribute(("location", v.as_str()));
    }
    start.push_attribute(("name", file.fs_name.as_str()));
    if let Some(v) = &file.root {
        start.push_attribute(("root", v.as_str()));
    }
    if let Some(v) = file.size {
        start.push_attribute(("size", v.to_string().as_str()));
    }
    if let Some(v) = &file.file_version {
        start.push_attribute(("version", v.as_str()));
    }
    if let Some(v) = &file.hash {
        start.push_attribute(("hash", v.to_text()?.as_str()));
    }
    emit(w, Event::Start(start))?;
    emit(w, Event::End(BytesEnd::new("File")))
}

fn write_directory(w: &mut XmlWriter, dir: &Directory) -> Result<()> {
    let mut start = BytesStart::new("Directory");
    if let Some(lang) = &dir.lang {
        start.push_attribute(("xml:lang", lang.as_str()));
    }
    if let Some(v) = dir.key {
        start.push_attribute(("key", bool_attr(v)));
    }
    if let Some(v) = &dir.location {
        start.push_attribute(("location", v.as_str()));
    }
    start.push_attribute(("name", dir.fs_name.as_str()));
    if let Some(v) = &dir.root {
        start.push_attribute(("root", v.as_str()));
    }
    emit(w, Event::Start(start))?;
    if let Some(dirs) = &dir.path_elements.directories {
        require_nonempty(dirs)?;
        for d in dirs.iter() {
            write_directory(w, d)?;
        }
    }
    if let Some(files) = &dir.path_elements.files {
        require_nonempty(files)?;
        for f in files.iter() {
            write_file(w, f)?;
        }
    }
    emit(w, Event::End(BytesEnd::new("Directory")))
}

fn write_process(w: &mut XmlWriter, process: &Process) -> Result<()> {
    let mut start = BytesStart::new("Process");
    if let Some(lang) = &process.lang {
        start.push_attribute(("xml:lang", lang.as_str()));
    }
    start.push_attribute(("name", process.process_name.as_str()));
    if let Some(v) = process.pid {
        start.push_attribute(("pid", v.to_string().as_str()));
    }
    emit(w, Event::Start(start))?;
    emit(w, Event::End(BytesEnd::new("Process")))
}

fn write_resource(w: &mut XmlWriter, resource: &Resource) -> Result<()> {
    let mut start = BytesStart::new("Resource");
    if let Some(lang) = &resource.lang {
        start.push_attribute(("xml:lang", lang.as_str()));
    }
    start.push_attribute(("type", resource.r#type.as_str()));
    emit(w, Event::Start(start))?;
    emit(w, Event::End(BytesEnd::new("Resource")))
}

fn write_payload(w: &mut XmlWriter, payload: &Payload) -> Result<()> {
    let mut start = BytesStart::new("Payload");
    if let Some(lang) = &payload.lang {
        start.push_attribute(("xml:lang", lang.as_str()));
    }
    emit(w, Event::Start(start))?;
    write_path_elements(
        w,
        &payload.directories,
        &payload.files,
        &payload.processes,
        &payload.resources,
    )?;
    emit(w, Event::End(BytesEnd::new("Payload")))
}

fn write_evidence(w: &mut XmlWriter, evidence: &Evidence) -> Result<()> {
    let mut start = BytesStart::new("Evidence");
    if let Some(lang) = &evidence.lang {
        start.push_attribute(("xml:lang", lang.as_str()));
    }
    if let Some(v) = evidence.date {
        start.push_attribute(("date", v.0.to_string().as_str()));
    }
    if let Some(v) = &evidence.device_id {
        start.push_attribute(("deviceId", v.as_str()));
    }
    emit(w, Event::Start(start))?;
    write_path_elements(
        w,
        &evidence.directories,
        &evidence.files,
        &evidence.processes,
        &evidence.resources,
    )?;
    emit(w, Event::End(BytesEnd::new("Evidence")))
}

fn write_path_elements(
    w: &mut XmlWriter,
    directories: &Option<OneOrMore<Directory>>,
    files: &Option<OneOrMore<File>>,
    processes: &Option<OneOrMore<Process>>,
    resources: &Option<OneOrMore<Resource>>,
) -> Result<()> {
    if let Some(dirs) = directories {
        require_nonempty(dirs)?;
        for d in dirs.iter() {
            write_directory(w, d)?;
        }
    }
    if let Some(files) = files {
        require_nonempty(files)?;
        for f in files.iter() {
            write_file(w, f)?;
        }
    }
    if let Some(procs) = processes {
        require_nonempty(procs)?;
        for p in procs.iter() {
            write_process(w, p)?;
        }
    }
    if let Some(res) = resources {
        require_nonempty(res)?;
        for r in res.iter() {
            write_resource(w, r)?;
        }
    }
    Ok(())
}

fn decoded_attr(attr: std::result::Result<Attribute, quick_xml::events::attributes::AttrError>)
    -> Result<(Vec<u8>, String)>
{
    let attr = attr.map_err(|e| Error::Xml(e.to_string()))?;
    let value = attr
        .unescape_value()
        .map_err(|e| Error::Xml(e.to_string()))?
        .into_owned();
    Ok((attr.key.as_ref().to_vec(), value))
}

fn parse_bool(v: &str) -> Result<bool> {
    match v {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(Error::Xml(format!("invalid boolean value {v}"))),
    }
}

fn parse_i64(v: &str) -> Result<i64> {
    v.parse::<i64>()
        .map_err(|_| Error::Xml(format!("invalid integer value {v}")))
}

fn maybe<T>(items: Vec<T>) -> Option<OneOrMore<T>> {
    if items.is_empty() {
        None
    } else {
        Some(OneOrMore(items))
    }
}

fn read_software_identity(
    reader: &mut XmlReader<'_>,
    start: &BytesStart,
    empty: bool,
) -> Result<SoftwareIdentity> {
    let mut tag = SoftwareIdentity {
        lang: None,
        tag_id: TagId::Text(String::new()),
        tag_version: 0,
        corpus: None,
        patch: None,
        supplemental: None,
        software_name: String::new(),
        software_version: None,
        version_scheme: None,
        media: None,
        software_metas: None,
        entities: OneOrMore(Vec::new()),
        links: None,
        payload: None,
        evidence: None,
    };
    let mut saw_tag_id = false;
    let mut saw_name = false;

    for attr in start.attributes() {
        let (key, value) = decoded_attr(attr)?;
        match key.as_slice() {
            b"xml:lang" => tag.lang = Some(value),
            b"tagId" => {
                tag.tag_id = TagId::try_from(value.as_str())?;
                saw_tag_id = true;
            }
            b"tagVersion" => tag.tag_version = parse_i64(&value)?,
            b"corpus" => tag.corpus = Some(parse_bool(&value)?),
            b"patch" => tag.patch = Some(parse_bool(&value)?),
            b"supplemental" => tag.supplemental = Some(parse_bool(&value)?),
            b"name" => {
                tag.software_name = value;
                saw_name = true;
            }
            b"version" => tag.software_version = Some(value),
            b"versionScheme" => {
                tag.version_scheme = Some(VersionScheme::from_xml_value(&value))
            }
            b"media" => tag.media = Some(value),
            _ => {}
        }
    }
    if !saw_tag_id {
        return Err(Error::MissingXmlAttribute("tagId"));
    }
    if !saw_name {
        return Err(Error::MissingXmlAttribute("name"));
    }
    if empty {
        return Ok(tag);
    }

    let mut metas = Vec::new();
    let mut entities = Vec::new();
    let mut links = Vec::new();
    loop {
        match reader.read_event().map_err(|e| Error::Xml(e.to_string()))? {
            Event::Start(e) => {
                let consumed = match e.local_name().as_ref() {
                    b"Meta" => {
                        metas.push(read_meta(&e)?);
                        false
                    }
                    b"Entity" => {
                        entities.push(read_entity(&e)?);
                        false
                    }
                    b"Link" => {
                        links.push(read_link(&e)?);
                        false
                    }
                    b"Payload" => {
                        tag.payload = Some(read_payload(reader, &e, false)?);
                        true
                    }
                    b"Evidence" => {
                        tag.evidence = Some(read_evidence(reader, &e, false)?);
                        true
                    }
                    _ => false,
                };
                if !consumed {
                    reader.read_to_end(e.name())?;
                }
            }
            Event::Empty(e) => match e.local_name().as_ref() {
                b"Meta" => metas.push(read_meta(&e)?),
                b"Entity" => entities.push(read_entity(&e)?),
                b"Link" => links.push(read_link(&e)?),
                b"Payload" => tag.payload = Some(read_payload(reader, &e, true)?),
                b"Evidence" => tag.evidence = Some(read_evidence(reader, &e, true)?),
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"SoftwareIdentity" => break,
            Event::Eof => return Err(Error::Xml("unexpected end of document".to_string())),
            _ => {}
        }
    }

    tag.software_metas = maybe(metas);
    tag.entities = OneOrMore(entities);
    tag.links = maybe(links);
    Ok(tag)
}

fn read_meta(start: &BytesStart) -> Result<SoftwareMeta> {
    let mut meta = SoftwareMeta::default();
    for attr in start.attributes() {
        let (key, value) = decoded_attr(attr)?;
        match key.as_slice() {
            b"xml:lang" => meta.lang = Some(value),
            b"activationStatus" => meta.activation_status = Some(value),
            b"channelType" => meta.channel_type = Some(value),
            b"colloquialVersion" => meta.colloquial_version = Some(value),
            b"description" => meta.description = Some(value),
            b"edition" => meta.edition = Some(value),
            b"entitlementDataRequired" => {
                meta.entitlement_data_required = Some(parse_bool(&value)?)
            }
            b"entitlementKey" => meta.entitlement_key = Some(value),
            b"generator" => meta.generator = Some(value),
            b"persistentId" => meta.persistent_id = Some(value),
            b"product" => meta.product = Some(value),
            b"productFamily" => meta.product_family = Some(value),
            b"revision" => meta.revision = Some(value),
            b"summary" => meta.summary = Some(value),
            b"unspscCode" => meta.unspsc_code = Some(value),
            b"unspscVersion" => meta.unspsc_version = Some(value),
            _ => {}
        }
    }
    Ok(meta)
}

fn read_entity(start: &BytesStart) -> Result<Entity> {
    let mut lang = None;
    let mut entity_name = None;
    let mut reg_id = None;
    let mut roles = Roles::default();
    let mut thumbprint = None;
    for attr in start.attributes() {
        let (key, value) = decoded_attr(attr)?;
        match key.as_slice() {
            b"xml:lang" => lang = Some(value),
            b"name" => entity_name = Some(value),
            b"regid" => reg_id = Some(value),
            b"role" => roles = Roles::from_xml_value(&value),
            b"thumbprint" => thumbprint = Some(HashEntry::from_text(&value)?),
            _ => {}
        }
    }
    Ok(Entity {
        lang,
        entity_name: entity_name.ok_or(Error::MissingXmlAttribute("name"))?,
        reg_id,
        roles,
        thumbprint,
    })
}

fn read_link(start: &BytesStart) -> Result<Link> {
    let mut link = Link {
        lang: None,
        artifact: None,
        href: String::new(),
        media: None,
        ownership: None,
        rel: Rel::from(0u64),
        media_type: None,
        r#use: None,
    };
    let mut saw_href = false;
    let mut saw_rel = false;
    for attr in start.attributes() {
        let (key, value) = decoded_attr(attr)?;
        match key.as_slice() {
            b"xml:lang" => link.lang = Some(value),
            b"artifact" => link.artifact = Some(value),
            b"href" => {
                link.href = value;
                saw_href = true;
            }
            b"media" => link.media = Some(value),
            b"ownership" => link.ownership = Some(Ownership::from_xml_value(&value)),
            b"rel" => {
                link.rel = Rel::from_xml_value(&value);
                saw_rel = true;
            }
            b"type" => link.media_type = Some(value),
            b"use" => link.r#use = Some(Use::from_xml_value(&value)),
            _ => {}
        }
    }
    if !saw_href {
        return Err(Error::MissingXmlAttribute("href"));
    }
    if !saw_rel {
        return Err(Error::MissingXmlAttribute("rel"));
    }
    Ok(link)
}

fn read_file(start: &BytesStart) -> Result<File> {
    let mut file = File {
        lang: None,
        key: None,
        location: None,
        fs_name: String::new(),
        root: None,
        size: None,
        file_version: None,
        hash: None,
    };
    let mut saw_name = false;
    for attr in start.attributes() {
        let (key, value) = decoded_attr(attr)?;
        match key.as_slice() {
            b"xml:lang" => file.lang = Some(value),
            b"key" => file.key = Some(parse_bool(&value)?),
            b"location" => file.location = Some(value),
            b"name" => {
                file.fs_name = value;
                saw_name = true;
            }
            b"root" => file.root = Some(value),
            b"size" => file.size = Some(parse_i64(&value)?),
            b"version" => file.file_version = Some(value),
            b"hash" => file.hash = Some(HashEntry::from_text(&value)?),
            _ => {}
        }
    }
    if !saw_name {
        return Err(Error::MissingXmlAttribute("name"));
    }
    Ok(file)
}

fn read_process(start: &BytesStart) -> Result<Process> {
    let mut lang = None;
    let mut process_name = None;
    let mut pid = None;
    for attr in start.attributes() {
        let (key, value) = decoded_attr(attr)?;
        match key.as_slice() {
            b"xml:lang" => lang = Some(value),
            b"name" => process_name = Some(value),
            b"pid" => pid = Some(parse_i64(&value)?),
            _ => {}
        }
    }
    Ok(Process {
        lang,
        process_name: process_name.ok_or(Error::MissingXmlAttribute("name"))?,
        pid,
    })
}

fn read_resource(start: &BytesStart) -> Result<Resource> {
    let mut lang = None;
    let mut r#type = None;
    for attr in start.attributes() {
        let (key, value) = decoded_attr(attr)?;
        match key.as_slice() {
            b"xml:lang" => lang = Some(value),
            b"type" => r#type = Some(value),
            _ => {}
        }
    }
    Ok(Resource {
        lang,
        r#type: r#type.ok_or(Error::MissingXmlAttribute("type"))?,
    })
}

fn read_directory(
    reader: &mut XmlReader<'_>,
    start: &BytesStart,
    empty: bool,
) -> Result<Directory> {
    let mut dir = Directory {
        lang: None,
        key: None,
        location: None,
        fs_name: String::new(),
        root: None,
        path_elements: PathElements::default(),
    };
    let mut saw_name = false;
    for attr in start.attributes() {
        let (key, value) = decoded_attr(attr)?;
        match key.as_slice() {
            b"xml:lang" => dir.lang = Some(value),
            b"key" => dir.key = Some(parse_bool(&value)?),
            b"location" => dir.location = Some(value),
            b"name" => {
                dir.fs_name = value;
                saw_name = true;
            }
            b"root" => dir.root = Some(value),
            _ => {}
        }
    }
    if !saw_name {
        return Err(Error::MissingXmlAttribute("name"));
    }
    if empty {
        return Ok(dir);
    }

    let mut directories = Vec::new();
    let mut files = Vec::new();
    loop {
        match reader.read_event().map_err(|e| Error::Xml(e.to_string()))? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"Directory" => directories.push(read_directory(reader, &e, false)?),
                b"File" => {
                    files.push(read_file(&e)?);
                    reader.read_to_end(e.name())?;
                }
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"Directory" => directories.push(read_directory(reader, &e, true)?),
                b"File" => files.push(read_file(&e)?),
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"Directory" => break,
            Event::Eof => return Err(Error::Xml("unexpected end of document".to_string())),
            _ => {}
        }
    }
    dir.path_elements = PathElements {
        directories: maybe(directories),
        files: maybe(files),
    };
    Ok(dir)
}

struct PathChildren {
    directories: Vec<Directory>,
    files: Vec<File>,
    processes: Vec<Process>,
    resources: Vec<Resource>,
}

fn read_path_children(reader: &mut XmlReader<'_>, end: &'static [u8]) -> Result<PathChildren> {
    let mut children = PathChildren {
        directories: Vec::new(),
        files: Vec::new(),
        processes: Vec::new(),
        resources: Vec::new(),
    };
    loop {
        match reader.read_event().map_err(|e| Error::Xml(e.to_string()))? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"Directory" => children.directories.push(read_directory(reader, &e, false)?),
                b"File" => {
                    children.files.push(read_file(&e)?);
                    reader.read_to_end(e.name())?;
                }
                b"Process" => {
                    children.processes.push(read_process(&e)?);
                    reader.read_to_end(e.name())?;
                }
                b"Resource" => {
                    children.resources.push(read_resource(&e)?);
                    reader.read_to_end(e.name())?;
                }
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"Directory" => children.directories.push(read_directory(reader, &e, true)?),
                b"File" => children.files.push(read_file(&e)?),
                b"Process" => children.processes.push(read_process(&e)?),
                b"Resource" => children.resources.push(read_resource(&e)?),
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == end => break,
            Event::Eof => return Err(Error::Xml("unexpected end of document".to_string())),
            _ => {}
        }
    }
    Ok(children)
}

fn read_payload(reader: &mut XmlReader<'_>, start: &BytesStart, empty: bool) -> Result<Payload> {
    let mut payload = Payload::default();
    for attr in start.attributes() {
        let (key, value) = decoded_attr(attr)?;
        if key.as_slice() == b"xml:lang" {
            payload.lang = Some(value);
        }
    }
    if empty {
        return Ok(payload);
    }
    let children = read_path_children(reader, b"Payload")?;
    payload.directories = maybe(children.directories);
    payload.files = maybe(children.files);
    payload.processes = maybe(children.processes);
    payload.resources = maybe(children.resources);
    Ok(payload)
}

fn read_evidence(reader: &mut XmlReader<'_>, start: &BytesStart, empty: bool) -> Result<Evidence> {
    let mut evidence = Evidence::default();
    for attr in start.attributes() {
        let (key, value) = decoded_attr(attr)?;
        match key.as_slice() {
            b"xml:lang" => evidence.lang = Some(value),
            b"date" => evidence.date = Some(IntegerTime(parse_i64(&value)?)),
            b"deviceId" => evidence.device_id = Some(value),
            _ => {}
        }
    }
    if empty {
        return Ok(evidence);
    }
    let children = read_path_children(reader, b"Evidence")?;
    evidence.directories = maybe(children.directories);
    evidence.files = maybe(children.files);
    evidence.processes = maybe(children.processes);
    evidence.resources = maybe(children.resources);
    Ok(evidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Role;
    use crate::coswid::{Entities, Links};

    const REFERENCE_XML: &str = concat!(
        r#"<SoftwareIdentity tagId="f432dc99-2e06-434d-b9ad-2b22e35b6fa4" "#,
        r#"name="Roadrunner software bundle" version="1.0.0">"#,
        r#"<Entity name="ACME Ltd" regid="acme.example" "#,
        r#"role="tagCreator softwareCreator"></Entity>"#,
        r#"<Link href="d84fb5e2-d198-49b4-9d65-3a82421bf180" rel="parent"></Link>"#,
        r#"</SoftwareIdentity>"#,
    );

    fn reference_identity() -> SoftwareIdentity {
        SoftwareIdentity {
            lang: None,
            tag_id: TagId::try_from("f432dc99-2e06-434d-b9ad-2b22e35b6fa4").unwrap(),
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
    fn encode_matches_the_reference_document() {
        assert_eq!(reference_identity().to_xml().unwrap(), REFERENCE_XML);
    }

    #[test]
    fn decode_matches_the_reference_identity() {
        let decoded = SoftwareIdentity::from_xml(REFERENCE_XML).unwrap();
        assert_eq!(decoded, reference_identity());
    }

    #[test]
    fn decode_codifies_enumerated_attribute_values() {
        let decoded = SoftwareIdentity::from_xml(REFERENCE_XML).unwrap();
        assert_eq!(decoded.entities[0].roles, Roles::from(vec![Role::TAG_CREATOR, Role::SOFTWARE_CREATOR]));
        assert_eq!(decoded.links.as_ref().unwrap()[0].rel, Rel::PARENT);
    }

    #[test]
    fn decode_tolerates_unknown_attributes_and_elements() {
        let xml = concat!(
            r#"<SoftwareIdentity tagId="a.b.c" name="x" futureAttr="y">"#,
            r#"<FutureElement><Nested/></FutureElement>"#,
            r#"<Entity name="e" role="licensor"/>"#,
            r#"</SoftwareIdentity>"#,
        );
        let decoded = SoftwareIdentity::from_xml(xml).unwrap();
        assert_eq!(decoded.tag_version, 0);
        assert_eq!(decoded.entities.len(), 1);
        assert_eq!(decoded.entities[0].roles, Roles::from(Role::LICENSOR));
    }

    #[test]
    fn decode_requires_tag_id_and_name() {
        let err = SoftwareIdentity::from_xml(r#"<SoftwareIdentity name="x"></SoftwareIdentity>"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "missing tagId attribute");

        let err = SoftwareIdentity::from_xml(r#"<SoftwareIdentity tagId="a.b.c"/>"#).unwrap_err();
        assert_eq!(err.to_string(), "missing name attribute");
    }

    #[test]
    fn encode_fails_on_unregistered_single_valued_codes() {
        let mut tag = reference_identity();
        tag.links.as_mut().unwrap()[0].rel = Rel::from(42u64);
        let err = tag.to_xml().unwrap_err();
        assert_eq!(err.to_string(), "unknown rel code-point 42");
    }

    #[test]
    fn encode_drops_unregistered_role_codes() {
        let mut tag = reference_identity();
        tag.entities[0]
            .roles
            .set(vec![Role::TAG_CREATOR, Role::try_from(20).unwrap()]);
        let xml = tag.to_xml().unwrap();
        assert!(xml.contains(r#"role="tagCreator""#));
        assert!(!xml.contains("role(20)"));
    }

    #[test]
    fn meta_attributes_round_trip() {
        let mut tag = reference_identity();
        tag.software_metas = Some(
            SoftwareMeta {
                colloquial_version: Some("2013".to_string()),
                edition: Some("cloud".to_string()),
                entitlement_data_required: Some(true),
                product: Some("Roadrunner Detector".to_string()),
                ..Default::default()
            }
            .into(),
        );
        let xml = tag.to_xml().unwrap();
        assert!(xml.contains(concat!(
            r#"<Meta colloquialVersion="2013" edition="cloud" "#,
            r#"entitlementDataRequired="true" product="Roadrunner Detector"></Meta>"#,
        )));
        let decoded = SoftwareIdentity::from_xml(&xml).unwrap();
        assert_eq!(decoded, tag);
    }

    #[test]
    fn payload_and_evidence_round_trip() {
        let mut tag = reference_identity();
        tag.payload = Some(Payload {
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
                                key: Some(true),
                                location: None,
                                fs_name: "rrdetector".to_string(),
                                root: None,
                                size: Some(532712),
                                file_version: None,
                                hash: Some(HashEntry {
                                    alg_id: HashEntry::ALG_SHA_256,
                                    value: vec![0xab; 32],
                                }),
                            }
                            .into(),
                        ),
                    },
                }
                .into(),
            ),
            ..Default::default()
        });
        tag.evidence = Some(Evidence {
            date: Some(IntegerTime(1601424000)),
            device_id: Some("acme-rr-trap".to_string()),
            processes: Some(
                Process {
                    lang: None,
                    process_name: "rrdetector".to_string(),
                    pid: Some(1431),
                }
                .into(),
            ),
            ..Default::default()
        });

        let xml = tag.to_xml().unwrap();
        assert!(xml.contains(r#"<Payload><Directory name="bin" root="/usr/local">"#));
        assert!(xml.contains(r#"<Evidence date="1601424000" deviceId="acme-rr-trap">"#));
        let decoded = SoftwareIdentity::from_xml(&xml).unwrap();
        assert_eq!(decoded, tag);
    }

    #[test]
    fn empty_collections_refuse_to_encode() {
        let mut tag = reference_identity();
        tag.entities = Entities::default();
        let err = tag.to_xml().unwrap_err();
        assert_eq!(err.to_string(), "array of Entity MUST NOT be 0-length");

        let mut tag = reference_identity();
        tag.links = Some(Links::default());
        let err = tag.to_xml().unwrap_err();
        assert_eq!(err.to_string(), "array of Link MUST NOT be 0-length");
    }

    #[test]
    fn decode_rejects_malformed_documents() {
        assert!(SoftwareIdentity::from_xml("not xml at all").is_err());
        assert!(SoftwareIdentity::from_xml("<Other/>").is_err());
    }
}
