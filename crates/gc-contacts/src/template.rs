//! Atom entry template for create and update requests
//!
//! [`ContactTemplate`] is built once at startup and shared by `Arc`; it
//! renders a [`ContactAttrs`] into the GData XML the contacts feed accepts.

use chrono::{DateTime, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde_json::Value;
use std::io::Write;

use crate::entity::{FormattedEntity, GD_REL_PREFIX};
use crate::error::{ContactsError, Result};
use crate::models::ContactAttrs;

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
const GD_NS: &str = "http://schemas.google.com/g/2005";
const GCONTACT_NS: &str = "http://schemas.google.com/contact/2008";
const KIND_SCHEME: &str = "http://schemas.google.com/g/2005#kind";
const CONTACT_KIND: &str = "http://schemas.google.com/contact/2008#contact";

/// Child element order inside `gd:structuredPostalAddress`
const ADDRESS_PARTS: [&str; 11] = [
    "agent",
    "housename",
    "street",
    "pobox",
    "neighborhood",
    "city",
    "subregion",
    "region",
    "postcode",
    "country",
    "formatted_address",
];

/// Fields carried as attributes of `gd:structuredPostalAddress`
const ADDRESS_ATTRS: [&str; 2] = ["mail_class", "usage"];

/// Child element order inside `gd:organization`
const ORGANIZATION_PARTS: [&str; 6] = [
    "org_name",
    "org_title",
    "org_department",
    "org_job_description",
    "org_symbol",
    "where",
];

/// Which request the entry is rendered for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
}

/// Renders contact entries
#[derive(Debug, Clone)]
pub struct ContactTemplate {
    indent: Option<usize>,
}

impl Default for ContactTemplate {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactTemplate {
    pub fn new() -> Self {
        Self { indent: Some(2) }
    }

    /// Render without whitespace between elements
    pub fn compact() -> Self {
        Self { indent: None }
    }

    /// Render the Atom entry for `attrs`
    pub fn render(&self, attrs: &ContactAttrs, action: Action) -> Result<String> {
        let mut writer = match self.indent {
            Some(n) => Writer::new_with_indent(Vec::new(), b' ', n),
            None => Writer::new(Vec::new()),
        };

        emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut root = BytesStart::new("atom:entry");
        root.push_attribute(("xmlns:atom", ATOM_NS));
        root.push_attribute(("xmlns:gd", GD_NS));
        root.push_attribute(("xmlns:gContact", GCONTACT_NS));
        if action == Action::Update {
            if let Some(etag) = attrs.etag.as_deref() {
                root.push_attribute(("gd:etag", etag));
            }
        }
        emit(&mut writer, Event::Start(root))?;

        let mut category = BytesStart::new("atom:category");
        category.push_attribute(("scheme", KIND_SCHEME));
        category.push_attribute(("term", CONTACT_KIND));
        emit(&mut writer, Event::Empty(category))?;

        if action == Action::Update {
            if let Some(id) = attrs.id.as_deref() {
                write_text_element(&mut writer, BytesStart::new("atom:id"), id)?;
            }
            if let Some(updated) = attrs.updated.as_deref() {
                write_text_element(&mut writer, BytesStart::new("atom:updated"), updated)?;
            }
        }

        write_name(&mut writer, attrs)?;

        if let Some(content) = attrs.content.as_deref() {
            let mut elem = BytesStart::new("atom:content");
            elem.push_attribute(("type", "text"));
            write_text_element(&mut writer, elem, content)?;
        }

        for email in &attrs.emails {
            let mut elem = entity_start("gd:email", email, "other");
            for (key, value) in email.fields.iter().filter(|(k, _)| *k != "label") {
                if let Some(text) = scalar_text(value) {
                    elem.push_attribute((to_camel_case(key).as_str(), text.as_str()));
                }
            }
            emit(&mut writer, Event::Empty(elem))?;
        }

        for phone in &attrs.phone_numbers {
            let mut elem = entity_start("gd:phoneNumber", phone, "other");
            if let Some(uri) = phone.get_str("uri") {
                elem.push_attribute(("uri", uri));
            }
            let number = phone.get_str("number").unwrap_or_default();
            write_text_element(&mut writer, elem, number)?;
        }

        for address in &attrs.addresses {
            let elem = entity_start("gd:structuredPostalAddress", address, "work");
            write_children(
                &mut writer,
                elem,
                "gd:structuredPostalAddress",
                address,
                &ADDRESS_PARTS,
                &ADDRESS_ATTRS,
            )?;
        }

        for org in &attrs.organizations {
            let elem = entity_start("gd:organization", org, "other");
            write_children(&mut writer, elem, "gd:organization", org, &ORGANIZATION_PARTS, &[])?;
        }

        for site in &attrs.websites {
            let mut elem = BytesStart::new("gContact:website");
            if let Some(href) = site.get_str("href") {
                elem.push_attribute(("href", href));
            }
            if let Some(label) = site.get_str("label") {
                elem.push_attribute(("label", label));
            } else {
                elem.push_attribute(("rel", site.rel.as_deref().unwrap_or("other")));
            }
            if site.primary {
                elem.push_attribute(("primary", "true"));
            }
            emit(&mut writer, Event::Empty(elem))?;
        }

        emit(&mut writer, Event::End(BytesEnd::new("atom:entry")))?;

        String::from_utf8(writer.into_inner()).map_err(|e| ContactsError::Xml(e.to_string()))
    }
}

/// Timestamp in the form the feed expects for `updated`
pub fn format_time_for_xml(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| ContactsError::Xml(e.to_string()))
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, start: BytesStart<'_>, text: &str) -> Result<()> {
    let end = BytesEnd::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    emit(writer, Event::Start(start))?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    emit(writer, Event::End(end))
}

fn write_name<W: Write>(writer: &mut Writer<W>, attrs: &ContactAttrs) -> Result<()> {
    let parts = [
        ("gd:namePrefix", &attrs.name_prefix),
        ("gd:givenName", &attrs.given_name),
        ("gd:additionalName", &attrs.additional_name),
        ("gd:familyName", &attrs.family_name),
        ("gd:nameSuffix", &attrs.name_suffix),
    ];
    if parts.iter().all(|(_, v)| v.is_none()) {
        return Ok(());
    }

    emit(writer, Event::Start(BytesStart::new("gd:name")))?;
    for (tag, value) in parts {
        if let Some(text) = value {
            write_text_element(writer, BytesStart::new(tag), text)?;
        }
    }
    emit(writer, Event::End(BytesEnd::new("gd:name")))
}

/// Start tag carrying the shared `rel` / `label` / `primary` attributes
fn entity_start<'a>(tag: &'a str, entity: &FormattedEntity, default_rel: &str) -> BytesStart<'a> {
    let mut elem = BytesStart::new(tag);
    if let Some(label) = entity.get_str("label") {
        elem.push_attribute(("label", label));
    } else {
        let rel = entity.rel.as_deref().unwrap_or(default_rel);
        elem.push_attribute(("rel", expand_rel(rel).as_str()));
    }
    if entity.primary {
        elem.push_attribute(("primary", "true"));
    }
    elem
}

/// Write `entity`'s value fields as `gd:` children, known parts first.
/// Fields named in `attributes` go on the start tag instead.
fn write_children<W: Write>(
    writer: &mut Writer<W>,
    mut start: BytesStart<'_>,
    tag: &str,
    entity: &FormattedEntity,
    order: &[&str],
    attributes: &[&str],
) -> Result<()> {
    for key in attributes {
        if let Some(text) = entity.get(key).and_then(scalar_text) {
            start.push_attribute((to_camel_case(key).as_str(), text.as_str()));
        }
    }
    emit(writer, Event::Start(start))?;

    let known = order.iter().copied();
    let rest = entity
        .fields
        .keys()
        .map(String::as_str)
        .filter(|k| !order.contains(k) && !attributes.contains(k) && *k != "label");

    for key in known.chain(rest) {
        if let Some(text) = entity.get(key).and_then(scalar_text) {
            let child = format!("gd:{}", to_camel_case(key));
            write_text_element(writer, BytesStart::new(child), &text)?;
        }
    }

    emit(writer, Event::End(BytesEnd::new(tag)))
}

/// Put the standard prefix back on short relation names
fn expand_rel(rel: &str) -> String {
    if rel.contains("://") {
        rel.to_string()
    } else {
        format!("{}{}", GD_REL_PREFIX, rel)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// snake_case to camelCase
fn to_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
