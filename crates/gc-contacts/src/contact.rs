//! Contact record
//!
//! [`Contact`] wraps one entry of the v3 JSON feed. Accessors read the
//! namespaced tree (`gd$email`, `gd$name`, `{"$t": ...}` text nodes) and
//! never fail on missing data; create/update render the current values plus
//! staged changes into an Atom entry and replace the tree with the server's
//! answer.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

use crate::api::{CREATE_PATH, ContactsApi, parse_response};
use crate::changes::{ContactChanges, ContactField, FieldValue};
use crate::entity::{FormattedEntity, format_entity, text_of};
use crate::error::{ContactsError, Result};
use crate::models::{Birthday, ContactAttrs, PhotoWithMetadata};
use crate::template::{Action, format_time_for_xml};

pub const PHOTO_REL: &str = "http://schemas.google.com/contacts/2008/rel#photo";
pub const EDIT_PHOTO_REL: &str = "http://schemas.google.com/contacts/2008/rel#edit_photo";

/// A single contact
#[derive(Debug, Clone, Default)]
pub struct Contact {
    data: Map<String, Value>,
    changes: ContactChanges,
    api: Option<Weak<ContactsApi>>,
}

impl Contact {
    /// A new, unsaved contact with no API binding
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already parsed entry without binding it to an API
    pub fn from_data(data: Map<String, Value>) -> Self {
        Self {
            data,
            ..Default::default()
        }
    }

    /// Wrap an entry bound to `api`
    pub fn with_api(data: Map<String, Value>, api: &Arc<ContactsApi>) -> Self {
        Self {
            data,
            changes: ContactChanges::default(),
            api: Some(Arc::downgrade(api)),
        }
    }

    /// Bind (or rebind) this contact to an API handle
    pub fn bind(&mut self, api: &Arc<ContactsApi>) {
        self.api = Some(Arc::downgrade(api));
    }

    /// Fetch a contact by its id or self URL
    pub async fn find(id_url: &str, api: &Arc<ContactsApi>) -> Result<Self> {
        let response = api.get(id_url).await?;
        Ok(Self::with_api(parse_response(&response)?, api))
    }

    /// Create a contact on the server from `attrs`
    pub async fn create(attrs: &ContactAttrs, api: &Arc<ContactsApi>) -> Result<Self> {
        let data = call_api_create(attrs, api).await?;
        Ok(Self::with_api(data, api))
    }

    /// The raw entry
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Whether the contact still has a live API handle
    pub fn is_attached(&self) -> bool {
        self.api().is_some()
    }

    fn api(&self) -> Option<Arc<ContactsApi>> {
        self.api.as_ref().and_then(Weak::upgrade)
    }

    fn list(&self, key: &str) -> &[Value] {
        self.data
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn strings_at(&self, list_key: &str, field: &str) -> Vec<String> {
        self.list(list_key)
            .iter()
            .filter_map(|e| e.get(field).and_then(Value::as_str))
            .map(str::to_string)
            .collect()
    }

    fn format_entities(
        &self,
        key: &str,
        default_rel: Option<&str>,
        value_key: Option<&str>,
    ) -> Vec<FormattedEntity> {
        self.list(key)
            .iter()
            .map(|raw| format_entity(raw, default_rel, value_key))
            .collect()
    }

    // ---- base entry fields ----

    /// The contact's id URL
    pub fn id(&self) -> Option<&str> {
        let id = self.data.get("id")?;
        text_of(id).or_else(|| id.as_str())
    }

    pub fn title(&self) -> Option<&str> {
        self.data.get("title").and_then(text_of)
    }

    /// Notes
    pub fn content(&self) -> Option<&str> {
        self.data.get("content").and_then(text_of)
    }

    pub fn updated(&self) -> Option<DateTime<Utc>> {
        let raw = self.data.get("updated").and_then(text_of)?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    pub fn categories(&self) -> Vec<Value> {
        self.list("category").to_vec()
    }

    /// Whether the feed marked this entry as deleted
    pub fn is_deleted(&self) -> bool {
        self.data.contains_key("gd$deleted")
    }

    pub fn etag(&self) -> Option<&str> {
        self.data.get("gd$etag").and_then(Value::as_str)
    }

    // ---- links ----

    fn link_entry(&self, rel: &str) -> Option<&Value> {
        self.list("link")
            .iter()
            .find(|l| l.get("rel").and_then(Value::as_str) == Some(rel))
    }

    fn link_href(&self, rel: &str) -> Option<&str> {
        self.link_entry(rel)?.get("href").and_then(Value::as_str)
    }

    /// Every link href
    pub fn links(&self) -> Vec<String> {
        self.strings_at("link", "href")
    }

    /// Link to get this contact
    pub fn self_link(&self) -> Option<&str> {
        self.link_href("self")
    }

    /// Alternative, possibly off-Google home page link
    pub fn alternate_link(&self) -> Option<&str> {
        self.link_href("alternate")
    }

    pub fn edit_link(&self) -> Option<&str> {
        self.link_href("edit")
    }

    /// Link to the photo; fetching it still needs authentication
    pub fn photo_link(&self) -> Option<&str> {
        self.link_href(PHOTO_REL)
    }

    /// Link to add or replace the photo
    pub fn edit_photo_link(&self) -> Option<&str> {
        self.link_href(EDIT_PHOTO_REL)
    }

    /// Photo bytes, or `None` when detached, photo-less, or the fetch failed
    pub async fn photo(&self) -> Option<Vec<u8>> {
        let api = self.api()?;
        let link = self.photo_link()?;

        match api.get_media(link).await {
            Ok(response) if response.status < 400 => Some(response.body),
            Ok(response) => {
                debug!("Photo fetch returned {}", response.status);
                None
            }
            Err(e) => {
                debug!("Photo fetch failed: {}", e);
                None
            }
        }
    }

    /// Photo bytes with etag and content type.
    ///
    /// The photo link only carries an etag when a real photo is attached, so
    /// placeholder images yield `None`.
    pub async fn photo_with_metadata(&self) -> Option<PhotoWithMetadata> {
        let entry = self.link_entry(PHOTO_REL)?;
        let etag = entry.get("gd$etag").and_then(Value::as_str)?;
        let href = entry.get("href").and_then(Value::as_str)?;
        let api = self.api()?;

        let response = match api.get_media(href).await {
            Ok(response) => response,
            Err(e) => {
                debug!("Photo fetch failed: {}", e);
                return None;
            }
        };
        if response.status != 200 {
            debug!("Photo fetch returned {}", response.status);
            return None;
        }

        Some(PhotoWithMetadata {
            etag: etag.replace('"', ""),
            content_type: response.header("content-type").map(str::to_string),
            data: response.body,
        })
    }

    // ---- names ----

    fn name_part(&self, key: &str) -> Option<&str> {
        self.data.get("gd$name")?.get(key).and_then(text_of)
    }

    pub fn given_name(&self) -> Option<&str> {
        self.name_part("gd$givenName")
    }

    pub fn family_name(&self) -> Option<&str> {
        self.name_part("gd$familyName")
    }

    pub fn full_name(&self) -> Option<&str> {
        self.name_part("gd$fullName")
    }

    pub fn additional_name(&self) -> Option<&str> {
        self.name_part("gd$additionalName")
    }

    pub fn name_prefix(&self) -> Option<&str> {
        self.name_part("gd$namePrefix")
    }

    pub fn name_suffix(&self) -> Option<&str> {
        self.name_part("gd$nameSuffix")
    }

    // ---- multi-valued fields ----

    /// All phone numbers, as displayed
    pub fn phone_numbers(&self) -> Vec<String> {
        self.list("gd$phoneNumber")
            .iter()
            .filter_map(text_of)
            .map(str::to_string)
            .collect()
    }

    /// All email addresses
    pub fn emails(&self) -> Vec<String> {
        self.strings_at("gd$email", "address")
    }

    /// The email marked primary. `None` both without emails and without a
    /// primary one.
    pub fn primary_email(&self) -> Option<&str> {
        self.list("gd$email")
            .iter()
            .find(|e| format_entity(e, None, None).primary)
            .and_then(|e| e.get("address"))
            .and_then(Value::as_str)
    }

    /// Instant messaging addresses, protocol not distinguished
    pub fn ims(&self) -> Vec<String> {
        self.strings_at("gd$im", "address")
    }

    pub fn birthday(&self) -> Option<Birthday> {
        let when = self.data.get("gContact$birthday")?.get("when")?.as_str()?;
        Birthday::parse(when)
    }

    pub fn relations(&self) -> Vec<Value> {
        self.list("gContact$relation").to_vec()
    }

    /// Name of the first relation tagged `spouse`
    pub fn spouse(&self) -> Option<&str> {
        self.list("gContact$relation")
            .iter()
            .find(|r| r.get("rel").and_then(Value::as_str) == Some("spouse"))
            .and_then(text_of)
    }

    /// Postal addresses; `rel` defaults to `work`
    pub fn addresses(&self) -> Vec<FormattedEntity> {
        self.format_entities("gd$structuredPostalAddress", Some("work"), None)
    }

    pub fn organizations(&self) -> Vec<FormattedEntity> {
        self.format_entities("gd$organization", None, None)
    }

    pub fn websites(&self) -> Vec<FormattedEntity> {
        self.format_entities("gContact$website", None, None)
    }

    /// Phone numbers with metadata; the text lands under `number`
    pub fn phone_numbers_full(&self) -> Vec<FormattedEntity> {
        self.format_entities("gd$phoneNumber", None, Some("number"))
    }

    pub fn emails_full(&self) -> Vec<FormattedEntity> {
        self.format_entities("gd$email", None, None)
    }

    // ---- changes and persistence ----

    /// Stage changes for the next [`Contact::create_or_update`]
    pub fn prep_changes(&mut self, changes: ContactChanges) {
        self.changes.merge(changes);
    }

    pub fn prepped_changes(&self) -> &ContactChanges {
        &self.changes
    }

    /// Current values of every writable field
    pub fn formatted_attrs(&self) -> ContactAttrs {
        self.attrs_for_update(&ContactChanges::default())
    }

    /// Writable fields, taking each from `changes` when present
    pub fn attrs_for_update(&self, changes: &ContactChanges) -> ContactAttrs {
        let mut attrs = ContactAttrs::default();
        for field in ContactField::ALL {
            let value = changes
                .get(field)
                .cloned()
                .unwrap_or_else(|| self.value_for_field(field));
            attrs.set(field, value);
        }
        attrs
    }

    fn value_for_field(&self, field: ContactField) -> FieldValue {
        let text = |v: Option<&str>| FieldValue::Text(v.map(str::to_string));
        match field {
            ContactField::NamePrefix => text(self.name_prefix()),
            ContactField::GivenName => text(self.given_name()),
            ContactField::AdditionalName => text(self.additional_name()),
            ContactField::FamilyName => text(self.family_name()),
            ContactField::NameSuffix => text(self.name_suffix()),
            ContactField::Content => text(self.content()),
            ContactField::Emails => FieldValue::Entities(self.emails_full()),
            ContactField::PhoneNumbers => FieldValue::Entities(self.phone_numbers_full()),
            ContactField::Addresses => FieldValue::Entities(self.addresses()),
            ContactField::Organizations => FieldValue::Entities(self.organizations()),
            ContactField::Websites => FieldValue::Entities(self.websites()),
        }
    }

    /// Save the contact: update when it has an id, create otherwise.
    ///
    /// `changes` replaces the staged changes for this call. Without either
    /// nothing is sent and `Ok(false)` is returned.
    pub async fn create_or_update(&mut self, changes: Option<ContactChanges>) -> Result<bool> {
        let (changes, staged) = match changes {
            Some(c) => (c, false),
            None if self.changes.is_empty() => return Ok(false),
            None => (self.changes.clone(), true),
        };

        if self.id().is_some() {
            self.send_update(&changes).await?;
        } else {
            self.send_create(&changes).await?;
        }

        if staged {
            self.changes = ContactChanges::default();
        }
        Ok(true)
    }

    async fn send_update(&mut self, changes: &ContactChanges) -> Result<()> {
        let api = self.api().ok_or(ContactsError::Detached)?;
        let id = self.id().map(str::to_string).ok_or(ContactsError::MissingEntry)?;
        let etag = self.etag().map(str::to_string);

        let mut attrs = self.attrs_for_update(changes);
        attrs.updated = Some(format_time_for_xml(Utc::now()));
        attrs.etag = etag.clone();
        attrs.id = Some(id.clone());

        let xml = api.template().render(&attrs, Action::Update)?;
        let url = self.edit_link().unwrap_or(&id);
        let path = api.relative_path(url);

        let mut headers = Vec::new();
        match etag {
            Some(etag) => headers.push(("If-Match".to_string(), etag)),
            None => warn!("Updating contact {} without an etag", id),
        }

        let response = api.put(&path, xml, &headers).await?;
        self.reload_from_data(parse_response(&response)?);

        info!("Updated contact: {}", id);
        Ok(())
    }

    async fn send_create(&mut self, changes: &ContactChanges) -> Result<()> {
        let api = self.api().ok_or(ContactsError::Detached)?;
        let attrs = self.attrs_for_update(changes);
        let data = call_api_create(&attrs, &api).await?;
        self.reload_from_data(data);
        Ok(())
    }

    /// Replace the whole entry with `data`
    fn reload_from_data(&mut self, data: Map<String, Value>) {
        self.data.clear();
        self.data.extend(data);
    }
}

async fn call_api_create(attrs: &ContactAttrs, api: &ContactsApi) -> Result<Map<String, Value>> {
    let xml = api.template().render(attrs, Action::Create)?;
    let response = api.post(CREATE_PATH, xml).await?;
    let data = parse_response(&response)?;

    info!(
        "Created contact: {}",
        data.get("id").and_then(text_of).unwrap_or("<no id>")
    );
    Ok(data)
}
