//! Data models for contacts integration

use serde::{Deserialize, Serialize};

use crate::changes::{ContactField, FieldValue};
use crate::entity::FormattedEntity;

/// Attribute set rendered into a create or update request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactAttrs {
    #[serde(default)]
    pub name_prefix: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub additional_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub name_suffix: Option<String>,
    /// Free-form notes
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub emails: Vec<FormattedEntity>,
    #[serde(default)]
    pub phone_numbers: Vec<FormattedEntity>,
    #[serde(default)]
    pub addresses: Vec<FormattedEntity>,
    #[serde(default)]
    pub organizations: Vec<FormattedEntity>,
    #[serde(default)]
    pub websites: Vec<FormattedEntity>,

    /// Contact id URL, update only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Entry etag, update only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Client timestamp, update only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

impl ContactAttrs {
    /// Create attrs for a new contact with a given and family name
    pub fn named(given_name: impl Into<String>, family_name: impl Into<String>) -> Self {
        Self {
            given_name: Some(given_name.into()),
            family_name: Some(family_name.into()),
            ..Default::default()
        }
    }

    /// Assign one recognized field. Values of the wrong kind are ignored;
    /// [`crate::ContactChanges`] never holds them.
    pub(crate) fn set(&mut self, field: ContactField, value: FieldValue) {
        match (field, value) {
            (ContactField::NamePrefix, FieldValue::Text(v)) => self.name_prefix = v,
            (ContactField::GivenName, FieldValue::Text(v)) => self.given_name = v,
            (ContactField::AdditionalName, FieldValue::Text(v)) => self.additional_name = v,
            (ContactField::FamilyName, FieldValue::Text(v)) => self.family_name = v,
            (ContactField::NameSuffix, FieldValue::Text(v)) => self.name_suffix = v,
            (ContactField::Content, FieldValue::Text(v)) => self.content = v,
            (ContactField::Emails, FieldValue::Entities(v)) => self.emails = v,
            (ContactField::PhoneNumbers, FieldValue::Entities(v)) => self.phone_numbers = v,
            (ContactField::Addresses, FieldValue::Entities(v)) => self.addresses = v,
            (ContactField::Organizations, FieldValue::Entities(v)) => self.organizations = v,
            (ContactField::Websites, FieldValue::Entities(v)) => self.websites = v,
            _ => {}
        }
    }

    /// Current value of one recognized field
    pub fn get(&self, field: ContactField) -> FieldValue {
        match field {
            ContactField::NamePrefix => FieldValue::Text(self.name_prefix.clone()),
            ContactField::GivenName => FieldValue::Text(self.given_name.clone()),
            ContactField::AdditionalName => FieldValue::Text(self.additional_name.clone()),
            ContactField::FamilyName => FieldValue::Text(self.family_name.clone()),
            ContactField::NameSuffix => FieldValue::Text(self.name_suffix.clone()),
            ContactField::Content => FieldValue::Text(self.content.clone()),
            ContactField::Emails => FieldValue::Entities(self.emails.clone()),
            ContactField::PhoneNumbers => FieldValue::Entities(self.phone_numbers.clone()),
            ContactField::Addresses => FieldValue::Entities(self.addresses.clone()),
            ContactField::Organizations => FieldValue::Entities(self.organizations.clone()),
            ContactField::Websites => FieldValue::Entities(self.websites.clone()),
        }
    }
}

/// Birthday; the year is unknown for `--MM-DD` dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Birthday {
    pub year: Option<i32>,
    pub month: u32,
    pub day: u32,
}

impl Birthday {
    /// Parse `YYYY-MM-DD` or `--MM-DD`
    pub fn parse(when: &str) -> Option<Self> {
        let mut parts = when.split('-').rev();
        let day = parts.next()?.parse().ok()?;
        let month = parts.next()?.parse().ok()?;
        let year = match parts.next() {
            None | Some("") => None,
            Some(y) => Some(y.parse().ok()?),
        };
        Some(Self { year, month, day })
    }
}

/// Photo bytes plus the metadata needed to cache them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoWithMetadata {
    /// Photo etag without surrounding quotes
    pub etag: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}
