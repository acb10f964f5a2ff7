//! Staged field changes
//!
//! A [`ContactChanges`] is a small builder keyed by the fields the XML
//! template knows how to write. Values are checked against the field's
//! kind on insert.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::entity::FormattedEntity;
use crate::error::{ContactsError, Result};

/// Fields that can be written back to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    NamePrefix,
    GivenName,
    AdditionalName,
    FamilyName,
    NameSuffix,
    Content,
    Emails,
    PhoneNumbers,
    Addresses,
    Organizations,
    Websites,
}

impl ContactField {
    /// Every writable field, in template order
    pub const ALL: [ContactField; 11] = [
        ContactField::NamePrefix,
        ContactField::GivenName,
        ContactField::AdditionalName,
        ContactField::FamilyName,
        ContactField::NameSuffix,
        ContactField::Content,
        ContactField::Emails,
        ContactField::PhoneNumbers,
        ContactField::Addresses,
        ContactField::Organizations,
        ContactField::Websites,
    ];

    /// Whether the field holds a list of entities rather than text
    pub fn is_list(self) -> bool {
        matches!(
            self,
            ContactField::Emails
                | ContactField::PhoneNumbers
                | ContactField::Addresses
                | ContactField::Organizations
                | ContactField::Websites
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContactField::NamePrefix => "name_prefix",
            ContactField::GivenName => "given_name",
            ContactField::AdditionalName => "additional_name",
            ContactField::FamilyName => "family_name",
            ContactField::NameSuffix => "name_suffix",
            ContactField::Content => "content",
            ContactField::Emails => "emails",
            ContactField::PhoneNumbers => "phone_numbers",
            ContactField::Addresses => "addresses",
            ContactField::Organizations => "organizations",
            ContactField::Websites => "websites",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Replacement value for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(Option<String>),
    Entities(Vec<FormattedEntity>),
}

/// Pending changes, merged across calls
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<ContactField, FieldValue>",
    into = "BTreeMap<ContactField, FieldValue>"
)]
pub struct ContactChanges {
    values: BTreeMap<ContactField, FieldValue>,
}

impl TryFrom<BTreeMap<ContactField, FieldValue>> for ContactChanges {
    type Error = ContactsError;

    fn try_from(values: BTreeMap<ContactField, FieldValue>) -> Result<Self> {
        let mut changes = ContactChanges::new();
        for (field, value) in values {
            changes.insert(field, value)?;
        }
        Ok(changes)
    }
}

impl From<ContactChanges> for BTreeMap<ContactField, FieldValue> {
    fn from(changes: ContactChanges) -> Self {
        changes.values
    }
}

impl ContactChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, rejecting values of the wrong kind
    pub fn insert(&mut self, field: ContactField, value: FieldValue) -> Result<()> {
        let ok = match &value {
            FieldValue::Text(_) => !field.is_list(),
            FieldValue::Entities(_) => field.is_list(),
        };
        if !ok {
            let expected = if field.is_list() { "a list of entities" } else { "text" };
            return Err(ContactsError::InvalidChange {
                field: field.to_string(),
                reason: format!("expected {}", expected),
            });
        }
        self.values.insert(field, value);
        Ok(())
    }

    fn text(mut self, field: ContactField, value: Option<String>) -> Self {
        self.values.insert(field, FieldValue::Text(value));
        self
    }

    fn entities(mut self, field: ContactField, value: Vec<FormattedEntity>) -> Self {
        self.values.insert(field, FieldValue::Entities(value));
        self
    }

    pub fn name_prefix(self, value: impl Into<String>) -> Self {
        self.text(ContactField::NamePrefix, Some(value.into()))
    }

    pub fn given_name(self, value: impl Into<String>) -> Self {
        self.text(ContactField::GivenName, Some(value.into()))
    }

    pub fn additional_name(self, value: impl Into<String>) -> Self {
        self.text(ContactField::AdditionalName, Some(value.into()))
    }

    pub fn family_name(self, value: impl Into<String>) -> Self {
        self.text(ContactField::FamilyName, Some(value.into()))
    }

    pub fn name_suffix(self, value: impl Into<String>) -> Self {
        self.text(ContactField::NameSuffix, Some(value.into()))
    }

    pub fn content(self, value: impl Into<String>) -> Self {
        self.text(ContactField::Content, Some(value.into()))
    }

    /// Blank a field on the server
    pub fn clear(self, field: ContactField) -> Self {
        if field.is_list() {
            self.entities(field, Vec::new())
        } else {
            self.text(field, None)
        }
    }

    pub fn emails(self, value: Vec<FormattedEntity>) -> Self {
        self.entities(ContactField::Emails, value)
    }

    pub fn phone_numbers(self, value: Vec<FormattedEntity>) -> Self {
        self.entities(ContactField::PhoneNumbers, value)
    }

    pub fn addresses(self, value: Vec<FormattedEntity>) -> Self {
        self.entities(ContactField::Addresses, value)
    }

    pub fn organizations(self, value: Vec<FormattedEntity>) -> Self {
        self.entities(ContactField::Organizations, value)
    }

    pub fn websites(self, value: Vec<FormattedEntity>) -> Self {
        self.entities(ContactField::Websites, value)
    }

    /// Overlay `other` on top of these changes
    pub fn merge(&mut self, other: ContactChanges) {
        self.values.extend(other.values);
    }

    pub fn get(&self, field: ContactField) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    pub fn contains(&self, field: ContactField) -> bool {
        self.values.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ContactField, &FieldValue)> {
        self.values.iter()
    }
}
