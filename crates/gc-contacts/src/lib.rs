//! gc-contacts: Google Contacts record adapter
//!
//! This crate wraps entries of the Google Contacts v3 JSON feed.
//!
//! ## Features
//!
//! - Read-only accessors over the namespaced entry tree
//! - Normalized multi-valued fields (emails, phones, addresses, ...)
//! - Staged changes rendered into an Atom entry for create/update
//! - Optimistic concurrency through the entry etag
//! - Photo retrieval, with or without metadata
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gc_contacts::{Contact, ContactChanges, ContactTemplate, ContactsApi};
//! use gc_core::{Config, GoogleClient};
//! use std::sync::Arc;
//!
//! let config = Config::load()?;
//! let client = GoogleClient::new(&config)?;
//! let api = ContactsApi::shared(Arc::new(client), Arc::new(ContactTemplate::new()));
//!
//! let mut contact = Contact::find("contacts/default/full/1a2b", &api).await?;
//! println!("{:?}", contact.primary_email());
//!
//! contact.prep_changes(ContactChanges::new().given_name("Ada"));
//! contact.create_or_update(None).await?;
//! ```

pub mod api;
pub mod changes;
pub mod contact;
pub mod entity;
pub mod error;
pub mod models;
pub mod template;

#[cfg(test)]
mod testing;

pub use api::{ContactsApi, parse_response, raise_if_failed_response};
pub use changes::{ContactChanges, ContactField, FieldValue};
pub use contact::Contact;
pub use entity::{FormattedEntity, format_entity};
pub use error::{ContactsError, Result};
pub use models::{Birthday, ContactAttrs, PhotoWithMetadata};
pub use template::{Action, ContactTemplate, format_time_for_xml};

/// Re-export models for easy use
pub mod prelude {
    pub use super::{Contact, ContactChanges, ContactField, ContactTemplate, ContactsApi};
}
