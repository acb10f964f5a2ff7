//! gc-core: core library for gcontacts
//!
//! Configuration, the shared error type and the authenticated HTTP
//! transport used to reach the Google Contacts feed.

pub mod config;
pub mod error;
pub mod http;

pub use config::{ApiConfig, Config};
pub use error::{Error, Result};
pub use http::{GoogleClient, HttpResponse, Transport, relative_path};
