//! gcontacts: Google Contacts command line client
//!
//! Usage:
//!   gcontacts --find <id-url>                        - Print a contact as JSON
//!   gcontacts --photo <id-url> <out-file>            - Save a contact's photo
//!   gcontacts --set-name <id-url> <given> <family>   - Rename a contact
//!   gcontacts --help                                 - Show help

mod error;

use error::{CliError, Result};
use gc_contacts::{Contact, ContactChanges, ContactTemplate, ContactsApi};
use gc_core::{Config, GoogleClient};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Run mode
#[derive(Debug, PartialEq, Eq)]
enum RunMode {
    /// Print one contact
    Find { id: String },
    /// Write the photo bytes to a file
    Photo { id: String, out: String },
    /// Stage and send a name change
    SetName {
        id: String,
        given: String,
        family: String,
    },
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = parse_args(&args)?;

    match mode {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("gcontacts {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;
    tracing::debug!("Contacts API: {}", config.api.base_url);

    let client = GoogleClient::new(&config)
        .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;
    let api = ContactsApi::shared(Arc::new(client), Arc::new(ContactTemplate::new()));

    match mode {
        RunMode::Find { id } => run_find(&api, &id).await?,
        RunMode::Photo { id, out } => run_photo(&api, &id, &out).await?,
        RunMode::SetName { id, given, family } => run_set_name(&api, &id, given, family).await?,
        RunMode::Help | RunMode::Version => {}
    }

    Ok(())
}

/// Parse command line arguments (program name excluded)
fn parse_args(args: &[String]) -> Result<RunMode> {
    let Some(flag) = args.first() else {
        return Ok(RunMode::Help);
    };

    let operands = &args[1..];
    let operand = |i: usize, name: &str| {
        operands
            .get(i)
            .cloned()
            .ok_or_else(|| CliError::Usage(format!("{} requires <{}>", flag, name)))
    };

    match flag.as_str() {
        "--find" | "-f" => Ok(RunMode::Find { id: operand(0, "id-url")? }),
        "--photo" | "-p" => Ok(RunMode::Photo {
            id: operand(0, "id-url")?,
            out: operand(1, "out-file")?,
        }),
        "--set-name" | "-n" => Ok(RunMode::SetName {
            id: operand(0, "id-url")?,
            given: operand(1, "given")?,
            family: operand(2, "family")?,
        }),
        "--help" | "-h" => Ok(RunMode::Help),
        "--version" | "-v" => Ok(RunMode::Version),
        other => Err(CliError::Usage(format!("unknown option {}", other))),
    }
}

/// Print help message
fn print_help() {
    println!("gcontacts - Google Contacts client");
    println!();
    println!("Usage:");
    println!("  gcontacts --find <id-url>                       Print a contact as JSON");
    println!("  gcontacts --photo <id-url> <out-file>           Save the contact's photo");
    println!("  gcontacts --set-name <id-url> <given> <family>  Update the contact's name");
    println!("  gcontacts --help                                Show this help message");
    println!("  gcontacts --version                             Show version");
    println!();
    println!("Configuration is read from gcontacts.toml when present.");
    println!();
    println!("Environment Variables:");
    println!("  GCONTACTS_ACCESS_TOKEN  OAuth2 access token (required without gcontacts.toml)");
    println!("  GCONTACTS_BASE_URL      Feed base URL (default: https://www.google.com/m8/feeds/)");
    println!("  GCONTACTS_TIMEOUT_SECS  Request timeout (default: 30)");
}

async fn run_find(api: &Arc<ContactsApi>, id: &str) -> Result<()> {
    let contact = Contact::find(id, api).await?;
    let summary = summarize(&contact);
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).map_err(gc_core::Error::from)?
    );
    Ok(())
}

async fn run_photo(api: &Arc<ContactsApi>, id: &str, out: &str) -> Result<()> {
    let contact = Contact::find(id, api).await?;
    let data = contact
        .photo()
        .await
        .ok_or_else(|| CliError::NoPhoto(id.to_string()))?;

    tokio::fs::write(out, &data).await.map_err(gc_core::Error::from)?;
    tracing::info!("Wrote {} bytes to {}", data.len(), out);
    Ok(())
}

async fn run_set_name(api: &Arc<ContactsApi>, id: &str, given: String, family: String) -> Result<()> {
    let mut contact = Contact::find(id, api).await?;
    contact.prep_changes(ContactChanges::new().given_name(given).family_name(family));
    contact.create_or_update(None).await?;

    println!(
        "Updated {}",
        contact.full_name().or(contact.title()).unwrap_or(id)
    );
    Ok(())
}

/// JSON view of the fields a person reads
fn summarize(contact: &Contact) -> Value {
    json!({
        "id": contact.id(),
        "etag": contact.etag(),
        "updated": contact.updated().map(|t| t.to_rfc3339()),
        "full_name": contact.full_name(),
        "name_prefix": contact.name_prefix(),
        "given_name": contact.given_name(),
        "additional_name": contact.additional_name(),
        "family_name": contact.family_name(),
        "name_suffix": contact.name_suffix(),
        "content": contact.content(),
        "birthday": contact.birthday(),
        "spouse": contact.spouse(),
        "primary_email": contact.primary_email(),
        "emails": contact.emails_full(),
        "phone_numbers": contact.phone_numbers_full(),
        "ims": contact.ims(),
        "addresses": contact.addresses(),
        "organizations": contact.organizations(),
        "websites": contact.websites(),
        "photo_link": contact.photo_link(),
        "deleted": contact.is_deleted(),
    })
}
