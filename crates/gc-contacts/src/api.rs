//! Shared API handle and response parsing

use gc_core::{HttpResponse, Transport, relative_path};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{ContactsError, Result};
use crate::template::ContactTemplate;

/// Feed path new contacts are posted to
pub const CREATE_PATH: &str = "contacts/default/full";

/// Transport plus the template used to build request bodies.
///
/// Contacts keep a `Weak` reference to this handle, so it is normally held
/// in an `Arc` for as long as contacts need to reach the server.
pub struct ContactsApi {
    transport: Arc<dyn Transport>,
    template: Arc<ContactTemplate>,
}

impl ContactsApi {
    pub fn new(transport: Arc<dyn Transport>, template: Arc<ContactTemplate>) -> Self {
        Self { transport, template }
    }

    /// Create a handle ready to be shared with contacts
    pub fn shared(transport: Arc<dyn Transport>, template: Arc<ContactTemplate>) -> Arc<Self> {
        Arc::new(Self::new(transport, template))
    }

    pub fn template(&self) -> &ContactTemplate {
        &self.template
    }

    /// Normalize a feed URL to a path relative to the transport's base URL
    pub fn relative_path(&self, url: &str) -> String {
        relative_path(url, self.transport.base_url())
    }

    pub async fn get(&self, url: &str) -> Result<HttpResponse> {
        let path = self.relative_path(url);
        debug!("Fetching contact: {}", path);
        Ok(self.transport.get(&path).await?)
    }

    pub async fn get_media(&self, url: &str) -> Result<HttpResponse> {
        Ok(self.transport.get_media(url).await?)
    }

    pub async fn post(&self, path: &str, body: String) -> Result<HttpResponse> {
        Ok(self.transport.post(path, body).await?)
    }

    pub async fn put(&self, path: &str, body: String, headers: &[(String, String)]) -> Result<HttpResponse> {
        Ok(self.transport.put(path, body, headers).await?)
    }
}

/// Map a failed status to its error
pub fn raise_if_failed_response(response: &HttpResponse) -> Result<()> {
    let status = response.status;
    if status < 400 {
        return Ok(());
    }

    let body = response.text();
    warn!("Contacts request failed: {} - {}", status, body);

    Err(match status {
        401 => ContactsError::Unauthorized(body),
        403 => ContactsError::Forbidden(body),
        404 => ContactsError::NotFound(body),
        // Contacts API gives HTTP 412 Precondition Failed if the contact has
        // been edited since it was loaded
        412 => ContactsError::PreconditionFailed,
        400..=499 => ContactsError::ClientError { status, body },
        _ => ContactsError::ServerError { status, body },
    })
}

/// Validate the status and extract the first contact entry from the body
pub fn parse_response(response: &HttpResponse) -> Result<Map<String, Value>> {
    raise_if_failed_response(response)?;

    let mut root: Value = serde_json::from_slice(&response.body)?;
    let entry = match root.get_mut("entry").map(Value::take) {
        Some(Value::Array(entries)) => entries.into_iter().next(),
        Some(single @ Value::Object(_)) => Some(single),
        _ => None,
    };

    match entry {
        Some(Value::Object(map)) => Ok(map),
        _ => Err(ContactsError::MissingEntry),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingTransport, sample_response};
    use serde_json::json;

    #[test]
    fn test_success_statuses_pass() {
        assert!(raise_if_failed_response(&HttpResponse::new(200, "")).is_ok());
        assert!(raise_if_failed_response(&HttpResponse::new(201, "")).is_ok());
        assert!(raise_if_failed_response(&HttpResponse::new(304, "")).is_ok());
    }

    #[test]
    fn test_status_taxonomy() {
        let err = |status| raise_if_failed_response(&HttpResponse::new(status, "body")).unwrap_err();

        assert!(matches!(err(401), ContactsError::Unauthorized(_)));
        assert!(matches!(err(403), ContactsError::Forbidden(_)));
        assert!(matches!(err(404), ContactsError::NotFound(ref b) if b == "body"));
        assert!(matches!(err(412), ContactsError::PreconditionFailed));
        assert!(matches!(err(409), ContactsError::ClientError { status: 409, .. }));
        assert!(matches!(err(503), ContactsError::ServerError { status: 503, .. }));
    }

    #[test]
    fn test_precondition_failed_message() {
        let err = raise_if_failed_response(&HttpResponse::new(412, "")).unwrap_err();
        assert_eq!(err.to_string(), "HTTP 412: Contact Modified Since Load");
    }

    #[test]
    fn test_parse_response_takes_first_entry() {
        let body = json!({"entry": [{"id": {"$t": "first"}}, {"id": {"$t": "second"}}]});
        let entry = parse_response(&HttpResponse::new(200, body.to_string())).unwrap();
        assert_eq!(entry["id"]["$t"], "first");
    }

    #[test]
    fn test_parse_response_single_entry_object() {
        let entry = parse_response(&sample_response(200)).unwrap();
        assert!(entry.contains_key("gd$email"));
    }

    #[test]
    fn test_parse_response_missing_entry() {
        let err = parse_response(&HttpResponse::new(200, r#"{"feed": {}}"#)).unwrap_err();
        assert!(matches!(err, ContactsError::MissingEntry));

        let err = parse_response(&HttpResponse::new(200, r#"{"entry": []}"#)).unwrap_err();
        assert!(matches!(err, ContactsError::MissingEntry));
    }

    #[test]
    fn test_parse_response_bad_json() {
        let err = parse_response(&HttpResponse::new(200, "not json")).unwrap_err();
        assert!(matches!(err, ContactsError::Json(_)));
    }

    #[test]
    fn test_parse_response_checks_status_first() {
        let err = parse_response(&HttpResponse::new(500, "not json")).unwrap_err();
        assert!(matches!(err, ContactsError::ServerError { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_get_relativizes_url() {
        let transport = RecordingTransport::new(vec![sample_response(200)]);
        let api = ContactsApi::shared(transport.clone(), Arc::new(ContactTemplate::new()));

        api.get("http://www.google.com/m8/feeds/contacts/me/base/1").await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "GET");
        assert_eq!(calls[0].path, "contacts/me/base/1");
    }
}
