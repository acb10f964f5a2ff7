//! Test fixtures: a recording transport and a sample feed entry

use async_trait::async_trait;
use gc_core::{HttpResponse, Transport};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const BASE_URL: &str = "https://www.google.com/m8/feeds/";

/// One request seen by [`RecordingTransport`]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    pub body: Option<String>,
    pub headers: Vec<(String, String)>,
}

/// Replays canned responses in order and records every request
pub struct RecordingTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingTransport {
    pub fn new(responses: Vec<HttpResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: RecordedCall) -> gc_core::Result<HttpResponse> {
        self.calls.lock().unwrap().push(call);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| gc_core::Error::Transport("no canned response left".to_string()))
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    fn base_url(&self) -> &str {
        BASE_URL
    }

    async fn get(&self, path: &str) -> gc_core::Result<HttpResponse> {
        self.record(RecordedCall {
            method: "GET",
            path: path.to_string(),
            body: None,
            headers: Vec::new(),
        })
    }

    async fn get_media(&self, url: &str) -> gc_core::Result<HttpResponse> {
        self.record(RecordedCall {
            method: "GET_MEDIA",
            path: url.to_string(),
            body: None,
            headers: Vec::new(),
        })
    }

    async fn post(&self, path: &str, body: String) -> gc_core::Result<HttpResponse> {
        self.record(RecordedCall {
            method: "POST",
            path: path.to_string(),
            body: Some(body),
            headers: Vec::new(),
        })
    }

    async fn put(&self, path: &str, body: String, headers: &[(String, String)]) -> gc_core::Result<HttpResponse> {
        self.record(RecordedCall {
            method: "PUT",
            path: path.to_string(),
            body: Some(body),
            headers: headers.to_vec(),
        })
    }
}

/// A contact entry as the v3 JSON feed returns it
pub fn sample_entry() -> Value {
    json!({
        "gd$etag": "\"SXk6cDdXKit7I2A9Wh9VFUgORgE.\"",
        "id": {"$t": "http://www.google.com/m8/feeds/contacts/me%40example.com/base/1a2b"},
        "updated": {"$t": "2014-06-02T18:05:23.135Z"},
        "title": {"$t": "Ada Lovelace"},
        "content": {"$t": "Met at the analytical engine demo"},
        "category": [{
            "scheme": "http://schemas.google.com/g/2005#kind",
            "term": "http://schemas.google.com/contact/2008#contact"
        }],
        "link": [
            {
                "rel": "http://schemas.google.com/contacts/2008/rel#photo",
                "type": "image/*",
                "href": "https://www.google.com/m8/feeds/photos/media/me%40example.com/1a2b",
                "gd$etag": "\"dxt2DAEZfCp7ImA-AV4zRxBoPG4UK3owXBM.\""
            },
            {
                "rel": "http://schemas.google.com/contacts/2008/rel#edit_photo",
                "type": "image/*",
                "href": "https://www.google.com/m8/feeds/photos/media/me%40example.com/1a2b/edit"
            },
            {
                "rel": "self",
                "type": "application/atom+xml",
                "href": "https://www.google.com/m8/feeds/contacts/me%40example.com/full/1a2b"
            },
            {
                "rel": "edit",
                "type": "application/atom+xml",
                "href": "https://www.google.com/m8/feeds/contacts/me%40example.com/full/1a2b"
            }
        ],
        "gd$name": {
            "gd$fullName": {"$t": "Dr. Augusta Ada King"},
            "gd$namePrefix": {"$t": "Dr."},
            "gd$givenName": {"$t": "Augusta"},
            "gd$additionalName": {"$t": "Ada"},
            "gd$familyName": {"$t": "King"}
        },
        "gContact$birthday": {"when": "1815-12-10"},
        "gd$email": [
            {"rel": "http://schemas.google.com/g/2005#work", "address": "ada@work.example.com", "primary": "true"},
            {"rel": "http://schemas.google.com/g/2005#home", "address": "ada@home.example.com"}
        ],
        "gd$im": [
            {"rel": "http://schemas.google.com/g/2005#other", "protocol": "http://schemas.google.com/g/2005#GOOGLE_TALK", "address": "ada@chat.example.com"}
        ],
        "gd$phoneNumber": [
            {"rel": "http://schemas.google.com/g/2005#mobile", "primary": "true", "uri": "tel:+44-20-0000", "$t": "+44 20 0000"},
            {"rel": "http://schemas.google.com/g/2005#home", "$t": "+44 20 1111"}
        ],
        "gd$structuredPostalAddress": [{
            "gd$formattedAddress": {"$t": "12 St James's Square\nLondon"},
            "gd$street": {"$t": "12 St James's Square"},
            "gd$city": {"$t": "London"}
        }],
        "gd$organization": [{
            "rel": "http://schemas.google.com/g/2005#other",
            "gd$orgName": {"$t": "Analytical Society"},
            "gd$orgTitle": {"$t": "Mathematician"}
        }],
        "gContact$website": [
            {"href": "https://ada.example.com", "rel": "home-page"}
        ],
        "gContact$relation": [
            {"rel": "mother", "$t": "Anne Isabella Milbanke"},
            {"rel": "spouse", "$t": "William King"}
        ]
    })
}

/// Single-entry response wrapping [`sample_entry`]
pub fn sample_response(status: u16) -> HttpResponse {
    let body = json!({"version": "1.0", "encoding": "UTF-8", "entry": sample_entry()});
    HttpResponse::new(status, body.to_string())
}
