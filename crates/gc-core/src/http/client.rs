//! Google Contacts API HTTP client

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};

use super::{HttpResponse, Transport};

const GDATA_VERSION: &str = "3.0";
const ATOM_CONTENT_TYPE: &str = "application/atom+xml";

/// Authenticated client for the contacts feed
#[derive(Clone)]
pub struct GoogleClient {
    client: Client,
    access_token: String,
    base_url: String,
}

impl GoogleClient {
    /// Create a new client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.api.timeout_secs))
            .user_agent(config.api.user_agent.clone())
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            access_token: config.api.access_token.clone(),
            base_url: config.api.base_url.clone(),
        })
    }

    /// Create with custom base URL (for testing or custom endpoints)
    pub fn with_base_url(config: &Config, base_url: String) -> Result<Self> {
        let mut client = Self::new(config)?;
        client.base_url = base_url;
        Ok(client)
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with("https://") || path.starts_with("http://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Attach auth and protocol headers; feed requests also ask for JSON
    fn prepare(&self, builder: RequestBuilder, feed: bool) -> RequestBuilder {
        let builder = builder
            .bearer_auth(&self.access_token)
            .header("GData-Version", GDATA_VERSION);
        if feed {
            builder.query(&[("alt", "json")])
        } else {
            builder
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<HttpResponse> {
        let response = builder.send().await.map_err(Error::Http)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();
        let body = response.bytes().await.map_err(Error::Http)?.to_vec();

        debug!("Contacts API returned status {}", status);

        Ok(HttpResponse { status, headers, body })
    }
}

#[async_trait]
impl Transport for GoogleClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: &str) -> Result<HttpResponse> {
        let url = self.url_for(path);
        debug!("GET {}", url);
        self.send(self.prepare(self.client.get(&url), true)).await
    }

    async fn get_media(&self, url: &str) -> Result<HttpResponse> {
        let url = self.url_for(url);
        debug!("GET (media) {}", url);
        self.send(self.prepare(self.client.get(&url), false)).await
    }

    async fn post(&self, path: &str, body: String) -> Result<HttpResponse> {
        let url = self.url_for(path);
        debug!("POST {}", url);
        let builder = self
            .client
            .post(&url)
            .header("Content-Type", ATOM_CONTENT_TYPE)
            .body(body);
        self.send(self.prepare(builder, true)).await
    }

    async fn put(&self, path: &str, body: String, headers: &[(String, String)]) -> Result<HttpResponse> {
        let url = self.url_for(path);
        debug!("PUT {}", url);
        let mut builder = self
            .client
            .put(&url)
            .header("Content-Type", ATOM_CONTENT_TYPE)
            .body(body);
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        self.send(self.prepare(builder, true)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> Config {
        Config {
            api: ApiConfig {
                access_token: "test_token".to_string(),
                ..Default::default()
            },
        }
    }

    async fn client_for(server: &MockServer) -> GoogleClient {
        GoogleClient::with_base_url(&config(), format!("{}/m8/feeds/", server.uri())).unwrap()
    }

    #[test]
    fn test_url_for_relative_and_absolute() {
        let client = GoogleClient::new(&config()).unwrap();
        assert_eq!(
            client.url_for("contacts/default/full"),
            "https://www.google.com/m8/feeds/contacts/default/full"
        );
        assert_eq!(
            client.url_for("https://example.com/photo/1"),
            "https://example.com/photo/1"
        );
    }

    #[tokio::test]
    async fn test_get_sends_auth_and_json_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/m8/feeds/contacts/default/full/1"))
            .and(query_param("alt", "json"))
            .and(header("Authorization", "Bearer test_token"))
            .and(header("GData-Version", "3.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let response = client.get("contacts/default/full/1").await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.text(), "{}");
    }

    #[tokio::test]
    async fn test_get_media_returns_binary_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/m8/feeds/photos/media/default/1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(vec![0x89, 0x50, 0x4e, 0x47])
                    .insert_header("Content-Type", "image/png"),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let url = format!("{}/m8/feeds/photos/media/default/1", server.uri());
        let response = client.get_media(&url).await.unwrap();
        assert_eq!(response.body, vec![0x89, 0x50, 0x4e, 0x47]);
        assert_eq!(response.header("content-type"), Some("image/png"));
    }

    #[tokio::test]
    async fn test_put_forwards_extra_headers() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/m8/feeds/contacts/default/full/1"))
            .and(header("If-Match", "\"etag-1\""))
            .and(header("Content-Type", "application/atom+xml"))
            .and(body_string("<entry/>"))
            .respond_with(ResponseTemplate::new(412))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let headers = vec![("If-Match".to_string(), "\"etag-1\"".to_string())];
        let response = client
            .put("contacts/default/full/1", "<entry/>".to_string(), &headers)
            .await
            .unwrap();
        assert_eq!(response.status, 412);
    }

    #[tokio::test]
    async fn test_post_returns_error_status_as_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/m8/feeds/contacts/default/full"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let response = client
            .post("contacts/default/full", "<entry/>".to_string())
            .await
            .unwrap();
        assert_eq!(response.status, 500);
        assert_eq!(response.text(), "boom");
    }
}
