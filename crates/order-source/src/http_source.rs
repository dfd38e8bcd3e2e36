use async_trait::async_trait;
use common::config::SourceConfig;
use domain::OrderIdentifier;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Client, StatusCode, Url,
};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{OrderSource, RawOrder, SourceError};

/// Order source reached over HTTP.
///
/// Issues `GET {base_url}/orders/{order_id}` with basic credentials when
/// configured. `404` means the source has no such order.
pub struct HttpOrderSource {
    client: Client,
    base_url: Url,
    email: Option<String>,
    password: Option<String>,
}

impl HttpOrderSource {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let mut base_url = Url::parse(&config.base_url)
            .map_err(|e| SourceError::Configuration(format!("invalid ORDER_SOURCE_URL: {}", e)))?;

        if base_url.scheme() != "http" && base_url.scheme() != "https" {
            return Err(SourceError::Configuration(format!(
                "unsupported scheme {}",
                base_url.scheme()
            )));
        }

        // Keep a trailing slash so joins append instead of replacing the last segment
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("order-lookup/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        info!(
            "HTTP order source configured at {} (credentials: {})",
            base_url.host_str().unwrap_or("unknown"),
            if config.has_credentials() { "yes" } else { "no" }
        );

        Ok(Self {
            client,
            base_url,
            email: config.email.clone(),
            password: config.password.clone(),
        })
    }

    pub fn order_url(&self, order_id: &OrderIdentifier) -> Result<Url, SourceError> {
        self.base_url
            .join(&format!("orders/{}", order_id))
            .map_err(|e| SourceError::Configuration(format!("cannot build order URL: {}", e)))
    }
}

#[async_trait]
impl OrderSource for HttpOrderSource {
    async fn get_order(&self, order_id: &OrderIdentifier) -> Result<Option<RawOrder>, SourceError> {
        let url = self.order_url(order_id)?;
        debug!("Requesting order {} from {}", order_id, url);

        let mut request = self.client.get(url);
        if let Some(email) = &self.email {
            request = request.basic_auth(email, self.password.as_ref());
        }

        let response = request.send().await?;
        let status = response.status();

        match status {
            StatusCode::NOT_FOUND => {
                debug!("Order source has no order {}", order_id);
                Ok(None)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!("Order source rejected credentials ({})", status);
                Err(SourceError::Unauthorized)
            }
            s if s.is_success() => {
                let body = response.text().await?;
                if body.trim().is_empty() || body.trim() == "null" {
                    return Ok(None);
                }
                serde_json::from_str::<RawOrder>(&body)
                    .map(Some)
                    .map_err(|e| SourceError::InvalidResponse(e.to_string()))
            }
            s => Err(SourceError::Status {
                status: s.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Path,
        http::{header::AUTHORIZATION, HeaderMap as AxumHeaders, StatusCode as AxumStatus},
        routing::get,
        Router,
    };
    use rust_decimal::Decimal;

    // base64("buyer@example.com:secret")
    const EXPECTED_AUTH: &str = "Basic YnV5ZXJAZXhhbXBsZS5jb206c2VjcmV0";

    /// Upstream double keyed on the first segment of the order id
    async fn stub_order(Path(id): Path<String>, headers: AxumHeaders) -> (AxumStatus, String) {
        let auth = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
        if auth != Some(EXPECTED_AUTH) {
            return (AxumStatus::UNAUTHORIZED, String::new());
        }

        match id.split('-').next().unwrap_or_default() {
            "111" => (
                AxumStatus::OK,
                r#"{"date":"2024-01-15","total":"49.99","status":"Delivered","items":[]}"#
                    .to_string(),
            ),
            "204" => (AxumStatus::OK, String::new()),
            "205" => (AxumStatus::OK, "null".to_string()),
            "222" => (AxumStatus::OK, "<html>maintenance</html>".to_string()),
            "403" => (AxumStatus::FORBIDDEN, String::new()),
            "500" => (AxumStatus::INTERNAL_SERVER_ERROR, "boom".to_string()),
            "503" => (AxumStatus::SERVICE_UNAVAILABLE, String::new()),
            _ => (AxumStatus::NOT_FOUND, String::new()),
        }
    }

    async fn spawn_upstream() -> String {
        let app = Router::new().route("/orders/:id", get(stub_order));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn fetch(source: &HttpOrderSource, raw: &str) -> Result<Option<RawOrder>, SourceError> {
        source.get_order(&OrderIdentifier::parse(raw).unwrap()).await
    }

    fn config(base_url: &str) -> SourceConfig {
        SourceConfig {
            base_url: base_url.to_string(),
            email: Some("buyer@example.com".to_string()),
            password: Some("secret".to_string()),
            timeout_seconds: 5,
            failure_threshold: 5,
        }
    }

    #[test]
    fn test_order_url_keeps_base_path() {
        let source = HttpOrderSource::new(&config("http://localhost:9100/api")).unwrap();
        let id = OrderIdentifier::parse("123-4567890-1234567").unwrap();
        assert_eq!(
            source.order_url(&id).unwrap().as_str(),
            "http://localhost:9100/api/orders/123-4567890-1234567"
        );
    }

    #[test]
    fn test_rejects_bad_urls() {
        assert!(matches!(
            HttpOrderSource::new(&config("not a url")),
            Err(SourceError::Configuration(_))
        ));
        assert!(matches!(
            HttpOrderSource::new(&config("ftp://example.com")),
            Err(SourceError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_found_order_is_decoded() {
        let source = HttpOrderSource::new(&config(&spawn_upstream().await)).unwrap();

        let order = fetch(&source, "111-4567890-1234567").await.unwrap().unwrap();
        assert_eq!(order.date.as_deref(), Some("2024-01-15"));
        assert_eq!(order.total, Some(Decimal::new(4999, 2)));
        assert_eq!(order.status.as_deref(), Some("Delivered"));
    }

    #[tokio::test]
    async fn test_missing_order_is_none() {
        let source = HttpOrderSource::new(&config(&spawn_upstream().await)).unwrap();
        assert!(fetch(&source, "404-4567890-1234567").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_and_null_bodies_are_none() {
        let source = HttpOrderSource::new(&config(&spawn_upstream().await)).unwrap();
        assert!(fetch(&source, "204-4567890-1234567").await.unwrap().is_none());
        assert!(fetch(&source, "205-4567890-1234567").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_undecodable_body_is_invalid_response() {
        let source = HttpOrderSource::new(&config(&spawn_upstream().await)).unwrap();
        assert!(matches!(
            fetch(&source, "222-4567890-1234567").await,
            Err(SourceError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_rejected_credentials_are_unauthorized() {
        let base_url = spawn_upstream().await;

        let source = HttpOrderSource::new(&config(&base_url)).unwrap();
        assert!(matches!(
            fetch(&source, "403-4567890-1234567").await,
            Err(SourceError::Unauthorized)
        ));

        let anonymous = HttpOrderSource::new(&SourceConfig {
            email: None,
            password: None,
            ..config(&base_url)
        })
        .unwrap();
        assert!(matches!(
            fetch(&anonymous, "111-4567890-1234567").await,
            Err(SourceError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_server_errors_keep_status_and_body() {
        let source = HttpOrderSource::new(&config(&spawn_upstream().await)).unwrap();

        match fetch(&source, "500-4567890-1234567").await {
            Err(SourceError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected status error, got {:?}", other),
        }
        assert!(matches!(
            fetch(&source, "503-4567890-1234567").await,
            Err(SourceError::Status { status: 503, .. })
        ));
    }

    #[tokio::test]
    #[ignore] // Requires an order source listening on ORDER_SOURCE_URL
    async fn test_live_lookup() {
        let url = std::env::var("ORDER_SOURCE_URL")
            .unwrap_or_else(|_| "http://localhost:9100".to_string());
        let source = HttpOrderSource::new(&config(&url)).unwrap();
        let id = OrderIdentifier::parse("123-4567890-1234567").unwrap();

        let result = source.get_order(&id).await;
        assert!(result.is_ok());
    }
}
