use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tfplug::Context;

use super::error::ApiError;
use super::pool::{ConnectionPoolConfig, ConnectionPoolManager};

pub const DEFAULT_NAMESPACE: &str = "default";

/// Settings for building a [`Client`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub default_namespace: String,
    pub insecure: bool,
    pub pool: ConnectionPoolConfig,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            insecure: false,
            pool: ConnectionPoolConfig::default(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_default_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.default_namespace = namespace.into();
        self
    }

    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.pool.request_timeout = timeout;
        self
    }
}

/// Backstage catalog API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    auth_header: Option<String>,
    default_namespace: String,
    pool_manager: ConnectionPoolManager,
}

impl Client {
    /// Create a client with default settings and an optional bearer token
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self, ApiError> {
        let mut config = ClientConfig::new(base_url);
        config.token = token.map(str::to_string);
        Self::with_config(config)
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, ApiError> {
        let parsed = url::Url::parse(&config.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                config.base_url
            )));
        }

        let pool_manager = ConnectionPoolManager::new(config.pool);
        let http_client = pool_manager.build_client(config.insecure)?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                auth_header: config.token.map(|t| format!("Bearer {}", t)),
                default_namespace: config.default_namespace,
                pool_manager,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Namespace used when a lookup does not name one
    pub fn default_namespace(&self) -> &str {
        &self.inner.default_namespace
    }

    /// Catalog API operations
    pub fn catalog(&self) -> crate::api::catalog::CatalogApi<'_> {
        crate::api::catalog::CatalogApi::new(self)
    }

    /// Execute a single GET and return status and body. Non-success statuses
    /// are not errors here; only transport failures, timeouts and
    /// cancellation of `ctx` are.
    pub async fn get_raw(&self, ctx: &Context, path: &str) -> Result<(StatusCode, String), ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);

        tracing::debug!("GET request to: {}", url);

        let mut request = self
            .inner
            .http_client
            .get(&url)
            .header(ACCEPT, "application/json");
        if let Some(auth) = &self.inner.auth_header {
            request = request.header(AUTHORIZATION, auth);
        }

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let result = tokio::select! {
            biased;
            _ = ctx.cancelled() => {
                tracing::debug!("GET {} cancelled by request context", url);
                return Err(ApiError::Cancelled);
            }
            result = exchange => result,
        };

        match result {
            Ok((status, body)) => {
                tracing::debug!("Response status: {}", status);
                Ok((status, body))
            }
            Err(e) => {
                if e.is_timeout() {
                    Err(ApiError::Timeout(
                        self.inner.pool_manager.config().request_timeout.as_secs(),
                    ))
                } else {
                    Err(ApiError::RequestError(e))
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use mockito::Server;
    use std::io::Write;

    #[test]
    fn client_rejects_invalid_base_url() {
        assert!(matches!(
            Client::new("not a url", None),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(matches!(
            Client::new("ftp://backstage.example.com", None),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn client_strips_trailing_slash_and_keeps_default_namespace() {
        let client = Client::with_config(
            ClientConfig::new("https://backstage.example.com/").with_default_namespace("platform"),
        )
        .unwrap();

        assert_eq!(client.base_url(), "https://backstage.example.com");
        assert_eq!(client.default_namespace(), "platform");
        assert_eq!(
            Client::new("https://backstage.example.com", None)
                .unwrap()
                .default_namespace(),
            DEFAULT_NAMESPACE
        );
    }

    #[tokio::test]
    async fn get_raw_sends_bearer_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/catalog/entities")
            .match_header("authorization", "Bearer secret-token")
            .with_body("[]")
            .create_async()
            .await;

        let client = Client::new(&server.url(), Some("secret-token")).unwrap();
        let (status, body) = client
            .get_raw(&Context::new(), "/api/catalog/entities")
            .await
            .unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "[]");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_raw_returns_error_statuses_without_failing() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/catalog/entities")
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let client = Client::new(&server.url(), None).unwrap();
        let (status, body) = client
            .get_raw(&Context::new(), "/api/catalog/entities")
            .await
            .unwrap();

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, "unavailable");
    }

    #[tokio::test]
    async fn get_raw_handles_network_errors() {
        let client = Client::new("http://127.0.0.1:1", None).unwrap();

        let result = client.get_raw(&Context::new(), "/api/catalog/entities").await;
        assert!(matches!(result, Err(ApiError::RequestError(_))));
    }

    #[tokio::test]
    async fn get_raw_honours_cancelled_context() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/catalog/entities")
            .expect(0)
            .create_async()
            .await;

        let client = Client::new(&server.url(), None).unwrap();
        let ctx = Context::new();
        ctx.cancel();

        let result = client.get_raw(&ctx, "/api/catalog/entities").await;
        assert!(matches!(result, Err(ApiError::Cancelled)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_raw_aborts_when_deadline_passes() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/catalog/entities")
            .with_chunked_body(|w| {
                std::thread::sleep(std::time::Duration::from_secs(2));
                w.write_all(b"[]")
            })
            .create_async()
            .await;

        let client = Client::new(&server.url(), None).unwrap();
        let ctx = Context::new().with_timeout(Duration::from_millis(100));

        let start = std::time::Instant::now();
        let result = client.get_raw(&ctx, "/api/catalog/entities").await;

        assert!(matches!(result, Err(ApiError::Cancelled)));
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
