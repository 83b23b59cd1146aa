//! HTTP client for the hosted Pulsefit platform API.
//!
//! Speaks plain JSON over REST. Product lookups are cached with `moka`
//! (5-minute TTL, negative results included) because hydration resolves
//! every persisted line through the catalog; cart operations are never
//! cached.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use pulsefit_core::{CartItem, CartSessionId, ProductId, UserId};

use crate::config::PlatformConfig;
use crate::store::{CartRecord, LineRecord, Product, ProductCatalog, RemoteCartStore, StoreError};

/// Product cache capacity; the catalog is small (equipment + apparel).
const PRODUCT_CACHE_CAPACITY: u64 = 1000;
/// Product cache TTL.
const PRODUCT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Wrapper for platform list/detail responses.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    data: T,
}

/// Client for the Pulsefit platform cart and catalog endpoints.
#[derive(Clone)]
pub struct PlatformClient {
    inner: Arc<PlatformClientInner>,
}

struct PlatformClientInner {
    client: reqwest::Client,
    base_url: url::Url,
    products: Cache<ProductId, Option<Product>>,
}

impl PlatformClient {
    /// Create a new platform API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build or the API key is
    /// not a valid header value.
    pub fn new(config: &PlatformConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| StoreError::Parse(format!("Invalid API key format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert("Authorization", auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let products = Cache::builder()
            .max_capacity(PRODUCT_CACHE_CAPACITY)
            .time_to_live(PRODUCT_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(PlatformClientInner {
                client,
                base_url: config.base_url.clone(),
                products,
            }),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        format!("{base}/v1/{path}")
    }

    /// GET a JSON resource, mapping 404 to `Ok(None)`.
    async fn get_optional<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, StoreError> {
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(api_error(status, response).await);
        }

        let body: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;
        Ok(Some(body.data))
    }
}

async fn api_error(status: StatusCode, response: reqwest::Response) -> StoreError {
    let message = response.text().await.unwrap_or_default();
    StoreError::Api {
        status: status.as_u16(),
        message,
    }
}

impl RemoteCartStore for PlatformClient {
    #[instrument(skip(self))]
    async fn ping(&self) -> Result<(), StoreError> {
        let response = self
            .inner
            .client
            .get(self.endpoint("health"))
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(api_error(status, response).await)
        }
    }

    #[instrument(skip(self), fields(user = %user))]
    async fn get_active_cart(&self, user: &UserId) -> Result<Option<CartRecord>, StoreError> {
        let url = self.endpoint(&format!("users/{user}/cart"));
        let record: Option<CartRecord> = self.get_optional(&url).await?;
        Ok(record.filter(|r| r.status.is_active()))
    }

    #[instrument(skip(self), fields(user = %user))]
    async fn create_cart(&self, user: &UserId) -> Result<CartRecord, StoreError> {
        let url = self.endpoint(&format!("users/{user}/cart"));
        let response = self.inner.client.post(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status, response).await);
        }

        let body: ApiResponse<CartRecord> = response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;
        debug!(cart = %body.data.id, "created remote cart");
        Ok(body.data)
    }

    #[instrument(skip(self), fields(cart = %cart))]
    async fn list_items(&self, cart: &CartSessionId) -> Result<Vec<LineRecord>, StoreError> {
        let url = self.endpoint(&format!("carts/{cart}/items"));
        self.get_optional(&url)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("cart {cart}")))
    }

    #[instrument(skip(self, items), fields(user = %user, lines = items.len()))]
    async fn replace_items(&self, user: &UserId, items: &[CartItem]) -> Result<(), StoreError> {
        let lines: Vec<LineRecord> = items.iter().map(LineRecord::from).collect();
        let url = self.endpoint(&format!("users/{user}/cart/items"));
        let response = self
            .inner
            .client
            .put(&url)
            .json(&serde_json::json!({ "data": lines }))
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(api_error(status, response).await)
        }
    }
}

impl ProductCatalog for PlatformClient {
    #[instrument(skip(self), fields(product = %id))]
    async fn product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        if let Some(cached) = self.inner.products.get(id).await {
            return Ok(cached);
        }

        let url = self.endpoint(&format!("products/{id}"));
        let product: Option<Product> = self.get_optional(&url).await?;
        self.inner.products.insert(id.clone(), product.clone()).await;
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn client() -> PlatformClient {
        let config = PlatformConfig {
            base_url: url::Url::parse("https://api.pulsefit.app/").expect("valid url"),
            api_key: SecretString::from("pk_test_8fj3k29dk3jf93j1"),
        };
        PlatformClient::new(&config).expect("client builds")
    }

    #[test]
    fn test_endpoint_formatting() {
        let client = client();
        assert_eq!(
            client.endpoint("users/usr_1/cart"),
            "https://api.pulsefit.app/v1/users/usr_1/cart"
        );
        assert_eq!(client.endpoint("health"), "https://api.pulsefit.app/v1/health");
    }

    #[test]
    fn test_rejects_unprintable_api_key() {
        let config = PlatformConfig {
            base_url: url::Url::parse("https://api.pulsefit.app").expect("valid url"),
            api_key: SecretString::from("bad\nkey-with-newline"),
        };
        assert!(matches!(
            PlatformClient::new(&config),
            Err(StoreError::Parse(_))
        ));
    }
}
