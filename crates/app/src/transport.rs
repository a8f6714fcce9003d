//! Catalog/order transport.
//!
//! The coordinator depends on [`ShopApi`] only; [`HttpShopApi`] is the JSON
//! adapter used by the binary. Requests are not retried.

use std::future::Future;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use storefront_catalog::Product;
use storefront_orders::{OrderResult, OrderSnapshot};

use crate::config::StorefrontConfig;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({0}): {1}")]
    Api(u16, String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Backend operations the storefront needs.
///
/// Each returned future resolves exactly once. Implementations are used from a
/// single thread, so the futures need not be `Send`.
pub trait ShopApi {
    fn fetch_catalog(&self) -> impl Future<Output = Result<Vec<Product>, TransportError>>;

    fn submit_order(
        &self,
        order: OrderSnapshot,
    ) -> impl Future<Output = Result<OrderResult, TransportError>>;
}

/// List envelope the backend wraps collections in.
#[derive(Debug, Deserialize)]
struct ApiListResponse<T> {
    #[allow(dead_code)]
    total: u64,
    items: Vec<T>,
}

/// `reqwest`-backed [`ShopApi`].
#[derive(Debug, Clone)]
pub struct HttpShopApi {
    client: reqwest::Client,
    api_origin: Url,
    cdn_url: Url,
}

impl HttpShopApi {
    pub fn new(config: &StorefrontConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_origin: config.api_origin.clone(),
            cdn_url: config.cdn_url.clone(),
        })
    }

    pub fn api_origin(&self) -> &Url {
        &self.api_origin
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        Ok(self.api_origin.join(path)?)
    }

    async fn read_json<T>(resp: reqwest::Response) -> Result<T, TransportError>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = resp.status();
        if !status.is_success() {
            let body = match resp.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!(%status, error = %e, "could not read error response body");
                    String::new()
                }
            };
            return Err(TransportError::Api(status.as_u16(), body));
        }

        resp.json::<T>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}

impl ShopApi for HttpShopApi {
    async fn fetch_catalog(&self) -> Result<Vec<Product>, TransportError> {
        let url = self.endpoint("product")?;
        tracing::debug!(%url, "fetching catalog");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let list: ApiListResponse<Product> = Self::read_json(resp).await?;
        Ok(list
            .items
            .into_iter()
            .map(|product| product.resolve_image(&self.cdn_url))
            .collect())
    }

    async fn submit_order(&self, order: OrderSnapshot) -> Result<OrderResult, TransportError> {
        let url = self.endpoint("order")?;
        tracing::debug!(%url, items = order.items.len(), total = %order.total, "posting order");

        let resp = self
            .client
            .post(url)
            .json(&order)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Self::read_json(resp).await
    }
}
