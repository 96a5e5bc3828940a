//! HTTP transport to the storefront's `/api/cart` endpoint.

use async_trait::async_trait;
use shopfront_core::{CartId, CartPayload};
use tracing::{debug, instrument};
use url::Url;

use crate::dispatcher::CartMutation;
use crate::error::TransportError;

/// The remote side of cart synchronization.
///
/// Error responses that still carry a JSON body come back as `Ok` with
/// `error` set; `Err` is reserved for requests that produced no payload.
#[async_trait]
pub trait CartApi: Send + Sync {
    /// `GET` the current state of `cart_id`.
    async fn fetch(&self, cart_id: &CartId) -> Result<CartPayload, TransportError>;

    /// `POST` a mutation.
    async fn submit(&self, mutation: &CartMutation) -> Result<CartPayload, TransportError>;
}

/// [`CartApi`] over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpCartApi {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpCartApi {
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    #[must_use]
    pub const fn with_client(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn decode(response: reqwest::Response) -> Result<CartPayload, TransportError> {
        let status = response.status();
        let body = response.text().await?;
        let payload: CartPayload =
            serde_json::from_str(&body).map_err(|source| TransportError::Decode {
                status: status.as_u16(),
                source,
            })?;
        debug!(
            status = %status,
            has_cart = payload.cart.is_some(),
            error = payload.error.as_deref(),
            "cart response"
        );
        Ok(payload)
    }
}

#[async_trait]
impl CartApi for HttpCartApi {
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    async fn fetch(&self, cart_id: &CartId) -> Result<CartPayload, TransportError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("cartId", cart_id.as_str());

        let response = self.client.get(url).send().await?;
        Self::decode(response).await
    }

    #[instrument(skip(self, mutation), fields(action = %mutation.action()))]
    async fn submit(&self, mutation: &CartMutation) -> Result<CartPayload, TransportError> {
        let fields = mutation.form_fields()?;

        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&fields)
            .send()
            .await?;
        Self::decode(response).await
    }
}
