//! Payment gateway order-creation client
//!
//! The gateway stays an external collaborator: order creation goes out over
//! its REST API, and the signed callback comes back through the verify
//! handler. The client sits behind a trait so handler tests can substitute
//! a recording double without network access.

use async_trait::async_trait;
use frameline_common::config::GatewayConfig;
use frameline_common::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Order as the gateway reports it back
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub order_id: String,
    /// Amount in minor units (paise)
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
}

/// Order-creation seam to the external payment gateway
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Create an order for `amount_minor` minor units with the given receipt
    async fn create_order(&self, amount_minor: i64, currency: &str, receipt: &str)
        -> Result<GatewayOrder>;
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateOrderResponse {
    id: String,
    amount: i64,
    currency: String,
    receipt: String,
}

/// HTTP client against the real gateway (basic auth with key id + secret)
pub struct HttpOrderGateway {
    config: GatewayConfig,
    client: reqwest::Client,
}

impl HttpOrderGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client (system error)"),
        }
    }
}

#[async_trait]
impl OrderGateway for HttpOrderGateway {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder> {
        let url = format!("{}/orders", self.config.base_url);
        debug!("Creating gateway order: {} {} ({})", amount_minor, currency, receipt);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.key_id, Some(&self.config.secret))
            .json(&CreateOrderRequest {
                amount: amount_minor,
                currency,
                receipt,
            })
            .send()
            .await
            .map_err(|e| Error::Gateway(format!("order request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Gateway(format!(
                "gateway rejected order: HTTP {}",
                response.status()
            )));
        }

        let body: CreateOrderResponse = response
            .json()
            .await
            .map_err(|e| Error::Gateway(format!("malformed gateway response: {}", e)))?;

        Ok(GatewayOrder {
            order_id: body.id,
            amount: body.amount,
            currency: body.currency,
            receipt: body.receipt,
        })
    }
}
