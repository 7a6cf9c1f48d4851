//! Polymarket CLOB order gateway.
//!
//! Submits one market order per basket leg and classifies each response
//! independently, so a transport failure on one leg never masks fills
//! on the others. Order signing (EIP-712 over a Polygon wallet) is not
//! wired; without credentials the gateway reports itself not live and
//! the engine keeps executions simulated.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{AppConfig, PlatformConfig};
use crate::platforms::{BasketRequest, BasketResult, LegFill, LegOrder, LegStatus, OrderGateway};

// ---------------------------------------------------------------------------
// CLOB response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default)]
struct OrderResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    status: String,
    #[serde(default, rename = "orderID")]
    order_id: Option<String>,
    #[serde(default, rename = "errorMsg")]
    error_msg: Option<String>,
}

impl OrderResponse {
    /// The CLOB reports a resting or matched order with several status
    /// strings; all of them mean our size was accepted.
    fn leg_status(&self) -> LegStatus {
        let status = self.status.to_lowercase();
        if self.success && matches!(status.as_str(), "matched" | "filled" | "live" | "") {
            LegStatus::Filled
        } else if let Some(msg) = &self.error_msg {
            LegStatus::Failed(msg.clone())
        } else {
            LegStatus::Rejected
        }
    }
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

pub struct ClobGateway {
    http: Client,
    base_url: String,
    live: bool,
}

impl ClobGateway {
    pub fn new(platform: &PlatformConfig, config: &AppConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(platform.http_timeout_secs))
            .build()
            .context("Failed to build CLOB HTTP client")?;

        let has_key = config
            .execution
            .private_key_env
            .as_deref()
            .map(|env| std::env::var(env).is_ok())
            .unwrap_or(false);
        let live = has_key && config.can_submit_orders();
        if !live {
            warn!("No usable signing credentials; CLOB gateway in analysis-only mode");
        }

        Ok(Self {
            http,
            base_url: platform.clob_url.clone(),
            live,
        })
    }

    async fn submit_leg(&self, leg: &LegOrder) -> LegFill {
        let client_order_id = Uuid::new_v4().to_string();
        let payload = json!({
            "order": {
                "tokenID": leg.token_id,
                "price": leg.price,
                "size": leg.dollars / leg.price.max(1e-9),
                "side": "BUY",
                "clientOrderID": client_order_id,
            },
            "orderType": "FOK",
        });

        debug!(
            token_id = %leg.token_id,
            dollars = format!("${:.2}", leg.dollars),
            "Submitting leg order"
        );

        let response = self
            .http
            .post(format!("{}/order", self.base_url))
            .json(&payload)
            .send()
            .await;

        let (status, order_id) = match response {
            Ok(resp) if resp.status().is_success() => match resp.json::<OrderResponse>().await {
                Ok(parsed) => (parsed.leg_status(), parsed.order_id),
                Err(e) => (LegStatus::Failed(format!("bad response: {e}")), None),
            },
            Ok(_) => (LegStatus::Rejected, None),
            Err(e) => (LegStatus::Failed(e.to_string()), None),
        };

        LegFill {
            token_id: leg.token_id.clone(),
            label: leg.label.clone(),
            status,
            order_id,
        }
    }
}

#[async_trait]
impl OrderGateway for ClobGateway {
    async fn execute_basket(&self, request: &BasketRequest) -> Result<BasketResult> {
        if !self.live {
            anyhow::bail!("CLOB gateway is not live; refusing to submit orders");
        }

        let mut fills = Vec::with_capacity(request.legs.len());
        for leg in &request.legs {
            fills.push(self.submit_leg(leg).await);
        }

        Ok(BasketResult { fills })
    }

    fn is_live(&self) -> bool {
        self.live
    }

    fn name(&self) -> &str {
        "clob"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
