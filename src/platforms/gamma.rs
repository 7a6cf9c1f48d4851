//! Polymarket Gamma API integration (market discovery, no auth).
//!
//! Two discovery strategies feed the same pipeline:
//! - events grouping 3+ single-outcome markets, usable only when the
//!   venue flags them mutually exclusive (negRisk)
//! - individual markets that natively carry 3+ outcomes
//!
//! The Gamma API encodes lists as JSON strings inside JSON and has
//! shipped token ids under at least three different shapes over time,
//! so normalization here is deliberately defensive: anything that does
//! not parse is skipped, never fatal.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::PlatformConfig;
use crate::platforms::MarketDataSource;
use crate::types::{MarketSnapshot, OutcomeLeg, SnapshotSource};

// ---------------------------------------------------------------------------
// Gamma API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone, Default)]
#[allow(dead_code)]
pub struct GammaMarket {
    /// Numeric in some payloads, string in others.
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub question: String,
    #[serde(default, rename = "conditionId")]
    pub condition_id: String,
    /// Outcome labels as a JSON string: "[\"Yes\",\"No\"]"
    #[serde(default)]
    pub outcomes: Option<String>,
    /// Outcome prices as a JSON string: "[\"0.65\",\"0.35\"]"
    #[serde(default, rename = "outcomePrices")]
    pub outcome_prices: Option<String>,
    /// Token ids as a JSON string, parallel to `outcomes`.
    #[serde(default, rename = "clobTokenIds")]
    pub clob_token_ids: Option<String>,
    #[serde(default, rename = "negRisk")]
    pub neg_risk: bool,
    /// Richer token objects, present on some endpoints.
    #[serde(default)]
    pub tokens: Option<Vec<GammaToken>>,
    /// Flat token ids, the oldest encoding.
    #[serde(default, rename = "yesTokenId")]
    pub yes_token_id: Option<String>,
    #[serde(default, rename = "noTokenId")]
    pub no_token_id: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub closed: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct GammaToken {
    #[serde(default)]
    pub token_id: String,
    #[serde(default)]
    pub outcome: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[allow(dead_code)]
pub struct GammaEvent {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "negRisk")]
    pub neg_risk: bool,
    #[serde(default)]
    pub markets: Vec<GammaMarket>,
}

fn id_string(v: &Option<serde_json::Value>) -> String {
    match v {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Parse a Gamma JSON-string list: "[\"a\",\"b\"]" → ["a", "b"].
fn parse_string_list(s: &str) -> Vec<String> {
    serde_json::from_str::<Vec<String>>(s).unwrap_or_default()
}

/// Parse a Gamma JSON-string price list into floats.
fn parse_price_list(s: &str) -> Vec<f64> {
    parse_string_list(s)
        .iter()
        .filter_map(|p| p.parse::<f64>().ok())
        .collect()
}

/// Extract YES/NO token ids from a binary market, trying each encoding
/// the Gamma API has used. First strategy that yields anything wins.
fn binary_token_ids(market: &GammaMarket) -> (Option<String>, Option<String>) {
    // 1. Token objects with an outcome field.
    if let Some(tokens) = &market.tokens {
        let yes = tokens
            .iter()
            .find(|t| t.outcome.eq_ignore_ascii_case("yes"))
            .map(|t| t.token_id.clone())
            .filter(|t| !t.is_empty());
        let no = tokens
            .iter()
            .find(|t| t.outcome.eq_ignore_ascii_case("no"))
            .map(|t| t.token_id.clone())
            .filter(|t| !t.is_empty());
        if yes.is_some() || no.is_some() {
            return (yes, no);
        }
    }

    // 2. clobTokenIds pair, YES first by convention.
    if let Some(raw) = &market.clob_token_ids {
        let ids = parse_string_list(raw);
        if ids.len() >= 2 {
            return (Some(ids[0].clone()), Some(ids[1].clone()));
        }
    }

    // 3. Flat fields.
    (market.yes_token_id.clone(), market.no_token_id.clone())
}

/// Build a snapshot from an event grouping binary markets. Returns None
/// unless mutual exclusivity is asserted, every leg has a YES token id,
/// and 3+ legs survive parsing.
pub fn event_to_snapshot(event: &GammaEvent) -> Option<MarketSnapshot> {
    if !event.neg_risk {
        return None;
    }

    let mut legs = Vec::new();
    for market in &event.markets {
        let prices = market
            .outcome_prices
            .as_deref()
            .map(parse_price_list)
            .unwrap_or_default();
        // First price is the YES side of this sub-market.
        let price = match prices.first() {
            Some(p) if *p > 0.0 && *p < 1.0 => *p,
            _ => continue,
        };
        let (yes_token_id, no_token_id) = binary_token_ids(market);
        // An arb basket needs every leg buyable. One leg without a YES
        // token id invalidates the whole event.
        if yes_token_id.is_none() {
            return None;
        }
        legs.push(OutcomeLeg {
            label: market.question.clone(),
            price,
            yes_token_id,
            no_token_id,
        });
    }

    if legs.len() < 3 {
        return None;
    }

    Some(MarketSnapshot {
        id: id_string(&event.id),
        question: event.title.clone(),
        source: SnapshotSource::GroupedEvent,
        legs,
    })
}

/// Build a snapshot from a single market with 3+ native outcomes.
pub fn market_to_snapshot(market: &GammaMarket) -> Option<MarketSnapshot> {
    let prices = market
        .outcome_prices
        .as_deref()
        .map(parse_price_list)
        .unwrap_or_default();
    if prices.len() < 3 || prices.iter().any(|p| *p <= 0.0 || *p >= 1.0) {
        return None;
    }

    let labels = market
        .outcomes
        .as_deref()
        .map(parse_string_list)
        .unwrap_or_default();
    let token_ids = market
        .clob_token_ids
        .as_deref()
        .map(parse_string_list)
        .unwrap_or_default();

    let legs = prices
        .iter()
        .enumerate()
        .map(|(i, price)| OutcomeLeg {
            label: labels
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("Outcome {}", i + 1)),
            price: *price,
            // One token per outcome; these are the buyable side. The
            // complement side is not exposed on this endpoint.
            yes_token_id: token_ids.get(i).cloned(),
            no_token_id: None,
        })
        .collect();

    let id = if market.condition_id.is_empty() {
        id_string(&market.id)
    } else {
        market.condition_id.clone()
    };

    Some(MarketSnapshot {
        id,
        question: market.question.clone(),
        source: SnapshotSource::MultiOutcomeMarket,
        legs,
    })
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct GammaClient {
    http: Client,
    base_url: String,
    limit: u32,
}

impl GammaClient {
    pub fn new(config: &PlatformConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.http_timeout_secs))
            .build()
            .context("Failed to build Gamma HTTP client")?;

        Ok(Self {
            http,
            base_url: config.gamma_url.clone(),
            limit: config.market_limit,
        })
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}/{path}", self.base_url);
        debug!(url = %url, "Fetching from Gamma API");

        let resp = self
            .http
            .get(&url)
            .query(&[
                ("active", "true"),
                ("closed", "false"),
                ("limit", &self.limit.to_string()),
            ])
            .send()
            .await
            .context("Gamma API request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Gamma API error {status}: {body}");
        }

        resp.json()
            .await
            .context("Failed to parse Gamma API response")
    }
}

#[async_trait]
impl MarketDataSource for GammaClient {
    async fn fetch_event_snapshots(&self) -> Result<Vec<MarketSnapshot>> {
        let events: Vec<GammaEvent> = self.fetch_json("events").await?;
        let snapshots: Vec<MarketSnapshot> =
            events.iter().filter_map(event_to_snapshot).collect();
        info!(
            raw = events.len(),
            usable = snapshots.len(),
            "Fetched Gamma events"
        );
        Ok(snapshots)
    }

    async fn fetch_market_snapshots(&self) -> Result<Vec<MarketSnapshot>> {
        let markets: Vec<GammaMarket> = self.fetch_json("markets").await?;
        let snapshots: Vec<MarketSnapshot> =
            markets.iter().filter_map(market_to_snapshot).collect();
        info!(
            raw = markets.len(),
            usable = snapshots.len(),
            "Fetched Gamma markets"
        );
        Ok(snapshots)
    }

    fn name(&self) -> &str {
        "gamma"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
