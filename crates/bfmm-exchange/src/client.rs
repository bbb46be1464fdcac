//! bitFlyer private REST client.
//!
//! Requests are signed with `ACCESS-KEY` / `ACCESS-TIMESTAMP` /
//! `ACCESS-SIGN` headers where the signature is HMAC-SHA256 over
//! `{timestamp}{method}{path}{body}` keyed with the API secret.

use crate::api::OrderApi;
use crate::error::{ExchangeError, ExchangeResult};
use bfmm_core::{AcceptanceId, Price, Side, Size, TimeInForce};
use bfmm_ws::ApiCredentials;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const SEND_CHILD_ORDER_PATH: &str = "/v1/me/sendchildorder";
const CANCEL_CHILD_ORDER_PATH: &str = "/v1/me/cancelchildorder";

#[derive(Debug, Serialize)]
struct SendChildOrderRequest<'a> {
    product_code: &'a str,
    child_order_type: &'static str,
    side: Side,
    price: i64,
    size: Decimal,
    time_in_force: TimeInForce,
}

#[derive(Debug, Deserialize)]
struct SendChildOrderResponse {
    child_order_acceptance_id: String,
}

/// Cancel selects its id field by prefix: acceptance ids carry the
/// exchange's `JRF` prefix, anything else is treated as a child order id.
#[derive(Debug, Serialize)]
struct CancelChildOrderRequest<'a> {
    product_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    child_order_acceptance_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    child_order_id: Option<&'a str>,
}

impl<'a> CancelChildOrderRequest<'a> {
    fn new(product_code: &'a str, id: &'a AcceptanceId) -> Self {
        if id.is_acceptance() {
            Self {
                product_code,
                child_order_acceptance_id: Some(id.as_str()),
                child_order_id: None,
            }
        } else {
            Self {
                product_code,
                child_order_acceptance_id: None,
                child_order_id: Some(id.as_str()),
            }
        }
    }
}

/// Private REST client for one account.
pub struct BitflyerClient {
    http: Client,
    base_url: String,
    credentials: ApiCredentials,
}

impl BitflyerClient {
    pub fn new(base_url: impl Into<String>, credentials: ApiCredentials) -> ExchangeResult<Self> {
        let http = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            credentials,
        })
    }

    fn sign_payload(credentials: &ApiCredentials, timestamp: &str, path: &str, body: &str) -> String {
        credentials.sign(&format!("{timestamp}POST{path}{body}"))
    }

    async fn signed_post(&self, path: &str, body: String) -> ExchangeResult<reqwest::Response> {
        let timestamp = chrono::Utc::now().timestamp_millis().to_string();
        let signature = Self::sign_payload(&self.credentials, &timestamp, path, &body);

        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .header("ACCESS-KEY", &self.credentials.key)
            .header("ACCESS-TIMESTAMP", &timestamp)
            .header("ACCESS-SIGN", &signature)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;

        Ok(response)
    }
}

impl OrderApi for BitflyerClient {
    async fn place_limit_order(
        &self,
        symbol: &str,
        side: Side,
        size: Size,
        price: Price,
        time_in_force: TimeInForce,
    ) -> ExchangeResult<AcceptanceId> {
        let request = SendChildOrderRequest {
            product_code: symbol,
            child_order_type: "LIMIT",
            side,
            price: price.inner(),
            size: size.inner(),
            time_in_force,
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| ExchangeError::InvalidResponse(e.to_string()))?;

        debug!(%symbol, %side, %price, %size, "Sending child order");
        let response = self.signed_post(SEND_CHILD_ORDER_PATH, body).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExchangeError::OrderRejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SendChildOrderResponse = response
            .json()
            .await
            .map_err(|e| ExchangeError::InvalidResponse(e.to_string()))?;
        Ok(AcceptanceId::from_string(parsed.child_order_acceptance_id))
    }

    async fn cancel_order(
        &self,
        symbol: &str,
        acceptance_id: &AcceptanceId,
    ) -> ExchangeResult<bool> {
        let request = CancelChildOrderRequest::new(symbol, acceptance_id);
        let body = serde_json::to_string(&request)
            .map_err(|e| ExchangeError::InvalidResponse(e.to_string()))?;

        debug!(%symbol, id = %acceptance_id, "Cancelling child order");
        let response = self.signed_post(CANCEL_CHILD_ORDER_PATH, body).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), %body, "Cancel request refused");
            return Ok(false);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_send_order_serialization() {
        let request = SendChildOrderRequest {
            product_code: "FX_BTC_JPY",
            child_order_type: "LIMIT",
            side: Side::Buy,
            price: 10_000_000,
            size: dec!(0.01),
            time_in_force: TimeInForce::GoodTilCancelled,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["product_code"], "FX_BTC_JPY");
        assert_eq!(value["child_order_type"], "LIMIT");
        assert_eq!(value["side"], "BUY");
        assert_eq!(value["price"], 10_000_000);
        assert_eq!(value["time_in_force"], "GTC");
    }

    #[test]
    fn test_cancel_selects_acceptance_id_for_jrf() {
        let id = AcceptanceId::from("JRF20240101-000000-000001");
        let request = CancelChildOrderRequest::new("FX_BTC_JPY", &id);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value["child_order_acceptance_id"],
            "JRF20240101-000000-000001"
        );
        assert!(value.get("child_order_id").is_none());
    }

    #[test]
    fn test_cancel_selects_order_id_otherwise() {
        let id = AcceptanceId::from("JOR20240101-000000-000001");
        let request = CancelChildOrderRequest::new("FX_BTC_JPY", &id);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["child_order_id"], "JOR20240101-000000-000001");
        assert!(value.get("child_order_acceptance_id").is_none());
    }

    #[test]
    fn test_sign_payload_covers_method_and_path() {
        let creds = ApiCredentials::new("key", "secret");
        let signature =
            BitflyerClient::sign_payload(&creds, "1700000000000", SEND_CHILD_ORDER_PATH, "{}");
        let expected = creds.sign("1700000000000POST/v1/me/sendchildorder{}");
        assert_eq!(signature, expected);
    }
}
