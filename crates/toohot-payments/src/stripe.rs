//! # Stripe REST Client
//!
//! Thin client over the two payment-intent endpoints the storefront uses.
//!
//! ```text
//! create_intent   ──► POST {api_base}/v1/payment_intents        (write timeout)
//! retrieve_intent ──► GET  {api_base}/v1/payment_intents/{id}   (read timeout)
//! ```
//!
//! Error bodies look like `{"error": {"message": "...", "code": "..."}}`; the
//! message is surfaced unchanged so the customer sees e.g. "Your card was
//! declined."

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::{PaymentError, PaymentResult};
use crate::gateway::PaymentGateway;
use crate::intent::{CreateIntentRequest, PaymentIntent};

/// Default provider endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub api_base: Url,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    /// Pinned API version sent as `Stripe-Version`, if any.
    pub api_version: Option<String>,
}

impl StripeConfig {
    pub fn new(secret_key: impl Into<String>) -> PaymentResult<Self> {
        Ok(StripeConfig {
            secret_key: secret_key.into(),
            api_base: Url::parse(DEFAULT_API_BASE)?,
            read_timeout: Duration::from_secs(10),
            write_timeout: Duration::from_secs(30),
            api_version: None,
        })
    }

    pub fn api_base(mut self, base: &str) -> PaymentResult<Self> {
        self.api_base = Url::parse(base)?;
        Ok(self)
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }
}

// =============================================================================
// Gateway
// =============================================================================

pub struct StripeGateway {
    client: Client,
    config: StripeConfig,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    code: Option<String>,
}

impl StripeGateway {
    pub fn new(config: StripeConfig) -> PaymentResult<Self> {
        if config.secret_key.trim().is_empty() {
            return Err(PaymentError::InvalidConfig(
                "secret key must not be empty".into(),
            ));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| PaymentError::InvalidConfig(e.to_string()))?;

        Ok(StripeGateway { client, config })
    }

    fn endpoint(&self, path: &str) -> PaymentResult<Url> {
        Ok(self.config.api_base.join(path)?)
    }

    /// `{api_base}/v1/payment_intents/{id}` with the id as one encoded segment.
    fn intent_endpoint(&self, intent_id: &str) -> PaymentResult<Url> {
        let mut url = self.endpoint("/v1/payment_intents")?;
        url.path_segments_mut()
            .map_err(|()| PaymentError::InvalidConfig("API base cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(intent_id);
        Ok(url)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.bearer_auth(&self.config.secret_key);
        match &self.config.api_version {
            Some(version) => builder.header("Stripe-Version", version),
            None => builder,
        }
    }

    /// Sends the request and decodes either an intent or the provider's error.
    async fn execute(
        &self,
        builder: RequestBuilder,
        timeout: Duration,
        intent_id: Option<&str>,
    ) -> PaymentResult<PaymentIntent> {
        let response = self
            .authorize(builder)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| send_error(e, timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| send_error(e, timeout))?;

        if status.is_success() {
            return serde_json::from_str(&body)
                .map_err(|e| PaymentError::InvalidResponse(e.to_string()));
        }

        if status == StatusCode::NOT_FOUND {
            if let Some(id) = intent_id {
                return Err(PaymentError::NotFound { id: id.to_string() });
            }
        }

        Err(provider_error(status, &body))
    }
}

fn send_error(err: reqwest::Error, timeout: Duration) -> PaymentError {
    if err.is_timeout() {
        PaymentError::Timeout {
            seconds: timeout.as_secs(),
        }
    } else {
        PaymentError::from(err)
    }
}

fn provider_error(status: StatusCode, body: &str) -> PaymentError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => PaymentError::Provider {
            status: status.as_u16(),
            code: envelope.error.code,
            message: envelope
                .error
                .message
                .unwrap_or_else(|| format!("Payment provider returned {status}")),
        },
        Err(_) => PaymentError::Provider {
            status: status.as_u16(),
            code: None,
            message: format!("Payment provider returned {status}"),
        },
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(&self, request: &CreateIntentRequest) -> PaymentResult<PaymentIntent> {
        let url = self.endpoint("/v1/payment_intents")?;
        debug!(amount = request.amount, "Creating payment intent");

        let builder = self.client.post(url).form(&request.to_form());
        let intent = self
            .execute(builder, self.config.write_timeout, None)
            .await
            .inspect_err(|e| warn!(error = %e, "Payment intent creation failed"))?;

        debug!(intent_id = %intent.id, status = %intent.status, "Payment intent created");
        Ok(intent)
    }

    async fn retrieve_intent(&self, intent_id: &str) -> PaymentResult<PaymentIntent> {
        let url = self.intent_endpoint(intent_id)?;
        debug!(intent_id = %intent_id, "Retrieving payment intent");

        let builder = self.client.get(url);
        self.execute(builder, self.config.read_timeout, Some(intent_id))
            .await
    }
}
