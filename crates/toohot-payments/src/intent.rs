//! # Payment Intents
//!
//! The provider-side record of one attempt to charge an order.
//!
//! ```text
//! requires_payment_method ─► requires_confirmation ─► requires_action
//!          │                          │                     │
//!          └──────────────────────────┴─────► processing ─► succeeded
//!                                                   │
//!                                 canceled ◄────────┘ (or payment_failed)
//! ```
//!
//! Statuses are kept as the provider's raw strings; mapping them onto order
//! state is `toohot_core::status::reconcile_payment`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_CURRENCY, REUSABLE_INTENT_STATUSES};

/// Metadata key carrying the storefront order id.
pub const METADATA_ORDER_ID: &str = "orderId";
pub const METADATA_ORDER_NUMBER: &str = "orderNumber";
pub const METADATA_CUSTOMER_EMAIL: &str = "customerEmail";

/// True for ids shaped like the provider's (`pi_` followed by letters,
/// digits and underscores).
pub fn is_valid_intent_id(id: &str) -> bool {
    id.len() > 3
        && id.starts_with("pi_")
        && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// A payment intent as returned by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub status: String,
    /// Amount in cents.
    pub amount: i64,
    pub currency: String,
    /// Handed to the browser so it can confirm the card payment.
    pub client_secret: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub last_payment_error: Option<LastPaymentError>,
}

/// Why the most recent charge attempt failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastPaymentError {
    pub code: Option<String>,
    pub message: Option<String>,
}

impl PaymentIntent {
    /// The storefront order this intent pays for, if it was tagged.
    pub fn order_id(&self) -> Option<&str> {
        self.metadata
            .get(METADATA_ORDER_ID)
            .map(String::as_str)
            .filter(|id| !id.trim().is_empty())
    }

    /// True while the customer can still pay with this intent.
    pub fn is_reusable(&self) -> bool {
        REUSABLE_INTENT_STATUSES.contains(&self.status.as_str())
    }

    pub fn has_payment_error(&self) -> bool {
        self.last_payment_error.is_some()
    }
}

/// Parameters for creating an intent.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIntentRequest {
    pub amount: i64,
    pub currency: String,
    pub description: String,
    pub receipt_email: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl CreateIntentRequest {
    /// Builds the request for one storefront order.
    pub fn for_order(order_id: &str, order_number: &str, customer_email: &str, amount: i64) -> Self {
        let metadata = BTreeMap::from([
            (METADATA_ORDER_ID.to_string(), order_id.to_string()),
            (METADATA_ORDER_NUMBER.to_string(), order_number.to_string()),
            (METADATA_CUSTOMER_EMAIL.to_string(), customer_email.to_string()),
        ]);

        CreateIntentRequest {
            amount,
            currency: DEFAULT_CURRENCY.to_string(),
            description: format!("TooHot Order {order_number}"),
            receipt_email: Some(customer_email.to_string()),
            metadata,
        }
    }

    /// Form-encoded body in the provider's bracket notation.
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = vec![
            ("amount".to_string(), self.amount.to_string()),
            ("currency".to_string(), self.currency.clone()),
            ("payment_method_types[]".to_string(), "card".to_string()),
            ("description".to_string(), self.description.clone()),
        ];
        if let Some(email) = &self.receipt_email {
            form.push(("receipt_email".to_string(), email.clone()));
        }
        for (key, value) in &self.metadata {
            form.push((format!("metadata[{key}]"), value.clone()));
        }
        form
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_id_shape() {
        assert!(is_valid_intent_id("pi_3MtwBwLkdIwHu7ix28a3tqPa"));
        assert!(is_valid_intent_id("pi_0f3c2a9b_test"));
        assert!(!is_valid_intent_id("pi_"));
        assert!(!is_valid_intent_id("ch_3MtwBwLkdIwHu7ix"));
        assert!(!is_valid_intent_id("pi_1/../../customers/cus_123"));
        assert!(!is_valid_intent_id("pi_1?expand[]=sources"));
        assert!(!is_valid_intent_id(""));
    }

    #[test]
    fn test_for_order_fills_metadata_and_description() {
        let req = CreateIntentRequest::for_order("ord-1", "TH-240615-003", "mei@example.com", 2165);

        assert_eq!(req.amount, 2165);
        assert_eq!(req.currency, "usd");
        assert_eq!(req.description, "TooHot Order TH-240615-003");
        assert_eq!(req.receipt_email.as_deref(), Some("mei@example.com"));
        assert_eq!(req.metadata.get("orderId").map(String::as_str), Some("ord-1"));
    }

    #[test]
    fn test_to_form_uses_bracket_metadata_keys() {
        let form = CreateIntentRequest::for_order("ord-1", "TH-240615-003", "mei@example.com", 2165)
            .to_form();

        assert!(form.contains(&("amount".to_string(), "2165".to_string())));
        assert!(form.contains(&("metadata[orderId]".to_string(), "ord-1".to_string())));
        assert!(form.contains(&("metadata[orderNumber]".to_string(), "TH-240615-003".to_string())));
        assert!(form.contains(&("metadata[customerEmail]".to_string(), "mei@example.com".to_string())));
    }

    #[test]
    fn test_parses_provider_json() {
        let json = r#"{
            "id": "pi_123",
            "object": "payment_intent",
            "status": "requires_payment_method",
            "amount": 2165,
            "currency": "usd",
            "client_secret": "pi_123_secret_abc",
            "metadata": {"orderId": "ord-1"},
            "last_payment_error": null
        }"#;
        let intent: PaymentIntent = serde_json::from_str(json).unwrap();

        assert_eq!(intent.order_id(), Some("ord-1"));
        assert!(intent.is_reusable());
        assert!(!intent.has_payment_error());
    }

    #[test]
    fn test_missing_order_id() {
        let json = r#"{"id":"pi_1","status":"succeeded","amount":1,"currency":"usd","client_secret":null}"#;
        let intent: PaymentIntent = serde_json::from_str(json).unwrap();
        assert_eq!(intent.order_id(), None);
        assert!(!intent.is_reusable());
    }
}
