//! Payment gateway payloads.
//!
//! Only the fields the order pipeline reads are modelled; everything else in
//! the gateway's JSON is ignored.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use crate::models::{PostalAddress, ShippingAddress};

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";
pub const CHECKOUT_SESSION_ASYNC_PAYMENT_SUCCEEDED: &str =
    "checkout.session.async_payment_succeeded";

/// A verified webhook event.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub livemode: bool,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

impl WebhookEvent {
    /// Event types owned by the order pipeline.
    pub fn is_checkout_event(&self) -> bool {
        matches!(
            self.event_type.as_str(),
            CHECKOUT_SESSION_COMPLETED | CHECKOUT_SESSION_ASYNC_PAYMENT_SUCCEEDED
        )
    }

    pub fn checkout_session(&self) -> Result<CheckoutSession, serde_json::Error> {
        CheckoutSession::deserialize(&self.data.object)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    Payment,
    Subscription,
    Setup,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    NoPaymentRequired,
    #[serde(other)]
    Unknown,
}

/// The gateway either sends the payment intent id or, when expanded, the object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PaymentIntentRef {
    Id(String),
    Expanded { id: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub mode: Option<SessionMode>,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default)]
    pub payment_intent: Option<PaymentIntentRef>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub client_reference_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<GatewayAddress>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayAddress {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub line1: Option<String>,
    #[serde(default)]
    pub line2: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl CheckoutSession {
    pub fn payment_intent_id(&self) -> Option<&str> {
        let id = match self.payment_intent.as_ref()? {
            PaymentIntentRef::Id(id) => id,
            PaymentIntentRef::Expanded { id } => id,
        };
        Some(id.as_str()).filter(|id| !id.is_empty())
    }

    /// Buyer reference: the client reference wins over `metadata.user_id`.
    pub fn buyer_reference(&self) -> Option<&str> {
        self.client_reference_id
            .as_deref()
            .or_else(|| self.metadata.get("user_id").map(String::as_str))
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Session total converted from the gateway's minor units.
    pub fn amount_major(&self) -> Decimal {
        Decimal::new(self.amount_total.unwrap_or(0), 2)
    }

    /// Snapshot of the customer-supplied address, if one was collected.
    pub fn shipping_address(&self) -> Option<ShippingAddress> {
        let details = self.customer_details.as_ref()?;
        let address = details.address.as_ref()?;
        Some(ShippingAddress {
            name: non_empty(&details.name),
            email: non_empty(&details.email),
            address: PostalAddress {
                city: non_empty(&address.city),
                country: non_empty(&address.country),
                line1: non_empty(&address.line1),
                line2: non_empty(&address.line2),
                postal_code: non_empty(&address.postal_code),
                state: non_empty(&address.state),
            },
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
