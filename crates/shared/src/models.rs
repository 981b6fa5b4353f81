use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment data embedded in an advertisement and queued for chain submission.
///
/// Serialized as camelCase JSON so the receiving device can parse it without
/// schema negotiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    /// Sender wallet address
    pub sender_address: String,
    /// When the payment intent was created
    pub timestamp: DateTime<Utc>,
    pub amount: Decimal,
    pub token: String,
    pub recipient: String,
    /// Optional caller-supplied reference (invoice id, memo, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl PaymentPayload {
    pub fn new(
        sender_address: impl Into<String>,
        amount: Decimal,
        token: impl Into<String>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            sender_address: sender_address.into(),
            timestamp: Utc::now(),
            amount,
            token: token.into(),
            recipient: recipient.into(),
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}
