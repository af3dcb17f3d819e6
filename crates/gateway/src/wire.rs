//! Provider wire shapes.
//!
//! The provider speaks PascalCase JSON with a few inconsistencies this
//! module absorbs: result codes arrive as either numbers or numeric
//! strings, metadata item keys vary between `Value` and `value`, and
//! the status-query endpoint answers with one of three distinct shapes
//! (resolved, not-yet-answered, or something else entirely).

use domain::{Amount, PaymentConfirmation, PhoneNumber};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Error code the status-query endpoint returns while the payer has
/// not yet answered the push prompt.
pub const ERROR_NOT_YET_ANSWERED: &str = "500.001.1001";

/// Response code the provider uses for an accepted push request.
pub const RESPONSE_ACCEPTED: &str = "0";

fn result_code<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    // Tolerates both `"ResultCode": 0` and `"ResultCode": "0"`.
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| serde::de::Error::custom("result code is not an integer")),
        Value::String(s) => s
            .parse()
            .map_err(|_| serde::de::Error::custom("result code string is not numeric")),
        other => Err(serde::de::Error::custom(format!(
            "unexpected result code shape: {other}"
        ))),
    }
}

fn response_code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s),
        other => Err(serde::de::Error::custom(format!(
            "unexpected response code shape: {other}"
        ))),
    }
}

/// The provider's answer to a push (payment initiation) request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushResponse {
    /// `"0"` when the push was accepted for delivery.
    #[serde(rename = "ResponseCode", deserialize_with = "response_code")]
    pub response_code: String,

    /// Human-readable acceptance description.
    #[serde(rename = "ResponseDescription", default)]
    pub response_description: String,

    /// Correlation identifier for the checkout, absent on rejection.
    #[serde(rename = "CheckoutRequestID", default)]
    pub checkout_request_id: Option<String>,

    /// Message suitable for showing to the payer.
    #[serde(rename = "CustomerMessage", default)]
    pub customer_message: Option<String>,
}

impl PushResponse {
    /// Returns true if the provider accepted the push for delivery.
    pub fn is_accepted(&self) -> bool {
        self.response_code == RESPONSE_ACCEPTED
    }
}

/// The webhook payload the provider posts after the payer answers the
/// push prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackEnvelope {
    #[serde(rename = "Body")]
    pub body: CallbackBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackBody {
    #[serde(rename = "stkCallback")]
    pub stk_callback: StkCallback,
}

/// The payment result inside a callback envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct StkCallback {
    #[serde(rename = "MerchantRequestID", default)]
    pub merchant_request_id: Option<String>,

    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,

    #[serde(rename = "ResultCode", deserialize_with = "result_code")]
    pub result_code: i64,

    #[serde(rename = "ResultDesc", default)]
    pub result_desc: String,

    #[serde(rename = "CallbackMetadata", default)]
    pub callback_metadata: Option<CallbackMetadata>,
}

impl StkCallback {
    /// Extracts the confirmation fields from the metadata items.
    ///
    /// Every field is optional: a missing or malformed item is stored
    /// as absent rather than rejecting the callback.
    pub fn confirmation(&self) -> PaymentConfirmation {
        let items = self
            .callback_metadata
            .as_ref()
            .map(|m| m.item.as_slice())
            .unwrap_or_default();

        let value_of = |name: &str| items.iter().find(|i| i.name == name).map(|i| &i.value);

        PaymentConfirmation {
            amount: value_of("Amount").and_then(metadata_amount),
            receipt: value_of("MpesaReceiptNumber").and_then(metadata_string),
            phone: value_of("PhoneNumber")
                .and_then(metadata_string)
                .and_then(|s| PhoneNumber::parse(&s).ok()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackMetadata {
    #[serde(rename = "Item", default)]
    pub item: Vec<MetadataItem>,
}

/// A single `{Name, Value}` metadata pair. The provider is not
/// consistent about the capitalization of `Value`.
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataItem {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Value", alias = "value", default)]
    pub value: Value,
}

fn metadata_amount(value: &Value) -> Option<Amount> {
    match value {
        Value::Number(n) => n.as_f64().map(Amount::from_kes_f64),
        Value::String(s) => s.parse::<f64>().ok().map(Amount::from_kes_f64),
        _ => None,
    }
}

fn metadata_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The three shapes a status query can come back in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StatusResponse {
    /// The payer has answered; the payment has a final result.
    Resolved {
        result_code: i64,
        result_desc: String,
        receipt: Option<String>,
    },

    /// The payer has not interacted with the prompt yet.
    NotYetAnswered,

    /// Anything the other two arms do not recognize, kept raw for
    /// logging.
    Unrecognized(Value),
}

impl StatusResponse {
    /// Classifies a raw status-query body into one of the three shapes.
    pub fn classify(raw: Value) -> Self {
        if raw.get("errorCode").and_then(Value::as_str) == Some(ERROR_NOT_YET_ANSWERED) {
            return StatusResponse::NotYetAnswered;
        }

        let Some(code) = raw.get("ResultCode") else {
            return StatusResponse::Unrecognized(raw);
        };
        let code = match code {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        };
        let Some(result_code) = code else {
            return StatusResponse::Unrecognized(raw);
        };

        StatusResponse::Resolved {
            result_code,
            result_desc: raw
                .get("ResultDesc")
                .and_then(Value::as_str)
                .unwrap_or("Unknown result")
                .to_string(),
            receipt: raw
                .get("MpesaReceiptNumber")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}
