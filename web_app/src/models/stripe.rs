use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Payment intent returned by `POST /v1/payment_intents`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CreatedPaymentIntent {
    pub id: String,
    pub client_secret: String,
}

/// Metadata attached to a payment intent just before card confirmation, so
/// the webhook can rebuild the order if the browser never comes back.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CheckoutMetadata {
    pub bag: String,
    pub save_info: bool,
    pub username: String,
}

impl CheckoutMetadata {
    /// Form fields understood by the Stripe API
    pub fn to_form(&self) -> Vec<(String, String)> {
        vec![
            ("metadata[bag]".into(), self.bag.clone()),
            ("metadata[save_info]".into(), self.save_info.to_string()),
            ("metadata[username]".into(), self.username.clone()),
        ]
    }
}

/// Error envelope of the Stripe REST API
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
}

/// Payment intent id from a client secret (`pi_123_secret_abc` -> `pi_123`).
pub fn payment_intent_id(client_secret: &str) -> Option<&str> {
    client_secret
        .split_once("_secret")
        .map(|(pid, _)| pid)
        .filter(|pid| !pid.is_empty())
}

/// Amount in the smallest currency unit, rounded to the nearest unit.
pub fn to_minor_units(amount: Decimal) -> anyhow::Result<i64> {
    (amount * Decimal::ONE_HUNDRED)
        .round()
        .to_i64()
        .ok_or_else(|| anyhow::anyhow!("amount {amount} out of range"))
}

pub fn from_minor_units(amount: i64) -> Decimal {
    Decimal::new(amount, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payment_intent_id() {
        assert_eq!(payment_intent_id("pi_3Nabc_secret_xyz"), Some("pi_3Nabc"));
        assert_eq!(payment_intent_id("pi_3Nabc"), None);
        assert_eq!(payment_intent_id("_secret_xyz"), None);
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(to_minor_units(dec!(27.48)).unwrap(), 2748);
        assert_eq!(to_minor_units(dec!(10.005)).unwrap(), 1000);
        assert_eq!(to_minor_units(dec!(10.015)).unwrap(), 1002);
        assert_eq!(from_minor_units(2748), dec!(27.48));
    }

    #[test]
    fn test_metadata_form() {
        let metadata = CheckoutMetadata {
            bag: r#"{"1":2}"#.into(),
            save_info: true,
            username: "ada".into(),
        };

        assert_eq!(
            metadata.to_form(),
            vec![
                ("metadata[bag]".to_string(), r#"{"1":2}"#.to_string()),
                ("metadata[save_info]".to_string(), "true".to_string()),
                ("metadata[username]".to_string(), "ada".to_string()),
            ]
        );
    }
}
