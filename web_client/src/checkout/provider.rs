//! Payment provider capability: the card widget and the payment
//! confirmation call, plus the payloads exchanged with them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ClientError;

pub const STATUS_SUCCEEDED: &str = "succeeded";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardStyle {
    pub base: BaseStyle,
    pub invalid: InvalidStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseStyle {
    pub color: String,
    pub font_family: String,
    pub font_smoothing: String,
    pub font_size: String,
    #[serde(rename = "::placeholder")]
    pub placeholder: PlaceholderStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceholderStyle {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidStyle {
    pub color: String,
    pub icon_color: String,
}

impl Default for CardStyle {
    fn default() -> Self {
        Self {
            base: BaseStyle {
                color: "#000".into(),
                font_family: r#""Helvetica Neue", Helvetica, sans-serif"#.into(),
                font_smoothing: "antialiased".into(),
                font_size: "16px".into(),
                placeholder: PlaceholderStyle {
                    color: "#aab7c4".into(),
                },
            },
            invalid: InvalidStyle {
                color: "#dc3545".into(),
                icon_color: "#dc3545".into(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Address {
    pub line1: String,
    pub line2: String,
    pub city: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    pub state: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BillingDetails {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: Address,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShippingDetails {
    pub name: String,
    pub phone: String,
    pub address: Address,
}

/// `payment_method` minus the card itself, which the provider binds from
/// the mounted widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaymentMethodData {
    pub billing_details: BillingDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CardPaymentData {
    pub payment_method: PaymentMethodData,
    pub shipping: ShippingDetails,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderError {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentIntent {
    pub status: String,
}

/// Raw confirmation result as Stripe.js resolves it: either `error` or
/// `paymentIntent` is set.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResult {
    pub error: Option<ProviderError>,
    pub payment_intent: Option<PaymentIntent>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Declined(String),
    Intent { status: String },
}

impl TryFrom<ConfirmResult> for ConfirmOutcome {
    type Error = ClientError;

    fn try_from(result: ConfirmResult) -> Result<Self, ClientError> {
        match (result.error, result.payment_intent) {
            (Some(err), _) => Ok(ConfirmOutcome::Declined(err.message)),
            (None, Some(intent)) => Ok(ConfirmOutcome::Intent {
                status: intent.status,
            }),
            (None, None) => Err(ClientError::Provider(
                "confirmation returned neither an error nor a payment intent".into(),
            )),
        }
    }
}

pub trait CardWidget {
    fn mount(&self, selector: &str) -> Result<(), ClientError>;

    fn unmount(&self);

    fn set_disabled(&self, disabled: bool);
}

#[async_trait(?Send)]
pub trait PaymentProvider {
    type Widget: CardWidget;

    fn create_card(&self, style: &CardStyle) -> Result<Self::Widget, ClientError>;

    async fn confirm_card_payment(
        &self,
        client_secret: &str,
        card: &Self::Widget,
        data: &CardPaymentData,
    ) -> Result<ConfirmOutcome, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_card_style_serializes_to_stripe_shape() {
        let value = serde_json::to_value(CardStyle::default()).unwrap();

        assert_eq!(
            value,
            json!({
                "base": {
                    "color": "#000",
                    "fontFamily": "\"Helvetica Neue\", Helvetica, sans-serif",
                    "fontSmoothing": "antialiased",
                    "fontSize": "16px",
                    "::placeholder": {"color": "#aab7c4"}
                },
                "invalid": {"color": "#dc3545", "iconColor": "#dc3545"}
            })
        );
    }

    #[test]
    fn test_billing_address_omits_postal_code() {
        let value = serde_json::to_value(Address::default()).unwrap();
        assert!(value.get("postal_code").is_none());

        let value = serde_json::to_value(Address {
            postal_code: Some("SW1A 1AA".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(value["postal_code"], "SW1A 1AA");
    }

    #[test]
    fn test_confirm_result_into_outcome() {
        let declined: ConfirmResult = serde_json::from_value(json!({
            "error": {"message": "Your card was declined.", "code": "card_declined"}
        }))
        .unwrap();
        assert_eq!(
            ConfirmOutcome::try_from(declined),
            Ok(ConfirmOutcome::Declined("Your card was declined.".into()))
        );

        let paid: ConfirmResult = serde_json::from_value(json!({
            "paymentIntent": {"id": "pi_1", "status": "succeeded"}
        }))
        .unwrap();
        assert_eq!(
            ConfirmOutcome::try_from(paid),
            Ok(ConfirmOutcome::Intent {
                status: "succeeded".into()
            })
        );

        let empty: ConfirmResult = serde_json::from_value(json!({})).unwrap();
        assert!(ConfirmOutcome::try_from(empty).is_err());
    }
}
