//! What the checkout controller needs from the page it runs on.

use crate::errors::ClientError;

/// Markup placed before the provider message in the card error container.
pub const CARD_ERROR_ICON_HTML: &str =
    r#"<span class="icon" role="alert"><i class="fas fa-times"></i></span>"#;

/// Names of the order form inputs read at submit time.
pub mod fields {
    pub const FULL_NAME: &str = "full_name";
    pub const PHONE_NUMBER: &str = "phone_number";
    pub const EMAIL: &str = "email";
    pub const STREET_ADDRESS1: &str = "street_address1";
    pub const STREET_ADDRESS2: &str = "street_address2";
    pub const TOWN_OR_CITY: &str = "town_or_city";
    pub const COUNTY: &str = "county";
    pub const COUNTRY: &str = "country";
    pub const POSTCODE: &str = "postcode";
}

/// Element ids and endpoint of a checkout page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSettings {
    pub public_key_id: String,
    pub client_secret_id: String,
    pub form_id: String,
    pub card_container_id: String,
    pub card_errors_id: String,
    pub submit_button_id: String,
    pub save_info_id: String,
    pub loading_overlay_id: String,
    pub csrf_field_name: String,
    pub cache_url: String,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            public_key_id: "id_stripe_public_key".into(),
            client_secret_id: "id_client_secret".into(),
            form_id: "payment-form".into(),
            card_container_id: "card-element".into(),
            card_errors_id: "card-errors".into(),
            submit_button_id: "submit-button".into(),
            save_info_id: "id-save-info".into(),
            loading_overlay_id: "loading-overlay".into(),
            csrf_field_name: "csrfmiddlewaretoken".into(),
            cache_url: "/checkout/cache_checkout_data/".into(),
        }
    }
}

impl CheckoutSettings {
    pub fn card_selector(&self) -> String {
        format!("#{}", self.card_container_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripeKeys {
    pub public_key: String,
    pub client_secret: String,
}

impl StripeKeys {
    /// Reads both keys from the JSON text the server embeds in the page.
    pub fn from_page<P: CheckoutPage + ?Sized>(
        page: &P,
        settings: &CheckoutSettings,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            public_key: read_embedded_string(page, &settings.public_key_id)?,
            client_secret: read_embedded_string(page, &settings.client_secret_id)?,
        })
    }
}

fn read_embedded_string<P: CheckoutPage + ?Sized>(
    page: &P,
    element_id: &str,
) -> Result<String, ClientError> {
    let text = page
        .embedded_text(element_id)
        .ok_or_else(|| ClientError::MissingConfig(element_id.into()))?;

    let value = serde_json::from_str::<String>(text.trim()).map_err(|e| {
        ClientError::InvalidConfig {
            element_id: element_id.into(),
            reason: e.to_string(),
        }
    })?;

    if value.trim().is_empty() {
        return Err(ClientError::InvalidConfig {
            element_id: element_id.into(),
            reason: "empty value".into(),
        });
    }

    Ok(value)
}

pub trait CheckoutPage {
    /// Text content of the element with `element_id`, `None` if absent.
    fn embedded_text(&self, element_id: &str) -> Option<String>;

    /// Current value of the order form input called `name`.
    fn form_field(&self, name: &str) -> String;

    fn save_info_checked(&self) -> bool;

    fn csrf_token(&self) -> String;

    fn set_submit_enabled(&self, enabled: bool);

    /// Swaps the visibility of the payment form and the loading overlay.
    fn toggle_loading(&self);

    /// Replaces the card error container with the alert icon and `message`.
    fn show_card_error(&self, message: &str);

    fn clear_card_error(&self);

    /// Native submission of the payment form.
    fn submit_form(&self);

    fn reload(&self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct EmbeddedOnly(HashMap<&'static str, &'static str>);

    impl CheckoutPage for EmbeddedOnly {
        fn embedded_text(&self, element_id: &str) -> Option<String> {
            self.0.get(element_id).map(|v| v.to_string())
        }
        fn form_field(&self, _: &str) -> String {
            String::new()
        }
        fn save_info_checked(&self) -> bool {
            false
        }
        fn csrf_token(&self) -> String {
            String::new()
        }
        fn set_submit_enabled(&self, _: bool) {}
        fn toggle_loading(&self) {}
        fn show_card_error(&self, _: &str) {}
        fn clear_card_error(&self) {}
        fn submit_form(&self) {}
        fn reload(&self) {}
    }

    #[test]
    fn test_stripe_keys_from_page() {
        let page = EmbeddedOnly(HashMap::from([
            ("id_stripe_public_key", "\n\"pk_test_123\"\n"),
            ("id_client_secret", "\"pi_1_secret_abc\""),
        ]));

        let keys = StripeKeys::from_page(&page, &CheckoutSettings::default()).unwrap();

        assert_eq!(keys.public_key, "pk_test_123");
        assert_eq!(keys.client_secret, "pi_1_secret_abc");
    }

    #[test]
    fn test_stripe_keys_missing_element() {
        let page = EmbeddedOnly(HashMap::from([("id_stripe_public_key", "\"pk_test_123\"")]));

        assert_eq!(
            StripeKeys::from_page(&page, &CheckoutSettings::default()),
            Err(ClientError::MissingConfig("id_client_secret".into()))
        );
    }

    #[test]
    fn test_stripe_keys_malformed_or_empty() {
        let settings = CheckoutSettings::default();

        let page = EmbeddedOnly(HashMap::from([
            ("id_stripe_public_key", "pk_test_123"),
            ("id_client_secret", "\"pi_1_secret_abc\""),
        ]));
        assert!(matches!(
            StripeKeys::from_page(&page, &settings),
            Err(ClientError::InvalidConfig { element_id, .. }) if element_id == "id_stripe_public_key"
        ));

        let page = EmbeddedOnly(HashMap::from([
            ("id_stripe_public_key", "\"pk_test_123\""),
            ("id_client_secret", "\"\""),
        ]));
        assert!(matches!(
            StripeKeys::from_page(&page, &settings),
            Err(ClientError::InvalidConfig { element_id, .. }) if element_id == "id_client_secret"
        ));
    }
}
