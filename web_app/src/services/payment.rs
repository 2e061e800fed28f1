use anyhow::Context;
use async_trait::async_trait;

use crate::{consts, models};

/// Stripe REST client authenticated with the account secret key
#[derive(Clone)]
pub struct StripeGateway {
    pub client: reqwest::Client,
    pub secret_key: String,
}

impl StripeGateway {
    pub fn new(secret_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: secret_key.to_string(),
        }
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> anyhow::Result<T> {
        let response = self
            .client
            .post(format!("{}{}", consts::STRIPE_API_URL, path))
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await
            .context("Failed to send request to Stripe API")?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<models::stripe::ApiErrorResponse>()
                .await
                .map(|body| body.error.message)
                .unwrap_or_else(|_| "Unable to read response body".to_string());

            anyhow::bail!("Stripe API returned error status {}: {}", status, message);
        }

        response
            .json::<T>()
            .await
            .context("Failed to parse Stripe API response")
    }
}

#[async_trait]
impl crate::services::PaymentGateway for StripeGateway {
    async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
    ) -> anyhow::Result<models::stripe::CreatedPaymentIntent> {
        self.post_form(
            "/payment_intents",
            &[
                ("amount".to_string(), amount.to_string()),
                ("currency".to_string(), currency.to_string()),
            ],
        )
        .await
    }

    async fn modify_payment_intent_metadata(
        &self,
        payment_intent_id: &str,
        metadata: &models::stripe::CheckoutMetadata,
    ) -> anyhow::Result<()> {
        self.post_form::<serde_json::Value>(
            &format!("/payment_intents/{payment_intent_id}"),
            &metadata.to_form(),
        )
        .await
        .map(|_| ())
    }
}
