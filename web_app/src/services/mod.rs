pub mod mail;
pub mod payment;

use crate::models;
use async_trait::async_trait;

/// Card payment provider used by the checkout
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway {
    /// Creates a payment intent for `amount` in the smallest currency unit.
    async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
    ) -> anyhow::Result<models::stripe::CreatedPaymentIntent>;

    async fn modify_payment_intent_metadata(
        &self,
        payment_intent_id: &str,
        metadata: &models::stripe::CheckoutMetadata,
    ) -> anyhow::Result<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailService {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

pub type ImplPaymentGateway = Box<dyn PaymentGateway>;
pub type ImplMailService = Box<dyn MailService>;
