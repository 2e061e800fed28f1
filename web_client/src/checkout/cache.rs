//! First network step of a submission: store the checkout context on the
//! server before the payment is confirmed.

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::ClientError;

/// Form body posted to the cache endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutData {
    pub csrfmiddlewaretoken: String,
    pub client_secret: String,
    pub save_info: bool,
}

#[async_trait(?Send)]
pub trait CheckoutDataCache {
    /// Any 2xx is `Ok`; transport errors and other statuses are
    /// [`ClientError::Transport`].
    async fn cache_checkout_data(&self, url: &str, data: &CheckoutData)
    -> Result<(), ClientError>;
}
