use async_trait::async_trait;

use crate::{
    checkout::{CheckoutData, CheckoutDataCache},
    errors::ClientError,
};

/// Posts the checkout context to the storefront with the page's origin.
pub struct ServerCheckoutCache {
    client: reqwest::Client,
    origin: String,
}

impl ServerCheckoutCache {
    pub fn new(origin: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            origin,
        }
    }
}

#[async_trait(?Send)]
impl CheckoutDataCache for ServerCheckoutCache {
    async fn cache_checkout_data(
        &self,
        url: &str,
        data: &CheckoutData,
    ) -> Result<(), ClientError> {
        let response = self
            .client
            .post(format!("{}{url}", self.origin))
            .form(data)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClientError::Transport(format!(
                "{url} answered {}",
                response.status()
            )));
        }

        Ok(())
    }
}
