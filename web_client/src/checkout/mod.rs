//! # Checkout controller
//!
//! Owns the card widget of one checkout page and runs a submission:
//! lock the UI, cache the checkout context on the server, confirm the card
//! payment, then hand over to the native form submit.
//!
//! ```text
//! Unmounted --mount--> Idle --submit--> Submitting --declined/unresolved--> Idle
//!                                            |--cache failed--> (page reload)
//!                                            `--succeeded-----> Completed (form submit)
//! ```

pub mod cache;
pub mod page;
pub mod provider;

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

pub use cache::{CheckoutData, CheckoutDataCache};
pub use page::{CheckoutPage, CheckoutSettings, StripeKeys};
pub use provider::{
    Address, BillingDetails, CardPaymentData, CardStyle, CardWidget, ConfirmOutcome,
    PaymentMethodData, PaymentProvider, ShippingDetails,
};

use crate::errors::ClientError;
use page::fields;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unmounted,
    Idle,
    Submitting,
    Completed,
}

/// How a submission ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Another submission was still in flight; nothing was sent.
    AlreadySubmitting,
    /// Caching the checkout data failed and the page was told to reload.
    Reloaded,
    /// The provider rejected the payment; the form is editable again.
    Declined(String),
    /// The payment intent ended in a status other than `succeeded`; the
    /// form is editable again.
    Unresolved(String),
    /// Payment succeeded and the form was submitted to the server.
    Submitted,
}

pub struct CheckoutController<Pg, Pr, C>
where
    Pg: CheckoutPage,
    Pr: PaymentProvider,
    C: CheckoutDataCache,
{
    page: Pg,
    provider: Pr,
    cache: C,
    settings: CheckoutSettings,
    client_secret: String,
    card: RefCell<Option<Rc<Pr::Widget>>>,
    phase: Cell<Phase>,
}

impl<Pg, Pr, C> CheckoutController<Pg, Pr, C>
where
    Pg: CheckoutPage,
    Pr: PaymentProvider,
    C: CheckoutDataCache,
{
    pub fn new(
        page: Pg,
        provider: Pr,
        cache: C,
        settings: CheckoutSettings,
        keys: &StripeKeys,
    ) -> Self {
        Self {
            page,
            provider,
            cache,
            settings,
            client_secret: keys.client_secret.clone(),
            card: RefCell::new(None),
            phase: Cell::new(Phase::Unmounted),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    pub fn page(&self) -> &Pg {
        &self.page
    }

    pub fn settings(&self) -> &CheckoutSettings {
        &self.settings
    }

    /// Creates the card widget and mounts it into the card container.
    pub fn mount(&self) -> Result<Rc<Pr::Widget>, ClientError> {
        if self.card.borrow().is_some() {
            return Err(ClientError::AlreadyMounted);
        }

        let card = Rc::new(self.provider.create_card(&CardStyle::default())?);
        card.mount(&self.settings.card_selector())?;

        *self.card.borrow_mut() = Some(card.clone());
        self.phase.set(Phase::Idle);
        log::debug!("card widget mounted on {}", self.settings.card_selector());

        Ok(card)
    }

    pub fn destroy(&self) {
        if let Some(card) = self.card.borrow_mut().take() {
            card.unmount();
        }
        self.phase.set(Phase::Unmounted);
    }

    /// Mirrors the widget's validation state into the error container.
    pub fn on_card_change(&self, error: Option<&str>) {
        match error {
            Some(message) => self.page.show_card_error(message),
            None => self.page.clear_card_error(),
        }
    }

    pub async fn submit(&self) -> Result<SubmitOutcome, ClientError> {
        if matches!(self.phase.get(), Phase::Submitting | Phase::Completed) {
            log::warn!("checkout submit ignored: the form was already submitted");
            return Ok(SubmitOutcome::AlreadySubmitting);
        }
        let card = self.card.borrow().clone().ok_or(ClientError::NotMounted)?;

        self.lock(&card);

        let data = CheckoutData {
            csrfmiddlewaretoken: self.page.csrf_token(),
            client_secret: self.client_secret.clone(),
            save_info: self.page.save_info_checked(),
        };

        if let Err(e) = self
            .cache
            .cache_checkout_data(&self.settings.cache_url, &data)
            .await
        {
            log::error!("caching checkout data failed, reloading: {e}");
            self.phase.set(Phase::Completed);
            self.page.reload();
            return Ok(SubmitOutcome::Reloaded);
        }

        let payment = self.card_payment_data();
        let outcome = self
            .provider
            .confirm_card_payment(&self.client_secret, &card, &payment)
            .await
            .unwrap_or_else(|e| ConfirmOutcome::Declined(e.to_string()));

        match outcome {
            ConfirmOutcome::Declined(message) => {
                self.unlock(&card);
                self.page.show_card_error(&message);
                Ok(SubmitOutcome::Declined(message))
            }
            ConfirmOutcome::Intent { status } if status == provider::STATUS_SUCCEEDED => {
                self.phase.set(Phase::Completed);
                self.page.submit_form();
                Ok(SubmitOutcome::Submitted)
            }
            ConfirmOutcome::Intent { status } => {
                log::warn!("payment intent ended with status {status}");
                self.unlock(&card);
                self.page.show_card_error(&format!(
                    "Your payment was not completed (status: {status}). Please try again."
                ));
                Ok(SubmitOutcome::Unresolved(status))
            }
        }
    }

    /// Billing and shipping details from the order form, every value trimmed.
    pub fn card_payment_data(&self) -> CardPaymentData {
        let field = |name: &str| self.page.form_field(name).trim().to_string();

        let name = field(fields::FULL_NAME);
        let phone = field(fields::PHONE_NUMBER);
        let address = Address {
            line1: field(fields::STREET_ADDRESS1),
            line2: field(fields::STREET_ADDRESS2),
            city: field(fields::TOWN_OR_CITY),
            country: field(fields::COUNTRY),
            postal_code: None,
            state: field(fields::COUNTY),
        };

        CardPaymentData {
            payment_method: PaymentMethodData {
                billing_details: BillingDetails {
                    name: name.clone(),
                    phone: phone.clone(),
                    email: field(fields::EMAIL),
                    address: address.clone(),
                },
            },
            shipping: ShippingDetails {
                name,
                phone,
                address: Address {
                    postal_code: Some(field(fields::POSTCODE)),
                    ..address
                },
            },
        }
    }

    fn lock(&self, card: &Pr::Widget) {
        self.phase.set(Phase::Submitting);
        card.set_disabled(true);
        self.page.set_submit_enabled(false);
        self.page.toggle_loading();
    }

    fn unlock(&self, card: &Pr::Widget) {
        self.page.toggle_loading();
        card.set_disabled(false);
        self.page.set_submit_enabled(true);
        self.phase.set(Phase::Idle);
    }
}
