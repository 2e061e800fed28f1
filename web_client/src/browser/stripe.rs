//! wasm-bindgen bindings to the Stripe.js v3 card element and the
//! [`PaymentProvider`] built on them.

use async_trait::async_trait;
use js_sys::{Function, Object, Promise, Reflect};
use wasm_bindgen::{JsCast, prelude::*};
use wasm_bindgen_futures::JsFuture;

use crate::{
    checkout::{
        CardPaymentData, CardStyle, CardWidget, ConfirmOutcome, PaymentProvider,
        provider::ConfirmResult,
    },
    errors::ClientError,
};

#[wasm_bindgen]
extern "C" {
    /// `Stripe(publishableKey)` instance.
    #[derive(Debug, Clone)]
    pub type JsStripe;

    #[derive(Debug, Clone)]
    pub type JsElements;

    #[derive(Debug, Clone)]
    pub type JsCardElement;

    #[wasm_bindgen(catch, js_name = Stripe, js_namespace = window)]
    fn new_stripe(publishable_key: &str) -> Result<JsStripe, JsValue>;

    #[wasm_bindgen(method, catch, js_name = elements)]
    fn elements(this: &JsStripe) -> Result<JsElements, JsValue>;

    #[wasm_bindgen(method, catch, js_name = confirmCardPayment)]
    fn confirm_card_payment(
        this: &JsStripe,
        client_secret: &str,
        data: &JsValue,
    ) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch, js_name = create)]
    fn create(this: &JsElements, element_type: &str, options: &JsValue)
    -> Result<JsCardElement, JsValue>;

    #[wasm_bindgen(method, catch, js_name = mount)]
    fn mount(this: &JsCardElement, selector: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = unmount)]
    fn unmount(this: &JsCardElement);

    #[wasm_bindgen(method, js_name = update)]
    fn update(this: &JsCardElement, options: &JsValue);

    #[wasm_bindgen(method, js_name = on)]
    fn on(this: &JsCardElement, event: &str, handler: &Function);
}

fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            Reflect::get(value, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

fn provider_err(value: JsValue) -> ClientError {
    ClientError::Provider(js_message(&value))
}

/// Serializes through JSON so serde field names reach JS unchanged.
fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, ClientError> {
    let json = serde_json::to_string(value).map_err(|e| ClientError::Provider(e.to_string()))?;
    js_sys::JSON::parse(&json).map_err(provider_err)
}

fn from_js<T: serde::de::DeserializeOwned>(value: &JsValue) -> Result<T, ClientError> {
    let json = js_sys::JSON::stringify(value)
        .map_err(provider_err)?
        .as_string()
        .unwrap_or_default();
    serde_json::from_str(&json).map_err(|e| ClientError::Provider(e.to_string()))
}

pub struct StripeCard {
    element: JsCardElement,
}

impl StripeCard {
    /// Registers `handler` for the element's `change` event; it receives
    /// the provider's error message, or `None` once the input is valid.
    pub fn on_change(&self, handler: impl FnMut(Option<String>) + 'static) {
        let mut handler = handler;
        let callback = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
            let message = Reflect::get(&event, &JsValue::from_str("error"))
                .ok()
                .filter(|err| !err.is_undefined() && !err.is_null())
                .map(|err| js_message(&err));
            handler(message);
        });
        self.element.on("change", callback.as_ref().unchecked_ref());
        // the element lives as long as the page
        callback.forget();
    }
}

impl CardWidget for StripeCard {
    fn mount(&self, selector: &str) -> Result<(), ClientError> {
        self.element.mount(selector).map_err(provider_err)
    }

    fn unmount(&self) {
        self.element.unmount();
    }

    fn set_disabled(&self, disabled: bool) {
        let options = Object::new();
        if Reflect::set(&options, &"disabled".into(), &JsValue::from_bool(disabled)).is_ok() {
            self.element.update(&options);
        }
    }
}

pub struct StripeJs {
    stripe: JsStripe,
    elements: JsElements,
}

impl StripeJs {
    pub fn new(publishable_key: &str) -> Result<Self, ClientError> {
        let stripe = new_stripe(publishable_key).map_err(provider_err)?;
        let elements = stripe.elements().map_err(provider_err)?;

        Ok(Self { stripe, elements })
    }
}

#[async_trait(?Send)]
impl PaymentProvider for StripeJs {
    type Widget = StripeCard;

    fn create_card(&self, style: &CardStyle) -> Result<StripeCard, ClientError> {
        let options = Object::new();
        Reflect::set(&options, &"style".into(), &to_js(style)?).map_err(provider_err)?;

        let element = self
            .elements
            .create("card", &options)
            .map_err(provider_err)?;

        Ok(StripeCard { element })
    }

    async fn confirm_card_payment(
        &self,
        client_secret: &str,
        card: &StripeCard,
        data: &CardPaymentData,
    ) -> Result<ConfirmOutcome, ClientError> {
        let payload = to_js(data)?;
        let payment_method = Reflect::get(&payload, &"payment_method".into()).map_err(provider_err)?;
        Reflect::set(&payment_method, &"card".into(), &card.element).map_err(provider_err)?;

        let promise = self
            .stripe
            .confirm_card_payment(client_secret, &payload)
            .map_err(provider_err)?;
        let result = JsFuture::from(promise).await.map_err(provider_err)?;

        ConfirmOutcome::try_from(from_js::<ConfirmResult>(&result)?)
    }
}
