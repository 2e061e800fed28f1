//! WASM entry points and the browser implementations of the capability
//! traits.
//!
//! Pages load the generated `storefront_client.js` module. Initialization
//! reveals the size selector on product pages; the checkout page calls
//! [`mount_checkout`] to wire the card widget into the payment form.

pub mod dom;
pub mod http;
pub mod stripe;

use std::rc::Rc;

use wasm_bindgen::{JsCast, prelude::*};
use web_sys::Event;

use crate::{
    checkout::{CheckoutController, CheckoutSettings, StripeKeys, SubmitOutcome},
    errors::ClientError,
    size_selector,
};

type BrowserCheckout =
    CheckoutController<dom::BrowserPage, stripe::StripeJs, http::ServerCheckoutCache>;

impl From<ClientError> for JsValue {
    fn from(err: ClientError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&JsValue::from_str(&e.to_string()));
    }

    if let Err(e) = on_dom_ready(|document| {
        size_selector::reveal_size_selector(document);
    }) {
        log::error!("cant register page load handler: {e}");
    }
}

fn on_dom_ready(run: impl Fn(&web_sys::Document) + 'static) -> Result<(), ClientError> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| ClientError::Dom("no document".into()))?;

    if document.ready_state() != "loading" {
        run(&document);
        return Ok(());
    }

    let target = document.clone();
    let callback = Closure::<dyn Fn()>::new(move || run(&target));
    document
        .add_event_listener_with_callback("DOMContentLoaded", callback.as_ref().unchecked_ref())
        .map_err(|e| ClientError::Dom(format!("{e:?}")))?;
    callback.forget();

    Ok(())
}

/// Handle returned to the checkout page script.
#[wasm_bindgen]
pub struct CheckoutHandle {
    controller: Rc<BrowserCheckout>,
}

#[wasm_bindgen]
impl CheckoutHandle {
    /// Unmounts the card widget.
    pub fn destroy(&self) {
        self.controller.destroy();
    }
}

/// Mounts the card widget on the checkout page and binds its `change`
/// and the payment form's `submit` events.
#[wasm_bindgen]
pub fn mount_checkout() -> Result<CheckoutHandle, JsValue> {
    let settings = CheckoutSettings::default();
    let page = dom::BrowserPage::new(settings.clone())?;
    let keys = StripeKeys::from_page(&page, &settings)?;
    let form = page.form()?;

    let origin = web_sys::window()
        .ok_or_else(|| ClientError::Dom("no window".into()))?
        .location()
        .origin()
        .map_err(|e| ClientError::Dom(format!("{e:?}")))?;

    let controller = Rc::new(CheckoutController::new(
        page,
        stripe::StripeJs::new(&keys.public_key)?,
        http::ServerCheckoutCache::new(origin),
        settings,
        &keys,
    ));

    let card = controller.mount()?;
    {
        let controller = controller.clone();
        card.on_change(move |error| controller.on_card_change(error.as_deref()));
    }

    let on_submit = {
        let controller = controller.clone();
        Closure::<dyn Fn(Event)>::new(move |event: Event| {
            event.prevent_default();
            let controller = controller.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match controller.submit().await {
                    Ok(SubmitOutcome::Submitted) => {
                        log::info!("payment confirmed, submitting order")
                    }
                    Ok(outcome) => log::info!("checkout attempt ended: {outcome:?}"),
                    Err(e) => log::error!("checkout submit failed: {e}"),
                }
            });
        })
    };
    form.add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())?;
    on_submit.forget();

    Ok(CheckoutHandle { controller })
}
