//! `web-sys` implementations of the page capabilities.

use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlButtonElement, HtmlElement, HtmlFormElement, HtmlInputElement,
    HtmlSelectElement, HtmlTextAreaElement, Window,
};

use crate::{
    checkout::{CheckoutPage, CheckoutSettings, page::CARD_ERROR_ICON_HTML},
    errors::ClientError,
    size_selector::{ElementLookup, PageElement},
};

impl PageElement for HtmlElement {
    fn set_display(&self, value: &str) {
        if let Err(e) = self.style().set_property("display", value) {
            log::warn!("cant set display on #{}: {e:?}", self.id());
        }
    }

    fn add_classes(&self, classes: &[&str]) {
        let class_list = self.class_list();
        for class in classes {
            if let Err(e) = class_list.add_1(class) {
                log::warn!("cant add class {class}: {e:?}");
            }
        }
    }

    fn parent(&self) -> Option<Self> {
        self.parent_element()
            .and_then(|parent| parent.dyn_into::<HtmlElement>().ok())
    }
}

impl ElementLookup for Document {
    type Element = HtmlElement;

    fn element_by_id(&self, id: &str) -> Option<HtmlElement> {
        self.get_element_by_id(id)
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
    }
}

pub struct BrowserPage {
    window: Window,
    document: Document,
    settings: CheckoutSettings,
}

impl BrowserPage {
    pub fn new(settings: CheckoutSettings) -> Result<Self, ClientError> {
        let window = web_sys::window().ok_or_else(|| ClientError::Dom("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| ClientError::Dom("no document".into()))?;

        Ok(Self {
            window,
            document,
            settings,
        })
    }

    pub fn form(&self) -> Result<HtmlFormElement, ClientError> {
        self.document
            .get_element_by_id(&self.settings.form_id)
            .and_then(|el| el.dyn_into::<HtmlFormElement>().ok())
            .ok_or_else(|| ClientError::MissingConfig(self.settings.form_id.clone()))
    }

    fn element(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn html_element(&self, id: &str) -> Option<HtmlElement> {
        self.element(id).and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }

    fn input_value(&self, selector: &str) -> Option<String> {
        let element = self.document.query_selector(selector).ok().flatten()?;

        let element = match element.dyn_into::<HtmlInputElement>() {
            Ok(input) => return Some(input.value()),
            Err(element) => element,
        };
        let element = match element.dyn_into::<HtmlSelectElement>() {
            Ok(select) => return Some(select.value()),
            Err(element) => element,
        };
        element
            .dyn_into::<HtmlTextAreaElement>()
            .ok()
            .map(|textarea| textarea.value())
    }

    /// Flips `display` between `none` and the stylesheet default.
    fn toggle_display(&self, id: &str) {
        let Some(element) = self.html_element(id) else {
            log::warn!("cant toggle missing element #{id}");
            return;
        };

        let hidden = self
            .window
            .get_computed_style(&element)
            .ok()
            .flatten()
            .and_then(|style| style.get_property_value("display").ok())
            .is_some_and(|display| display == "none");

        let style = element.style();
        let result = if hidden {
            style
                .set_property("display", "block")
                .and_then(|_| style.set_property("opacity", "1"))
        } else {
            style.set_property("display", "none")
        };
        if let Err(e) = result {
            log::warn!("cant toggle #{id}: {e:?}");
        }
    }
}

impl CheckoutPage for BrowserPage {
    fn embedded_text(&self, element_id: &str) -> Option<String> {
        self.element(element_id).and_then(|el| el.text_content())
    }

    fn form_field(&self, name: &str) -> String {
        self.input_value(&format!("#{} [name=\"{name}\"]", self.settings.form_id))
            .unwrap_or_default()
    }

    fn save_info_checked(&self) -> bool {
        self.element(&self.settings.save_info_id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .is_some_and(|input| input.checked())
    }

    fn csrf_token(&self) -> String {
        self.input_value(&format!("input[name=\"{}\"]", self.settings.csrf_field_name))
            .unwrap_or_default()
    }

    fn set_submit_enabled(&self, enabled: bool) {
        if let Some(button) = self
            .element(&self.settings.submit_button_id)
            .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
        {
            button.set_disabled(!enabled);
        }
    }

    fn toggle_loading(&self) {
        self.toggle_display(&self.settings.form_id);
        self.toggle_display(&self.settings.loading_overlay_id);
    }

    fn show_card_error(&self, message: &str) {
        let Some(container) = self.element(&self.settings.card_errors_id) else {
            log::warn!("card error container is missing: {message}");
            return;
        };

        container.set_inner_html(&format!("{CARD_ERROR_ICON_HTML}<span></span>"));
        // the provider message goes in as text, never as markup
        if let Some(span) = container.last_element_child() {
            span.set_text_content(Some(message));
        }
    }

    fn clear_card_error(&self) {
        if let Some(container) = self.element(&self.settings.card_errors_id) {
            container.set_text_content(Some(""));
        }
    }

    fn submit_form(&self) {
        match self.form() {
            Ok(form) => {
                if let Err(e) = form.submit() {
                    log::error!("payment form submission failed: {e:?}");
                }
            }
            Err(e) => log::error!("{e}"),
        }
    }

    fn reload(&self) {
        if let Err(e) = self.window.location().reload() {
            log::error!("page reload failed: {e:?}");
        }
    }
}
