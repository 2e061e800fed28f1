//! Product detail page: make the size selector visible when the product
//! has sizes.

pub const SIZE_SELECTOR_ID: &str = "id_product_size";
pub const SIZE_SELECTOR_CLASSES: [&str; 2] = ["border", "border-dark"];

pub trait PageElement: Sized {
    fn set_display(&self, value: &str);

    fn add_classes(&self, classes: &[&str]);

    fn parent(&self) -> Option<Self>;
}

pub trait ElementLookup {
    type Element: PageElement;

    fn element_by_id(&self, id: &str) -> Option<Self::Element>;
}

/// Shows `#id_product_size` and its container. Returns whether the
/// selector was found; a page without it is left untouched.
pub fn reveal_size_selector<D: ElementLookup>(document: &D) -> bool {
    let Some(selector) = document.element_by_id(SIZE_SELECTOR_ID) else {
        log::debug!("no size selector on this page");
        return false;
    };

    log::debug!("size selector found, making it visible");
    selector.set_display("block");
    if let Some(container) = selector.parent() {
        container.set_display("block");
    }
    selector.add_classes(&SIZE_SELECTOR_CLASSES);

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, collections::HashMap, rc::Rc};

    #[derive(Default, Debug)]
    struct NodeState {
        display: Option<String>,
        classes: Vec<String>,
    }

    #[derive(Clone)]
    struct FakeElement {
        id: &'static str,
        parent: Option<&'static str>,
        nodes: Rc<RefCell<HashMap<&'static str, NodeState>>>,
    }

    impl PageElement for FakeElement {
        fn set_display(&self, value: &str) {
            self.nodes.borrow_mut().entry(self.id).or_default().display = Some(value.into());
        }

        fn add_classes(&self, classes: &[&str]) {
            let mut nodes = self.nodes.borrow_mut();
            let node = nodes.entry(self.id).or_default();
            node.classes.extend(classes.iter().map(|c| c.to_string()));
        }

        fn parent(&self) -> Option<Self> {
            self.parent.map(|id| FakeElement {
                id,
                parent: None,
                nodes: self.nodes.clone(),
            })
        }
    }

    #[derive(Default)]
    struct FakeDocument {
        has_selector: bool,
        nodes: Rc<RefCell<HashMap<&'static str, NodeState>>>,
    }

    impl ElementLookup for FakeDocument {
        type Element = FakeElement;

        fn element_by_id(&self, id: &str) -> Option<FakeElement> {
            (self.has_selector && id == SIZE_SELECTOR_ID).then(|| FakeElement {
                id: SIZE_SELECTOR_ID,
                parent: Some("size-container"),
                nodes: self.nodes.clone(),
            })
        }
    }

    #[test]
    fn test_reveal_size_selector_shows_element_and_parent() {
        let document = FakeDocument {
            has_selector: true,
            ..Default::default()
        };

        assert!(reveal_size_selector(&document));

        let nodes = document.nodes.borrow();
        assert_eq!(nodes[SIZE_SELECTOR_ID].display.as_deref(), Some("block"));
        assert_eq!(nodes["size-container"].display.as_deref(), Some("block"));
        assert_eq!(nodes[SIZE_SELECTOR_ID].classes, vec!["border", "border-dark"]);
        assert!(nodes["size-container"].classes.is_empty());
    }

    #[test]
    fn test_reveal_size_selector_without_element_is_noop() {
        let document = FakeDocument::default();

        assert!(!reveal_size_selector(&document));
        assert!(document.nodes.borrow().is_empty());
    }
}
