//! Browser binding.
//!
//! [`DomHost`] implements [`PageHost`] over the live DOM and [`attach`]
//! wires a [`NavSync`] to a native `IntersectionObserver`, the window scroll
//! event and the two click targets. Compiled only for `wasm32` with the
//! `web` feature.

// wasm-bindgen glue expands to unsafe FFI shims.
#![allow(unsafe_code)]

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition,
    ScrollToOptions, Window,
};

use crate::config::{ConfigLoader, NavConfig};
use crate::host::PageHost;
use crate::nav::{IntersectionEntry, NavSync, NavigationEntry, PageEvent, SectionNode};

const HEADING_SELECTOR: &str = "h1, h2, h3, h4, h5, h6";
const SCROLL_TARGET_ATTR: &str = "data-scroll-target";

// ============================================================================
// DOM host
// ============================================================================

struct NavLink {
    anchor: Element,
    label: String,
}

/// [`PageHost`] backed by the browser document.
pub struct DomHost {
    window: Window,
    document: Document,
    container: Option<Element>,
    button: Option<HtmlElement>,
    active_class: String,
    links: Vec<Option<NavLink>>,
}

impl DomHost {
    /// Binds to the container and button named in `config`.
    ///
    /// Missing elements are tolerated; the matching operations do nothing.
    #[must_use]
    pub fn new(window: Window, document: Document, config: &NavConfig) -> Self {
        let container = document.get_element_by_id(&config.selectors.nav_container);
        let button = document
            .get_element_by_id(&config.selectors.back_to_top)
            .and_then(|e| e.dyn_into::<HtmlElement>().ok());
        Self {
            window,
            document,
            container,
            button,
            active_class: config.highlight.active_class.clone(),
            links: Vec::new(),
        }
    }

    fn marked_elements(&self, marker_class: &str) -> Vec<Element> {
        let Ok(nodes) = self.document.query_selector_all(&format!(".{marker_class}")) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|n| n.dyn_into::<Element>().ok())
            .collect()
    }

    fn create_link(&self, entry: &NavigationEntry) -> Result<(Element, Element), JsValue> {
        let item = self.document.create_element("li")?;
        item.set_class_name("nav-item");
        let anchor = self.document.create_element("a")?;
        anchor.set_class_name("nav-link");
        anchor.set_text_content(Some(entry.label()));
        anchor.set_attribute("href", "javascript:void(0)")?;
        anchor.set_attribute(SCROLL_TARGET_ATTR, entry.scroll_target_id())?;
        item.append_child(&anchor)?;
        Ok((item, anchor))
    }
}

impl PageHost for DomHost {
    fn anchor_sections(&self, marker_class: &str) -> Vec<SectionNode> {
        self.marked_elements(marker_class)
            .into_iter()
            .map(|element| {
                let id = element.id();
                SectionNode {
                    id: (!id.is_empty()).then_some(id),
                    first_heading: element
                        .query_selector(HEADING_SELECTOR)
                        .ok()
                        .flatten()
                        .map(|h| h.text_content().unwrap_or_default()),
                }
            })
            .collect()
    }

    fn section_exists(&self, id: &str) -> bool {
        self.document.get_element_by_id(id).is_some()
    }

    fn clear_nav(&mut self) {
        if let Some(container) = &self.container {
            container.set_inner_html("");
        }
        self.links.clear();
    }

    fn append_nav_item(&mut self, entry: &NavigationEntry) {
        // One slot per entry, rendered or not, so indices stay aligned.
        let link = self.container.as_ref().and_then(|container| {
            let (item, anchor) = self.create_link(entry).ok()?;
            container.append_child(&item).ok()?;
            Some(NavLink {
                anchor,
                label: entry.label().to_string(),
            })
        });
        self.links.push(link);
    }

    fn set_nav_item_state(&mut self, index: usize, active: bool, decoration: Option<&str>) {
        let Some(Some(link)) = self.links.get(index) else {
            return;
        };
        let _ = link.anchor.class_list().toggle_with_force(&self.active_class, active);
        let text = format!("{}{}", decoration.unwrap_or_default(), link.label);
        link.anchor.set_text_content(Some(&text));
    }

    fn scroll_into_view(&mut self, id: &str) {
        if let Some(target) = self.document.get_element_by_id(id) {
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            options.set_block(ScrollLogicalPosition::Start);
            target.scroll_into_view_with_scroll_into_view_options(&options);
        }
    }

    fn scroll_to_top(&mut self) {
        let options = ScrollToOptions::new();
        options.set_top(0.0);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn set_back_to_top_visible(&mut self, visible: bool) {
        if let Some(button) = &self.button {
            let display = if visible { "block" } else { "none" };
            let _ = button.style().set_property("display", display);
        }
    }
}

// ============================================================================
// Binding
// ============================================================================

struct Binding {
    host: DomHost,
    sync: NavSync,
}

type Shared = Rc<RefCell<Binding>>;

/// Navigation attached to the current document.
///
/// Listeners stay registered for as long as this value lives.
#[wasm_bindgen]
pub struct AnchorNav {
    binding: Shared,
    observer: IntersectionObserver,
    _on_intersect: Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>,
    _on_scroll: Closure<dyn FnMut()>,
    _on_nav_click: Closure<dyn FnMut(web_sys::Event)>,
    _on_top_click: Closure<dyn FnMut()>,
}

#[wasm_bindgen]
impl AnchorNav {
    /// Rebuilds the list after the document was re-rendered.
    pub fn rebuild(&self) {
        let mut binding = self.binding.borrow_mut();
        let Binding { host, sync } = &mut *binding;
        sync.handle(host, PageEvent::Rebuild);
        self.observer.disconnect();
        observe_sections(&self.observer, host, sync.config());
    }

    /// Target id of the active entry, if any.
    #[wasm_bindgen(getter, js_name = activeTarget)]
    #[must_use]
    pub fn active_target(&self) -> Option<String> {
        self.binding
            .borrow()
            .sync
            .list()
            .active()
            .map(|e| e.scroll_target_id().to_string())
    }
}

fn observe_sections(observer: &IntersectionObserver, host: &DomHost, config: &NavConfig) {
    for element in host.marked_elements(&config.selectors.marker_class) {
        if !element.id().is_empty() {
            observer.observe(&element);
        }
    }
}

fn to_entry(value: &JsValue) -> Option<IntersectionEntry> {
    let entry = value.dyn_ref::<IntersectionObserverEntry>()?;
    Some(IntersectionEntry {
        target_id: entry.target().id(),
        ratio: entry.intersection_ratio(),
        is_intersecting: entry.is_intersecting(),
        top: entry.bounding_client_rect().top(),
    })
}

/// Attaches navigation to the current document.
///
/// `config` is an optional JSON object with the same shape as the YAML
/// settings file. It is validated like a settings file.
///
/// # Errors
///
/// Fails when there is no window, the settings are invalid or a listener
/// cannot be registered.
#[wasm_bindgen]
pub fn attach(config: Option<String>) -> Result<AnchorNav, JsValue> {
    console_error_panic_hook::set_once();

    let config: NavConfig = match config {
        Some(json) => {
            ConfigLoader::with_defaults()
                .load_str(&json, "attach")
                .map_err(|e| JsError::new(&e.to_string()))?
                .config
        }
        None => NavConfig::default(),
    };
    let window = web_sys::window().ok_or_else(|| JsError::new("no window"))?;
    let document = window.document().ok_or_else(|| JsError::new("no document"))?;

    let mut host = DomHost::new(window.clone(), document, &config);
    let sync = NavSync::attach(&mut host, &config);
    let binding: Shared = Rc::new(RefCell::new(Binding { host, sync }));

    let on_intersect = {
        let binding = Rc::clone(&binding);
        Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                let batch: Vec<_> = entries.iter().filter_map(|v| to_entry(&v)).collect();
                let mut guard = binding.borrow_mut();
                let Binding { host, sync } = &mut *guard;
                sync.handle(host, PageEvent::Intersections(batch));
            },
        )
    };
    let options = IntersectionObserverInit::new();
    options.set_root_margin(&config.detection.zone().root_margin());
    options.set_threshold(&JsValue::from_f64(config.detection.threshold));
    let observer =
        IntersectionObserver::new_with_options(on_intersect.as_ref().unchecked_ref(), &options)?;
    observe_sections(&observer, &binding.borrow().host, &config);

    let on_scroll = {
        let binding = Rc::clone(&binding);
        let window = window.clone();
        Closure::<dyn FnMut()>::new(move || {
            let offset = window.scroll_y().unwrap_or(0.0);
            let mut guard = binding.borrow_mut();
            let Binding { host, sync } = &mut *guard;
            sync.handle(host, PageEvent::Scroll { offset });
        })
    };
    window.add_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref())?;

    let on_nav_click = {
        let binding = Rc::clone(&binding);
        Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            let Some(target) = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|e| e.closest(&format!("[{SCROLL_TARGET_ATTR}]")).ok().flatten())
                .and_then(|a| a.get_attribute(SCROLL_TARGET_ATTR))
            else {
                return;
            };
            let mut guard = binding.borrow_mut();
            let Binding { host, sync } = &mut *guard;
            if let Some(index) = sync.list().position(&target) {
                sync.handle(host, PageEvent::ClickEntry { index });
            }
        })
    };
    if let Some(container) = &binding.borrow().host.container {
        container.add_event_listener_with_callback("click", on_nav_click.as_ref().unchecked_ref())?;
    }

    let on_top_click = {
        let binding = Rc::clone(&binding);
        Closure::<dyn FnMut()>::new(move || {
            let mut guard = binding.borrow_mut();
            let Binding { host, sync } = &mut *guard;
            sync.handle(host, PageEvent::ClickBackToTop);
        })
    };
    if let Some(button) = &binding.borrow().host.button {
        button.add_event_listener_with_callback("click", on_top_click.as_ref().unchecked_ref())?;
    }

    Ok(AnchorNav {
        binding,
        observer,
        _on_intersect: on_intersect,
        _on_scroll: on_scroll,
        _on_nav_click: on_nav_click,
        _on_top_click: on_top_click,
    })
}
