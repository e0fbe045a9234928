//! Browser wiring: the `web-sys` implementation of [`Surface`] plus the event
//! listeners that feed the controller.

use std::cell::RefCell;
use std::collections::HashMap;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use tracing::{info, warn};
use web_sys::{Document, Element, HtmlElement, HtmlImageElement, Window, window};

use crate::config::WidgetConfig;
use crate::controller::{Controller, InputBinding, Surface, Target};
use crate::geometry::{Bounds, Point};
use crate::rng::BrowserRandom;
use crate::schedule::{BrowserScheduler, ParticleId, Task};

type DomController = Controller<DomSurface, BrowserScheduler, BrowserRandom>;
type EvasiveCallback = Closure<dyn FnMut(web_sys::MouseEvent)>;

thread_local! {
    static WIDGET: RefCell<Option<DomController>> = const { RefCell::new(None) };
}

/// Runs `f` against the live widget. Events that arrive while the widget is
/// borrowed (or before start) are dropped.
fn with_widget<T>(f: impl FnOnce(&mut DomController) -> T) -> Option<T> {
    WIDGET.with(|cell| match cell.try_borrow_mut() {
        Ok(mut slot) => slot.as_mut().map(f),
        Err(_) => {
            warn!("widget busy, event dropped");
            None
        }
    })
}

fn dispatch(task: Task) {
    with_widget(|c| c.run_task(task));
}

pub(crate) fn escalation_count() -> u32 {
    with_widget(|c| c.state().escalation_count()).unwrap_or(0)
}

pub struct DomSurface {
    window: Window,
    document: Document,
    yes: HtmlElement,
    no: HtmlElement,
    image: HtmlImageElement,
    message: Element,
    panel: Element,
    container: Element,
    particles: HashMap<ParticleId, Element>,
    tap_cb: EvasiveCallback,
    hover_cb: EvasiveCallback,
}

fn by_id<T: JsCast>(doc: &Document, id: &str) -> Result<T, JsValue> {
    doc.get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("element #{id} has the wrong type")))
}

fn evasive_callback(binding: InputBinding) -> EvasiveCallback {
    Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
        if binding.prevents_default() {
            evt.prevent_default();
        }
        with_widget(|c| c.handle_evasive(binding));
    }) as Box<dyn FnMut(_)>)
}

impl DomSurface {
    /// Looks up every element the widget touches; fails on the first one missing.
    pub fn attach(window: Window, config: &WidgetConfig) -> Result<Self, JsValue> {
        let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;
        let ids = &config.elements;
        let container = document
            .query_selector(&ids.buttons_container)?
            .ok_or_else(|| JsValue::from_str(&format!("missing element {}", ids.buttons_container)))?;
        Ok(Self {
            yes: by_id(&document, &ids.yes_button)?,
            no: by_id(&document, &ids.no_button)?,
            image: by_id(&document, &ids.image)?,
            message: by_id(&document, &ids.message)?,
            panel: by_id(&document, &ids.completion_panel)?,
            container,
            particles: HashMap::new(),
            tap_cb: evasive_callback(InputBinding::Tap),
            hover_cb: evasive_callback(InputBinding::Hover),
            window,
            document,
        })
    }

    fn callback(&self, binding: InputBinding) -> &EvasiveCallback {
        match binding {
            InputBinding::Tap => &self.tap_cb,
            InputBinding::Hover => &self.hover_cb,
        }
    }

    fn element(&self, target: Target) -> &Element {
        match target {
            Target::Image => &self.image,
            Target::CompletionPanel => &self.panel,
        }
    }
}

fn bounds_of(el: &Element) -> Bounds {
    let r = el.get_bounding_client_rect();
    Bounds::new(r.width(), r.height())
}

impl Surface for DomSurface {
    fn viewport_width(&self) -> f64 {
        self.window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
    }

    fn container_bounds(&self) -> Bounds {
        bounds_of(&self.container)
    }

    fn evasive_bounds(&self) -> Bounds {
        bounds_of(&self.no)
    }

    fn set_message(&mut self, text: &str) {
        self.message.set_text_content(Some(text));
    }

    fn set_image(&mut self, src: &str) {
        self.image.set_src(src);
    }

    fn set_class(&mut self, target: Target, class: &str, on: bool) {
        let list = self.element(target).class_list();
        if on {
            list.add_1(class).ok();
        } else {
            list.remove_1(class).ok();
        }
    }

    fn grow_affirmative(&mut self, scale: f64, font_rem: f64) {
        let style = self.yes.style();
        style.set_property("transform", &format!("scale({scale})")).ok();
        style.set_property("font-size", &format!("{font_rem}rem")).ok();
    }

    fn place_evasive(&mut self, at: Point) {
        let style = self.no.style();
        style.set_property("left", &format!("{}px", at.x)).ok();
        style.set_property("top", &format!("{}px", at.y)).ok();
    }

    fn install_style(&mut self, css: &str) {
        let Some(head) = self.document.head() else {
            warn!("no <head>, confetti keyframes not installed");
            return;
        };
        if let Ok(el) = self.document.create_element("style") {
            el.set_text_content(Some(css));
            head.append_child(&el).ok();
        }
    }

    fn spawn_particle(&mut self, id: ParticleId, class: &str, css: &str) -> bool {
        let Some(body) = self.document.body() else { return false };
        let Ok(div) = self.document.create_element("div") else { return false };
        div.set_class_name(class);
        div.set_attribute("style", css).ok();
        if body.append_child(&div).is_err() {
            return false;
        }
        self.particles.insert(id, div);
        true
    }

    fn remove_particle(&mut self, id: ParticleId) {
        if let Some(el) = self.particles.remove(&id) {
            el.remove();
        }
    }

    fn bind_evasive(&mut self, binding: InputBinding) {
        self.no
            .add_event_listener_with_callback(binding.event_name(), self.callback(binding).as_ref().unchecked_ref())
            .ok();
    }

    fn unbind_evasive(&mut self, binding: InputBinding) {
        self.no
            .remove_event_listener_with_callback(binding.event_name(), self.callback(binding).as_ref().unchecked_ref())
            .ok();
    }
}

/// Routes `tracing` events to the browser console; `verbose` lowers the floor to DEBUG.
#[cfg(target_arch = "wasm32")]
fn install_logging(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new().set_max_level(level).build(),
    );
}

#[cfg(not(target_arch = "wasm32"))]
fn install_logging(_verbose: bool) {}

/// Attaches the widget to the current page.
pub fn start(config: WidgetConfig) -> Result<(), JsValue> {
    if WIDGET.with(|w| w.borrow().is_some()) {
        return Err(JsValue::from_str("widget already started"));
    }
    install_logging(config.verbose);
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let surface = DomSurface::attach(win.clone(), &config)?;
    let yes = surface.yes.clone();
    let doc = surface.document.clone();
    let ctrl = Controller::new(surface, BrowserScheduler::new(dispatch), BrowserRandom::new(), config)?;
    WIDGET.with(|w| w.replace(Some(ctrl)));

    // Yes button
    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            with_widget(|c| c.on_affirmative_trigger());
        }) as Box<dyn FnMut(_)>);
        yes.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    // Resize reclassifies the viewport
    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
            with_widget(|c| c.on_resize());
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    // Initial No button position once layout is final
    if doc.ready_state() == "complete" {
        with_widget(|c| c.on_load());
    } else {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
            with_widget(|c| c.on_load());
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback("load", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    info!("widget started");
    Ok(())
}
