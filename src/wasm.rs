//! Browser entry point.
//!
//! [`WebEditor`] binds one [`EditorSession`] to a canvas element. DOM events
//! are translated into session calls; page callbacks registered through
//! `on_change`/`on_pointer` are invoked after the session borrow is released,
//! so they may call straight back into the editor.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, future_to_promise};
use web_sys::{
    AddEventListenerOptions, Blob, BlobPropertyBag, CanvasRenderingContext2d, Document, Element,
    Event, EventTarget, HtmlAnchorElement, HtmlCanvasElement, HtmlElement, HtmlImageElement,
    KeyboardEvent, MouseEvent, Request, RequestInit, RequestMode, Url, UrlSearchParams, WheelEvent,
    Window,
};

use crate::config::{EditorConfig, LaunchParams, filename_from_url};
use crate::coords::{ImageSize, Point};
use crate::input::{ClientRect, Key, Modifiers, MouseButton, PointerInput, WheelInput};
use crate::interaction::Response;
use crate::model::Mode;
use crate::remote::SaveResponse;
use crate::session::{EditorSession, ImportOutcome, LoadStatus, LoadTicket};
use crate::wasm_canvas::CanvasTarget;

const RESIZE_DEBOUNCE_MS: i32 = 100;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let level = EditorConfig::load_from_local_storage()
        .unwrap_or_default()
        .log_level
        .to_level();
    if let Err(e) = console_log::init_with_level(level) {
        web_sys::console::log_1(&format!("Logger already initialized: {}", e).into());
    }
    log::info!("pointmark {} starting", env!("CARGO_PKG_VERSION"));
}

type Shared = Rc<RefCell<WebState>>;

/// Page callbacks to invoke once the state borrow is dropped.
type Callbacks = Vec<(js_sys::Function, JsValue)>;

struct WebState {
    session: EditorSession,
    canvas: HtmlCanvasElement,
    container: HtmlElement,
    target: CanvasTarget,
    on_change: Option<js_sys::Function>,
    on_pointer: Option<js_sys::Function>,
    resize_timer: Option<i32>,
    /// Handlers of the image load in flight, if any.
    image_load: Option<ImageHandlers>,
}

impl WebState {
    fn container_size(&self) -> (f64, f64) {
        (
            f64::from(self.container.client_width()),
            f64::from(self.container.client_height()),
        )
    }

    fn client_rect(&self) -> ClientRect {
        let rect = self.canvas.get_bounding_client_rect();
        ClientRect::new(rect.left(), rect.top(), rect.width(), rect.height())
    }

    fn pointer_input(&self, event: &MouseEvent) -> PointerInput {
        PointerInput::new(
            Point::new(f64::from(event.client_x()), f64::from(event.client_y())),
            self.client_rect(),
            MouseButton::from_dom(event.button()),
        )
        .with_modifiers(Modifiers {
            ctrl: event.ctrl_key(),
        })
    }

    fn set_cursor(&self, css: &str) {
        if let Err(e) = self.canvas.style().set_property("cursor", css) {
            log::warn!("Failed to set cursor: {:?}", e);
        }
    }

    /// Match the canvas backing store and CSS box to the fitted display size.
    fn sync_canvas_size(&self) {
        let Some(viewport) = self.session.viewport() else {
            return;
        };
        let display = viewport.display();
        let (width, height) = display.canvas_pixels();
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        let style = self.canvas.style();
        for (property, value) in [("width", display.width), ("height", display.height)] {
            if let Err(e) = style.set_property(property, &format!("{}px", value)) {
                log::warn!("Failed to set canvas {}: {:?}", property, e);
            }
        }
    }

    fn render(&mut self) {
        self.session.render(&mut self.target);
    }

    fn change_callback(&self, kind: &str, calls: &mut Callbacks) {
        if let Some(callback) = &self.on_change {
            calls.push((callback.clone(), JsValue::from_str(kind)));
        }
    }

    /// Apply a session response to the page and collect the page callbacks it triggers.
    fn apply(&mut self, response: Response) -> Callbacks {
        if let Some(cursor) = response.cursor {
            self.set_cursor(cursor.css_name());
        }
        if response.redraw {
            self.render();
        }

        let mut calls = Vec::new();
        if response.keypoints_changed {
            self.change_callback("keypoints", &mut calls);
        }
        if response.mode_changed {
            self.change_callback("mode", &mut calls);
        }
        if response.redraw && !response.keypoints_changed {
            self.change_callback("view", &mut calls);
        }
        calls
    }

    fn pointer_readout(&self, response: &Response, calls: &mut Callbacks) {
        let Some(callback) = &self.on_pointer else {
            return;
        };
        let text = match response.pointer_original {
            Some(p) => format!("Mouse: ({:.2}, {:.2})", p.x, p.y),
            None => "Mouse: (-, -)".to_string(),
        };
        calls.push((callback.clone(), JsValue::from_str(&text)));
    }
}

fn fire(calls: Callbacks) {
    for (callback, arg) in calls {
        if let Err(e) = callback.call1(&JsValue::NULL, &arg) {
            log::error!("Page callback failed: {:?}", e);
        }
    }
}

/// Run `action` against the state, then fire whatever callbacks it produced.
fn dispatch(shared: &Shared, action: impl FnOnce(&mut WebState) -> Callbacks) {
    let calls = match shared.try_borrow_mut() {
        Ok(mut state) => action(&mut state),
        Err(_) => {
            log::debug!("Editor busy, dropping reentrant event");
            return;
        }
    };
    fire(calls);
}

fn to_js(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("No window object available"))
}

fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("No document available"))
}

fn element_by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Element #{} not found", id)))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Element #{} has the wrong type", id)))
}

fn alert(message: &str) {
    if let Ok(window) = window() {
        if let Err(e) = window.alert_with_message(message) {
            log::warn!("alert failed: {:?}", e);
        }
    }
}

/// Keys typed into a text field (keypoint names) must not drive the canvas.
fn typing_in_field(event: &Event) -> bool {
    event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
        .is_some_and(|el| matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA" | "SELECT"))
}

fn launch_params(window: &Window) -> LaunchParams {
    let search = window.location().search().unwrap_or_default();
    let Ok(query) = UrlSearchParams::new_with_str(&search) else {
        return LaunchParams::default();
    };
    let image_url = query.get("imageUrl").unwrap_or_default();
    let image_path = query.get("imagePath").unwrap_or_default();
    LaunchParams::from_pairs([
        ("imageUrl", image_url.as_str()),
        ("imagePath", image_path.as_str()),
    ])
}

struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(
        target: &EventTarget,
        kind: &'static str,
        passive: Option<bool>,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        match passive {
            Some(passive) => {
                let options = AddEventListenerOptions::new();
                options.set_passive(passive);
                target.add_event_listener_with_callback_and_add_event_listener_options(
                    kind,
                    callback.as_ref().unchecked_ref(),
                    &options,
                )?;
            }
            None => {
                target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?
            }
        }
        Ok(Self {
            target: target.clone(),
            kind,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        if let Err(e) = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref())
        {
            log::warn!("Failed to remove {} listener: {:?}", self.kind, e);
        }
    }
}

/// `onload`/`onerror` closures of one `HtmlImageElement`.
///
/// Dropping detaches both and releases the object URL, so a finished or
/// superseded load keeps neither the closures nor the element alive.
struct ImageHandlers {
    image: HtmlImageElement,
    src: String,
    object_url: bool,
    _onload: Closure<dyn FnMut()>,
    _onerror: Closure<dyn FnMut()>,
}

impl Drop for ImageHandlers {
    fn drop(&mut self) {
        self.image.set_onload(None);
        self.image.set_onerror(None);
        release_object_url(&self.src, self.object_url);
    }
}

/// Keypoint row for the page's list view.
#[derive(Serialize)]
struct KeypointRow<'a> {
    index: usize,
    id: u32,
    name: &'a str,
    x: f64,
    y: f64,
    selected: bool,
}

/// Keypoint editor bound to a canvas and its container.
#[wasm_bindgen]
pub struct WebEditor {
    shared: Shared,
    _listeners: Vec<Listener>,
    _resize_done: Closure<dyn FnMut()>,
}

#[wasm_bindgen]
impl WebEditor {
    /// Attach to `#canvas_id` inside `#container_id`.
    ///
    /// If the page URL carries `imageUrl`, that image starts loading at once.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, container_id: &str) -> Result<WebEditor, JsValue> {
        let window = window()?;
        let document = document()?;
        let canvas: HtmlCanvasElement = element_by_id(&document, canvas_id)?;
        let container: HtmlElement = element_by_id(&document, container_id)?;
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2D canvas context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let config = EditorConfig::load_from_local_storage().unwrap_or_default();
        let launch = launch_params(&window);
        let width = f64::from(container.client_width());
        let height = f64::from(container.client_height());
        let session =
            EditorSession::new(config.keybindings, width, height).with_launch_params(launch.clone());

        let shared: Shared = Rc::new(RefCell::new(WebState {
            session,
            canvas: canvas.clone(),
            container,
            target: CanvasTarget::new(ctx),
            on_change: None,
            on_pointer: None,
            resize_timer: None,
            image_load: None,
        }));

        let canvas_target: &EventTarget = canvas.as_ref();
        let mut listeners = Vec::new();

        let s = shared.clone();
        listeners.push(Listener::attach(canvas_target, "mousedown", None, move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            if event.ctrl_key() {
                event.prevent_default();
            }
            dispatch(&s, |state| {
                let input = state.pointer_input(event);
                match state.session.pointer_down(&input) {
                    Ok(response) => state.apply(response),
                    Err(e) => {
                        log::debug!("Pointer down ignored: {}", e);
                        Vec::new()
                    }
                }
            });
        })?);

        let s = shared.clone();
        listeners.push(Listener::attach(canvas_target, "mousemove", None, move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            dispatch(&s, |state| {
                let input = state.pointer_input(event);
                match state.session.pointer_move(&input) {
                    Ok(response) => {
                        let mut calls = state.apply(response);
                        state.pointer_readout(&response, &mut calls);
                        calls
                    }
                    Err(e) => {
                        log::debug!("Pointer move ignored: {}", e);
                        Vec::new()
                    }
                }
            });
        })?);

        let s = shared.clone();
        listeners.push(Listener::attach(canvas_target, "mouseup", None, move |_event| {
            dispatch(&s, |state| {
                let response = state.session.pointer_up();
                state.apply(response)
            });
        })?);

        let s = shared.clone();
        listeners.push(Listener::attach(canvas_target, "mouseleave", None, move |_event| {
            dispatch(&s, |state| {
                let response = state.session.pointer_up();
                let mut calls = state.apply(response);
                state.pointer_readout(&Response::none(), &mut calls);
                calls
            });
        })?);

        let s = shared.clone();
        listeners.push(Listener::attach(canvas_target, "contextmenu", None, move |event| {
            event.prevent_default();
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            dispatch(&s, |state| {
                let input = state.pointer_input(event);
                match state.session.context_menu(&input) {
                    Ok(response) => state.apply(response),
                    Err(e) => {
                        log::debug!("Context menu ignored: {}", e);
                        Vec::new()
                    }
                }
            });
        })?);

        let s = shared.clone();
        listeners.push(Listener::attach(canvas_target, "wheel", Some(false), move |event| {
            event.prevent_default();
            let Some(event) = event.dyn_ref::<WheelEvent>() else {
                return;
            };
            dispatch(&s, |state| {
                let input = WheelInput {
                    client: Point::new(f64::from(event.client_x()), f64::from(event.client_y())),
                    rect: state.client_rect(),
                    delta_y: event.delta_y(),
                };
                let response = state.session.wheel(&input);
                state.apply(response)
            });
        })?);

        let document_target: &EventTarget = document.as_ref();

        let s = shared.clone();
        listeners.push(Listener::attach(document_target, "keydown", None, move |event| {
            if typing_in_field(&event) {
                return;
            }
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let key = Key::from_dom(&event.key());
            dispatch(&s, |state| {
                let response = state.session.key_down(&key);
                state.apply(response)
            });
        })?);

        let s = shared.clone();
        listeners.push(Listener::attach(document_target, "keyup", None, move |event| {
            if typing_in_field(&event) {
                return;
            }
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let key = Key::from_dom(&event.key());
            dispatch(&s, |state| {
                let response = state.session.key_up(&key);
                state.apply(response)
            });
        })?);

        let s = shared.clone();
        let resize_done = Closure::<dyn FnMut()>::new(move || {
            dispatch(&s, |state| {
                state.resize_timer = None;
                let (width, height) = state.container_size();
                let response = state.session.resize_container(width, height);
                state.sync_canvas_size();
                state.apply(response)
            });
        });

        let s = shared.clone();
        let resize_fn: js_sys::Function = resize_done.as_ref().unchecked_ref::<js_sys::Function>().clone();
        let window_target: &EventTarget = window.as_ref();
        listeners.push(Listener::attach(window_target, "resize", None, move |_event| {
            let Ok(mut state) = s.try_borrow_mut() else {
                return;
            };
            let Ok(window) = self::window() else {
                return;
            };
            if let Some(handle) = state.resize_timer.take() {
                window.clear_timeout_with_handle(handle);
            }
            match window
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resize_fn, RESIZE_DEBOUNCE_MS)
            {
                Ok(handle) => state.resize_timer = Some(handle),
                Err(e) => log::warn!("Failed to schedule resize: {:?}", e),
            }
        })?);

        let editor = WebEditor {
            shared,
            _listeners: listeners,
            _resize_done: resize_done,
        };

        if let Some(url) = launch.image_url {
            log::info!("Loading startup image {}", url);
            editor.load_image_url(&url)?;
        }

        Ok(editor)
    }

    /// Fetch and display an image from a URL.
    pub fn load_image_url(&self, url: &str) -> Result<(), JsValue> {
        start_image_load(&self.shared, filename_from_url(url), url.to_string(), false)
    }

    /// Display an image from raw file bytes (as read by a file picker).
    pub fn load_image_bytes(&self, filename: &str, bytes: &[u8]) -> Result<(), JsValue> {
        let array = js_sys::Uint8Array::from(bytes);
        let parts = js_sys::Array::of1(&array);
        let blob = Blob::new_with_u8_array_sequence(&parts)?;
        let url = Url::create_object_url_with_blob(&blob)?;
        start_image_load(&self.shared, filename.to_string(), url, true)
    }

    /// Replace the keypoints with those in a label JSON document.
    ///
    /// Returns the number loaded, or `undefined` if the user declined a
    /// dimension mismatch. Throws if the document is invalid or the editor is
    /// in the middle of another event.
    pub fn import_labels(&self, text: &str) -> Result<Option<usize>, JsValue> {
        let window = window()?;
        // Stays an error if the editor is busy and the import never runs
        let mut result = Err(JsValue::from_str("Editor is busy, try importing again"));
        dispatch(&self.shared, |state| {
            let outcome = state.session.import_labels(text, |mismatch| {
                window
                    .confirm_with_message(&mismatch.prompt())
                    .unwrap_or(false)
            });
            match outcome {
                Ok(ImportOutcome::Loaded(count)) => {
                    log::info!("Imported {} keypoints", count);
                    result = Ok(Some(count));
                    state.apply(Response::changed())
                }
                Ok(ImportOutcome::Declined) => {
                    result = Ok(None);
                    Vec::new()
                }
                Err(e) => {
                    log::error!("Label import failed: {}", e);
                    result = Err(to_js(e));
                    Vec::new()
                }
            }
        });
        result
    }

    /// Pretty-printed label document for the current keypoints.
    pub fn export_json(&self) -> Result<String, JsValue> {
        self.shared
            .borrow()
            .session
            .export_json(Utc::now())
            .map_err(to_js)
    }

    /// Suggested download name for the label document.
    pub fn export_filename(&self) -> String {
        self.shared.borrow().session.export_filename(Utc::now())
    }

    /// Trigger a browser download of the label document.
    pub fn download_labels(&self) -> Result<(), JsValue> {
        let (json, filename) = {
            let state = self.shared.borrow();
            let now = Utc::now();
            let json = state.session.export_json(now).map_err(to_js)?;
            (json, state.session.export_filename(now))
        };

        let parts = js_sys::Array::of1(&JsValue::from_str(&json));
        let options = BlobPropertyBag::new();
        options.set_type("application/json");
        let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
        let url = Url::create_object_url_with_blob(&blob)?;

        let link: HtmlAnchorElement = document()?
            .create_element("a")?
            .dyn_into()
            .map_err(JsValue::from)?;
        link.set_href(&url);
        link.set_download(&filename);
        link.click();
        Url::revoke_object_url(&url)?;

        log::info!("Downloaded labels as {}", filename);
        Ok(())
    }

    /// Whether the page was opened with an `imageUrl` to save back to.
    pub fn can_save_remotely(&self) -> bool {
        self.shared
            .borrow()
            .session
            .launch_params()
            .can_save_remotely()
    }

    /// POST the labels to the image server.
    ///
    /// Resolves with the server's summary line; rejects on transport errors
    /// or a non-success status.
    pub fn save_to_server(&self) -> Result<js_sys::Promise, JsValue> {
        let (endpoint, body) = {
            let state = self.shared.borrow();
            let endpoint = state
                .session
                .save_endpoint()
                .ok_or_else(|| JsValue::from_str("No server image URL available"))?;
            let request = state.session.save_request(Utc::now()).map_err(to_js)?;
            (endpoint, serde_json::to_string(&request).map_err(to_js)?)
        };

        Ok(future_to_promise(async move {
            let response = post_labels(&endpoint, &body).await?;
            if response.is_success() {
                log::info!("{}", response.summary());
                Ok(JsValue::from_str(&response.summary()))
            } else {
                log::error!("Server save failed: {}", response.summary());
                Err(JsValue::from_str(&response.summary()))
            }
        }))
    }

    pub fn toggle_mode(&self) {
        dispatch(&self.shared, |state| {
            let response = state.session.toggle_mode();
            state.apply(response)
        });
    }

    /// Current mode label for the toolbar.
    pub fn mode_name(&self) -> String {
        self.shared.borrow().session.mode().name().to_string()
    }

    pub fn is_keypoint_mode(&self) -> bool {
        self.shared.borrow().session.mode() == Mode::Keypoint
    }

    pub fn zoom_in(&self) {
        dispatch(&self.shared, |state| {
            let response = state.session.zoom_in();
            state.apply(response)
        });
    }

    pub fn zoom_out(&self) {
        dispatch(&self.shared, |state| {
            let response = state.session.zoom_out();
            state.apply(response)
        });
    }

    pub fn reset_view(&self) {
        dispatch(&self.shared, |state| {
            let response = state.session.reset_view();
            state.apply(response)
        });
    }

    pub fn zoom_percent(&self) -> u32 {
        self.shared.borrow().session.zoom_percent()
    }

    /// Toggle list selection of a keypoint.
    pub fn select_keypoint(&self, index: usize) -> Result<(), JsValue> {
        self.keypoint_action(|session| session.select(index).map(|_| ()))
    }

    pub fn rename_keypoint(&self, index: usize, name: &str) -> Result<(), JsValue> {
        self.keypoint_action(|session| session.rename(index, name))
    }

    pub fn remove_keypoint(&self, index: usize) -> Result<(), JsValue> {
        self.keypoint_action(|session| session.remove(index).map(|_| ()))
    }

    pub fn clear_all(&self) -> Result<(), JsValue> {
        self.keypoint_action(EditorSession::clear_all)
    }

    /// JSON array of `{index, id, name, x, y, selected}` rows in list order.
    pub fn keypoints_json(&self) -> Result<String, JsValue> {
        let state = self.shared.borrow();
        let rows: Vec<KeypointRow<'_>> = match state.session.keypoints() {
            Some(store) => store
                .iter()
                .enumerate()
                .map(|(index, kp)| KeypointRow {
                    index,
                    id: kp.id(),
                    name: kp.name(),
                    x: kp.original().x,
                    y: kp.original().y,
                    selected: store.selected() == Some(index),
                })
                .collect(),
            None => Vec::new(),
        };
        serde_json::to_string(&rows).map_err(to_js)
    }

    /// Register `callback(kind)`, called with "keypoints", "mode", "view" or "image".
    pub fn on_change(&self, callback: Option<js_sys::Function>) {
        self.shared.borrow_mut().on_change = callback;
    }

    /// Register `callback(text)` with the pointer position readout.
    pub fn on_pointer(&self, callback: Option<js_sys::Function>) {
        self.shared.borrow_mut().on_pointer = callback;
    }

    /// Apply a preferences JSON document and persist it to localStorage.
    pub fn apply_config(&self, json: &str) -> Result<(), JsValue> {
        let config = EditorConfig::from_json(json).map_err(to_js)?;
        log::set_max_level(config.log_level.to_level_filter());
        self.shared
            .borrow_mut()
            .session
            .set_keybindings(config.keybindings.clone());
        config.save_to_local_storage().map_err(to_js)
    }

    /// Current preferences as JSON.
    pub fn config_json(&self) -> Result<String, JsValue> {
        let config = EditorConfig {
            keybindings: self.shared.borrow().session.keybindings().clone(),
            ..EditorConfig::load_from_local_storage().unwrap_or_default()
        };
        config.to_json().map_err(to_js)
    }
}

impl WebEditor {
    fn keypoint_action(
        &self,
        action: impl FnOnce(&mut EditorSession) -> Result<(), crate::error::EditorError>,
    ) -> Result<(), JsValue> {
        let mut result = Err(JsValue::from_str("Editor is busy, try again"));
        dispatch(&self.shared, |state| match action(&mut state.session) {
            Ok(()) => {
                result = Ok(());
                state.apply(Response::changed())
            }
            Err(e) => {
                log::warn!("{}", e);
                result = Err(to_js(e));
                Vec::new()
            }
        });
        result
    }
}

fn start_image_load(
    shared: &Shared,
    filename: String,
    src: String,
    object_url: bool,
) -> Result<(), JsValue> {
    let ticket = shared.borrow_mut().session.begin_image_load(Some(filename));
    let image = HtmlImageElement::new()?;
    if !object_url {
        image.set_cross_origin(Some("anonymous"));
    }

    let onload = {
        let shared = shared.clone();
        let image = image.clone();
        let ticket = ticket.clone();
        Closure::<dyn FnMut()>::new(move || {
            let size = ImageSize::new(image.natural_width(), image.natural_height());
            finish_image_load(&shared, ticket.clone(), Ok(size), &image);
        })
    };
    let onerror = {
        let shared = shared.clone();
        let image = image.clone();
        let src = src.clone();
        Closure::<dyn FnMut()>::new(move || {
            let reason = if object_url {
                "the file is not a readable image".to_string()
            } else {
                format!("could not fetch {}", src)
            };
            finish_image_load(&shared, ticket.clone(), Err(reason), &image);
        })
    };

    image.set_onload(Some(onload.as_ref().unchecked_ref()));
    image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    image.set_src(&src);
    // Replacing detaches the previous load, whose ticket is stale by now
    shared.borrow_mut().image_load = Some(ImageHandlers {
        image,
        src,
        object_url,
        _onload: onload,
        _onerror: onerror,
    });
    Ok(())
}

fn release_object_url(src: &str, object_url: bool) {
    if object_url {
        if let Err(e) = Url::revoke_object_url(src) {
            log::warn!("Failed to revoke object URL: {:?}", e);
        }
    }
}

fn finish_image_load(
    shared: &Shared,
    ticket: LoadTicket,
    decoded: Result<ImageSize, String>,
    image: &HtmlImageElement,
) {
    let mut failure = None;
    dispatch(shared, |state| {
        match state.session.finish_image_load(ticket, decoded) {
            Ok(LoadStatus::Applied) => {
                state.image_load = None;
                state.target.set_image(image.clone());
                state.sync_canvas_size();
                let cursor = state.session.cursor();
                let mut calls = state.apply(Response::changed().with_cursor(cursor));
                state.change_callback("image", &mut calls);
                calls
            }
            Ok(LoadStatus::Stale) => Vec::new(),
            Err(e) => {
                state.image_load = None;
                log::error!("{}", e);
                failure = Some(e.to_string());
                Vec::new()
            }
        }
    });
    if let Some(message) = failure {
        alert(&message);
    }
}

async fn post_labels(endpoint: &str, body: &str) -> Result<SaveResponse, JsValue> {
    let init = RequestInit::new();
    init.set_method("POST");
    init.set_mode(RequestMode::Cors);
    init.set_body(&JsValue::from_str(body));

    let request = Request::new_with_str_and_init(endpoint, &init)?;
    request.headers().set("Content-Type", "application/json")?;

    let response = JsFuture::from(window()?.fetch_with_request(&request)).await?;
    let response: web_sys::Response = response.dyn_into()?;
    let json = JsFuture::from(response.json()?).await?;
    let text = String::from(js_sys::JSON::stringify(&json)?);

    let mut parsed: SaveResponse = serde_json::from_str(&text).map_err(to_js)?;
    if !response.ok() && parsed.is_success() {
        parsed.status = format!("http {}", response.status());
    }
    Ok(parsed)
}
