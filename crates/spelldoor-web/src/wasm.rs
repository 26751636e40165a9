#![forbid(unsafe_code)]

//! `wasm-bindgen` exports for the spell door page.
//!
//! [`SpellDoor`] wraps a [`PageSession`] with the browser plumbing it needs:
//! document/text-surface listeners, `setTimeout` timers and `fetch`. All DOM
//! callbacks borrow the session briefly, collect its effects, release the
//! borrow and only then touch the DOM. Nothing holds a borrow across `.await`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use js_sys::Function;
use spelldoor_core::{
    COARSE_POINTER_QUERY, DisplayEffect, DomIds, FocusTarget, HttpReply, InputMode, KeyDispatch,
    NotifierEffect, NotifyError, PageEffect, PageReaction, PageSession, SpellConfig, TimerRequest,
    TimerToken,
};
use tracing::{debug, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Document, Element, Event, HtmlElement, HtmlInputElement, KeyboardEvent, Request, RequestInit,
    Response, Window,
};

use crate::console_layer::{ConsoleLayer, ConsoleSink};
use crate::dom_ops::{self, DomOp};
use crate::error::MountError;
use crate::timer_book::TimerBook;

impl From<MountError> for JsValue {
    fn from(err: MountError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

struct BrowserConsole;

impl ConsoleSink for BrowserConsole {
    fn write(&self, level: tracing::Level, line: &str) {
        let line = JsValue::from_str(line);
        match level {
            tracing::Level::ERROR => web_sys::console::error_1(&line),
            tracing::Level::WARN => web_sys::console::warn_1(&line),
            tracing::Level::INFO => web_sys::console::info_1(&line),
            tracing::Level::DEBUG => web_sys::console::debug_1(&line),
            _ => web_sys::console::log_1(&line),
        }
    }
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            web_sys::console::error_1(&JsValue::from_str(&msg));
        }));
    });
}

fn install_console_tracing(max_level: tracing::Level) {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        let subscriber =
            tracing_subscriber::registry().with(ConsoleLayer::new(BrowserConsole, max_level));
        // A host that installed its own subscriber keeps it.
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

fn js_error_text(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn delay_ms(delay: Duration) -> i32 {
    i32::try_from(delay.as_millis()).unwrap_or(i32::MAX)
}

async fn post_keypress(window: &Window, dispatch: &KeyDispatch) -> Result<HttpReply, NotifyError> {
    let transport = |value: JsValue| NotifyError::Transport(js_error_text(&value));

    let body = dispatch.body()?;
    let init = RequestInit::new();
    init.set_method("POST");
    init.set_body(&JsValue::from_str(&body));
    let request = Request::new_with_str_and_init(&dispatch.endpoint, &init).map_err(transport)?;
    request
        .headers()
        .set("Content-Type", "application/json")
        .map_err(transport)?;

    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(transport)?
        .dyn_into()
        .map_err(transport)?;
    let text = JsFuture::from(response.text().map_err(transport)?)
        .await
        .map_err(transport)?;

    Ok(HttpReply {
        status: response.status(),
        status_text: response.status_text(),
        body: text.as_string().unwrap_or_default(),
    })
}

type KeyListener = Closure<dyn FnMut(KeyboardEvent)>;
type InputListener = Closure<dyn FnMut(Event)>;

/// Browser-side state shared by every callback.
struct Shell {
    window: Window,
    document: Document,
    ids: DomIds,
    hint_color: String,
    page: RefCell<PageSession>,
    text_surface: Option<HtmlInputElement>,
    timers: RefCell<TimerBook<i32>>,
    reveal_click: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl Shell {
    fn element(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn focus_target(&self) -> FocusTarget {
        let (Some(surface), Some(active)) = (&self.text_surface, self.document.active_element())
        else {
            return FocusTarget::Elsewhere;
        };
        if surface.unchecked_ref::<Element>() == &active {
            FocusTarget::TextSurface
        } else {
            FocusTarget::Elsewhere
        }
    }

    fn handle_keydown(self: &Rc<Self>, event: &KeyboardEvent) {
        let focus = self.focus_target();
        debug!(
            key = %event.key(),
            target = %event
                .target()
                .and_then(|target| target.dyn_into::<Element>().ok())
                .map(|element| element.id())
                .unwrap_or_default(),
            active_element = %self
                .document
                .active_element()
                .map(|element| element.id())
                .unwrap_or_default(),
            "keydown event"
        );
        let reaction = self.page.borrow_mut().on_keydown(&event.key(), focus);
        if reaction.prevent_default {
            event.prevent_default();
        }
        self.apply_reaction(reaction);
    }

    fn handle_text_input(self: &Rc<Self>) {
        let Some(surface) = &self.text_surface else {
            return;
        };
        let reaction = self.page.borrow_mut().on_text_input(&surface.value());
        if reaction.clear_text_surface {
            surface.set_value("");
        }
        self.apply_reaction(reaction);
    }

    fn handle_fade_timer(self: &Rc<Self>, token: TimerToken) {
        self.timers.borrow_mut().take_fade(token);
        let effects = self.page.borrow_mut().on_timer(token);
        for effect in effects {
            self.apply_page_effect(effect);
        }
    }

    fn apply_reaction(self: &Rc<Self>, reaction: PageReaction) {
        for effect in reaction.effects {
            self.apply_page_effect(effect);
        }
        if let Some(dispatch) = reaction.request {
            self.spawn_request(dispatch);
        }
    }

    fn apply_page_effect(self: &Rc<Self>, effect: PageEffect) {
        match effect {
            PageEffect::Display(DisplayEffect::CancelTimer(token)) => {
                let handle = self.timers.borrow_mut().take_fade(token);
                if let Some(handle) = handle {
                    self.window.clear_timeout_with_handle(handle);
                }
            }
            PageEffect::Display(DisplayEffect::ScheduleTimer(request)) => {
                self.schedule_fade_timer(request);
            }
            other => {
                for op in dom_ops::page_effect_ops(&self.ids, &self.hint_color, &other) {
                    self.apply_op(op);
                }
            }
        }
    }

    fn schedule_fade_timer(self: &Rc<Self>, request: TimerRequest) {
        let weak: Weak<Self> = Rc::downgrade(self);
        let token = request.token;
        let callback = Closure::once_into_js(move || {
            if let Some(shell) = weak.upgrade() {
                shell.handle_fade_timer(token);
            }
        });
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref::<Function>(),
                delay_ms(request.delay),
            ) {
            Ok(handle) => {
                self.timers.borrow_mut().track_fade(token, handle);
            }
            Err(err) => warn!(error = %js_error_text(&err), "failed to schedule fade timer"),
        }
    }

    fn spawn_request(self: &Rc<Self>, dispatch: KeyDispatch) {
        let weak: Weak<Self> = Rc::downgrade(self);
        let window = self.window.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = post_keypress(&window, &dispatch)
                .await
                .and_then(HttpReply::into_response);
            let Some(shell) = weak.upgrade() else {
                return;
            };
            if !shell.timers.borrow().is_attached() {
                debug!(sequence = dispatch.sequence, "response after detach ignored");
                return;
            }
            let resolution = shell
                .page
                .borrow_mut()
                .on_response(dispatch.sequence, outcome);
            for effect in resolution.effects {
                shell.apply_notifier_effect(effect);
            }
        });
    }

    fn apply_notifier_effect(self: &Rc<Self>, effect: NotifierEffect) {
        if let NotifierEffect::ScheduleReveal { delay, url } = effect {
            self.schedule_reveal(delay, url);
            return;
        }
        for op in dom_ops::notifier_effect_ops(&self.ids, &effect) {
            self.apply_op(op);
        }
    }

    fn schedule_reveal(self: &Rc<Self>, delay: Duration, url: String) {
        let weak: Weak<Self> = Rc::downgrade(self);
        let id = self.timers.borrow_mut().reserve_reveal();
        let callback = Closure::once_into_js(move || {
            if let Some(shell) = weak.upgrade() {
                let live = shell.timers.borrow_mut().reveal_fired(id);
                if live {
                    shell.reveal_protected(url);
                }
            }
        });
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref::<Function>(),
                delay_ms(delay),
            ) {
            Ok(handle) => self.timers.borrow_mut().track_reveal(id, handle),
            Err(err) => warn!(error = %js_error_text(&err), "failed to schedule reveal"),
        }
    }

    fn reveal_protected(&self, url: String) {
        let Some(button) = self
            .element(&self.ids.protected_link)
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };
        for op in dom_ops::reveal_ops(&self.ids) {
            self.apply_op(op);
        }

        let window = self.window.clone();
        let on_click = Closure::<dyn FnMut()>::new(move || {
            if let Err(err) = window.location().set_href(&url) {
                warn!(error = %js_error_text(&err), "navigation to protected resource failed");
            }
        });
        button.set_onclick(Some(on_click.as_ref().unchecked_ref()));
        // The previous handler is dropped only after the new one is attached.
        self.reveal_click.replace(Some(on_click));
        info!("protected resource revealed");
    }

    fn apply_op(&self, op: DomOp) {
        match op {
            DomOp::SetText { id, text } => {
                if let Some(element) = self.element(&id) {
                    element.set_text_content(Some(&text));
                }
            }
            DomOp::AddClass { id, class } => {
                if let Some(element) = self.element(&id)
                    && let Err(err) = element.class_list().add_1(class)
                {
                    warn!(id, class, error = %js_error_text(&err), "classList.add failed");
                }
            }
            DomOp::RemoveClass { id, class } => {
                if let Some(element) = self.element(&id)
                    && let Err(err) = element.class_list().remove_1(class)
                {
                    warn!(id, class, error = %js_error_text(&err), "classList.remove failed");
                }
            }
            DomOp::SetShown { id, shown } => {
                if let Some(element) = self
                    .element(&id)
                    .and_then(|element| element.dyn_into::<HtmlElement>().ok())
                {
                    let display = if shown { "block" } else { "none" };
                    if let Err(err) = element.style().set_property("display", display) {
                        warn!(id, error = %js_error_text(&err), "style.display update failed");
                    }
                }
            }
            DomOp::RenderHint {
                id,
                highlight,
                color,
            } => {
                if let Some(element) = self.element(&id)
                    && let Err(err) = self.render_hint(&element, &highlight, &color)
                {
                    warn!(id, error = %js_error_text(&err), "hint render failed");
                }
            }
        }
    }

    fn render_hint(
        &self,
        field: &Element,
        highlight: &spelldoor_core::HintHighlight,
        color: &str,
    ) -> Result<(), JsValue> {
        field.set_text_content(None);
        if highlight.is_plain() {
            field.set_text_content(Some(&highlight.text()));
            return Ok(());
        }
        field.append_child(&self.document.create_text_node(&highlight.before))?;
        let span = self.document.create_element("span")?;
        span.set_attribute("style", &format!("color: {color};"))?;
        span.set_text_content(Some(&highlight.matched));
        field.append_child(&span)?;
        field.append_child(&self.document.create_text_node(&highlight.after))?;
        Ok(())
    }

    fn clear_timers(&self) {
        let handles = self.timers.borrow_mut().detach();
        for handle in handles {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}

/// A mounted spell door page.
///
/// Dropping (or calling `destroy()`) detaches every listener and cancels
/// pending timers. Responses that arrive afterwards are ignored.
#[wasm_bindgen]
pub struct SpellDoor {
    shell: Rc<Shell>,
    keydown: Option<KeyListener>,
    text_input: Option<InputListener>,
}

#[wasm_bindgen]
impl SpellDoor {
    /// Mount onto the current document.
    ///
    /// `config_json` is an optional partial JSON `SpellConfig`. Call after
    /// `DOMContentLoaded`.
    #[wasm_bindgen(constructor)]
    pub fn mount(config_json: Option<String>) -> Result<SpellDoor, JsValue> {
        install_panic_hook();
        let config = match config_json.as_deref() {
            Some(json) => SpellConfig::from_json(json).map_err(MountError::from)?,
            None => SpellConfig::default(),
        };
        install_console_tracing(config.log_level.into());
        Ok(Self::mount_with_config(config)?)
    }

    /// Session identifier sent with every keypress.
    #[wasm_bindgen(js_name = sessionId)]
    pub fn session_id(&self) -> String {
        self.shell.page.borrow().session_id().to_string()
    }

    /// `"hidden"`, `"visible"` or `"fading_out"`.
    #[wasm_bindgen(js_name = displayState)]
    pub fn display_state(&self) -> String {
        let state = self.shell.page.borrow().display_state();
        match state {
            spelldoor_core::DisplayState::Hidden => "hidden",
            spelldoor_core::DisplayState::Visible => "visible",
            spelldoor_core::DisplayState::FadingOut => "fading_out",
        }
        .to_owned()
    }

    /// Whether the page runs in touch mode.
    #[wasm_bindgen(js_name = isTouch)]
    pub fn is_touch(&self) -> bool {
        self.shell.page.borrow().input_mode() == InputMode::Touch
    }

    /// Detach listeners and cancel timers.
    pub fn destroy(&mut self) {
        self.detach();
    }
}

impl SpellDoor {
    fn mount_with_config(config: SpellConfig) -> Result<Self, MountError> {
        let window = web_sys::window().ok_or(MountError::NoWindow)?;
        let document = window.document().ok_or(MountError::NoDocument)?;
        for id in [&config.dom.pressed_key, &config.dom.key_display] {
            if document.get_element_by_id(id).is_none() {
                return Err(MountError::MissingElement { id: id.clone() });
            }
        }

        let coarse = window
            .match_media(COARSE_POINTER_QUERY)
            .ok()
            .flatten()
            .is_some_and(|query| query.matches());
        let mode = InputMode::from_coarse_pointer(coarse);
        let text_surface = if mode.uses_text_surface() {
            document
                .get_element_by_id(&config.dom.mobile_input)
                .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
        } else {
            None
        };

        let shell = Rc::new(Shell {
            ids: config.dom.clone(),
            hint_color: config.hint_color.clone(),
            page: RefCell::new(PageSession::new(config, mode)),
            window,
            document,
            text_surface,
            timers: RefCell::new(TimerBook::new()),
            reveal_click: RefCell::new(None),
        });

        let mut door = Self {
            shell,
            keydown: None,
            text_input: None,
        };
        door.attach(mode)?;
        Ok(door)
    }

    fn attach(&mut self, mode: InputMode) -> Result<(), MountError> {
        if mode.uses_text_surface() {
            for op in dom_ops::touch_setup_ops(&self.shell.ids) {
                self.shell.apply_op(op);
            }
            if let Some(surface) = &self.shell.text_surface {
                let weak = Rc::downgrade(&self.shell);
                let listener = InputListener::new(move |_event: Event| {
                    if let Some(shell) = weak.upgrade() {
                        shell.handle_text_input();
                    }
                });
                surface
                    .add_event_listener_with_callback("input", listener.as_ref().unchecked_ref())
                    .map_err(|err| MountError::Listener {
                        event: "input",
                        message: js_error_text(&err),
                    })?;
                self.text_input = Some(listener);
            }
        }

        let weak = Rc::downgrade(&self.shell);
        let listener = KeyListener::new(move |event: KeyboardEvent| {
            if let Some(shell) = weak.upgrade() {
                shell.handle_keydown(&event);
            }
        });
        self.shell
            .document
            .add_event_listener_with_callback("keydown", listener.as_ref().unchecked_ref())
            .map_err(|err| MountError::Listener {
                event: "keydown",
                message: js_error_text(&err),
            })?;
        self.keydown = Some(listener);
        Ok(())
    }

    fn detach(&mut self) {
        if let Some(listener) = self.keydown.take() {
            let _ = self
                .shell
                .document
                .remove_event_listener_with_callback("keydown", listener.as_ref().unchecked_ref());
        }
        if let (Some(listener), Some(surface)) = (self.text_input.take(), &self.shell.text_surface)
        {
            let _ = surface
                .remove_event_listener_with_callback("input", listener.as_ref().unchecked_ref());
        }
        self.shell.clear_timers();
        if let Some(button) = self
            .shell
            .element(&self.shell.ids.protected_link)
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
        {
            button.set_onclick(None);
        }
        self.shell.reveal_click.replace(None);
    }
}

impl Drop for SpellDoor {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Mount with the default configuration; returns `undefined` on failure after
/// logging the reason.
#[wasm_bindgen(js_name = mountDefault)]
pub fn mount_default() -> Option<SpellDoor> {
    match SpellDoor::mount(None) {
        Ok(door) => Some(door),
        Err(err) => {
            web_sys::console::error_1(&err);
            None
        }
    }
}
