#![cfg(target_arch = "wasm32")]
#![forbid(unsafe_code)]

use spelldoor_web::SpellDoor;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{Document, Element, KeyboardEvent, KeyboardEventInit};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window()
        .and_then(|window| window.document())
        .expect("browser document")
}

struct Fixture {
    root: Element,
}

impl Fixture {
    fn new() -> Self {
        let document = document();
        let root = document.create_element("div").expect("create root");
        root.set_inner_html(
            r#"<div id="key-display"><span id="pressed-key"></span></div>
               <div id="door-status"></div>
               <div id="error-message" style="display: none"></div>
               <button id="protected-link" style="display: none"></button>
               <div id="hint-field">friend - enter</div>"#,
        );
        document
            .body()
            .expect("body")
            .append_child(&root)
            .expect("attach fixture");
        Self { root }
    }

    fn element(&self, id: &str) -> Element {
        document().get_element_by_id(id).expect("fixture element")
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        self.root.remove();
    }
}

fn press(key: &str) {
    let init = KeyboardEventInit::new();
    init.set_key(key);
    init.set_bubbles(true);
    let event = KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init)
        .expect("keyboard event");
    document()
        .dispatch_event(event.unchecked_ref())
        .expect("dispatch keydown");
}

#[wasm_bindgen_test]
fn keydown_updates_display_and_hint() {
    let fixture = Fixture::new();
    let door = SpellDoor::mount(None).expect("mount");

    press("F");
    assert_eq!(
        fixture.element("pressed-key").text_content().as_deref(),
        Some("f")
    );
    assert!(fixture.element("key-display").class_list().contains("visible"));
    assert_eq!(door.display_state(), "visible");

    let hint = fixture.element("hint-field");
    let span = hint
        .query_selector("span")
        .expect("query")
        .expect("highlight span");
    assert_eq!(span.text_content().as_deref(), Some("f"));
    assert_eq!(hint.text_content().as_deref(), Some("friend - enter"));
}

#[wasm_bindgen_test]
fn unidentified_key_changes_nothing() {
    let fixture = Fixture::new();
    let door = SpellDoor::mount(None).expect("mount");

    press("Unidentified");
    assert_eq!(fixture.element("pressed-key").text_content().as_deref(), Some(""));
    assert_eq!(door.display_state(), "hidden");
}

#[wasm_bindgen_test]
fn destroyed_door_stops_listening() {
    let fixture = Fixture::new();
    let mut door = SpellDoor::mount(None).expect("mount");
    door.destroy();

    press("a");
    assert_eq!(fixture.element("pressed-key").text_content().as_deref(), Some(""));
}

#[wasm_bindgen_test]
fn session_id_is_a_uuid() {
    let _fixture = Fixture::new();
    let door = SpellDoor::mount(None).expect("mount");
    let id = door.session_id();
    assert_eq!(id.len(), 36);
    assert_eq!(id.matches('-').count(), 4);
}

#[wasm_bindgen_test]
fn missing_required_element_fails_mount() {
    let result = SpellDoor::mount(Some(r#"{"dom": {"pressed_key": "no-such-id"}}"#.to_owned()));
    assert!(result.is_err());
}
