use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::Element;

pub type ListenerId = u64;

/// Native listener. Receives the event and the element it is attached to
/// (the "current target"), which differs from `event.target()` while bubbling.
pub type Listener = Rc<dyn Fn(&Event, &Element)>;

pub const CLICK: &str = "click";
pub const KEYUP: &str = "keyup";
pub const POPSTATE: &str = "popstate";

#[derive(Debug)]
pub struct Event {
    name: String,
    bubbles: bool,
    key: Option<String>,
    target: RefCell<Option<Element>>,
    stopped: Cell<bool>,
}

impl Event {
    /// Synthetic event. Like `new Event(name)` in a browser it does not bubble.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bubbles: false,
            key: None,
            target: RefCell::new(None),
            stopped: Cell::new(false),
        }
    }

    pub fn bubbling(name: impl Into<String>) -> Self {
        Self {
            bubbles: true,
            ..Self::new(name)
        }
    }

    pub fn click() -> Self {
        Self::bubbling(CLICK)
    }

    pub fn keyup(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::bubbling(KEYUP)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    /// Key name for keyboard events (`"Enter"`, `"a"`, ...).
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn is_enter(&self) -> bool {
        self.key() == Some("Enter")
    }

    /// Element the event was dispatched on. `None` before dispatch.
    pub fn target(&self) -> Option<Element> {
        self.target.borrow().clone()
    }

    pub fn stop_propagation(&self) {
        self.stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.stopped.get()
    }

    pub(crate) fn set_target(&self, target: &Element) {
        *self.target.borrow_mut() = Some(target.clone());
    }
}
