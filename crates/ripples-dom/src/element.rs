use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::markup::{escape, is_void, strip_tags};
use crate::{DomError, Event, Fragment, Listener, ListenerId, Selector};

pub type ElementId = u64;

pub const CLASS_NAME: &str = "className";
pub const CHECKED: &str = "checked";
pub const VALUE: &str = "value";

thread_local! {
    static NEXT_ID: Cell<u64> = const { Cell::new(1) };
}

fn next_id() -> u64 {
    NEXT_ID.with(|n| {
        let id = n.get();
        n.set(id + 1);
        id
    })
}

/// Value assigned to an element property.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    Str(String),
    Bool(bool),
    Num(f64),
}

impl PropValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness the way a browser coerces a property to boolean.
    pub fn truthy(&self) -> bool {
        match self {
            PropValue::Str(s) => !s.is_empty(),
            PropValue::Bool(b) => *b,
            PropValue::Num(n) => *n != 0.0 && !n.is_nan(),
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Str(s) => f.write_str(s),
            PropValue::Bool(b) => write!(f, "{b}"),
            PropValue::Num(n) if n.is_finite() && n.fract() == 0.0 => write!(f, "{}", *n as i64),
            PropValue::Num(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        PropValue::Str(v.to_string())
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        PropValue::Str(v)
    }
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        PropValue::Bool(v)
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        PropValue::Num(v)
    }
}

impl From<i32> for PropValue {
    fn from(v: i32) -> Self {
        PropValue::Num(v.into())
    }
}

impl From<usize> for PropValue {
    fn from(v: usize) -> Self {
        PropValue::Num(v as f64)
    }
}

/// Child of an element: either an element or opaque raw markup.
#[derive(Clone, Debug)]
pub enum Node {
    Element(Element),
    Markup(String),
}

impl Node {
    pub fn to_html(&self) -> String {
        match self {
            Node::Element(e) => e.outer_html(),
            Node::Markup(m) => m.clone(),
        }
    }

    pub fn text_content(&self) -> String {
        match self {
            Node::Element(e) => e.text_content(),
            Node::Markup(m) => strip_tags(m),
        }
    }
}

#[derive(Clone)]
pub struct Element(Rc<Inner>);

struct Inner {
    id: ElementId,
    tag: String,
    props: RefCell<Vec<(String, PropValue)>>,
    style: RefCell<Vec<(String, String)>>,
    children: RefCell<Vec<Node>>,
    parent: RefCell<Weak<Inner>>,
    listeners: RefCell<Vec<(String, ListenerId, Listener)>>,
}

impl Element {
    /// Creates a detached element. Tag names must match `[A-Za-z][A-Za-z0-9-]*`.
    pub fn create(tag: &str) -> Result<Element, DomError> {
        let mut chars = tag.chars();
        let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid {
            return Err(DomError::InvalidTagName(tag.to_string()));
        }
        Ok(Element(Rc::new(Inner {
            id: next_id(),
            tag: tag.to_ascii_lowercase(),
            props: RefCell::new(Vec::new()),
            style: RefCell::new(Vec::new()),
            children: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
            listeners: RefCell::new(Vec::new()),
        })))
    }

    pub fn id(&self) -> ElementId {
        self.0.id
    }

    /// Lowercase tag name.
    pub fn tag(&self) -> &str {
        &self.0.tag
    }

    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    // Properties

    pub fn set_property(&self, name: &str, value: impl Into<PropValue>) {
        let value = value.into();
        let mut props = self.0.props.borrow_mut();
        match props.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => props.push((name.to_string(), value)),
        }
    }

    pub fn property(&self, name: &str) -> Option<PropValue> {
        self.0
            .props
            .borrow()
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    pub fn class_name(&self) -> String {
        self.property(CLASS_NAME)
            .map(|v| v.to_string())
            .unwrap_or_default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_name().split_whitespace().any(|c| c == class)
    }

    pub fn add_class(&self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let current = self.class_name();
        let next = if current.trim().is_empty() {
            class.to_string()
        } else {
            format!("{} {class}", current.trim())
        };
        self.set_property(CLASS_NAME, next);
    }

    pub fn remove_class(&self, class: &str) {
        let next: Vec<String> = self
            .class_name()
            .split_whitespace()
            .filter(|c| *c != class)
            .map(str::to_string)
            .collect();
        self.set_property(CLASS_NAME, next.join(" "));
    }

    pub fn checked(&self) -> bool {
        self.property(CHECKED).is_some_and(|v| v.truthy())
    }

    pub fn set_checked(&self, checked: bool) {
        self.set_property(CHECKED, checked);
    }

    pub fn value(&self) -> String {
        self.property(VALUE).map(|v| v.to_string()).unwrap_or_default()
    }

    pub fn set_value(&self, value: impl Into<String>) {
        self.set_property(VALUE, value.into());
    }

    pub fn style(&self, name: &str) -> Option<String> {
        self.0
            .style
            .borrow()
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    pub fn set_style(&self, name: &str, value: impl Into<String>) {
        let value = value.into();
        let mut style = self.0.style.borrow_mut();
        match style.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => style.push((name.to_string(), value)),
        }
    }

    // Tree

    pub fn parent(&self) -> Option<Element> {
        self.0.parent.borrow().upgrade().map(Element)
    }

    pub fn children(&self) -> Vec<Node> {
        self.0.children.borrow().clone()
    }

    pub fn child_elements(&self) -> Vec<Element> {
        self.0
            .children
            .borrow()
            .iter()
            .filter_map(|n| match n {
                Node::Element(e) => Some(e.clone()),
                Node::Markup(_) => None,
            })
            .collect()
    }

    /// Number of element siblings preceding this one.
    pub fn element_index(&self) -> usize {
        let Some(parent) = self.parent() else {
            return 0;
        };
        parent
            .child_elements()
            .iter()
            .position(|e| e.ptr_eq(self))
            .unwrap_or(0)
    }

    pub fn contains(&self, other: &Element) -> bool {
        let mut cur = Some(other.clone());
        while let Some(e) = cur {
            if e.ptr_eq(self) {
                return true;
            }
            cur = e.parent();
        }
        false
    }

    /// Appends `child`, detaching it from any previous parent first.
    pub fn append_child(&self, child: &Element) -> Result<(), DomError> {
        if child.contains(self) {
            return Err(DomError::HierarchyRequest {
                parent: self.tag().to_string(),
                child: child.tag().to_string(),
            });
        }
        child.detach();
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        self.0
            .children
            .borrow_mut()
            .push(Node::Element(child.clone()));
        Ok(())
    }

    /// Moves every node of `fragment` to the end of this element's children.
    pub fn append_fragment(&self, fragment: Fragment) -> Result<(), DomError> {
        for node in fragment.into_nodes() {
            match node {
                Node::Element(e) => self.append_child(&e)?,
                Node::Markup(m) => self.0.children.borrow_mut().push(Node::Markup(m)),
            }
        }
        Ok(())
    }

    pub fn detach(&self) {
        let Some(parent) = self.parent() else {
            return;
        };
        parent.0.children.borrow_mut().retain(|n| match n {
            Node::Element(e) => !e.ptr_eq(self),
            Node::Markup(_) => true,
        });
        *self.0.parent.borrow_mut() = Weak::new();
    }

    /// Replaces all children with raw, unescaped markup.
    pub fn set_inner_html(&self, markup: impl Into<String>) {
        self.clear();
        let markup = markup.into();
        if !markup.is_empty() {
            self.0.children.borrow_mut().push(Node::Markup(markup));
        }
    }

    pub fn clear(&self) {
        let old = std::mem::take(&mut *self.0.children.borrow_mut());
        for node in old {
            if let Node::Element(e) = node {
                *e.0.parent.borrow_mut() = Weak::new();
            }
        }
    }

    pub fn inner_html(&self) -> String {
        self.0.children.borrow().iter().map(Node::to_html).collect()
    }

    pub fn outer_html(&self) -> String {
        let mut out = format!("<{}", self.tag());
        for (name, value) in self.0.props.borrow().iter() {
            let attr = match name.as_str() {
                CLASS_NAME => "class",
                "htmlFor" => "for",
                other => other,
            };
            match value {
                PropValue::Bool(true) => {
                    out.push(' ');
                    out.push_str(attr);
                }
                PropValue::Bool(false) => {}
                v => out.push_str(&format!(" {attr}=\"{}\"", escape(&v.to_string()))),
            }
        }
        let style = self.0.style.borrow();
        if !style.is_empty() {
            let decl: Vec<String> = style.iter().map(|(k, v)| format!("{k}: {v}")).collect();
            out.push_str(&format!(" style=\"{}\"", escape(&decl.join("; "))));
        }
        out.push('>');
        if is_void(self.tag()) {
            return out;
        }
        out.push_str(&self.inner_html());
        out.push_str(&format!("</{}>", self.tag()));
        out
    }

    pub fn text_content(&self) -> String {
        self.0
            .children
            .borrow()
            .iter()
            .map(Node::text_content)
            .collect()
    }

    /// First descendant (pre-order) matching `selector`.
    pub fn query_selector(&self, selector: &str) -> Option<Element> {
        let sel = Selector::parse(selector)?;
        let mut found = None;
        self.walk(&mut |e| {
            if found.is_none() && sel.matches(e) {
                found = Some(e.clone());
            }
        });
        found
    }

    pub fn query_selector_all(&self, selector: &str) -> Vec<Element> {
        let Some(sel) = Selector::parse(selector) else {
            return Vec::new();
        };
        let mut found = Vec::new();
        self.walk(&mut |e| {
            if sel.matches(e) {
                found.push(e.clone());
            }
        });
        found
    }

    /// Descendant elements in document order, excluding `self`.
    pub fn descendants(&self) -> Vec<Element> {
        let mut found = Vec::new();
        self.walk(&mut |e| found.push(e.clone()));
        found
    }

    fn walk(&self, f: &mut dyn FnMut(&Element)) {
        for child in self.child_elements() {
            f(&child);
            child.walk(f);
        }
    }

    // Events

    pub fn add_event_listener(
        &self,
        name: &str,
        listener: impl Fn(&Event, &Element) + 'static,
    ) -> ListenerId {
        let id = next_id();
        self.0
            .listeners
            .borrow_mut()
            .push((name.to_string(), id, Rc::new(listener)));
        id
    }

    pub fn remove_event_listener(&self, name: &str, id: ListenerId) -> bool {
        let mut listeners = self.0.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(n, i, _)| !(n == name && *i == id));
        listeners.len() != before
    }

    /// Drops every listener on this element. Returns how many were removed.
    pub fn remove_all_listeners(&self) -> usize {
        let old = std::mem::take(&mut *self.0.listeners.borrow_mut());
        old.len()
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.0
            .listeners
            .borrow()
            .iter()
            .filter(|(n, _, _)| n == name)
            .count()
    }

    /// Runs listeners on this element, then on each ancestor if the event
    /// bubbles. Returns how many listeners ran.
    pub fn dispatch_event(&self, event: &Event) -> usize {
        event.set_target(self);
        let mut ran = 0;
        let mut current = Some(self.clone());
        while let Some(el) = current {
            let snapshot: Vec<Listener> = el
                .0
                .listeners
                .borrow()
                .iter()
                .filter(|(n, _, _)| n == event.name())
                .map(|(_, _, l)| l.clone())
                .collect();
            for listener in snapshot {
                listener(event, &el);
                ran += 1;
            }
            if !event.bubbles() || event.propagation_stopped() {
                break;
            }
            current = el.parent();
        }
        log::trace!("dispatched {:?} on {:?}: {ran} listener(s)", event.name(), self);
        ran
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = self.class_name();
        if class.is_empty() {
            write!(f, "<{}#{}>", self.tag(), self.id())
        } else {
            write!(f, "<{}#{} class={:?}>", self.tag(), self.id(), class)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_create_rejects_bad_tags() {
        assert!(Element::create("div").is_ok());
        assert!(Element::create("my-widget").is_ok());
        assert_eq!(
            Element::create("").unwrap_err(),
            DomError::InvalidTagName(String::new())
        );
        assert!(Element::create("1div").is_err());
        assert!(Element::create("di v").is_err());
    }

    #[test]
    fn test_class_list() {
        let li = Element::create("li").unwrap();
        li.add_class("completed");
        li.add_class("editing");
        li.add_class("editing");
        assert_eq!(li.class_name(), "completed editing");
        li.remove_class("completed");
        assert!(!li.has_class("completed"));
        assert!(li.has_class("editing"));
    }

    #[test]
    fn test_append_moves_between_parents() {
        let a = Element::create("div").unwrap();
        let b = Element::create("div").unwrap();
        let child = Element::create("span").unwrap();
        a.append_child(&child).unwrap();
        b.append_child(&child).unwrap();
        assert!(a.child_elements().is_empty());
        assert!(child.parent().unwrap().ptr_eq(&b));
    }

    #[test]
    fn test_append_rejects_cycles() {
        let outer = Element::create("div").unwrap();
        let inner = Element::create("div").unwrap();
        outer.append_child(&inner).unwrap();
        assert!(matches!(
            inner.append_child(&outer),
            Err(DomError::HierarchyRequest { .. })
        ));
        assert!(outer.append_child(&outer).is_err());
    }

    #[test]
    fn test_element_index_ignores_markup() {
        let ul = Element::create("ul").unwrap();
        ul.set_inner_html("text");
        let first = Element::create("li").unwrap();
        let second = Element::create("li").unwrap();
        ul.append_child(&first).unwrap();
        ul.append_child(&second).unwrap();
        assert_eq!(first.element_index(), 0);
        assert_eq!(second.element_index(), 1);
    }

    #[test]
    fn test_outer_html_serializes_properties() {
        let input = Element::create("input").unwrap();
        input.set_property(CLASS_NAME, "toggle");
        input.set_property("type", "checkbox");
        input.set_checked(true);
        assert_eq!(
            input.outer_html(),
            r#"<input class="toggle" type="checkbox" checked>"#
        );
        input.set_checked(false);
        assert_eq!(input.outer_html(), r#"<input class="toggle" type="checkbox">"#);
    }

    #[test]
    fn test_clear_detaches_children() {
        let ul = Element::create("ul").unwrap();
        let li = Element::create("li").unwrap();
        ul.append_child(&li).unwrap();
        ul.clear();
        assert!(li.parent().is_none());
        assert_eq!(ul.inner_html(), "");
    }

    #[test]
    fn test_query_selector() {
        let root = Element::create("section").unwrap();
        let ul = Element::create("ul").unwrap();
        ul.set_property(CLASS_NAME, "todo-list");
        let li = Element::create("li").unwrap();
        let edit = Element::create("input").unwrap();
        edit.set_property(CLASS_NAME, "edit");
        root.append_child(&ul).unwrap();
        ul.append_child(&li).unwrap();
        li.append_child(&edit).unwrap();

        assert!(root.query_selector(".todo-list").unwrap().ptr_eq(&ul));
        assert!(root.query_selector("input.edit").unwrap().ptr_eq(&edit));
        assert!(root.query_selector("button").is_none());
        assert_eq!(root.query_selector_all("li").len(), 1);
        assert!(!root.query_selector_all("section").iter().any(|e| e.ptr_eq(&root)));
    }

    #[test]
    fn test_dispatch_bubbles_with_target() {
        let ul = Element::create("ul").unwrap();
        let li = Element::create("li").unwrap();
        ul.append_child(&li).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = seen.clone();
        ul.add_event_listener("click", move |ev, current| {
            s.borrow_mut()
                .push((ev.target().unwrap().tag().to_string(), current.tag().to_string()));
        });
        assert_eq!(li.dispatch_event(&Event::click()), 1);
        assert_eq!(*seen.borrow(), vec![("li".to_string(), "ul".to_string())]);
    }

    #[test]
    fn test_synthetic_events_do_not_bubble() {
        let ul = Element::create("ul").unwrap();
        let li = Element::create("li").unwrap();
        ul.append_child(&li).unwrap();
        ul.add_event_listener("updatetodos", |_, _| {});
        assert_eq!(li.dispatch_event(&Event::new("updatetodos")), 0);
    }

    #[test]
    fn test_stop_propagation_and_remove() {
        let ul = Element::create("ul").unwrap();
        let li = Element::create("li").unwrap();
        ul.append_child(&li).unwrap();
        let id = li.add_event_listener("click", |ev, _| ev.stop_propagation());
        ul.add_event_listener("click", |_, _| panic!("should not bubble"));
        assert_eq!(li.dispatch_event(&Event::click()), 1);

        assert!(li.remove_event_listener("click", id));
        assert_eq!(li.listener_count("click"), 0);
    }

    #[test]
    fn test_descendants_and_remove_all_listeners() {
        let ul = Element::create("ul").unwrap();
        let li = Element::create("li").unwrap();
        let span = Element::create("span").unwrap();
        ul.append_child(&li).unwrap();
        li.append_child(&span).unwrap();
        let tags: Vec<String> = ul.descendants().iter().map(|e| e.tag().to_string()).collect();
        assert_eq!(tags, vec!["li", "span"]);

        li.add_event_listener("click", |_, _| {});
        li.add_event_listener("keyup", |_, _| {});
        assert_eq!(li.remove_all_listeners(), 2);
        assert_eq!(li.dispatch_event(&Event::click()), 0);
    }
}
