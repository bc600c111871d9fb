//! Event handlers: translate DOM events into `set_state` calls.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ripples_dom::{CLICK, Element, Event, KEYUP, ListenerId, POPSTATE};

use crate::config::AppConfig;
use crate::model::{Filter, Set, Todo};
use crate::page::Page;
use crate::reactions::TodoStore;
use crate::routing::Location;
use crate::scheduler::{Scheduler, TimerId};

/// Everything a handler may touch. Cheap to clone.
#[derive(Clone)]
pub struct Ctx {
    pub store: TodoStore,
    pub page: Page,
    pub scheduler: Rc<Scheduler>,
    pub location: Rc<Location>,
    pub config: AppConfig,
    clicks: Rc<ClickState>,
}

// Label double-click detection.
#[derive(Default)]
struct ClickState {
    armed: Cell<bool>,
    timer: Cell<Option<TimerId>>,
}

impl Ctx {
    pub fn new(
        store: TodoStore,
        page: Page,
        scheduler: Rc<Scheduler>,
        location: Rc<Location>,
        config: AppConfig,
    ) -> Self {
        Self {
            store,
            page,
            scheduler,
            location,
            config,
            clicks: Rc::default(),
        }
    }

    fn commit(&self, patch: impl IntoIterator<Item = Set>) {
        if let Err(err) = self.store.set_state(patch) {
            log::error!("state update rejected: {err}");
        }
    }

    fn todos(&self) -> Vec<Todo> {
        self.store.read(|s| s.todos.clone())
    }
}

pub fn on_input_keyup(ctx: &Ctx, event: &Event, input: &Element) {
    let value = input.value();
    if !event.is_enter() {
        ctx.commit([Set::Text(value)]);
        return;
    }
    let text = value.trim();
    if text.is_empty() {
        return;
    }
    let mut todos = vec![Todo::new(text)];
    todos.extend(ctx.todos());
    input.set_value("");
    ctx.commit([Set::Todos(todos), Set::Text(String::new())]);
}

/// Delegated click handler on the list: destroy, toggle, or edit an item.
pub fn on_list_click(ctx: &Ctx, event: &Event) {
    let Some(target) = event.target() else {
        return;
    };
    let Some(view) = target.parent().filter(|p| p.tag() == "div") else {
        return;
    };
    let Some(item) = view.parent() else {
        return;
    };
    let position = item.element_index();
    let Some(index) = ctx.store.read(|s| s.index_of_visible(position)) else {
        log::warn!("click on list item {position}, which has no todo");
        return;
    };

    match target.tag() {
        "button" => {
            let mut todos = ctx.todos();
            todos.remove(index);
            ctx.commit([Set::Todos(todos)]);
        }
        "input" => {
            let mut todos = ctx.todos();
            todos[index].completed = !todos[index].completed;
            ctx.commit([Set::Todos(todos)]);
        }
        "label" => on_label_click(ctx, &item, index),
        _ => {}
    }
}

fn on_label_click(ctx: &Ctx, item: &Element, index: usize) {
    let clicks = &ctx.clicks;
    if clicks.timer.get().is_none() {
        clicks.armed.set(true);
        let c = clicks.clone();
        let id = ctx.scheduler.set_timeout(ctx.config.double_click_ms, move || {
            c.armed.set(false);
            c.timer.set(None);
        });
        clicks.timer.set(Some(id));
        return;
    }
    if clicks.armed.get() && !item.has_class("completed") {
        if let Some(id) = clicks.timer.take() {
            ctx.scheduler.clear_timeout(id);
        }
        clicks.armed.set(false);
        start_editing(ctx, item, index);
    }
}

struct EditSession {
    ctx: Ctx,
    item: Element,
    input: Element,
    // Where the todo was, and what it held, when editing started.
    index: usize,
    original: Todo,
    listeners: RefCell<Option<(ListenerId, ListenerId)>>,
    done: Cell<bool>,
}

impl EditSession {
    // Listeners go in after the current click has finished bubbling, so the
    // click that started editing does not immediately end it.
    fn arm(self: &Rc<Self>) {
        let s = self.clone();
        let off = self.ctx.page.root.add_event_listener(CLICK, move |event, _| {
            if !event.target().is_some_and(|t| t.ptr_eq(&s.input)) {
                s.stop();
            }
        });
        let s = self.clone();
        let submit = self.input.add_event_listener(KEYUP, move |event, _| {
            if event.is_enter() {
                s.stop();
            }
        });
        *self.listeners.borrow_mut() = Some((off, submit));
    }

    fn stop(&self) {
        if self.done.replace(true) {
            return;
        }
        if let Some((off, submit)) = self.listeners.borrow_mut().take() {
            self.ctx.page.root.remove_event_listener(CLICK, off);
            self.input.remove_event_listener(KEYUP, submit);
        }
        let mut todos = self.ctx.todos();
        let Some(index) = self.resolve(&todos) else {
            log::warn!("edited todo {:?} no longer exists", self.original.text);
            return;
        };
        todos[index].text = self.input.value();
        self.ctx.commit([Set::Todos(todos)]);
    }

    // The list may have changed since editing started. While the item is
    // still on the page its position is authoritative; once the list has been
    // re-rendered, fall back to the matching todo nearest the old index.
    fn resolve(&self, todos: &[Todo]) -> Option<usize> {
        if self
            .item
            .parent()
            .is_some_and(|p| p.ptr_eq(&self.ctx.page.list))
        {
            let position = self.item.element_index();
            return self.ctx.store.read(|s| s.index_of_visible(position));
        }
        todos
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == self.original)
            .min_by_key(|(i, _)| i.abs_diff(self.index))
            .map(|(i, _)| i)
    }
}

fn start_editing(ctx: &Ctx, item: &Element, index: usize) {
    let Some(input) = item.query_selector(".edit") else {
        log::warn!("todo item without an edit field");
        return;
    };
    let Some(original) = ctx.store.read(|s| s.todos.get(index).cloned()) else {
        return;
    };
    item.add_class("editing");
    let session = Rc::new(EditSession {
        ctx: ctx.clone(),
        item: item.clone(),
        input,
        index,
        original,
        listeners: RefCell::new(None),
        done: Cell::new(false),
    });
    ctx.scheduler.defer(move || session.arm());
}

pub fn on_clear(ctx: &Ctx) {
    let todos = ctx.todos().into_iter().filter(|t| !t.completed).collect();
    ctx.commit([Set::Todos(todos)]);
}

/// Reads the hash once navigation has settled and switches filter if needed.
pub fn on_filter(ctx: &Ctx) {
    let c = ctx.clone();
    ctx.scheduler.defer(move || {
        let filter = Filter::from_hash(&c.location.hash());
        if c.store.read(|s| s.filter) != filter {
            c.commit([Set::Filter(filter)]);
        }
    });
}

/// Applies the toggle-all checkbox state once its click has settled.
pub fn on_toggle_all(ctx: &Ctx) {
    let c = ctx.clone();
    ctx.scheduler.defer(move || {
        let checked = c.page.toggle.checked();
        let todos = c
            .todos()
            .into_iter()
            .map(|t| Todo {
                completed: checked,
                ..t
            })
            .collect();
        c.commit([Set::Todos(todos)]);
    });
}

pub fn wire(ctx: &Ctx) {
    let page = &ctx.page;

    let c = ctx.clone();
    page.list
        .add_event_listener(CLICK, move |event, _| on_list_click(&c, event));
    let c = ctx.clone();
    page.clear.add_event_listener(CLICK, move |_, _| on_clear(&c));
    let c = ctx.clone();
    page.input
        .add_event_listener(KEYUP, move |event, input| on_input_keyup(&c, event, input));
    for item in &page.filters {
        // Default action of the anchor: follow its href.
        if let Some(anchor) = item.query_selector("a") {
            let location = ctx.location.clone();
            anchor.add_event_listener(CLICK, move |_, a| {
                if let Some(href) = a.property("href") {
                    location.follow(&href.to_string());
                }
            });
        }
        let c = ctx.clone();
        item.add_event_listener(CLICK, move |_, _| on_filter(&c));
    }
    let c = ctx.clone();
    page.toggle
        .add_event_listener(CLICK, move |_, _| on_toggle_all(&c));
    let c = ctx.clone();
    page.root
        .add_event_listener(POPSTATE, move |_, _| on_filter(&c));
}
