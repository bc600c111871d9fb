//! Reactions: re-render or restyle one element from the current state.

use anyhow::Context;
use ripples_core::{Element, Store, Template, render};

use crate::model::{Key, TodoState};
use crate::page::Page;
use crate::templates;

pub type TodoStore = Store<TodoState>;

pub fn list(store: &TodoStore, el: &Element) -> anyhow::Result<()> {
    let items: Vec<Template> = store.read(|s| {
        s.visible()
            .map(|(_, todo)| templates::todo_item(todo))
            .collect()
    });
    let fragment = render(&items).context("rendering todo list")?;
    el.clear();
    el.append_fragment(fragment)?;
    Ok(())
}

/// Hides main and footer while there are no todos.
pub fn display(store: &TodoStore, el: &Element) -> anyhow::Result<()> {
    let len = store.read(|s| s.todos.len());
    let display = el.style("display");
    if len == 0 && display.as_deref() != Some("none") {
        el.set_style("display", "none");
    } else if len > 0 && display.as_deref() != Some("block") {
        el.set_style("display", "block");
    }
    Ok(())
}

pub fn count(store: &TodoStore, el: &Element) -> anyhow::Result<()> {
    let active = store.read(|s| s.active_count());
    let fragment = render(&templates::counter(active))?;
    el.clear();
    el.append_fragment(fragment)?;
    Ok(())
}

/// Marks the anchor of the filter item whose position matches the filter.
pub fn selected_filter(store: &TodoStore, el: &Element) -> anyhow::Result<()> {
    let position = el.element_index();
    let anchor = el.query_selector("a").context("filter item without an anchor")?;
    let current = store.read(|s| s.filter.index());
    let selected = anchor.has_class("selected");
    if position == current && !selected {
        anchor.add_class("selected");
    } else if position != current && selected {
        anchor.remove_class("selected");
    }
    Ok(())
}

/// Checks toggle-all exactly when every todo is completed.
pub fn highlight_toggle(store: &TodoStore, el: &Element) -> anyhow::Result<()> {
    let all = store.read(|s| s.all_completed());
    if all != el.checked() {
        el.set_checked(all);
    }
    Ok(())
}

pub fn wire(store: &TodoStore, page: &Page) {
    store.ripple([Key::Todos, Key::Filter], &page.list, list);
    store.ripple(Key::Todos, [&page.main, &page.footer], display);
    store.ripple(Key::Todos, &page.counter, count);
    store.ripple(Key::Todos, &page.toggle, highlight_toggle);
    store.ripple(Key::Filter, page.filters.as_slice(), selected_filter);
}
