use anyhow::Context;
use ripples_core::{Element, Template, render};

use crate::model::Filter;

/// The static page plus handles to the elements the app talks to.
#[derive(Clone, Debug)]
pub struct Page {
    /// Document root; stands in for `window` as the last bubbling stop.
    pub root: Element,
    pub input: Element,
    pub list: Element,
    pub main: Element,
    pub footer: Element,
    pub toggle: Element,
    pub counter: Element,
    /// Filter `li`s in All, Active, Completed order.
    pub filters: [Element; 3],
    pub clear: Element,
}

fn filter_link(filter: Filter, label: &str) -> Template {
    Template::new("li").children(vec![
        Template::new("a")
            .class(if filter == Filter::All { "selected" } else { "" })
            .prop("href", filter.hash())
            .markup(label),
    ])
}

pub fn skeleton() -> Vec<Template> {
    vec![Template::new("section").class("todoapp").children(vec![
        Template::new("header").class("header").children(vec![
            Template::new("h1").markup("todos"),
            Template::new("input")
                .class("new-todo")
                .prop("placeholder", "What needs to be done?")
                .prop("autofocus", true),
        ]),
        Template::new("section").class("main").children(vec![
            Template::new("input")
                .prop("id", "toggle-all")
                .class("toggle-all")
                .prop("type", "checkbox"),
            Template::new("label")
                .prop("htmlFor", "toggle-all")
                .markup("Mark all as complete"),
            Template::new("ul").class("todo-list"),
        ]),
        Template::new("footer").class("footer").children(vec![
            Template::new("span").class("todo-count"),
            Template::new("ul").class("filters").children(vec![
                filter_link(Filter::All, "All"),
                filter_link(Filter::Active, "Active"),
                filter_link(Filter::Completed, "Completed"),
            ]),
            Template::new("button")
                .class("clear-completed")
                .markup("Clear completed"),
        ]),
    ])]
}

impl Page {
    pub fn build() -> anyhow::Result<Self> {
        let root = Element::create("body")?;
        root.append_fragment(render(&skeleton())?)?;

        let find = |selector: &str| {
            root.query_selector(selector)
                .with_context(|| format!("page has no {selector:?}"))
        };
        let filters = find("ul.filters")?.child_elements();
        let [all, active, completed] = <[Element; 3]>::try_from(filters)
            .map_err(|f| anyhow::anyhow!("expected 3 filters, found {}", f.len()))?;

        Ok(Self {
            input: find(".new-todo")?,
            list: find(".todo-list")?,
            main: find(".main")?,
            footer: find(".footer")?,
            toggle: find(".toggle-all")?,
            counter: find(".todo-count")?,
            filters: [all, active, completed],
            clear: find(".clear-completed")?,
            root,
        })
    }

    /// Removes every listener on the page. Handlers hold the page through
    /// their context, so this is what lets a discarded app be freed.
    pub fn teardown(&self) -> usize {
        let mut removed = self.root.remove_all_listeners();
        for el in self.root.descendants() {
            removed += el.remove_all_listeners();
        }
        removed
    }
}
