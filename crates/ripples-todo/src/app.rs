use std::rc::Rc;

use ripples_core::{Element, Event, Store};
use ripples_dom::POPSTATE;

use crate::config::AppConfig;
use crate::handlers::{self, Ctx};
use crate::model::{Filter, Set, TodoState};
use crate::page::Page;
use crate::reactions::{self, TodoStore};
use crate::routing::Location;
use crate::scheduler::Scheduler;
use crate::storage::{self, KeyValueStore, Persister};

/// The wired application: page, store, reactions and handlers.
pub struct TodoApp {
    ctx: Ctx,
    storage: Rc<dyn KeyValueStore>,
}

impl TodoApp {
    pub fn new(
        config: AppConfig,
        storage: Rc<dyn KeyValueStore>,
        location: Rc<Location>,
    ) -> anyhow::Result<Self> {
        let page = Page::build()?;

        let persister = Persister::new(storage.clone(), config.storage_key.clone());
        let store = Store::with_on_change(TodoState::default(), move |store: &TodoStore| {
            if let Err(err) = store.read(|s| persister.persist(s)) {
                log::warn!("could not persist todos: {err:#}");
            }
        });

        reactions::wire(&store, &page);
        let ctx = Ctx::new(store, page, Rc::new(Scheduler::new()), location, config);
        handlers::wire(&ctx);
        Ok(Self { ctx, storage })
    }

    /// Restores persisted todos (or starts empty), then syncs the filter with
    /// the location hash on the next tick.
    pub fn boot(&self) -> anyhow::Result<()> {
        let key = &self.ctx.config.storage_key;
        let patch = match storage::load(self.storage.as_ref(), key) {
            Ok(Some(snapshot)) => {
                log::info!("restored {} todo(s)", snapshot.todos.len());
                vec![Set::Todos(snapshot.todos), Set::Filter(snapshot.filter)]
            }
            Ok(None) => vec![Set::Todos(Vec::new()), Set::Filter(Filter::All)],
            Err(err) => {
                log::warn!("ignoring stored todos: {err:#}");
                vec![Set::Todos(Vec::new()), Set::Filter(Filter::All)]
            }
        };
        self.ctx.store.set_state(patch)?;
        handlers::on_filter(&self.ctx);
        Ok(())
    }

    pub fn store(&self) -> &TodoStore {
        &self.ctx.store
    }

    pub fn page(&self) -> &Page {
        &self.ctx.page
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.ctx.scheduler
    }

    /// Runs deferred callbacks that are due.
    pub fn settle(&self) -> usize {
        self.ctx.scheduler.run_pending()
    }

    // Scripted input, the way a user would produce it.

    pub fn type_text(&self, text: &str) {
        let input = &self.ctx.page.input;
        input.set_value(text);
        let key = text.chars().last().map(String::from).unwrap_or_default();
        input.dispatch_event(&Event::keyup(key));
    }

    pub fn submit(&self, text: &str) {
        let input = &self.ctx.page.input;
        input.set_value(text);
        input.dispatch_event(&Event::keyup("Enter"));
    }

    pub fn click(&self, el: &Element) {
        el.dispatch_event(&Event::click());
        self.settle();
    }

    /// Clicks toggle-all, flipping it first as the browser would.
    pub fn click_toggle_all(&self) {
        let toggle = &self.ctx.page.toggle;
        toggle.set_checked(!toggle.checked());
        self.click(toggle);
    }

    /// History navigation: changes the hash, then fires `popstate`.
    pub fn navigate(&self, hash: &str) {
        self.ctx.location.set_hash(hash);
        self.ctx.page.root.dispatch_event(&Event::bubbling(POPSTATE));
        self.settle();
    }

    /// Rendered `li` at `position` in the visible list.
    pub fn item(&self, position: usize) -> Option<Element> {
        self.ctx.page.list.child_elements().get(position).cloned()
    }

    pub fn item_part(&self, position: usize, selector: &str) -> Option<Element> {
        self.item(position)?.query_selector(selector)
    }

    pub fn html(&self) -> String {
        self.ctx.page.root.outer_html()
    }
}

// Page listeners hold the context, which holds the page and the store.
impl Drop for TodoApp {
    fn drop(&mut self) {
        let timers = self.ctx.scheduler.clear_all();
        let listeners = self.ctx.page.teardown();
        log::debug!("app dropped: {listeners} listener(s), {timers} timer(s) released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Todo;
    use crate::storage::MemoryStorage;
    use insta::assert_snapshot;

    fn app_with(storage: Rc<MemoryStorage>, hash: &str) -> TodoApp {
        let app = TodoApp::new(AppConfig::default(), storage, Rc::new(Location::new(hash))).unwrap();
        app.boot().unwrap();
        app.settle();
        app
    }

    fn app() -> (TodoApp, Rc<MemoryStorage>) {
        let storage = Rc::new(MemoryStorage::new());
        (app_with(storage.clone(), ""), storage)
    }

    fn texts(app: &TodoApp) -> Vec<String> {
        app.page()
            .list
            .query_selector_all("label")
            .iter()
            .map(Element::text_content)
            .collect()
    }

    #[test]
    fn test_boot_empty_hides_main_and_footer() {
        let (app, _) = app();
        assert_eq!(app.page().main.style("display").as_deref(), Some("none"));
        assert_eq!(app.page().footer.style("display").as_deref(), Some("none"));
        assert_eq!(app.page().counter.text_content(), "0 items left");
    }

    #[test]
    fn test_add_prepends_trimmed_and_clears_input() {
        let (app, _) = app();
        app.submit("  buy milk ");
        app.submit("walk dog");
        assert_eq!(texts(&app), vec!["walk dog", "buy milk"]);
        assert_eq!(app.page().input.value(), "");
        assert_eq!(app.page().main.style("display").as_deref(), Some("block"));
        assert_eq!(app.page().counter.text_content(), "2 items left");
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let (app, _) = app();
        app.submit("   ");
        assert!(app.store().state().todos.is_empty());
    }

    #[test]
    fn test_typing_updates_draft_text() {
        let (app, _) = app();
        app.type_text("bu");
        assert_eq!(app.store().state().text, "bu");
        app.submit("buy");
        assert_eq!(app.store().state().text, "");
    }

    #[test]
    fn test_toggle_and_destroy() {
        let (app, _) = app();
        app.submit("a");
        app.submit("b");
        app.click(&app.item_part(1, ".toggle").unwrap());

        assert!(app.store().state().todos[1].completed);
        assert!(app.item(1).unwrap().has_class("completed"));
        assert_eq!(app.page().counter.text_content(), "1 item left");

        app.click(&app.item_part(0, ".destroy").unwrap());
        assert_eq!(texts(&app), vec!["a"]);
    }

    #[test]
    fn test_toggle_all_and_highlight() {
        let (app, _) = app();
        app.submit("a");
        app.submit("b");
        assert!(!app.page().toggle.checked());

        app.click_toggle_all();
        assert!(app.store().state().all_completed());
        assert!(app.page().toggle.checked());

        app.click_toggle_all();
        assert_eq!(app.store().state().active_count(), 2);
        assert!(!app.page().toggle.checked());
    }

    #[test]
    fn test_clear_completed() {
        let (app, _) = app();
        app.submit("a");
        app.submit("b");
        app.click(&app.item_part(0, ".toggle").unwrap());
        app.click(&app.page().clear.clone());
        assert_eq!(texts(&app), vec!["a"]);
    }

    #[test]
    fn test_filter_links_and_history() {
        let (app, _) = app();
        app.submit("a");
        app.submit("b");
        app.click(&app.item_part(0, ".toggle").unwrap());

        let active_link = app.page().filters[1].query_selector("a").unwrap();
        app.click(&active_link);
        assert_eq!(app.store().state().filter, Filter::Active);
        assert_eq!(texts(&app), vec!["a"]);
        assert!(active_link.has_class("selected"));
        let all_link = app.page().filters[0].query_selector("a").unwrap();
        assert!(!all_link.has_class("selected"));

        app.navigate("#/completed");
        assert_eq!(texts(&app), vec!["b"]);
        app.navigate("#/");
        assert_eq!(texts(&app), vec!["b", "a"]);
        assert!(all_link.has_class("selected"));
    }

    #[test]
    fn test_actions_under_filter_hit_the_right_todo() {
        let (app, _) = app();
        app.submit("a");
        app.submit("b");
        app.submit("c");
        // todos: c, b, a; complete b
        app.click(&app.item_part(1, ".toggle").unwrap());
        app.navigate("#/active");
        assert_eq!(texts(&app), vec!["c", "a"]);

        app.click(&app.item_part(1, ".destroy").unwrap());
        let left: Vec<String> = app.store().read(|s| s.todos.iter().map(|t| t.text.clone()).collect());
        assert_eq!(left, vec!["c", "b"]);
    }

    #[test]
    fn test_double_click_edit_commits_on_enter() {
        let (app, _) = app();
        app.submit("buy milk");
        let label = app.item_part(0, "label").unwrap();
        app.click(&label);
        app.click(&label);
        let item = app.item(0).unwrap();
        assert!(item.has_class("editing"));

        let edit = item.query_selector(".edit").unwrap();
        edit.set_value("buy oat milk");
        edit.dispatch_event(&Event::keyup("Enter"));
        assert_eq!(app.store().state().todos[0].text, "buy oat milk");
        assert!(!app.item(0).unwrap().has_class("editing"));
    }

    #[test]
    fn test_click_outside_commits_edit() {
        let (app, _) = app();
        app.submit("x");
        let label = app.item_part(0, "label").unwrap();
        app.click(&label);
        app.click(&label);
        let edit = app.item_part(0, ".edit").unwrap();
        edit.set_value("y");

        // Clicking inside the field keeps editing.
        app.click(&edit);
        assert_eq!(app.store().state().todos[0].text, "x");

        app.click(&app.page().counter.clone());
        assert_eq!(app.store().state().todos[0].text, "y");
    }

    #[test]
    fn test_destroying_another_item_keeps_the_edit_on_its_todo() {
        let (app, _) = app();
        for text in ["a", "b", "c"] {
            app.submit(text);
        }
        let label = app.item_part(1, "label").unwrap();
        app.click(&label);
        app.click(&label);
        app.item_part(1, ".edit").unwrap().set_value("B edited");

        app.click(&app.item_part(0, ".destroy").unwrap());
        let left: Vec<String> = app.store().read(|s| s.todos.iter().map(|t| t.text.clone()).collect());
        assert_eq!(left, vec!["B edited", "a"]);
    }

    #[test]
    fn test_destroying_the_edited_item_drops_the_edit() {
        let (app, _) = app();
        app.submit("a");
        app.submit("b");
        let label = app.item_part(0, "label").unwrap();
        app.click(&label);
        app.click(&label);
        app.item_part(0, ".edit").unwrap().set_value("lost");

        app.click(&app.item_part(0, ".destroy").unwrap());
        assert_eq!(texts(&app), vec!["a"]);
    }

    #[test]
    fn test_slow_clicks_do_not_edit() {
        let (app, _) = app();
        app.submit("x");
        let label = app.item_part(0, "label").unwrap();
        app.click(&label);
        app.scheduler().advance(400);
        app.click(&label);
        assert!(!app.item(0).unwrap().has_class("editing"));
    }

    #[test]
    fn test_completed_items_are_not_editable() {
        let (app, _) = app();
        app.submit("x");
        app.click(&app.item_part(0, ".toggle").unwrap());
        let label = app.item_part(0, "label").unwrap();
        app.click(&label);
        app.click(&label);
        assert!(!app.item(0).unwrap().has_class("editing"));
    }

    #[test]
    fn test_every_change_is_persisted_and_restored() {
        let (app, storage) = app();
        app.submit("buy milk");
        app.click(&app.item_part(0, ".toggle").unwrap());

        let restored = app_with(storage, "#/completed");
        assert_eq!(
            restored.store().state().todos,
            vec![Todo {
                text: "buy milk".into(),
                completed: true
            }]
        );
        assert_eq!(restored.store().state().filter, Filter::Completed);
        assert_eq!(texts(&restored), vec!["buy milk"]);
    }

    #[derive(Default)]
    struct CountingStorage {
        inner: MemoryStorage,
        writes: std::cell::Cell<usize>,
    }

    impl KeyValueStore for CountingStorage {
        fn get_item(&self, key: &str) -> Option<String> {
            self.inner.get_item(key)
        }

        fn set_item(&self, key: &str, value: String) {
            self.writes.set(self.writes.get() + 1);
            self.inner.set_item(key, value);
        }
    }

    #[test]
    fn test_typing_does_not_rewrite_storage() {
        let storage = Rc::new(CountingStorage::default());
        let app = TodoApp::new(AppConfig::default(), storage.clone(), Rc::new(Location::new(""))).unwrap();
        app.boot().unwrap();
        app.settle();
        let after_boot = storage.writes.get();

        app.type_text("b");
        app.type_text("bu");
        assert_eq!(storage.writes.get(), after_boot);

        app.submit("buy");
        assert_eq!(storage.writes.get(), after_boot + 1);
    }

    #[test]
    fn test_dropping_the_app_releases_page_listeners() {
        let (app, _) = app();
        let page = app.page().clone();
        assert!(page.list.listener_count(ripples_dom::CLICK) > 0);
        drop(app);
        assert_eq!(page.list.listener_count(ripples_dom::CLICK), 0);
        assert_eq!(page.root.listener_count(POPSTATE), 0);
    }

    #[test]
    fn test_hash_wins_over_persisted_filter() {
        let storage = Rc::new(MemoryStorage::new());
        storage.set_item("todos-ripples", r#"{"todos":[],"filter":2}"#.into());
        let app = app_with(storage, "#/");
        assert_eq!(app.store().state().filter, Filter::All);
    }

    #[test]
    fn test_corrupt_storage_starts_empty() {
        let storage = Rc::new(MemoryStorage::new());
        storage.set_item("todos-ripples", "][".into());
        let app = app_with(storage, "");
        assert!(app.store().state().todos.is_empty());
    }

    #[test]
    fn test_rendered_list_markup() {
        let (app, _) = app();
        app.submit("a & b");
        assert_snapshot!(
            app.page().list.inner_html(),
            @r#"<li class=""><div class="view"><input class="toggle" type="checkbox"><label>a &amp; b</label><button class="destroy"></button></div><input class="edit" value="a &amp; b"></li>"#
        );
    }
}
