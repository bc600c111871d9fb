//! Headless run: boots the app, replays a short session, prints the page.

use std::rc::Rc;

use ripples_todo::routing::Location;
use ripples_todo::storage::{KeyValueStore, MemoryStorage};
use ripples_todo::{AppConfig, TodoApp};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::default();
    let storage = Rc::new(MemoryStorage::new());
    let app = TodoApp::new(config.clone(), storage.clone(), Rc::new(Location::new("#/")))?;
    app.boot()?;
    app.settle();

    for text in ["water the plants", "buy milk", "write tests"] {
        app.submit(text);
    }
    if let Some(toggle) = app.item_part(1, ".toggle") {
        app.click(&toggle);
    }
    app.navigate("#/active");

    log::info!(
        "{} todo(s), {} active",
        app.store().read(|s| s.todos.len()),
        app.store().read(|s| s.active_count())
    );
    println!("{}", app.html());
    if let Some(saved) = storage.get_item(&config.storage_key) {
        println!("{saved}");
    }
    Ok(())
}
