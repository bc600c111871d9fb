//! A TodoMVC-style list editor built on `ripples-core`.
//!
//! The page is a static skeleton rendered once ([`page`]). Five reactions keep
//! it in sync with the store ([`reactions`]), and DOM handlers turn clicks and
//! key presses into `set_state` calls ([`handlers`]). Every change is written
//! to a [`storage::KeyValueStore`] by the store's on-change callback.

pub mod app;
pub mod config;
pub mod handlers;
pub mod model;
pub mod page;
pub mod reactions;
pub mod routing;
pub mod scheduler;
pub mod storage;
pub mod templates;

pub use app::TodoApp;
pub use config::AppConfig;
pub use model::{Filter, Key, Set, Todo, TodoState};
