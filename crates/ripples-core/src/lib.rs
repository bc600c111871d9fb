//! # Store, Ripples, and Templates
//!
//! Ripples is a deliberately small reactive layer over a DOM host. There are
//! three pieces:
//!
//! - [`Store`]: owns the application state; the only way to change it is
//!   [`Store::set_state`].
//! - [`Store::ripple`]: binds a state slice to elements and a reaction.
//! - [`render`]: turns [`Template`] descriptors into a detached [`Fragment`].
//!
//! ## Slices
//!
//! State is a plain struct whose top-level fields are named by a `Slice`
//! enum. Every slice owns one notification channel, whose event name is
//! `"update" + key`:
//!
//! ```rust
//! use ripples_core::*;
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
//! enum Key { Count }
//!
//! impl Slice for Key {
//!     const ALL: &'static [Self] = &[Key::Count];
//!     fn key(self) -> &'static str { "count" }
//! }
//!
//! struct Counter { count: u32 }
//! enum Set { Count(u32) }
//!
//! impl State for Counter {
//!     type Slice = Key;
//!     type Update = Set;
//!     fn apply(&mut self, update: Set) -> Key {
//!         match update { Set::Count(n) => { self.count = n; Key::Count } }
//!     }
//! }
//!
//! let store = Store::new(Counter { count: 0 });
//! let label = Element::create("span")?;
//! store.ripple(Key::Count, &label, |store, el| {
//!     el.set_inner_html(store.state().count.to_string());
//!     Ok(())
//! });
//! store.set_state([Set::Count(3)])?;
//! assert_eq!(label.text_content(), "3");
//! assert_eq!(Key::Count.event_name(), "updatecount");
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Notification order
//!
//! Updates in a patch are applied one at a time. After each one, every
//! reaction subscribed to that slice runs in registration order, so a
//! reaction sees earlier updates of the same patch but not later ones. The
//! on-change callback runs once per `set_state` call, after all updates.
//!
//! Reactions may call `set_state` again; the nested call completes before the
//! outer one continues. Nesting deeper than [`StoreBuilder::max_depth`] is
//! refused with [`StoreError::ReentrancyLimit`].
//!
//! ## Templates
//!
//! ```rust
//! use ripples_core::*;
//!
//! let frag = render(&[node("ul", NO_PROPS, vec![
//!     node("li", [("className", "done")], "a"),
//!     node("li", NO_PROPS, "b"),
//! ])])?;
//! assert_eq!(frag.to_html(), r#"<ul><li class="done">a</li><li>b</li></ul>"#);
//! # Ok::<(), DomError>(())
//! ```

pub mod error;
pub mod registry;
pub mod slice;
pub mod store;
pub mod targets;
pub mod template;

pub use error::*;
pub use registry::*;
pub use slice::*;
pub use store::*;
pub use targets::*;
pub use template::*;

pub use ripples_dom::{DomError, Element, Event, Fragment, Node, PropValue};
