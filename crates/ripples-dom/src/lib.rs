//! # Host DOM
//!
//! A small, headless document model used as the host for `ripples-core`.
//! It covers exactly what the store and renderer need from a browser:
//!
//! - [`Element`]: a cheaply cloneable handle to a node with typed
//!   properties, children and event listeners.
//! - [`Fragment`]: an ordered, detached list of nodes produced by rendering.
//! - [`Event`]: a named event that optionally bubbles to ancestors.
//!
//! ```rust
//! use ripples_dom::*;
//!
//! let list = Element::create("ul")?;
//! let item = Element::create("li")?;
//! item.set_inner_html("milk");
//! list.append_child(&item)?;
//! assert_eq!(list.outer_html(), "<ul><li>milk</li></ul>");
//! # Ok::<(), DomError>(())
//! ```
//!
//! Raw markup assigned through [`Element::set_inner_html`] is kept opaque: it
//! is serialized verbatim and contributes to [`Element::text_content`], but it
//! is never parsed into child elements.

pub mod element;
pub mod error;
pub mod event;
pub mod fragment;
pub mod markup;
pub mod selector;

pub use element::*;
pub use error::*;
pub use event::*;
pub use fragment::*;
pub use selector::Selector;
