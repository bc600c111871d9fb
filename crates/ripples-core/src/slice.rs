use std::fmt::Debug;
use std::hash::Hash;

/// Names one top-level field of a [`State`]: the unit of change notification.
pub trait Slice: Copy + Eq + Hash + Debug + 'static {
    /// Every slice of the state. Fixed for the life of the program.
    const ALL: &'static [Self];

    /// Field name, e.g. `"todos"`.
    fn key(self) -> &'static str;

    /// Channel name derived from the key: `"update" + key`.
    fn event_name(self) -> String {
        format!("update{}", self.key())
    }
}

/// Application state driven by a [`Store`](crate::Store).
///
/// `Update` carries one variant per slice with its new value; applying it
/// overwrites that field and reports which slice was written. Unknown keys
/// cannot be expressed, so every write has a channel.
pub trait State: 'static {
    type Slice: Slice;
    type Update;

    fn apply(&mut self, update: Self::Update) -> Self::Slice;
}
