use std::collections::HashMap;
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};

use crate::{Element, Slice, State, Store};

new_key_type! {
    pub struct SubscriptionId;
}

/// A reaction runs when a slice it is bound to changes. It receives the store
/// and the element it was rippled onto.
pub type Reaction<S> = Rc<dyn Fn(&Store<S>, &Element) -> anyhow::Result<()>>;

pub struct Subscription<S: State> {
    pub slice: S::Slice,
    pub element: Element,
    pub reaction: Reaction<S>,
}

impl<S: State> Clone for Subscription<S> {
    fn clone(&self) -> Self {
        Self {
            slice: self.slice,
            element: self.element.clone(),
            reaction: self.reaction.clone(),
        }
    }
}

struct Channel {
    event_name: String,
    subscribers: Vec<SubscriptionId>,
}

/// Per-slice ordered subscriber lists. Entries are never removed.
pub struct Registry<S: State> {
    order: Vec<S::Slice>,
    channels: HashMap<S::Slice, Channel>,
    subs: SlotMap<SubscriptionId, Subscription<S>>,
}

impl<S: State> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> Registry<S> {
    /// One empty channel per slice in `S::Slice::ALL`.
    pub fn new() -> Self {
        let mut order = Vec::new();
        let mut channels = HashMap::new();
        for &slice in S::Slice::ALL {
            if channels.contains_key(&slice) {
                continue;
            }
            order.push(slice);
            channels.insert(
                slice,
                Channel {
                    event_name: slice.event_name(),
                    subscribers: Vec::new(),
                },
            );
        }
        Self {
            order,
            channels,
            subs: SlotMap::with_key(),
        }
    }

    pub fn subscribe(
        &mut self,
        slice: S::Slice,
        element: Element,
        reaction: Reaction<S>,
    ) -> SubscriptionId {
        let id = self.subs.insert(Subscription {
            slice,
            element,
            reaction,
        });
        // Slices outside ALL still get a channel, it just never fires unless
        // the state reports writing that slice.
        let channel = self.channels.entry(slice).or_insert_with(|| {
            log::warn!("ripple on {slice:?}, which is not listed in Slice::ALL");
            Channel {
                event_name: slice.event_name(),
                subscribers: Vec::new(),
            }
        });
        channel.subscribers.push(id);
        if !self.order.contains(&slice) {
            self.order.push(slice);
        }
        id
    }

    /// Clones the subscriber list of `slice`, in registration order.
    pub fn snapshot(&self, slice: S::Slice) -> Vec<(SubscriptionId, Subscription<S>)> {
        let Some(channel) = self.channels.get(&slice) else {
            return Vec::new();
        };
        channel
            .subscribers
            .iter()
            .filter_map(|id| self.subs.get(*id).map(|s| (*id, s.clone())))
            .collect()
    }

    pub fn get(&self, id: SubscriptionId) -> Option<&Subscription<S>> {
        self.subs.get(id)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn event_names(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter_map(|s| self.channels.get(s).map(|c| c.event_name.as_str()))
            .collect()
    }

    pub fn event_name(&self, slice: S::Slice) -> Option<&str> {
        self.channels.get(&slice).map(|c| c.event_name.as_str())
    }

    pub fn subscriber_count(&self, slice: S::Slice) -> usize {
        self.channels
            .get(&slice)
            .map_or(0, |c| c.subscribers.len())
    }

    pub fn subscribers(&self, slice: S::Slice) -> Vec<Element> {
        self.snapshot(slice)
            .into_iter()
            .map(|(_, s)| s.element)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.subs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }
}
