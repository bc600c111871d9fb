use std::cell::{Cell, Ref, RefCell};
use std::rc::{Rc, Weak};

use crate::{
    Element, IntoTargets, Reaction, ReactionFailure, Registry, Slice, State, StoreError,
    SubscriptionId,
};

pub const DEFAULT_MAX_DEPTH: usize = 64;

pub type OnChange<S> = Box<dyn Fn(&Store<S>)>;

/// Cloneable handle to the application state and its subscriptions.
pub struct Store<S: State>(Rc<StoreInner<S>>);

struct StoreInner<S: State> {
    state: RefCell<S>,
    registry: RefCell<Registry<S>>,
    on_change: Option<OnChange<S>>,
    max_depth: usize,
    depth: Cell<usize>,
    limit_hit: Cell<bool>,
}

impl<S: State> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

/// Outcome of one `set_state` call.
#[derive(Debug, Default)]
pub struct Dispatch {
    /// Slices written, in patch order.
    pub slices: Vec<String>,
    /// Reaction invocations made by this call (nested calls report their own).
    pub dispatched: usize,
    pub failures: Vec<ReactionFailure>,
    /// Some nested `set_state` under this call was refused for exceeding
    /// the nesting limit. Only set on the outermost report.
    pub depth_limit_hit: bool,
}

impl Dispatch {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.depth_limit_hit
    }
}

pub struct StoreBuilder<S: State> {
    initial: S,
    on_change: Option<OnChange<S>>,
    max_depth: usize,
}

impl<S: State> StoreBuilder<S> {
    /// Runs once after every `set_state`, after all reactions.
    pub fn on_change(mut self, f: impl Fn(&Store<S>) + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    /// Deepest allowed `set_state` nesting (reaction calling `set_state`).
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(1);
        self
    }

    pub fn build(self) -> Store<S> {
        let registry = Registry::new();
        log::debug!(
            "store created with {} channel(s): {:?}",
            registry.channel_count(),
            registry.event_names()
        );
        Store(Rc::new(StoreInner {
            state: RefCell::new(self.initial),
            registry: RefCell::new(registry),
            on_change: self.on_change,
            max_depth: self.max_depth,
            depth: Cell::new(0),
            limit_hit: Cell::new(false),
        }))
    }
}

// Decrements the nesting counter even if a reaction panics.
struct DepthGuard<'a>(&'a Cell<usize>);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

impl<S: State> Store<S> {
    pub fn new(initial: S) -> Self {
        Self::builder(initial).build()
    }

    pub fn with_on_change(initial: S, on_change: impl Fn(&Store<S>) + 'static) -> Self {
        Self::builder(initial).on_change(on_change).build()
    }

    pub fn builder(initial: S) -> StoreBuilder<S> {
        StoreBuilder {
            initial,
            on_change: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Current state. Drop the guard before calling `set_state`.
    pub fn state(&self) -> Ref<'_, S> {
        self.0.state.borrow()
    }

    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.0.state.borrow())
    }

    /// Applies `patch` in order, notifying each written slice's subscribers
    /// right after its write, then runs the on-change callback once.
    ///
    /// A failing reaction is logged and recorded in the returned [`Dispatch`];
    /// the remaining reactions still run.
    pub fn set_state(
        &self,
        patch: impl IntoIterator<Item = S::Update>,
    ) -> Result<Dispatch, StoreError> {
        let depth = self.0.depth.get();
        if depth >= self.0.max_depth {
            log::error!(
                "set_state refused: nesting limit of {} reached",
                self.0.max_depth
            );
            self.0.limit_hit.set(true);
            return Err(StoreError::ReentrancyLimit {
                max: self.0.max_depth,
            });
        }
        if self.0.state.try_borrow_mut().is_err() {
            return Err(StoreError::StateBorrowed);
        }
        self.0.depth.set(depth + 1);
        let _guard = DepthGuard(&self.0.depth);
        if depth == 0 {
            self.0.limit_hit.set(false);
        }

        let mut report = Dispatch::default();
        for update in patch {
            let slice = {
                let mut state = self
                    .0
                    .state
                    .try_borrow_mut()
                    .map_err(|_| StoreError::StateBorrowed)?;
                state.apply(update)
            };
            let event_name = slice.event_name();
            report.slices.push(slice.key().to_string());

            let subscribers = self.0.registry.borrow().snapshot(slice);
            log::trace!("{event_name}: {} subscriber(s)", subscribers.len());
            for (id, sub) in subscribers {
                report.dispatched += 1;
                if let Err(error) = (sub.reaction)(self, &sub.element) {
                    log::error!("reaction for {event_name} on {:?} failed: {error:#}", sub.element);
                    report.failures.push(ReactionFailure {
                        subscription: id,
                        event_name: event_name.clone(),
                        error,
                    });
                }
            }
        }
        if depth == 0 {
            report.depth_limit_hit = self.0.limit_hit.replace(false);
        }
        log::debug!(
            "set_state({:?}) at depth {}: {} dispatch(es), {} failure(s)",
            report.slices,
            depth,
            report.dispatched,
            report.failures.len()
        );

        if let Some(on_change) = &self.0.on_change {
            on_change(self);
        }
        Ok(report)
    }

    /// Binds every slice in `slices` to every element in `elements`.
    ///
    /// For each pair the reaction is attached as a native listener for the
    /// slice's event name and enrolled in the slice's subscriber list.
    /// Repeated calls accumulate; nothing is deduplicated.
    pub fn ripple<F>(
        &self,
        slices: impl IntoTargets<S::Slice>,
        elements: impl IntoTargets<Element>,
        reaction: F,
    ) -> Vec<SubscriptionId>
    where
        F: Fn(&Store<S>, &Element) -> anyhow::Result<()> + 'static,
    {
        let reaction: Reaction<S> = Rc::new(reaction);
        let elements = elements.into_targets();
        let mut ids = Vec::new();
        for slice in slices.into_targets() {
            let event_name = slice.event_name();
            for element in &elements {
                let listener = Self::native_listener(Rc::downgrade(&self.0), reaction.clone());
                element.add_event_listener(&event_name, listener);
                let id = self
                    .0
                    .registry
                    .borrow_mut()
                    .subscribe(slice, element.clone(), reaction.clone());
                ids.push(id);
            }
            log::debug!("ripple {event_name} -> {} element(s)", elements.len());
        }
        ids
    }

    // Holds the store weakly so element listeners do not keep it alive.
    fn native_listener(
        weak: Weak<StoreInner<S>>,
        reaction: Reaction<S>,
    ) -> impl Fn(&crate::Event, &Element) + 'static {
        move |event, current| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if let Err(error) = reaction(&Store(inner), current) {
                log::error!("reaction for {} on {current:?} failed: {error:#}", event.name());
            }
        }
    }

    pub fn event_name(&self, slice: S::Slice) -> Option<String> {
        self.0.registry.borrow().event_name(slice).map(str::to_string)
    }

    pub fn event_names(&self) -> Vec<String> {
        self.0
            .registry
            .borrow()
            .event_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn channel_count(&self) -> usize {
        self.0.registry.borrow().channel_count()
    }

    pub fn subscriber_count(&self, slice: S::Slice) -> usize {
        self.0.registry.borrow().subscriber_count(slice)
    }

    /// Elements subscribed to `slice`, in registration order.
    pub fn subscribers(&self, slice: S::Slice) -> Vec<Element> {
        self.0.registry.borrow().subscribers(slice)
    }

    /// Current `set_state` nesting; zero outside of any reaction.
    pub fn depth(&self) -> usize {
        self.0.depth.get()
    }
}
