use thiserror::Error;

use crate::SubscriptionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A reaction chain nested `set_state` deeper than the store allows.
    #[error("set_state nested deeper than {max} levels")]
    ReentrancyLimit { max: usize },
    /// `set_state` was called while the state was borrowed for reading.
    #[error("state is borrowed; drop the state guard before calling set_state")]
    StateBorrowed,
}

/// A reaction that returned an error during notification.
#[derive(Debug)]
pub struct ReactionFailure {
    pub subscription: SubscriptionId,
    pub event_name: String,
    pub error: anyhow::Error,
}
