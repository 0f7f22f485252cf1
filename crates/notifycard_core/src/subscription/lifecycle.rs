//! Attach/detach state machine for one card's event subscription.
//!
//! # Responsibility
//! - Own at most one live `SubscriptionHandle`.
//! - Release the handle exactly once on detach.
//!
//! # Invariants
//! - Attaching while attached releases the stale handle first, so two live
//!   handles never coexist.
//! - Detach never panics and always ends in `Detached`, even when the feed
//!   fails to release.

use crate::subscription::feed::{
    EventListener, HostConnection, SubscriptionError, SubscriptionHandle, SubscriptionId,
};
use log::{info, warn};

/// Current subscription state.
#[derive(Debug, Default)]
pub enum SubscriptionState {
    #[default]
    Detached,
    Attached(SubscriptionHandle),
}

/// Result of a successful attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    /// First attach since the last detach.
    Attached(SubscriptionId),
    /// A stale handle was detached before the new registration.
    Reattached {
        previous: SubscriptionId,
        current: SubscriptionId,
    },
}

impl AttachOutcome {
    pub fn id(&self) -> SubscriptionId {
        match self {
            Self::Attached(id) => *id,
            Self::Reattached { current, .. } => *current,
        }
    }
}

/// Result of a detach request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetachOutcome {
    NotAttached,
    Released(SubscriptionId),
    /// The feed reported a failure; the handle was discarded anyway.
    ReleaseFailed(SubscriptionId),
}

/// One card's subscription lifecycle.
#[derive(Debug, Default)]
pub struct Subscription {
    state: SubscriptionState,
}

impl Subscription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_attached(&self) -> bool {
        matches!(self.state, SubscriptionState::Attached(_))
    }

    pub fn state(&self) -> &SubscriptionState {
        &self.state
    }

    /// Returns the live registration id, if any.
    pub fn active_id(&self) -> Option<SubscriptionId> {
        match &self.state {
            SubscriptionState::Attached(handle) => Some(handle.id()),
            SubscriptionState::Detached => None,
        }
    }

    /// Registers `listener` for `event_type`, replacing any live handle.
    ///
    /// # Errors
    /// - Returns the feed error when registration fails; the state is then
    ///   `Detached`.
    pub fn attach(
        &mut self,
        connection: &dyn HostConnection,
        event_type: &str,
        listener: EventListener,
    ) -> Result<AttachOutcome, SubscriptionError> {
        let previous = match self.detach() {
            DetachOutcome::NotAttached => None,
            DetachOutcome::Released(id) | DetachOutcome::ReleaseFailed(id) => Some(id),
        };

        let handle = match connection.subscribe_events(event_type, listener) {
            Ok(handle) => handle,
            Err(err) => {
                warn!(
                    "event=subscription_attach module=subscription status=error event_type={} error={}",
                    event_type, err
                );
                return Err(err);
            }
        };

        let current = handle.id();
        self.state = SubscriptionState::Attached(handle);
        info!(
            "event=subscription_attach module=subscription status=ok event_type={} id={} replaced={}",
            event_type,
            current,
            previous.is_some()
        );

        Ok(match previous {
            Some(previous) => AttachOutcome::Reattached { previous, current },
            None => AttachOutcome::Attached(current),
        })
    }

    /// Releases the live handle, if any.
    pub fn detach(&mut self) -> DetachOutcome {
        let handle = match std::mem::take(&mut self.state) {
            SubscriptionState::Detached => return DetachOutcome::NotAttached,
            SubscriptionState::Attached(handle) => handle,
        };

        let id = handle.id();
        match handle.release() {
            Ok(()) => {
                info!(
                    "event=subscription_detach module=subscription status=ok id={}",
                    id
                );
                DetachOutcome::Released(id)
            }
            Err(err) => {
                warn!(
                    "event=subscription_detach module=subscription status=error id={} error={}",
                    id, err
                );
                DetachOutcome::ReleaseFailed(id)
            }
        }
    }
}
