//! Host event feed contracts and an in-process implementation.
//!
//! # Responsibility
//! - Define how a card registers for host events and calls host services.
//! - Provide `SubscriptionHandle`, a one-shot release capability.
//! - Provide `LocalEventFeed` for tests and the CLI.
//!
//! # Invariants
//! - A handle is released at most once (`release` consumes it).
//! - `LocalEventFeed::publish` never holds its registry borrow while a
//!   listener runs, so listeners may subscribe or release re-entrantly.

use log::{debug, warn};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::rc::{Rc, Weak};
use uuid::Uuid;

/// Event type published when notification content changes.
pub const NOTIFY_EVENT_TYPE: &str = "notifyhelper_update";
/// Service domain asked to re-publish current notifications.
pub const NOTIFY_SERVICE_DOMAIN: &str = "notifyhelper";
/// Service asked to re-publish current notifications.
pub const NOTIFY_TRIGGER_SERVICE: &str = "trigger";

/// One event delivered by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEvent {
    pub event_type: String,
    pub data: Value,
}

impl FeedEvent {
    pub fn new(event_type: impl Into<String>, data: Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }
}

/// Callback invoked for each delivered event.
pub type EventListener = Box<dyn FnMut(&FeedEvent)>;

type ReleaseFn = Box<dyn FnOnce() -> Result<(), SubscriptionError>>;

/// Stable identifier of one feed registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SubscriptionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Active feed registration. Releasing consumes the handle.
pub struct SubscriptionHandle {
    id: SubscriptionId,
    event_type: String,
    release: ReleaseFn,
}

impl SubscriptionHandle {
    pub fn new(
        id: SubscriptionId,
        event_type: impl Into<String>,
        release: impl FnOnce() -> Result<(), SubscriptionError> + 'static,
    ) -> Self {
        Self {
            id,
            event_type: event_type.into(),
            release: Box::new(release),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Unregisters from the feed.
    pub fn release(self) -> Result<(), SubscriptionError> {
        (self.release)()
    }
}

impl Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("event_type", &self.event_type)
            .finish_non_exhaustive()
    }
}

/// Feed attach/detach and service call failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    SubscribeFailed(String),
    ReleaseFailed(String),
    ServiceCallFailed(String),
    UnknownSubscription(SubscriptionId),
}

impl Display for SubscriptionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SubscribeFailed(message) => write!(f, "failed to subscribe to events: {message}"),
            Self::ReleaseFailed(message) => {
                write!(f, "failed to unsubscribe from events: {message}")
            }
            Self::ServiceCallFailed(message) => write!(f, "service call failed: {message}"),
            Self::UnknownSubscription(id) => write!(f, "subscription not registered: {id}"),
        }
    }
}

impl Error for SubscriptionError {}

/// Host capabilities a card needs from its connection.
pub trait HostConnection {
    /// Registers `listener` for events of `event_type`.
    fn subscribe_events(
        &self,
        event_type: &str,
        listener: EventListener,
    ) -> Result<SubscriptionHandle, SubscriptionError>;

    /// Invokes a host service.
    fn call_service(&self, domain: &str, service: &str, data: Value)
        -> Result<(), SubscriptionError>;
}

/// Service invocation recorded by `LocalEventFeed`.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCall {
    pub domain: String,
    pub service: String,
    pub data: Value,
}

struct RegisteredListener {
    event_type: String,
    listener: Rc<RefCell<EventListener>>,
}

#[derive(Default)]
struct FeedRegistry {
    listeners: BTreeMap<SubscriptionId, RegisteredListener>,
    service_calls: Vec<ServiceCall>,
    fail_subscribe: bool,
    fail_release: bool,
    fail_service_calls: bool,
}

/// Single-threaded in-process event feed.
///
/// Clones share one registry, so a test can keep a clone for publishing while
/// the card holds another as its connection.
#[derive(Clone, Default)]
pub struct LocalEventFeed {
    inner: Rc<RefCell<FeedRegistry>>,
}

impl LocalEventFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `event` to every listener registered for its type.
    ///
    /// Returns the number of listeners invoked.
    pub fn publish(&self, event: &FeedEvent) -> usize {
        let targets: Vec<Rc<RefCell<EventListener>>> = self
            .inner
            .borrow()
            .listeners
            .values()
            .filter(|entry| entry.event_type == event.event_type)
            .map(|entry| Rc::clone(&entry.listener))
            .collect();

        let mut delivered = 0;
        for target in targets {
            match target.try_borrow_mut() {
                Ok(mut listener) => {
                    (*listener)(event);
                    delivered += 1;
                }
                Err(_) => warn!(
                    "event=feed_publish module=subscription status=skip reason=reentrant event_type={}",
                    event.event_type
                ),
            }
        }
        debug!(
            "event=feed_publish module=subscription status=ok event_type={} delivered={}",
            event.event_type, delivered
        );
        delivered
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn service_calls(&self) -> Vec<ServiceCall> {
        self.inner.borrow().service_calls.clone()
    }

    /// Makes subsequent `subscribe_events` calls fail.
    pub fn set_fail_subscribe(&self, fail: bool) {
        self.inner.borrow_mut().fail_subscribe = fail;
    }

    /// Makes subsequent `call_service` calls fail without being recorded.
    pub fn set_fail_service_calls(&self, fail: bool) {
        self.inner.borrow_mut().fail_service_calls = fail;
    }

    /// Makes subsequent handle releases fail. The listener stays registered.
    pub fn set_fail_release(&self, fail: bool) {
        self.inner.borrow_mut().fail_release = fail;
    }
}

impl HostConnection for LocalEventFeed {
    fn subscribe_events(
        &self,
        event_type: &str,
        listener: EventListener,
    ) -> Result<SubscriptionHandle, SubscriptionError> {
        let mut registry = self.inner.borrow_mut();
        if registry.fail_subscribe {
            return Err(SubscriptionError::SubscribeFailed(
                "feed rejected subscription".to_string(),
            ));
        }

        let id = SubscriptionId::new();
        registry.listeners.insert(
            id,
            RegisteredListener {
                event_type: event_type.to_string(),
                listener: Rc::new(RefCell::new(listener)),
            },
        );

        let weak: Weak<RefCell<FeedRegistry>> = Rc::downgrade(&self.inner);
        Ok(SubscriptionHandle::new(id, event_type, move || {
            let Some(registry) = weak.upgrade() else {
                return Ok(());
            };
            let mut registry = registry.borrow_mut();
            if registry.fail_release {
                return Err(SubscriptionError::ReleaseFailed(
                    "feed rejected unsubscribe".to_string(),
                ));
            }
            match registry.listeners.remove(&id) {
                Some(_) => Ok(()),
                None => Err(SubscriptionError::UnknownSubscription(id)),
            }
        }))
    }

    fn call_service(
        &self,
        domain: &str,
        service: &str,
        data: Value,
    ) -> Result<(), SubscriptionError> {
        let mut registry = self.inner.borrow_mut();
        if registry.fail_service_calls {
            return Err(SubscriptionError::ServiceCallFailed(format!(
                "{domain}.{service} unavailable"
            )));
        }
        registry.service_calls.push(ServiceCall {
            domain: domain.to_string(),
            service: service.to_string(),
            data,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{FeedEvent, HostConnection, LocalEventFeed, SubscriptionError};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn publish_reaches_listeners_of_matching_type_only() {
        let feed = LocalEventFeed::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _handle = feed
            .subscribe_events(
                "a",
                Box::new(move |event: &FeedEvent| sink.borrow_mut().push(event.data.clone())),
            )
            .expect("subscribe");

        assert_eq!(feed.publish(&FeedEvent::new("a", json!(1))), 1);
        assert_eq!(feed.publish(&FeedEvent::new("b", json!(2))), 0);
        assert_eq!(*seen.borrow(), vec![json!(1)]);
    }

    #[test]
    fn release_unregisters_listener() {
        let feed = LocalEventFeed::new();
        let handle = feed
            .subscribe_events("a", Box::new(|_: &FeedEvent| {}))
            .expect("subscribe");
        assert_eq!(feed.listener_count(), 1);

        handle.release().expect("release");
        assert_eq!(feed.listener_count(), 0);
        assert_eq!(feed.publish(&FeedEvent::new("a", json!(null))), 0);
    }

    #[test]
    fn injected_failures_surface_as_errors() {
        let feed = LocalEventFeed::new();
        feed.set_fail_subscribe(true);
        let err = feed
            .subscribe_events("a", Box::new(|_: &FeedEvent| {}))
            .expect_err("subscribe must fail");
        assert!(matches!(err, SubscriptionError::SubscribeFailed(_)));

        feed.set_fail_subscribe(false);
        let handle = feed
            .subscribe_events("a", Box::new(|_: &FeedEvent| {}))
            .expect("subscribe");
        feed.set_fail_release(true);
        let err = handle.release().expect_err("release must fail");
        assert!(matches!(err, SubscriptionError::ReleaseFailed(_)));
    }

    #[test]
    fn release_after_feed_dropped_is_ok() {
        let feed = LocalEventFeed::new();
        let handle = feed
            .subscribe_events("a", Box::new(|_: &FeedEvent| {}))
            .expect("subscribe");
        drop(feed);
        assert!(handle.release().is_ok());
    }

    #[test]
    fn records_service_calls() {
        let feed = LocalEventFeed::new();
        feed.call_service("notifyhelper", "trigger", json!({"targets": ["person.a"]}))
            .expect("service call");
        let calls = feed.service_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].service, "trigger");
        assert_eq!(calls[0].data["targets"][0], "person.a");
    }
}
