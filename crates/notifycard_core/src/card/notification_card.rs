//! Notification card instance.
//!
//! # Responsibility
//! - Resolve the configured identity against each host snapshot.
//! - Attach when a snapshot arrives while detached: seed from persistence,
//!   subscribe to the notification feed and ask the host to re-publish.
//! - Turn each addressed event into a sanitized render, then accept and
//!   persist it.
//!
//! # Invariants
//! - Render failures leave accepted state untouched, so the same payload is
//!   retried on the next delivery.
//! - Listeners from an older activation are ignored (generation check).
//! - Shared state is never borrowed while calling into the host connection.

use crate::card::event::{notifications_from_value, NotifyPayload};
use crate::card::host::HostSnapshot;
use crate::config::{CardConfig, ConfigError};
use crate::diff::change_detector::ChangeDetector;
use crate::model::fragment::Fragment;
use crate::model::identity::Identity;
use crate::model::notification::NotificationList;
use crate::persist::bridge::PersistenceBridge;
use crate::persist::KeyValueStore;
use crate::render::{CardView, Renderer, Theme};
use crate::sanitize::sanitize_notification;
use crate::subscription::feed::{
    EventListener, FeedEvent, HostConnection, NOTIFY_EVENT_TYPE, NOTIFY_SERVICE_DOMAIN,
    NOTIFY_TRIGGER_SERVICE,
};
use crate::subscription::lifecycle::{DetachOutcome, Subscription};
use log::{debug, info, warn};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use uuid::Uuid;

/// Card-level failures.
#[derive(Debug, Clone, PartialEq)]
pub enum CardError {
    /// Host context arrived before any configuration.
    NotConfigured,
    /// The configured identity is absent from the host snapshot.
    UnknownIdentity(Identity),
    Config(ConfigError),
}

impl Display for CardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "card is not configured"),
            Self::UnknownIdentity(Identity::Person(name)) => {
                write!(f, "Person not found: {name}")
            }
            Self::UnknownIdentity(Identity::Entity(entity_id)) => {
                write!(f, "Entity not found: {entity_id}")
            }
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for CardError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

/// Result of handing a host snapshot to the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardStatus {
    /// The card moved from detached to attached on this snapshot.
    Activated,
    /// Attached already, or the attach attempt failed and will be retried.
    Ready,
    /// The identity is missing; an error view was shown.
    UnknownIdentity,
}

/// What happened to one delivered event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    NotAttached,
    /// Card state was already borrowed (re-entrant delivery); dropped.
    Busy,
    /// Delivered by a listener from an older activation.
    Stale,
    WrongType,
    Malformed,
    NotAddressed,
    Unchanged,
    Rendered,
    /// The renderer failed; accepted state is unchanged.
    RenderFailed,
}

struct CardState {
    card_id: Uuid,
    config: Option<CardConfig>,
    theme: Theme,
    detector: ChangeDetector,
    items: Vec<Fragment>,
    persistence: Option<PersistenceBridge>,
    renderer: Box<dyn Renderer>,
    generation: u64,
    view_stale: bool,
}

impl CardState {
    fn reset(&mut self) {
        self.detector.reset();
        self.items = placeholder_items();
        self.generation += 1;
        self.view_stale = true;
    }

    /// Seeds accepted state from the store unless something is accepted.
    fn seed_from_persistence(&mut self) {
        if self.detector.accepted().is_some() {
            return;
        }
        let Some(config) = self.config.as_ref() else {
            return;
        };
        if !config.persist {
            return;
        }
        let Some(bridge) = self.persistence.as_ref() else {
            return;
        };
        if let Some(list) = bridge.load(&config.identity) {
            let list = list.or_placeholder();
            self.items = sanitize_list(&list);
            self.detector = ChangeDetector::seeded(list);
            self.view_stale = true;
        }
    }

    fn process_event(&mut self, event: &FeedEvent) -> EventOutcome {
        if event.event_type != NOTIFY_EVENT_TYPE {
            return EventOutcome::WrongType;
        }
        let Some(identity) = self.config.as_ref().map(|config| config.identity.clone()) else {
            return EventOutcome::NotAttached;
        };
        let Some(payload) = NotifyPayload::from_value(&event.data) else {
            warn!(
                "event=card_event module=card status=skip card_id={} reason=malformed_payload",
                self.card_id
            );
            return EventOutcome::Malformed;
        };
        if !payload.is_for(&identity) {
            debug!(
                "event=card_event module=card status=skip card_id={} reason=not_addressed",
                self.card_id
            );
            return EventOutcome::NotAddressed;
        }
        self.ingest(payload.notifications)
    }

    fn ingest(&mut self, incoming: NotificationList) -> EventOutcome {
        let incoming = incoming.or_placeholder();
        if !self.detector.has_changed(&incoming) {
            debug!(
                "event=card_event module=card status=skip card_id={} reason=unchanged",
                self.card_id
            );
            return EventOutcome::Unchanged;
        }
        let Some(config) = self.config.as_ref() else {
            return EventOutcome::NotAttached;
        };

        let items = sanitize_list(&incoming);
        let view = CardView::Notifications {
            theme: self.theme,
            config,
            items: &items,
        };
        if let Err(err) = self.renderer.render(&view) {
            warn!(
                "event=card_render module=card status=error card_id={} error={}",
                self.card_id, err
            );
            return EventOutcome::RenderFailed;
        }

        if config.persist {
            if let Some(bridge) = self.persistence.as_ref() {
                if let Err(err) = bridge.save(&config.identity, &incoming) {
                    warn!(
                        "event=card_persist module=card status=error card_id={} error={}",
                        self.card_id, err
                    );
                }
            }
        }

        info!(
            "event=card_render module=card status=ok card_id={} count={}",
            self.card_id,
            incoming.len()
        );
        self.detector.accept(incoming);
        self.items = items;
        self.view_stale = false;
        EventOutcome::Rendered
    }

    fn render_current(&mut self) {
        let Some(config) = self.config.as_ref() else {
            return;
        };
        let view = CardView::Notifications {
            theme: self.theme,
            config,
            items: &self.items,
        };
        match self.renderer.render(&view) {
            Ok(()) => self.view_stale = false,
            Err(err) => warn!(
                "event=card_render module=card status=error card_id={} error={}",
                self.card_id, err
            ),
        }
    }

    fn render_error(&mut self, message: &str) {
        if let Err(err) = self.renderer.render(&CardView::Error { message }) {
            warn!(
                "event=card_render module=card status=error card_id={} error={}",
                self.card_id, err
            );
        }
        self.view_stale = true;
    }
}

fn sanitize_list(list: &NotificationList) -> Vec<Fragment> {
    list.iter().map(|raw| sanitize_notification(raw)).collect()
}

fn placeholder_items() -> Vec<Fragment> {
    sanitize_list(&NotificationList::placeholder())
}

fn deliver_to(
    state: &RefCell<CardState>,
    generation: Option<u64>,
    event: &FeedEvent,
) -> EventOutcome {
    let Ok(mut state) = state.try_borrow_mut() else {
        warn!(
            "event=card_event module=card status=skip reason=reentrant event_type={}",
            event.event_type
        );
        return EventOutcome::Busy;
    };
    if generation.is_some_and(|generation| generation != state.generation) {
        return EventOutcome::Stale;
    }
    state.process_event(event)
}

/// One notification card bound to a renderer and an optional store.
pub struct NotificationCard {
    card_id: Uuid,
    state: Rc<RefCell<CardState>>,
    subscription: Subscription,
}

impl NotificationCard {
    pub fn new(renderer: Box<dyn Renderer>) -> Self {
        let card_id = Uuid::new_v4();
        Self {
            card_id,
            state: Rc::new(RefCell::new(CardState {
                card_id,
                config: None,
                theme: Theme::default(),
                detector: ChangeDetector::new(),
                items: placeholder_items(),
                persistence: None,
                renderer,
                generation: 0,
                view_stale: true,
            })),
            subscription: Subscription::new(),
        }
    }

    /// Enables seeding and write-through against `store`.
    pub fn with_store(self, store: Box<dyn KeyValueStore>) -> Self {
        self.state.borrow_mut().persistence = Some(PersistenceBridge::new(store));
        self
    }

    pub fn card_id(&self) -> Uuid {
        self.card_id
    }

    /// Parses and applies user configuration.
    ///
    /// # Errors
    /// - `CardError::Config` when the document is rejected; the previous
    ///   configuration stays in effect.
    pub fn set_config(&mut self, value: Value) -> Result<(), CardError> {
        let config = CardConfig::from_value(value).map_err(|err| {
            warn!(
                "event=card_configure module=card status=error card_id={} error={}",
                self.card_id, err
            );
            err
        })?;
        self.apply_config(config);
        Ok(())
    }

    /// Applies an already validated configuration.
    ///
    /// Any live subscription is released; the next snapshot re-activates.
    pub fn apply_config(&mut self, config: CardConfig) {
        self.subscription.detach();
        let mut state = self.state.borrow_mut();
        info!(
            "event=card_configure module=card status=ok card_id={} entity_id={} persist={}",
            self.card_id,
            config.identity.entity_id(),
            config.persist
        );
        state.config = Some(config);
        state.reset();
    }

    /// Hands a host snapshot to the card.
    ///
    /// # Errors
    /// - `CardError::NotConfigured` when no configuration was applied yet.
    pub fn set_hass(
        &mut self,
        hass: &HostSnapshot,
        connection: &dyn HostConnection,
    ) -> Result<CardStatus, CardError> {
        let needs_attach = !self.subscription.is_attached();
        let (identity, generation) = {
            let mut state = self.state.borrow_mut();
            let Some(identity) = state.config.as_ref().map(|config| config.identity.clone())
            else {
                return Err(CardError::NotConfigured);
            };

            let theme = Theme::from_dark_mode(hass.dark_mode);
            if state.theme != theme {
                state.theme = theme;
                state.view_stale = true;
            }

            let entity_id = identity.entity_id();
            let Some(state_object) = hass.state(&entity_id) else {
                warn!(
                    "event=card_update module=card status=error card_id={} error_code=unknown_identity entity_id={}",
                    self.card_id, entity_id
                );
                state.render_error(&CardError::UnknownIdentity(identity).to_string());
                return Ok(CardStatus::UnknownIdentity);
            };

            let generation = if needs_attach {
                state.generation += 1;
                state.seed_from_persistence();
                Some(state.generation)
            } else {
                None
            };

            if let Some(list) = state_object
                .attributes
                .get("notifications")
                .and_then(notifications_from_value)
            {
                state.ingest(list);
            }
            if state.view_stale {
                state.render_current();
            }
            (identity, generation)
        };

        let Some(generation) = generation else {
            return Ok(CardStatus::Ready);
        };
        if self.activate(connection, &identity, generation) {
            Ok(CardStatus::Activated)
        } else {
            Ok(CardStatus::Ready)
        }
    }

    /// Attaches and requests a refresh. Returns whether the attach succeeded.
    fn activate(
        &mut self,
        connection: &dyn HostConnection,
        identity: &Identity,
        generation: u64,
    ) -> bool {
        let listener = self.listener(generation);
        if let Err(err) = self
            .subscription
            .attach(connection, NOTIFY_EVENT_TYPE, listener)
        {
            warn!(
                "event=card_activate module=card status=error card_id={} error={}",
                self.card_id, err
            );
            return false;
        }

        let entity_id = identity.entity_id();
        info!(
            "event=card_activate module=card status=ok card_id={} entity_id={}",
            self.card_id, entity_id
        );
        let data = json!({ "targets": [entity_id] });
        if let Err(err) =
            connection.call_service(NOTIFY_SERVICE_DOMAIN, NOTIFY_TRIGGER_SERVICE, data)
        {
            warn!(
                "event=card_refresh module=card status=error card_id={} error={}",
                self.card_id, err
            );
        }
        true
    }

    fn listener(&self, generation: u64) -> EventListener {
        let weak = Rc::downgrade(&self.state);
        Box::new(move |event: &FeedEvent| {
            if let Some(state) = weak.upgrade() {
                deliver_to(&state, Some(generation), event);
            }
        })
    }

    /// Processes `event` as the live listener would.
    pub fn deliver(&self, event: &FeedEvent) -> EventOutcome {
        if !self.subscription.is_attached() {
            return EventOutcome::NotAttached;
        }
        deliver_to(&self.state, None, event)
    }

    /// Releases the subscription and discards in-memory state.
    ///
    /// Persisted notifications are kept for the next activation.
    pub fn disconnect(&mut self) -> DetachOutcome {
        let outcome = self.subscription.detach();
        self.state.borrow_mut().reset();
        info!(
            "event=card_disconnect module=card status=ok card_id={}",
            self.card_id
        );
        outcome
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_attached()
    }

    pub fn config(&self) -> Option<CardConfig> {
        self.state.borrow().config.clone()
    }

    pub fn theme(&self) -> Theme {
        self.state.borrow().theme
    }

    /// Last accepted list, if any.
    pub fn accepted(&self) -> Option<NotificationList> {
        self.state.borrow().detector.accepted().cloned()
    }

    /// Layout size hint: accepted notification count, at least 1.
    pub fn card_size(&self) -> usize {
        self.state
            .borrow()
            .detector
            .accepted()
            .map_or(1, |list| list.len().max(1))
    }
}

impl Drop for NotificationCard {
    fn drop(&mut self) {
        self.subscription.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::{CardError, CardStatus, EventOutcome, NotificationCard};
    use crate::card::host::{HostSnapshot, StateObject};
    use crate::model::identity::Identity;
    use crate::render::html::HtmlRenderer;
    use crate::subscription::feed::{FeedEvent, LocalEventFeed, NOTIFY_EVENT_TYPE};
    use serde_json::json;

    fn snapshot() -> HostSnapshot {
        HostSnapshot::new().with_state("person.alice", StateObject::new("home", json!({})))
    }

    fn configured() -> (NotificationCard, HtmlRenderer) {
        let renderer = HtmlRenderer::new();
        let mut card = NotificationCard::new(Box::new(renderer.clone()));
        card.set_config(json!({ "person_name": "alice", "persist": false }))
            .expect("config");
        (card, renderer)
    }

    #[test]
    fn hass_before_config_is_rejected() {
        let mut card = NotificationCard::new(Box::new(HtmlRenderer::new()));
        let err = card
            .set_hass(&snapshot(), &LocalEventFeed::new())
            .expect_err("must fail");
        assert_eq!(err, CardError::NotConfigured);
    }

    #[test]
    fn unknown_identity_message_names_kind() {
        let person = CardError::UnknownIdentity(Identity::Person("bob".to_string()));
        assert_eq!(person.to_string(), "Person not found: bob");
        let entity = CardError::UnknownIdentity(Identity::Entity("sensor.x".to_string()));
        assert_eq!(entity.to_string(), "Entity not found: sensor.x");
    }

    #[test]
    fn first_snapshot_activates_once() {
        let (mut card, renderer) = configured();
        let feed = LocalEventFeed::new();

        assert_eq!(
            card.set_hass(&snapshot(), &feed).expect("hass"),
            CardStatus::Activated
        );
        assert_eq!(
            card.set_hass(&snapshot(), &feed).expect("hass"),
            CardStatus::Ready
        );
        assert_eq!(feed.listener_count(), 1);
        assert_eq!(feed.service_calls().len(), 1);
        assert_eq!(renderer.render_count(), 1);
    }

    #[test]
    fn deliver_without_subscription_is_not_attached() {
        let (card, _) = configured();
        let event = FeedEvent::new(NOTIFY_EVENT_TYPE, json!({ "person": ["alice"] }));
        assert_eq!(card.deliver(&event), EventOutcome::NotAttached);
    }

    #[test]
    fn drop_releases_subscription() {
        let (mut card, _) = configured();
        let feed = LocalEventFeed::new();
        card.set_hass(&snapshot(), &feed).expect("hass");
        assert_eq!(feed.listener_count(), 1);
        drop(card);
        assert_eq!(feed.listener_count(), 0);
    }
}
