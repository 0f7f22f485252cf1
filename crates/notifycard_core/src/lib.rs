//! Core logic for notifycard, a per-person notification card.
//!
//! Untrusted notification markup flows through newline normalization and an
//! allow-list sanitizer before any renderer sees it. Change detection keeps
//! redundant updates from re-rendering, and a subscription lifecycle keeps at
//! most one live feed registration per card.

pub mod card;
pub mod config;
pub mod db;
pub mod diff;
pub mod logging;
pub mod model;
pub mod persist;
pub mod render;
pub mod sanitize;
pub mod subscription;

pub use card::host::{HostSnapshot, StateObject};
pub use card::notification_card::{CardError, CardStatus, EventOutcome, NotificationCard};
pub use config::{CardConfig, ConfigError};
pub use diff::change_detector::{notifications_changed, ChangeDetector};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::fragment::{Element, Fragment, Node};
pub use model::identity::Identity;
pub use model::notification::NotificationList;
pub use persist::bridge::PersistenceBridge;
pub use persist::store::{MemoryStore, SqliteStore};
pub use persist::{KeyValueStore, PersistError, PersistResult};
pub use render::html::HtmlRenderer;
pub use render::{CardView, RenderError, Renderer, Theme};
pub use sanitize::sanitize_notification;
pub use sanitize::newline::normalize_newlines;
pub use sanitize::sanitizer::{sanitize_fragment, sanitize_html};
pub use subscription::feed::{
    FeedEvent, HostConnection, LocalEventFeed, SubscriptionError, SubscriptionHandle,
};
pub use subscription::lifecycle::{AttachOutcome, DetachOutcome, Subscription};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
