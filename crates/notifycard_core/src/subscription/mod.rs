//! External event feed subscription.
//!
//! # Responsibility
//! - Define host feed contracts (`HostConnection`, `SubscriptionHandle`).
//! - Manage the Detached/Attached lifecycle of one card's registration.
//!
//! # See also
//! - `card::NotificationCard`, which routes delivered events.

pub mod feed;
pub mod lifecycle;
