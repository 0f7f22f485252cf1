//! Card domain model.
//!
//! # Responsibility
//! - Define the raw notification list received from the host.
//! - Define the owned markup tree produced by sanitization.
//! - Define the configured identity that scopes persistence and events.
//!
//! # Invariants
//! - Notification lists are compared by order and exact string content.
//! - Sanitized fragments never hold markup outside the allow-list.

pub mod fragment;
pub mod identity;
pub mod notification;
