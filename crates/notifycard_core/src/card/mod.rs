//! Card orchestration.
//!
//! # Responsibility
//! - Wire configuration, subscription, change detection, sanitization,
//!   rendering and persistence into one card instance.
//! - Contain every per-event failure so the next delivery still compares
//!   against a consistent accepted state.
//!
//! # Invariants
//! - Accepted state changes only after a successful render.
//! - At most one live feed subscription per card.

pub mod event;
pub mod host;
pub mod notification_card;
