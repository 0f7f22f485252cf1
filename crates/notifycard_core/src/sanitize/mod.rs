//! Notification content sanitization.
//!
//! # Responsibility
//! - Turn bare newlines into line breaks before parsing.
//! - Reduce parsed markup to a fixed tag/attribute allow-list.
//!
//! # Invariants
//! - Sanitization is total: every string input yields a fragment.
//! - Sanitization is idempotent and deterministic.

pub mod newline;
pub mod sanitizer;

use crate::model::fragment::Fragment;

/// Normalizes newlines and sanitizes one raw notification string.
pub fn sanitize_notification(raw: &str) -> Fragment {
    sanitizer::sanitize_html(&newline::normalize_newlines(raw))
}
