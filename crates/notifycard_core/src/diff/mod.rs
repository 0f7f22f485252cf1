//! Change detection between delivered notification lists.
//!
//! # Invariants
//! - Comparison is order-sensitive exact string equality.
//! - The accepted list is replaced wholesale, never edited in place.

pub mod change_detector;
